//! # 批量处理模块
//!
//! 提供统一的样本批量处理能力。
//!
//! ## 功能
//! - 自动检测输入类型（文件/目录）
//! - 收集匹配文件列表
//! - 顺序处理（样本间不共享可变状态）
//! - 进度反馈与统计
//!
//! ## 依赖关系
//! - 被 `commands/calibrate.rs` 使用
//! - 使用 `indicatif` 显示进度

pub mod collector;
pub mod runner;

pub use collector::SampleCollector;
pub use runner::{BatchResult, BatchRunner, ProcessResult};
