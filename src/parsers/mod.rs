//! # 解析器模块
//!
//! 提供探测器数据表、样本清单和样本文件名的解析器。
//!
//! ## 依赖关系
//! - 被 `commands/` 和 `batch/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: data, manifest, sample_name

pub mod data;
pub mod manifest;
pub mod sample_name;

pub use data::read_series;
pub use manifest::read_manifest;
pub use sample_name::parse_slit_width;
