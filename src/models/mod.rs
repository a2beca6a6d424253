//! # 数据模型模块
//!
//! 定义配置、测量序列、极小值集合与标定结果。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `diffraction/` 和 `commands/` 使用
//! - 子模块: config, series, calibration, sample

pub mod calibration;
pub mod config;
pub mod sample;
pub mod series;

pub use calibration::{CalibrationResult, FitModel, SampleRecord};
pub use config::{DetectorGeometry, DiffractionConfig};
pub use sample::SampleSpec;
pub use series::{IntensitySeries, MinimaSet};
