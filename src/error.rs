//! # 统一错误处理模块
//!
//! 定义 slitfit 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// slitfit 统一错误类型
#[derive(Error, Debug)]
pub enum SlitfitError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse {path}\nReason: {reason}")]
    ParseError { path: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // 数值计算错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid parameter: {name} = {value} (must be > 0)")]
    InvalidParameter { name: String, value: f64 },

    #[error("Empty result: {0}")]
    EmptyResult(String),

    #[error("Fit failed: {0}")]
    FitFailure(String),

    #[error("Underdetermined fit: need at least {required} points, found {found}")]
    UnderdeterminedFit { required: usize, found: usize },

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─────────────────────────────────────────────────────────────
    // CSV / 绘图错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Plot error: {0}")]
    PlotError(String),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("No matching files found with pattern: {pattern}")]
    NoFilesFound { pattern: String },
}

impl SlitfitError {
    /// 错误类别（失败样本报告中使用）
    pub fn kind(&self) -> &'static str {
        match self {
            SlitfitError::FileReadError { .. } | SlitfitError::FileWriteError { .. } => "IoError",
            SlitfitError::FileNotFound { .. } => "NotFound",
            SlitfitError::ParseError { .. } => "ParseError",
            SlitfitError::InvalidParameter { .. } => "InvalidParameter",
            SlitfitError::EmptyResult(_) => "EmptyResult",
            SlitfitError::FitFailure(_) => "FitFailure",
            SlitfitError::UnderdeterminedFit { .. } => "UnderdeterminedFit",
            SlitfitError::InvalidArgument(_) => "InvalidArgument",
            SlitfitError::CsvError(_) => "CsvError",
            SlitfitError::PlotError(_) => "PlotError",
            SlitfitError::NoFilesFound { .. } => "NoFilesFound",
        }
    }

    /// 校验物理常量为正（且有限）
    pub fn check_positive(name: &str, value: f64) -> Result<f64> {
        if value.is_finite() && value > 0.0 {
            Ok(value)
        } else {
            Err(SlitfitError::InvalidParameter {
                name: name.to_string(),
                value,
            })
        }
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, SlitfitError>;
