//! # 样本描述
//!
//! 每个样本的配置记录（数据路径 + 标称狭缝宽度），
//! 取代按样本复制的入口脚本。
//!
//! ## 依赖关系
//! - 被 `parsers/manifest.rs`, `batch/collector.rs` 生成
//! - 被 `commands/calibrate.rs` 使用

use std::path::PathBuf;

/// 待处理样本
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSpec {
    /// 样本标识（默认为文件名主干）
    pub id: String,
    /// 数据文件路径
    pub path: PathBuf,
    /// 标称狭缝宽度 (m)；未知时为 None
    pub nominal_width: Option<f64>,
}

impl SampleSpec {
    pub fn new(path: PathBuf, nominal_width: Option<f64>) -> Self {
        let id = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("sample")
            .to_string();
        Self {
            id,
            path,
            nominal_width,
        }
    }
}
