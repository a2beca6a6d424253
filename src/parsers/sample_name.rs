//! # 样本文件名解析
//!
//! 文件名主干以 `_<slitWidth>` 结尾，宽度为整数微米，例如
//! `single_slit_79.txt` 表示 79 µm。
//!
//! ## 依赖关系
//! - 被 `batch/collector.rs`, `commands/` 使用
//! - 使用 `regex` crate

use crate::error::{Result, SlitfitError};

use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static WIDTH_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_(\d+)$").expect("static regex"));

/// 微米到米
pub const MICROMETER: f64 = 1e-6;

/// 从文件名主干解析标称狭缝宽度 (m)
pub fn parse_slit_width(path: &Path) -> Result<f64> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| SlitfitError::InvalidArgument(format!(
            "cannot read file stem of '{}'",
            path.display()
        )))?;

    let caps = WIDTH_SUFFIX
        .captures(stem)
        .ok_or_else(|| SlitfitError::ParseError {
            path: path.display().to_string(),
            reason: "file stem does not end in _<slit width in µm>".to_string(),
        })?;

    let micrometers: u64 = caps[1].parse().map_err(|_| SlitfitError::ParseError {
        path: path.display().to_string(),
        reason: format!("invalid slit width '{}'", &caps[1]),
    })?;

    SlitfitError::check_positive("slit_width", micrometers as f64 * MICROMETER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_width_suffix() {
        let b = parse_slit_width(Path::new("data/single_slit_79.txt")).unwrap();
        assert!((b - 79e-6).abs() < 1e-15);

        let b = parse_slit_width(Path::new("run2_150")).unwrap();
        assert!((b - 150e-6).abs() < 1e-15);
    }

    #[test]
    fn test_parse_width_rejects_bad_names() {
        assert!(parse_slit_width(Path::new("data/single_slit.txt")).is_err());
        assert!(parse_slit_width(Path::new("data/slit_79a.txt")).is_err());
        assert!(matches!(
            parse_slit_width(Path::new("slit_0.txt")),
            Err(SlitfitError::InvalidParameter { .. })
        ));
    }
}
