//! # 探测器数据表解析器
//!
//! 解析空白分隔的数值表，每行一次探测器读数。
//!
//! ## 格式说明
//! ```text
//! <pixel position> <intensity (V)> [ignored columns...]
//! ```
//! 无表头；空行与以 `#` 开头的行被忽略。
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `models/series.rs`

use crate::error::{Result, SlitfitError};
use crate::models::IntensitySeries;

use std::fs;
use std::path::Path;

/// 读取数据文件
pub fn read_series(path: &Path) -> Result<IntensitySeries> {
    if !path.is_file() {
        return Err(SlitfitError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let content = fs::read_to_string(path).map_err(|e| SlitfitError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_series_content(&content, &path.display().to_string())
}

/// 从字符串内容解析数据表
pub fn parse_series_content(content: &str, source_name: &str) -> Result<IntensitySeries> {
    let mut positions = Vec::new();
    let mut intensities = Vec::new();

    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 2 {
            return Err(SlitfitError::ParseError {
                path: source_name.to_string(),
                reason: format!("line {}: expected at least 2 columns", line_no + 1),
            });
        }

        let parse = |s: &str| -> Result<f64> {
            s.parse::<f64>().map_err(|_| SlitfitError::ParseError {
                path: source_name.to_string(),
                reason: format!("line {}: invalid number '{}'", line_no + 1, s),
            })
        };

        positions.push(parse(parts[0])?);
        intensities.push(parse(parts[1])?);
    }

    let series =
        IntensitySeries::new(positions, intensities).map_err(|e| SlitfitError::ParseError {
            path: source_name.to_string(),
            reason: e.to_string(),
        })?;

    if series.is_empty() {
        return Err(SlitfitError::EmptyResult(format!(
            "no data rows in {}",
            source_name
        )));
    }

    Ok(series)
}
