//! # 样本清单解析器
//!
//! 读取 CSV 样本清单，每行一个样本：
//! ```text
//! path,slit_width_um
//! data/slit_79.txt,79
//! data/slit_150.txt,
//! ```
//! 相对路径相对于清单所在目录；宽度留空时从文件名解析。
//!
//! ## 依赖关系
//! - 被 `commands/calibrate.rs` 使用
//! - 使用 `csv` + `serde` 反序列化

use crate::error::{Result, SlitfitError};
use crate::models::SampleSpec;
use crate::parsers::sample_name::{self, MICROMETER};

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// 清单中的一行
#[derive(Debug, Deserialize)]
struct ManifestRow {
    path: PathBuf,
    #[serde(default)]
    slit_width_um: Option<f64>,
    #[serde(default)]
    id: Option<String>,
}

/// 读取样本清单
pub fn read_manifest(path: &Path) -> Result<Vec<SampleSpec>> {
    if !path.is_file() {
        return Err(SlitfitError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_path(path)?;

    let mut samples = Vec::new();
    for row in reader.deserialize::<ManifestRow>() {
        let row = row?;
        let data_path = if row.path.is_absolute() {
            row.path
        } else {
            base.join(row.path)
        };

        let nominal = match row.slit_width_um {
            Some(um) => Some(SlitfitError::check_positive("slit_width", um * MICROMETER)?),
            None => sample_name::parse_slit_width(&data_path).ok(),
        };

        let mut spec = SampleSpec::new(data_path, nominal);
        if let Some(id) = row.id.filter(|s| !s.is_empty()) {
            spec.id = id;
        }
        samples.push(spec);
    }

    if samples.is_empty() {
        return Err(SlitfitError::EmptyResult(format!(
            "no samples listed in {}",
            path.display()
        )));
    }

    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_manifest(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("slitfit-manifest-{}", name));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("samples.csv");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_read_manifest() {
        let path = temp_manifest(
            "basic",
            "path,slit_width_um,id\n\
             slit_a.txt,79,first\n\
             slit_150.txt,,\n",
        );
        let samples = read_manifest(&path).unwrap();
        assert_eq!(samples.len(), 2);

        assert_eq!(samples[0].id, "first");
        assert!((samples[0].nominal_width.unwrap() - 79e-6).abs() < 1e-15);
        assert_eq!(samples[0].path, path.parent().unwrap().join("slit_a.txt"));

        // 宽度留空时回退到文件名
        assert_eq!(samples[1].id, "slit_150");
        assert!((samples[1].nominal_width.unwrap() - 150e-6).abs() < 1e-15);
    }

    #[test]
    fn test_manifest_rejects_non_positive_width() {
        let path = temp_manifest("negative", "path,slit_width_um\nslit.txt,-5\n");
        assert!(matches!(
            read_manifest(&path),
            Err(SlitfitError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_empty_manifest() {
        let path = temp_manifest("empty", "path,slit_width_um\n");
        assert!(matches!(
            read_manifest(&path),
            Err(SlitfitError::EmptyResult(_))
        ));
    }
}
