//! # predict 子命令实现
//!
//! 打印给定狭缝宽度的理论极小值（小角近似 θₙ = nλ/b），可选导出 CSV。
//!
//! ## 依赖关系
//! - 使用 `cli/predict.rs` 定义的 PredictArgs
//! - 使用 `diffraction/theory.rs`

use crate::cli::predict::PredictArgs;
use crate::diffraction::predict_minima;
use crate::error::{Result, SlitfitError};
use crate::models::{DiffractionConfig, MinimaSet};
use crate::parsers::sample_name::MICROMETER;
use crate::utils::output;

use std::path::Path;
use tabled::{Table, Tabled};

/// 理论极小值在探测器上的位置
#[derive(Debug, Clone, PartialEq)]
pub struct PredictedMinimum {
    pub order: i32,
    /// 衍射角 (rad)
    pub theta: f64,
    /// 屏上位置 (m)，相对中央极大
    pub screen_offset: f64,
    /// 像素偏移，相对中央极大
    pub pixel_offset: f64,
}

/// 执行 predict
pub fn execute(args: PredictArgs) -> Result<()> {
    let config = args.geometry.to_config()?;
    let slit_width = SlitfitError::check_positive("slit_width", args.slit_width * MICROMETER)?;

    let minima = predict_minima(&config, slit_width)?;
    let rows = locate_minima(&config, &minima);

    print_minima_table(&rows, args.top_n, args.slit_width);

    if let Some(path) = &args.output_csv {
        save_minima_csv(&rows, path)?;
        output::print_success(&format!(
            "{} minima saved to '{}'",
            rows.len(),
            path.display()
        ));
    }

    Ok(())
}

/// 计算每个理论极小值的屏上位置与像素偏移
pub fn locate_minima(config: &DiffractionConfig, minima: &MinimaSet) -> Vec<PredictedMinimum> {
    let step = config.geometry.angular_step();
    minima
        .orders
        .iter()
        .zip(&minima.angles)
        .map(|(&order, &theta)| PredictedMinimum {
            order,
            theta,
            screen_offset: config.geometry.slit_distance * theta.tan(),
            pixel_offset: theta / step,
        })
        .collect()
}

fn print_minima_table(rows: &[PredictedMinimum], top_n: usize, slit_width_um: f64) {
    #[derive(Tabled)]
    struct MinimumRow {
        #[tabled(rename = "n")]
        order: i32,
        #[tabled(rename = "θ (mrad)")]
        theta: String,
        #[tabled(rename = "θ (°)")]
        degrees: String,
        #[tabled(rename = "Screen (mm)")]
        screen: String,
        #[tabled(rename = "Pixels")]
        pixels: String,
    }

    let table_rows: Vec<MinimumRow> = rows
        .iter()
        .filter(|m| m.order > 0)
        .take(top_n)
        .map(|m| MinimumRow {
            order: m.order,
            theta: format!("{:.4}", m.theta * 1e3),
            degrees: format!("{:.4}", m.theta.to_degrees()),
            screen: format!("{:.3}", m.screen_offset * 1e3),
            pixels: format!("{:.1}", m.pixel_offset),
        })
        .collect();

    output::print_header(&format!(
        "Theoretical Minima for b = {} µm (±n symmetric)",
        slit_width_um
    ));
    println!("{}", Table::new(&table_rows));
}

/// 保存全部极小值到 CSV
fn save_minima_csv(rows: &[PredictedMinimum], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    wtr.write_record(["order", "theta_rad", "screen_offset_m", "pixel_offset"])?;

    for m in rows {
        wtr.write_record(&[
            m.order.to_string(),
            format!("{:.10e}", m.theta),
            format!("{:.10e}", m.screen_offset),
            format!("{:.4}", m.pixel_offset),
        ])?;
    }

    wtr.flush().map_err(|e| SlitfitError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_minima() {
        let config = DiffractionConfig::default();
        let minima = predict_minima(&config, 79e-6).unwrap();
        let rows = locate_minima(&config, &minima);

        assert_eq!(rows.len(), 2 * config.minima_count);
        let first = rows.iter().find(|m| m.order == 1).unwrap();
        let theta = 635e-9 / 79e-6;
        assert!((first.theta - theta).abs() < 1e-15);
        assert!((first.screen_offset - 0.75 * theta.tan()).abs() < 1e-12);
        assert!((first.pixel_offset - theta / config.geometry.angular_step()).abs() < 1e-9);

        let mirror = rows.iter().find(|m| m.order == -1).unwrap();
        assert!((mirror.pixel_offset + first.pixel_offset).abs() < 1e-9);
    }

    #[test]
    fn test_save_minima_csv() {
        let config = DiffractionConfig::default();
        let minima = predict_minima(&config, 150e-6).unwrap();
        let rows = locate_minima(&config, &minima);

        let path = std::env::temp_dir().join("slitfit-predict-test.csv");
        save_minima_csv(&rows, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), rows.len() + 1);
        assert!(content.starts_with("order,theta_rad"));
    }
}
