//! # pattern 子命令实现
//!
//! 以测量曲线的最高点为 I₀ 和零角度参考，在 ±max_theta 度的角度网格上计算
//! 夫琅禾费理论强度，与测量曲线叠加绘图。
//!
//! ## 依赖关系
//! - 使用 `cli/pattern.rs` 定义的 PatternArgs
//! - 使用 `diffraction/theory.rs`, `diffraction/coordinates.rs`
//! - 使用 `plot/pattern.rs` 绘图

use crate::cli::pattern::PatternArgs;
use crate::diffraction::theory::{diffraction_pattern, linspace};
use crate::diffraction::{max_peak_index, pixel_to_theta};
use crate::error::{Result, SlitfitError};
use crate::models::{DiffractionConfig, IntensitySeries};
use crate::parsers::{self, sample_name::MICROMETER};
use crate::plot;
use crate::utils::output;

/// 理论曲线与测量曲线，均为 (θ°, 强度)
#[derive(Debug, Clone)]
pub struct PatternOverlay {
    pub model: Vec<(f64, f64)>,
    pub measured: Vec<(f64, f64)>,
}

/// 执行 pattern
pub fn execute(args: PatternArgs) -> Result<()> {
    output::print_header("Fraunhofer Pattern Overlay");

    let config = args.geometry.to_config()?;
    let slit_width = match args.slit_width {
        Some(um) => SlitfitError::check_positive("slit_width", um * MICROMETER)?,
        None => parsers::parse_slit_width(&args.input)?,
    };

    let series = parsers::read_series(&args.input)?;
    output::print_info(&format!(
        "Read {} points from '{}'",
        series.len(),
        args.input.display()
    ));
    output::print_value("Slit width", &format!("{:.1} µm", slit_width / MICROMETER));

    let overlay = build_overlay(
        &config,
        &series,
        slit_width,
        args.max_theta,
        args.theta_steps,
        args.background,
    )?;

    let title = args.title.clone().unwrap_or_else(|| {
        args.input
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("diffraction pattern")
            .to_string()
    });

    let output_path = args.output_path();
    plot::generate_pattern_plot(
        &overlay.model,
        &overlay.measured,
        &title,
        &output_path,
        args.chart.options(),
    )?;
    output::print_success(&format!("Pattern chart saved to '{}'", output_path.display()));

    Ok(())
}

/// 计算理论曲线并把测量曲线换算到角度
pub fn build_overlay(
    config: &DiffractionConfig,
    series: &IntensitySeries,
    slit_width: f64,
    max_theta_deg: f64,
    theta_steps: usize,
    background: f64,
) -> Result<PatternOverlay> {
    let max_theta_deg = SlitfitError::check_positive("max_theta", max_theta_deg)?;
    if theta_steps < 2 {
        return Err(SlitfitError::InvalidParameter {
            name: "theta_steps".to_string(),
            value: theta_steps as f64,
        });
    }

    let peak = max_peak_index(&series.intensities)
        .ok_or_else(|| SlitfitError::EmptyResult("no finite intensity values".to_string()))?;
    let i0 = series.intensities[peak] - background;

    let grid_deg = linspace(-max_theta_deg, max_theta_deg, theta_steps);
    let grid_rad: Vec<f64> = grid_deg.iter().map(|t| t.to_radians()).collect();
    let model_intensity = diffraction_pattern(config, slit_width, i0, background, &grid_rad)?;

    let measured_theta = pixel_to_theta(&config.geometry, &series.positions, series.positions[peak]);

    Ok(PatternOverlay {
        model: grid_deg.into_iter().zip(model_intensity).collect(),
        measured: measured_theta
            .into_iter()
            .map(f64::to_degrees)
            .zip(series.intensities.iter().copied())
            .collect(),
    })
}
