//! # 理论图样对比图
//!
//! 将理论强度曲线叠加在测量曲线上，横轴为衍射角（度）。
//!
//! ## 依赖关系
//! - 被 `commands/pattern.rs` 调用

use super::{padded_range, plot_err, ChartOptions};
use crate::error::Result;

use plotters::prelude::*;
use std::path::Path;

/// 生成理论/测量强度对比图，数据点均为 (θ°, 强度)
pub fn generate_pattern_plot(
    model: &[(f64, f64)],
    measured: &[(f64, f64)],
    title: &str,
    output_path: &Path,
    options: ChartOptions,
) -> Result<()> {
    render!(options, output_path, draw_pattern_chart, model, measured, title)
}

fn draw_pattern_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    model: &[(f64, f64)],
    measured: &[(f64, f64)],
    title: &str,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).map_err(plot_err)?;

    let x_range = padded_range(model.iter().chain(measured).map(|(x, _)| *x));
    let y_range = padded_range(model.iter().chain(measured).map(|(_, y)| *y));

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 28).into_font())
        .margin(30)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc("θ (°)")
        .y_desc("Intensity (V)")
        .x_label_style(("sans-serif", 16))
        .y_label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(plot_err)?;

    let measured_color = RGBColor(0, 102, 204);
    chart
        .draw_series(LineSeries::new(
            measured.iter().copied(),
            measured_color.stroke_width(1),
        ))
        .map_err(plot_err)?
        .label("Measured")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], measured_color));

    let model_color = RGBColor(204, 51, 51);
    chart
        .draw_series(LineSeries::new(
            model.iter().copied(),
            model_color.stroke_width(2),
        ))
        .map_err(plot_err)?
        .label("Fraunhofer model")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], model_color));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(plot_err)?;

    Ok(())
}
