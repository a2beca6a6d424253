//! # 标定图表
//!
//! - 单样本图：左侧为强度曲线及极小值标记，右侧为级次-角度散点、拟合直线与理论极小值
//! - 汇总图：标定宽度对标称宽度，带误差棒与最佳拟合直线
//!
//! ## 依赖关系
//! - 被 `commands/calibrate.rs` 调用
//! - 使用 `models/` 的 MinimaSet, CalibrationResult, SampleRecord

use super::{padded_range, plot_err, ChartOptions};
use crate::diffraction::CrossSampleFit;
use crate::error::Result;
use crate::models::{CalibrationResult, MinimaSet, SampleRecord};

use plotters::prelude::*;
use std::path::Path;

/// 米到微米
const UM: f64 = 1e6;

const TRACE_COLOR: RGBColor = RGBColor(0, 102, 204);
const MINIMA_COLOR: RGBColor = RGBColor(204, 51, 51);
const THEORY_COLOR: RGBColor = RGBColor(51, 153, 51);

/// 单样本图表数据
pub struct SampleChart<'a> {
    pub title: &'a str,
    pub thetas: &'a [f64],
    pub intensities: &'a [f64],
    pub minima: &'a MinimaSet,
    pub fit: &'a CalibrationResult,
    /// 以标称宽度预测的理论极小值
    pub predicted: Option<&'a MinimaSet>,
}

/// 生成单样本标定图
pub fn generate_sample_plot(
    chart: &SampleChart<'_>,
    output_path: &Path,
    options: ChartOptions,
) -> Result<()> {
    render!(options, output_path, draw_sample_chart, chart)
}

/// 生成跨样本汇总图
pub fn generate_aggregate_plot(
    records: &[SampleRecord],
    fit: &CrossSampleFit,
    nominal_uncertainty: f64,
    output_path: &Path,
    options: ChartOptions,
) -> Result<()> {
    render!(
        options,
        output_path,
        draw_aggregate_chart,
        records,
        fit,
        nominal_uncertainty,
    )
}

fn draw_sample_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    data: &SampleChart<'_>,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).map_err(plot_err)?;
    let root = root
        .titled(data.title, ("sans-serif", 28).into_font())
        .map_err(plot_err)?;
    let panels = root.split_evenly((1, 2));

    draw_trace_panel(&panels[0], data)?;
    draw_order_panel(&panels[1], data)?;
    Ok(())
}

/// 强度曲线与极小值位置
fn draw_trace_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    data: &SampleChart<'_>,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let x_range = padded_range(data.thetas.iter().copied());
    let y_range = padded_range(data.intensities.iter().copied());

    let mut chart = ChartBuilder::on(area)
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range, y_range)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc("θ (rad)")
        .y_desc("Intensity (V)")
        .x_label_formatter(&|v| format!("{:.4}", v))
        .x_label_style(("sans-serif", 14))
        .y_label_style(("sans-serif", 14))
        .axis_desc_style(("sans-serif", 16))
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(LineSeries::new(
            data.thetas
                .iter()
                .zip(data.intensities)
                .map(|(x, y)| (*x, *y)),
            TRACE_COLOR.stroke_width(1),
        ))
        .map_err(plot_err)?
        .label("Measured")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], TRACE_COLOR));

    chart
        .draw_series(
            data.minima
                .indices
                .iter()
                .filter_map(|&i| Some((*data.thetas.get(i)?, *data.intensities.get(i)?)))
                .map(|p| Circle::new(p, 4, MINIMA_COLOR.filled())),
        )
        .map_err(plot_err)?
        .label("Minima")
        .legend(|(x, y)| Circle::new((x + 10, y), 4, MINIMA_COLOR.filled()));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(plot_err)?;

    Ok(())
}

/// 级次-角度关系与拟合直线
fn draw_order_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    data: &SampleChart<'_>,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    let orders = data.minima.orders_f64();
    let order_range = padded_range(orders.iter().copied());
    let (n_lo, n_hi) = (order_range.start, order_range.end);

    // 理论极小值只显示落在测量级次范围内的部分
    let predicted: Vec<(f64, f64)> = data
        .predicted
        .map(|set| {
            set.orders
                .iter()
                .zip(&set.angles)
                .map(|(&n, &theta)| (n as f64, theta))
                .filter(|(n, _)| *n >= n_lo && *n <= n_hi)
                .collect()
        })
        .unwrap_or_default();

    let fit_line = [
        (n_lo, data.fit.model.evaluate(&data.fit.parameters, n_lo)),
        (n_hi, data.fit.model.evaluate(&data.fit.parameters, n_hi)),
    ];

    let y_range = padded_range(
        data.minima
            .angles
            .iter()
            .copied()
            .chain(predicted.iter().map(|(_, t)| *t))
            .chain(fit_line.iter().map(|(_, t)| *t)),
    );

    let mut chart = ChartBuilder::on(area)
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(order_range, y_range)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc("Minima order n")
        .y_desc("θ (rad)")
        .y_label_formatter(&|v| format!("{:.4}", v))
        .x_label_style(("sans-serif", 14))
        .y_label_style(("sans-serif", 14))
        .axis_desc_style(("sans-serif", 16))
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(LineSeries::new(
            fit_line.iter().copied(),
            TRACE_COLOR.stroke_width(2),
        ))
        .map_err(plot_err)?
        .label(match data.fit.intercept() {
            Some(c) => format!(
                "ODR fit: slope = {:.4e} ± {:.1e}, intercept = {:.2e}",
                data.fit.slope(),
                data.fit.slope_error(),
                c
            ),
            None => format!(
                "ODR fit: slope = {:.4e} ± {:.1e}",
                data.fit.slope(),
                data.fit.slope_error()
            ),
        })
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], TRACE_COLOR));

    chart
        .draw_series(
            orders
                .iter()
                .zip(&data.minima.angles)
                .map(|(&n, &theta)| Circle::new((n, theta), 4, MINIMA_COLOR.filled())),
        )
        .map_err(plot_err)?
        .label("Measured minima")
        .legend(|(x, y)| Circle::new((x + 10, y), 4, MINIMA_COLOR.filled()));

    if !predicted.is_empty() {
        chart
            .draw_series(
                predicted
                    .iter()
                    .map(|&p| Cross::new(p, 5, THEORY_COLOR.stroke_width(2))),
            )
            .map_err(plot_err)?
            .label("Theoretical minima")
            .legend(|(x, y)| Cross::new((x + 10, y), 5, THEORY_COLOR.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(plot_err)?;

    Ok(())
}

/// 标定宽度 vs 标称宽度（单位 µm）
fn draw_aggregate_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    records: &[SampleRecord],
    fit: &CrossSampleFit,
    nominal_uncertainty: f64,
) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).map_err(plot_err)?;

    let du = nominal_uncertainty * UM;
    let x_range = padded_range(records.iter().flat_map(|r| {
        let x = r.nominal_width * UM;
        [x - du, x + du]
    }));
    let y_range = padded_range(
        records
            .iter()
            .flat_map(|r| {
                let y = r.calibrated_width * UM;
                let dy = r.calibrated_sigma * UM;
                [y - dy, y + dy]
            })
            .chain(fit.curve.iter().map(|(_, y)| y * UM)),
    );

    let mut chart = ChartBuilder::on(root)
        .caption("Calibrated vs nominal slit width", ("sans-serif", 28).into_font())
        .margin(30)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_range, y_range)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc("Nominal slit width (µm)")
        .y_desc("Calibrated slit width (µm)")
        .x_label_style(("sans-serif", 16))
        .y_label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(LineSeries::new(
            fit.curve.iter().map(|(x, y)| (x * UM, y * UM)),
            TRACE_COLOR.stroke_width(2),
        ))
        .map_err(plot_err)?
        .label(format!(
            "Best fit: y = {:.4}·x + {:.3} µm",
            fit.slope,
            fit.intercept * UM
        ))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], TRACE_COLOR));

    chart
        .draw_series(records.iter().map(|r| {
            let (x, y) = (r.nominal_width * UM, r.calibrated_width * UM);
            ErrorBar::new_horizontal(y, x - du, x, x + du, MINIMA_COLOR.filled(), 8)
        }))
        .map_err(plot_err)?;

    chart
        .draw_series(records.iter().map(|r| {
            let (x, y) = (r.nominal_width * UM, r.calibrated_width * UM);
            let dy = r.calibrated_sigma * UM;
            ErrorBar::new_vertical(x, y - dy, y, y + dy, MINIMA_COLOR.filled(), 8)
        }))
        .map_err(plot_err)?
        .label("Samples")
        .legend(|(x, y)| Circle::new((x + 10, y), 4, MINIMA_COLOR.filled()));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(plot_err)?;

    Ok(())
}
