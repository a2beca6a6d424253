//! # 图表生成模块
//!
//! 使用 `plotters` 生成单样本标定图、跨样本汇总图和理论图样对比图。
//!
//! ## 功能
//! - 支持 PNG 和 SVG 输出
//! - 绘图逻辑对 `DrawingBackend` 泛型，后端按格式选择
//! - 每次调用独立创建并释放画布
//!
//! ## 依赖关系
//! - 被 `commands/calibrate.rs`, `commands/pattern.rs` 调用
//! - 子模块: calibration, pattern

use crate::error::SlitfitError;

/// 图像输出选项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartOptions {
    pub width: u32,
    pub height: u32,
    pub use_svg: bool,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 800,
            use_svg: false,
        }
    }
}

impl ChartOptions {
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// plotters 错误统一映射
pub(crate) fn plot_err<E: std::fmt::Debug>(e: E) -> SlitfitError {
    SlitfitError::PlotError(format!("{:?}", e))
}

/// 数据范围，两端各留 5% 余量；空序列或常数序列给出单位宽度
pub(crate) fn padded_range(values: impl IntoIterator<Item = f64>) -> std::ops::Range<f64> {
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    if !min.is_finite() {
        return 0.0..1.0;
    }
    let span = max - min;
    if span <= 0.0 {
        let half = if min == 0.0 { 0.5 } else { min.abs() * 0.5 };
        return (min - half)..(max + half);
    }
    (min - 0.05 * span)..(max + 0.05 * span)
}

/// 按输出格式选择后端，调用泛型绘图函数并写盘
macro_rules! render {
    ($options:expr, $path:expr, $draw:ident, $($arg:expr),* $(,)?) => {{
        let options: $crate::plot::ChartOptions = $options;
        if options.use_svg {
            let root = ::plotters::prelude::SVGBackend::new($path, options.size()).into_drawing_area();
            $draw(&root, $($arg),*)?;
            root.present().map_err($crate::plot::plot_err)
        } else {
            let root = ::plotters::prelude::BitMapBackend::new($path, options.size()).into_drawing_area();
            $draw(&root, $($arg),*)?;
            root.present().map_err($crate::plot::plot_err)
        }
    }};
}

pub mod calibration;
pub mod pattern;

pub use calibration::{generate_aggregate_plot, generate_sample_plot, SampleChart};
pub use pattern::generate_pattern_plot;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_range() {
        let r = padded_range([0.0, 10.0]);
        assert!((r.start + 0.5).abs() < 1e-12);
        assert!((r.end - 10.5).abs() < 1e-12);

        let r = padded_range(Vec::<f64>::new());
        assert_eq!(r, 0.0..1.0);

        let r = padded_range([2.0, 2.0, f64::NAN]);
        assert!(r.start < 2.0 && r.end > 2.0);
    }
}
