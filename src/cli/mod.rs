//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `calibrate`: 批量提取极小值并标定狭缝宽度
//! - `pattern`: 理论强度图样与测量数据对比
//! - `predict`: 打印理论极小值
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: calibrate, pattern, predict

pub mod calibrate;
pub mod pattern;
pub mod predict;

use crate::error::Result;
use crate::models::{DetectorGeometry, DiffractionConfig};
use crate::plot::ChartOptions;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// slitfit - 单缝衍射极小值标定工具
#[derive(Parser)]
#[command(name = "slitfit")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(
    about = "Single-slit diffraction minima extraction and slit-width calibration",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Extract minima, fit slit widths and compare them against nominal widths
    Calibrate(calibrate::CalibrateArgs),

    /// Overlay the theoretical intensity pattern on a measured trace
    Pattern(pattern::PatternArgs),

    /// Print the theoretical minima for a slit width
    Predict(predict::PredictArgs),
}

// ─────────────────────────────────────────────────────────────
// 共享参数
// ─────────────────────────────────────────────────────────────

/// 物理常量与拟合不确定度
#[derive(Args, Debug, Clone)]
pub struct GeometryArgs {
    /// Laser wavelength (m)
    #[arg(long, env = "SLITFIT_WAVELENGTH", default_value_t = DiffractionConfig::DEFAULT_WAVELENGTH)]
    pub wavelength: f64,

    /// Detector pixel pitch (m)
    #[arg(long, env = "SLITFIT_PIXEL_PITCH", default_value_t = DiffractionConfig::DEFAULT_PIXEL_PITCH)]
    pub pixel_pitch: f64,

    /// Slit-to-screen distance (m)
    #[arg(long, env = "SLITFIT_SLIT_DISTANCE", default_value_t = DiffractionConfig::DEFAULT_SLIT_DISTANCE)]
    pub slit_distance: f64,

    /// Number of detector pixels
    #[arg(long, env = "SLITFIT_PIXEL_COUNT", default_value_t = DiffractionConfig::DEFAULT_PIXEL_COUNT)]
    pub pixel_count: usize,

    /// Number of theoretical minima on each side of the central maximum
    #[arg(long, env = "SLITFIT_MINIMA_COUNT", default_value_t = DiffractionConfig::DEFAULT_MINIMA_COUNT)]
    pub minima_count: usize,

    /// Minimum separation between accepted minima (samples)
    #[arg(long, env = "SLITFIT_MINIMA_DISTANCE", default_value_t = DiffractionConfig::DEFAULT_MINIMA_DISTANCE)]
    pub minima_distance: usize,

    /// Uncertainty assigned to every minima order
    #[arg(long, env = "SLITFIT_ORDER_UNCERTAINTY", default_value_t = DiffractionConfig::DEFAULT_ORDER_UNCERTAINTY)]
    pub order_uncertainty: f64,

    /// Uncertainty assigned to every minima angle (rad)
    #[arg(long, env = "SLITFIT_THETA_UNCERTAINTY", default_value_t = DiffractionConfig::DEFAULT_THETA_UNCERTAINTY)]
    pub theta_uncertainty: f64,

    /// Uncertainty of the nominal slit widths (m)
    #[arg(long, env = "SLITFIT_SLIT_WIDTH_UNCERTAINTY", default_value_t = DiffractionConfig::DEFAULT_SLIT_WIDTH_UNCERTAINTY)]
    pub slit_width_uncertainty: f64,
}

impl GeometryArgs {
    /// 构造并校验运行配置
    pub fn to_config(&self) -> Result<DiffractionConfig> {
        let geometry =
            DetectorGeometry::new(self.pixel_pitch, self.slit_distance, self.pixel_count)?;
        DiffractionConfig::new(
            self.wavelength,
            geometry,
            self.minima_count,
            self.minima_distance,
            self.order_uncertainty,
            self.theta_uncertainty,
            self.slit_width_uncertainty,
        )
    }
}

/// 图像输出格式
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum ImageFormat {
    /// PNG image
    #[default]
    Png,
    /// SVG vector image
    Svg,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }
}

/// 图表尺寸与格式
#[derive(Args, Debug, Clone)]
pub struct ChartArgs {
    /// Image format for charts
    #[arg(long, value_enum, default_value = "png")]
    pub format: ImageFormat,

    /// Figure width in pixels (for PNG) or points (for SVG)
    #[arg(long, default_value_t = 1200)]
    pub width: u32,

    /// Figure height in pixels (for PNG) or points (for SVG)
    #[arg(long, default_value_t = 800)]
    pub height: u32,
}

impl ChartArgs {
    pub fn options(&self) -> ChartOptions {
        ChartOptions {
            width: self.width,
            height: self.height,
            use_svg: self.format == ImageFormat::Svg,
        }
    }
}
