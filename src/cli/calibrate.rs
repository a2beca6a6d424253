//! # calibrate 子命令 CLI 定义
//!
//! 批量处理样本：提取极小值、ODR 拟合、跨样本汇总。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/calibrate.rs`

use super::{ChartArgs, GeometryArgs};
use crate::diffraction::OrderRule;
use crate::models::FitModel;

use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// 输入横坐标的含义
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum Reference {
    /// Column 0 holds pixel positions, converted to angles about the global maximum
    #[default]
    Peak,
    /// Column 0 already holds diffraction angles (rad)
    Angle,
}

impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reference::Peak => write!(f, "peak"),
            Reference::Angle => write!(f, "angle"),
        }
    }
}

/// calibrate 子命令参数
#[derive(Args, Debug)]
pub struct CalibrateArgs {
    /// Input: data file or directory of data files (ignored with --manifest)
    #[arg(required_unless_present = "manifest")]
    pub input: Option<PathBuf>,

    /// CSV manifest listing samples (columns: path, slit_width_um[, id])
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Glob pattern for data files in directory mode (comma separated)
    #[arg(long, default_value = "*.txt,*.dat")]
    pub pattern: String,

    /// Recurse into subdirectories
    #[arg(long, default_value_t = false)]
    pub recursive: bool,

    /// Output directory for charts
    #[arg(short, long, default_value = "calibration")]
    pub output_dir: PathBuf,

    /// Linear model relating minima order to angle
    #[arg(long, value_enum, default_value = "proportional")]
    pub model: FitModel,

    /// Order assignment rule for detected minima
    #[arg(long, value_enum, default_value = "centered")]
    pub orders: OrderRule,

    /// Meaning of column 0 in the data files
    #[arg(long, value_enum, default_value = "peak")]
    pub reference: Reference,

    /// Savitzky-Golay window length (odd, 0 disables smoothing)
    #[arg(long, default_value_t = 0)]
    pub smooth_window: usize,

    /// Savitzky-Golay polynomial order
    #[arg(long, default_value_t = 3)]
    pub smooth_order: usize,

    /// Write per-sample calibration results to this CSV file
    #[arg(long)]
    pub results_csv: Option<PathBuf>,

    /// Skip chart generation
    #[arg(long, default_value_t = false)]
    pub no_plot: bool,

    #[command(flatten)]
    pub geometry: GeometryArgs,

    #[command(flatten)]
    pub chart: ChartArgs,
}
