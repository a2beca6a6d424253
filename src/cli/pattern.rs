//! # pattern 子命令 CLI 定义
//!
//! 计算理论衍射强度图样并与测量曲线叠加绘制。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/pattern.rs`

use super::{ChartArgs, GeometryArgs};

use clap::Args;
use std::path::PathBuf;

/// pattern 子命令参数
#[derive(Args, Debug)]
pub struct PatternArgs {
    /// Measured data file (pixel position, intensity)
    pub input: PathBuf,

    /// Output chart path (default: diffraction_pattern.<format>)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Slit width in µm (default: parsed from the file name suffix)
    #[arg(long)]
    pub slit_width: Option<f64>,

    /// Half range of the model angle grid (degrees)
    #[arg(long, default_value_t = 2.0)]
    pub max_theta: f64,

    /// Number of points in the model angle grid
    #[arg(long, default_value_t = 500)]
    pub theta_steps: usize,

    /// Constant background added to the model intensity (V)
    #[arg(long, default_value_t = 0.0)]
    pub background: f64,

    /// Title for the plot (default: file name)
    #[arg(long)]
    pub title: Option<String>,

    #[command(flatten)]
    pub geometry: GeometryArgs,

    #[command(flatten)]
    pub chart: ChartArgs,
}

impl PatternArgs {
    /// 输出路径；未指定时扩展名随图像格式
    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            PathBuf::from(format!(
                "diffraction_pattern.{}",
                self.chart.format.extension()
            ))
        })
    }
}
