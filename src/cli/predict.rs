//! # predict 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/predict.rs`

use super::GeometryArgs;

use clap::Args;
use std::path::PathBuf;

/// predict 子命令参数
#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Slit width in µm
    #[arg(long)]
    pub slit_width: f64,

    /// Number of table rows to print (positive orders only)
    #[arg(long, default_value_t = 10)]
    pub top_n: usize,

    /// Export the full minima list to CSV
    #[arg(long)]
    pub output_csv: Option<PathBuf>,

    #[command(flatten)]
    pub geometry: GeometryArgs,
}
