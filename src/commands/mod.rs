//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `batch/`, `diffraction/`, `parsers/`, `plot/`, `utils/`
//! - 子模块: calibrate, pattern, predict

pub mod calibrate;
pub mod pattern;
pub mod predict;

use crate::cli::Commands;
use crate::error::Result;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Calibrate(args) => calibrate::execute(args),
        Commands::Pattern(args) => pattern::execute(args),
        Commands::Predict(args) => predict::execute(args),
    }
}
