//! # slitfit - 单缝夫琅禾费衍射极小值标定工具
//!
//! 从探测器强度曲线中提取衍射极小值，用双侧不确定度正交距离回归拟合
//! 级次-角度关系，反推狭缝宽度，并与标称宽度做跨样本比较。
//!
//! ## 子命令
//! - `calibrate` - 批量提取极小值并标定狭缝宽度
//! - `pattern`   - 理论强度图样与测量曲线叠加
//! - `predict`   - 打印理论极小值
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/          (命令行参数定义)
//!   ├── commands/     (命令执行逻辑)
//!   │     ├── batch/       (样本收集与顺序执行)
//!   │     ├── parsers/     (数据表、清单、文件名解析)
//!   │     ├── diffraction/ (数值核心)
//!   │     ├── plot/        (图表)
//!   │     └── models/      (数据模型)
//!   ├── utils/        (工具函数)
//!   └── error.rs      (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod diffraction;
mod error;
mod models;
mod parsers;
mod plot;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
