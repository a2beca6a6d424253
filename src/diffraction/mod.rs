//! # 衍射分析模块
//!
//! 极小值提取与标定的数值核心。
//!
//! ## 子模块
//! - `coordinates`: 像素到衍射角换算
//! - `theory`: 理论强度模型与理论极小值
//! - `smoothing`: Savitzky-Golay 平滑
//! - `minima`: 测量极小值提取与级次分配
//! - `odr`: 双侧不确定度正交距离回归
//! - `aggregate`: 跨样本最佳拟合直线
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `models/` 数据模型

pub mod aggregate;
pub mod coordinates;
pub mod minima;
pub mod odr;
pub mod smoothing;
pub mod theory;

pub use aggregate::CrossSampleFit;
pub use coordinates::{max_peak_index, pixel_to_theta};
pub use minima::{find_minima, OrderRule};
pub use odr::solve_minima_uncertainty;
pub use smoothing::SavitzkyGolay;
pub use theory::predict_minima;
