//! # 强度序列与极小值集合
//!
//! ## 依赖关系
//! - 被 `parsers/data.rs` 生成
//! - 被 `diffraction/` 和 `plot/` 使用

use crate::error::{Result, SlitfitError};

/// 测量强度序列 (位置, 强度)，位置严格递增
#[derive(Debug, Clone, PartialEq)]
pub struct IntensitySeries {
    /// 像素位置或已换算的角度
    pub positions: Vec<f64>,
    /// 测量强度 (V)
    pub intensities: Vec<f64>,
}

impl IntensitySeries {
    /// 创建序列，要求两列等长且位置严格递增
    pub fn new(positions: Vec<f64>, intensities: Vec<f64>) -> Result<Self> {
        if positions.len() != intensities.len() {
            return Err(SlitfitError::InvalidArgument(format!(
                "positions ({}) and intensities ({}) differ in length",
                positions.len(),
                intensities.len()
            )));
        }
        if let Some(i) = positions.windows(2).position(|w| w[1] <= w[0]) {
            return Err(SlitfitError::InvalidArgument(format!(
                "positions must be strictly increasing (row {})",
                i + 1
            )));
        }
        Ok(Self {
            positions,
            intensities,
        })
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// 极小值集合：级次 n（不含 0）与对应角度
#[derive(Debug, Clone, PartialEq)]
pub struct MinimaSet {
    /// 级次，升序
    pub orders: Vec<i32>,
    /// 对应角度 (rad)
    pub angles: Vec<f64>,
    /// 在原始序列中的下标（理论极小值为空）
    pub indices: Vec<usize>,
}

impl MinimaSet {
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// 级次转为实数（用于回归）
    pub fn orders_f64(&self) -> Vec<f64> {
        self.orders.iter().map(|&n| n as f64).collect()
    }

    /// 查找指定级次的角度
    pub fn angle_of(&self, order: i32) -> Option<f64> {
        self.orders
            .iter()
            .position(|&n| n == order)
            .map(|i| self.angles[i])
    }
}
