//! # Savitzky-Golay 平滑
//!
//! 在寻找极小值之前抑制传感器噪声。每个窗口内做最小二乘多项式拟合，
//! 取窗口中心处的拟合值；两端使用首/末完整窗口的拟合多项式插值。
//!
//! ## 依赖关系
//! - 被 `commands/calibrate.rs` 调用
//! - 使用 `nalgebra` 计算投影矩阵 (AᵀA)⁻¹Aᵀ

use crate::error::{Result, SlitfitError};

use nalgebra::DMatrix;

/// Savitzky-Golay 滤波器
#[derive(Debug, Clone)]
pub struct SavitzkyGolay {
    window: usize,
    order: usize,
    /// (order+1) × window 投影矩阵
    projection: DMatrix<f64>,
}

impl SavitzkyGolay {
    /// 创建滤波器，窗口长度须为奇数且大于多项式阶数
    pub fn new(window: usize, order: usize) -> Result<Self> {
        if window % 2 == 0 || window <= order {
            return Err(SlitfitError::InvalidParameter {
                name: format!("smoothing window (order {})", order),
                value: window as f64,
            });
        }

        let half = (window / 2) as f64;
        let design = DMatrix::from_fn(window, order + 1, |i, j| (i as f64 - half).powi(j as i32));
        let normal = design.transpose() * &design;
        let inverse = normal.try_inverse().ok_or_else(|| {
            SlitfitError::FitFailure("singular Savitzky-Golay design matrix".to_string())
        })?;

        Ok(Self {
            window,
            order,
            projection: inverse * design.transpose(),
        })
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// 平滑数据，输出与输入等长
    pub fn apply(&self, data: &[f64]) -> Result<Vec<f64>> {
        let n = data.len();
        if n < self.window {
            return Err(SlitfitError::InvalidArgument(format!(
                "series of {} points is shorter than the smoothing window {}",
                n, self.window
            )));
        }

        let half = self.window / 2;
        let center = self.projection.row(0);
        let mut out = vec![0.0; n];

        for i in half..n - half {
            out[i] = (0..self.window)
                .map(|k| center[k] * data[i - half + k])
                .sum::<f64>();
        }

        // 两端：用首/末窗口的多项式在对应偏移处取值
        let head = self.fit_window(&data[..self.window]);
        for (i, value) in out.iter_mut().enumerate().take(half) {
            *value = evaluate(&head, i as f64 - half as f64);
        }

        let tail = self.fit_window(&data[n - self.window..]);
        for i in n - half..n {
            out[i] = evaluate(&tail, (i - (n - self.window)) as f64 - half as f64);
        }

        Ok(out)
    }

    /// 窗口内的多项式系数（以窗口中心为原点）
    fn fit_window(&self, window: &[f64]) -> Vec<f64> {
        (0..=self.order)
            .map(|j| {
                self.projection
                    .row(j)
                    .iter()
                    .zip(window)
                    .map(|(c, y)| c * y)
                    .sum::<f64>()
            })
            .collect()
    }
}

/// Horner 求值
fn evaluate(coefficients: &[f64], t: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * t + c)
}
