//! # 跨样本汇总
//!
//! 对标定宽度与标称宽度做一次多项式最小二乘拟合，评估模型与测量的偏离。
//!
//! ## 依赖关系
//! - 被 `commands/calibrate.rs` 调用
//! - 使用 `models/calibration.rs` 的 SampleRecord

use crate::diffraction::theory::linspace;
use crate::error::{Result, SlitfitError};
use crate::models::SampleRecord;

/// 拟合直线的采样点数
pub const FIT_LINE_POINTS: usize = 100;

/// 标定宽度-标称宽度的最佳拟合直线
#[derive(Debug, Clone, PartialEq)]
pub struct CrossSampleFit {
    pub slope: f64,
    pub intercept: f64,
    /// [min(nominal), max(nominal)] 上的拟合直线
    pub curve: Vec<(f64, f64)>,
}

impl CrossSampleFit {
    /// 由并行序列拟合
    pub fn fit(nominal: &[f64], calibrated: &[f64]) -> Result<Self> {
        if nominal.len() != calibrated.len() {
            return Err(SlitfitError::InvalidArgument(format!(
                "nominal ({}) and calibrated ({}) differ in length",
                nominal.len(),
                calibrated.len()
            )));
        }
        if nominal.len() < 2 {
            return Err(SlitfitError::UnderdeterminedFit {
                required: 2,
                found: nominal.len(),
            });
        }

        let n = nominal.len() as f64;
        let mean_x = nominal.iter().sum::<f64>() / n;
        let mean_y = calibrated.iter().sum::<f64>() / n;

        let sxx: f64 = nominal.iter().map(|x| (x - mean_x).powi(2)).sum();
        let sxy: f64 = nominal
            .iter()
            .zip(calibrated)
            .map(|(x, y)| (x - mean_x) * (y - mean_y))
            .sum();

        if sxx <= (f64::EPSILON * mean_x).powi(2) * n {
            return Err(SlitfitError::FitFailure(
                "all nominal slit widths are identical".to_string(),
            ));
        }

        let slope = sxy / sxx;
        let intercept = mean_y - slope * mean_x;

        let x_min = nominal.iter().copied().fold(f64::INFINITY, f64::min);
        let x_max = nominal.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let curve = linspace(x_min, x_max, FIT_LINE_POINTS)
            .into_iter()
            .map(|x| (x, slope * x + intercept))
            .collect();

        Ok(Self {
            slope,
            intercept,
            curve,
        })
    }

    /// 由样本记录拟合（按记录顺序）
    pub fn from_records(records: &[SampleRecord]) -> Result<Self> {
        let nominal: Vec<f64> = records.iter().map(|r| r.nominal_width).collect();
        let calibrated: Vec<f64> = records.iter().map(|r| r.calibrated_width).collect();
        Self::fit(&nominal, &calibrated)
    }
}
