//! # 标定结果数据模型
//!
//! 单样本拟合结果与跨样本记录。
//!
//! ## 依赖关系
//! - 被 `diffraction/odr.rs` 生成
//! - 被 `commands/calibrate.rs`, `diffraction/aggregate.rs` 使用

use clap::ValueEnum;

/// 级次-角度线性模型
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum FitModel {
    /// theta = slope * n
    #[default]
    Proportional,
    /// theta = slope * n + intercept
    Affine,
}

impl FitModel {
    /// 自由参数个数
    pub fn parameter_count(&self) -> usize {
        match self {
            FitModel::Proportional => 1,
            FitModel::Affine => 2,
        }
    }

    /// 模型取值
    pub fn evaluate(&self, beta: &[f64], x: f64) -> f64 {
        match self {
            FitModel::Proportional => beta[0] * x,
            FitModel::Affine => beta[0] * x + beta[1],
        }
    }
}

impl std::fmt::Display for FitModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FitModel::Proportional => write!(f, "proportional"),
            FitModel::Affine => write!(f, "affine"),
        }
    }
}

/// 拟合结果：参数及其一倍标准差
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationResult {
    pub model: FitModel,
    /// [slope] 或 [slope, intercept]
    pub parameters: Vec<f64>,
    pub standard_errors: Vec<f64>,
    /// 收敛所用迭代次数
    pub iterations: usize,
    /// 加权残差平方和
    pub sum_of_squares: f64,
}

impl CalibrationResult {
    pub fn slope(&self) -> f64 {
        self.parameters[0]
    }

    pub fn slope_error(&self) -> f64 {
        self.standard_errors[0]
    }

    pub fn intercept(&self) -> Option<f64> {
        self.parameters.get(1).copied()
    }

    /// 由斜率 λ/b 反推狭缝宽度及其不确定度 (m)
    pub fn slit_width(&self, wavelength: f64) -> (f64, f64) {
        let slope = self.slope();
        let width = wavelength / slope;
        let sigma = wavelength * self.slope_error() / (slope * slope);
        (width, sigma.abs())
    }
}

/// 单个样本的标定记录
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRecord {
    pub sample: String,
    /// 标称狭缝宽度 (m)
    pub nominal_width: f64,
    /// 标定狭缝宽度 (m)
    pub calibrated_width: f64,
    /// 标定宽度不确定度 (m)
    pub calibrated_sigma: f64,
    pub slope: f64,
    pub slope_error: f64,
    pub minima_found: usize,
}
