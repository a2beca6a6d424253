//! # 探测器几何与运行配置
//!
//! 每次运行构造一次的不可变配置，按引用传入各计算组件。
//!
//! ## 依赖关系
//! - 由 `cli/mod.rs` 的 `GeometryArgs` 构造
//! - 被 `diffraction/` 和 `commands/` 使用

use crate::error::{Result, SlitfitError};

/// 探测器几何
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorGeometry {
    /// 像素宽度 (m)
    pub pixel_pitch: f64,
    /// 狭缝到屏幕距离 (m)
    pub slit_distance: f64,
    /// CCD 像素总数
    pub pixel_count: usize,
}

impl DetectorGeometry {
    /// 创建并校验探测器几何
    pub fn new(pixel_pitch: f64, slit_distance: f64, pixel_count: usize) -> Result<Self> {
        Ok(Self {
            pixel_pitch: SlitfitError::check_positive("pixel_pitch", pixel_pitch)?,
            slit_distance: SlitfitError::check_positive("slit_distance", slit_distance)?,
            pixel_count,
        })
    }

    /// 单个像素对应的角度步长 (rad)
    pub fn angular_step(&self) -> f64 {
        (self.pixel_pitch / self.slit_distance).atan()
    }
}

/// 衍射分析配置
#[derive(Debug, Clone, PartialEq)]
pub struct DiffractionConfig {
    /// 激光波长 (m)
    pub wavelength: f64,
    /// 探测器几何
    pub geometry: DetectorGeometry,
    /// 理论极小值数量 N（每侧）
    pub minima_count: usize,
    /// 相邻极小值的最小采样间隔
    pub minima_distance: usize,
    /// 极小值级次的不确定度
    pub order_uncertainty: f64,
    /// 极小值角度的不确定度 (rad)
    pub theta_uncertainty: f64,
    /// 标称狭缝宽度的不确定度 (m)
    pub slit_width_uncertainty: f64,
}

impl DiffractionConfig {
    pub const DEFAULT_WAVELENGTH: f64 = 635e-9;
    pub const DEFAULT_PIXEL_PITCH: f64 = 8e-6;
    pub const DEFAULT_SLIT_DISTANCE: f64 = 75e-2;
    pub const DEFAULT_PIXEL_COUNT: usize = 3678;
    pub const DEFAULT_MINIMA_COUNT: usize = 32;
    pub const DEFAULT_MINIMA_DISTANCE: usize = 80;
    pub const DEFAULT_ORDER_UNCERTAINTY: f64 = 0.05;
    pub const DEFAULT_THETA_UNCERTAINTY: f64 = 1e-5;
    pub const DEFAULT_SLIT_WIDTH_UNCERTAINTY: f64 = 1e-6;

    /// 创建并校验配置
    pub fn new(
        wavelength: f64,
        geometry: DetectorGeometry,
        minima_count: usize,
        minima_distance: usize,
        order_uncertainty: f64,
        theta_uncertainty: f64,
        slit_width_uncertainty: f64,
    ) -> Result<Self> {
        if minima_count == 0 {
            return Err(SlitfitError::InvalidParameter {
                name: "minima_count".to_string(),
                value: 0.0,
            });
        }
        if minima_distance == 0 {
            return Err(SlitfitError::InvalidParameter {
                name: "minima_distance".to_string(),
                value: 0.0,
            });
        }

        Ok(Self {
            wavelength: SlitfitError::check_positive("wavelength", wavelength)?,
            geometry,
            minima_count,
            minima_distance,
            order_uncertainty: SlitfitError::check_positive(
                "order_uncertainty",
                order_uncertainty,
            )?,
            theta_uncertainty: SlitfitError::check_positive(
                "theta_uncertainty",
                theta_uncertainty,
            )?,
            slit_width_uncertainty: SlitfitError::check_positive(
                "slit_width_uncertainty",
                slit_width_uncertainty,
            )?,
        })
    }
}

impl Default for DiffractionConfig {
    fn default() -> Self {
        DiffractionConfig {
            wavelength: Self::DEFAULT_WAVELENGTH,
            geometry: DetectorGeometry {
                pixel_pitch: Self::DEFAULT_PIXEL_PITCH,
                slit_distance: Self::DEFAULT_SLIT_DISTANCE,
                pixel_count: Self::DEFAULT_PIXEL_COUNT,
            },
            minima_count: Self::DEFAULT_MINIMA_COUNT,
            minima_distance: Self::DEFAULT_MINIMA_DISTANCE,
            order_uncertainty: Self::DEFAULT_ORDER_UNCERTAINTY,
            theta_uncertainty: Self::DEFAULT_THETA_UNCERTAINTY,
            slit_width_uncertainty: Self::DEFAULT_SLIT_WIDTH_UNCERTAINTY,
        }
    }
}
