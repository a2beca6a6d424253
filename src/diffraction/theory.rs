//! # 单缝夫琅禾费衍射理论模型
//!
//! ## 公式
//! - β = (k · b · sin θ) / 2，k = 2π/λ
//! - I(θ) = I₀ · (sin β / β)² + 背景
//! - 极小值（小角近似）：θₙ = n · λ / b，n ∈ [-N, N] \ {0}
//!
//! 极小值采用线性小角近似而非 arcsin 精确形式，仅适用于小 θ。
//!
//! ## 依赖关系
//! - 被 `commands/` 调用
//! - 使用 `models/config.rs`, `models/series.rs`

use crate::error::{Result, SlitfitError};
use crate::models::{DiffractionConfig, MinimaSet};

use std::f64::consts::PI;

/// β 相位角
pub fn beta(theta: f64, slit_width: f64, wavelength: f64) -> f64 {
    let k = 2.0 * PI / wavelength;
    k * slit_width * theta.sin() / 2.0
}

/// 给定 β 的衍射强度
pub fn intensity(i0: f64, beta: f64, background: f64) -> f64 {
    if beta == 0.0 {
        return i0 + background;
    }
    let sinc = beta.sin() / beta;
    i0 * sinc * sinc + background
}

/// 在角度网格上计算理论衍射图样
pub fn diffraction_pattern(
    config: &DiffractionConfig,
    slit_width: f64,
    i0: f64,
    background: f64,
    thetas: &[f64],
) -> Result<Vec<f64>> {
    let slit_width = SlitfitError::check_positive("slit_width", slit_width)?;

    Ok(thetas
        .iter()
        .map(|&theta| intensity(i0, beta(theta, slit_width, config.wavelength), background))
        .collect())
}

/// 预测理论极小值（级次升序，不含 0，共 2N 个）
pub fn predict_minima(config: &DiffractionConfig, slit_width: f64) -> Result<MinimaSet> {
    let slit_width = SlitfitError::check_positive("slit_width", slit_width)?;
    let n = config.minima_count as i32;

    let orders: Vec<i32> = (-n..=n).filter(|&i| i != 0).collect();
    let angles = orders
        .iter()
        .map(|&i| i as f64 * config.wavelength / slit_width)
        .collect();

    Ok(MinimaSet {
        orders,
        angles,
        indices: Vec::new(),
    })
}

/// 由理论极小值给出斜率初值（一级极小角度）
pub fn initial_slope(config: &DiffractionConfig, slit_width: f64) -> Result<f64> {
    let predicted = predict_minima(config, slit_width)?;
    predicted
        .angle_of(1)
        .ok_or_else(|| SlitfitError::EmptyResult("no first-order minimum predicted".to_string()))
}

/// 角度网格（等间距，含端点）
pub fn linspace(start: f64, end: f64, steps: usize) -> Vec<f64> {
    match steps {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let dx = (end - start) / (steps - 1) as f64;
            (0..steps).map(|i| start + i as f64 * dx).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predict_minima_symmetric() {
        let config = DiffractionConfig::default();
        let set = predict_minima(&config, 79e-6).unwrap();

        assert_eq!(set.len(), 2 * config.minima_count);
        assert!(!set.orders.contains(&0));
        assert!(set.orders.windows(2).all(|w| w[1] > w[0]));

        for i in 1..=config.minima_count as i32 {
            let pos = set.angle_of(i).unwrap();
            let neg = set.angle_of(-i).unwrap();
            assert_eq!(neg, -pos);
        }

        let first = set.angle_of(1).unwrap();
        assert!((first - 635e-9 / 79e-6).abs() < 1e-15);
    }

    #[test]
    fn test_predict_minima_rejects_bad_width() {
        let config = DiffractionConfig::default();
        assert!(matches!(
            predict_minima(&config, 0.0),
            Err(SlitfitError::InvalidParameter { .. })
        ));
        assert!(predict_minima(&config, -1e-6).is_err());
    }

    #[test]
    fn test_intensity_model() {
        assert_eq!(intensity(10.0, 0.0, 0.0), 10.0);
        assert_eq!(intensity(10.0, 0.0, 65.6), 75.6);
        assert!(intensity(10.0, PI, 0.0).abs() < 1e-20);

        // β = π 对应一级极小
        let config = DiffractionConfig::default();
        let b = 79e-6;
        let theta = (config.wavelength / b).asin();
        assert!((beta(theta, b, config.wavelength) - PI).abs() < 1e-12);
    }

    #[test]
    fn test_diffraction_pattern_peak() {
        let config = DiffractionConfig::default();
        let thetas = linspace(-0.02, 0.02, 401);
        let pattern = diffraction_pattern(&config, 79e-6, 5.0, 0.0, &thetas).unwrap();

        assert_eq!(pattern.len(), 401);
        assert!((pattern[200] - 5.0).abs() < 1e-12);
        assert!(pattern.iter().all(|&i| (0.0..=5.0 + 1e-12).contains(&i)));
    }

    #[test]
    fn test_linspace() {
        assert_eq!(linspace(0.0, 1.0, 3), vec![0.0, 0.5, 1.0]);
        assert_eq!(linspace(2.0, 3.0, 1), vec![2.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }
}
