//! # 像素-角度坐标换算
//!
//! 以选定的峰值像素为参考，把探测器像素位置换算为衍射角 θ。
//!
//! ## 公式
//! Δθ = arctan(pixel_pitch / slit_distance)
//! θᵢ = (pᵢ - p_peak) · Δθ
//!
//! ## 依赖关系
//! - 被 `commands/` 调用
//! - 使用 `models/config.rs` 的 DetectorGeometry

use crate::models::DetectorGeometry;

/// 像素位置换算为角度 (rad)
pub fn pixel_to_theta(geometry: &DetectorGeometry, pixel_values: &[f64], peak_pixel: f64) -> Vec<f64> {
    let step = geometry.angular_step();

    pixel_values
        .iter()
        .map(|&p| (p - peak_pixel) * step)
        .collect()
}

/// 最高强度的下标（并列时取第一个）
pub fn max_peak_index(intensities: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in intensities.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> DetectorGeometry {
        DetectorGeometry::new(8e-6, 0.75, 3678).unwrap()
    }

    #[test]
    fn test_zero_at_peak_and_monotonic() {
        let pixels: Vec<f64> = (0..100).map(|i| i as f64 * 1.5).collect();
        let peak = pixels[40];
        let theta = pixel_to_theta(&geometry(), &pixels, peak);

        assert_eq!(theta.len(), pixels.len());
        for (i, t) in theta.iter().enumerate() {
            assert_eq!(*t == 0.0, pixels[i] == peak);
        }
        assert!(theta.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_angular_step_scaling() {
        let g = geometry();
        let theta = pixel_to_theta(&g, &[10.0, 12.0], 10.0);
        assert!((theta[1] - 2.0 * (8e-6_f64 / 0.75).atan()).abs() < 1e-18);
    }

    #[test]
    fn test_max_peak_index() {
        assert_eq!(max_peak_index(&[1.0, 5.0, 3.0, 5.0]), Some(1));
        assert_eq!(max_peak_index(&[f64::NAN, 2.0, 1.0]), Some(1));
        assert_eq!(max_peak_index(&[]), None);
    }
}
