//! # 测量极小值提取
//!
//! 在（可能已平滑的）强度序列中寻找局部极小值，并按中心为零分配整数级次。
//!
//! ## 算法
//! 1. 对强度取负，寻找局部极大值（平台取第一个顶点）
//! 2. 按高度从高到低保留极值，剔除间隔小于 `minima_distance` 的邻近极值
//! 3. 分配级次（不含 0，见 [`OrderRule`]）
//!
//! ## 依赖关系
//! - 被 `commands/calibrate.rs` 调用
//! - 使用 `models/series.rs` 的 MinimaSet

use crate::error::{Result, SlitfitError};
use crate::models::MinimaSet;

use clap::ValueEnum;

/// 级次分配规则
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
pub enum OrderRule {
    /// Contiguous orders of length k centered on zero, extra order on the negative side
    #[default]
    Centered,
    /// Negative orders before the reference angle 0, positive orders after it
    PeakSplit,
}

impl std::fmt::Display for OrderRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderRule::Centered => write!(f, "centered"),
            OrderRule::PeakSplit => write!(f, "peak-split"),
        }
    }
}

/// 极小值提取器
#[derive(Debug, Clone, Copy)]
pub struct MinimaExtractor {
    /// 相邻极小值的最小下标间隔
    distance: usize,
    rule: OrderRule,
}

impl MinimaExtractor {
    pub fn new(distance: usize) -> Self {
        Self {
            distance: distance.max(1),
            rule: OrderRule::Centered,
        }
    }

    pub fn with_rule(mut self, rule: OrderRule) -> Self {
        self.rule = rule;
        self
    }

    /// 提取极小值；位置应为以中央极大为零点的角度
    pub fn find(&self, positions: &[f64], intensities: &[f64]) -> Result<MinimaSet> {
        if positions.len() != intensities.len() {
            return Err(SlitfitError::InvalidArgument(format!(
                "positions ({}) and intensities ({}) differ in length",
                positions.len(),
                intensities.len()
            )));
        }

        let inverted: Vec<f64> = intensities.iter().map(|v| -v).collect();
        let indices = find_peaks(&inverted, self.distance);

        let angles: Vec<f64> = indices.iter().map(|&i| positions[i]).collect();
        let orders = match self.rule {
            OrderRule::Centered => centered_orders(indices.len()),
            OrderRule::PeakSplit => split_orders(&angles, 0.0),
        };

        let set = MinimaSet {
            orders,
            angles,
            indices,
        };
        if set.is_empty() {
            return Err(SlitfitError::EmptyResult(
                "no intensity minima detected".to_string(),
            ));
        }
        Ok(set)
    }
}

/// 提取极小值并按给定规则分配级次
pub fn find_minima(
    positions: &[f64],
    intensities: &[f64],
    distance: usize,
    rule: OrderRule,
) -> Result<MinimaSet> {
    MinimaExtractor::new(distance)
        .with_rule(rule)
        .find(positions, intensities)
}

/// 局部极大值检测 + 最小间隔筛选，返回升序下标
pub fn find_peaks(values: &[f64], distance: usize) -> Vec<usize> {
    let peaks = local_maxima(values);
    if distance <= 1 || peaks.len() < 2 {
        return peaks;
    }

    // 高度降序；稳定排序保证并列时靠前的极值优先
    let mut priority: Vec<usize> = (0..peaks.len()).collect();
    priority.sort_by(|&a, &b| {
        values[peaks[b]]
            .partial_cmp(&values[peaks[a]])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep = vec![true; peaks.len()];
    for &j in &priority {
        if !keep[j] {
            continue;
        }

        let mut k = j;
        while k > 0 && peaks[j] - peaks[k - 1] < distance {
            keep[k - 1] = false;
            k -= 1;
        }

        let mut k = j + 1;
        while k < peaks.len() && peaks[k] - peaks[j] < distance {
            keep[k] = false;
            k += 1;
        }
    }

    peaks
        .into_iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(p))
        .collect()
}

/// 严格局部极大值（不含端点）；平台返回左端点
fn local_maxima(values: &[f64]) -> Vec<usize> {
    let n = values.len();
    let mut peaks = Vec::new();
    if n < 3 {
        return peaks;
    }

    let mut i = 1;
    while i < n - 1 {
        if values[i - 1] < values[i] {
            let mut ahead = i + 1;
            while ahead < n - 1 && values[ahead] == values[i] {
                ahead += 1;
            }
            if values[ahead] < values[i] {
                peaks.push(i);
                i = ahead;
                continue;
            }
        }
        i += 1;
    }

    peaks
}

/// k 个极小值的居中级次：⌈k/2⌉ 个负级次，⌊k/2⌋ 个正级次，跳过 0
pub fn centered_orders(k: usize) -> Vec<i32> {
    let negative = k.div_ceil(2) as i32;
    let positive = (k / 2) as i32;
    (-negative..=-1).chain(1..=positive).collect()
}

/// 以参考位置划分：之前为负级次，之后为正级次
pub fn split_orders(angles: &[f64], reference: f64) -> Vec<i32> {
    let before = angles.iter().filter(|&&a| a < reference).count() as i32;
    let after = angles.len() as i32 - before;
    (-before..=-1).chain(1..=after).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 在平坦背景上注入指定下标的极小值
    fn synthetic(n: usize, minima: &[usize]) -> Vec<f64> {
        let mut values = vec![10.0; n];
        for &m in minima {
            values[m] = 1.0;
        }
        values
    }

    #[test]
    fn test_recovers_injected_minima() {
        let injected = [10, 25, 40, 55, 70, 85];
        let intensities = synthetic(100, &injected);
        let positions: Vec<f64> = (0..100).map(|i| i as f64 - 47.5).collect();

        let set = find_minima(&positions, &intensities, 10, OrderRule::Centered).unwrap();
        assert_eq!(set.indices, injected.to_vec());
        assert_eq!(set.orders, vec![-3, -2, -1, 1, 2, 3]);
        assert_eq!(set.angles[0], positions[10]);
    }

    #[test]
    fn test_distance_rejects_noise_minima() {
        let mut values = vec![5.0; 60];
        values[20] = 1.0;
        values[23] = 2.0; // 噪声极小值，距离过近
        values[45] = 1.5;

        let inverted: Vec<f64> = values.iter().map(|v| -v).collect();
        assert_eq!(find_peaks(&inverted, 1), vec![20, 23, 45]);
        assert_eq!(find_peaks(&inverted, 5), vec![20, 45]);
    }

    #[test]
    fn test_plateau_first_apex() {
        let values = [0.0, 1.0, 3.0, 3.0, 3.0, 1.0, 0.0];
        assert_eq!(find_peaks(&values, 1), vec![2]);

        // 端点与上升平台不是极值
        assert!(find_peaks(&[3.0, 1.0, 0.0], 1).is_empty());
        assert!(find_peaks(&[0.0, 1.0, 1.0], 1).is_empty());
    }

    #[test]
    fn test_centered_orders() {
        assert_eq!(centered_orders(4), vec![-2, -1, 1, 2]);
        assert_eq!(centered_orders(5), vec![-3, -2, -1, 1, 2]);
        assert_eq!(centered_orders(1), vec![-1]);
        assert!(centered_orders(0).is_empty());

        for k in 1..20 {
            let orders = centered_orders(k);
            assert_eq!(orders.len(), k);
            assert!(!orders.contains(&0));
            let sum: i32 = orders.iter().sum();
            assert!(sum <= 0);
        }
    }

    #[test]
    fn test_split_orders() {
        assert_eq!(split_orders(&[-0.3, -0.2, -0.1, 0.1, 0.2], 0.0), vec![-3, -2, -1, 1, 2]);
        assert_eq!(split_orders(&[0.1, 0.2], 0.0), vec![1, 2]);
    }

    #[test]
    fn test_peak_split_rule() {
        let injected = [10, 25, 40, 55];
        let intensities = synthetic(100, &injected);
        let positions: Vec<f64> = (0..100).map(|i| i as f64 - 48.0).collect();

        let set = MinimaExtractor::new(10)
            .with_rule(OrderRule::PeakSplit)
            .find(&positions, &intensities)
            .unwrap();
        assert_eq!(set.orders, vec![-3, -2, -1, 1]);
    }

    #[test]
    fn test_empty_result() {
        let values: Vec<f64> = (0..20).map(|i| i as f64).collect();
        assert!(matches!(
            find_minima(&values, &values, 3, OrderRule::Centered),
            Err(SlitfitError::EmptyResult(_))
        ));
    }
}
