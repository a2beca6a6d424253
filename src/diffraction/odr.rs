//! # 正交距离回归（ODR）
//!
//! 拟合极小值级次 n 与测量角度 θ 的线性模型，同时考虑两个轴上的不确定度。
//!
//! ## 原理
//! ODR 最小化
//! Σ [ (θᵢ - f(nᵢ + δᵢ))² / σθ² + δᵢ² / σn² ]
//! 对线性模型 f(n) = m·n [+ c]，δᵢ 可解析消去，目标化为
//! Σ (θᵢ - m·nᵢ - c)² / (σθ² + m²·σn²)
//! 再用 Levenberg-Marquardt 迭代求解。
//!
//! 标准差与 ODRPACK 一致：sd = sqrt(diag((JᵀJ)⁻¹) · S/(n-p))，
//! 其中 S 为加权残差平方和。
//!
//! ## 依赖关系
//! - 被 `commands/calibrate.rs` 调用
//! - 使用 `models/calibration.rs`
//! - 使用 `nalgebra` 求解正规方程

use crate::error::{Result, SlitfitError};
use crate::models::{CalibrationResult, DiffractionConfig, FitModel};

use nalgebra::{DMatrix, DVector};

const MAX_ITERATIONS: usize = 200;
const STEP_TOLERANCE: f64 = 1e-12;
const COST_TOLERANCE: f64 = 1e-14;
const LAMBDA_INIT: f64 = 1e-3;
const LAMBDA_MIN: f64 = 1e-12;
const LAMBDA_MAX: f64 = 1e16;

/// 双侧不确定度线性拟合器
#[derive(Debug, Clone, Copy)]
pub struct OdrSolver {
    model: FitModel,
    /// 级次（x）不确定度
    order_sigma: f64,
    /// 角度（y）不确定度
    theta_sigma: f64,
    max_iterations: usize,
}

impl OdrSolver {
    /// 创建拟合器，两个不确定度必须为正
    pub fn new(model: FitModel, order_sigma: f64, theta_sigma: f64) -> Result<Self> {
        Ok(Self {
            model,
            order_sigma: SlitfitError::check_positive("order_uncertainty", order_sigma)?,
            theta_sigma: SlitfitError::check_positive("theta_uncertainty", theta_sigma)?,
            max_iterations: MAX_ITERATIONS,
        })
    }

    /// 执行拟合
    pub fn solve(
        &self,
        orders: &[f64],
        angles: &[f64],
        initial_guess: &[f64],
    ) -> Result<CalibrationResult> {
        let p = self.model.parameter_count();

        if orders.len() != angles.len() {
            return Err(SlitfitError::InvalidArgument(format!(
                "orders ({}) and angles ({}) differ in length",
                orders.len(),
                angles.len()
            )));
        }
        if initial_guess.len() != p {
            return Err(SlitfitError::InvalidArgument(format!(
                "{} model expects {} initial parameters, got {}",
                self.model,
                p,
                initial_guess.len()
            )));
        }
        if orders.len() < p + 1 {
            return Err(SlitfitError::UnderdeterminedFit {
                required: p + 1,
                found: orders.len(),
            });
        }

        let mut beta = DVector::from_column_slice(initial_guess);
        let (r, _) = self.residuals(orders, angles, &beta);
        let mut cost = r.norm_squared();
        if !cost.is_finite() {
            return Err(SlitfitError::FitFailure(
                "non-finite residuals at the initial guess".to_string(),
            ));
        }

        let mut lambda = LAMBDA_INIT;
        let mut iterations = 0;
        let mut converged = false;

        while iterations < self.max_iterations {
            iterations += 1;
            if cost == 0.0 {
                converged = true;
                break;
            }

            let (r, j) = self.residuals(orders, angles, &beta);
            let jtj = j.transpose() * &j;
            let gradient = j.transpose() * &r;

            loop {
                let mut damped = jtj.clone();
                for k in 0..p {
                    damped[(k, k)] += lambda * jtj[(k, k)].max(f64::MIN_POSITIVE);
                }

                let step = damped.lu().solve(&(-&gradient));
                let candidate = step.as_ref().map(|s| &beta + s);
                let trial_cost = candidate
                    .as_ref()
                    .map(|b| self.residuals(orders, angles, b).0.norm_squared());

                match (step, candidate, trial_cost) {
                    (Some(step), Some(candidate), Some(trial))
                        if trial.is_finite() && trial <= cost =>
                    {
                        let small_step = step
                            .iter()
                            .zip(beta.iter())
                            .all(|(d, b)| d.abs() <= STEP_TOLERANCE * (b.abs() + STEP_TOLERANCE));
                        let small_gain = cost - trial <= COST_TOLERANCE * cost;

                        beta = candidate;
                        cost = trial;
                        lambda = (lambda / 10.0).max(LAMBDA_MIN);
                        converged = small_step || small_gain;
                        break;
                    }
                    _ => {
                        lambda *= 10.0;
                        if lambda > LAMBDA_MAX {
                            // 无法继续下降：已在数值精度内达到极小
                            converged = true;
                            break;
                        }
                    }
                }
            }

            if converged {
                break;
            }
        }

        if !converged {
            return Err(SlitfitError::FitFailure(format!(
                "iteration limit reached after {} iterations (sum of squares = {:.6e})",
                iterations, cost
            )));
        }

        let (_, j) = self.residuals(orders, angles, &beta);
        let covariance = (j.transpose() * &j).try_inverse().ok_or_else(|| {
            SlitfitError::FitFailure("singular design matrix at the solution".to_string())
        })?;

        let residual_variance = cost / (orders.len() - p) as f64;
        let standard_errors = (0..p)
            .map(|k| (covariance[(k, k)] * residual_variance).max(0.0).sqrt())
            .collect();

        Ok(CalibrationResult {
            model: self.model,
            parameters: beta.iter().copied().collect(),
            standard_errors,
            iterations,
            sum_of_squares: cost,
        })
    }

    /// 加权残差 rᵢ = eᵢ / sqrt(σθ² + m²σn²) 及其雅可比矩阵
    fn residuals(
        &self,
        x: &[f64],
        y: &[f64],
        beta: &DVector<f64>,
    ) -> (DVector<f64>, DMatrix<f64>) {
        let n = x.len();
        let p = self.model.parameter_count();
        let slope = beta[0];
        let sx2 = self.order_sigma * self.order_sigma;
        let weight = self.theta_sigma * self.theta_sigma + slope * slope * sx2;
        let scale = weight.sqrt();

        let mut r = DVector::zeros(n);
        let mut j = DMatrix::zeros(n, p);
        for i in 0..n {
            let e = y[i] - self.model.evaluate(beta.as_slice(), x[i]);
            r[i] = e / scale;
            j[(i, 0)] = -x[i] / scale - e * slope * sx2 / (weight * scale);
            if p > 1 {
                j[(i, 1)] = -1.0 / scale;
            }
        }
        (r, j)
    }
}

/// 拟合级次-角度关系，返回参数及其标准差
pub fn solve_minima_uncertainty(
    config: &DiffractionConfig,
    model: FitModel,
    orders: &[f64],
    angles: &[f64],
    initial_guess: &[f64],
) -> Result<CalibrationResult> {
    OdrSolver::new(model, config.order_uncertainty, config.theta_uncertainty)?
        .solve(orders, angles, initial_guess)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orders() -> Vec<f64> {
        vec![-3.0, -2.0, -1.0, 1.0, 2.0, 3.0]
    }

    #[test]
    fn test_recovers_exact_slope() {
        let slope = 8.0e-3;
        let x = orders();
        let y: Vec<f64> = x.iter().map(|n| slope * n).collect();

        let solver = OdrSolver::new(FitModel::Proportional, 0.05, 1e-5).unwrap();
        let result = solver.solve(&x, &y, &[slope * 1.3]).unwrap();

        assert!((result.slope() - slope).abs() / slope < 1e-6);
        assert!(result.slope_error() < 1e-12);
        assert_eq!(result.parameters.len(), 1);
        assert_eq!(result.standard_errors.len(), 1);
    }

    #[test]
    fn test_affine_matches_deming_regression() {
        let x = vec![-3.0, -2.0, -1.0, 1.0, 2.0, 3.0, 4.0];
        let y = vec![-0.024, -0.0165, -0.0079, 0.0082, 0.0159, 0.0241, 0.0322];
        let (sx, sy) = (0.05, 1e-3);

        let result = OdrSolver::new(FitModel::Affine, sx, sy)
            .unwrap()
            .solve(&x, &y, &[0.008, 0.0])
            .unwrap();

        // Deming 回归闭式解
        let n = x.len() as f64;
        let mx = x.iter().sum::<f64>() / n;
        let my = y.iter().sum::<f64>() / n;
        let sxx: f64 = x.iter().map(|a| (a - mx).powi(2)).sum();
        let syy: f64 = y.iter().map(|b| (b - my).powi(2)).sum();
        let sxy: f64 = x.iter().zip(&y).map(|(a, b)| (a - mx) * (b - my)).sum();
        let delta = (sy * sy) / (sx * sx);
        let spread = syy - delta * sxx;
        let slope = (spread + (spread * spread + 4.0 * delta * sxy * sxy).sqrt()) / (2.0 * sxy);
        let intercept = my - slope * mx;

        assert!((result.slope() - slope).abs() / slope < 1e-8);
        assert!((result.intercept().unwrap() - intercept).abs() < 1e-9);
        assert!(result.slope_error() > 0.0);
        assert!(result.standard_errors[1] > 0.0);
    }

    #[test]
    fn test_underdetermined() {
        let solver = OdrSolver::new(FitModel::Affine, 0.05, 1e-5).unwrap();
        assert!(matches!(
            solver.solve(&[1.0, 2.0], &[0.01, 0.02], &[0.01, 0.0]),
            Err(SlitfitError::UnderdeterminedFit {
                required: 3,
                found: 2
            })
        ));

        let solver = OdrSolver::new(FitModel::Proportional, 0.05, 1e-5).unwrap();
        assert!(solver.solve(&[1.0, 2.0], &[0.01, 0.02], &[0.01]).is_ok());
        assert!(solver.solve(&[1.0], &[0.01], &[0.01]).is_err());
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(OdrSolver::new(FitModel::Proportional, 0.0, 1e-5).is_err());

        let solver = OdrSolver::new(FitModel::Proportional, 0.05, 1e-5).unwrap();
        assert!(matches!(
            solver.solve(&orders(), &[0.0; 5], &[0.01]),
            Err(SlitfitError::InvalidArgument(_))
        ));
        assert!(matches!(
            solver.solve(&orders(), &[0.0; 6], &[0.01, 0.0]),
            Err(SlitfitError::InvalidArgument(_))
        ));
        assert!(matches!(
            solver.solve(&orders(), &[0.0; 6], &[f64::NAN]),
            Err(SlitfitError::FitFailure(_))
        ));
    }

    #[test]
    fn test_iteration_limit_surfaces_failure() {
        let x = vec![-3.0, -2.0, -1.0, 1.0, 2.0, 3.0, 4.0];
        let y = vec![-0.024, -0.0165, -0.0079, 0.0082, 0.0159, 0.0241, 0.0322];
        let solver = OdrSolver {
            max_iterations: 1,
            ..OdrSolver::new(FitModel::Affine, 0.05, 1e-3).unwrap()
        };

        assert!(matches!(
            solver.solve(&x, &y, &[1.0, 1.0]),
            Err(SlitfitError::FitFailure(_))
        ));
    }
}
