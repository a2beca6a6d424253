//! # calibrate 子命令实现
//!
//! 对每个样本依次执行：读取 → 可选平滑 → 像素换算角度 → 极小值提取 →
//! ODR 拟合 → 反推狭缝宽度 → 绘图；全部样本完成后做跨样本汇总。
//!
//! ## 功能
//! - 单文件、目录或样本清单输入
//! - 失败样本打印标识与错误类别后继续
//! - 汇总表格、结果 CSV、汇总图
//!
//! ## 依赖关系
//! - 使用 `cli/calibrate.rs` 定义的 CalibrateArgs
//! - 使用 `batch/` 收集与顺序执行
//! - 使用 `diffraction/` 数值核心
//! - 使用 `plot/` 绘图

use crate::batch::{BatchResult, BatchRunner, ProcessResult, SampleCollector};
use crate::cli::calibrate::{CalibrateArgs, Reference};
use crate::diffraction::{
    find_minima, max_peak_index, pixel_to_theta, predict_minima, solve_minima_uncertainty,
    theory, CrossSampleFit, OrderRule, SavitzkyGolay,
};
use crate::error::{Result, SlitfitError};
use crate::models::{
    CalibrationResult, DiffractionConfig, FitModel, MinimaSet, SampleRecord, SampleSpec,
};
use crate::parsers;
use crate::plot::{self, ChartOptions, SampleChart};
use crate::utils::output;

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tabled::{Table, Tabled};

/// 米到微米
const UM: f64 = 1e6;

/// 单样本流水线选项
#[derive(Debug, Clone)]
pub struct CalibrationOptions {
    pub model: FitModel,
    pub orders: OrderRule,
    pub reference: Reference,
    pub smoothing: Option<SavitzkyGolay>,
    /// 图表目录；None 时不绘图
    pub chart_dir: Option<PathBuf>,
    pub chart: ChartOptions,
}

/// 单样本处理结果
#[derive(Debug, Clone)]
pub struct SampleOutcome {
    pub record: SampleRecord,
    pub minima: MinimaSet,
    pub fit: CalibrationResult,
}

/// 整批标定结果
#[derive(Debug)]
pub struct CalibrationSummary {
    pub batch: BatchResult<SampleOutcome>,
    /// 成功样本少于 2 个时为 None
    pub aggregate: Option<CrossSampleFit>,
}

/// 执行 calibrate
pub fn execute(args: CalibrateArgs) -> Result<()> {
    output::print_header("Single-Slit Minima Calibration");
    let summary = run_calibration(&args, false)?;

    output::print_separator();
    output::print_done(&format!(
        "Calibrated {} of {} samples{}",
        summary.batch.success(),
        summary.batch.total(),
        if summary.aggregate.is_some() {
            ", cross-sample fit complete"
        } else {
            ""
        }
    ));
    Ok(())
}

/// 执行整批标定并返回结果
pub fn run_calibration(args: &CalibrateArgs, quiet: bool) -> Result<CalibrationSummary> {
    let config = args.geometry.to_config()?;
    let samples = collect_samples(args)?;

    if samples.is_empty() {
        return Err(SlitfitError::NoFilesFound {
            pattern: args.pattern.clone(),
        });
    }

    let smoothing = match args.smooth_window {
        0 => None,
        window => Some(SavitzkyGolay::new(window, args.smooth_order)?),
    };

    let chart_dir = if args.no_plot {
        None
    } else {
        fs::create_dir_all(&args.output_dir).map_err(|e| SlitfitError::FileWriteError {
            path: args.output_dir.display().to_string(),
            source: e,
        })?;
        Some(args.output_dir.clone())
    };

    let options = CalibrationOptions {
        model: args.model,
        orders: args.orders,
        reference: args.reference,
        smoothing,
        chart_dir,
        chart: args.chart.options(),
    };

    if !quiet {
        output::print_info(&format!("Found {} samples", samples.len()));
        output::print_value("Wavelength", &format!("{:.1} nm", config.wavelength * 1e9));
        output::print_value("Fit model", &options.model.to_string());
        output::print_value("Order rule", &options.orders.to_string());
        output::print_value("Minima distance", &config.minima_distance.to_string());
        if let Some(sg) = &options.smoothing {
            output::print_value("Smoothing window", &sg.window().to_string());
        }
    }

    let runner = BatchRunner::new().quiet(quiet);
    let batch = runner.run(&samples, |sample| process_sample(sample, &config, &options));

    if !quiet {
        print_batch_summary(&batch);
    }

    let records: Vec<SampleRecord> = batch.records.iter().map(|o| o.record.clone()).collect();

    if let Some(path) = &args.results_csv {
        save_results_csv(&records, path)?;
        if !quiet {
            output::print_success(&format!("Results saved to '{}'", path.display()));
        }
    }

    // 单个成功样本仍是有效的标定结果，只跳过跨样本拟合
    let aggregate = match CrossSampleFit::from_records(&records) {
        Ok(fit) => fit,
        Err(e @ SlitfitError::UnderdeterminedFit { .. }) => {
            output::print_warning(&format!("Cross-sample fit skipped: {}", e));
            return Ok(CalibrationSummary {
                batch,
                aggregate: None,
            });
        }
        Err(e) => return Err(e),
    };

    output::print_header("Cross-Sample Fit (calibrated vs nominal)");
    output::print_value("Slope", &format!("{:.6}", aggregate.slope));
    output::print_value("Intercept", &format!("{:.4} µm", aggregate.intercept * UM));

    if let Some(dir) = &options.chart_dir {
        let path = dir.join(format!("aggregate.{}", args.chart.format.extension()));
        plot::generate_aggregate_plot(
            &records,
            &aggregate,
            config.slit_width_uncertainty,
            &path,
            options.chart,
        )?;
        if !quiet {
            output::print_success(&format!("Aggregate chart saved to '{}'", path.display()));
        }
    }

    Ok(CalibrationSummary {
        batch,
        aggregate: Some(aggregate),
    })
}

/// 样本来源：清单优先，否则文件/目录
fn collect_samples(args: &CalibrateArgs) -> Result<Vec<SampleSpec>> {
    if let Some(manifest) = &args.manifest {
        return parsers::read_manifest(manifest);
    }

    let input = args
        .input
        .clone()
        .ok_or_else(|| SlitfitError::InvalidArgument("no input path given".to_string()))?;

    SampleCollector::new(input)
        .with_pattern(&args.pattern)?
        .recursive(args.recursive)
        .collect()
}

/// 批量执行中的单个样本
fn process_sample(
    sample: &SampleSpec,
    config: &DiffractionConfig,
    options: &CalibrationOptions,
) -> ProcessResult<SampleOutcome> {
    let Some(nominal) = sample.nominal_width else {
        return ProcessResult::Skipped("no nominal slit width".to_string());
    };

    match calibrate_sample(sample, nominal, config, options) {
        Ok(outcome) => ProcessResult::Success(outcome),
        Err(e) => ProcessResult::Failed(e),
    }
}

/// 单样本完整流水线
pub fn calibrate_sample(
    sample: &SampleSpec,
    nominal: f64,
    config: &DiffractionConfig,
    options: &CalibrationOptions,
) -> Result<SampleOutcome> {
    let series = parsers::read_series(&sample.path)?;

    let intensities = match &options.smoothing {
        Some(sg) => sg.apply(&series.intensities)?,
        None => series.intensities.clone(),
    };

    let thetas = match options.reference {
        Reference::Angle => series.positions.clone(),
        Reference::Peak => {
            let peak = max_peak_index(&intensities).ok_or_else(|| {
                SlitfitError::EmptyResult("no finite intensity values".to_string())
            })?;
            pixel_to_theta(&config.geometry, &series.positions, series.positions[peak])
        }
    };

    let minima = find_minima(
        &thetas,
        &intensities,
        config.minima_distance,
        options.orders,
    )?;

    let mut guess = vec![theory::initial_slope(config, nominal)?];
    if options.model == FitModel::Affine {
        guess.push(0.0);
    }

    let fit = solve_minima_uncertainty(
        config,
        options.model,
        &minima.orders_f64(),
        &minima.angles,
        &guess,
    )?;

    let (width, sigma) = fit.slit_width(config.wavelength);
    if !width.is_finite() || width <= 0.0 {
        return Err(SlitfitError::FitFailure(format!(
            "non-physical slope {:.4e}",
            fit.slope()
        )));
    }

    if let Some(dir) = &options.chart_dir {
        let predicted = predict_minima(config, nominal)?;
        let chart = SampleChart {
            title: &sample.id,
            thetas: &thetas,
            intensities: &intensities,
            minima: &minima,
            fit: &fit,
            predicted: Some(&predicted),
        };
        let ext = if options.chart.use_svg { "svg" } else { "png" };
        let path = dir.join(format!("{}_minima.{}", sample.id, ext));
        plot::generate_sample_plot(&chart, &path, options.chart)?;
    }

    let record = SampleRecord {
        sample: sample.id.clone(),
        nominal_width: nominal,
        calibrated_width: width,
        calibrated_sigma: sigma,
        slope: fit.slope(),
        slope_error: fit.slope_error(),
        minima_found: minima.len(),
    };

    Ok(SampleOutcome {
        record,
        minima,
        fit,
    })
}

/// 表格行
#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "Sample")]
    sample: String,
    #[tabled(rename = "Nominal (µm)")]
    nominal: String,
    #[tabled(rename = "Calibrated (µm)")]
    calibrated: String,
    #[tabled(rename = "σ (µm)")]
    sigma: String,
    #[tabled(rename = "Slope (rad/order)")]
    slope: String,
    #[tabled(rename = "Iterations")]
    iterations: usize,
    #[tabled(rename = "Minima")]
    minima: usize,
}

/// 打印批次统计与结果表格
fn print_batch_summary(batch: &BatchResult<SampleOutcome>) {
    output::print_separator();
    output::print_done(&format!(
        "Batch complete ({} samples): {} success, {} skipped, {} failed",
        batch.total(),
        batch.success(),
        batch.skipped,
        batch.failed()
    ));

    if !batch.failures.is_empty() {
        output::print_warning("Failed samples:");
        for (sample, kind, err) in &batch.failures {
            output::print_error(&format!("  {} ({}): {}", sample, kind, err));
        }
    }

    let rows: Vec<RecordRow> = batch
        .records
        .iter()
        .map(|o| RecordRow {
            sample: o.record.sample.clone(),
            nominal: format!("{:.1}", o.record.nominal_width * UM),
            calibrated: format!("{:.3}", o.record.calibrated_width * UM),
            sigma: format!("{:.3}", o.record.calibrated_sigma * UM),
            slope: format!("{:.4e} ± {:.1e}", o.fit.slope(), o.fit.slope_error()),
            iterations: o.fit.iterations,
            minima: o.minima.len(),
        })
        .collect();

    if !rows.is_empty() {
        output::print_header("Calibrated Slit Widths");
        println!("{}", Table::new(&rows));
    }
}

/// 结果 CSV 行，宽度以 µm 计
#[derive(Serialize)]
struct ResultRow<'a> {
    sample: &'a str,
    nominal_um: f64,
    calibrated_um: f64,
    calibrated_sigma_um: f64,
    slope: f64,
    slope_error: f64,
    minima_found: usize,
}

impl<'a> From<&'a SampleRecord> for ResultRow<'a> {
    fn from(r: &'a SampleRecord) -> Self {
        Self {
            sample: &r.sample,
            nominal_um: r.nominal_width * UM,
            calibrated_um: r.calibrated_width * UM,
            calibrated_sigma_um: r.calibrated_sigma * UM,
            slope: r.slope,
            slope_error: r.slope_error,
            minima_found: r.minima_found,
        }
    }
}

/// 保存标定结果到 CSV，表头由字段名生成
fn save_results_csv(records: &[SampleRecord], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    for r in records {
        wtr.serialize(ResultRow::from(r))?;
    }

    wtr.flush().map_err(|e| SlitfitError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use crate::diffraction::theory::{beta, intensity};
    use crate::models::DetectorGeometry;

    use clap::Parser;

    const WAVELENGTH: f64 = 635e-9;
    const DISTANCE: f64 = 0.75;

    /// 像素间距取为一级极小角的 1/7，使极小值恰好落在整数像素附近
    fn fixture_pitch(width: f64) -> f64 {
        DISTANCE * ((WAVELENGTH / width).asin() / 7.0).tan()
    }

    /// 50 个像素、峰位 25 的合成单缝衍射曲线
    fn write_fixture(dir: &Path, name: &str, width: f64) -> PathBuf {
        let pitch = fixture_pitch(width);
        let step = (pitch / DISTANCE).atan();
        let content: String = (0..50)
            .map(|i| {
                let theta = (i as f64 - 25.0) * step;
                let b = beta(theta, width, WAVELENGTH);
                let value = if b == 0.0 {
                    2.5
                } else {
                    intensity(2.5, b, 0.01)
                };
                format!("{} {:.10e}\n", i, value)
            })
            .collect();

        fs::create_dir_all(dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    fn fixture_config() -> DiffractionConfig {
        let geometry = DetectorGeometry::new(fixture_pitch(79e-6), DISTANCE, 50).unwrap();
        DiffractionConfig {
            wavelength: WAVELENGTH,
            geometry,
            minima_distance: 4,
            ..DiffractionConfig::default()
        }
    }

    fn options() -> CalibrationOptions {
        CalibrationOptions {
            model: FitModel::Proportional,
            orders: OrderRule::Centered,
            reference: Reference::Peak,
            smoothing: None,
            chart_dir: None,
            chart: ChartOptions::default(),
        }
    }

    #[test]
    fn test_calibrate_single_sample() {
        let dir = std::env::temp_dir().join("slitfit-calibrate-single");
        let path = write_fixture(&dir, "sample_79.txt", 79e-6);
        let nominal = parsers::parse_slit_width(&path).unwrap();
        assert!((nominal - 79e-6).abs() < 1e-18);
        let sample = SampleSpec::new(path, Some(nominal));

        let outcome = calibrate_sample(&sample, nominal, &fixture_config(), &options()).unwrap();

        assert_eq!(outcome.minima.indices, vec![4, 11, 18, 32, 39, 46]);
        assert_eq!(outcome.minima.orders, vec![-3, -2, -1, 1, 2, 3]);
        let width = outcome.record.calibrated_width;
        assert!((width - 79e-6).abs() < 0.05 * 79e-6, "width = {}", width);
        assert!(outcome.record.calibrated_sigma.is_finite());
        assert_eq!(outcome.record.minima_found, 6);
    }

    #[test]
    fn test_calibrate_affine_model() {
        let dir = std::env::temp_dir().join("slitfit-calibrate-affine");
        let path = write_fixture(&dir, "sample_79.txt", 79e-6);
        let sample = SampleSpec::new(path, Some(79e-6));
        let options = CalibrationOptions {
            model: FitModel::Affine,
            ..options()
        };

        let outcome = calibrate_sample(&sample, 79e-6, &fixture_config(), &options).unwrap();
        let width = outcome.record.calibrated_width;
        assert!((width - 79e-6).abs() < 0.05 * 79e-6, "width = {}", width);
        assert_eq!(outcome.fit.parameters.len(), 2);
    }

    #[test]
    fn test_calibrate_missing_minima() {
        let dir = std::env::temp_dir().join("slitfit-calibrate-flat");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("flat_79.txt");
        let content: String = (0..20).map(|i| format!("{} 1.0\n", i)).collect();
        fs::write(&path, content).unwrap();

        let sample = SampleSpec::new(path, Some(79e-6));
        let result = calibrate_sample(&sample, 79e-6, &fixture_config(), &options());
        assert!(matches!(result, Err(SlitfitError::EmptyResult(_))));
    }

    #[test]
    fn test_batch_continues_past_failures() {
        let dir = std::env::temp_dir().join("slitfit-calibrate-batch");
        let _ = fs::remove_dir_all(&dir);
        write_fixture(&dir, "sample_79.txt", 79e-6);
        write_fixture(&dir, "sample_80.txt", 79e-6);
        write_fixture(&dir, "reference.txt", 79e-6);
        fs::write(dir.join("sample_90.txt"), "# no data\n").unwrap();

        let csv_path = dir.join("results.csv");
        let pitch = format!("{:e}", fixture_pitch(79e-6));
        let cli = Cli::parse_from([
            "slitfit",
            "calibrate",
            dir.to_str().unwrap(),
            "--pattern",
            "*.txt",
            "--no-plot",
            "--minima-distance",
            "4",
            "--pixel-pitch",
            &pitch,
            "--wavelength",
            "635e-9",
            "--slit-distance",
            "0.75",
            "--results-csv",
            csv_path.to_str().unwrap(),
        ]);
        let Commands::Calibrate(args) = cli.command else {
            panic!("expected calibrate");
        };

        let summary = run_calibration(&args, true).unwrap();

        assert_eq!(summary.batch.success(), 2);
        assert_eq!(summary.batch.skipped, 1);
        assert_eq!(summary.batch.failures.len(), 1);
        assert_eq!(summary.batch.failures[0].0, "sample_90");
        assert_eq!(summary.batch.failures[0].1, "EmptyResult");

        let ids: Vec<&str> = summary
            .batch
            .records
            .iter()
            .map(|o| o.record.sample.as_str())
            .collect();
        assert_eq!(ids, vec!["sample_79", "sample_80"]);

        // 两个样本的标定宽度相同，汇总斜率接近 0
        let aggregate = summary.aggregate.as_ref().unwrap();
        assert!(aggregate.slope.abs() < 0.05);
        assert!((aggregate.intercept - 79e-6).abs() < 0.05 * 79e-6);

        let csv = fs::read_to_string(&csv_path).unwrap();
        assert_eq!(csv.lines().count(), 3);
        assert!(csv.starts_with(
            "sample,nominal_um,calibrated_um,calibrated_sigma_um,slope,slope_error,minima_found"
        ));
        assert!(csv.lines().nth(1).unwrap().starts_with("sample_79,79"));
    }

    #[test]
    fn test_single_sample_batch_skips_aggregate() {
        let dir = std::env::temp_dir().join("slitfit-calibrate-underdetermined");
        let _ = fs::remove_dir_all(&dir);
        let path = write_fixture(&dir, "sample_79.txt", 79e-6);

        let pitch = format!("{:e}", fixture_pitch(79e-6));
        let cli = Cli::parse_from([
            "slitfit",
            "calibrate",
            path.to_str().unwrap(),
            "--no-plot",
            "--minima-distance",
            "4",
            "--pixel-pitch",
            &pitch,
        ]);
        let Commands::Calibrate(args) = cli.command else {
            panic!("expected calibrate");
        };

        let summary = run_calibration(&args, true).unwrap();
        assert_eq!(summary.batch.success(), 1);
        assert!(summary.batch.failures.is_empty());
        assert!(summary.aggregate.is_none());
    }

    /// 角度列输入：θ ∈ [-0.02, 0.02] rad，2001 个采样点
    fn write_angle_fixture(dir: &Path, name: &str, width: f64) -> PathBuf {
        let content: String = (0..=2000)
            .map(|i| {
                let theta = -0.02 + i as f64 * 2e-5;
                let b = beta(theta, width, WAVELENGTH);
                let value = if b == 0.0 {
                    2.5
                } else {
                    intensity(2.5, b, 0.01)
                };
                format!("{:.10e} {:.10e}\n", theta, value)
            })
            .collect();

        fs::create_dir_all(dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_calibrate_angle_reference() {
        let dir = std::env::temp_dir().join("slitfit-calibrate-angle");
        let path = write_angle_fixture(&dir, "angles_79.txt", 79e-6);
        let sample = SampleSpec::new(path, Some(79e-6));
        let options = CalibrationOptions {
            reference: Reference::Angle,
            ..options()
        };

        let config = DiffractionConfig::default();
        let outcome = calibrate_sample(&sample, 79e-6, &config, &options).unwrap();

        assert_eq!(outcome.minima.orders, vec![-2, -1, 1, 2]);
        let width = outcome.record.calibrated_width;
        assert!((width - 79e-6).abs() < 0.05 * 79e-6, "width = {}", width);
    }

    #[test]
    fn test_calibrate_smoothed_angle_reference() {
        let dir = std::env::temp_dir().join("slitfit-calibrate-angle-smoothed");
        let path = write_angle_fixture(&dir, "angles_79.txt", 79e-6);
        let sample = SampleSpec::new(path, Some(79e-6));
        let options = CalibrationOptions {
            reference: Reference::Angle,
            smoothing: Some(SavitzkyGolay::new(11, 3).unwrap()),
            ..options()
        };

        let config = DiffractionConfig::default();
        let outcome = calibrate_sample(&sample, 79e-6, &config, &options).unwrap();

        assert_eq!(outcome.minima.orders, vec![-2, -1, 1, 2]);
        let width = outcome.record.calibrated_width;
        assert!((width - 79e-6).abs() < 0.05 * 79e-6, "width = {}", width);
    }

    #[test]
    fn test_calibrate_writes_sample_chart() {
        let dir = std::env::temp_dir().join("slitfit-calibrate-chart");
        let _ = fs::remove_dir_all(&dir);
        let path = write_fixture(&dir, "sample_79.txt", 79e-6);
        let sample = SampleSpec::new(path, Some(79e-6));

        for use_svg in [true, false] {
            let options = CalibrationOptions {
                chart_dir: Some(dir.clone()),
                chart: ChartOptions {
                    width: 800,
                    height: 400,
                    use_svg,
                },
                ..options()
            };
            calibrate_sample(&sample, 79e-6, &fixture_config(), &options).unwrap();
        }

        for ext in ["svg", "png"] {
            let chart = dir.join(format!("sample_79_minima.{}", ext));
            let meta = fs::metadata(&chart).unwrap();
            assert!(meta.len() > 0, "{} is empty", chart.display());
        }
    }
}
