//! # 批量执行器
//!
//! 按样本顺序逐个执行处理任务：一个样本完整处理后才开始下一个。
//!
//! ## 功能
//! - 顺序迭代，结果按输入顺序累积
//! - 进度条显示
//! - 失败样本报告后继续，最后汇总
//!
//! ## 依赖关系
//! - 被 `commands/calibrate.rs` 调用
//! - 使用 `utils/progress.rs` 创建进度条

use crate::error::SlitfitError;
use crate::models::SampleSpec;
use crate::utils::{output, progress};

/// 单个样本处理结果
#[derive(Debug)]
pub enum ProcessResult<T> {
    /// 处理成功
    Success(T),
    /// 跳过（如缺少标称宽度）
    Skipped(String),
    /// 处理失败
    Failed(SlitfitError),
}

/// 批量处理结果统计
#[derive(Debug)]
pub struct BatchResult<T> {
    /// 成功记录（按样本顺序）
    pub records: Vec<T>,
    /// 跳过数量
    pub skipped: usize,
    /// 失败详情 (样本标识, 错误类别, 错误信息)
    pub failures: Vec<(String, &'static str, String)>,
}

impl<T> Default for BatchResult<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            skipped: 0,
            failures: Vec::new(),
        }
    }
}

impl<T> BatchResult<T> {
    /// 合并处理结果
    pub fn merge(&mut self, sample: &SampleSpec, result: ProcessResult<T>) {
        match result {
            ProcessResult::Success(record) => self.records.push(record),
            ProcessResult::Skipped(_) => self.skipped += 1,
            ProcessResult::Failed(err) => {
                self.failures
                    .push((sample.id.clone(), err.kind(), err.to_string()));
            }
        }
    }

    pub fn success(&self) -> usize {
        self.records.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// 总处理数量
    pub fn total(&self) -> usize {
        self.success() + self.skipped + self.failed()
    }
}

/// 顺序批量执行器
#[derive(Debug, Default)]
pub struct BatchRunner {
    /// 是否显示进度条
    quiet: bool,
}

impl BatchRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// 关闭进度条
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// 逐个处理样本；失败的样本立即报告并继续
    pub fn run<T, F>(&self, samples: &[SampleSpec], mut processor: F) -> BatchResult<T>
    where
        F: FnMut(&SampleSpec) -> ProcessResult<T>,
    {
        let pb = progress::create_progress_bar(samples.len() as u64, "Calibrating");
        if self.quiet {
            pb.set_draw_target(indicatif::ProgressDrawTarget::hidden());
        }

        let mut batch_result = BatchResult::default();
        for sample in samples {
            pb.set_message(sample.id.clone());
            let result = processor(sample);

            match &result {
                ProcessResult::Failed(err) => {
                    pb.suspend(|| output::print_sample_failure(&sample.id, err));
                }
                ProcessResult::Skipped(reason) => {
                    pb.suspend(|| output::print_skip(&format!("{}: {}", sample.id, reason)));
                }
                ProcessResult::Success(_) => {}
            }

            batch_result.merge(sample, result);
            pb.inc(1);
        }

        pb.finish_and_clear();
        batch_result
    }
}
