//! # Probe Execution Engine Module / 探针执行引擎模块
//!
//! This module runs an ordered list of probes one after another and collects
//! every result. A probe that errors or panics is recorded as an `error`
//! outcome; the sequence always runs to the end.
//!
//! 此模块按顺序逐个运行探针并收集所有结果。
//! 出错或 panic 的探针被记录为 `error` 结果；整个序列始终会运行到底。

use chrono::Local;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Instant;
use tracing::Instrument;

use crate::core::config::ProbeSpec;
use crate::core::models::{Outcome, ProbeRecord, RunReport, Summary};
use crate::core::probes::{self, ProbeReport};
use crate::infra::database::DataSource;
use crate::infra::http::ApiClient;
use crate::reporting::console;

/// Options controlling a run. / 控制一次运行的选项。
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Language for probe messages / 探针消息的语言
    pub locale: String,
    /// Whether a `warn` outcome counts against the run / `warn` 结果是否计为失败
    pub warnings_as_failures: bool,
    /// Stream each probe's result to the console as soon as it finishes.
    /// 每个探针完成后立即将其结果输出到控制台。
    pub live_output: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            locale: "en".to_string(),
            warnings_as_failures: true,
            live_output: true,
        }
    }
}

/// The consistency check runner. Owns one data source and one API client and
/// executes probes strictly sequentially against them.
///
/// 一致性检查运行器。持有一个数据源和一个 API 客户端，并严格按顺序对其执行探针。
pub struct Runner<D, A> {
    source: D,
    api: A,
    options: RunOptions,
}

impl<D: DataSource, A: ApiClient> Runner<D, A> {
    pub fn new(source: D, api: A, options: RunOptions) -> Self {
        Self {
            source,
            api,
            options,
        }
    }

    /// Executes every probe in order and returns the full report.
    /// The report always holds exactly one record per input probe.
    ///
    /// 按顺序执行每个探针并返回完整报告。
    /// 报告中每个输入探针恰好对应一条记录。
    pub async fn run(&self, probes: &[ProbeSpec]) -> RunReport {
        let started_at = Local::now();
        let mut records = Vec::with_capacity(probes.len());
        let mut summary = Summary::default();

        for (index, probe) in probes.iter().enumerate() {
            if self.options.live_output {
                console::print_probe_header(index + 1, probes.len(), probe, &self.options.locale);
            }

            let record = self.run_single(probe).await;
            summary.record(&record.outcome, self.options.warnings_as_failures);

            if self.options.live_output {
                console::print_probe_record(&record, &self.options.locale);
            }
            records.push(record);
        }

        RunReport {
            started_at,
            finished_at: Local::now(),
            records,
            summary,
        }
    }

    /// Runs one probe, converting errors and panics into an `error` outcome.
    /// 运行单个探针，将错误和 panic 转换为 `error` 结果。
    pub async fn run_single(&self, probe: &ProbeSpec) -> ProbeRecord {
        let span = tracing::info_span!("probe", name = %probe.name, kind = probe.kind.tag());
        let start_time = Instant::now();

        let evaluation =
            probes::run_probe(&probe.kind, &self.source, &self.api, &self.options.locale);
        let result = AssertUnwindSafe(evaluation).catch_unwind().instrument(span).await;

        let ProbeReport { outcome, details } = match result {
            Ok(Ok(report)) => report,
            Ok(Err(e)) => {
                tracing::warn!(probe = %probe.name, error = %e, "probe raised an error");
                ProbeReport::new(Outcome::from_error(&e), Vec::new())
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!(probe = %probe.name, %message, "probe panicked");
                ProbeReport::new(
                    Outcome::error(format!("unexpected error: {}", message)),
                    Vec::new(),
                )
            }
        };

        let duration = start_time.elapsed();
        tracing::debug!(probe = %probe.name, ?duration, %outcome, "probe finished");

        ProbeRecord {
            name: probe.name.clone(),
            kind: probe.kind.tag().to_string(),
            outcome,
            details,
            duration,
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "probe panicked".to_string()
    }
}
