//! # Console Reporting Module / 控制台报告模块
//!
//! This module handles the live, streaming console report: a banner, one
//! block per probe as it finishes, and a closing summary. Colors are applied
//! here and nowhere else.
//!
//! 此模块处理实时流式控制台报告：横幅、每个探针完成时输出的一个区块以及最终摘要。
//! 颜色只在这里应用。

use chrono::{DateTime, Local};
use colored::*;

use crate::core::config::ProbeSpec;
use crate::core::models::{Outcome, ProbeRecord, RunReport};
use crate::infra::t;

const BANNER_WIDTH: usize = 61;

/// Prints the opening banner with the run's start time.
/// 打印带有运行开始时间的开场横幅。
pub fn print_banner(started_at: DateTime<Local>, locale: &str) {
    let rule = "═".repeat(BANNER_WIDTH);
    println!("{}", format!("╔{}╗", rule).blue());
    println!("{}", format!("║  {}", t!("banner.title", locale = locale)).blue());
    println!(
        "{}",
        format!(
            "║  {}",
            t!(
                "banner.started_at",
                locale = locale,
                time = started_at.format("%Y-%m-%d %H:%M:%S")
            )
        )
        .blue()
    );
    println!("{}", format!("╚{}╝", rule).blue());
}

/// Prints the header line for a probe that is about to run.
/// 打印即将运行的探针的标题行。
pub fn print_probe_header(index: usize, total: usize, probe: &ProbeSpec, locale: &str) {
    println!(
        "\n{}",
        format!(
            "=== [{}/{}] {} ({}) ===",
            index,
            total,
            probe.name,
            kind_label(probe.kind.tag(), locale)
        )
        .yellow()
        .bold()
    );
    println!("{}", format!("    {}", probe.kind.describe()).dimmed());
}

/// Prints a finished probe: its status line, then the evidence it gathered.
/// 打印已完成的探针：先是状态行，然后是收集到的证据。
pub fn print_probe_record(record: &ProbeRecord, locale: &str) {
    let line = format!(
        "{} {} ({:.2?})",
        status_icon(&record.outcome),
        record.outcome.message(),
        record.duration
    );
    println!("{}", colorize(&record.outcome, &line));

    for detail in &record.details {
        println!("  {}", detail);
    }

    if record.outcome.is_error() {
        println!("  {}", t!("report.error_hint", locale = locale).dimmed());
    }
}

/// Prints a formatted summary of the run.
/// Displays a table with each probe's status and duration, followed by the
/// pass/fail totals.
///
/// 在控制台打印格式化的运行摘要。
/// 显示包含每个探针状态和耗时的表格，随后是通过/失败总数。
///
/// # Output Format / 输出格式
/// ```text
/// --- Summary ---
///   - PASS   | shares-schema                  |    12.31ms
///   - WARN   | mutual-follow                  |     8.02ms
/// ```
pub fn print_summary(report: &RunReport, locale: &str) {
    println!("\n{}", t!("report.summary_banner", locale = locale).bold());

    for record in &report.records {
        let status = record.outcome.status_str(locale);
        println!(
            "  - {:<8} | {:<30} | {:>10}",
            colorize(&record.outcome, &status),
            record.name,
            format!("{:.2?}", record.duration)
        );
    }

    let summary = &report.summary;
    let rule = "═".repeat(BANNER_WIDTH);
    println!("\n{}", format!("╔{}╗", rule).blue());
    println!(
        "{}",
        format!("║  {}", t!("report.totals", locale = locale, total = summary.total)).blue()
    );
    println!("{}", format!("╠{}╣", rule).blue());
    println!(
        "{}",
        format!("║  {}", t!("report.passed", locale = locale, count = summary.passed)).green()
    );
    if summary.failed > 0 {
        println!(
            "{}",
            format!("║  {}", t!("report.failed", locale = locale, count = summary.failed)).red()
        );
    }
    if summary.warned > 0 {
        println!(
            "{}",
            format!("║  {}", t!("report.warned", locale = locale, count = summary.warned)).yellow()
        );
    }
    if summary.errored > 0 {
        println!(
            "{}",
            format!("║  {}", t!("report.errored", locale = locale, count = summary.errored)).red()
        );
    }
    println!("{}", format!("╚{}╝", rule).blue());

    let mut failures = report.failures().peekable();
    if failures.peek().is_some() {
        println!("\n{}", t!("report.not_passed", locale = locale).bold());
        for record in failures {
            println!(
                "  - {}: {}",
                record.name,
                colorize(&record.outcome, record.outcome.message())
            );
        }
    }
}

/// Prints the probes of a plan without running them.
/// 打印计划中的探针而不运行它们。
pub fn print_probe_list(probes: &[ProbeSpec], locale: &str) {
    println!("{}", t!("list.header", locale = locale, count = probes.len()).bold());
    for (index, probe) in probes.iter().enumerate() {
        println!(
            "  {:>2}. {:<30} {:<14} {}",
            index + 1,
            probe.name.cyan(),
            probe.kind.tag(),
            probe.kind.describe().dimmed()
        );
    }
}

/// The localized, human-readable name of a probe kind.
/// 探针类型的本地化可读名称。
pub fn kind_label(tag: &str, locale: &str) -> String {
    match tag {
        "schema_shape" => t!("kind.schema_shape", locale = locale),
        "share_join" => t!("kind.share_join", locale = locale),
        "post_lookup" => t!("kind.post_lookup", locale = locale),
        "user_lookup" => t!("kind.user_lookup", locale = locale),
        "mutual_follow" => t!("kind.mutual_follow", locale = locale),
        "liveness" => t!("kind.liveness", locale = locale),
        "endpoint" => t!("kind.endpoint", locale = locale),
        other => return other.to_string(),
    }
    .to_string()
}

fn status_icon(outcome: &Outcome) -> &'static str {
    match outcome {
        Outcome::Pass { .. } => "✅",
        Outcome::Fail { .. } => "❌",
        Outcome::Warn { .. } => "⚠️ ",
        Outcome::Error { .. } => "💥",
    }
}

fn colorize(outcome: &Outcome, text: &str) -> ColoredString {
    match outcome {
        Outcome::Pass { .. } => text.green(),
        Outcome::Fail { .. } => text.red(),
        Outcome::Warn { .. } => text.yellow(),
        Outcome::Error { .. } => text.red().bold(),
    }
}
