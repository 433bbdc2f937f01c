//! # HTML Reporting Module / HTML 报告模块
//!
//! This module handles the generation of HTML reports.
//! It creates a self-contained HTML file with run statistics, a results table
//! and the evidence each probe gathered.
//!
//! 此模块处理 HTML 报告的生成。
//! 它创建一个自包含的 HTML 文件，包含运行统计、结果表格以及每个探针收集的证据。

use anyhow::Result;
use maud::{html, Markup, DOCTYPE};
use std::path::Path;

use crate::core::models::RunReport;
use crate::infra::fs::write_atomic;
use crate::infra::t;
use crate::reporting::console::kind_label;

/// Embedded CSS styles for HTML reports / HTML 报告的嵌入式 CSS 样式
const HTML_STYLE: &str = r#"
body { font-family: -apple-system, "Segoe UI", Helvetica, Arial, sans-serif; margin: 2rem; color: #24292f; }
h1 { font-size: 1.6rem; }
.meta { color: #57606a; margin-bottom: 1.5rem; }
.summary-container { display: flex; gap: 1rem; margin-bottom: 2rem; }
.summary-item { border: 1px solid #d0d7de; border-radius: 6px; padding: 0.75rem 1.25rem; text-align: center; }
.summary-item .count { display: block; font-size: 1.5rem; font-weight: 600; }
.summary-item .label { color: #57606a; }
table { border-collapse: collapse; width: 100%; }
th, td { border-bottom: 1px solid #d0d7de; padding: 0.5rem; text-align: left; vertical-align: top; }
.status-cell { display: inline-block; padding: 0.1rem 0.5rem; border-radius: 4px; font-weight: 600; }
.status-pass { background: #dafbe1; color: #1a7f37; }
.status-fail { background: #ffebe9; color: #cf222e; }
.status-warn { background: #fff8c5; color: #9a6700; }
.status-error { background: #cf222e; color: #ffffff; }
details pre { background: #f6f8fa; padding: 0.75rem; white-space: pre-wrap; }
"#;

/// Renders the report as a complete HTML document.
/// 将报告渲染为完整的 HTML 文档。
pub fn render_html_report(report: &RunReport, locale: &str) -> Markup {
    let summary = &report.summary;
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { (t!("html_report.title", locale = locale)) }
                style { (maud::PreEscaped(HTML_STYLE)) }
            }
            body {
                h1 { (t!("html_report.main_header", locale = locale)) }
                p.meta {
                    (t!(
                        "banner.started_at",
                        locale = locale,
                        time = report.started_at.format("%Y-%m-%d %H:%M:%S")
                    ))
                }
                div.summary-container {
                    div.summary-item {
                        span.count { (summary.total) }
                        span.label { (t!("html_report.summary.total", locale = locale)) }
                    }
                    div.summary-item {
                        span.count { (summary.passed) }
                        span.label { (t!("html_report.summary.passed", locale = locale)) }
                    }
                    div.summary-item {
                        span.count { (summary.failed) }
                        span.label { (t!("html_report.summary.failed", locale = locale)) }
                    }
                    div.summary-item {
                        span.count { (summary.warned) }
                        span.label { (t!("html_report.summary.warned", locale = locale)) }
                    }
                }
                table {
                    thead {
                        tr {
                            th { (t!("html_report.table.header.name", locale = locale)) }
                            th { (t!("html_report.table.header.kind", locale = locale)) }
                            th { (t!("html_report.table.header.status", locale = locale)) }
                            th { (t!("html_report.table.header.message", locale = locale)) }
                            th { (t!("html_report.table.header.duration", locale = locale)) }
                        }
                    }
                    tbody {
                        @for record in &report.records {
                            tr {
                                td { (record.name) }
                                td { (kind_label(&record.kind, locale)) }
                                td {
                                    div class={ "status-cell " (record.outcome.status_class()) } {
                                        (record.outcome.status_str(locale))
                                    }
                                }
                                td {
                                    (record.outcome.message())
                                    @if !record.details.is_empty() {
                                        details {
                                            summary { (t!("html_report.toggle_details", locale = locale)) }
                                            pre { (record.details.join("\n")) }
                                        }
                                    }
                                }
                                td { (format!("{:.2}s", record.duration.as_secs_f64())) }
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Generates an HTML report file from a run report.
///
/// 从运行报告生成 HTML 报告文件。
///
/// # Errors / 错误
/// Returns an error if the file cannot be written to `output_path`.
/// 如果无法写入 `output_path`，则返回错误。
pub fn generate_html_report(report: &RunReport, output_path: &Path, locale: &str) -> Result<()> {
    let markup = render_html_report(report, locale);
    write_atomic(output_path, markup.into_string().as_bytes())
}
