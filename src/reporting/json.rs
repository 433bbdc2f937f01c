//! # JSON Reporting Module / JSON 报告模块
//!
//! Machine-readable output: the run report serialized as pretty JSON.
//! 机器可读输出：以格式化 JSON 序列化的运行报告。

use anyhow::{Context, Result};
use std::path::Path;

use crate::core::models::RunReport;
use crate::infra::fs::write_atomic;

/// Serializes the report. / 序列化报告。
pub fn to_json_string(report: &RunReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize run report")
}

/// Writes the report as JSON to `output_path`.
/// 将报告以 JSON 格式写入 `output_path`。
pub fn write_json_report(report: &RunReport, output_path: &Path) -> Result<()> {
    let json = to_json_string(report)?;
    write_atomic(output_path, json.as_bytes())
}
