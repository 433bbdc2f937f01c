//! # Data Models Module / 数据模型模块
//!
//! This module defines the core data structures used throughout the runner:
//! probe outcomes, the per-probe records and the aggregated run report, plus
//! the read-only views of external state (query rows and API responses).
//!
//! 此模块定义了整个运行器中使用的核心数据结构：
//! 探针结果、单个探针记录和汇总的运行报告，
//! 以及外部状态的只读视图（查询行和 API 响应）。

use chrono::{DateTime, Local};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::time::Duration;

use crate::core::error::ProbeError;
use crate::infra::t;

/// The outcome of a single probe execution.
/// Every probe ends in exactly one of these four states.
///
/// 单个探针执行的结果。
/// 每个探针都恰好以这四种状态之一结束。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    /// The invariant holds. / 不变量成立。
    Pass { message: String },
    /// The invariant does not hold. / 不变量不成立。
    Fail { message: String },
    /// Evidence is incomplete or absent; not necessarily a defect.
    /// 证据不完整或缺失；不一定是缺陷。
    Warn { message: String },
    /// The probe could not be evaluated. / 探针无法完成评估。
    Error { message: String },
}

impl Outcome {
    pub fn pass(message: impl Into<String>) -> Self {
        Outcome::Pass { message: message.into() }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Outcome::Fail { message: message.into() }
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Outcome::Warn { message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Outcome::Error { message: message.into() }
    }

    /// Converts a probe error into its outcome.
    /// Missing structure fails; everything else is an error.
    ///
    /// 将探针错误转换为结果。
    /// 结构缺失视为失败；其余情况视为错误。
    pub fn from_error(err: &ProbeError) -> Self {
        match err {
            ProbeError::Structural(_) => Outcome::fail(err.to_string()),
            ProbeError::Connectivity(_) | ProbeError::Unexpected(_) => {
                Outcome::error(err.to_string())
            }
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Outcome::Pass { message }
            | Outcome::Fail { message }
            | Outcome::Warn { message }
            | Outcome::Error { message } => message,
        }
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Outcome::Pass { .. })
    }

    pub fn is_warn(&self) -> bool {
        matches!(self, Outcome::Warn { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Error { .. })
    }

    /// Gets the status of the outcome as a localized string for display.
    /// 以本地化字符串形式获取结果状态以供显示。
    pub fn status_str(&self, locale: &str) -> String {
        match self {
            Outcome::Pass { .. } => t!("report.status_pass", locale = locale).to_string(),
            Outcome::Fail { .. } => t!("report.status_fail", locale = locale).to_string(),
            Outcome::Warn { .. } => t!("report.status_warn", locale = locale).to_string(),
            Outcome::Error { .. } => t!("report.status_error", locale = locale).to_string(),
        }
    }

    /// Gets the appropriate CSS class for the outcome.
    pub fn status_class(&self) -> &'static str {
        match self {
            Outcome::Pass { .. } => "status-pass",
            Outcome::Fail { .. } => "status-fail",
            Outcome::Warn { .. } => "status-warn",
            Outcome::Error { .. } => "status-error",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Pass { message } => write!(f, "PASS: {}", message),
            Outcome::Fail { message } => write!(f, "FAIL: {}", message),
            Outcome::Warn { message } => write!(f, "WARN: {}", message),
            Outcome::Error { message } => write!(f, "ERROR: {}", message),
        }
    }
}

/// A single column value as returned by the relational store.
/// 关系型数据库返回的单个列值。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Int(v) => Some(*v),
            SqlValue::UInt(v) => i64::try_from(*v).ok(),
            SqlValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Renders the value for a report, substituting `none` for NULL and
    /// empty text so that absent data never shows up as a raw artifact.
    ///
    /// 为报告渲染该值：NULL 和空文本以 `none` 标记替代，
    /// 使缺失的数据不会以原始形式出现。
    pub fn render(&self, none: &str) -> String {
        match self {
            SqlValue::Null => none.to_string(),
            SqlValue::Text(s) if s.is_empty() => none.to_string(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => write!(f, "NULL"),
            SqlValue::Int(v) => write!(f, "{}", v),
            SqlValue::UInt(v) => write!(f, "{}", v),
            SqlValue::Float(v) => write!(f, "{}", v),
            SqlValue::Text(s) => write!(f, "{}", s),
            SqlValue::Bytes(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<u32> for SqlValue {
    fn from(v: u32) -> Self {
        SqlValue::UInt(u64::from(v))
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(SqlValue::Null)
    }
}

/// One record returned by the relational store: an ordered mapping from
/// column name to value. Column order is the order of the SELECT list.
///
/// 关系型数据库返回的一条记录：从列名到值的有序映射。
/// 列顺序即 SELECT 列表的顺序。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, SqlValue)>,
}

impl Row {
    pub fn new(columns: Vec<(String, SqlValue)>) -> Self {
        Self { columns }
    }

    /// Looks a column up by name. Column names compare case-insensitively,
    /// as they do in MySQL.
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(column))
            .map(|(_, value)| value)
    }

    /// `true` when the column is absent or holds NULL.
    pub fn is_null(&self, column: &str) -> bool {
        self.get(column).is_none_or(SqlValue::is_null)
    }

    pub fn get_i64(&self, column: &str) -> Option<i64> {
        self.get(column).and_then(SqlValue::as_i64)
    }

    /// Renders a column for display, with `none` standing in for absent values.
    pub fn render(&self, column: &str, none: &str) -> String {
        self.get(column)
            .map(|v| v.render(none))
            .unwrap_or_else(|| none.to_string())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, SqlValue)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, SqlValue)>>(iter: I) -> Self {
        Row::new(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, value) in &self.columns {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// One HTTP exchange as seen by a probe: status code, headers and body,
/// returned verbatim.
///
/// 探针看到的一次 HTTP 交换：状态码、响应头和响应体，原样返回。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl ApiResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// A server that answers with anything below 500 is up, even if the
    /// request itself was rejected.
    ///
    /// 只要服务器返回 500 以下的状态码即视为存活，即使请求本身被拒绝。
    pub fn is_live(&self) -> bool {
        self.status < 500
    }
}

/// The recorded result of one probe within a run.
/// 一次运行中单个探针的记录结果。
#[derive(Debug, Clone, Serialize)]
pub struct ProbeRecord {
    /// The probe name from the check plan / 检查计划中的探针名称
    pub name: String,
    /// The probe kind, e.g. `schema_shape` / 探针类型，例如 `schema_shape`
    pub kind: String,
    pub outcome: Outcome,
    /// Evidence lines gathered while evaluating the invariant.
    /// 评估不变量时收集到的证据行。
    pub details: Vec<String>,
    pub duration: Duration,
}

/// Counts accumulated across a run.
///
/// `passed + failed == total` always holds. `warned` and `errored` break the
/// non-passing side down further; a warning only lands on the passed side
/// when the plan says warnings do not count as failures.
///
/// 一次运行中累计的计数。
/// `passed + failed == total` 始终成立。`warned` 和 `errored` 对未通过部分进一步细分；
/// 仅当计划声明警告不计为失败时，警告才计入通过。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub warned: usize,
    pub errored: usize,
}

impl Summary {
    pub fn from_records(records: &[ProbeRecord], warnings_as_failures: bool) -> Self {
        let mut summary = Summary::default();
        for record in records {
            summary.record(&record.outcome, warnings_as_failures);
        }
        summary
    }

    pub fn record(&mut self, outcome: &Outcome, warnings_as_failures: bool) {
        self.total += 1;
        match outcome {
            Outcome::Pass { .. } => self.passed += 1,
            Outcome::Warn { .. } => {
                self.warned += 1;
                if warnings_as_failures {
                    self.failed += 1;
                } else {
                    self.passed += 1;
                }
            }
            Outcome::Fail { .. } => self.failed += 1,
            Outcome::Error { .. } => {
                self.errored += 1;
                self.failed += 1;
            }
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// The complete, renderer-independent result of a run.
/// 一次运行的完整结果，与渲染方式无关。
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    pub records: Vec<ProbeRecord>,
    pub summary: Summary,
}

impl RunReport {
    /// Records whose outcome is anything other than `pass`, in run order.
    pub fn failures(&self) -> impl Iterator<Item = &ProbeRecord> {
        self.records.iter().filter(|r| !r.outcome.is_pass())
    }
}
