//! # Probe Errors / 探针错误
//!
//! Failure modes a probe can hit while gathering evidence. None of them
//! escape the runner: each is converted into an [`Outcome`] for its probe.
//!
//! A broken invariant is not an error: probes report it directly as a
//! `fail` outcome.
//!
//! 探针收集证据时可能遇到的失败类型。它们都不会逃出运行器：
//! 每一种都会被转换为该探针的 [`Outcome`]。
//! 不变量被破坏不属于错误：探针直接将其报告为 `fail` 结果。
//!
//! [`Outcome`]: crate::core::models::Outcome

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    /// Network failure, timeout or refused connection on either boundary.
    /// 任一边界上的网络故障、超时或连接被拒绝。
    #[error("connectivity error: {0}")]
    Connectivity(String),

    /// An expected table, column, field or setting is absent.
    /// 预期的表、列、字段或配置项缺失。
    #[error("structural mismatch: {0}")]
    Structural(String),

    /// Any other runtime fault inside a probe.
    /// 探针内部的其他运行时错误。
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl ProbeError {
    /// Whether this error describes the external system being unreachable
    /// rather than its state being wrong.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, ProbeError::Connectivity(_))
    }
}

impl From<reqwest::Error> for ProbeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProbeError::Connectivity(format!("request timed out: {err}"))
        } else if err.is_connect() || err.is_request() {
            ProbeError::Connectivity(err.to_string())
        } else if err.is_builder() {
            ProbeError::Structural(err.to_string())
        } else {
            ProbeError::Unexpected(err.to_string())
        }
    }
}

impl From<mysql_async::Error> for ProbeError {
    fn from(err: mysql_async::Error) -> Self {
        match err {
            mysql_async::Error::Io(e) => ProbeError::Connectivity(e.to_string()),
            mysql_async::Error::Driver(e) => ProbeError::Connectivity(e.to_string()),
            mysql_async::Error::Server(e) => ProbeError::Unexpected(e.to_string()),
            other => ProbeError::Unexpected(other.to_string()),
        }
    }
}
