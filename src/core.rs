//! # Core Module / 核心模块
//!
//! This module contains the core functionality of share-consistency,
//! including the check plan, data models, probes and the sequential runner.
//!
//! 此模块包含 share-consistency 的核心功能，
//! 包括检查计划、数据模型、探针和顺序运行器。

pub mod config;
pub mod error;
pub mod execution;
pub mod models;
pub mod planner;
pub mod probes;

// Re-exports
pub use config::CheckPlan;
pub use error::ProbeError;
pub use execution::Runner;
pub use models::{Outcome, RunReport};
