//! # Infrastructure Module / 基础设施模块
//!
//! This module provides infrastructure services for share-consistency,
//! including the relational data source, the HTTP API client, file system
//! operations, diagnostic logging and i18n support.
//!
//! 此模块为 share-consistency 提供基础设施服务，
//! 包括关系型数据源、HTTP API 客户端、文件系统操作、诊断日志和国际化支持。

pub mod database;
pub mod fs;
pub mod http;
pub mod logging;

// Re-export i18n functions for easier access
pub use rust_i18n::t;
