//! # Share Consistency Library / 分享一致性检查库
//!
//! This library provides the core functionality for the share-consistency tool,
//! a configuration-driven runner that probes the image-sharing service's
//! relational store and HTTP API and reports whether their invariants hold.
//!
//! 此库为 share-consistency 工具提供核心功能，
//! 这是一个配置驱动的检查运行器，用于探测图片分享服务的关系型数据库和 HTTP API，
//! 并报告其不变量是否成立。
//!
//! ## Modules / 模块
//!
//! - `core` - Check plan, data models, probes and the sequential runner
//! - `infra` - Data source and API clients, file system helpers, logging
//! - `reporting` - Console, JSON and HTML rendering of a run report
//! - `cli` - Command-line interface and commands
//!
//! - `core` - 检查计划、数据模型、探针和顺序运行器
//! - `infra` - 数据源与 API 客户端、文件系统工具、日志
//! - `reporting` - 运行报告的控制台、JSON 和 HTML 渲染
//! - `cli` - 命令行接口和命令

pub mod cli;
pub mod commands;
pub mod core;
pub mod infra;
pub mod reporting;

// Re-export commonly used items
pub use crate::core::config;
pub use crate::core::execution;
pub use crate::core::models;

/// Detects the locale to use for user-facing messages.
///
/// It attempts to match the full system locale (e.g., "zh-CN"), then just the
/// language code (e.g., "en"), and finally falls back to "en".
///
/// 检测用户界面消息所使用的语言区域。
/// 先尝试匹配完整的系统区域（如 "zh-CN"），再匹配语言代码（如 "en"），最后回退到 "en"。
pub fn detect_locale() -> String {
    let locale = sys_locale::get_locale().unwrap_or_else(|| "en".to_string());
    resolve_locale(&locale)
}

/// Maps a requested locale onto one of the bundled translations.
/// 将请求的语言区域映射到内置翻译之一。
pub fn resolve_locale(requested: &str) -> String {
    let available_locales = rust_i18n::available_locales!();
    let requested = requested.replace('_', "-");

    if let Some(exact) = available_locales
        .iter()
        .find(|available| available.eq_ignore_ascii_case(&requested))
    {
        return exact.to_string();
    }

    requested
        .split('-')
        .next()
        .and_then(|lang_code| {
            available_locales
                .iter()
                .find(|available| available.split('-').next() == Some(lang_code))
        })
        .map(|found| found.to_string())
        .unwrap_or_else(|| "en".to_string())
}

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");
