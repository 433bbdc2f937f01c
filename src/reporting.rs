//! # Reporting Module / 报告模块
//!
//! This module renders a finished run report. The report itself is a plain
//! data structure; console colors, JSON and HTML are separate rendering steps.
//!
//! 此模块负责渲染已完成的运行报告。报告本身是纯数据结构；
//! 控制台着色、JSON 和 HTML 是各自独立的渲染步骤。

pub mod console;
pub mod html;
pub mod json;

// Re-export common reporting functions
pub use console::{print_banner, print_probe_header, print_probe_record, print_summary};
pub use html::generate_html_report;
pub use json::write_json_report;
