//! # List Command Module / 列表命令模块
//!
//! Prints the probes of a check plan without touching either external system.
//! 打印检查计划中的探针，而不访问任何外部系统。

use anyhow::Result;
use std::path::Path;

use crate::core::config::CheckPlan;
use crate::reporting::console::print_probe_list;

/// Loads and validates the plan at `config`, then lists its probes.
/// 加载并校验 `config` 处的计划，然后列出其探针。
pub fn execute(config: &Path, lang: Option<&str>) -> Result<()> {
    let plan = CheckPlan::load(config)?;
    let locale = crate::resolve_locale(lang.unwrap_or(&plan.language));
    rust_i18n::set_locale(&locale);
    print_probe_list(&plan.probes, &locale);
    Ok(())
}
