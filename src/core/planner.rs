//! # Probe Selection Planner Module / 探针选择计划模块
//!
//! This module narrows the plan's probe list down to what a single invocation
//! should run, honouring `--only` and `--skip` while keeping declared order.
//!
//! 此模块将计划中的探针列表缩减为单次调用应运行的探针，
//! 遵循 `--only` 和 `--skip`，并保持声明顺序。

use crate::core::config::ProbeSpec;
use anyhow::{bail, Result};
use std::collections::HashSet;

/// Represents the probes selected for one run.
/// 表示一次运行所选中的探针。
#[derive(Debug)]
pub struct ExecutionPlan {
    /// The probes to execute, in plan order. / 按计划顺序执行的探针。
    pub probes: Vec<ProbeSpec>,
    /// How many probes `--only`/`--skip` removed. / 被 `--only`/`--skip` 移除的探针数量。
    pub filtered_count: usize,
}

/// Creates an execution plan from the configured probes.
///
/// With `only` non-empty, just those probes run; `skip` then removes probes
/// from whatever remains. Naming a probe the plan does not contain is an
/// error, so a typo never silently runs nothing.
///
/// 根据配置的探针创建执行计划。
/// `only` 非空时只运行这些探针；随后 `skip` 从剩余探针中移除。
/// 引用计划中不存在的探针名称会报错，避免拼写错误导致什么也不运行。
///
/// # Arguments
/// * `probes` - All probes from the check plan
/// * `only` - Probe names to keep (empty keeps all)
/// * `skip` - Probe names to drop
pub fn plan_execution(
    probes: Vec<ProbeSpec>,
    only: &[String],
    skip: &[String],
) -> Result<ExecutionPlan> {
    let mut names = HashSet::new();
    for probe in &probes {
        if !names.insert(probe.name.as_str()) {
            bail!("Duplicate probe name in check plan: {}", probe.name);
        }
    }

    for name in only.iter().chain(skip) {
        if !names.contains(name.as_str()) {
            bail!("Unknown probe: {}", name);
        }
    }

    let total = probes.len();
    let selected: Vec<ProbeSpec> = probes
        .into_iter()
        .filter(|probe| only.is_empty() || only.contains(&probe.name))
        .filter(|probe| !skip.contains(&probe.name))
        .collect();

    Ok(ExecutionPlan {
        filtered_count: total - selected.len(),
        probes: selected,
    })
}
