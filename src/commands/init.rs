//! # Check Plan Initialization Module / 检查计划初始化模块
//!
//! This module creates a new `ConsistencyCheck.toml` through an interactive
//! command-line wizard. The wizard asks for the database location and lets the
//! user pick which of the standard probes to include.
//!
//! 此模块通过交互式命令行向导创建新的 `ConsistencyCheck.toml`。
//! 向导会询问数据库位置，并让用户选择要包含的标准探针。
//!
//! ## Features / 功能特性
//!
//! - **Interactive Wizard**: Step-by-step setup of the connection settings
//! - **Probe Selection**: Pick from the standard share-feature probes
//! - **Overwrite Protection**: Confirmation prompt before replacing a plan
//!
//! - **交互式向导**: 连接设置的逐步指导
//! - **探针选择**: 从分享功能的标准探针中选择
//! - **覆盖保护**: 替换计划前的确认提示
//!
//! Secrets are never prompted for. The generated plan references
//! `${SHARE_DB_PASSWORD}` and `${SHARE_API_TOKEN}` instead.
//! 向导从不询问密钥；生成的计划改为引用 `${SHARE_DB_PASSWORD}` 和 `${SHARE_API_TOKEN}`。

use anyhow::{Context, Result};
use colored::*;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, MultiSelect};
use std::path::Path;

use crate::core::config::{starter_probes, CheckPlan};
use crate::infra::fs::write_atomic;
use crate::infra::t;

/// Runs the interactive wizard to generate a check plan at `config_path`.
///
/// With `non_interactive` set, the starter plan is written as-is, replacing
/// any existing file.
///
/// 运行交互式向导，在 `config_path` 生成检查计划。
/// 设置 `non_interactive` 时直接写入初始计划，并替换已有文件。
pub fn run_init_wizard(config_path: &Path, language: &str, non_interactive: bool) -> Result<()> {
    let mut plan = CheckPlan::starter();
    plan.language = language.to_string();

    if non_interactive {
        return write_config(config_path, &plan, language);
    }

    let theme = ColorfulTheme::default();
    println!("\n{}", t!("init_wizard_welcome", locale = language).cyan().bold());
    println!("{}", t!("init_wizard_description", locale = language));

    if config_path.exists() {
        let confirmation = Confirm::with_theme(&theme)
            .with_prompt(t!(
                "init_overwrite_prompt",
                locale = language,
                path = config_path.display()
            ))
            .default(false)
            .interact()
            .context(t!("init_user_confirmation_failed", locale = language).to_string())?;
        if !confirmation {
            println!("{}", t!("init_aborted", locale = language));
            return Ok(());
        }
    }

    plan.database.host = Input::with_theme(&theme)
        .with_prompt(t!("init_db_host_prompt", locale = language))
        .default(plan.database.host.clone())
        .interact_text()?;
    plan.database.port = Input::with_theme(&theme)
        .with_prompt(t!("init_db_port_prompt", locale = language))
        .default(plan.database.port)
        .interact_text()?;
    plan.database.database = Input::with_theme(&theme)
        .with_prompt(t!("init_db_name_prompt", locale = language))
        .default(plan.database.database.clone())
        .interact_text()?;
    plan.database.user = Input::with_theme(&theme)
        .with_prompt(t!("init_db_user_prompt", locale = language))
        .default(plan.database.user.clone())
        .interact_text()?;
    plan.api.base_url = Input::with_theme(&theme)
        .with_prompt(t!("init_api_url_prompt", locale = language))
        .default(plan.api.base_url.clone())
        .validate_with(|url: &String| -> Result<(), String> {
            if url.starts_with("http://") || url.starts_with("https://") {
                Ok(())
            } else {
                Err(t!("init_api_url_invalid", locale = language).to_string())
            }
        })
        .interact_text()?;

    let probes = starter_probes();
    let labels: Vec<String> = probes
        .iter()
        .map(|probe| format!("{} ({})", probe.name, probe.kind.describe()))
        .collect();
    let defaults = vec![true; probes.len()];
    let selections = MultiSelect::with_theme(&theme)
        .with_prompt(t!("init_probe_selection_prompt", locale = language))
        .items(&labels)
        .defaults(&defaults)
        .interact()
        .context(t!("init_user_confirmation_failed", locale = language).to_string())?;

    if selections.is_empty() {
        println!("{}", t!("init_no_probes_selected", locale = language).yellow());
    }
    plan.probes = probes
        .into_iter()
        .enumerate()
        .filter(|(index, _)| selections.contains(index))
        .map(|(_, probe)| probe)
        .collect();

    write_config(config_path, &plan, language)
}

/// Serializes the plan and writes it atomically. / 序列化计划并原子写入。
fn write_config(path: &Path, plan: &CheckPlan, language: &str) -> Result<()> {
    let toml_string = toml::to_string_pretty(plan)
        .context(t!("init_serialize_failed", locale = language).to_string())?;

    write_atomic(path, toml_string.as_bytes()).with_context(|| {
        t!("init_write_failed", locale = language, path = path.display()).to_string()
    })?;

    println!(
        "\n{} {}",
        "✔".green(),
        t!("init_success_created", locale = language, path = path.display()).bold()
    );
    println!("{}", t!("init_usage_hint", locale = language));

    Ok(())
}
