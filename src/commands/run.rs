//! # Run Command Module / 运行命令模块
//!
//! This module implements the `run` command, which loads a check plan,
//! executes its probes sequentially and reports the results.
//!
//! 此模块实现 `run` 命令：加载检查计划、顺序执行其探针并报告结果。

use anyhow::Result;
use colored::*;
use std::path::{Path, PathBuf};

use crate::{
    core::{
        config::CheckPlan,
        execution::{RunOptions, Runner},
        models::RunReport,
        planner,
    },
    infra::{
        database::MySqlSource,
        fs::absolute_path,
        http::HttpApi,
        t,
    },
    reporting::{generate_html_report, print_banner, print_summary, write_json_report},
};

/// Arguments of the `run` subcommand. / `run` 子命令的参数。
#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    /// Path to the check plan / 检查计划路径
    pub config: PathBuf,
    /// Run only these probes / 仅运行这些探针
    pub only: Vec<String>,
    /// Skip these probes / 跳过这些探针
    pub skip: Vec<String>,
    /// Write a JSON report here / 在此写入 JSON 报告
    pub json: Option<PathBuf>,
    /// Write an HTML report here / 在此写入 HTML 报告
    pub html: Option<PathBuf>,
    /// Bearer token overriding `api.token` / 覆盖 `api.token` 的 Bearer 令牌
    pub token: Option<String>,
    /// Language given on the command line / 命令行指定的语言
    pub lang: Option<String>,
}

/// Executes the run command with the provided arguments.
///
/// Returns an error when the plan cannot be loaded or when any probe did not
/// pass, so the process exits non-zero for automated pipelines.
///
/// 使用给定参数执行 run 命令。
/// 当计划无法加载或任一探针未通过时返回错误，使进程以非零状态退出，便于自动化流水线使用。
pub async fn execute(args: RunArgs) -> Result<()> {
    let mut plan = CheckPlan::load(&args.config)?;
    let locale = match &args.lang {
        Some(lang) => crate::resolve_locale(lang),
        None => crate::resolve_locale(&plan.language),
    };
    rust_i18n::set_locale(&locale);

    if let Some(token) = args.token.clone().filter(|t| !t.trim().is_empty()) {
        plan.api.token = Some(token);
    }

    let config_path = absolute_path(&args.config).unwrap_or_else(|_| args.config.clone());
    println!(
        "{}",
        t!("run.loading_plan", locale = &locale, path = config_path.display())
    );
    println!(
        "{}",
        t!(
            "run.targets",
            locale = &locale,
            db = format!(
                "{}:{}/{}",
                plan.database.host, plan.database.port, plan.database.database
            ),
            api = plan.api.base_url
        )
        .cyan()
    );
    if plan.api.token.is_none() {
        println!("{}", t!("run.no_token", locale = &locale).yellow());
    }

    let execution_plan = planner::plan_execution(plan.probes.clone(), &args.only, &args.skip)?;
    if execution_plan.filtered_count > 0 {
        println!(
            "{}",
            t!(
                "run.filtered_probes",
                locale = &locale,
                filtered = execution_plan.filtered_count,
                total = execution_plan.probes.len()
            )
            .cyan()
        );
    }

    if execution_plan.probes.is_empty() {
        println!("{}", t!("run.no_probes", locale = &locale).green());
        return Ok(());
    }

    let source = MySqlSource::new(plan.database.clone());
    let api = HttpApi::new(plan.api.clone())?;
    let runner = Runner::new(
        source,
        api,
        RunOptions {
            locale: locale.clone(),
            warnings_as_failures: plan.warnings_as_failures,
            live_output: true,
        },
    );

    print_banner(chrono::Local::now(), &locale);
    let report = runner.run(&execution_plan.probes).await;
    print_summary(&report, &locale);

    write_reports(&report, args.json.as_deref(), args.html.as_deref(), &locale);

    if report.summary.is_success() {
        println!("\n{}", t!("run.all_passed", locale = &locale).green().bold());
        Ok(())
    } else {
        anyhow::bail!(
            "{}",
            t!(
                "run.checks_failed",
                locale = &locale,
                failed = report.summary.failed,
                total = report.summary.total
            )
        );
    }
}

/// Writes the optional structured reports. A failed write is reported but
/// does not change the run's verdict.
fn write_reports(report: &RunReport, json: Option<&Path>, html: Option<&Path>, locale: &str) {
    if let Some(path) = json {
        match write_json_report(report, path) {
            Ok(()) => println!(
                "{}",
                t!("run.json_written", locale = locale, path = path.display())
            ),
            Err(e) => eprintln!("{} {:#}", t!("run.report_failed", locale = locale).red(), e),
        }
    }
    if let Some(path) = html {
        match generate_html_report(report, path, locale) {
            Ok(()) => println!(
                "{}",
                t!("run.html_written", locale = locale, path = path.display())
            ),
            Err(e) => eprintln!("{} {:#}", t!("run.report_failed", locale = locale).red(), e),
        }
    }
}
