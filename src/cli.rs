// src/cli.rs
use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use std::{env, path::PathBuf};

use crate::{commands, infra, infra::t};

/// Default location of the check plan, relative to the working directory.
pub const DEFAULT_PLAN: &str = "ConsistencyCheck.toml";

/// Pre-parses the command line arguments to find the language setting.
/// This allows i18n to be initialized before the full CLI is built.
/// It looks for a `--lang <VALUE>` or `--lang=<VALUE>` argument.
fn pre_parse_language() -> Option<String> {
    let args: Vec<String> = env::args().collect();
    if let Some(pos) = args.iter().position(|arg| arg == "--lang") {
        if let Some(lang) = args.get(pos + 1) {
            return Some(lang.clone());
        }
    }
    args.iter()
        .find_map(|arg| arg.strip_prefix("--lang="))
        .map(str::to_string)
}

fn build_cli(locale: &str) -> Command {
    Command::new("share-consistency")
        .version(env!("CARGO_PKG_VERSION"))
        .about(t!("cli_about", locale = locale).to_string())
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("lang")
                .long("lang")
                .help(t!("cli_lang", locale = locale).to_string())
                .value_name("LANGUAGE")
                .global(true)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help(t!("cli_verbose", locale = locale).to_string())
                .global(true)
                .action(ArgAction::Count),
        )
        .subcommand(
            Command::new("run")
                .about(t!("cmd_run_about", locale = locale).to_string())
                .arg(config_arg(locale))
                .arg(
                    Arg::new("only")
                        .long("only")
                        .help(t!("arg_only", locale = locale).to_string())
                        .value_name("PROBE")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("skip")
                        .long("skip")
                        .help(t!("arg_skip", locale = locale).to_string())
                        .value_name("PROBE")
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help(t!("arg_json", locale = locale).to_string())
                        .value_name("JSON")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("html")
                        .long("html")
                        .help(t!("arg_html", locale = locale).to_string())
                        .value_name("HTML")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("token")
                        .long("token")
                        .help(t!("arg_token", locale = locale).to_string())
                        .value_name("TOKEN")
                        .env("SHARE_API_TOKEN")
                        .hide_env_values(true)
                        .action(ArgAction::Set),
                ),
        )
        .subcommand(
            Command::new("list")
                .about(t!("cmd_list_about", locale = locale).to_string())
                .arg(config_arg(locale)),
        )
        .subcommand(
            Command::new("init")
                .about(t!("cmd_init_about", locale = locale).to_string())
                .arg(
                    Arg::new("path")
                        .long("path")
                        .help(t!("arg_init_path", locale = locale).to_string())
                        .value_name("PATH")
                        .default_value(DEFAULT_PLAN)
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("non-interactive")
                        .long("non-interactive")
                        .help(t!("arg_non_interactive", locale = locale).to_string())
                        .action(ArgAction::SetTrue),
                ),
        )
}

fn config_arg(locale: &str) -> Arg {
    Arg::new("config")
        .short('c')
        .long("config")
        .help(t!("arg_config", locale = locale).to_string())
        .value_name("CONFIG")
        .default_value(DEFAULT_PLAN)
        .value_parser(clap::value_parser!(PathBuf))
        .action(ArgAction::Set)
}

fn path_arg(matches: &clap::ArgMatches, id: &str) -> PathBuf {
    matches
        .get_one::<PathBuf>(id)
        .cloned()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_PLAN))
}

fn strings_arg(matches: &clap::ArgMatches, id: &str) -> Vec<String> {
    matches
        .get_many::<String>(id)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

pub async fn run() -> Result<()> {
    // Pre-parse language and initialize i18n first.
    let requested_lang = pre_parse_language();
    let language = match &requested_lang {
        Some(lang) => crate::resolve_locale(lang),
        None => crate::detect_locale(),
    };
    rust_i18n::set_locale(&language);

    let matches = build_cli(&language).get_matches();
    infra::logging::init(matches.get_count("verbose"));

    match matches.subcommand() {
        Some(("run", run_matches)) => {
            let args = commands::run::RunArgs {
                config: path_arg(run_matches, "config"),
                only: strings_arg(run_matches, "only"),
                skip: strings_arg(run_matches, "skip"),
                json: run_matches.get_one::<PathBuf>("json").cloned(),
                html: run_matches.get_one::<PathBuf>("html").cloned(),
                token: run_matches.get_one::<String>("token").cloned(),
                lang: requested_lang,
            };
            commands::run::execute(args).await?;
        }
        Some(("list", list_matches)) => {
            let config = path_arg(list_matches, "config");
            commands::list::execute(&config, requested_lang.as_deref())?;
        }
        Some(("init", init_matches)) => {
            let path = path_arg(init_matches, "path");
            let non_interactive = init_matches.get_flag("non-interactive");

            if requested_lang.is_none() && !non_interactive {
                println!(
                    "🌐 {}",
                    t!("system_language_detected", locale = &language, lang = &language)
                );
            }
            commands::init::run_init_wizard(&path, &language, non_interactive)?;
        }
        _ => {
            // subcommand_required makes clap print help and exit before this.
        }
    }
    Ok(())
}
