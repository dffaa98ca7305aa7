mod cli_args;
mod commands;
mod output;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use colored::*;
use log;
use std::env;
use std::path::{Path, PathBuf};
use std::process;

use cli_args::{Cli, Commands, FilterGroup, ProjectConfigOpts};
use srcflat_core::config::DEFAULT_CONFIG_FILENAME;
use srcflat_core::{AppError, ConfigOverrides, RuleSet};

fn main() {
    let cli_args = Cli::parse();

    setup_logging(cli_args.quiet, cli_args.verbose);

    let quiet = cli_args.quiet;

    log::debug!("CLI args parsed: {:?}", cli_args);

    let exit_code = match run_app(cli_args, quiet) {
        Ok(_) => {
            log::info!("Application finished successfully.");
            0
        }
        Err(e) => {
            let core_err = e.downcast_ref::<AppError>();
            let exit_code = match core_err {
                Some(err) if err.is_config_error() => 1,
                Some(AppError::ProjectRoot(_)) => 2,
                Some(AppError::Io(_)) => 2,
                Some(err) if err.is_write_error() => 2,
                Some(AppError::InvalidArgument(_)) => 5,
                Some(AppError::JsonSerialize(_)) => 6,
                Some(AppError::TikToken(_)) => 8,
                Some(_) => 1,
                None => 1,
            };

            if !quiet || exit_code == 1 || exit_code == 5 {
                eprintln!("{} {:#}", "Error:".red().bold(), e);
            } else {
                log::error!("Application failed: {:#}", e);
            }

            exit_code
        }
    };
    log::debug!("Exiting with code {}", exit_code);
    process::exit(exit_code);
}

fn setup_logging(quiet: bool, verbose: u8) {
    let log_level = if quiet {
        log::LevelFilter::Off
    } else {
        match verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();
    log::trace!("Logger initialized with level: {:?}", log_level);
}

fn run_app(cli: Cli, quiet: bool) -> Result<()> {
    match cli.command {
        None => {
            Cli::command().print_help()?;
        }
        Some(command) => match command {
            Commands::Generate(args) => {
                log::debug!("Executing 'generate' command...");
                commands::generate::handle_generate_command(args, quiet)?;
            }
            Commands::Debug(args) => {
                log::debug!("Executing 'debug' command...");
                commands::debug::handle_debug_command(args)?;
            }
            Commands::Config(args) => {
                log::debug!("Executing 'config' command...");
                commands::config::handle_config_command(&args, quiet)?;
            }
            Commands::Completion(args) => {
                log::debug!("Executing 'completion' command...");
                commands::completion::handle_completion_command(&args)?;
            }
        },
    }
    Ok(())
}

pub fn determine_project_root(cli_project_root: Option<&PathBuf>) -> Result<PathBuf> {
    let path_to_resolve = match cli_project_root {
        Some(p) => PathBuf::from(shellexpand::tilde(&p.to_string_lossy()).as_ref()),
        None => env::current_dir().map_err(AppError::Io)?,
    };
    if !path_to_resolve.is_dir() {
        anyhow::bail!(AppError::ProjectRoot(format!(
            "Project path '{}' does not exist or is not a directory",
            path_to_resolve.display()
        )));
    }
    Ok(path_to_resolve)
}

pub fn project_name(project_root: &Path) -> String {
    project_root
        .canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().to_string()))
        .unwrap_or_else(|| "project".to_string())
}

/// Builds the rule set for a command: built-in defaults, then the config
/// file (if any), then `--include`/`--exclude` from the command line.
pub fn load_rules_for_command(
    project_opts: &ProjectConfigOpts,
    filters: &FilterGroup,
) -> Result<RuleSet> {
    let mut layers = Vec::<ConfigOverrides>::new();

    if project_opts.disable_config {
        log::debug!("Config file loading disabled via CLI flag.");
    } else {
        let config_path = project_opts
            .config
            .as_ref()
            .map(|p| PathBuf::from(shellexpand::tilde(&p.to_string_lossy()).as_ref()))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILENAME));
        if let Some(file_layer) = ConfigOverrides::load_from_path(&config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
        {
            layers.push(file_layer);
        }
    }

    if !filters.include.is_empty() || !filters.exclude.is_empty() {
        log::trace!(
            "Applying CLI filter overrides: include {:?}, exclude {:?}",
            filters.include,
            filters.exclude
        );
        layers.push(ConfigOverrides {
            include_patterns: Some(filters.include.clone()),
            exclude_patterns: Some(filters.exclude.clone()),
            ..ConfigOverrides::default()
        });
    }

    let rules = RuleSet::merge(&layers).context("Failed to build rule set")?;
    log::debug!(
        "Rule set built: {} include, {} exclude, {} comment prefixes",
        rules.include_patterns().len(),
        rules.exclude_patterns().len(),
        rules.comment_prefixes().len()
    );
    Ok(rules)
}
