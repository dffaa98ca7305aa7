use crate::cli_args::ConfigArgs;
use crate::output::write_to_stdout;
use anyhow::{Context, Result};
use colored::*;
use std::fs;
use srcflat_core::{AppError, default_config_json};

pub fn handle_config_command(args: &ConfigArgs, quiet: bool) -> Result<()> {
    let json = default_config_json().context("Failed to serialize default configuration")?;

    let Some(path) = &args.save else {
        return write_to_stdout(&json);
    };

    if path.exists() && !args.force {
        anyhow::bail!(AppError::InvalidArgument(format!(
            "Target file '{}' exists. Use --force to overwrite.",
            path.display()
        )));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| AppError::DirCreation {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    fs::write(path, format!("{}\n", json)).map_err(|e| AppError::FileWrite {
        path: path.clone(),
        source: e,
    })?;

    if !quiet {
        println!(
            "{} Default configuration saved to: {}",
            "✅".green(),
            path.display().to_string().blue()
        );
    }
    Ok(())
}
