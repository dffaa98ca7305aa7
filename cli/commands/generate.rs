use crate::cli_args::GenerateArgs;
use crate::output;
use crate::{determine_project_root, load_rules_for_command, project_name};
use anyhow::{Context, Result};
use log;
use std::path::PathBuf;
use srcflat_core::{self as core, LogSink};

pub const DEFAULT_OUTPUT_DIR: &str = "output";

pub fn handle_generate_command(args: GenerateArgs, quiet: bool) -> Result<()> {
    let project_root = determine_project_root(args.project_config.project_root.as_ref())
        .context("Failed to determine project root")?;
    log::info!("Project root determined: {}", project_root.display());

    let rules = load_rules_for_command(&args.project_config, &args.filters)
        .context("Failed to load configuration")?;

    if args.stdout {
        let result = core::run(&project_root, &rules, LogSink)
            .context("Failed to aggregate project files")?;
        output::write_rendered_to_stdout(&result.rendered)?;
        if args.list && !quiet {
            output::print_file_table(&result);
        }
        if !quiet {
            output::print_summary(&result, None)?;
        }
        return Ok(());
    }

    let output_path = match &args.output {
        Some(path) => path.clone(),
        None => args
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR))
            .join(format!("{}.txt", project_name(&project_root))),
    };
    log::info!(
        "Aggregating {} into {}",
        project_root.display(),
        output_path.display()
    );

    let result = core::aggregate(&project_root, &output_path, &rules, LogSink)
        .with_context(|| format!("Failed to aggregate into {}", output_path.display()))?;

    if !quiet {
        if args.list {
            output::print_file_table(&result);
        }
        output::print_summary(&result, Some(&output_path))?;
    }
    Ok(())
}
