use crate::cli_args::DebugArgs;
use crate::output::write_to_stdout;
use crate::{determine_project_root, load_rules_for_command};
use anyhow::{Context, Result};
use colored::*;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL};
use log;
use serde::Serialize;
use srcflat_core::{
    self as core, AggregationEvent, AggregationStats, ConfigOverrides, MemorySink,
};

#[derive(Debug, Serialize)]
struct DebugInfo<'a> {
    project_root: String,
    effective_rules: ConfigOverrides,
    stats: AggregationStats,
    decisions: &'a [AggregationEvent],
}

pub fn handle_debug_command(args: DebugArgs) -> Result<()> {
    let project_root = determine_project_root(args.project_config.project_root.as_ref())
        .context("Failed to determine project root")?;
    log::info!("Project root determined: {}", project_root.display());

    let rules = load_rules_for_command(&args.project_config, &args.filters)
        .context("Failed to load configuration for debug command")?;

    log::debug!("Debug: Walking project without writing output...");
    let mut sink = MemorySink::new();
    let result = core::run(&project_root, &rules, &mut sink)
        .context("Failed to walk project for debug")?;
    log::debug!("Debug: Collected {} decisions.", sink.events.len());

    let debug_data = DebugInfo {
        project_root: project_root.display().to_string(),
        effective_rules: rules.to_overrides(),
        stats: result.stats,
        decisions: &sink.events,
    };

    if args.json {
        let json = serde_json::to_string_pretty(&debug_data)
            .context("Failed to serialize debug report")?;
        write_to_stdout(&json)
    } else {
        print_debug_info_pretty(&debug_data)
    }
}

fn print_debug_info_pretty(info: &DebugInfo) -> Result<()> {
    let rules_json = serde_json::to_string_pretty(&info.effective_rules)
        .context("Failed to serialize effective rules")?;

    println!("{}", " Effective Rules ".green().bold().underline());
    println!("{}", rules_json);
    println!();
    println!("{} {}", "Project Root:".green(), info.project_root.cyan());
    println!();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Path").fg(Color::Green),
        Cell::new("Decision").fg(Color::Green),
        Cell::new("Detail").fg(Color::Green),
    ]);
    for event in info.decisions {
        let (label, color, detail) = match event {
            AggregationEvent::Included { .. } => ("included", Color::Green, ""),
            AggregationEvent::Skipped { reason, .. } => ("skipped", Color::Yellow, reason.as_str()),
            AggregationEvent::Pruned { reason, .. } => ("pruned", Color::DarkYellow, reason.as_str()),
            AggregationEvent::ReadFailed { error, .. } => ("error", Color::Red, error.as_str()),
            AggregationEvent::Written { .. } => continue,
        };
        table.add_row(vec![
            Cell::new(event.path()).fg(Color::Cyan),
            Cell::new(label).fg(color),
            Cell::new(detail).fg(Color::DarkGrey),
        ]);
    }
    println!("{table}");

    let stats = &info.stats;
    println!(
        "{} {} included, {} skipped, {} errored, {} directories pruned",
        "Totals:".green(),
        stats.included.to_string().cyan(),
        stats.skipped.to_string().cyan(),
        stats.errored.to_string().cyan(),
        stats.pruned_dirs.to_string().cyan()
    );
    Ok(())
}
