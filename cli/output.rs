use anyhow::{Context, Result};
use byte_unit::{Byte, UnitType};
use colored::*;
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Table, presets::UTF8_FULL};
use std::io::{self, Write};
use std::path::Path;
use srcflat_core::{AggregationResult, AppError};
use tiktoken_rs::cl100k_base;

/// Writes `content` followed by a newline if it lacks one. Used for JSON and other reports.
pub fn write_to_stdout(content: &str) -> Result<()> {
    let mut handle = io::stdout().lock();
    write_verbatim(&mut handle, content)?;
    if !content.ends_with('\n') {
        handle
            .write_all(b"\n")
            .context("Failed to write newline to stdout")?;
    }
    handle.flush().context("Failed to flush stdout")?;
    Ok(())
}

/// Writes the aggregated text exactly as rendered.
pub fn write_rendered_to_stdout(rendered: &str) -> Result<()> {
    let mut handle = io::stdout().lock();
    write_verbatim(&mut handle, rendered)?;
    handle.flush().context("Failed to flush stdout")?;
    Ok(())
}

fn write_verbatim<W: Write>(writer: &mut W, content: &str) -> Result<()> {
    writer
        .write_all(content.as_bytes())
        .context("Failed to write to stdout")
}

pub fn readable_size(bytes: usize) -> String {
    Byte::from_u128(bytes as u128)
        .unwrap_or_default()
        .get_appropriate_unit(UnitType::Binary)
        .to_string()
}

pub fn estimate_tokens(text: &str) -> Result<usize> {
    let bpe = cl100k_base().map_err(|e| anyhow::anyhow!(AppError::TikToken(e.to_string())))?;
    Ok(bpe.encode_ordinary(text).len())
}

/// Prints the end-of-run report to stderr so it never mixes with `--stdout` output.
pub fn print_summary(result: &AggregationResult, output_path: Option<&Path>) -> Result<()> {
    let stats = &result.stats;
    let tokens = estimate_tokens(&result.rendered)?;

    eprintln!();
    eprintln!("{}", " Aggregation Summary ".green().bold().underline());
    eprintln!(
        "{:<20} {}",
        "Included:".green(),
        stats.included.to_string().cyan()
    );
    eprintln!(
        "{:<20} {}",
        "Skipped:".green(),
        stats.skipped.to_string().cyan()
    );
    let errored = stats.errored.to_string();
    eprintln!(
        "{:<20} {}",
        "Errored:".green(),
        if stats.errored > 0 {
            errored.red()
        } else {
            errored.cyan()
        }
    );
    eprintln!(
        "{:<20} {}",
        "Pruned dirs:".green(),
        stats.pruned_dirs.to_string().cyan()
    );
    eprintln!(
        "{:<20} {}",
        "Output size:".green(),
        readable_size(result.rendered.len()).cyan()
    );
    eprintln!("{:<20} {}", "Est. Tokens:".green(), tokens.to_string().cyan());
    if let Some(path) = output_path {
        eprintln!(
            "{} Project processing complete. Output saved to {}",
            "✅".green(),
            path.display().to_string().blue()
        );
    }
    Ok(())
}

pub fn print_file_table(result: &AggregationResult) {
    if result.records.is_empty() {
        eprintln!("\n{}", "(No files included)".yellow());
        return;
    }
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Path").fg(Color::Green),
        Cell::new("Lines").fg(Color::Green),
        Cell::new("Size").fg(Color::Green),
    ]);
    for record in &result.records {
        table.add_row(vec![
            Cell::new(&record.relative_path).fg(Color::Cyan),
            Cell::new(record.content.lines().count()).set_alignment(CellAlignment::Right),
            Cell::new(readable_size(record.content.len()))
                .set_alignment(CellAlignment::Right)
                .fg(Color::DarkGrey),
        ]);
    }
    eprintln!("{table}");
}
