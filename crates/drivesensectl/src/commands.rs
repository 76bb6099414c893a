//! Subcommand implementations.

use std::path::Path;

use anyhow::{bail, Result};
use owo_colors::OwoColorize;

use drivesense_core::{
    CollectorConfig, DiagnosticInvoker, ReportCatalog, ShellLauncher, TracingSink, NOT_AVAILABLE,
};

pub fn collect(base_dir: &Path) -> Result<()> {
    let config = CollectorConfig::new(base_dir);
    let sink = TracingSink;
    let artifact = DiagnosticInvoker::new(&config, &ShellLauncher, &sink).run_collection()?;

    println!(
        "Collected {} device(s) -> {}",
        artifact.report.len(),
        artifact.file_name
    );
    Ok(())
}

pub fn list(base_dir: &Path) -> Result<()> {
    let files = catalog(base_dir).list();
    if files.is_empty() {
        println!("No reports collected yet.");
        return Ok(());
    }
    for file in files {
        println!("{}", file);
    }
    Ok(())
}

pub fn show(base_dir: &Path, file: &str, json: bool) -> Result<()> {
    let Some(report) = catalog(base_dir).fetch(file) else {
        bail!("report not found: {file}");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.records.is_empty() {
        println!("(no devices recorded)");
        return Ok(());
    }

    for (idx, record) in report.records.iter().enumerate() {
        println!("Disk {}:", idx + 1);
        for (label, value) in record.fields() {
            if label == "Health Status" {
                println!("  {}: {}", label, paint_health(value));
            } else {
                println!("  {}: {}", label, value);
            }
        }
        println!();
    }
    Ok(())
}

fn catalog(base_dir: &Path) -> ReportCatalog {
    ReportCatalog::new(CollectorConfig::new(base_dir).log_dir())
}

/// Color the tool's verbatim health vocabulary where it is recognizable;
/// unknown wording is printed as-is.
fn paint_health(value: &str) -> String {
    if value == NOT_AVAILABLE {
        return value.dimmed().to_string();
    }
    if value.contains("Good") || value.contains("正常") {
        value.green().to_string()
    } else if value.contains("Caution") || value.contains("注意") {
        value.yellow().to_string()
    } else if value.contains("Bad") || value.contains("異常") {
        value.red().to_string()
    } else {
        value.to_string()
    }
}
