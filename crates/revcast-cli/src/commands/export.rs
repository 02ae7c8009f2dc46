//! Comparison table export command

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use revcast_core::AppConfig;

use super::run_configured_forecast;

/// Export the actual-vs-forecast table to CSV
pub fn cmd_export(
    config: &AppConfig,
    horizon: Option<usize>,
    seasonal_period: Option<usize>,
    output: Option<&Path>,
) -> Result<()> {
    // Check output doesn't already exist
    if let Some(path) = output {
        if path.exists() {
            anyhow::bail!(
                "Output file already exists: {}\nUse a different filename or remove the existing file.",
                path.display()
            );
        }
    }

    let run = run_configured_forecast(config, horizon, seasonal_period)?;
    let csv = run.report.to_csv()?;

    match output {
        Some(path) => {
            let mut file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            file.write_all(csv.as_bytes())?;

            println!(
                "✅ Exported {} months to {}",
                run.report.rows.len(),
                path.display()
            );
        }
        None => {
            // Write to stdout
            print!("{}", csv);
        }
    }

    Ok(())
}
