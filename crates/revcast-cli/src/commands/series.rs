//! Monthly series command

use anyhow::{Context, Result};
use revcast_core::AppConfig;

use super::{format_money, load_series};

pub fn cmd_series(config: &AppConfig, json: bool) -> Result<()> {
    let series = load_series(config)?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&series).context("Failed to serialize series")?
        );
        return Ok(());
    }

    println!();
    println!("📈 Monthly Revenue");
    if let (Some(first), Some(last)) = (series.first_date(), series.last_date()) {
        println!("   {} to {} ({} months)", first, last, series.len());
    }
    println!("   ─────────────────────────────");
    println!("   {:10} │ {:>16}", "Month", "Revenue");
    println!("   ───────────┼──────────────────");

    for point in series.points() {
        println!(
            "   {:10} │ {:>16}",
            point.month_end.format("%Y-%m"),
            format_money(point.revenue)
        );
    }

    println!("   ───────────┼──────────────────");
    println!("   {:10} │ {:>16}", "Total", format_money(series.total()));

    Ok(())
}
