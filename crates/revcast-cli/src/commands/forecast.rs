//! Forecast command

use anyhow::{Context, Result};
use revcast_core::{AppConfig, ForecastRun};

use super::{format_money, format_percent, run_configured_forecast};

pub fn cmd_forecast(
    config: &AppConfig,
    horizon: Option<usize>,
    seasonal_period: Option<usize>,
    json: bool,
) -> Result<()> {
    let run = run_configured_forecast(config, horizon, seasonal_period)?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&run).context("Failed to serialize forecast")?
        );
        return Ok(());
    }

    print_run(&run);
    Ok(())
}

fn print_run(run: &ForecastRun) {
    let summary = &run.report.summary;

    println!();
    println!("🔮 Holt-Winters Forecast");
    println!(
        "   Horizon: {} months │ Seasonal period: {} │ Training months: {}",
        run.config.horizon,
        run.config.seasonal_period,
        run.train.len()
    );
    println!("   ─────────────────────────────");
    println!("   Actual revenue:   {}", format_money(summary.total_actual));
    println!("   Forecast revenue: {}", format_money(summary.total_forecast));
    println!("   MAE:              {}", format_money(summary.mae));
    println!("   MAPE:             {}", format_percent(summary.mape));
    if run.accuracy.mape_points < run.accuracy.points {
        println!(
            "   ⚠️  {} zero-revenue month(s) left out of MAPE",
            run.accuracy.points - run.accuracy.mape_points
        );
    }
    println!();
    let model = &run.model;
    println!(
        "   α = {:.4}  β = {:.4}  γ = {:.4}  ({} iterations)",
        model.params.alpha, model.params.beta, model.params.gamma, model.iterations
    );
    println!(
        "   Level {} │ Trend {}/month │ In-sample SSE {:.2}",
        format_money(model.level),
        format_money(model.trend),
        model.sse
    );
    println!();
    println!(
        "   {:10} │ {:>14} │ {:>14} │ {:>14}",
        "Month", "Actual", "Forecast", "Residual"
    );
    println!("   ───────────┼────────────────┼────────────────┼────────────────");

    for row in &run.report.rows {
        println!(
            "   {:10} │ {:>14} │ {:>14} │ {:>14}",
            row.date.format("%Y-%m"),
            format_money(row.actual),
            format_money(row.forecast),
            format_money(row.residual)
        );
    }
}
