//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (config resolution, series loading, pipeline runs)
//! - `config` - Show the resolved configuration
//! - `export` - Comparison table CSV export
//! - `forecast` - Fit, forecast and evaluate
//! - `series` - Monthly revenue series
//! - `serve` - Web server command

pub mod config;
pub mod core;
pub mod export;
pub mod forecast;
pub mod series;
pub mod serve;

// Re-export command functions for main.rs
pub use config::*;
pub use core::*;
pub use export::*;
pub use forecast::*;
pub use series::*;
pub use serve::*;

/// Format an amount with thousands separators and two decimals
pub fn format_money(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (whole, frac) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && formatted != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac)
}

/// Format an optional percentage, "n/a" when undefined
pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}%", v),
        None => "n/a".to_string(),
    }
}
