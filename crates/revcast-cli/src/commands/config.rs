//! Configuration command

use anyhow::Result;
use revcast_core::{config::default_config_path, AppConfig, ConfigSource};

pub fn cmd_config(config: &AppConfig, source: &ConfigSource) -> Result<()> {
    println!("# Source: {}", source);
    if let Some(path) = default_config_path() {
        println!("# User override location: {}", path.display());
    }
    println!();
    print!("{}", config.to_toml()?);
    Ok(())
}
