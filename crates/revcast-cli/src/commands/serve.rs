//! Server command implementation

use anyhow::Result;
use revcast_core::AppConfig;

pub async fn cmd_serve(config: AppConfig, host: &str, port: u16) -> Result<()> {
    println!("🚀 Starting revcast web server...");
    println!("   Sales: {}", config.data.sales_path.display());
    println!("   Time dimension: {}", config.data.time_path.display());
    println!("   Listening: http://{}:{}", host, port);
    println!();
    println!("   Press Ctrl+C to stop");

    revcast_server::serve(config, host, port, revcast_server::ServerConfig::default()).await
}
