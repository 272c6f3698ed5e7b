//! Printful API Proxy
//!
//! A gateway that lets browser frontends call the Printful API without
//! holding the API key.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌───────────────────────────────────────────────┐
//!                    │                  GATEWAY                       │
//!   Client Request   │  ┌──────────┐   ┌─────────┐   ┌───────────┐   │
//!   ─────────────────┼─▶│   http   │──▶│ routing │──▶│ upstream  │───┼──▶ Printful API
//!                    │  │  server  │   │ router  │   │ forwarder │   │
//!   Client Response  │  └──────────┘   └─────────┘   └───────────┘   │
//!   ◀────────────────┼── CORS + timing + error envelope ◀────────────┼─── 
//!                    │                                               │
//!                    │  config · observability · security · lifecycle│
//!                    └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use printful_proxy::config::load_config;
use printful_proxy::lifecycle;
use printful_proxy::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "printful-proxy")]
#[command(about = "Gateway forwarding frontend requests to the Printful API", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "printful-proxy starting");

    lifecycle::run(config).await?;
    Ok(())
}
