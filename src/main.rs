//! webhook-fanout
//!
//! Receives one HTTP request whose path lists destination URLs and replays
//! it to every destination in the background, answering the caller at once.
//!
//! ```text
//!   POST /https://a.test/hook/https://b.test/hook?src=ci
//!          │
//!          ▼
//!   ┌──────────────┐   ┌──────────────┐   ┌────────────────────┐
//!   │   routing    │──▶│    fanout    │──▶│ background tasks   │──▶ a.test, b.test
//!   │  extractor   │   │  dispatcher  │   │ (settle-all join)  │
//!   └──────────────┘   └──────────────┘   └────────────────────┘
//!          │
//!          ▼
//!   200 OK (immediately)
//! ```

use std::path::PathBuf;

use clap::Parser;
use webhook_fanout::lifecycle::startup::{self, StartupOptions};

#[derive(Parser)]
#[command(name = "webhook-fanout")]
#[command(about = "Replays each inbound webhook to every URL listed in its path", long_about = None)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overrides listener.bind_address
    #[arg(short, long)]
    bind: Option<String>,

    /// Reload [forwarding] settings when the config file changes
    #[arg(short, long)]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    startup::run(StartupOptions {
        config_path: cli.config,
        bind_override: cli.bind,
        watch: cli.watch,
    })
    .await?;

    Ok(())
}
