//! Whitelist host entry point
//!
//! Loads the configuration, starts the gate and runs the console event
//! loop: stdin lines are host events, a fixed-rate tick confirms deferred
//! admissions, and Ctrl+C or SIGTERM shut the host down.

mod cli;
mod config;
mod console;
mod host;
mod logging;
mod signals;

use anyhow::{anyhow, Context, Result};
use plugin_whitelist::{GateEvents, TextFileStore, WhitelistPlugin};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

use cli::CliArgs;
use config::AppConfig;
use console::HostEvent;
use host::{ConsoleHost, Flow, PermissionTable};

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    let mut config = AppConfig::load_from_file(&args.config_path)
        .await
        .with_context(|| format!("loading {}", args.config_path.display()))?;
    config.apply_cli(&args);
    config.validate().map_err(|e| anyhow!("invalid configuration: {e}"))?;

    logging::setup_logging(&config.logging)?;
    info!("🚀 Starting whitelist host with {}", args.config_path.display());

    let permissions = Arc::new(PermissionTable::from_config(&config.permissions));
    let store = TextFileStore::new(config.storage_path());
    let mut gate = WhitelistPlugin::new(config.gate.clone(), Box::new(store), permissions)?;
    gate.on_init()?;

    let mut host = ConsoleHost::new(gate);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(Duration::from_millis(config.host.tick_interval_ms));

    let shutdown = signals::wait_for_shutdown();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("Console closed");
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match HostEvent::parse(&line) {
                    Ok(event) => {
                        let (flow, out) = host.handle(event);
                        print_lines(&out);
                        if flow == Flow::Quit {
                            break;
                        }
                    }
                    Err(e) => println!("error: {e}"),
                }
            }
            _ = ticker.tick() => {
                print_lines(&host.tick());
            }
            result = &mut shutdown => {
                match result {
                    Ok(signal) => info!("📡 Received {}, shutting down", signal),
                    Err(e) => error!("Signal handling failed: {}", e),
                }
                break;
            }
        }
    }

    info!(
        "🛑 Whitelist host stopped ({} identities on the list)",
        host.gate().members().len()
    );
    Ok(())
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}
