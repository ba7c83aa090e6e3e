//! Vigil agent - health monitoring for multi-tenant services
//!
//! Loads the configuration, starts the agent and runs until interrupted

#![allow(missing_docs)]

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};
use vigil::utils::logging::init_logging;
use vigil::{Agent, Config};

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "vigil-agent", version, about)]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, env = "VIGIL_CONFIG", default_value = "config/agent.yaml")]
    config: PathBuf,

    /// Validate the configuration and exit
    #[arg(long)]
    check_config: bool,
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::from_file(&cli.config)
        .await
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;

    if cli.check_config {
        println!("Configuration is valid: {} tenant(s)", config.tenants.len());
        return Ok(());
    }

    init_logging(&config.logging).context("Failed to initialize logging")?;
    info!(
        version = vigil::VERSION,
        environment = %config.agent.environment,
        tenants = config.tenants.len(),
        "Starting vigil agent"
    );

    let agent = Agent::builder(config)
        .config_path(cli.config)
        .build()
        .context("Failed to build agent")?;

    let signals = agent.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupt received, shutting down");
                signals.shutdown();
            }
            Err(e) => warn!("Failed to listen for interrupt: {}", e),
        }
    });

    agent.run().await?;
    info!("Agent stopped");
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Alternate form prints the whole context chain
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
