//! punchout deploys the Punch-Out NFT game contract, mints its fighters and fights the boss.

mod cli;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use cli::{Cli, OutputFormat};
use punchout_deploy::{DeploymentConfig, JsonRpcChain, run_deployment};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize the logger.
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = ?e, "punchout failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = DeploymentConfig::layered(cli.preset, cli.config.as_deref())?;
    cli.apply_overrides(&mut config);

    tracing::info!(
        preset = %cli.preset,
        contract = %config.contract,
        rpc_url = %config.chain.rpc_url,
        mint_count = config.effective_mint_count(),
        boss = config.boss.is_some(),
        "Configuration resolved"
    );

    // Only save the configuration, do not deploy.
    if let Some(path) = &cli.save_config {
        config.validate()?;
        config.save_to_file(path)?;
        return Ok(());
    }

    let chain = JsonRpcChain::connect(&config.chain).await?;
    let report = run_deployment(&chain, config).await?;

    match cli.format {
        OutputFormat::Plain => print!("{}", report),
        OutputFormat::Table => {
            println!("Contract deployed to: {}", report.address);
            println!("{}", report.to_table());
        }
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        ),
    }

    Ok(())
}
