use colored::Colorize;

use garland_history::HistoryStore;
use garland_server::{build_backend, GarlandServer, ServerConfig};

use crate::cli::{Cli, Command};

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = ServerConfig::load(cli.config.as_deref())?;
    match cli.command {
        Command::Serve => Ok(GarlandServer::new(config).serve().await?),
        Command::History => cmd_history(&config).await,
        Command::Rollback(args) => cmd_rollback(&config, args.steps).await,
        Command::Restore(args) => cmd_restore(&config, &args.filename).await,
    }
}

async fn open_history(config: &ServerConfig) -> anyhow::Result<HistoryStore> {
    let backend = build_backend(config).await?;
    Ok(HistoryStore::new(backend))
}

async fn cmd_history(config: &ServerConfig) -> anyhow::Result<()> {
    let history = open_history(config).await?;
    let versions = history.list_history().await?;
    if versions.is_empty() {
        println!("No versions yet.");
        return Ok(());
    }
    let head = history.head().await?;
    for name in &versions {
        if Some(name) == head.as_ref() {
            println!("{} {}", "*".green().bold(), name.as_str().bold());
        } else {
            println!("  {name}");
        }
    }
    Ok(())
}

async fn cmd_rollback(config: &ServerConfig, steps: i64) -> anyhow::Result<()> {
    let history = open_history(config).await?;
    let name = history.rollback(steps).await?;
    println!(
        "{} Active version is now {}",
        "✓".green().bold(),
        name.as_str().yellow()
    );
    Ok(())
}

async fn cmd_restore(config: &ServerConfig, filename: &str) -> anyhow::Result<()> {
    let history = open_history(config).await?;
    let name = history.restore(filename).await?;
    println!(
        "{} Restored {}",
        "✓".green().bold(),
        name.as_str().yellow()
    );
    Ok(())
}
