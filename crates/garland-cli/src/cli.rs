use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "garland",
    about = "Garland — a versioned store for a collaboratively decorated image",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to a TOML configuration file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP/WebSocket service
    Serve,
    /// List all committed versions, newest first
    History,
    /// Move the active version relative to HEAD
    Rollback(RollbackArgs),
    /// Jump directly to a known version
    Restore(RestoreArgs),
}

#[derive(Args)]
pub struct RollbackArgs {
    /// Steps to move: positive toward older versions, negative toward newer.
    #[arg(short, long, default_value = "1", allow_hyphen_values = true)]
    pub steps: i64,
}

#[derive(Args)]
pub struct RestoreArgs {
    /// The version filename to activate.
    pub filename: String,
}
