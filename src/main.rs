//! Command-line tools for the ptedit headless editor.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ptedit::{replay_files, EditorConfig};
use ptedit_core::models::block::document_to_value;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ptedit", about = "Headless portable-text editor", version)]
struct Cli {
    /// Treat the editor as read-only (can also be set via PTEDIT_READ_ONLY)
    #[arg(long, global = true)]
    read_only: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSON-lines command script and print emitted events
    Replay {
        /// Initial document: a JSON array of blocks, or `null`
        document: PathBuf,
        /// One editor command per line
        script: PathBuf,
        /// Print the final document after the events
        #[arg(long)]
        print_value: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ptedit=info,ptedit_editor=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = EditorConfig::from_env().context("invalid PTEDIT_* configuration")?;
    config.read_only |= cli.read_only;

    match cli.command {
        Commands::Replay {
            document,
            script,
            print_value,
        } => {
            let output = replay_files(config, &document, &script)?;
            tracing::info!(events = output.events.len(), "replay finished");
            let stdout = io::stdout();
            let mut out = stdout.lock();
            for event in &output.events {
                writeln!(out, "{}", serde_json::to_string(event)?)?;
            }
            if print_value {
                let value = output
                    .value
                    .as_deref()
                    .map(document_to_value)
                    .unwrap_or(serde_json::Value::Null);
                writeln!(out, "{}", value)?;
            }
        }
    }
    Ok(())
}
