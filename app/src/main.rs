#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use clap::{Parser, Subcommand};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

mod command;

use command::{
    ChatInput, ChatStrategy, CommandStrategy, InfoStrategy, InitStrategy, VersionStrategy,
};

#[derive(Parser)]
#[command(name = "pharmabot")]
#[command(about = "Pharmaceutical information assistant", long_about = None)]
struct Cli {
    /// Runs the interactive chat when omitted
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the assistant, keeping context across turns
    Chat {
        /// Single message to send (non-interactive mode)
        #[arg(short = 'm', long)]
        message: Option<String>,

        /// Model to use
        #[arg(short = 'M', long)]
        model: Option<String>,

        /// Session identifier
        #[arg(short = 's', long)]
        session: Option<String>,
    },
    /// Write a config template to ~/pharmabot/config.json
    Init,
    /// Show the effective configuration
    Info,
    /// Show version
    Version,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Report the outcome of loading `.env` once tracing is up.
fn log_env_file(loaded: Result<std::path::PathBuf, dotenvy::Error>) {
    match loaded {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => debug!("No .env file found"),
        Err(e) => warn!("Failed to read .env file: {e}"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Before tracing so RUST_LOG from .env applies.
    let env_file = dotenvy::dotenv();
    init_tracing();
    log_env_file(env_file);

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Chat {
        message: None,
        model: None,
        session: None,
    }) {
        Commands::Chat {
            message,
            model,
            session,
        } => {
            ChatStrategy
                .execute(ChatInput {
                    session_id: session,
                    message,
                    model,
                })
                .await
        }
        Commands::Init => InitStrategy.execute(()).await,
        Commands::Info => InfoStrategy.execute(()).await,
        Commands::Version => VersionStrategy.execute(()).await,
    }
}
