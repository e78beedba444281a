use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod auth;
pub mod extract;
pub mod serve;

use crate::core::{AppConfig, logging};

#[derive(Subcommand)]
enum Command {
    /// Run the API server
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Set the server port
        #[arg(long, default_value = "8000")]
        port: String,
    },
    /// Authorize calendar and mail access and save the token file
    Auth {},
    /// Extract and validate a meeting without creating anything
    Extract {
        #[arg(long)]
        prompt: String,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();
    logging::init();

    let config = AppConfig::default();

    // Handle each sub command
    match args.command {
        Some(Command::Serve { host, port }) => {
            serve::run(host, port, config).await?;
        }
        Some(Command::Auth {}) => {
            auth::run(config).await?;
        }
        Some(Command::Extract { prompt }) => {
            extract::run(&prompt, config).await?;
        }
        None => {}
    }

    Ok(())
}
