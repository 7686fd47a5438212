mod check_cmd;
mod config;
mod extract_cmd;
mod mime;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use extract_cmd::ExtractArgs;

#[derive(Parser)]
#[command(name = "cardread")]
#[command(about = "cardread: extract text from ID cards and certificates with Azure OCR")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.cardread/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract text from an image file and print it
    Extract {
        /// Image to read
        image: PathBuf,
        /// MIME type label (guessed from the extension when omitted)
        #[arg(long)]
        mime: Option<String>,
        /// Override the number of status polls before giving up
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        max_attempts: Option<u32>,
        /// Override the wait before each poll, in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,
    },
    /// Report whether OCR credentials are configured (no network calls)
    Check,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let path = config::resolve_path(cli.config.as_deref());
    let config = config::load(&path).await?;

    let ok = match cli.command {
        Commands::Extract { image, mime, max_attempts, delay_ms } => {
            extract_cmd::run(
                &config,
                ExtractArgs {
                    image: &image,
                    mime: mime.as_deref(),
                    max_attempts,
                    delay_ms,
                },
            )
            .await?
        }
        Commands::Check => check_cmd::run(&config, &path).await?,
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
