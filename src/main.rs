use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Minifies compiled scripts and stylesheets.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Creates a default `Minify.toml` in the current directory.
    Init,

    /// Minifies the outputs named by a configuration file.
    Run {
        /// Configuration file to load; defaults to `Minify.toml`.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Configuration profile to merge over `default`.
        #[arg(short, long)]
        profile: Option<String>,

        /// Files to minify instead of the profile's outputs.
        files: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Init => webminify::tool::init().await,
        Command::Run {
            config,
            profile,
            files,
        } => webminify::tool::minify::run(config.as_deref(), profile.as_deref(), &files).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
