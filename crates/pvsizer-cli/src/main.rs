use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "pvsizer")]
#[command(about = "PVSIZER - photovoltaic and battery storage dimensioning", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check every step of a saved session and list what is missing
    Validate {
        /// Session JSON file
        session: PathBuf,
    },
    /// Size the AC cable between inverter and distribution board
    Cable(commands::cable::CableArgs),
    /// Show the month-by-month loss profile for a latitude
    Losses(commands::losses::LossesArgs),
    /// Run the financial calculation for a session
    Calculate {
        /// Session JSON file
        session: PathBuf,
        /// Save the session and its results to the backend afterwards
        #[arg(long)]
        save: bool,
    },
    /// Show the locally stored resume snapshot
    Resume,
    /// Print the effective configuration
    Config,
}

fn env_bool(name: &str) -> bool {
    matches!(
        std::env::var(name).ok().as_deref(),
        Some("1" | "true" | "TRUE" | "yes" | "YES")
    )
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // Logs go to stderr so command output stays pipeable.
    if env_bool("PVSIZER_LOG_JSON") {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { session } => commands::validate::run(&session)?,
        Commands::Cable(args) => commands::cable::run(args)?,
        Commands::Losses(args) => commands::losses::run(args)?,
        Commands::Calculate { session, save } => commands::calculate::run(&session, save).await?,
        Commands::Resume => commands::resume::run().await?,
        Commands::Config => commands::config::run()?,
    }

    Ok(())
}
