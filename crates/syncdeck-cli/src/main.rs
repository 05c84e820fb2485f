use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod table;

#[derive(Parser)]
#[command(name = "syncdeck", version, about = "SyncDeck CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List supported integrations
    Integrations,
    /// Load records once with known credentials
    Load(commands::load::LoadArgs),
    /// Authorize an integration through the backend and print its credentials
    Auth(commands::auth::AuthArgs),
    /// Interactive session: select, authorize, load and clear
    Session,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Integrations => commands::integrations::run(),
        Commands::Load(args) => commands::load::run(args).await,
        Commands::Auth(args) => commands::auth::run(args).await,
        Commands::Session => commands::session::run().await,
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
