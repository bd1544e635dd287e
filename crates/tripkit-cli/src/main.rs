mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "tripkit")]
#[command(about = "Trip-planning engine shell")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Sign in and print the session token for reuse
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// List my trips
    Trips,
    /// Search places through the debounced autocomplete flow
    Search {
        /// Free-form query, e.g. "curitiba"
        query: String,
        /// Pick the n-th suggestion (1-based) and geocode it
        #[arg(long)]
        pick: Option<usize>,
    },
    /// Attach a place to a trip, with the duplicate check
    Attach {
        /// Trip id to attach to
        #[arg(long)]
        trip: i64,
        /// Provider place id, as printed by `search`
        #[arg(long)]
        place_id: String,
    },
    /// Rename a trip
    Rename {
        /// Trip id to rename
        #[arg(long)]
        trip: i64,
        /// The new name
        name: String,
    },
    /// Remove a place from a trip
    RemovePlace {
        /// Trip id the place belongs to
        #[arg(long)]
        trip: i64,
        /// The place's row id, not its provider id
        #[arg(long)]
        place: i64,
    },
    /// Delete a trip
    DeleteTrip {
        /// Trip id to delete
        trip: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = tripkit_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Login { email, password } => {
            commands::run_login(&config, &email, &password).await
        }
        Commands::Trips => commands::run_trips(&config).await,
        Commands::Search { query, pick } => commands::run_search(&config, &query, pick).await,
        Commands::Attach { trip, place_id } => {
            commands::run_attach(&config, trip, &place_id).await
        }
        Commands::Rename { trip, name } => commands::run_rename(&config, trip, &name).await,
        Commands::RemovePlace { trip, place } => {
            commands::run_remove_place(&config, trip, place).await
        }
        Commands::DeleteTrip { trip } => commands::run_delete_trip(&config, trip).await,
    }
}
