//! `liftmatch`: run one engine query against a JSON snapshot.

mod commands;
mod snapshot;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "liftmatch",
    about = "Lift matching and route planning over a JSON snapshot",
    long_about = "Loads a snapshot of live offers, requests, jobs and check-ins,\n\
                  runs a single engine query and prints the result as JSON."
)]
struct Cli {
    /// Engine config (JSON). Fields it omits keep their defaults.
    #[arg(long, env = "LIFTMATCH_CONFIG")]
    config: Option<PathBuf>,
    /// Log engine decisions to stderr (overrides RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
    /// Snapshot of live collections (JSON)
    snapshot: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank active requests an offer could serve
    RankRequests {
        #[arg(long)]
        offer: String,
    },
    /// Rank active offers with free seats for a request
    RankOffers {
        #[arg(long)]
        request: String,
    },
    /// Checked-in drivers near a point
    Nearby {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        /// Reference time (ISO 8601); defaults to the current time
        #[arg(long)]
        now: Option<String>,
    },
    /// Other users' jobs ending near a job, in space and time
    Collisions {
        #[arg(long)]
        job: String,
    },
    /// Order legs from a start point and estimate timings
    Plan {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
        /// JSON array of legs
        #[arg(long)]
        legs: PathBuf,
        /// Departure time (ISO 8601)
        #[arg(long)]
        depart: String,
    },
    /// Offer/request density along an encoded polyline
    Density {
        #[arg(long)]
        polyline: String,
        /// Window start (ISO 8601)
        #[arg(long)]
        from: String,
        /// Window end (ISO 8601)
        #[arg(long)]
        to: String,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = snapshot::load_config(cli.config.as_deref())?;
    let load = || snapshot::load_snapshot(&cli.snapshot);
    let output = match &cli.command {
        Commands::RankRequests { offer } => commands::rank_requests(&load()?, &config, offer)?,
        Commands::RankOffers { request } => commands::rank_offers(&load()?, &config, request)?,
        Commands::Nearby { lat, lng, now } => {
            commands::nearby(&load()?, &config, *lat, *lng, now.as_deref())?
        }
        Commands::Collisions { job } => commands::collisions(&load()?, &config, job)?,
        // Planning only reads the legs file.
        Commands::Plan {
            lat,
            lng,
            legs,
            depart,
        } => commands::plan(&config, *lat, *lng, legs, depart)?,
        Commands::Density { polyline, from, to } => {
            commands::density(&load()?, &config, polyline, from, to)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
