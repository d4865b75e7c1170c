//! Command-line interface for the Blockparty engine.
//!
//! Operates on a SQLite database: serve a recommendation feed, record
//! feedback, or list events in a time window. Output is JSON on stdout.
#![forbid(unsafe_code)]

use std::path::PathBuf;

use blockparty_core::{SqliteStore, SqliteStoreError, StoreError, WhenFilter, time_window};
use blockparty_scorer::{
    FeedbackError, RecommendError, RecommendRequest, RecommendWeights, RecommendationEngine,
    apply_feedback,
};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use geo::Coord;
use thiserror::Error;

/// Run the Blockparty CLI with the current process arguments and
/// environment.
///
/// # Errors
/// Returns [`CliError`] for argument, store, or engine failures.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let output = execute(cli.command)?;
    println!("{output}");
    Ok(())
}

fn execute(command: Command) -> Result<String, CliError> {
    match command {
        Command::Recommend(args) => run_recommend(args),
        Command::Feedback(args) => run_feedback(args),
        Command::List(args) => run_list(args),
    }
}

fn run_recommend(args: RecommendArgs) -> Result<String, CliError> {
    let store = SqliteStore::open(&args.db)?;
    let weights = RecommendWeights::from_env()?;
    let engine = RecommendationEngine::new(weights)?;

    let when = args.when.as_deref().map(parse_when).transpose()?;
    let mut request = RecommendRequest::new(
        args.user,
        Coord {
            x: args.lng,
            y: args.lat,
        },
    );
    request.radius_km = args.radius_km;
    request.when = when;
    request.vibes = args.vibe;
    request.max = args.max;

    let feed = engine.recommend(&store, &request, Utc::now())?;
    serde_json::to_string_pretty(&feed).map_err(CliError::Serialise)
}

fn run_feedback(args: FeedbackArgs) -> Result<String, CliError> {
    let store = SqliteStore::open(&args.db)?;
    let action = args
        .action
        .parse()
        .map_err(|err: blockparty_core::InteractionError| CliError::InvalidArgument {
            field: "action",
            message: err.to_string(),
        })?;
    let interaction = apply_feedback(
        &store,
        &args.user,
        &args.event,
        action,
        args.dwell_ms,
        Utc::now(),
    )?;
    serde_json::to_string_pretty(&interaction).map_err(CliError::Serialise)
}

fn run_list(args: ListArgs) -> Result<String, CliError> {
    use blockparty_core::EventStore;

    let store = SqliteStore::open(&args.db)?;
    let when = parse_when(&args.when)?;
    let window = time_window(when, Utc::now());
    let events = store.events_in_window(&window)?;
    serde_json::to_string_pretty(&events).map_err(CliError::Serialise)
}

fn parse_when(raw: &str) -> Result<WhenFilter, CliError> {
    raw.parse().map_err(|message| CliError::InvalidArgument {
        field: "when",
        message,
    })
}

#[derive(Debug, Parser)]
#[command(
    name = "blockparty",
    about = "Hyperlocal events recommendation utilities",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve a personalised recommendation feed.
    Recommend(RecommendArgs),
    /// Record an interaction and apply its popularity and trust deltas.
    Feedback(FeedbackArgs),
    /// List events starting inside a time window.
    List(ListArgs),
}

#[derive(Debug, Args)]
struct RecommendArgs {
    /// Path to the SQLite database.
    #[arg(long, value_name = "path")]
    db: PathBuf,
    /// Requesting user id.
    #[arg(long, value_name = "id")]
    user: String,
    /// Latitude of the search origin in degrees.
    #[arg(long, allow_hyphen_values = true)]
    lat: f64,
    /// Longitude of the search origin in degrees.
    #[arg(long, allow_hyphen_values = true)]
    lng: f64,
    /// Search radius in kilometres.
    #[arg(long, default_value_t = blockparty_scorer::DEFAULT_RADIUS_KM)]
    radius_km: f64,
    /// Time-window preference: now, tonight, weekend, or later.
    #[arg(long)]
    when: Option<String>,
    /// Extra vibe filter; repeat for several.
    #[arg(long = "vibe", value_name = "tag")]
    vibe: Vec<String>,
    /// Maximum number of results (hard-capped at 50).
    #[arg(long, default_value_t = blockparty_scorer::DEFAULT_MAX_RESULTS)]
    max: usize,
}

#[derive(Debug, Args)]
struct FeedbackArgs {
    /// Path to the SQLite database.
    #[arg(long, value_name = "path")]
    db: PathBuf,
    /// Reacting user id.
    #[arg(long, value_name = "id")]
    user: String,
    /// Target event id.
    #[arg(long, value_name = "id")]
    event: String,
    /// One of: view, cosign, going, hide.
    #[arg(long)]
    action: String,
    /// Milliseconds spent on the detail view (views only).
    #[arg(long)]
    dwell_ms: Option<u32>,
}

#[derive(Debug, Args)]
struct ListArgs {
    /// Path to the SQLite database.
    #[arg(long, value_name = "path")]
    db: PathBuf,
    /// Window to list: now, tonight, weekend, or later.
    #[arg(long)]
    when: String,
}

/// Errors emitted by the Blockparty CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// An argument value failed domain parsing.
    #[error("invalid {field}: {message}")]
    InvalidArgument {
        /// Name of the offending argument.
        field: &'static str,
        /// Human-readable description of the problem.
        message: String,
    },
    /// Opening the database failed.
    #[error(transparent)]
    OpenStore(#[from] SqliteStoreError),
    /// A store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Serving the recommendation failed.
    #[error(transparent)]
    Recommend(#[from] RecommendError),
    /// Applying feedback failed.
    #[error(transparent)]
    Feedback(#[from] FeedbackError),
    /// Serialising the JSON output failed.
    #[error("failed to serialise output")]
    Serialise(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests;
