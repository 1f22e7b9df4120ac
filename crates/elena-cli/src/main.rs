use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use elena_cli::output::{render, OutputFormat};
use elena_lib::{
    plan_path_with_deadline, ChunkCache, FinderOptions, GeoSource, Geocoder, PathRequest,
    SearchAlgorithm, SqliteSource, DEFAULT_CHUNK_SIZE,
};

const DEFAULT_DATA_PATH: &str = "/data/elena.db";

#[derive(Parser, Debug)]
#[command(author, version, about = "Elevation-aware route planning")]
struct Cli {
    /// Road dataset (SQLite). Falls back to ELENA_DATA_PATH, then /data/elena.db.
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Plan a route and compare it with the shortest path.
    Route(RouteArgs),
    /// Look up the coordinates of a place name.
    Geocode {
        /// Place name; close misspellings are accepted.
        place: String,
    },
}

#[derive(Args, Debug)]
struct RouteArgs {
    /// Start as "(lat, lon)".
    #[arg(long = "from")]
    from: String,
    /// Destination as "(lat, lon)".
    #[arg(long = "to")]
    to: String,
    /// Distance budget in percent of the shortest path (at least 100).
    #[arg(long, default_value = "100")]
    distance: String,
    /// shortest, minimal or maximal.
    #[arg(long, default_value = "shortest")]
    elevation: String,
    /// bounded or loading.
    #[arg(long, default_value = "bounded")]
    graph: String,
    /// Algorithm for the shortest and least-climb searches.
    #[arg(long, default_value = "a-star")]
    algorithm: SearchAlgorithm,
    /// Midpoints evaluated for maximal routes.
    #[arg(long, default_value_t = elena_lib::search::DEFAULT_KEEP_N)]
    keep_n: usize,
    /// Hop radius pruned around each evaluated midpoint.
    #[arg(long, default_value_t = elena_lib::search::DEFAULT_PRUNE_DEPTH)]
    prune_depth: usize,
    /// Give up after this many seconds.
    #[arg(long, default_value_t = 80, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let data_path = resolve_data_path(cli.data);

    match cli.command {
        Command::Route(args) => handle_route(&data_path, &args),
        Command::Geocode { place } => handle_geocode(&data_path, &place),
    }
}

fn resolve_data_path(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var_os("ELENA_DATA_PATH").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH))
}

fn open_source(data_path: &Path) -> Result<SqliteSource> {
    SqliteSource::open(data_path)
        .with_context(|| format!("failed to open road dataset at {}", data_path.display()))
}

fn handle_route(data_path: &Path, args: &RouteArgs) -> Result<()> {
    let request = PathRequest::parse(
        &args.from,
        &args.to,
        &args.distance,
        &args.elevation,
        &args.graph,
    )
    .context("invalid route request")?;

    let source: Arc<dyn GeoSource> = Arc::new(open_source(data_path)?);
    let cache = Arc::new(ChunkCache::new(DEFAULT_CHUNK_SIZE));
    let options = FinderOptions {
        shortest_algorithm: args.algorithm,
        minimal_algorithm: args.algorithm,
        keep_n: args.keep_n,
        prune_depth: args.prune_depth,
    };

    let comparison = plan_path_with_deadline(
        source,
        &cache,
        &request,
        &options,
        Duration::from_secs(args.timeout),
    )
    .context("route planning failed")?;

    render(&mut io::stdout().lock(), args.format, &request, &comparison)
        .context("failed to write route")?;
    Ok(())
}

fn handle_geocode(data_path: &Path, place: &str) -> Result<()> {
    let source = open_source(data_path)?;
    let Some(position) = source.geocode(place) else {
        bail!("no place matching '{place}' in the dataset");
    };
    println!("({}, {})", position.lat, position.lon);
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
