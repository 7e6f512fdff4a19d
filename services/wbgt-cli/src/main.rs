//! WBGT command-line tool.
//!
//! Repairs gaps in gridded climate fields and aggregates them over county
//! or tract polygons.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

use wbgt_cli::{run_aggregate, run_fill, AggregateArgs, FillArgs};

#[derive(Parser, Debug)]
#[command(name = "wbgt-cli")]
#[command(about = "Gap filling and zonal aggregation of gridded WBGT fields")]
struct Cli {
    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fill missing grid cells with their nearest defined neighbour
    Fill(FillArgs),
    /// Area-weighted averages of grid fields over region polygons
    Aggregate(AggregateArgs),
}

fn init_tracing(log_level: &str, json: bool) {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // RUST_LOG wins over --log-level when set.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_json);

    match cli.command {
        Command::Fill(args) => {
            info!(input = %args.input.display(), "Starting gap fill");
            run_fill(&args)
        }
        Command::Aggregate(args) => {
            info!(
                grid = %args.grid.display(),
                regions = %args.regions.display(),
                geography = %args.geography,
                "Starting zonal aggregation"
            );
            run_aggregate(&args).map(|_| ())
        }
    }
}
