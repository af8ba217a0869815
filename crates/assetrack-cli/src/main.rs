//! Assetrack CLI - command-line access to items, sensors, and events.

use assetrack_model::UniquenessScope;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;
mod payload;
mod session;

use commands::{count, create, delete, events, get, ingest, init, list, update};
use session::{Kind, Session};

#[derive(Parser)]
#[command(name = "assetrack")]
#[command(about = "Assetrack item, sensor, and event store CLI")]
struct Cli {
    /// Path to the store journal
    #[arg(long, global = true, env = "ASSETRACK_STORE", default_value = "assetrack.atj")]
    store: PathBuf,
    /// Refuse to open a journal with a truncated tail
    #[arg(long, global = true)]
    strict: bool,
    /// Per-operation deadline in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,
    /// Which existing records uniqueness checks consider: active, deleted, or any
    #[arg(long, global = true, default_value = "active")]
    uniqueness: UniquenessScope,
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the unique indexes for every collection
    Init,
    /// Create a record from a JSON payload
    Create {
        /// Record kind
        kind: Kind,
        /// JSON object, or @FILE to read it from a file
        payload: String,
    },
    /// Show the active record with the given identifier
    Get {
        /// Record kind
        kind: Kind,
        /// Business identifier (item_id, sensor_id, or event_timestamp)
        id: String,
    },
    /// List active records
    List {
        /// Record kind
        kind: Kind,
        /// Output as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Search active records by regular expression
    Search {
        /// Record kind
        kind: Kind,
        /// Pattern matched against the kind's search fields
        pattern: String,
        /// Match the pattern as plain text
        #[arg(long)]
        literal: bool,
        /// Output as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Count active records
    Count {
        /// Record kind
        kind: Kind,
    },
    /// Apply a JSON payload to an existing record
    Update {
        /// Record kind
        kind: Kind,
        /// Business identifier of the record
        id: String,
        /// JSON object, or @FILE to read it from a file
        payload: String,
    },
    /// Soft-delete a record
    Delete {
        /// Record kind
        kind: Kind,
        /// Business identifier of the record
        id: String,
    },
    /// Filter events by sensor, item, and time range
    Events {
        /// Sensor id (repeat for any of several)
        #[arg(long = "sensor")]
        sensors: Vec<String>,
        /// Item id (repeat for any of several)
        #[arg(long = "item")]
        items: Vec<String>,
        /// Inclusive lower bound on event_timestamp
        #[arg(long, requires = "end")]
        start: Option<String>,
        /// Inclusive upper bound on event_timestamp
        #[arg(long, requires = "start")]
        end: Option<String>,
        /// Output as JSON lines
        #[arg(long)]
        json: bool,
    },
    /// Record a sensor reading as an event
    Ingest {
        /// Reporting sensor id
        #[arg(long)]
        sensor: String,
        /// Observed tag id
        #[arg(long)]
        tag: String,
        /// Event timestamp
        #[arg(long)]
        timestamp: String,
        /// Reading details as JSON, or @FILE
        #[arg(long, default_value = "{}")]
        details: String,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::open(&cli.store, cli.strict, cli.timeout_ms, cli.uniqueness)?;

    match cli.command {
        Commands::Init => init::run(&session),
        Commands::Create { kind, payload } => create::run(&session, kind, &payload),
        Commands::Get { kind, id } => get::run(&session, kind, &id),
        Commands::List { kind, json } => list::run(&session, kind, None, json),
        Commands::Search {
            kind,
            pattern,
            literal,
            json,
        } => list::run(&session, kind, Some((pattern.as_str(), literal)), json),
        Commands::Count { kind } => count::run(&session, kind),
        Commands::Update { kind, id, payload } => update::run(&session, kind, &id, &payload),
        Commands::Delete { kind, id } => delete::run(&session, kind, &id),
        Commands::Events {
            sensors,
            items,
            start,
            end,
            json,
        } => events::run(&session, sensors, items, start.zip(end), json),
        Commands::Ingest {
            sensor,
            tag,
            timestamp,
            details,
        } => ingest::run(&session, sensor, tag, &timestamp, &details),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
