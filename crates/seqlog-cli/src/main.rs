//! seqlog CLI - read, write and check record-separated JSON event logs.

use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{append, cat, check};

#[derive(Parser)]
#[command(name = "seqlog")]
#[command(about = "Read, write and check record-separated JSON event logs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the events in a log
    Cat {
        /// Path to log file (or stdin if not provided)
        log: Option<String>,
        /// Output each event as one line of JSON
        #[arg(long)]
        json: bool,
        /// Stop after printing N events (default: unlimited)
        #[arg(long)]
        max_events: Option<u64>,
    },
    /// Append JSON-lines events to a log
    Append {
        /// Path to log file (created if missing)
        log: String,
        /// Input file with one JSON object per line (or stdin if not provided)
        input: Option<String>,
        /// Fsync after each event
        #[arg(long)]
        sync: bool,
    },
    /// Count events and skipped records in a log
    Check {
        /// Path to log file
        log: String,
        /// Exit with error code if any record was skipped
        #[arg(long)]
        strict: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_env("SEQLOG_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Cat {
            log,
            json,
            max_events,
        } => cat::run(log, json, max_events),
        Commands::Append { log, input, sync } => append::run(log, input, sync),
        Commands::Check { log, strict, json } => check::run(log, strict, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
