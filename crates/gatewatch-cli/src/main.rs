//! CLI for gatewatch: live 4G/5G signal telemetry from a home cellular gateway.

mod commands;
mod tui;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "gatewatch")]
#[command(about = "gatewatch — live 4G/5G signal telemetry from a home cellular gateway")]
#[command(version = gatewatch_core::VERSION)]
struct Cli {
    /// Gateway base URL (overrides GATEWATCH_URL)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Gateway model identifier (overrides GATEWATCH_MODEL). Without one, nothing is polled.
    #[arg(long, global = true)]
    model: Option<String>,

    /// Read signal snapshots from a JSON file instead of the gateway
    #[arg(long, global = true)]
    fixture: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print one line per poll; Ctrl+C prints the best/worst summary
    Watch {
        /// Poll interval in milliseconds (default: GATEWATCH_INTERVAL_MS or 2000)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        interval_ms: Option<u64>,

        /// Stop after this many polls
        #[arg(long)]
        count: Option<u64>,

        /// Emit one JSON object per sample
        #[arg(long)]
        json: bool,
    },

    /// Live interactive signal dashboard (TUI)
    Monitor {
        /// Poll interval in milliseconds (default: GATEWATCH_INTERVAL_MS or 2000)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        interval_ms: Option<u64>,
    },

    /// Show device, cell-site and client details
    Info,

    /// Poll in the background and serve the signal over HTTP
    Server {
        /// Port to listen on
        #[arg(long, default_value = "8043")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Poll interval in milliseconds (default: GATEWATCH_INTERVAL_MS or 2000)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        interval_ms: Option<u64>,
    },
}

/// Log to stderr, filtered by `RUST_LOG`. The TUI owns the terminal, so it
/// stays silent unless asked.
fn init_logging(tui: bool) {
    let default_filter = if tui { "off" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(matches!(cli.command, Commands::Monitor { .. }));

    let opts = commands::GlobalOpts {
        url: cli.url,
        model: cli.model,
        fixture: cli.fixture,
    };

    match cli.command {
        Commands::Watch {
            interval_ms,
            count,
            json,
        } => commands::watch::run(&opts, interval_ms, count, json),
        Commands::Monitor { interval_ms } => commands::monitor::run(&opts, interval_ms),
        Commands::Info => commands::info::run(&opts),
        Commands::Server {
            port,
            host,
            interval_ms,
        } => commands::server::run(&opts, &host, port, interval_ms),
    }
}
