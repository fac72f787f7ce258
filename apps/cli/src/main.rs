//! # estate
//!
//! Command line shell for sales operators.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          CLI Startup                                    │
//! │                                                                         │
//! │  1. Parse arguments (clap)                                              │
//! │  2. Initialize logging                                                  │
//! │     • tracing-subscriber with env filter                                │
//! │     • Default: INFO, can be overridden with RUST_LOG                    │
//! │  3. Load ClientConfig (file → ESTATE_* env → validate)                  │
//! │     • `estate config ...` stops here, no session needed                 │
//! │  4. Build Session from ESTATE_TOKEN / ESTATE_ROLE / ...                 │
//! │  5. Dispatch the subcommand                                             │
//! │  6. Print `[CODE] message` and exit 1 on any error                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod commands;
mod output;

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use estate_client::{ActionError, ClientConfig, RestClient, Session};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use commands::{Command, ConfigCommand, Context};

#[derive(Parser, Debug)]
#[command(name = "estate")]
#[command(about = "Flat bookings, payments and customer lookup for Estate ERP", long_about = None)]
struct Cli {
    /// Path to client.toml (defaults to the platform config directory)
    #[arg(long, global = true, env = "ESTATE_CONFIG")]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: TopCommand,
}

#[derive(Subcommand, Debug)]
enum TopCommand {
    /// Write or show client.toml
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },

    #[command(flatten)]
    Backend(Command),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing();

    if let Err(e) = run(cli).await {
        eprintln!("{}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), ActionError> {
    let command = match cli.command {
        TopCommand::Config { action } => return commands::configure(cli.config, action, cli.json),
        TopCommand::Backend(command) => command,
    };

    let config = ClientConfig::load(cli.config)?;
    let session = Session::from_env()?;
    info!(user = %session.display_name(), role = %session.role, "Signed in");
    debug!(base_url = %config.api.base_url, "Using backend");

    let backend = Arc::new(RestClient::new(&config, session.clone())?);
    let context = Context::new(backend, session, cli.json);

    commands::dispatch(&context, command).await
}

/// Initializes the tracing subscriber for logging.
///
/// Logs go to stderr so command output on stdout stays pipeable.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
