//! TextMate Server Binary
//!
//! Starts the HTTP API server.
//!
//! ## Usage
//!
//! ```bash
//! # Start with default settings
//! cargo run --bin textmate-server
//!
//! # Override the bind address
//! cargo run --bin textmate-server -- --host 0.0.0.0 --port 9090
//! ```

use clap::Parser;
use std::env;
use std::sync::{Arc, OnceLock};

use textmate::config::{Config, LoggingConfig};
use textmate::rest;
use textmate::App;

#[derive(Debug, Parser)]
#[command(name = "textmate-server", about = "TextMate HTTP API server")]
struct Args {
    /// Bind address override
    #[arg(long)]
    host: Option<String>,

    /// Bind port override
    #[arg(long)]
    port: Option<u16>,

    /// Configuration file (defaults to config.toml / config.local.toml)
    #[arg(long)]
    config: Option<String>,
}

static LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load().unwrap_or_else(|_| {
            eprintln!("Using default configuration");
            Config::default()
        }),
    };
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    init_tracing(&config.logging);

    let server_config = config.server.clone();
    let app = Arc::new(App::from_config(config)?);

    rest::start_server(app, &server_config)
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    // Environment variable takes precedence over the config file value
    let level = env::var("TEXTMATE_LOG").unwrap_or_else(|_| logging.level.clone());
    let json = logging.format == "json";
    let filter = || {
        tracing_subscriber::EnvFilter::try_new(&level)
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    };

    let subscriber: Box<dyn tracing::Subscriber + Send + Sync> = match &logging.file {
        Some(path) => {
            let file = match std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
            {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("ERROR: unable to open log file '{}': {e}", path.display());
                    return;
                }
            };
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            let _ = LOG_GUARD.set(guard);

            let base = tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_ansi(false)
                .with_writer(non_blocking);
            if json {
                Box::new(base.json().finish())
            } else {
                Box::new(base.compact().finish())
            }
        }
        None => {
            let base = tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_writer(std::io::stderr);
            if json {
                Box::new(base.json().finish())
            } else {
                Box::new(base.compact().finish())
            }
        }
    };

    let _ = tracing::subscriber::set_global_default(subscriber);
}
