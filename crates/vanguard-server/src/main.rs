//! Combat-unit agent server: per-tick decisions over HTTP.
//!
//! The engine posts observed state to `/agent/action` each tick and gets a
//! movement/firing command back; `/agent/destroy` and `/agent/end` mark unit
//! removal and episode boundaries.

mod dto;
mod handlers;

use std::path::PathBuf;

use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use vanguard_agent::{AgentConfig, AgentRuntime};

#[derive(Parser)]
#[command(name = "vanguard-server")]
#[command(about = "Autonomous combat-unit agent", version)]
struct Cli {
    /// Bind address
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Bind port
    #[arg(long, default_value_t = 8170)]
    port: u16,

    /// Agent name reported on the liveness probe
    #[arg(long, default_value = "vanguard")]
    name: String,

    /// Agent configuration file (YAML); defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Shared per-process state: the runtime plus probe identity.
pub struct AppState {
    pub name: String,
    /// Sticky startup flag: the aim checkpoint failed to load.
    pub degraded: bool,
    pub runtime: AgentRuntime,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    fmt().with_env_filter(filter).with_target(false).init();

    let config = match &cli.config {
        Some(path) => AgentConfig::load(path)?,
        None => AgentConfig::default(),
    };

    // Rule artifacts are fatal here; a degraded aim predictor is not.
    let runtime = AgentRuntime::build(config).context("agent startup failed")?;
    let status = runtime.status();
    if let Some(reason) = &status.degraded_reason {
        warn!(%reason, "serving with coarse-only aiming");
    }
    info!(
        name = %cli.name,
        backend = status.weapon_backend,
        "agent ready"
    );

    let state = web::Data::new(AppState {
        name: cli.name,
        degraded: status.degraded_reason.is_some(),
        runtime,
    });

    info!(host = %cli.host, port = cli.port, "listening");
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(handlers::configure)
    })
    .bind((cli.host.as_str(), cli.port))?
    .run()
    .await?;

    Ok(())
}
