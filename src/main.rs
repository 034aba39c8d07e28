use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use vminv::gcp::auth;
use vminv::gcp::compute::GcpComputeProvider;
use vminv::inventory::service::LifecycleService;
use vminv::server::{self, AppState};

/// HTTP service for GCP Compute Engine instance inventory and lifecycle
#[derive(Parser, Debug)]
#[command(name = "vminv", version, about, long_about = None)]
struct Args {
    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Default GCP project for requests that omit one
    #[arg(short, long)]
    project: Option<String>,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_directive(self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

fn setup_logging(level: LogLevel) {
    // RUST_LOG wins over the flag when set.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    setup_logging(args.log_level);

    let project = args
        .project
        .clone()
        .or_else(auth::get_default_project)
        .ok_or_else(|| {
            anyhow::anyhow!(
                "No GCP project configured. Set GOOGLE_CLOUD_PROJECT or use --project"
            )
        })?;

    tracing::info!("Using default project: {}", project);

    let provider = GcpComputeProvider::new().await?;
    let state = Arc::new(AppState {
        service: LifecycleService::new(Arc::new(provider), project),
    });

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, server::router(state)).await?;

    Ok(())
}
