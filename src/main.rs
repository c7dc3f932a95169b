use anyhow::Result;
use cellarium_core::config::AppConfig;
use cellarium_server::{router, AppState};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Custom config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Override the listen address, e.g. 0.0.0.0:3000
    #[arg(short, long)]
    addr: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "cellarium=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = load_config(&args.config)?;

    let addr: SocketAddr = match &args.addr {
        Some(addr) => addr.parse()?,
        None => format!("{}:{}", config.server.host, config.server.port).parse()?,
    };

    let state = Arc::new(AppState::new(config));
    let app = router(Arc::clone(&state));

    tracing::info!("Cellarium server listening on {}", addr);
    tracing::info!("    Control API: http://{}/api/life/state", addr);
    tracing::info!("    Updates:     ws://{}/ws/updates", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Reads the config file, falling back to defaults when it is absent.
/// A present-but-invalid file is a startup error, not a silent fallback.
fn load_config(path: &str) -> Result<AppConfig> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let config = AppConfig::from_toml(&content)?;
            tracing::info!("Loaded configuration from {}", path);
            Ok(config)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!("{} not found; using default configuration", path);
            Ok(AppConfig::default())
        }
        Err(e) => Err(e.into()),
    }
}
