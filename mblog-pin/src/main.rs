//! mblog-pin - pinning gateway for Mini Blogs
//!
//! Holds the pinning service credential and exposes upload endpoints to
//! publishers. Default address: 127.0.0.1:5780.

use anyhow::{Context, Result};
use clap::Parser;
use mblog_common::config::{
    self, load_toml_config, resolve_max_upload_bytes, resolve_optional, resolve_setting,
    DEFAULT_PIN_BIND,
};
use mblog_pin::services::pinata_client::{DEFAULT_GATEWAY, DEFAULT_PINATA_API_URL};
use mblog_pin::services::PinataClient;
use mblog_pin::{build_router, AppState};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "mblog-pin", version, about = "Pinning gateway for Mini Blogs")]
struct Args {
    /// Config file (default: ~/.config/mblog/config.toml)
    #[arg(long, env = "MBLOG_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long)]
    bind: Option<String>,

    /// Gateway domain used to build content URLs
    #[arg(long)]
    gateway: Option<String>,

    /// Pinning service upload API base URL
    #[arg(long)]
    pinata_api_url: Option<String>,

    /// Maximum request body in bytes
    #[arg(long)]
    max_upload_bytes: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = config::config_path(args.config.as_deref());
    let toml_config = load_toml_config(config_path.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&toml_config.logging.level)),
        )
        .init();

    info!(
        "Starting mblog-pin v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let pin = &toml_config.pin;

    // Credential comes from the environment or the config file, never the command line
    let jwt = resolve_optional(None, "MBLOG_PINATA_JWT", pin.pinata_jwt.as_deref())
        .context("Pinning credential not configured. Set MBLOG_PINATA_JWT or [pin] pinata_jwt")?;

    let bind = resolve_setting(
        args.bind.as_deref(),
        "MBLOG_PIN_BIND",
        pin.bind.as_deref(),
        DEFAULT_PIN_BIND,
    );
    let gateway = resolve_setting(
        args.gateway.as_deref(),
        "MBLOG_GATEWAY_URL",
        pin.gateway.as_deref(),
        DEFAULT_GATEWAY,
    );
    let api_url = resolve_setting(
        args.pinata_api_url.as_deref(),
        "MBLOG_PINATA_API_URL",
        pin.pinata_api_url.as_deref(),
        DEFAULT_PINATA_API_URL,
    );
    let max_upload_bytes = resolve_max_upload_bytes(args.max_upload_bytes, pin.max_upload_bytes)?;

    info!("Gateway: {}", gateway);
    info!("Pinning API: {}", api_url);
    info!("Upload limit: {} bytes", max_upload_bytes);

    let pinata = PinataClient::new(jwt, api_url, gateway)
        .map_err(|e| anyhow::anyhow!("Failed to create pinning client: {}", e))?;

    let state = AppState::new(pinata, max_upload_bytes);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!("mblog-pin listening on http://{}", bind);
    info!("Health check: http://{}/health", bind);

    axum::serve(listener, app).await?;

    Ok(())
}
