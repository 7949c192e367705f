//! Standalone Vault mock server
//!
//! Environment:
//! - `PORT` (default 8200)
//! - `VAULT_MOCK_TOKEN` required token, unset accepts any
//! - `VAULT_MOCK_DEFAULT_LEASE_TTL_SECS`, `VAULT_MOCK_MAX_LEASE_TTL_SECS`
//!   system TTL defaults (default 720h)

use std::env;
use std::net::SocketAddr;
use tracing::info;
use vault_mock_server::{router, AppState, MockConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let port = env::var("PORT")
        .unwrap_or_else(|_| "8200".to_string())
        .parse::<u16>()
        .map_err(|e| anyhow::anyhow!("PORT must be a valid u16: {e}"))?;

    let config = MockConfig::from_env();
    info!("Starting Vault mock server...");
    if config.token.is_some() {
        info!("Token authentication enabled");
    }
    info!(
        "System lease TTLs: default={}s max={}s",
        config.default_lease_ttl_secs, config.max_lease_ttl_secs
    );

    let app = router(AppState::new(&config));
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("✅ Vault mock server ready at http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
