//! Vault Mock Server
//!
//! In-memory stand-in for the parts of the HashiCorp Vault HTTP API that the
//! mount reconciler uses:
//! - `sys/mounts` listing, enable, tune and disable
//! - `sys/remount` with migration status
//! - a logical key/value data plane under any mounted path
//! - token checks, request logging and health endpoint
//!
//! Integration tests start it on an ephemeral port with [`spawn_ephemeral`].

pub mod handlers;
pub mod store;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state, Next},
    response::Response,
    routing::{any, get, post},
    Router,
};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use store::{VaultStore, SYSTEM_DEFAULT_LEASE_TTL_SECS};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

const HEALTH_PATH: &str = "/v1/sys/health";

/// Mock server settings
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Required `X-Vault-Token`; any token is accepted when unset
    pub token: Option<String>,
    pub default_lease_ttl_secs: u64,
    pub max_lease_ttl_secs: u64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            token: None,
            default_lease_ttl_secs: SYSTEM_DEFAULT_LEASE_TTL_SECS,
            max_lease_ttl_secs: SYSTEM_DEFAULT_LEASE_TTL_SECS,
        }
    }
}

impl MockConfig {
    pub fn with_token(token: &str) -> Self {
        Self {
            token: Some(token.to_string()),
            ..Self::default()
        }
    }

    /// Load settings from `VAULT_MOCK_*` environment variables
    pub fn from_env() -> Self {
        let secs = |key: &str| {
            std::env::var(key)
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(SYSTEM_DEFAULT_LEASE_TTL_SECS)
        };
        Self {
            token: std::env::var("VAULT_MOCK_TOKEN")
                .ok()
                .filter(|t| !t.is_empty()),
            default_lease_ttl_secs: secs("VAULT_MOCK_DEFAULT_LEASE_TTL_SECS"),
            max_lease_ttl_secs: secs("VAULT_MOCK_MAX_LEASE_TTL_SECS"),
        }
    }
}

/// Application state shared by all handlers
#[derive(Clone, Debug)]
pub struct AppState {
    pub store: Arc<RwLock<VaultStore>>,
    pub token: Option<String>,
    /// Failures returned, in order, instead of handling matching requests
    faults: Arc<Mutex<VecDeque<Fault>>>,
}

/// Injected failure, for any API path or only for one
#[derive(Clone, Debug)]
struct Fault {
    path: Option<String>,
    status: StatusCode,
}

impl Fault {
    fn matches(&self, path: &str) -> bool {
        match &self.path {
            Some(target) => target == path,
            None => true,
        }
    }
}

impl AppState {
    pub fn new(config: &MockConfig) -> Self {
        Self {
            store: Arc::new(RwLock::new(VaultStore::new(
                config.default_lease_ttl_secs,
                config.max_lease_ttl_secs,
            ))),
            token: config.token.clone(),
            faults: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Fail the next `count` API requests with `status`
    pub async fn inject_failures(&self, status: StatusCode, count: usize) {
        let fault = Fault { path: None, status };
        self.faults
            .lock()
            .await
            .extend(std::iter::repeat(fault).take(count));
    }

    /// Fail the next `count` requests for exactly `path` (`/v1/...`) with `status`
    pub async fn inject_failures_at(&self, path: &str, status: StatusCode, count: usize) {
        let fault = Fault {
            path: Some(path.to_string()),
            status,
        };
        self.faults
            .lock()
            .await
            .extend(std::iter::repeat(fault).take(count));
    }
}

/// Request logging middleware
/// Logs method, path, namespace, response status and duration
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let namespace = request
        .headers()
        .get("x-vault-namespace")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("root")
        .to_string();
    let start = std::time::Instant::now();

    info!("→ {} {} [namespace: {}]", method, path, namespace);
    let response = next.run(request).await;
    info!(
        "← {} {} [{}] [{:.3}s]",
        method,
        path,
        response.status().as_u16(),
        start.elapsed().as_secs_f64()
    );
    response
}

/// Returns injected failures before the request reaches a handler
pub async fn fault_injection_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if path != HEALTH_PATH {
        let mut faults = state.faults.lock().await;
        if let Some(index) = faults.iter().position(|fault| fault.matches(path)) {
            if let Some(fault) = faults.remove(index) {
                warn!("Injected failure on {} - returning {}", path, fault.status.as_u16());
                return handlers::error_response(fault.status, "injected failure");
            }
        }
    }
    next.run(request).await
}

/// Rejects requests without the configured `X-Vault-Token`
pub async fn token_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(expected) = &state.token {
        if request.uri().path() != HEALTH_PATH {
            let presented = request
                .headers()
                .get("x-vault-token")
                .and_then(|v| v.to_str().ok());
            if presented != Some(expected.as_str()) {
                warn!("Rejected request with missing or invalid token");
                return handlers::error_response(StatusCode::FORBIDDEN, "permission denied");
            }
        }
    }
    next.run(request).await
}

/// Build the mock's router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(HEALTH_PATH, get(handlers::health_check))
        .route("/v1/sys/mounts", get(handlers::list_mounts))
        .route("/v1/sys/mounts/{*path}", any(handlers::mount_path))
        .route("/v1/sys/remount", post(handlers::remount))
        .route(
            "/v1/sys/remount/status/{migration_id}",
            get(handlers::remount_status),
        )
        .fallback(handlers::logical)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(from_fn(logging_middleware))
                .layer(from_fn_with_state(state.clone(), fault_injection_middleware))
                .layer(from_fn_with_state(state.clone(), token_middleware)),
        )
        .with_state(state)
}

/// Mock server running in the background of the current runtime
#[derive(Debug)]
pub struct MockVault {
    addr: SocketAddr,
    state: AppState,
    task: JoinHandle<()>,
}

impl MockVault {
    /// Base address to hand to a Vault client (`http://127.0.0.1:<port>`)
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }
}

impl Drop for MockVault {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Serve the mock on `127.0.0.1` with an OS-assigned port
///
/// # Errors
/// Returns an error if the listener cannot be bound
pub async fn spawn_ephemeral(config: MockConfig) -> anyhow::Result<MockVault> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = AppState::new(&config);
    let app = router(state.clone());

    let task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Vault mock server error: {}", e);
        }
    });
    info!("Vault mock server listening on {}", addr);

    Ok(MockVault { addr, state, task })
}
