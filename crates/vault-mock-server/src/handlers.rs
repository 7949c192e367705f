//! Route handlers for the mocked `sys/` API and the logical data plane
//!
//! Responses follow Vault's shapes: payloads inside the standard envelope
//! (`data`), failures as `{"errors": [...]}`.

use crate::store::{MountEntry, StoreError, TtlInput};
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Map, Value};
use tracing::{info, warn};

/// Vault error body
pub fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "errors": [message] }))).into_response()
}

fn store_error(error: &StoreError) -> Response {
    match error {
        StoreError::BadRequest(message) => error_response(StatusCode::BAD_REQUEST, message),
        StoreError::NotFound(message) => error_response(StatusCode::NOT_FOUND, message),
    }
}

/// Standard Vault response envelope around `data`
fn envelope(data: Value) -> Value {
    json!({
        "request_id": uuid::Uuid::new_v4().to_string(),
        "lease_id": "",
        "renewable": false,
        "lease_duration": 0,
        "data": data,
        "wrap_info": null,
        "warnings": null,
        "auth": null
    })
}

/// Envelope that also repeats each `data` field at the top level, as the
/// mount listing and tune endpoints do
fn envelope_with_top_level(data: Map<String, Value>) -> Value {
    let mut body = envelope(Value::Object(data.clone()));
    if let Value::Object(fields) = &mut body {
        for (key, value) in data {
            fields.entry(key).or_insert(value);
        }
    }
    body
}

/// Parse a JSON request body; an empty body reads as `{}`
fn parse_body(body: &Bytes) -> Result<Value, Response> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(body).map_err(|e| {
        error_response(
            StatusCode::BAD_REQUEST,
            &format!("failed to parse JSON input: {e}"),
        )
    })
}

fn mount_json(entry: &MountEntry) -> Value {
    json!({
        "type": entry.engine_type,
        "description": entry.description,
        "accessor": entry.accessor,
        "uuid": entry.uuid,
        "config": {
            "default_lease_ttl": entry.default_lease_ttl,
            "max_lease_ttl": entry.max_lease_ttl,
            "force_no_cache": false
        },
        "local": false,
        "seal_wrap": false,
        "external_entropy_access": false,
        "options": null
    })
}

/// `GET /v1/sys/health`
pub async fn health_check() -> Json<Value> {
    let server_time_utc = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    Json(json!({
        "initialized": true,
        "sealed": false,
        "standby": false,
        "version": concat!(env!("CARGO_PKG_VERSION"), "-mock"),
        "server_time_utc": server_time_utc
    }))
}

/// `GET /v1/sys/mounts`
pub async fn list_mounts(State(state): State<AppState>) -> Response {
    let store = state.store.read().await;
    let data: Map<String, Value> = store
        .mounts()
        .iter()
        .map(|(path, entry)| (path.clone(), mount_json(entry)))
        .collect();
    Json(envelope_with_top_level(data)).into_response()
}

/// Everything under `/v1/sys/mounts/{path}`, including `/tune`
pub async fn mount_path(
    State(state): State<AppState>,
    method: Method,
    Path(path): Path<String>,
    body: Bytes,
) -> Response {
    if let Some(mount) = path.strip_suffix("/tune") {
        return match method {
            Method::GET => read_tune(&state, mount).await,
            Method::POST | Method::PUT => write_tune(&state, mount, &body).await,
            _ => error_response(StatusCode::METHOD_NOT_ALLOWED, "unsupported operation"),
        };
    }

    match method {
        Method::POST | Method::PUT => enable_mount(&state, &path, &body).await,
        Method::DELETE => disable_mount(&state, &path).await,
        Method::GET => {
            let store = state.store.read().await;
            match store.mount(&path) {
                Some(entry) => Json(envelope(mount_json(entry))).into_response(),
                None => error_response(
                    StatusCode::BAD_REQUEST,
                    &format!("no mount found at \"{}/\"", path.trim_matches('/')),
                ),
            }
        }
        _ => error_response(StatusCode::METHOD_NOT_ALLOWED, "unsupported operation"),
    }
}

async fn enable_mount(state: &AppState, path: &str, body: &Bytes) -> Response {
    let body = match parse_body(body) {
        Ok(body) => body,
        Err(response) => return response,
    };
    let engine_type = body.get("type").and_then(Value::as_str).unwrap_or_default();
    let description = body
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let config = body.get("config");
    let ttls = TtlInput::from_json(
        "default_lease_ttl",
        config.and_then(|c| c.get("default_lease_ttl")),
    )
    .and_then(|default_ttl| {
        TtlInput::from_json("max_lease_ttl", config.and_then(|c| c.get("max_lease_ttl")))
            .map(|max_ttl| (default_ttl, max_ttl))
    });
    let (default_ttl, max_ttl) = match ttls {
        Ok(ttls) => ttls,
        Err(e) => return store_error(&e),
    };

    let mut store = state.store.write().await;
    match store.enable_mount(path, engine_type, description, default_ttl, max_ttl) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            warn!("  Mount at {} rejected: {}", path, e.message());
            store_error(&e)
        }
    }
}

async fn disable_mount(state: &AppState, path: &str) -> Response {
    let mut store = state.store.write().await;
    match store.disable_mount(path) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => store_error(&e),
    }
}

async fn read_tune(state: &AppState, path: &str) -> Response {
    let store = state.store.read().await;
    let (default_ttl, max_ttl) = match store.effective_ttls(path) {
        Ok(ttls) => ttls,
        Err(e) => return store_error(&e),
    };
    let description = store
        .mount(path)
        .map(|entry| entry.description.clone())
        .unwrap_or_default();

    let mut data = Map::new();
    data.insert("default_lease_ttl".to_string(), json!(default_ttl));
    data.insert("max_lease_ttl".to_string(), json!(max_ttl));
    data.insert("description".to_string(), json!(description));
    data.insert("force_no_cache".to_string(), json!(false));
    Json(envelope_with_top_level(data)).into_response()
}

async fn write_tune(state: &AppState, path: &str, body: &Bytes) -> Response {
    let body = match parse_body(body) {
        Ok(body) => body,
        Err(response) => return response,
    };
    let default_ttl = match TtlInput::from_json("default_lease_ttl", body.get("default_lease_ttl")) {
        Ok(ttl) => ttl,
        Err(e) => return store_error(&e),
    };
    let max_ttl = match TtlInput::from_json("max_lease_ttl", body.get("max_lease_ttl")) {
        Ok(ttl) => ttl,
        Err(e) => return store_error(&e),
    };
    let description = body.get("description").and_then(Value::as_str);

    let mut store = state.store.write().await;
    match store.tune_mount(path, description, default_ttl, max_ttl) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => store_error(&e),
    }
}

/// `POST /v1/sys/remount`
pub async fn remount(State(state): State<AppState>, body: Bytes) -> Response {
    let body = match parse_body(&body) {
        Ok(body) => body,
        Err(response) => return response,
    };
    let (Some(from), Some(to)) = (
        body.get("from").and_then(Value::as_str),
        body.get("to").and_then(Value::as_str),
    ) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "both \"from\" and \"to\" paths are required",
        );
    };

    let mut store = state.store.write().await;
    match store.remount(from, to) {
        Ok(migration_id) => {
            Json(envelope(json!({ "migration_id": migration_id }))).into_response()
        }
        Err(e) => store_error(&e),
    }
}

/// `GET /v1/sys/remount/status/{migration_id}`
pub async fn remount_status(
    State(state): State<AppState>,
    Path(migration_id): Path<String>,
) -> Response {
    let store = state.store.read().await;
    match store.migration(&migration_id) {
        Some(migration) => Json(envelope(json!({
            "migration_id": migration_id,
            "migration_info": {
                "source_mount": migration.source,
                "target_mount": migration.target,
                "status": migration.status
            }
        })))
        .into_response(),
        None => error_response(
            StatusCode::NOT_FOUND,
            &format!("no migration found with id {migration_id}"),
        ),
    }
}

/// Logical requests (`/v1/{path}`) against secrets stored in a mount
pub async fn logical(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let Some(path) = uri.path().strip_prefix("/v1/") else {
        return error_response(StatusCode::NOT_FOUND, "unsupported path");
    };
    let path = path.to_string();

    match method {
        Method::GET => {
            let store = state.store.read().await;
            match store.read_secret(&path) {
                Ok(Some(data)) => Json(envelope(Value::Object(data.clone()))).into_response(),
                // Vault answers a missing secret with an empty error list
                Ok(None) => (StatusCode::NOT_FOUND, Json(json!({ "errors": [] }))).into_response(),
                Err(e) => store_error(&e),
            }
        }
        Method::PUT | Method::POST => {
            let data = match parse_body(&body) {
                Ok(Value::Object(data)) => data,
                Ok(_) => {
                    return error_response(StatusCode::BAD_REQUEST, "data must be a JSON object")
                }
                Err(response) => return response,
            };
            let mut store = state.store.write().await;
            match store.write_secret(&path, data) {
                Ok(()) => {
                    info!("  Stored secret at {}", path);
                    StatusCode::NO_CONTENT.into_response()
                }
                Err(e) => store_error(&e),
            }
        }
        Method::DELETE => {
            let mut store = state.store.write().await;
            match store.delete_secret(&path) {
                Ok(()) => StatusCode::NO_CONTENT.into_response(),
                Err(e) => store_error(&e),
            }
        }
        _ => error_response(StatusCode::METHOD_NOT_ALLOWED, "unsupported operation"),
    }
}
