//! # Vault Mount API Client
//!
//! Native REST client for the Vault `sys/mounts` API and the logical
//! key/value data plane. Uses reqwest with rustls.
//!
//! References:
//! - [Vault sys/mounts API](https://developer.hashicorp.com/vault/api-docs/system/mounts)
//! - [Vault sys/remount API](https://developer.hashicorp.com/vault/api-docs/system/remount)

mod requests;
mod responses;

use crate::config::VaultConfig;
use crate::provider::{
    BackendError, MountBackend, MountConfigInput, MountInfo, MountInput, MountTtls,
};
use anyhow::Context;
use async_trait::async_trait;
use requests::{EnableMountConfig, EnableMountRequest, RemountRequest, TuneMountRequest, TuneTtl};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use responses::{
    parse_mount_table, parse_tune, unwrap_data, ErrorResponse, RemountResponse,
    RemountStatusResponse, SecretResponse,
};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Vault HTTP client
pub struct VaultClient {
    http_client: Client,
    base_url: String,
    token: Option<String>,
    namespace: Option<String>,
    remount_poll_interval: Duration,
    remount_poll_attempts: u32,
}

impl std::fmt::Debug for VaultClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultClient")
            .field("base_url", &self.base_url)
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl VaultClient {
    /// Create a client for the Vault server described by `config`
    ///
    /// # Errors
    /// Returns an error if the address is empty or the HTTP client cannot be built
    pub fn new(config: &VaultConfig) -> anyhow::Result<Self> {
        let base_url = config.address.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(anyhow::anyhow!("Vault address cannot be empty"));
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(anyhow::anyhow!(
                "Vault address '{base_url}' must start with http:// or https://"
            ));
        }

        let http_client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .context("Failed to create HTTP client")?;

        if config.token.is_none() {
            warn!("No Vault token configured; requests are sent unauthenticated");
        }
        debug!("Initialized Vault client for {}", base_url);

        Ok(Self {
            http_client,
            base_url,
            token: config.token.clone(),
            namespace: config.namespace.clone(),
            remount_poll_interval: config.remount_poll_interval(),
            remount_poll_attempts: config.remount_poll_attempts.max(1),
        })
    }

    /// Write `data` to the logical path `path` (`PUT /v1/{path}`)
    ///
    /// # Errors
    /// Classified remote errors; `NotFound` when no mount serves `path`
    pub async fn write_secret(&self, path: &str, data: &Map<String, Value>) -> Result<(), BackendError> {
        self.send(self.make_request(Method::PUT, path).json(data))
            .await?;
        debug!("Wrote secret at {}", path);
        Ok(())
    }

    /// Read the data stored at the logical path `path`, `None` when absent
    ///
    /// # Errors
    /// Classified remote errors other than not found
    pub async fn read_secret(&self, path: &str) -> Result<Option<Map<String, Value>>, BackendError> {
        let response = match self.send(self.make_request(Method::GET, path)).await {
            Ok(response) => response,
            Err(e) if e.is_not_found() => return Ok(None),
            Err(e) => return Err(e),
        };
        let body = response_json(response).await?;
        let secret: SecretResponse = serde_json::from_value(body).map_err(|e| BackendError::Decode {
            message: format!("secret at '{path}': {e}"),
        })?;
        Ok(Some(secret.data))
    }

    /// Build an HTTP request with authentication headers
    fn make_request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/v1/{}", self.base_url, path.trim_start_matches('/'));
        let mut request = self.http_client.request(method, &url);
        if let Some(token) = &self.token {
            request = request.header("X-Vault-Token", token);
        }
        if let Some(namespace) = &self.namespace {
            request = request.header("X-Vault-Namespace", namespace);
        }
        request
    }

    /// Send a request, turning transport failures and non-2xx answers into `BackendError`
    async fn send(&self, request: RequestBuilder) -> Result<Response, BackendError> {
        let response = request.send().await.map_err(|e| BackendError::Unavailable {
            message: format!("request to Vault failed: {e}"),
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(classify_error(status, &body))
    }

    /// Wait for an asynchronous remount migration to finish
    async fn wait_for_migration(&self, migration_id: &str) -> Result<(), BackendError> {
        for attempt in 1..=self.remount_poll_attempts {
            let response = self
                .send(self.make_request(
                    Method::GET,
                    &format!("sys/remount/status/{migration_id}"),
                ))
                .await?;
            let body = response_json(response).await?;
            let status: RemountStatusResponse =
                serde_json::from_value(body).map_err(|e| BackendError::Decode {
                    message: format!("remount status: {e}"),
                })?;

            match status.data.migration_info.status.as_str() {
                "success" => return Ok(()),
                "failure" => {
                    return Err(BackendError::Unavailable {
                        message: format!("remount migration {migration_id} failed"),
                    })
                }
                other => {
                    debug!(
                        "Remount migration {} is {} (check {}/{})",
                        migration_id, other, attempt, self.remount_poll_attempts
                    );
                }
            }
            tokio::time::sleep(self.remount_poll_interval).await;
        }

        Err(BackendError::Unavailable {
            message: format!(
                "remount migration {migration_id} did not finish after {} status checks",
                self.remount_poll_attempts
            ),
        })
    }
}

/// Parse a JSON body; an empty body (204) reads as `null`
async fn response_json(response: Response) -> Result<Value, BackendError> {
    let text = response.text().await.map_err(|e| BackendError::Unavailable {
        message: format!("failed to read Vault response: {e}"),
    })?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text).map_err(|e| BackendError::Decode {
        message: format!("invalid JSON from Vault: {e}"),
    })
}

/// Map a failed HTTP status and its body to a `BackendError`
fn classify_error(status: StatusCode, body: &str) -> BackendError {
    let errors = serde_json::from_str::<ErrorResponse>(body)
        .map(|e| e.errors)
        .unwrap_or_default();
    let message = if !errors.is_empty() {
        errors.join("; ")
    } else if !body.trim().is_empty() {
        body.trim().to_string()
    } else {
        status
            .canonical_reason()
            .unwrap_or("no error message")
            .to_string()
    };
    let lower = message.to_lowercase();

    match status {
        StatusCode::TOO_MANY_REQUESTS => BackendError::Unavailable { message },
        s if s.is_server_error() => BackendError::Unavailable { message },
        StatusCode::FORBIDDEN => BackendError::PermissionDenied { message },
        StatusCode::NOT_FOUND => BackendError::NotFound { message },
        StatusCode::BAD_REQUEST
            if lower.contains("already in use") || lower.contains("existing mount") =>
        {
            BackendError::Conflict { message }
        }
        // Vault answers 400 for tune and remount on a path with no mount
        StatusCode::BAD_REQUEST
            if lower.contains("no matching mount") || lower.contains("cannot fetch sysview") =>
        {
            BackendError::NotFound { message }
        }
        s => BackendError::Rejected {
            status: s.as_u16(),
            message,
        },
    }
}

fn decode_error(what: &str, e: &serde_json::Error) -> BackendError {
    BackendError::Decode {
        message: format!("{what}: {e}"),
    }
}

#[async_trait]
impl MountBackend for VaultClient {
    async fn list_mounts(&self) -> Result<HashMap<String, MountInfo>, BackendError> {
        let response = self.send(self.make_request(Method::GET, "sys/mounts")).await?;
        let body = response_json(response).await?;
        let mounts = parse_mount_table(&body)?;
        debug!("Listed {} mounts", mounts.len());
        Ok(mounts)
    }

    async fn create_mount(&self, path: &str, input: &MountInput) -> Result<(), BackendError> {
        let request = EnableMountRequest {
            engine_type: &input.engine_type,
            description: &input.description,
            config: EnableMountConfig {
                default_lease_ttl: input.default_lease_ttl,
                max_lease_ttl: input.max_lease_ttl,
            },
        };
        self.send(
            self.make_request(Method::POST, &format!("sys/mounts/{path}"))
                .json(&request),
        )
        .await?;
        debug!("Enabled {} engine at {}", input.engine_type, path);
        Ok(())
    }

    async fn update_mount_config(
        &self,
        path: &str,
        config: &MountConfigInput,
    ) -> Result<(), BackendError> {
        let request = TuneMountRequest {
            description: config.description.as_deref(),
            default_lease_ttl: TuneTtl::from(config.default_lease_ttl),
            max_lease_ttl: TuneTtl::from(config.max_lease_ttl),
        };
        self.send(
            self.make_request(Method::POST, &format!("sys/mounts/{path}/tune"))
                .json(&request),
        )
        .await?;
        debug!("Tuned mount {}", path);
        Ok(())
    }

    async fn move_mount(&self, from: &str, to: &str) -> Result<(), BackendError> {
        let response = self
            .send(
                self.make_request(Method::POST, "sys/remount")
                    .json(&RemountRequest { from, to }),
            )
            .await?;
        let body = response_json(response).await?;

        // Older Vault versions move synchronously and answer 204
        if body.is_null() {
            return Ok(());
        }
        let remount: RemountResponse = serde_json::from_value(unwrap_data(&body).clone())
            .map_err(|e| decode_error("remount", &e))?;
        if let Some(migration_id) = remount.migration_id {
            info!("Remount {} -> {} started migration {}", from, to, migration_id);
            self.wait_for_migration(&migration_id).await?;
        }
        Ok(())
    }

    async fn unmount(&self, path: &str) -> Result<(), BackendError> {
        self.send(self.make_request(Method::DELETE, &format!("sys/mounts/{path}")))
            .await?;
        debug!("Disabled mount {}", path);
        Ok(())
    }

    async fn get_mount_config(&self, path: &str) -> Result<MountTtls, BackendError> {
        let response = self
            .send(self.make_request(Method::GET, &format!("sys/mounts/{path}/tune")))
            .await?;
        let body = response_json(response).await?;
        parse_tune(&body)
    }
}
