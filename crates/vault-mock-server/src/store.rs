//! In-memory mount table and logical key/value storage
//!
//! Models the parts of Vault the mount reconciler relies on:
//! - mount paths may not equal, nest under or enclose another mount
//! - listings report configured TTLs (0 = inherit), tune reports effective TTLs
//! - remounting moves the mount and every secret stored beneath it
//!
//! This is ephemeral - data does not persist across restarts.

use regex::Regex;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use tracing::info;

/// Vault's own default for both lease TTLs: 720h
pub const SYSTEM_DEFAULT_LEASE_TTL_SECS: u64 = 2_764_800;

/// Engines the mock accepts on `POST /v1/sys/mounts/{path}`
const BUILTIN_ENGINES: &[&str] = &[
    "generic", "kv", "transit", "pki", "ssh", "totp", "database", "aws", "azure", "gcp",
    "consul", "nomad", "rabbitmq", "transform", "kmip",
];

/// Error returned by store operations, mapped to HTTP by the handlers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// 400 with Vault's message
    BadRequest(String),
    /// 404 with Vault's message
    NotFound(String),
}

impl StoreError {
    pub fn message(&self) -> &str {
        match self {
            StoreError::BadRequest(m) | StoreError::NotFound(m) => m,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountEntry {
    pub engine_type: String,
    pub description: String,
    pub accessor: String,
    pub uuid: String,
    /// Configured value, 0 = inherit the system default
    pub default_lease_ttl: u64,
    /// Configured value, 0 = inherit the system default
    pub max_lease_ttl: u64,
    /// Vault's own mounts cannot be tuned away, moved or removed
    pub system: bool,
}

/// TTL field of a mount or tune request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtlInput {
    Unchanged,
    /// `"system"`: drop the explicit value
    Reset,
    Seconds(u64),
}

impl TtlInput {
    /// Parse a JSON TTL: integer seconds, a duration string or `"system"`
    pub fn from_json(field: &str, value: Option<&Value>) -> Result<Self, StoreError> {
        match value {
            None | Some(Value::Null) => Ok(TtlInput::Unchanged),
            Some(Value::Number(n)) => n.as_u64().map(TtlInput::Seconds).ok_or_else(|| {
                StoreError::BadRequest(format!("invalid value for \"{field}\": {n}"))
            }),
            Some(Value::String(s)) => {
                let s = s.trim();
                if s.is_empty() {
                    Ok(TtlInput::Unchanged)
                } else if s.eq_ignore_ascii_case("system") {
                    Ok(TtlInput::Reset)
                } else {
                    parse_duration_secs(s).map(TtlInput::Seconds).ok_or_else(|| {
                        StoreError::BadRequest(format!(
                            "invalid duration for \"{field}\": {s}"
                        ))
                    })
                }
            }
            Some(other) => Err(StoreError::BadRequest(format!(
                "invalid value for \"{field}\": {other}"
            ))),
        }
    }
}

/// Parse `3600`, `30m`, `1h40m0s` or `2d` into seconds
fn parse_duration_secs(s: &str) -> Option<u64> {
    if s.chars().all(|c| c.is_ascii_digit()) {
        return s.parse().ok();
    }
    let lower = s.to_lowercase();
    let shape = Regex::new(r"^(\d+[dhms])+$").ok()?;
    if !shape.is_match(&lower) {
        return None;
    }
    let segment = Regex::new(r"(?P<number>\d+)(?P<unit>[dhms])").ok()?;

    let mut total: u64 = 0;
    for captures in segment.captures_iter(&lower) {
        let number: u64 = captures.name("number")?.as_str().parse().ok()?;
        let multiplier = match captures.name("unit")?.as_str() {
            "s" => 1,
            "m" => 60,
            "h" => 3600,
            "d" => 86_400,
            _ => return None,
        };
        total = total.checked_add(number.checked_mul(multiplier)?)?;
    }
    Some(total)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    pub source: String,
    pub target: String,
    pub status: String,
}

/// Vault state: mounts, logical data and remount migrations
#[derive(Debug)]
pub struct VaultStore {
    /// Keyed by path with a trailing slash, as Vault lists them
    mounts: BTreeMap<String, MountEntry>,
    /// Keyed by full logical path (`team/kv/app`)
    secrets: BTreeMap<String, Map<String, Value>>,
    migrations: HashMap<String, Migration>,
    system_default_lease_ttl: u64,
    system_max_lease_ttl: u64,
}

/// `a/b` -> `a/b/`
fn mount_key(path: &str) -> String {
    format!("{}/", path.trim().trim_matches('/'))
}

impl VaultStore {
    pub fn new(system_default_lease_ttl: u64, system_max_lease_ttl: u64) -> Self {
        let mut store = Self {
            mounts: BTreeMap::new(),
            secrets: BTreeMap::new(),
            migrations: HashMap::new(),
            system_default_lease_ttl,
            system_max_lease_ttl,
        };
        store.insert_system_mount("sys/", "system", "system endpoints used for control, policy and debugging");
        store.insert_system_mount("cubbyhole/", "cubbyhole", "per-token private secret storage");
        store
    }

    fn insert_system_mount(&mut self, key: &str, engine_type: &str, description: &str) {
        let entry = MountEntry {
            engine_type: engine_type.to_string(),
            description: description.to_string(),
            accessor: new_accessor(engine_type),
            uuid: uuid::Uuid::new_v4().to_string(),
            default_lease_ttl: 0,
            max_lease_ttl: 0,
            system: true,
        };
        self.mounts.insert(key.to_string(), entry);
    }

    pub fn mounts(&self) -> &BTreeMap<String, MountEntry> {
        &self.mounts
    }

    pub fn mount(&self, path: &str) -> Option<&MountEntry> {
        self.mounts.get(&mount_key(path))
    }

    /// Existing mount that `key` equals, nests under or encloses
    fn conflicting_mount(&self, key: &str) -> Option<&str> {
        self.mounts
            .keys()
            .find(|existing| key.starts_with(existing.as_str()) || existing.starts_with(key))
            .map(String::as_str)
    }

    pub fn enable_mount(
        &mut self,
        path: &str,
        engine_type: &str,
        description: &str,
        default_lease_ttl: TtlInput,
        max_lease_ttl: TtlInput,
    ) -> Result<&MountEntry, StoreError> {
        let key = mount_key(path);
        if key == "/" {
            return Err(StoreError::BadRequest("path cannot be empty".to_string()));
        }
        if engine_type.trim().is_empty() {
            return Err(StoreError::BadRequest(
                "plugin not found in the catalog: \"\"".to_string(),
            ));
        }
        if !BUILTIN_ENGINES.contains(&engine_type) {
            return Err(StoreError::BadRequest(format!(
                "plugin not found in the catalog: {engine_type}"
            )));
        }
        if let Some(existing) = self.conflicting_mount(&key) {
            return Err(StoreError::BadRequest(format!(
                "path is already in use at {existing}"
            )));
        }

        let explicit = |ttl: TtlInput| match ttl {
            TtlInput::Seconds(s) => s,
            TtlInput::Unchanged | TtlInput::Reset => 0,
        };
        let entry = MountEntry {
            engine_type: engine_type.to_string(),
            description: description.to_string(),
            accessor: new_accessor(engine_type),
            uuid: uuid::Uuid::new_v4().to_string(),
            default_lease_ttl: explicit(default_lease_ttl),
            max_lease_ttl: explicit(max_lease_ttl),
            system: false,
        };
        info!("  Mounted {} engine at {}", engine_type, key);
        Ok(self.mounts.entry(key).or_insert(entry))
    }

    /// Effective `(default, max)` TTLs of a mount
    pub fn effective_ttls(&self, path: &str) -> Result<(u64, u64), StoreError> {
        let entry = self.mount(path).ok_or_else(|| no_sysview(path))?;
        Ok((
            effective(entry.default_lease_ttl, self.system_default_lease_ttl),
            effective(entry.max_lease_ttl, self.system_max_lease_ttl),
        ))
    }

    pub fn tune_mount(
        &mut self,
        path: &str,
        description: Option<&str>,
        default_lease_ttl: TtlInput,
        max_lease_ttl: TtlInput,
    ) -> Result<(), StoreError> {
        let entry = self
            .mounts
            .get_mut(&mount_key(path))
            .ok_or_else(|| no_sysview(path))?;

        if let Some(description) = description {
            entry.description = description.to_string();
        }
        for (configured, input) in [
            (&mut entry.default_lease_ttl, default_lease_ttl),
            (&mut entry.max_lease_ttl, max_lease_ttl),
        ] {
            match input {
                // Tuning with 0 keeps the current value, like Vault
                TtlInput::Unchanged | TtlInput::Seconds(0) => {}
                TtlInput::Reset => *configured = 0,
                TtlInput::Seconds(s) => *configured = s,
            }
        }
        info!("  Tuned mount {}", mount_key(path));
        Ok(())
    }

    /// Move a mount and its data; returns the migration ID
    pub fn remount(&mut self, from: &str, to: &str) -> Result<String, StoreError> {
        let from_key = mount_key(from);
        let to_key = mount_key(to);
        if to_key == "/" {
            return Err(StoreError::BadRequest("\"to\" cannot be empty".to_string()));
        }

        match self.mounts.get(&from_key) {
            None => {
                return Err(StoreError::BadRequest(format!(
                    "no matching mount at \"{from_key}\""
                )))
            }
            Some(entry) if entry.system => {
                return Err(StoreError::BadRequest(format!(
                    "cannot remount \"{from_key}\""
                )))
            }
            Some(_) => {}
        }
        if from_key != to_key {
            // The source itself does not block its own move
            if let Some(existing) = self
                .mounts
                .keys()
                .filter(|k| **k != from_key)
                .find(|k| to_key.starts_with(k.as_str()) || k.starts_with(&to_key))
            {
                return Err(StoreError::BadRequest(format!(
                    "path is already in use at {existing}"
                )));
            }
        }

        if let Some(entry) = self.mounts.remove(&from_key) {
            self.mounts.insert(to_key.clone(), entry);
        }
        let moved: Vec<String> = self
            .secrets
            .keys()
            .filter(|k| k.starts_with(&from_key))
            .cloned()
            .collect();
        for key in moved {
            if let Some(data) = self.secrets.remove(&key) {
                let relative = &key[from_key.len()..];
                self.secrets.insert(format!("{to_key}{relative}"), data);
            }
        }

        let migration_id = uuid::Uuid::new_v4().to_string();
        self.migrations.insert(
            migration_id.clone(),
            Migration {
                source: from_key.clone(),
                target: to_key.clone(),
                status: "success".to_string(),
            },
        );
        info!("  Remounted {} to {} ({})", from_key, to_key, migration_id);
        Ok(migration_id)
    }

    pub fn migration(&self, id: &str) -> Option<&Migration> {
        self.migrations.get(id)
    }

    /// Unmount and drop stored data; absent mounts are a no-op
    pub fn disable_mount(&mut self, path: &str) -> Result<(), StoreError> {
        let key = mount_key(path);
        match self.mounts.get(&key) {
            None => return Ok(()),
            Some(entry) if entry.system => {
                return Err(StoreError::BadRequest(format!("cannot unmount \"{key}\"")))
            }
            Some(_) => {}
        }
        self.mounts.remove(&key);
        self.secrets.retain(|k, _| !k.starts_with(&key));
        info!("  Unmounted {}", key);
        Ok(())
    }

    /// Mount serving a logical path; `sys/` is never a data mount
    fn data_mount(&self, path: &str) -> Result<String, StoreError> {
        let logical = path.trim_matches('/');
        let candidate = format!("{logical}/");
        self.mounts
            .iter()
            .filter(|(key, entry)| !entry.system || key.as_str() == "cubbyhole/")
            .map(|(key, _)| key)
            .find(|key| candidate.starts_with(key.as_str()) && candidate.len() > key.len())
            .cloned()
            .ok_or_else(|| {
                StoreError::NotFound(format!("no handler for route \"{logical}\". route entry not found."))
            })
    }

    pub fn write_secret(&mut self, path: &str, data: Map<String, Value>) -> Result<(), StoreError> {
        self.data_mount(path)?;
        self.secrets.insert(path.trim_matches('/').to_string(), data);
        Ok(())
    }

    /// `Ok(None)` when the mount exists but nothing is stored at `path`
    pub fn read_secret(&self, path: &str) -> Result<Option<&Map<String, Value>>, StoreError> {
        self.data_mount(path)?;
        Ok(self.secrets.get(path.trim_matches('/')))
    }

    pub fn delete_secret(&mut self, path: &str) -> Result<(), StoreError> {
        self.data_mount(path)?;
        self.secrets.remove(path.trim_matches('/'));
        Ok(())
    }
}

fn effective(configured: u64, system: u64) -> u64 {
    if configured == 0 {
        system
    } else {
        configured
    }
}

fn no_sysview(path: &str) -> StoreError {
    StoreError::BadRequest(format!(
        "cannot fetch sysview for path \"{}\"",
        mount_key(path)
    ))
}

fn new_accessor(engine_type: &str) -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("{engine_type}_{}", &id[..8])
}
