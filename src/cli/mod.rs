//! # mountctl
//!
//! Single-resource orchestrator for one declared Vault mount.
//!
//! Keeps the tracked record (primary ID plus last observed attributes) in a
//! local JSON state file and drives the reconciler through
//! Create/Read/Update/Delete. Transient Vault failures are retried with a
//! Fibonacci backoff.
//!
//! ## Usage
//!
//! ```bash
//! # Show what apply would do
//! mountctl plan -f mount.yaml
//!
//! # Create or converge the mount
//! mountctl apply -f mount.yaml
//!
//! # Compare the declaration with Vault
//! mountctl status -f mount.yaml
//!
//! # Unmount and forget the tracked mount
//! mountctl destroy
//! ```

mod apply;
mod destroy;
mod plan;
mod state;
mod status;
#[cfg(test)]
mod testing;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use state::StateFile;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use vault_mount_controller::config::{ControllerConfig, VaultConfig};
use vault_mount_controller::controller::backoff::RetryPolicy;
use vault_mount_controller::controller::reconciler::Reconciler;
use vault_mount_controller::mount::{MountDeclaration, MountSpec};
use vault_mount_controller::observability::init_logging;
use vault_mount_controller::provider::vault::VaultClient;

/// Vault mount reconciler CLI
#[derive(Parser)]
#[command(name = "mountctl")]
#[command(
    about = "Keep a HashiCorp Vault secret-engine mount in sync with its declaration",
    long_about = None,
    after_help = "\
Examples:
  mountctl plan -f mount.yaml
  mountctl apply -f mount.yaml --state team-kv.state.json
  mountctl destroy --state team-kv.state.json
"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Vault address (overrides VAULT_ADDR)
    #[arg(long, global = true)]
    vault_addr: Option<String>,

    /// Vault token (overrides VAULT_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Vault Enterprise namespace (overrides VAULT_NAMESPACE)
    #[arg(long, global = true)]
    namespace: Option<String>,

    /// State file tracking the mount (overrides MOUNT_STATE_FILE)
    #[arg(long, global = true)]
    state: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the declared mount or converge it to its declaration
    Apply {
        /// Declaration file (YAML)
        #[arg(short = 'f', long = "file")]
        file: PathBuf,

        /// Allow replacing the mount, and losing its data, on an engine type change
        #[arg(long)]
        allow_replace: bool,
    },
    /// Show the action apply would take without changing anything
    Plan {
        /// Declaration file (YAML)
        #[arg(short = 'f', long = "file")]
        file: PathBuf,
    },
    /// Read the tracked mount and report drift from the declaration
    Status {
        /// Declaration file (YAML)
        #[arg(short = 'f', long = "file")]
        file: PathBuf,
    },
    /// Unmount the tracked mount and remove the state file
    Destroy,
    /// Show build information
    Version,
}

/// Everything a subcommand needs to talk to Vault and the state file
pub(crate) struct Context {
    pub reconciler: Reconciler,
    pub retry: RetryPolicy,
    pub state: StateFile,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let controller_config = ControllerConfig::from_env();
    init_logging(&controller_config)?;

    if matches!(cli.command, Commands::Version) {
        print_version();
        return Ok(());
    }

    let mut vault_config = VaultConfig::from_env();
    if let Some(addr) = cli.vault_addr {
        vault_config.address = addr;
    }
    if cli.token.is_some() {
        vault_config.token = cli.token;
    }
    if cli.namespace.is_some() {
        vault_config.namespace = cli.namespace;
    }

    let client = VaultClient::new(&vault_config).context("Failed to create Vault client")?;
    let ctx = Context {
        reconciler: Reconciler::new(Arc::new(client)),
        retry: RetryPolicy {
            max_attempts: controller_config.retry_max_attempts,
            backoff_min_secs: controller_config.retry_backoff_min_secs,
            backoff_max_secs: controller_config.retry_backoff_max_secs,
        },
        state: StateFile::new(cli.state.unwrap_or(controller_config.state_file)),
    };

    match cli.command {
        Commands::Apply {
            file,
            allow_replace,
        } => apply::apply_command(&ctx, &load_declaration(&file)?, allow_replace).await,
        Commands::Plan { file } => plan::plan_command(&ctx, &load_declaration(&file)?).await,
        Commands::Status { file } => status::status_command(&ctx, &load_declaration(&file)?).await,
        Commands::Destroy => destroy::destroy_command(&ctx).await,
        Commands::Version => Ok(()),
    }
}

/// Parse a YAML declaration into a validated spec
fn load_declaration(path: &Path) -> Result<MountSpec> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read declaration {}", path.display()))?;
    let declaration: MountDeclaration = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse declaration {}", path.display()))?;
    declaration
        .into_spec()
        .with_context(|| format!("Invalid declaration {}", path.display()))
}

fn print_version() {
    println!("mountctl {}", env!("CARGO_PKG_VERSION"));
    println!("  built:  {}", env!("BUILD_DATETIME"));
    println!("  commit: {}", env!("BUILD_GIT_HASH"));
    println!("  epoch:  {}", env!("BUILD_TIMESTAMP"));
}
