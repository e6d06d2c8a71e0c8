//! vesta-node — the Vesta ledger node binary.
//!
//! Startup sequence:
//!   1. Open (or initialise) the ledger database
//!   2. Apply genesis if the DB is fresh
//!   3. Start the JSON-RPC 2.0 server
//!   4. Wait for shutdown, then flush

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use vesta_genesis::{apply_genesis, GenesisParams};
use vesta_rpc::{RpcServer, RpcServerState};
use vesta_state::{LedgerEngine, StateDb};

#[derive(Parser, Debug)]
#[command(
    name = "vesta-node",
    version,
    about = "Vesta ledger node — the ledger for value that ripens on schedule"
)]
struct Args {
    /// Directory for the persistent ledger database.
    #[arg(long, default_value = "~/.vesta/data")]
    data_dir: PathBuf,

    /// JSON-RPC listen address.
    #[arg(long, default_value = "127.0.0.1:8599")]
    rpc_addr: SocketAddr,

    /// Path to genesis params JSON (only required on first run).
    #[arg(long)]
    genesis_params: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,vesta=debug".parse().unwrap()),
        )
        .init();

    let args = Args::parse();
    info!("Vesta node starting");

    // ── Ledger database ───────────────────────────────────────────────────────
    let data_dir = expand_tilde(&args.data_dir);
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("creating data dir {}", data_dir.display()))?;

    let db = Arc::new(StateDb::open(&data_dir).context("opening ledger database")?);

    // ── Genesis if fresh ──────────────────────────────────────────────────────
    if db.owner().context("reading owner record")?.is_none() {
        info!("fresh database — applying genesis");
        let params = load_or_default_genesis_params(args.genesis_params.as_deref())?;
        apply_genesis(&db, &params).context("applying genesis")?;
    } else {
        info!("existing database found — skipping genesis");
    }

    // ── Ledger engine ─────────────────────────────────────────────────────────
    let engine = Arc::new(LedgerEngine::new(Arc::clone(&db)));

    // ── RPC server ────────────────────────────────────────────────────────────
    let rpc_state = Arc::new(RpcServerState::new(Arc::clone(&db), engine));
    let _rpc_handle = RpcServer::new(rpc_state)
        .start(args.rpc_addr)
        .await
        .context("starting RPC server")?;

    info!("node ready");
    tokio::signal::ctrl_c().await.context("waiting for ctrl-c")?;

    info!("shutting down — flushing ledger");
    db.flush().context("flushing ledger database")?;
    Ok(())
}

/// Load genesis parameters from a JSON file, or fall back to deterministic
/// dev accounts if no path is given.
///
/// # Warning
/// The dev accounts are derived from public labels; anyone can compute
/// them. Only use this for local development and testing.
fn load_or_default_genesis_params(
    path: Option<&std::path::Path>,
) -> anyhow::Result<GenesisParams> {
    if let Some(p) = path {
        let json = std::fs::read_to_string(p)
            .with_context(|| format!("reading genesis params from {}", p.display()))?;
        return serde_json::from_str(&json).context("parsing genesis params JSON");
    }
    warn!("No --genesis-params provided. Using dev accounts — DO NOT USE IN PRODUCTION.");
    Ok(GenesisParams::dev())
}

/// Expand a leading `~` to the user's home directory (`HOME` or `USERPROFILE`).
fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Ok(home) = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")) {
            return PathBuf::from(home).join(stripped);
        }
    }
    path.to_path_buf()
}
