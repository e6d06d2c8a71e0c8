//! End-to-end smoke test for vesta-node.
//!
//! Starts a real node process with a fresh genesis, drives the ledger via
//! JSON-RPC, and asserts balances and queues are correctly reflected.
//!
//! Run with:
//!   cargo test -p vesta-node --test smoke

use std::net::TcpListener;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use vesta_core::constants::{GRANA_PER_VST, TOTAL_SUPPLY_GRANA};
use vesta_core::types::AccountId;
use vesta_genesis::GenesisParams;

// ── Node lifecycle ────────────────────────────────────────────────────────────

struct NodeGuard {
    child: Child,
    data_dir: PathBuf,
}

impl Drop for NodeGuard {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
        let _ = std::fs::remove_dir_all(&self.data_dir);
    }
}

/// Find a free TCP port on loopback.
fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

// ── RPC helpers ───────────────────────────────────────────────────────────────

async fn rpc_raw(
    client: &reqwest::Client,
    url: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let body = serde_json::json!({
        "jsonrpc": "2.0",
        "method": method,
        "params": params,
        "id": 1
    });
    let resp = client
        .post(url)
        .json(&body)
        .send()
        .await
        .unwrap_or_else(|e| panic!("RPC call {method} failed: {e}"));
    resp.json().await.expect("parse RPC JSON")
}

async fn rpc_call(
    client: &reqwest::Client,
    url: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let json = rpc_raw(client, url, method, params).await;
    if let Some(err) = json.get("error") {
        panic!("RPC error from {method}: {err}");
    }
    json["result"].clone()
}

/// Call a method that is expected to fail; returns the error message.
async fn rpc_call_err(
    client: &reqwest::Client,
    url: &str,
    method: &str,
    params: serde_json::Value,
) -> String {
    let json = rpc_raw(client, url, method, params).await;
    let err = json
        .get("error")
        .unwrap_or_else(|| panic!("expected {method} to fail, got {json}"));
    err["message"].as_str().expect("error message").to_string()
}

/// Poll until the RPC server responds or the timeout elapses.
async fn wait_for_rpc(client: &reqwest::Client, url: &str, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        let body = serde_json::json!({
            "jsonrpc": "2.0",
            "method": "vesta_getGenesisInfo",
            "params": [],
            "id": 1
        });
        if let Ok(resp) = client.post(url).json(&body).send().await {
            if resp.status().is_success() {
                return true;
            }
        }
        tokio::time::sleep(Duration::from_millis(250)).await;
    }
    false
}

async fn get_u128(client: &reqwest::Client, url: &str, method: &str, account: &str) -> u128 {
    let result = rpc_call(client, url, method, serde_json::json!([account])).await;
    result.as_str().unwrap().parse().expect("parse grana string")
}

// ── Smoke test ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn smoke_locked_transfer_and_unlock() {
    // ── 1. Prepare temp dir and genesis params ────────────────────────────────
    let data_dir = std::env::temp_dir().join(format!("vesta_e2e_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&data_dir);
    std::fs::create_dir_all(&data_dir).unwrap();

    let params = GenesisParams {
        issuer: AccountId::derived(b"smoke.issuer"),
        owner: AccountId::derived(b"smoke.owner"),
    };
    let params_path = data_dir.join("genesis-params.json");
    std::fs::write(&params_path, serde_json::to_string(&params).unwrap()).unwrap();

    // ── 2. Start node ─────────────────────────────────────────────────────────
    let rpc_port = free_port();
    let rpc_url = format!("http://127.0.0.1:{}", rpc_port);

    let node_bin = env!("CARGO_BIN_EXE_vesta-node");
    let child = Command::new(node_bin)
        .args([
            "--data-dir",       data_dir.join("state").to_str().unwrap(),
            "--rpc-addr",       &format!("127.0.0.1:{}", rpc_port),
            "--genesis-params", params_path.to_str().unwrap(),
        ])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to spawn vesta-node");

    let _guard = NodeGuard { child, data_dir };

    // ── 3. Wait for RPC ready ─────────────────────────────────────────────────
    let http = reqwest::Client::new();
    assert!(
        wait_for_rpc(&http, &rpc_url, Duration::from_secs(20)).await,
        "vesta-node did not become ready within 20 seconds"
    );

    // ── 4. Verify genesis balance for the issuer ──────────────────────────────
    let issuer = params.issuer.to_b58();
    let owner = params.owner.to_b58();
    let genesis_bal = get_u128(&http, &rpc_url, "vesta_getBalance", &issuer).await;
    assert_eq!(genesis_bal, TOTAL_SUPPLY_GRANA, "issuer should hold the full supply");

    // ── 5. Locked transfer: 1 VST issuer → alice, locked for 5 seconds ────────
    // The lock is long enough that steps 6–7 cannot race past it.
    let alice = AccountId::derived(b"smoke.alice").to_b58();
    let one_vst = GRANA_PER_VST.to_string();
    rpc_call(
        &http,
        &rpc_url,
        "vesta_transferLocked",
        serde_json::json!([issuer, alice, one_vst, 5, 10]),
    )
    .await;

    let queue_len =
        rpc_call(&http, &rpc_url, "vesta_getQueueLength", serde_json::json!([alice])).await;
    assert_eq!(queue_len.as_u64().unwrap(), 1);
    assert_eq!(
        get_u128(&http, &rpc_url, "vesta_getLockedBalance", &alice).await,
        GRANA_PER_VST
    );
    assert_eq!(get_u128(&http, &rpc_url, "vesta_getFreeBalance", &alice).await, 0);
    assert_eq!(
        get_u128(&http, &rpc_url, "vesta_getBalance", &issuer).await,
        TOTAL_SUPPLY_GRANA - GRANA_PER_VST
    );

    // ── 6. Locked funds are not spendable yet ─────────────────────────────────
    let bob = AccountId::derived(b"smoke.bob").to_b58();
    let tenth = (GRANA_PER_VST / 10).to_string();
    let msg = rpc_call_err(
        &http,
        &rpc_url,
        "vesta_transferLocked",
        serde_json::json!([alice, bob, tenth, 0, 10]),
    )
    .await;
    assert_eq!(msg, "Not enough tokens.");

    // ── 7. Conventional transfers stay disabled ───────────────────────────────
    let msg = rpc_call_err(
        &http,
        &rpc_url,
        "vesta_transfer",
        serde_json::json!([issuer, bob, tenth]),
    )
    .await;
    assert_eq!(msg, "Disabled");

    // ── 8. After the lock passes, a bounded unlock frees the batch ────────────
    tokio::time::sleep(Duration::from_secs(6)).await;
    let summary = rpc_call(
        &http,
        &rpc_url,
        "vesta_unlockExpired",
        serde_json::json!([alice, 10]),
    )
    .await;
    assert_eq!(summary["batches"].as_u64().unwrap(), 1);
    assert_eq!(
        summary["released_grana"].as_str().unwrap(),
        GRANA_PER_VST.to_string()
    );

    assert_eq!(
        get_u128(&http, &rpc_url, "vesta_getFreeBalance", &alice).await,
        GRANA_PER_VST
    );
    assert_eq!(get_u128(&http, &rpc_url, "vesta_getLockedBalance", &alice).await, 0);
    let queue_len =
        rpc_call(&http, &rpc_url, "vesta_getQueueLength", serde_json::json!([alice])).await;
    assert_eq!(queue_len.as_u64().unwrap(), 0);

    // ── 9. Budget ceiling is enforced and owner-mutable ───────────────────────
    let msg = rpc_call_err(
        &http,
        &rpc_url,
        "vesta_unlockExpired",
        serde_json::json!([alice, 101]),
    )
    .await;
    assert_eq!(msg, "Wrong amount");

    let msg = rpc_call_err(
        &http,
        &rpc_url,
        "vesta_setMaxUnlockIterationCount",
        serde_json::json!([alice, 200]),
    )
    .await;
    assert_eq!(msg, "caller is not the owner");

    rpc_call(
        &http,
        &rpc_url,
        "vesta_setMaxUnlockIterationCount",
        serde_json::json!([owner, 200]),
    )
    .await;
    let ceiling =
        rpc_call(&http, &rpc_url, "vesta_getMaxUnlockIterationCount", serde_json::json!([])).await;
    assert_eq!(ceiling.as_u64().unwrap(), 200);
}
