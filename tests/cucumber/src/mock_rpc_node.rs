// Mock Solana JSON-RPC Node for Integration Testing
//
// A small axum server answering the JSON-RPC methods the proxy consumes from
// scripted state. It can throttle individual methods with HTTP 429 and fail
// every request, and it counts the calls it receives per method.

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::{Value, json};
use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{Arc, Mutex},
};
use tokio::task::JoinHandle;

#[derive(Debug, Default)]
pub struct MockChainState {
    pub slot: u64,
    pub epoch: u64,
    pub slot_index: u64,
    pub slots_in_epoch: u64,
    pub validator_count: usize,
    pub performance_samples: Vec<Value>,
    /// Lamports per account address. Unknown addresses have no account.
    pub balances: HashMap<String, u64>,
    /// (raw supply, decimals) per mint.
    pub token_supplies: HashMap<String, (u64, u8)>,
    /// (address, raw amount) per mint, largest first.
    pub token_holders: HashMap<String, Vec<(String, u64)>>,
    /// Remaining 429 responses per method.
    pub throttled: HashMap<String, u32>,
    pub retry_after: Option<String>,
    /// Answer every request with a 500 and a non-JSON body.
    pub down: bool,
    pub calls: HashMap<String, u32>,
}

#[derive(Debug, Clone)]
pub struct MockRpcNode {
    pub state: Arc<Mutex<MockChainState>>,
    server_handle: Arc<Mutex<Option<JoinHandle<()>>>>,
    pub addr: SocketAddr,
}

impl MockRpcNode {
    /// Starts the mock node on an ephemeral local port.
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(MockChainState {
            slots_in_epoch: 432_000,
            ..MockChainState::default()
        }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock RPC node");
        let addr = listener.local_addr().expect("Mock RPC node has no address");

        let app = Router::new().route("/", post(rpc_handler)).with_state(state.clone());
        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Failed to run mock RPC node");
        });

        Self {
            state,
            server_handle: Arc::new(Mutex::new(Some(server))),
            addr,
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&mut MockChainState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    pub fn calls(&self, method: &str) -> u32 {
        self.with_state(|s| s.calls.get(method).copied().unwrap_or(0))
    }

    pub fn stop(&self) {
        if let Some(handle) = self.server_handle.lock().unwrap().take() {
            handle.abort();
        }
    }
}

fn rpc_result(result: Value) -> Response {
    Json(json!({"jsonrpc": "2.0", "id": 1, "result": result})).into_response()
}

fn rpc_error(code: i64, message: &str) -> Response {
    Json(json!({"jsonrpc": "2.0", "id": 1, "error": {"code": code, "message": message}})).into_response()
}

fn context(value: Value) -> Value {
    json!({"context": {"slot": 1}, "value": value})
}

async fn rpc_handler(State(state): State<Arc<Mutex<MockChainState>>>, Json(request): Json<Value>) -> Response {
    let method = request["method"].as_str().unwrap_or_default().to_string();
    let first_param = request["params"][0].as_str().unwrap_or_default().to_string();

    let mut state = state.lock().unwrap();
    *state.calls.entry(method.clone()).or_default() += 1;

    if state.down {
        return (StatusCode::INTERNAL_SERVER_ERROR, "upstream unavailable").into_response();
    }

    if let Some(remaining) = state.throttled.get_mut(&method) {
        if *remaining > 0 {
            *remaining -= 1;
            let body = Json(json!({"jsonrpc": "2.0", "id": 1, "error": {"code": 429, "message": "Too many requests"}}));
            return match &state.retry_after {
                Some(value) => (StatusCode::TOO_MANY_REQUESTS, [(RETRY_AFTER, value.clone())], body).into_response(),
                None => (StatusCode::TOO_MANY_REQUESTS, body).into_response(),
            };
        }
    }

    match method.as_str() {
        "getSlot" => rpc_result(json!(state.slot)),
        "getEpochInfo" => rpc_result(json!({
            "epoch": state.epoch,
            "slotIndex": state.slot_index,
            "slotsInEpoch": state.slots_in_epoch,
            "absoluteSlot": state.slot,
        })),
        "getVoteAccounts" => {
            let current: Vec<Value> = (0..state.validator_count).map(|i| json!({"votePubkey": format!("Vote{}", i)})).collect();
            rpc_result(json!({"current": current, "delinquent": []}))
        },
        "getRecentPerformanceSamples" => {
            let limit = request["params"][0].as_u64().unwrap_or(u64::MAX) as usize;
            let samples: Vec<Value> = state.performance_samples.iter().take(limit).cloned().collect();
            rpc_result(json!(samples))
        },
        "getBalance" => match state.balances.get(&first_param) {
            Some(lamports) => rpc_result(context(json!(lamports))),
            None => rpc_error(-32602, "Invalid param: could not find account"),
        },
        "getAccountInfo" => {
            let account = state
                .balances
                .get(&first_param)
                .copied()
                .or_else(|| state.token_supplies.get(&first_param).map(|_| 1_461_600));
            match account {
                Some(lamports) => rpc_result(context(json!({
                    "lamports": lamports,
                    "owner": "11111111111111111111111111111111",
                    "executable": false,
                    "rentEpoch": 361,
                    "data": ["", "base64"],
                }))),
                None => rpc_result(context(Value::Null)),
            }
        },
        "getTokenSupply" => match state.token_supplies.get(&first_param) {
            Some((amount, decimals)) => rpc_result(context(json!({
                "amount": amount.to_string(),
                "decimals": decimals,
            }))),
            None => rpc_error(-32602, "Invalid param: not a Token mint"),
        },
        "getTokenLargestAccounts" => {
            let decimals = state.token_supplies.get(&first_param).map(|(_, d)| *d).unwrap_or(0);
            let holders: Vec<Value> = state
                .token_holders
                .get(&first_param)
                .map(|holders| {
                    holders
                        .iter()
                        .map(|(address, amount)| {
                            json!({
                                "address": address,
                                "amount": amount.to_string(),
                                "decimals": decimals,
                                "uiAmount": *amount as f64 / 10f64.powi(decimals as i32),
                            })
                        })
                        .collect()
                })
                .unwrap_or_default();
            rpc_result(context(json!(holders)))
        },
        _ => rpc_error(-32601, "Method not found"),
    }
}
