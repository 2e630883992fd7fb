//! Shared utilities for integration tests: a programmable JSON-RPC endpoint.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use devnet_wallet::config::RpcConfig;

/// What the mock endpoint answers to one request.
#[allow(dead_code)]
pub enum Reply {
    Result(Value),
    Error { code: i64, message: String },
    ErrorWithData { code: i64, message: String, data: Value },
    Status(u16, String),
    Delayed(Duration, Box<Reply>),
}

type Handler = dyn Fn(&str, &Value) -> Reply + Send + Sync;

struct Inner {
    handler: Box<Handler>,
    requests: Mutex<Vec<Value>>,
}

/// Handle to a running mock endpoint.
pub struct MockRpc {
    pub addr: SocketAddr,
    inner: Arc<Inner>,
}

#[allow(dead_code)]
impl MockRpc {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn rpc_config(&self) -> RpcConfig {
        RpcConfig {
            url: self.url(),
            timeout_secs: 2,
            ..RpcConfig::default()
        }
    }

    /// Every request body received so far.
    pub fn requests(&self) -> Vec<Value> {
        self.inner.requests.lock().unwrap().clone()
    }

    /// Methods called so far, in order.
    pub fn methods(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| r["method"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    /// Params of the first call to `method`.
    pub fn params_of(&self, method: &str) -> Value {
        self.requests()
            .into_iter()
            .find(|r| r["method"] == method)
            .map(|r| r["params"].clone())
            .unwrap_or(Value::Null)
    }
}

/// Start a JSON-RPC endpoint on an ephemeral port, answering with `handler`.
pub async fn start_mock_rpc<F>(handler: F) -> MockRpc
where
    F: Fn(&str, &Value) -> Reply + Send + Sync + 'static,
{
    let inner = Arc::new(Inner {
        handler: Box::new(handler),
        requests: Mutex::new(Vec::new()),
    });
    let app = Router::new()
        .route("/", post(handle))
        .with_state(inner.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockRpc { addr, inner }
}

async fn handle(State(inner): State<Arc<Inner>>, Json(request): Json<Value>) -> Response {
    inner.requests.lock().unwrap().push(request.clone());
    let method = request["method"].as_str().unwrap_or_default().to_string();
    let mut reply = (inner.handler)(&method, &request["params"]);

    loop {
        match reply {
            Reply::Delayed(delay, next) => {
                tokio::time::sleep(delay).await;
                reply = *next;
            }
            Reply::Result(result) => {
                return Json(json!({ "jsonrpc": "2.0", "id": request["id"], "result": result }))
                    .into_response();
            }
            Reply::Error { code, message } => {
                return Json(json!({
                    "jsonrpc": "2.0",
                    "id": request["id"],
                    "error": { "code": code, "message": message },
                }))
                .into_response();
            }
            Reply::ErrorWithData { code, message, data } => {
                return Json(json!({
                    "jsonrpc": "2.0",
                    "id": request["id"],
                    "error": { "code": code, "message": message, "data": data },
                }))
                .into_response();
            }
            Reply::Status(status, body) => {
                let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                return (status, body).into_response();
            }
        }
    }
}

/// `getLatestBlockhash` result with context.
#[allow(dead_code)]
pub fn blockhash_result(blockhash: &str, last_valid_block_height: u64) -> Reply {
    Reply::Result(json!({
        "context": { "slot": 1234 },
        "value": { "blockhash": blockhash, "lastValidBlockHeight": last_valid_block_height },
    }))
}

/// `getSignatureStatuses` result for a single signature.
#[allow(dead_code)]
pub fn status_result(status: Value) -> Reply {
    Reply::Result(json!({ "context": { "slot": 1300 }, "value": [status] }))
}
