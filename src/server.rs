//! HTTP host for the reasoner registry.
//!
//! Routes:
//! - `GET  /health`
//! - `GET  /api/v1/reasoners`
//! - `POST /api/v1/execute/:target` where target is `<node_id>.<task>`
//!   and the body is `{"input": {...}}`

use crate::error::TaskError;
use crate::reasoners::{ReasonerInfo, Registry};
use anyhow::{bail, Context, Result};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Ports tried after the configured one when auto-port is on.
const AUTO_PORT_ATTEMPTS: u16 = 20;

/// Application state
pub struct AppState {
    pub registry: Registry,
    pub node_id: String,
    pub version: String,
}

type SharedState = Arc<AppState>;

#[derive(Debug, Deserialize)]
struct ExecuteRequest {
    #[serde(default)]
    input: Value,
}

#[derive(Debug, Serialize)]
struct ExecuteResponse {
    result: Value,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    kind: &'static str,
}

/// Map a task failure onto an HTTP status.
fn status_for(error: &TaskError) -> StatusCode {
    match error {
        TaskError::Input(_) => StatusCode::BAD_REQUEST,
        TaskError::UnknownTask(_) => StatusCode::NOT_FOUND,
        TaskError::SchemaValidation { .. } | TaskError::UpstreamCall(_) => StatusCode::BAD_GATEWAY,
        TaskError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
    }
}

impl IntoResponse for TaskError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        let body = ErrorBody {
            error: self.to_string(),
            kind: self.kind(),
        };
        (status, Json(body)).into_response()
    }
}

/// Split `<node_id>.<task>` into its parts.
fn parse_target(target: &str) -> Option<(&str, &str)> {
    target
        .split_once('.')
        .filter(|(node, task)| !node.is_empty() && !task.is_empty())
}

async fn health(State(state): State<SharedState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "node_id": state.node_id,
        "version": state.version,
    }))
}

async fn list_reasoners(State(state): State<SharedState>) -> Json<Vec<ReasonerInfo>> {
    Json(state.registry.list())
}

async fn execute(
    State(state): State<SharedState>,
    Path(target): Path<String>,
    payload: Result<Json<ExecuteRequest>, JsonRejection>,
) -> Result<Json<ExecuteResponse>, TaskError> {
    let Json(req) = payload.map_err(|rejection| TaskError::Input(rejection.body_text()))?;

    let (node_id, task) = parse_target(&target)
        .ok_or_else(|| TaskError::UnknownTask(target.clone()))?;

    if node_id != state.node_id {
        return Err(TaskError::UnknownTask(target.clone()));
    }

    match state.registry.dispatch(task, req.input).await {
        Ok(result) => Ok(Json(ExecuteResponse { result })),
        Err(e) => {
            warn!("{} failed: {}", target, e);
            Err(e)
        }
    }
}

/// Build the router over shared state.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/reasoners", get(list_reasoners))
        .route("/api/v1/execute/:target", post(execute))
        .with_state(state)
}

/// Bind `host:port`, walking forward through the next ports when
/// `auto_port` is set and the port is already in use.
pub async fn bind(host: &str, port: u16, auto_port: bool) -> Result<TcpListener> {
    let attempts = if auto_port { AUTO_PORT_ATTEMPTS } else { 1 };

    for offset in 0..attempts {
        let Some(candidate) = port.checked_add(offset) else {
            break;
        };
        let addr = format!("{}:{}", host, candidate);

        match TcpListener::bind(&addr).await {
            Ok(listener) => return Ok(listener),
            Err(e) if e.kind() == ErrorKind::AddrInUse && auto_port => {
                warn!("Port {} in use, trying next", candidate);
            }
            Err(e) => return Err(e).with_context(|| format!("Failed to bind {}", addr)),
        }
    }

    bail!(
        "No free port in {}..{} on {}",
        port,
        port.saturating_add(attempts),
        host
    )
}

/// Serve until the process is stopped.
pub async fn serve(state: AppState, listener: TcpListener) -> Result<()> {
    let addr: SocketAddr = listener.local_addr()?;
    let node_id = state.node_id.clone();

    println!("🚀 Agent {} listening on http://{}", node_id, addr);
    for info in state.registry.list() {
        println!("   POST /api/v1/execute/{}.{}", node_id, info.name);
    }
    info!("Serving {} reasoners", state.registry.len());

    axum::serve(listener, router(Arc::new(state)))
        .await
        .context("Server error")?;

    Ok(())
}
