use crate::core::{Command, CommandSink};
use crate::utils::error::{BridgeError, Result};
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

#[derive(Clone)]
pub struct AppState {
    pub sink: Arc<dyn CommandSink>,
}

/// Body of `GET /emotion/:name`. Failures are reported here, not through
/// the status code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmotionResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EmotionResponse {
    pub fn sent(command: &Command) -> Self {
        Self {
            success: true,
            emotion: Some(command.to_string()),
            error: None,
        }
    }

    pub fn failed(error: &BridgeError) -> Self {
        Self {
            success: false,
            emotion: None,
            error: Some(error.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub device: String,
    pub connected: bool,
}

pub fn router(sink: Arc<dyn CommandSink>) -> Router {
    Router::new()
        .route("/emotion/:name", get(send_emotion))
        .route("/health", get(health))
        .with_state(AppState { sink })
}

/// API routes plus static assets from `static_dir` for every other path.
pub fn router_with_assets(sink: Arc<dyn CommandSink>, static_dir: Option<&str>) -> Router {
    let app = router(sink);
    match static_dir {
        Some(dir) => {
            tracing::debug!("Serving static files from {}", dir);
            app.fallback_service(ServeDir::new(dir))
        }
        None => app,
    }
}

async fn send_emotion(State(state): State<AppState>, Path(name): Path<String>) -> Json<EmotionResponse> {
    let command = Command::new(&name);

    match state.sink.send(&command).await {
        Ok(receipt) => Json(EmotionResponse::sent(&receipt.command)),
        Err(e) => Json(EmotionResponse::failed(&e)),
    }
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        device: state.sink.device().to_string(),
        connected: state.sink.is_connected(),
    })
}

/// 在既有的 listener 上提供服務，直到 `shutdown` 完成
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("🌐 Server running at http://{}", addr);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| BridgeError::ServerError {
            message: e.to_string(),
        })
}
