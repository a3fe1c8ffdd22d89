use anyhow::Context;
use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;

use crate::config::Config;
use crate::transcribe::TranscriptPipeline;
use crate::{Result, TranscriptError};

/// Shared handler state
pub type AppState = Arc<TranscriptPipeline>;

#[derive(Debug, Serialize)]
struct TranscriptResponse {
    status: &'static str,
    transcricao: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    status: &'static str,
    mensagem: String,
}

impl IntoResponse for TranscriptError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            status: "erro",
            mensagem: self.to_string(),
        };
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

/// Build the HTTP router around a pipeline
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/ping", get(ping))
        .route("/transcricao", post(transcricao))
        .with_state(state)
        .layer(axum::middleware::from_fn(log_requests))
}

/// Bind the configured address and serve until Ctrl-C
pub async fn serve(config: Config) -> Result<()> {
    let pipeline = Arc::new(TranscriptPipeline::from_config(&config)?);

    if let Some(interval) = config.cache.sweep_interval_secs {
        spawn_cache_sweep(Arc::clone(&pipeline), Duration::from_secs(interval));
    }

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    tracing::info!("Transcript service listening on {}", address);

    axum::serve(listener, router(pipeline))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    tracing::info!("Transcript service stopped");
    Ok(())
}

fn spawn_cache_sweep(pipeline: AppState, every: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // First tick fires immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = pipeline.cache().purge_expired();
            if removed > 0 {
                tracing::info!("Cache sweep removed {} expired transcripts", removed);
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

async fn log_requests(request: Request<Body>, next: Next) -> Response {
    let request_id = uuid::Uuid::new_v4();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let span = tracing::info_span!("request", id = %request_id, %method, %path);

    async move {
        let started = Instant::now();
        let response = next.run(request).await;
        tracing::info!(
            "{} {} -> {} in {}ms",
            method,
            path,
            response.status().as_u16(),
            started.elapsed().as_millis()
        );
        response
    }
    .instrument(span)
    .await
}

async fn index() -> Json<Value> {
    Json(json!({
        "status": "online",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "/transcricao": "POST - Obter transcrição de vídeo do YouTube",
            "/ping": "GET - Verificar status da API"
        }
    }))
}

async fn ping() -> Json<Value> {
    Json(json!({ "status": "ok", "message": "API operacional" }))
}

async fn transcricao(State(pipeline): State<AppState>, body: Bytes) -> Response {
    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!("Request body is not valid JSON: {}", e);
            return TranscriptError::AcquisitionFailed.into_response();
        }
    };

    let video_url = match payload.get("video_url") {
        None => None,
        Some(Value::String(url)) => Some(url.as_str()),
        Some(other) => {
            tracing::warn!("video_url is not a string: {}", other);
            return TranscriptError::AcquisitionFailed.into_response();
        }
    };

    match pipeline.handle(video_url).await {
        Ok(transcricao) => Json(TranscriptResponse {
            status: "ok",
            transcricao,
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}
