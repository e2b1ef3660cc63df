//! HTTP API.
//!
//! - POST /categorize - assign a category to `{text, method}`
//! - GET  /health     - index and summarizer status

use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use catego_ai::{CategorizeError, Categorizer};
use catego_core::{CategorizeRequest, CategorizeResponse, ErrorBody};
use serde::Serialize;
use tracing::{error, info, warn};

#[derive(Clone)]
struct AppState {
    categorizer: Arc<Mutex<Categorizer>>,
    categories: Arc<Vec<String>>,
    summarizer: bool,
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    categories: Vec<String>,
    summarizer: bool,
}

/// Error answer: a status code plus a `{"detail": ...}` body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn bad_request(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            detail: detail.into(),
        }
    }

    fn internal(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: detail.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { detail: self.detail })).into_response()
    }
}

impl From<CategorizeError> for ApiError {
    fn from(err: CategorizeError) -> Self {
        if err.is_invalid_input() {
            warn!(%err, "rejected categorize request");
            Self::bad_request(err.to_string())
        } else {
            error!(%err, "categorization failed");
            Self::internal(err.to_string())
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(error = %rejection.body_text(), "malformed categorize request");
        Self::bad_request(rejection.body_text())
    }
}

pub fn router(categorizer: Arc<Mutex<Categorizer>>) -> anyhow::Result<Router> {
    let (categories, summarizer) = {
        let guard = categorizer
            .lock()
            .map_err(|_| anyhow::anyhow!("categorizer lock poisoned"))?;
        (
            guard.index().categories().map(str::to_string).collect(),
            guard.has_summarizer(),
        )
    };
    let state = AppState {
        categorizer,
        categories: Arc::new(categories),
        summarizer,
    };

    Ok(Router::new()
        .route("/categorize", post(categorize))
        .route("/health", get(health))
        .with_state(state))
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: &str, categorizer: Arc<Mutex<Categorizer>>) -> anyhow::Result<()> {
    let app = router(categorizer)?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
}

async fn categorize(
    State(state): State<AppState>,
    payload: Result<Json<CategorizeRequest>, JsonRejection>,
) -> Result<Json<CategorizeResponse>, ApiError> {
    let Json(request) = payload?;
    let method = request.method;

    // Inference is CPU-bound; run it on the blocking pool under the lock.
    let categorizer = Arc::clone(&state.categorizer);
    let assignment = tokio::task::spawn_blocking(move || {
        let mut guard = categorizer
            .lock()
            .map_err(|_| ApiError::internal("categorizer lock poisoned"))?;
        guard
            .assign_category(&request.text, request.method)
            .map_err(ApiError::from)
    })
    .await
    .map_err(|e| ApiError::internal(format!("categorization task failed: {e}")))??;

    info!(
        %method,
        category = %assignment.category,
        score = assignment.score,
        "categorized text"
    );
    Ok(Json(CategorizeResponse {
        category: assignment.category,
    }))
}

async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok",
        categories: state.categories.as_ref().clone(),
        summarizer: state.summarizer,
    })
}
