use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Path, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::db::repos::blueprints;
use crate::db::DbPool;
use crate::engine::generator::ChatToolClient;
use crate::engine::pipeline;
use crate::error::AppError;
use crate::presenter;
use crate::validation::SurveyForm;

/// Shared state for the HTTP server. The generator client is injected so
/// tests can run the full router against a double.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub generator: Arc<dyn ChatToolClient>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/survey", post(submit_survey))
        .route("/api/dashboard/{blueprint_id}", get(get_dashboard))
        .route("/api/dashboard/{blueprint_id}/regenerate", post(regenerate))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

/// Start the HTTP server; runs until the process receives ctrl-c.
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<(), AppError> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Server shutting down");
        })
        .await?;

    Ok(())
}

/// Health check endpoint.
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok", "service": "blueprint-server" }))
}

/// POST /api/survey — run the submission pipeline; 303 redirect to the
/// dashboard on success.
async fn submit_survey(
    AxumState(state): AxumState<Arc<AppState>>,
    Json(form): Json<SurveyForm>,
) -> Response {
    match pipeline::submit_survey(&state.pool, state.generator.as_ref(), &form).await {
        Ok(outcome) => Redirect::to(outcome.path()).into_response(),
        Err(e) => error_response(e),
    }
}

/// GET /api/dashboard/{blueprint_id} — read-side dashboard view.
async fn get_dashboard(
    AxumState(state): AxumState<Arc<AppState>>,
    Path(blueprint_id): Path<String>,
) -> Response {
    match blueprints::get_by_id(&state.pool, &blueprint_id) {
        Ok(blueprint) => Json(presenter::dashboard_view(&blueprint)).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/dashboard/{blueprint_id}/regenerate — retry generation for a
/// blueprint whose opportunities were never attached.
async fn regenerate(
    AxumState(state): AxumState<Arc<AppState>>,
    Path(blueprint_id): Path<String>,
) -> Response {
    match pipeline::regenerate(&state.pool, state.generator.as_ref(), &blueprint_id).await {
        Ok(blueprint) => Json(presenter::dashboard_view(&blueprint)).into_response(),
        Err(e) => error_response(e),
    }
}

fn error_status(err: &AppError) -> StatusCode {
    match err {
        AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AppError::NotFound(_) => StatusCode::NOT_FOUND,
        AppError::Generation(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Map an `AppError` to an HTTP response. Persistence detail stays in the
/// server log; clients get the structured `{error, kind}` body, plus the
/// individual field violations for validation failures.
fn error_response(err: AppError) -> Response {
    let status = error_status(&err);
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!("Request failed: {err}");
    }

    let mut body = serde_json::to_value(&err).unwrap_or_else(|_| {
        serde_json::json!({ "error": "Internal error", "kind": "internal" })
    });
    if let AppError::Validation(ref fields) = err {
        body["fields"] = serde_json::json!(fields);
    }

    (status, Json(body)).into_response()
}
