//! API route handlers.

use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tracing::error;

use planner_types::PlanRequest;

use crate::orchestrator;
use crate::state::AppState;

/// Create the API router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/health", get(catalog_health))
        .route("/api/v1/route-plan", post(route_plan))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

async fn health() -> &'static str {
    "ok"
}

#[derive(Debug, Serialize)]
struct StationCounts {
    total: i64,
    geocoded: i64,
}

#[derive(Debug, Serialize)]
struct CatalogHealth {
    status: &'static str,
    stations: StationCounts,
}

async fn catalog_health(State(state): State<AppState>) -> impl IntoResponse {
    match state.catalog.counts() {
        Ok((total, geocoded)) => Json(CatalogHealth {
            status: "ok",
            stations: StationCounts { total, geocoded },
        })
        .into_response(),
        Err(e) => {
            error!("Failed to read catalog counts: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

fn error_body(code: &str, message: impl Into<String>) -> serde_json::Value {
    serde_json::json!({ "error": { "code": code, "message": message.into() } })
}

/// Wraps `Json<PlanRequest>`, mapping extraction failures (malformed JSON, unknown fields,
/// wrong types) to the same `{"error": {...}}` shape the orchestrator's errors use.
struct PlanRequestJson(PlanRequest);

#[axum::async_trait]
impl<S> FromRequest<S> for PlanRequestJson
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<PlanRequest>::from_request(req, state).await {
            Ok(Json(request)) => Ok(Self(request)),
            Err(rejection) => {
                let body = error_body("invalid_json", rejection_message(&rejection));
                Err((StatusCode::BAD_REQUEST, Json(body)))
            }
        }
    }
}

fn rejection_message(rejection: &JsonRejection) -> String {
    match rejection {
        JsonRejection::JsonDataError(e) => e.body_text(),
        JsonRejection::JsonSyntaxError(e) => e.body_text(),
        JsonRejection::MissingJsonContentType(e) => e.body_text(),
        other => other.body_text(),
    }
}

async fn route_plan(State(state): State<AppState>, request: PlanRequestJson) -> impl IntoResponse {
    match orchestrator::plan(&state, request.0).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => {
            error!("Failed to plan route: {}", e);
            let status =
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, Json(error_body(e.code(), e.to_string()))).into_response()
        }
    }
}
