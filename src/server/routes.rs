use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::dashboard::Dashboard;
use crate::server::api;
use crate::server::page;

/// Optional built frontend assets, served under `/assets`.
pub const STATIC_DIR: &str = "frontend/dist";

pub fn router(dashboard: Arc<Dashboard>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/health", get(health))
        .route("/api/totals", get(totals))
        .route("/api/variables", get(variables))
        .route("/api/metrics", get(metrics))
        .route("/api/view", get(view))
        .nest_service("/assets", ServeDir::new(STATIC_DIR))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(dashboard)
}

#[derive(Debug, Default, Deserialize)]
pub struct SelectionQuery {
    pub variable: Option<String>,
    pub metric: Option<String>,
}

async fn index() -> Html<&'static str> {
    Html(page::INDEX_HTML)
}

async fn health() -> Response {
    json_result(api::health_payload())
}

async fn totals(State(dashboard): State<Arc<Dashboard>>) -> Response {
    json_result(api::totals_payload(&dashboard))
}

async fn variables() -> Response {
    json_result(api::variables_payload())
}

async fn metrics(
    State(dashboard): State<Arc<Dashboard>>,
    Query(query): Query<SelectionQuery>,
) -> Response {
    api_result(api::metrics_payload(&dashboard, query.variable.as_deref()))
}

async fn view(
    State(dashboard): State<Arc<Dashboard>>,
    Query(query): Query<SelectionQuery>,
) -> Response {
    api_result(api::view_payload(
        &dashboard,
        query.variable.as_deref(),
        query.metric.as_deref(),
    ))
}

async fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "Route not found")
}

fn json_result(result: Result<String, serde_json::Error>) -> Response {
    match result {
        Ok(payload) => json_response(StatusCode::OK, payload),
        Err(err) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string()),
    }
}

fn api_result(result: Result<String, api::ApiError>) -> Response {
    match result {
        Ok(payload) => json_response(StatusCode::OK, payload),
        Err(api::ApiError::Selection(err)) => {
            warn!(%err, "rejected selection");
            error_response(StatusCode::BAD_REQUEST, &err.to_string())
        }
        Err(err) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &err.to_string()),
    }
}

fn json_response(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

fn error_response(status: StatusCode, message: &str) -> Response {
    json_response(
        status,
        format!(
            "{{\n  \"status\": \"error\",\n  \"message\": {}\n}}",
            serde_json::to_string(message).unwrap_or_else(|_| "\"Unknown error\"".to_string())
        ),
    )
}
