//! SheetPress HTTP API
//!
//! HTTP API endpoints for:
//! - Health check
//! - Table registry listing (viewer or admin)
//! - Single-table publish (admin)
//! - Batch publish across all active tables (admin)

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use sp_common::{Role, TableDescriptor, TablePublishResult};
use sp_config::AuthTokens;
use sp_publisher::TablePublisher;

pub mod auth;
pub mod model;

use model::{
    AuthQuery, ErrorResponse, PublishAllResponse, PublishOneResponse, PublishQuery,
    SimpleHealthResponse,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<AuthTokens>,
    pub tables: Arc<Vec<TableDescriptor>>,
    pub publisher: Arc<TablePublisher>,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "SheetPress API",
        version = "0.1.0",
        description = "HTTP API for publishing Google Sheets tables as JSON files in a GitHub repository"
    ),
    paths(
        health_handler,
        list_config,
        publish_one,
        publish_all,
    ),
    components(schemas(
        SimpleHealthResponse,
        ErrorResponse,
        PublishOneResponse,
        PublishAllResponse,
        TableDescriptor,
        TablePublishResult,
    )),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "config", description = "Table registry endpoints"),
        (name = "publish", description = "Publishing endpoints"),
    )
)]
pub struct ApiDoc;

/// Create the full router with all endpoints
pub fn create_router(
    tokens: Arc<AuthTokens>,
    tables: Arc<Vec<TableDescriptor>>,
    publisher: Arc<TablePublisher>,
) -> Router {
    let state = AppState {
        tokens,
        tables,
        publisher,
    };

    Router::new()
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        // Basic health
        .route("/health", get(health_handler))
        // Table registry
        .route("/config.json", get(list_config))
        // Publishing
        .route("/api/admin/publish", post(publish_one))
        .route("/api/admin/publish-all", post(publish_all))
        .fallback(fallback_handler)
        .with_state(state)
}

// ============================================================================
// Errors
// ============================================================================

/// API-level failures that map onto HTTP status codes
#[derive(Debug)]
pub enum ApiError {
    /// Missing or unrecognized token, or insufficient role
    Forbidden,
    /// Unknown table or path
    NotFound(String),
    /// Missing or malformed request parameter
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "forbidden", None),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, "not_found", Some(m)),
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, "bad_request", Some(m)),
        };
        (
            status,
            Json(ErrorResponse {
                error: error.to_string(),
                message,
            }),
        )
            .into_response()
    }
}

fn require_viewer(state: &AppState, headers: &HeaderMap, token: Option<&str>) -> Result<Role, ApiError> {
    let presented = auth::presented_token(token, headers);
    match auth::resolve_role(&state.tokens, presented) {
        Some(role) if role.can_view() => Ok(role),
        _ => Err(ApiError::Forbidden),
    }
}

fn require_admin(state: &AppState, headers: &HeaderMap, token: Option<&str>) -> Result<Role, ApiError> {
    let presented = auth::presented_token(token, headers);
    match auth::resolve_role(&state.tokens, presented) {
        Some(role) if role.can_publish() => Ok(role),
        _ => Err(ApiError::Forbidden),
    }
}

// ============================================================================
// Health Endpoints
// ============================================================================

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Health status", body = SimpleHealthResponse)
    )
)]
async fn health_handler() -> Json<SimpleHealthResponse> {
    Json(SimpleHealthResponse {
        status: "UP".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Table Registry
// ============================================================================

/// List the table registry
#[utoipa::path(
    get,
    path = "/config.json",
    tag = "config",
    params(
        ("token" = Option<String>, Query, description = "Caller secret")
    ),
    responses(
        (status = 200, description = "Table registry", body = Vec<TableDescriptor>),
        (status = 403, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
async fn list_config(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<AuthQuery>,
) -> Result<Json<Vec<TableDescriptor>>, ApiError> {
    require_viewer(&state, &headers, query.token.as_deref())?;
    Ok(Json(state.tables.as_ref().clone()))
}

// ============================================================================
// Publishing
// ============================================================================

/// Publish a single table to the target repository
#[utoipa::path(
    post,
    path = "/api/admin/publish",
    tag = "publish",
    params(
        ("token" = Option<String>, Query, description = "Caller secret"),
        ("table" = Option<String>, Query, description = "Table to publish")
    ),
    responses(
        (status = 200, description = "Table published", body = PublishOneResponse),
        (status = 400, description = "Missing table parameter", body = ErrorResponse),
        (status = 403, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Unknown table", body = ErrorResponse),
        (status = 500, description = "Publish failed", body = PublishOneResponse)
    )
)]
async fn publish_one(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<PublishQuery>,
) -> Result<Response, ApiError> {
    require_admin(&state, &headers, query.token.as_deref())?;

    let table = query
        .table
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::BadRequest("missing 'table' query parameter".to_string()))?;

    if !state.tables.iter().any(|t| t.name == table) {
        return Err(ApiError::NotFound(format!("unknown table '{}'", table)));
    }

    let result = state.publisher.publish_table(&table).await;

    let status = if result.is_success() {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    Ok((status, Json(PublishOneResponse::from(result))).into_response())
}

/// Publish all active tables, tolerating per-table failures
#[utoipa::path(
    post,
    path = "/api/admin/publish-all",
    tag = "publish",
    params(
        ("token" = Option<String>, Query, description = "Caller secret")
    ),
    responses(
        (status = 200, description = "Batch completed", body = PublishAllResponse),
        (status = 403, description = "Missing or invalid token", body = ErrorResponse)
    )
)]
async fn publish_all(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<AuthQuery>,
) -> Result<Json<PublishAllResponse>, ApiError> {
    require_admin(&state, &headers, query.token.as_deref())?;

    let tables: Vec<String> = state
        .tables
        .iter()
        .filter(|t| t.active)
        .map(|t| t.name.clone())
        .collect();

    let report = state.publisher.publish_all(&tables).await;
    info!(
        published = report.published,
        failed = report.failed,
        "Batch publish completed"
    );

    Ok(Json(PublishAllResponse {
        success: true,
        published: report.published,
        failed: report.failed,
        results: report.results,
    }))
}

// ============================================================================
// Fallback
// ============================================================================

#[derive(Serialize, ToSchema)]
struct NotFoundBody {
    error: String,
}

async fn fallback_handler() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(NotFoundBody {
            error: "not_found".to_string(),
        }),
    )
        .into_response()
}
