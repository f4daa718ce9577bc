//! Unified API router for Storyboard
//!
//! Merges all module routers into a single axum `Router` with CORS, request
//! tracing, static image serving and consistent error handling.
//!
//! ## Endpoint Map
//!
//! | Prefix                       | Module     | Description                      |
//! |------------------------------|------------|----------------------------------|
//! | `/health`                    | api        | Health probe                     |
//! | `/api/get/novel/fragments`   | collection | Ingest raw novel into fragments  |
//! | `/api/save/novel/fragments`  | collection | Replace fragments                |
//! | `/api/novel/fragments`       | collection | Current fragments                |
//! | `/api/novel/prompts[/en]`    | collection | Prompt collections               |
//! | `/api/novel/images`          | collection | Image references                 |
//! | `/api/novel/initial`         | aggregate  | Combined scene view              |
//! | `/images/*`                  | api        | Static image files               |

use crate::aggregate::{aggregate_router, AggregateState, Aggregator};
use crate::collection::{
    collections_router, Collection, CollectionKind, CollectionsState, ImageGallery,
};
use crate::config::StorageConfig;
use crate::error::Error;
use axum::{
    extract::rejection::JsonRejection,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Combined application state holding every module's state
#[derive(Clone)]
pub struct AppState {
    pub collections: CollectionsState,
    pub aggregate: AggregateState,
}

impl AppState {
    /// Wire collections, gallery and aggregator from the storage settings
    pub fn from_config(storage: &StorageConfig) -> Self {
        let fragments = Arc::new(Collection::from_config(CollectionKind::Fragments, storage));
        let prompts = Arc::new(Collection::from_config(CollectionKind::Prompts, storage));
        let prompts_en = Arc::new(Collection::from_config(CollectionKind::PromptsEn, storage));
        let gallery = Arc::new(ImageGallery::from_config(storage));

        let aggregator = Arc::new(Aggregator::new(
            fragments.clone(),
            prompts.clone(),
            gallery.clone(),
        ));

        Self {
            collections: CollectionsState {
                fragments,
                prompts,
                prompts_en,
                gallery,
                raw_source: storage.raw_source_path(),
            },
            aggregate: AggregateState { aggregator },
        }
    }
}

/// Build the complete Storyboard HTTP application
///
/// Returns a single `Router` ready to be served by `axum::serve`.
pub fn build_app(state: AppState, cors_origins: &[String]) -> Router {
    let cors = build_cors(cors_origins);
    let gallery = state.collections.gallery.clone();

    let mut app = Router::new()
        .route("/health", get(health_check))
        .merge(collections_router(state.collections))
        .merge(aggregate_router(state.aggregate));

    let public_path = gallery.public_path().trim_end_matches('/');
    if public_path.starts_with('/') && public_path.len() > 1 {
        app = app.nest_service(public_path, ServeDir::new(gallery.dir()));
    } else {
        tracing::warn!(
            public_path = %gallery.public_path(),
            "Images public path must be a non-root absolute path; static images disabled"
        );
    }

    app.layer(TraceLayer::new_for_http()).layer(cors)
}

// =============================================================================
// Errors
// =============================================================================

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

/// API error detail
#[derive(Debug, Serialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_code("NOT_FOUND", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_code("BAD_REQUEST", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_code("INTERNAL_ERROR", message)
    }

    fn with_code(code: &str, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.to_string(),
                message: message.into(),
            },
        }
    }
}

/// Status code and body for a store error
pub fn error_parts(err: &Error) -> (StatusCode, ApiError) {
    match err {
        Error::NotFound(_) => (StatusCode::NOT_FOUND, ApiError::not_found(err.to_string())),
        Error::Config(_) => (
            StatusCode::BAD_REQUEST,
            ApiError::bad_request(err.to_string()),
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::internal(err.to_string()),
        ),
    }
}

/// Log a store error and turn it into a JSON error response
pub fn error_response(err: &Error) -> Response {
    let (status, body) = error_parts(err);
    if status.is_server_error() {
        tracing::error!(error = %err, "Request failed");
    } else {
        tracing::debug!(error = %err, "Request rejected");
    }
    (status, Json(body)).into_response()
}

/// Turn a rejected JSON body into a `400` with the JSON error body
pub fn rejection_response(rejection: JsonRejection) -> Response {
    tracing::debug!(error = %rejection.body_text(), "Rejected request body");
    (
        StatusCode::BAD_REQUEST,
        Json(ApiError::bad_request(rejection.body_text())),
    )
        .into_response()
}

// =============================================================================
// Root handlers
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// CORS
// =============================================================================

fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::ORIGIN, header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_LENGTH]);

    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        let parsed: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(parsed)
    }
}
