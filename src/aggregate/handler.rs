//! HTTP handler for the initial scene view
//!
//! - GET /api/novel/initial — fragments, prompts and images in one response

use crate::aggregate::Aggregator;
use crate::api::error_response;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use std::sync::Arc;

/// Shared state for the aggregate handler
#[derive(Clone)]
pub struct AggregateState {
    pub aggregator: Arc<Aggregator>,
}

/// Create the aggregate router
pub fn aggregate_router(state: AggregateState) -> Router {
    Router::new()
        .route("/api/novel/initial", get(get_initial))
        .with_state(state)
}

/// GET /api/novel/initial
async fn get_initial(State(state): State<AggregateState>) -> Response {
    match state.aggregator.build_composite().await {
        Ok(composite) => Json(composite).into_response(),
        Err(e) => error_response(&e),
    }
}
