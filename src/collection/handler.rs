//! HTTP handlers for the collection APIs
//!
//! - GET  /api/get/novel/fragments   — ingest the raw novel, return fragments
//! - POST /api/save/novel/fragments  — replace fragments
//! - GET  /api/novel/fragments       — current fragments
//! - GET  /api/novel/prompts         — current prompts
//! - POST /api/novel/prompts         — replace prompts
//! - GET  /api/novel/prompts/en      — current translated prompts
//! - POST /api/novel/prompts/en      — replace translated prompts
//! - GET  /api/novel/images          — image references

use crate::api::{error_response, rejection_response};
use crate::collection::{Collection, ImageGallery};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Shared state for collection handlers
#[derive(Clone)]
pub struct CollectionsState {
    pub fragments: Arc<Collection>,
    pub prompts: Arc<Collection>,
    pub prompts_en: Arc<Collection>,
    pub gallery: Arc<ImageGallery>,
    /// Raw novel text ingested by `GET /api/get/novel/fragments`
    pub raw_source: PathBuf,
}

/// Create the collections router
pub fn collections_router(state: CollectionsState) -> Router {
    Router::new()
        .route("/api/get/novel/fragments", get(ingest_fragments))
        .route("/api/save/novel/fragments", post(save_fragments))
        .route("/api/novel/fragments", get(get_fragments))
        .route("/api/novel/prompts", get(get_prompts).post(save_prompts))
        .route(
            "/api/novel/prompts/en",
            get(get_prompts_en).post(save_prompts_en),
        )
        .route("/api/novel/images", get(get_images))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct SavedResponse {
    message: String,
    count: usize,
}

async fn fetch(collection: &Collection) -> Response {
    match collection.fetch().await {
        Ok(items) => Json(items).into_response(),
        Err(e) => error_response(&e),
    }
}

async fn replace(
    collection: &Collection,
    body: Result<Json<Vec<String>>, JsonRejection>,
) -> Response {
    let Json(items) = match body {
        Ok(body) => body,
        Err(rejection) => return rejection_response(rejection),
    };
    match collection.replace(&items).await {
        Ok(count) => (
            StatusCode::OK,
            Json(SavedResponse {
                message: format!("{} saved successfully", collection.kind()),
                count,
            }),
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}

// =============================================================================
// Fragments
// =============================================================================

/// GET /api/get/novel/fragments
async fn ingest_fragments(State(state): State<CollectionsState>) -> Response {
    if let Err(e) = state.fragments.ingest_file(&state.raw_source).await {
        return error_response(&e);
    }
    fetch(&state.fragments).await
}

/// POST /api/save/novel/fragments
async fn save_fragments(
    State(state): State<CollectionsState>,
    body: Result<Json<Vec<String>>, JsonRejection>,
) -> Response {
    replace(&state.fragments, body).await
}

/// GET /api/novel/fragments
async fn get_fragments(State(state): State<CollectionsState>) -> Response {
    fetch(&state.fragments).await
}

// =============================================================================
// Prompts
// =============================================================================

/// GET /api/novel/prompts
async fn get_prompts(State(state): State<CollectionsState>) -> Response {
    fetch(&state.prompts).await
}

/// POST /api/novel/prompts
async fn save_prompts(
    State(state): State<CollectionsState>,
    body: Result<Json<Vec<String>>, JsonRejection>,
) -> Response {
    replace(&state.prompts, body).await
}

/// GET /api/novel/prompts/en
async fn get_prompts_en(State(state): State<CollectionsState>) -> Response {
    fetch(&state.prompts_en).await
}

/// POST /api/novel/prompts/en
async fn save_prompts_en(
    State(state): State<CollectionsState>,
    body: Result<Json<Vec<String>>, JsonRejection>,
) -> Response {
    replace(&state.prompts_en, body).await
}

// =============================================================================
// Images
// =============================================================================

/// GET /api/novel/images
async fn get_images(State(state): State<CollectionsState>) -> Response {
    match state.gallery.list().await {
        Ok(images) => Json(images).into_response(),
        Err(e) => error_response(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::CollectionKind;
    use crate::config::StorageConfig;
    use axum::body::Body;
    use axum::http::Request;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn make_state(dir: &TempDir) -> CollectionsState {
        let storage = StorageConfig::with_base_dir(dir.path());
        CollectionsState {
            fragments: Arc::new(Collection::from_config(CollectionKind::Fragments, &storage)),
            prompts: Arc::new(Collection::from_config(CollectionKind::Prompts, &storage)),
            prompts_en: Arc::new(Collection::from_config(CollectionKind::PromptsEn, &storage)),
            gallery: Arc::new(ImageGallery::from_config(&storage)),
            raw_source: storage.raw_source_path(),
        }
    }

    fn make_app() -> (Router, CollectionsState, TempDir) {
        let dir = TempDir::new().unwrap();
        let state = make_state(&dir);
        (collections_router(state.clone()), state, dir)
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 1024 * 64)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_ingest_fragments_from_raw_source() {
        let (app, state, _dir) = make_app();
        tokio::fs::write(&state.raw_source, "First scene.\n\n  Second scene.\n")
            .await
            .unwrap();

        let resp = app.oneshot(get_request("/api/get/novel/fragments")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json, serde_json::json!(["First scene.", "Second scene."]));
    }

    #[tokio::test]
    async fn test_ingest_fragments_missing_source() {
        let (app, _state, _dir) = make_app();
        let resp = app.oneshot(get_request("/api/get/novel/fragments")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let json = body_json(resp).await;
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_save_then_get_fragments() {
        let (app, _state, _dir) = make_app();

        let resp = app
            .clone()
            .oneshot(post_json(
                "/api/save/novel/fragments",
                serde_json::json!(["merged", "scene"]),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        assert_eq!(json["count"], 2);

        let resp = app.oneshot(get_request("/api/novel/fragments")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, serde_json::json!(["merged", "scene"]));
    }

    #[tokio::test]
    async fn test_get_prompts_missing_is_not_found() {
        let (app, _state, _dir) = make_app();
        let resp = app.oneshot(get_request("/api/novel/prompts")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_save_prompts_en() {
        let (app, state, _dir) = make_app();

        let resp = app
            .clone()
            .oneshot(post_json(
                "/api/novel/prompts/en",
                serde_json::json!(["a castle at dawn"]),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            state.prompts_en.fetch().await.unwrap(),
            vec!["a castle at dawn"]
        );

        let resp = app.oneshot(get_request("/api/novel/prompts/en")).await.unwrap();
        assert_eq!(body_json(resp).await, serde_json::json!(["a castle at dawn"]));
    }

    #[tokio::test]
    async fn test_save_prompts_rejects_bad_body() {
        let (app, _state, _dir) = make_app();
        let resp = app
            .oneshot(post_json(
                "/api/novel/prompts",
                serde_json::json!({"not": "a list"}),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
        assert!(!json["error"]["message"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_fragments_rejects_malformed_json() {
        let (app, state, _dir) = make_app();
        state.fragments.replace(["kept"]).await.unwrap();

        let req = Request::builder()
            .method("POST")
            .uri("/api/save/novel/fragments")
            .header("content-type", "application/json")
            .body(Body::from("[\"unterminated"))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(resp).await["error"]["code"], "BAD_REQUEST");
        assert_eq!(state.fragments.fetch().await.unwrap(), vec!["kept"]);
    }

    #[tokio::test]
    async fn test_get_images() {
        let (app, state, _dir) = make_app();
        state.gallery.ensure_dir().await.unwrap();
        tokio::fs::write(state.gallery.dir().join("1.png"), b"png")
            .await
            .unwrap();
        tokio::fs::write(state.gallery.dir().join("0.png"), b"png")
            .await
            .unwrap();

        let resp = app.oneshot(get_request("/api/novel/images")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let json = body_json(resp).await;
        let refs = json.as_array().unwrap();
        assert_eq!(refs.len(), 2);
        assert!(refs[0].as_str().unwrap().starts_with("/images/0.png?v="));
        assert!(refs[1].as_str().unwrap().starts_with("/images/1.png?v="));
    }
}
