#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use bookstore_db::{
    Document, DocumentStore, Filter, InsertOutcome, MemoryStore, Sort, StoreError, StoreResult,
    UpdateResult,
};
use bookstore_kernel::settings::Settings;

pub const API_KEY: &str = "hK0iP5dL7bW3fP3y";

/// Settings with the test API key configured.
pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.auth.api_key = Some(API_KEY.to_string());
    settings
}

/// Build the full application router over `store`, with the same middleware
/// stack production uses.
pub fn build_app_with_store(store: Arc<dyn DocumentStore>) -> Router {
    let settings = test_settings();
    let registry = bookstore_app::build_registry(&settings, store).unwrap();
    bookstore_http::build_router(&registry, &settings)
}

/// Application over an empty in-memory store.
pub fn build_app() -> Router {
    build_app_with_store(Arc::new(MemoryStore::new()))
}

/// Store double whose every call fails as if the backend were down.
pub struct UnavailableStore;

#[async_trait]
impl DocumentStore for UnavailableStore {
    async fn ensure_unique(&self, _collection: &str, _field: &str) -> StoreResult<()> {
        Err(StoreError::unavailable("connection refused"))
    }

    async fn find(
        &self,
        _collection: &str,
        _filter: &Filter,
        _sort: Option<&Sort>,
    ) -> StoreResult<Vec<Document>> {
        Err(StoreError::unavailable("connection refused"))
    }

    async fn insert_if_absent(
        &self,
        _collection: &str,
        _guard: &Filter,
        _document: Document,
    ) -> StoreResult<InsertOutcome> {
        Err(StoreError::unavailable("connection refused"))
    }

    async fn update_one(
        &self,
        _collection: &str,
        _filter: &Filter,
        _set: Document,
    ) -> StoreResult<UpdateResult> {
        Err(StoreError::unavailable("connection refused"))
    }

    async fn delete_many(&self, _collection: &str, _filter: &Filter) -> StoreResult<u64> {
        Err(StoreError::unavailable("connection refused"))
    }
}

pub fn with_key(path: &str) -> String {
    format!("{path}?apikey={API_KEY}")
}

pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
