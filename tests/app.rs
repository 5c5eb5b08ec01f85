//! Bootstrap-level tests: registry wiring, docs and health.

mod common;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::StatusCode;
use bookstore_db::{
    Document, DocumentStore, Filter, InsertOutcome, MemoryStore, Sort, StoreResult, UpdateResult,
};
use bookstore_kernel::{settings::Settings, InitCtx};
use serde_json::json;

use common::{body_json, build_app, get, post_json, test_settings, with_key, UnavailableStore};

#[test]
fn registry_refuses_to_build_without_api_key() {
    let result = bookstore_app::build_registry(&Settings::default(), Arc::new(MemoryStore::new()));
    assert!(result.is_err());
}

#[test]
fn registry_contains_books_module() {
    let registry =
        bookstore_app::build_registry(&test_settings(), Arc::new(MemoryStore::new())).unwrap();
    assert!(registry.get_module("books").is_some());
    assert_eq!(registry.len(), 1);
}

#[test]
fn merged_openapi_documents_book_routes() {
    let registry =
        bookstore_app::build_registry(&test_settings(), Arc::new(MemoryStore::new())).unwrap();
    let spec = bookstore_http::router::merged_openapi(&registry);

    assert!(spec["paths"]["/books/"]["get"].is_object());
    assert!(spec["paths"]["/books/"]["post"].is_object());
    assert!(spec["paths"]["/books/{isbn}/"]["put"].is_object());
    assert!(spec["components"]["schemas"]["Book"].is_object());
    assert!(spec["components"]["schemas"]["ErrorResponse"].is_object());
}

#[tokio::test]
async fn healthz_needs_no_key() {
    let app = build_app();
    let response = get(&app, "/healthz").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let app = build_app();
    let response = get(&app, "/books/").await;
    assert!(response.headers().get("x-request-id").is_some());
}

#[tokio::test]
async fn without_a_database_url_books_live_in_memory() {
    let settings = test_settings();
    let store = bookstore_app::open_store(&settings.database).await.unwrap();
    let registry = bookstore_app::build_registry(&settings, store).unwrap();
    let app = bookstore_http::build_router(&registry, &settings);

    let book = json!({
        "title": "T", "isbn13": "123", "details": "D",
        "publisher": "P", "year": 2020, "price": 9.99
    });
    assert_eq!(
        post_json(&app, &with_key("/books/"), book).await.status(),
        StatusCode::OK
    );

    let listing = body_json(get(&app, &with_key("/books/")).await).await;
    assert_eq!(listing["total"], 1);
    assert_eq!(listing["books"][0]["isbn13"], "123");
}

#[tokio::test]
async fn malformed_database_url_fails_startup() {
    let mut settings = test_settings();
    settings.database.url = Some("not-a-mongodb-url".to_string());

    let err = bookstore_app::open_store(&settings.database)
        .await
        .err()
        .unwrap();
    assert!(err.to_string().contains("bookstore"));
}

/// Memory store that remembers which unique indexes were requested.
#[derive(Default)]
struct IndexRecordingStore {
    inner: MemoryStore,
    unique: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl DocumentStore for IndexRecordingStore {
    async fn ensure_unique(&self, collection: &str, field: &str) -> StoreResult<()> {
        self.unique
            .lock()
            .unwrap()
            .push((collection.to_string(), field.to_string()));
        Ok(())
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        sort: Option<&Sort>,
    ) -> StoreResult<Vec<Document>> {
        self.inner.find(collection, filter, sort).await
    }

    async fn insert_if_absent(
        &self,
        collection: &str,
        guard: &Filter,
        document: Document,
    ) -> StoreResult<InsertOutcome> {
        self.inner.insert_if_absent(collection, guard, document).await
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        set: Document,
    ) -> StoreResult<UpdateResult> {
        self.inner.update_one(collection, filter, set).await
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        self.inner.delete_many(collection, filter).await
    }
}

#[tokio::test]
async fn books_init_makes_isbn_unique() {
    let settings = test_settings();
    let store = Arc::new(IndexRecordingStore::default());
    let registry = bookstore_app::build_registry(&settings, store.clone()).unwrap();

    registry
        .init_all(&InitCtx {
            settings: &settings,
        })
        .await
        .unwrap();

    assert_eq!(
        *store.unique.lock().unwrap(),
        vec![("books".to_string(), "isbn13".to_string())]
    );
}

#[tokio::test]
async fn books_init_fails_when_the_store_is_down() {
    let settings = test_settings();
    let registry = bookstore_app::build_registry(&settings, Arc::new(UnavailableStore)).unwrap();

    let result = registry
        .init_all(&InitCtx {
            settings: &settings,
        })
        .await;
    assert!(result.is_err());
}
