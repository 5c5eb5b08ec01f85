pub mod handlers;
pub mod models;
pub mod openapi;
pub mod repository;

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use axum::{
    routing::{get, head},
    Router,
};
use bookstore_authz::AccessGate;
use bookstore_kernel::{InitCtx, Module};

use handlers::BooksState;
use repository::BookRepository;

/// Books module: API-key gated CRUD over the book collection
pub struct BooksModule {
    state: BooksState,
}

impl BooksModule {
    pub fn new(repository: BookRepository, gate: AccessGate) -> Self {
        Self {
            state: BooksState { repository, gate },
        }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        self.state
            .repository
            .ensure_indexes()
            .await
            .with_context(|| {
                format!(
                    "failed to prepare collection '{}'",
                    self.state.repository.collection()
                )
            })?;

        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            collection = self.state.repository.collection(),
            access = ?self.state.gate,
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        // Both slash forms are served for every book route.
        let collection = get(handlers::list_books).post(handlers::create_book);
        let resource = get(handlers::get_book)
            .put(handlers::update_book)
            .delete(handlers::delete_book);
        let unsupported = head(handlers::method_not_supported)
            .connect(handlers::method_not_supported)
            .options(handlers::method_not_supported)
            .trace(handlers::method_not_supported)
            .patch(handlers::method_not_supported);

        Router::new()
            .route("/books", collection.clone())
            .route("/books/", collection)
            .route("/books/{isbn}", resource.clone())
            .route("/books/{isbn}/", resource)
            .route("/books/{isbn}/{apikey}", unsupported)
            .with_state(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi::fragment())
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module
pub fn create_module(repository: BookRepository, gate: AccessGate) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(repository, gate))
}
