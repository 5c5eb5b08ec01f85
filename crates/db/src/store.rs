use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::StoreResult;
use crate::query::{Filter, Sort};

/// A stored document as seen by callers: user fields only.
pub type Document = Map<String, Value>;

/// Result of a conditional insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Carries the backend identifier of the new document, rendered as text.
    Inserted(String),
    /// A document matching the guard filter was already present; nothing was written.
    AlreadyExists,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateResult {
    pub matched: u64,
    pub modified: u64,
}

/// Primitives a document backend offers to resource handlers.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Make `field` unique within `collection`. Called once at startup; backends
    /// whose conditional insert is already serialised may treat it as a no-op.
    async fn ensure_unique(&self, _collection: &str, _field: &str) -> StoreResult<()> {
        Ok(())
    }

    /// Documents in `collection` matching `filter`, optionally sorted. Internal
    /// fields are projected out. An empty result is not an error.
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        sort: Option<&Sort>,
    ) -> StoreResult<Vec<Document>>;

    /// Insert `document` unless a document matching `guard` exists. The check and
    /// the write are atomic with respect to other store operations.
    async fn insert_if_absent(
        &self,
        collection: &str,
        guard: &Filter,
        document: Document,
    ) -> StoreResult<InsertOutcome>;

    /// Overwrite the fields in `set` on the first document matching `filter`.
    /// Never inserts and never touches the revision counter.
    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        set: Document,
    ) -> StoreResult<UpdateResult>;

    /// Remove every document matching `filter`, returning how many were removed.
    async fn delete_many(&self, collection: &str, filter: &Filter) -> StoreResult<u64>;
}
