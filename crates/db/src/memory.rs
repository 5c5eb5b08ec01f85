//! In-process document engine, used when no database URL is configured.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::{Timestamp, Uuid};

use crate::error::StoreResult;
use crate::query::{Filter, Sort};
use crate::store::{Document, DocumentStore, InsertOutcome, UpdateResult};
use crate::{ID_FIELD, REVISION_FIELD};

#[derive(Debug, Clone)]
struct StoredDocument {
    id: Uuid,
    fields: Document,
}

impl StoredDocument {
    fn new(fields: Document) -> Self {
        Self {
            id: Uuid::new_v7(Timestamp::now(uuid::NoContext)),
            fields: strip_reserved(fields),
        }
    }
}

/// Document store kept in memory behind a read/write lock. Contents are lost
/// when the process exits. Keeps no revision counter; reserved fields in
/// payloads are dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<BTreeMap<String, Vec<StoredDocument>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn strip_reserved(mut fields: Document) -> Document {
    fields.remove(ID_FIELD);
    fields.remove(REVISION_FIELD);
    fields
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        sort: Option<&Sort>,
    ) -> StoreResult<Vec<Document>> {
        let collections = self.collections.read().await;

        let mut documents: Vec<Document> = collections
            .get(collection)
            .into_iter()
            .flatten()
            .filter(|stored| filter.matches(&stored.fields))
            .map(|stored| stored.fields.clone())
            .collect();

        if let Some(sort) = sort {
            // Stable, so equal keys keep insertion order.
            documents.sort_by(|a, b| sort.compare(a, b));
        }

        Ok(documents)
    }

    async fn insert_if_absent(
        &self,
        collection: &str,
        guard: &Filter,
        document: Document,
    ) -> StoreResult<InsertOutcome> {
        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection.to_string()).or_default();

        if documents.iter().any(|stored| guard.matches(&stored.fields)) {
            return Ok(InsertOutcome::AlreadyExists);
        }

        let stored = StoredDocument::new(document);
        let id = stored.id.to_string();
        documents.push(stored);

        tracing::debug!(target: "bookstore-db", collection, %id, "document inserted");
        Ok(InsertOutcome::Inserted(id))
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        set: Document,
    ) -> StoreResult<UpdateResult> {
        let mut collections = self.collections.write().await;

        let Some(stored) = collections
            .get_mut(collection)
            .and_then(|documents| documents.iter_mut().find(|stored| filter.matches(&stored.fields)))
        else {
            return Ok(UpdateResult::default());
        };

        let mut modified = 0;
        for (field, value) in strip_reserved(set) {
            if stored.fields.get(&field) != Some(&value) {
                stored.fields.insert(field, value);
                modified = 1;
            }
        }

        tracing::debug!(target: "bookstore-db", collection, id = %stored.id, modified, "document updated");
        Ok(UpdateResult {
            matched: 1,
            modified,
        })
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        let mut collections = self.collections.write().await;

        let Some(documents) = collections.get_mut(collection) else {
            return Ok(0);
        };

        let before = documents.len();
        documents.retain(|stored| !filter.matches(&stored.fields));
        let removed = (before - documents.len()) as u64;

        tracing::debug!(target: "bookstore-db", collection, removed, "documents deleted");
        Ok(removed)
    }
}
