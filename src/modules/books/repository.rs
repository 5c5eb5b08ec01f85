use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use bookstore_db::{
    Document, DocumentStore, Filter, InsertOutcome, Sort, StoreResult, UpdateResult,
};

use super::models::{Book, BookChanges};

const ISBN_FIELD: &str = "isbn13";

/// Typed access to the book collection on top of a [`DocumentStore`].
#[derive(Clone)]
pub struct BookRepository {
    store: Arc<dyn DocumentStore>,
    collection: String,
}

impl BookRepository {
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Make `isbn13` unique in the collection.
    pub async fn ensure_indexes(&self) -> StoreResult<()> {
        self.store.ensure_unique(&self.collection, ISBN_FIELD).await
    }

    /// Every book, ascending by `isbn13` string order.
    pub async fn list(&self) -> StoreResult<Vec<Book>> {
        let documents = self
            .store
            .find(&self.collection, &Filter::all(), Some(&Sort::ascending(ISBN_FIELD)))
            .await?;
        documents.into_iter().map(from_document).collect()
    }

    /// All books carrying `isbn13`; normally zero or one.
    pub async fn find_by_isbn(&self, isbn13: &str) -> StoreResult<Vec<Book>> {
        let documents = self
            .store
            .find(&self.collection, &by_isbn(isbn13), None)
            .await?;
        documents.into_iter().map(from_document).collect()
    }

    /// Insert `book` unless its `isbn13` is already taken.
    pub async fn create(&self, book: &Book) -> StoreResult<InsertOutcome> {
        self.store
            .insert_if_absent(&self.collection, &by_isbn(&book.isbn13), to_document(book)?)
            .await
    }

    /// Replace the mutable fields of the first book carrying `isbn13`.
    pub async fn update(&self, isbn13: &str, changes: &BookChanges) -> StoreResult<UpdateResult> {
        self.store
            .update_one(&self.collection, &by_isbn(isbn13), to_document(changes)?)
            .await
    }

    /// Remove every book carrying `isbn13`.
    pub async fn delete(&self, isbn13: &str) -> StoreResult<u64> {
        self.store
            .delete_many(&self.collection, &by_isbn(isbn13))
            .await
    }
}

fn by_isbn(isbn13: &str) -> Filter {
    Filter::eq(ISBN_FIELD, isbn13)
}

fn to_document<T: Serialize>(value: &T) -> StoreResult<Document> {
    Ok(serde_json::from_value(serde_json::to_value(value)?)?)
}

fn from_document<T: DeserializeOwned>(document: Document) -> StoreResult<T> {
    Ok(serde_json::from_value(Value::Object(document))?)
}
