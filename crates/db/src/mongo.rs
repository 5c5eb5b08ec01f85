//! MongoDB document store.

use async_trait::async_trait;
use mongodb::{
    bson::{doc, Bson, Document as BsonDocument},
    error::{Error as MongoError, ErrorKind, WriteFailure},
    options::IndexOptions,
    Client, Collection, Database, IndexModel,
};

use crate::error::StoreResult;
use crate::query::{Filter, Sort};
use crate::store::{Document, DocumentStore, InsertOutcome, UpdateResult};
use crate::{ID_FIELD, REVISION_FIELD};

const DUPLICATE_KEY: i32 = 11000;

/// Store backed by a MongoDB database. Documents keep the driver's `_id` and a
/// `__v` revision set to 0 on insert.
#[derive(Debug, Clone)]
pub struct MongoStore {
    database: Database,
}

impl MongoStore {
    /// Connects to `url` and pings `database`, so a bad URL or an unreachable
    /// server fails here rather than on the first request.
    pub async fn connect(url: &str, database: &str) -> StoreResult<Self> {
        let client = Client::with_uri_str(url).await?;
        let database = client.database(database);
        database.run_command(doc! { "ping": 1 }).await?;

        tracing::info!(target: "bookstore-db", database = database.name(), "connected to MongoDB");
        Ok(Self { database })
    }

    fn collection(&self, name: &str) -> Collection<BsonDocument> {
        self.database.collection(name)
    }
}

fn filter_document(filter: &Filter) -> StoreResult<BsonDocument> {
    let mut document = BsonDocument::new();
    if let Filter::Eq { field, value } = filter {
        document.insert(field.as_str(), mongodb::bson::to_bson(value)?);
    }
    Ok(document)
}

fn sort_document(sort: &Sort) -> BsonDocument {
    let mut document = BsonDocument::new();
    document.insert(sort.field.as_str(), 1);
    document
}

fn hidden_fields() -> BsonDocument {
    let mut projection = BsonDocument::new();
    projection.insert(ID_FIELD, 0);
    projection.insert(REVISION_FIELD, 0);
    projection
}

/// Body of the `$setOnInsert` for a conditional insert. Fields pinned by the
/// guard are left out; the upsert copies them from the filter.
fn insert_fields(guard: &Filter, mut document: Document) -> StoreResult<BsonDocument> {
    document.remove(ID_FIELD);
    document.remove(REVISION_FIELD);
    if let Filter::Eq { field, .. } = guard {
        document.remove(field);
    }

    let mut fields = mongodb::bson::to_document(&document)?;
    fields.insert(REVISION_FIELD, 0);
    Ok(fields)
}

fn set_fields(mut document: Document) -> StoreResult<BsonDocument> {
    document.remove(ID_FIELD);
    document.remove(REVISION_FIELD);
    Ok(mongodb::bson::to_document(&document)?)
}

fn to_json(document: BsonDocument) -> StoreResult<Document> {
    Ok(mongodb::bson::from_document(document)?)
}

fn render_id(id: Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        other => other.to_string(),
    }
}

fn is_duplicate_key(err: &MongoError) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY
    )
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn ensure_unique(&self, collection: &str, field: &str) -> StoreResult<()> {
        let mut keys = BsonDocument::new();
        keys.insert(field, 1);
        let index = IndexModel::builder()
            .keys(keys)
            .options(IndexOptions::builder().unique(true).build())
            .build();

        let created = self.collection(collection).create_index(index).await?;
        tracing::info!(
            target: "bookstore-db",
            collection,
            index = %created.index_name,
            "unique index ready"
        );
        Ok(())
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        sort: Option<&Sort>,
    ) -> StoreResult<Vec<Document>> {
        let coll = self.collection(collection);
        let mut find = coll
            .find(filter_document(filter)?)
            .projection(hidden_fields());
        if let Some(sort) = sort {
            find = find.sort(sort_document(sort));
        }

        let mut cursor = find.await?;
        let mut documents = Vec::new();
        while cursor.advance().await? {
            documents.push(to_json(cursor.deserialize_current()?)?);
        }
        Ok(documents)
    }

    async fn insert_if_absent(
        &self,
        collection: &str,
        guard: &Filter,
        document: Document,
    ) -> StoreResult<InsertOutcome> {
        let update = doc! { "$setOnInsert": insert_fields(guard, document)? };
        let result = self
            .collection(collection)
            .update_one(filter_document(guard)?, update)
            .upsert(true)
            .await;

        match result {
            Ok(result) => match result.upserted_id {
                Some(id) => {
                    let id = render_id(id);
                    tracing::debug!(target: "bookstore-db", collection, %id, "document inserted");
                    Ok(InsertOutcome::Inserted(id))
                }
                None => Ok(InsertOutcome::AlreadyExists),
            },
            // A concurrent insert won the race on the unique index.
            Err(err) if is_duplicate_key(&err) => Ok(InsertOutcome::AlreadyExists),
            Err(err) => Err(err.into()),
        }
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        set: Document,
    ) -> StoreResult<UpdateResult> {
        let collection = self.collection(collection);
        let filter = filter_document(filter)?;
        let set = set_fields(set)?;

        if set.is_empty() {
            let matched = collection.count_documents(filter).limit(1).await?;
            return Ok(UpdateResult {
                matched,
                modified: 0,
            });
        }

        let result = collection.update_one(filter, doc! { "$set": set }).await?;
        Ok(UpdateResult {
            matched: result.matched_count,
            modified: result.modified_count,
        })
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        let result = self
            .collection(collection)
            .delete_many(filter_document(filter)?)
            .await?;
        Ok(result.deleted_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoreError;
    use mongodb::bson::oid::ObjectId;
    use serde_json::{json, Value};

    fn doc_of(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn filters_translate_to_equality_queries() {
        assert!(filter_document(&Filter::all()).unwrap().is_empty());
        assert_eq!(
            filter_document(&Filter::eq("isbn13", "123")).unwrap(),
            doc! { "isbn13": "123" }
        );
    }

    #[test]
    fn queries_hide_internal_fields_and_sort_ascending() {
        assert_eq!(hidden_fields(), doc! { "_id": 0, "__v": 0 });
        assert_eq!(sort_document(&Sort::ascending("isbn13")), doc! { "isbn13": 1 });
    }

    #[test]
    fn insert_fields_leave_guard_and_reserved_fields_to_the_store() {
        let payload = doc_of(json!({
            "_id": "forged",
            "__v": 7,
            "isbn13": "123",
            "title": "T",
            "price": 9.99
        }));

        let fields = insert_fields(&Filter::eq("isbn13", "123"), payload).unwrap();
        assert_eq!(fields, doc! { "title": "T", "price": 9.99, "__v": 0 });
    }

    #[test]
    fn set_fields_never_touch_reserved_fields() {
        let fields = set_fields(doc_of(json!({"__v": 3, "title": "New"}))).unwrap();
        assert_eq!(fields, doc! { "title": "New" });
    }

    #[test]
    fn stored_documents_read_back_as_plain_json() {
        let stored = doc! { "title": "T", "year": 2020_i32, "price": 9.99 };
        assert_eq!(
            to_json(stored).unwrap(),
            doc_of(json!({"title": "T", "year": 2020, "price": 9.99}))
        );
    }

    #[test]
    fn object_ids_render_as_hex() {
        let oid = ObjectId::new();
        assert_eq!(render_id(Bson::ObjectId(oid)), oid.to_hex());
    }

    #[tokio::test]
    async fn malformed_url_is_a_database_error() {
        let err = MongoStore::connect("not-a-mongodb-url", "bookstore")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Database(_)));
    }

    #[tokio::test]
    #[ignore = "needs a MongoDB server at BOOKSTORE_TEST_MONGO_URL"]
    async fn conditional_insert_against_live_server() {
        let url = std::env::var("BOOKSTORE_TEST_MONGO_URL").unwrap();
        let store = MongoStore::connect(&url, "bookstore_test").await.unwrap();
        let collection = format!("books_{}", ObjectId::new().to_hex());
        store.ensure_unique(&collection, "isbn13").await.unwrap();

        let guard = Filter::eq("isbn13", "1");
        let first = store
            .insert_if_absent(&collection, &guard, doc_of(json!({"isbn13": "1", "title": "A"})))
            .await
            .unwrap();
        let second = store
            .insert_if_absent(&collection, &guard, doc_of(json!({"isbn13": "1", "title": "B"})))
            .await
            .unwrap();
        assert!(matches!(first, InsertOutcome::Inserted(_)));
        assert_eq!(second, InsertOutcome::AlreadyExists);

        let found = store
            .find(&collection, &Filter::all(), Some(&Sort::ascending("isbn13")))
            .await
            .unwrap();
        assert_eq!(found, vec![doc_of(json!({"isbn13": "1", "title": "A"}))]);

        let updated = store
            .update_one(&collection, &guard, doc_of(json!({"title": "C"})))
            .await
            .unwrap();
        assert_eq!(updated.matched, 1);
        assert_eq!(store.delete_many(&collection, &guard).await.unwrap(), 1);

        store.collection(&collection).drop().await.unwrap();
    }
}
