//! Document store used by the bookstore service.
//!
//! Collections hold schemaless JSON documents. The store owns the internal
//! identifier (`_id`) and revision counter (`__v`) of every document and never
//! returns them from queries. [`MongoStore`] talks to a MongoDB server;
//! [`MemoryStore`] keeps everything in process.

pub mod error;
pub mod memory;
pub mod mongo;
pub mod query;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use mongo::MongoStore;
pub use query::{Filter, Sort};
pub use store::{Document, DocumentStore, InsertOutcome, UpdateResult};

/// Field name of the store-assigned document identifier.
pub const ID_FIELD: &str = "_id";
/// Field name of the store-maintained revision counter.
pub const REVISION_FIELD: &str = "__v";
