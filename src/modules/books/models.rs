use serde::{Deserialize, Serialize};

/// A book record as stored and returned by the API.
///
/// `isbn13` is the business key clients address books by. It is not validated
/// beyond being present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub title: String,
    pub isbn13: String,
    pub details: String,
    pub publisher: String,
    pub year: i32,
    pub price: f64,
}

/// Replacement payload for `PUT`: every field except `isbn13`, which cannot be
/// changed through an update. An `isbn13` in the body is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookChanges {
    pub title: String,
    pub details: String,
    pub publisher: String,
    pub year: i32,
    pub price: f64,
}

/// Response of the list operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookList {
    pub total: usize,
    pub books: Vec<Book>,
}

/// `{status, message}` acknowledgement returned by mutating operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub status: u8,
    pub message: String,
}

impl StatusMessage {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: 0,
            message: message.into(),
        }
    }
}
