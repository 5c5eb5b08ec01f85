use axum::{
    extract::{FromRef, State},
    http::Method,
    Json,
};

use bookstore_authz::AccessGate;
use bookstore_db::{InsertOutcome, StoreError};
use bookstore_http::{AppError, JsonBody, PathParam, RequireApiKey};

use super::models::{Book, BookChanges, BookList, StatusMessage};
use super::repository::BookRepository;

const ALREADY_EXISTS_MESSAGE: &str = "Book already exists, use PUT to update";

/// State shared by the book handlers.
#[derive(Clone)]
pub struct BooksState {
    pub repository: BookRepository,
    pub gate: AccessGate,
}

impl FromRef<BooksState> for AccessGate {
    fn from_ref(state: &BooksState) -> Self {
        state.gate.clone()
    }
}

/// Every storage failure surfaces as the generic 404; the cause is only logged.
fn storage_fault(operation: &'static str) -> impl FnOnce(StoreError) -> AppError {
    move |err| {
        tracing::error!(operation, error = %err, "book storage fault");
        AppError::resource_not_found()
    }
}

/// `GET /books/`
pub async fn list_books(
    _: RequireApiKey,
    State(state): State<BooksState>,
) -> Result<Json<BookList>, AppError> {
    let books = state
        .repository
        .list()
        .await
        .map_err(storage_fault("list"))?;

    Ok(Json(BookList {
        total: books.len(),
        books,
    }))
}

/// `GET /books/{isbn}/` answers with every match, possibly none.
pub async fn get_book(
    _: RequireApiKey,
    State(state): State<BooksState>,
    PathParam(isbn): PathParam<String>,
) -> Result<Json<Vec<Book>>, AppError> {
    let books = state
        .repository
        .find_by_isbn(&isbn)
        .await
        .map_err(storage_fault("get"))?;

    Ok(Json(books))
}

/// `POST /books/`
pub async fn create_book(
    _: RequireApiKey,
    State(state): State<BooksState>,
    JsonBody(book): JsonBody<Book>,
) -> Result<Json<StatusMessage>, AppError> {
    let outcome = state
        .repository
        .create(&book)
        .await
        .map_err(storage_fault("create"))?;

    match outcome {
        InsertOutcome::Inserted(id) => {
            tracing::info!(isbn13 = %book.isbn13, %id, "book added");
            Ok(Json(StatusMessage::ok("Book added")))
        }
        InsertOutcome::AlreadyExists => Err(AppError::already_exists(ALREADY_EXISTS_MESSAGE)),
    }
}

/// `PUT /books/{isbn}/` succeeds whether or not a book matched.
pub async fn update_book(
    _: RequireApiKey,
    State(state): State<BooksState>,
    PathParam(isbn): PathParam<String>,
    JsonBody(changes): JsonBody<BookChanges>,
) -> Result<Json<StatusMessage>, AppError> {
    let result = state
        .repository
        .update(&isbn, &changes)
        .await
        .map_err(storage_fault("update"))?;

    tracing::info!(
        isbn13 = %isbn,
        matched = result.matched,
        modified = result.modified,
        "book update applied"
    );
    Ok(Json(StatusMessage::ok("Book updated")))
}

/// `DELETE /books/{isbn}` succeeds whether or not a book matched.
pub async fn delete_book(
    _: RequireApiKey,
    State(state): State<BooksState>,
    PathParam(isbn): PathParam<String>,
) -> Result<Json<StatusMessage>, AppError> {
    let removed = state
        .repository
        .delete(&isbn)
        .await
        .map_err(storage_fault("delete"))?;

    tracing::info!(isbn13 = %isbn, removed, "book delete applied");
    Ok(Json(StatusMessage::ok("Book deleted")))
}

/// HEAD, CONNECT, OPTIONS, TRACE and PATCH on a single resource; no key needed.
pub async fn method_not_supported(method: Method) -> AppError {
    AppError::method_not_supported(method)
}
