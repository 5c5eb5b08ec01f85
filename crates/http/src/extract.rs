//! Request extractors shared by module handlers.

use axum::{
    extract::{FromRef, FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
    Json,
};
use serde::{de::DeserializeOwned, Deserialize};

use bookstore_authz::AccessGate;

use crate::error::AppError;

#[derive(Debug, Deserialize)]
struct ApiKeyQuery {
    apikey: Option<String>,
}

/// Guard extractor: succeeds only when the `apikey` query parameter passes the
/// [`AccessGate`] in state, otherwise rejects with [`AppError::Unauthorized`].
///
/// Place it before any body extractor so the key is checked before the body is
/// read.
#[derive(Debug, Clone, Copy)]
pub struct RequireApiKey;

impl<S> FromRequestParts<S> for RequireApiKey
where
    AccessGate: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let gate = AccessGate::from_ref(state);

        // An unparsable query string counts as "no key".
        let provided = Query::<ApiKeyQuery>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(query)| query.apikey);

        if gate.authorize(provided.as_deref()) {
            Ok(RequireApiKey)
        } else {
            Err(AppError::unauthorized())
        }
    }
}

/// JSON body extractor whose rejection is an [`AppError::Validation`].
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// Path parameters extractor whose rejection is an [`AppError::BadRequest`].
#[derive(Debug, Clone)]
pub struct PathParam<T>(pub T);

impl<S, T> FromRequestParts<S> for PathParam<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}
