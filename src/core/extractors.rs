//! Axum extractors for path identities and JSON bodies
//!
//! Both extractors reject with a [`GatewayError`], so malformed requests get
//! the standard failure envelope instead of axum's plain-text rejection.

use crate::core::error::{GatewayError, RequestError, StorageError};
use axum::Json;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use std::num::IntErrorKind;

/// Numeric row identity taken from the `{id}` path segment
///
/// The segment is read the way the `BIGINT` identity column reads text, and
/// a segment it cannot read fails with the datastore's own message (500).
///
/// # Usage
///
/// ```rust,ignore
/// async fn get_invoice(RecordId(id): RecordId) -> Result<Json<Envelope<Invoice>>, GatewayError> {
///     // id is an i64
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordId(pub i64);

impl<S> FromRequestParts<S> for RecordId
where
    S: Send + Sync,
{
    type Rejection = GatewayError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| RequestError::InvalidId {
                raw: rejection.body_text(),
            })?;

        match raw.trim().parse::<i64>() {
            Ok(id) => Ok(RecordId(id)),
            Err(err) => Err(match err.kind() {
                IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                    StorageError::out_of_range("bigint", &raw)
                }
                _ => StorageError::invalid_input("bigint", &raw),
            }
            .into()),
        }
    }
}

/// JSON body extractor whose rejection is a 400 envelope
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = GatewayError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => Err(RequestError::InvalidBody {
                message: rejection.body_text(),
            }
            .into()),
        }
    }
}
