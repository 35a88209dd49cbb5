//! Typed error handling for the invoice gateway
//!
//! Every handler returns `Result<_, GatewayError>`. The error knows its HTTP
//! status and renders itself as the standard failure envelope.
//!
//! # Error Categories
//!
//! - [`GatewayError::NotFound`]: the requested identity does not exist (404)
//! - [`ValidationError`]: application-level checks such as the status enum (400)
//! - [`RequestError`]: undecodable JSON bodies or a missing path segment (400)
//! - [`StorageError`]: anything the datastore reports (500, message verbatim)
//! - [`ConfigError`]: startup configuration problems
//!
//! # Example
//!
//! ```rust,ignore
//! async fn fetch(service: &dyn InvoiceService, id: i64) -> Result<Invoice, GatewayError> {
//!     service
//!         .get(id)
//!         .await?
//!         .ok_or(GatewayError::NotFound { resource: "Invoice" })
//! }
//! ```

use crate::core::envelope::Envelope;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// The main error type for the gateway
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Requested row is absent
    #[error("{resource} not found")]
    NotFound { resource: &'static str },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl GatewayError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::NotFound { .. } => StatusCode::NOT_FOUND,
            GatewayError::Validation(_) => StatusCode::BAD_REQUEST,
            GatewayError::Request(_) => StatusCode::BAD_REQUEST,
            GatewayError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error, used as a log field
    pub fn error_code(&self) -> &'static str {
        match self {
            GatewayError::NotFound { .. } => "NOT_FOUND",
            GatewayError::Validation(e) => e.error_code(),
            GatewayError::Request(e) => e.error_code(),
            GatewayError::Storage(e) => e.error_code(),
            GatewayError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// Convert to a failure envelope
    ///
    /// Datastore failures and status validation use the `error` member;
    /// not-found and request problems use `message`.
    pub fn to_envelope(&self) -> Envelope {
        match self {
            GatewayError::Validation(ValidationError::InvalidStatus { .. })
            | GatewayError::Storage(_)
            | GatewayError::Config(_) => Envelope::failure_error(self.to_string()),
            GatewayError::NotFound { .. }
            | GatewayError::Validation(_)
            | GatewayError::Request(_) => Envelope::failure_message(self.to_string()),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "request failed");
        } else {
            tracing::debug!(code = self.error_code(), error = %self, "request rejected");
        }
        (status, Json(self.to_envelope())).into_response()
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Application-level validation failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Status is missing or not one of S, P, E
    #[error("Invalid status. Allowed values are S, P, E")]
    InvalidStatus { value: Option<String> },

    /// PATCH body carried none of the recognised fields
    #[error("No fields provided for update")]
    EmptyUpdate,
}

impl ValidationError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationError::InvalidStatus { .. } => "INVALID_STATUS",
            ValidationError::EmptyUpdate => "EMPTY_UPDATE",
        }
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors extracting parameters from the HTTP request
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    #[error("Invalid id: {raw}")]
    InvalidId { raw: String },

    #[error("Invalid request body: {message}")]
    InvalidBody { message: String },
}

impl RequestError {
    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::InvalidId { .. } => "INVALID_ID",
            RequestError::InvalidBody { .. } => "INVALID_BODY",
        }
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors reported by a storage backend
///
/// `Display` is the backend's own message, unchanged, so clients receive the
/// same text the datastore produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// The datastore could not be reached or the pool is exhausted/closed
    #[error("{message}")]
    Connection { message: String },

    /// A constraint (not-null, check, unique) rejected the statement
    #[error("{message}")]
    Integrity {
        constraint: Option<String>,
        message: String,
    },

    /// Any other statement failure (syntax, type mismatch, decoding)
    #[error("{message}")]
    Query { message: String },
}

impl StorageError {
    pub fn error_code(&self) -> &'static str {
        match self {
            StorageError::Connection { .. } => "STORAGE_CONNECTION_ERROR",
            StorageError::Integrity { .. } => "STORAGE_INTEGRITY_ERROR",
            StorageError::Query { .. } => "STORAGE_QUERY_ERROR",
        }
    }

    /// Not-null violation in the shape PostgreSQL reports it
    pub fn not_null(table: &str, column: &str) -> Self {
        StorageError::Integrity {
            constraint: None,
            message: format!(
                "null value in column \"{}\" of relation \"{}\" violates not-null constraint",
                column, table
            ),
        }
    }

    /// Check-constraint violation in the shape PostgreSQL reports it
    pub fn check(table: &str, constraint: &str) -> Self {
        StorageError::Integrity {
            constraint: Some(constraint.to_string()),
            message: format!(
                "new row for relation \"{}\" violates check constraint \"{}\"",
                table, constraint
            ),
        }
    }

    /// Text that the named SQL type cannot parse
    pub fn invalid_input(type_name: &str, raw: &str) -> Self {
        StorageError::Query {
            message: format!("invalid input syntax for type {}: \"{}\"", type_name, raw),
        }
    }

    pub fn out_of_range(type_name: &str, raw: &str) -> Self {
        StorageError::Query {
            message: format!("value \"{}\" is out of range for type {}", raw, type_name),
        }
    }

    /// A number with more integer digits than its `NUMERIC(p, s)` column allows
    pub fn numeric_overflow() -> Self {
        StorageError::Query {
            message: "numeric field overflow".to_string(),
        }
    }

    pub fn value_too_long(max_length: usize) -> Self {
        StorageError::Query {
            message: format!(
                "value too long for type character varying({})",
                max_length
            ),
        }
    }
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db) => {
                let message = db.message().to_string();
                match db.kind() {
                    sqlx::error::ErrorKind::Other => StorageError::Query { message },
                    _ => StorageError::Integrity {
                        constraint: db.constraint().map(str::to_string),
                        message,
                    },
                }
            }
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::WorkerCrashed => StorageError::Connection {
                message: err.to_string(),
            },
            other => StorageError::Query {
                message: other.to_string(),
            },
        }
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors loading the gateway configuration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required configuration value: {0}")]
    MissingField(&'static str),

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to read configuration file '{path}': {message}")]
    FileError { path: String, message: String },

    #[error("Failed to parse configuration: {message}")]
    ParseError { message: String },
}
