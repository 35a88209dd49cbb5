//! # Invoice Gateway
//!
//! A REST gateway over a PostgreSQL store of supplier invoices and invoice
//! lines.
//!
//! ## Features
//!
//! - **Invoice CRUD**: list, fetch, create, full replace, partial update and
//!   delete under `/api/invoices`
//! - **Invoice Lines**: create and read lines whose total is computed by the
//!   database
//! - **Closed Status Enum**: `S`, `P`, `E`, checked in the handler and the table
//! - **Safe Partial Updates**: a fixed column whitelist with every value bound
//!   as a parameter
//! - **Uniform Envelope**: `{success, data, message, error, ...}` on every route
//! - **Pluggable Storage**: PostgreSQL in production, in-memory for tests
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use invoice_gateway::prelude::*;
//!
//! let app = ServerBuilder::new()
//!     .with_invoice_service(InMemoryInvoiceService::new())
//!     .with_invoice_line_service(InMemoryInvoiceLineService::new())
//!     .with_cors(CorsSettings::new(vec!["http://localhost:5173".into()]))
//!     .build()?;
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod core;
pub mod invoice_lines;
pub mod invoices;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Domain ===
    pub use crate::core::{
        CreateInvoiceLineRequest, CreateInvoiceRequest, Envelope, FieldValue, InputText, Invoice,
        InvoiceAssignment, InvoiceColumn, InvoiceDraft, InvoiceLine, InvoicePatch, InvoiceStatus,
        Patch, ReplaceInvoiceRequest,
    };

    // === Errors ===
    pub use crate::core::{ConfigError, GatewayError, RequestError, StorageError, ValidationError};

    // === Storage Traits ===
    pub use crate::core::{InvoiceLineService, InvoiceService, StorageResult};

    // === Storage ===
    #[cfg(feature = "in-memory")]
    pub use crate::storage::{InMemoryInvoiceLineService, InMemoryInvoiceService};
    #[cfg(feature = "postgres")]
    pub use crate::storage::{PostgresInvoiceLineService, PostgresInvoiceService};

    // === Config ===
    pub use crate::config::GatewayConfig;

    // === Server ===
    pub use crate::server::{CorsSettings, ServerBuilder, ServerHost, build_routes};

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, NaiveDate, Utc};
    pub use rust_decimal::Decimal;
    pub use serde::{Deserialize, Serialize};
}
