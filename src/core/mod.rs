//! Core module containing the domain model, storage traits and HTTP plumbing

pub mod envelope;
pub mod error;
pub mod extractors;
pub mod field;
pub mod invoice;
pub mod invoice_line;
pub mod service;

pub use envelope::Envelope;
pub use error::{ConfigError, GatewayError, RequestError, StorageError, ValidationError};
pub use extractors::{JsonBody, RecordId};
pub use field::{ColumnType, FieldValue, InputText, Patch};
pub use invoice::{
    CreateInvoiceRequest, Invoice, InvoiceAssignment, InvoiceColumn, InvoiceDraft, InvoicePatch,
    InvoiceStatus, ReplaceInvoiceRequest,
};
pub use invoice_line::{CreateInvoiceLineRequest, InvoiceLine};
pub use service::{InvoiceLineService, InvoiceService, StorageResult};
