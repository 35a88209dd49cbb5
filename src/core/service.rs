//! Service traits for invoice and invoice line storage

use crate::core::error::StorageError;
use crate::core::invoice::{Invoice, InvoiceAssignment, InvoiceDraft};
use crate::core::invoice_line::{CreateInvoiceLineRequest, InvoiceLine};
use async_trait::async_trait;

pub type StorageResult<T> = Result<T, StorageError>;

/// Service trait for supplier invoices
///
/// Each method maps onto exactly one statement. A missing row is reported as
/// `Ok(None)`, never as an error.
#[async_trait]
pub trait InvoiceService: Send + Sync {
    /// List all invoices ordered by `invoice_id` ascending
    async fn list(&self) -> StorageResult<Vec<Invoice>>;

    /// Get an invoice by id
    async fn get(&self, id: i64) -> StorageResult<Option<Invoice>>;

    /// Insert a new invoice; `created_at` and `updated_at` are set by the store
    async fn create(&self, draft: InvoiceDraft) -> StorageResult<Invoice>;

    /// Overwrite every mutable column
    ///
    /// `assignments` is expected to cover the full column whitelist.
    async fn replace(
        &self,
        id: i64,
        assignments: Vec<InvoiceAssignment>,
    ) -> StorageResult<Option<Invoice>>;

    /// Write only the given columns and refresh `updated_at`
    async fn patch(
        &self,
        id: i64,
        assignments: Vec<InvoiceAssignment>,
    ) -> StorageResult<Option<Invoice>>;

    /// Delete an invoice, returning the removed row
    async fn delete(&self, id: i64) -> StorageResult<Option<Invoice>>;

    /// Delete every invoice, returning how many rows were removed
    async fn delete_all(&self) -> StorageResult<u64>;
}

/// Service trait for invoice lines (write-then-read only)
#[async_trait]
pub trait InvoiceLineService: Send + Sync {
    /// List all lines ordered by `id` ascending
    async fn list(&self) -> StorageResult<Vec<InvoiceLine>>;

    /// Get a line by id
    async fn get(&self, id: i64) -> StorageResult<Option<InvoiceLine>>;

    /// Insert a new line; `line_total` is computed by the store
    async fn create(&self, request: CreateInvoiceLineRequest) -> StorageResult<InvoiceLine>;

    /// Create the line table if it does not exist yet
    async fn ensure_table(&self) -> StorageResult<()>;
}
