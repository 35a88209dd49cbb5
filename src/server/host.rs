//! Process-scoped state shared by every handler
//!
//! The host owns the storage services behind trait objects so the same router
//! runs against PostgreSQL in production and the in-memory backends in tests.

use crate::core::{InvoiceLineService, InvoiceService};
use std::sync::Arc;

/// Handler state holding the storage services
///
/// Cloning is cheap: both services are reference counted.
#[derive(Clone)]
pub struct ServerHost {
    /// Supplier invoice storage
    pub invoices: Arc<dyn InvoiceService>,

    /// Invoice line storage
    pub invoice_lines: Arc<dyn InvoiceLineService>,
}

impl ServerHost {
    pub fn new(
        invoices: Arc<dyn InvoiceService>,
        invoice_lines: Arc<dyn InvoiceLineService>,
    ) -> Self {
        Self {
            invoices,
            invoice_lines,
        }
    }
}

impl std::fmt::Debug for ServerHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerHost").finish_non_exhaustive()
    }
}
