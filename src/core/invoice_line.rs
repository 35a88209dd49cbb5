//! Invoice line model
//!
//! Lines live in their own table with no foreign key to invoices. The line
//! total is a generated column; the application never writes it.

use crate::core::field::InputText;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Table holding invoice lines
pub const INVOICE_LINE_TABLE: &str = "new_invoice";

/// A stored invoice line row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub id: i64,
    pub invoice_number: String,
    pub supplier_number: String,
    pub order_number: Option<String>,
    pub item_number: Option<String>,
    pub description: Option<String>,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub currency: Option<String>,
    pub line_total: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Body of `POST /api/new-invoices`
///
/// Fields are untyped like the invoice bodies. A `line_total` key is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateInvoiceLineRequest {
    pub invoice_number: Option<InputText>,
    pub supplier_number: Option<InputText>,
    pub order_number: Option<InputText>,
    pub item_number: Option<InputText>,
    pub description: Option<InputText>,
    pub quantity: Option<InputText>,
    pub unit_price: Option<InputText>,
    pub currency: Option<InputText>,
}
