//! Supplier invoice model and request payloads
//!
//! The request types keep every field optional and untyped. Any JSON scalar
//! is accepted and handed to the datastore as text, which converts it to the
//! column type or fails. Required columns that the client leaves out are sent
//! as `NULL`, so the not-null constraint reports them. The only
//! application-level check is the status code.

use crate::core::error::ValidationError;
use crate::core::field::{ColumnType, FieldValue, InputText, Patch};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Table holding supplier invoices
pub const INVOICE_TABLE: &str = "catalogservice_supplierinvoice";

/// Name of the check constraint restricting `status`
pub const STATUS_CONSTRAINT: &str = "catalogservice_supplierinvoice_status_check";

/// Workflow status of an invoice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InvoiceStatus {
    #[serde(rename = "S")]
    Submitted,
    #[serde(rename = "P")]
    Pending,
    #[serde(rename = "E")]
    Error,
}

impl InvoiceStatus {
    pub const ALL: [InvoiceStatus; 3] = [
        InvoiceStatus::Submitted,
        InvoiceStatus::Pending,
        InvoiceStatus::Error,
    ];

    /// Single-character code stored in the `status` column
    pub const fn code(self) -> &'static str {
        match self {
            InvoiceStatus::Submitted => "S",
            InvoiceStatus::Pending => "P",
            InvoiceStatus::Error => "E",
        }
    }

    /// Parse a status code; anything but `S`, `P` or `E` is rejected
    pub fn parse(code: &str) -> Result<Self, ValidationError> {
        match code {
            "S" => Ok(InvoiceStatus::Submitted),
            "P" => Ok(InvoiceStatus::Pending),
            "E" => Ok(InvoiceStatus::Error),
            other => Err(ValidationError::InvalidStatus {
                value: Some(other.to_string()),
            }),
        }
    }

    /// Check a status exactly as it appeared in a JSON body
    ///
    /// Only the strings `"S"`, `"P"` and `"E"` pass; numbers, booleans and
    /// other shapes are rejected like an unknown code.
    pub fn from_json(value: &Value) -> Result<Self, ValidationError> {
        match value {
            Value::String(code) => Self::parse(code),
            other => Err(ValidationError::InvalidStatus {
                value: Some(other.to_string()),
            }),
        }
    }
}

impl FromStr for InvoiceStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A stored invoice row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub invoice_id: i64,
    pub supplier_id: String,
    pub invoice_number: String,
    pub sap_invoice_number: Option<String>,
    pub invoice_date: NaiveDate,
    pub amount: Decimal,
    pub currency_code: String,
    pub status: InvoiceStatus,
    pub message: Option<String>,
    pub po_number: Option<String>,
    pub created_by: String,
    pub updated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Columns a client may write after creation
///
/// This is the complete whitelist used to build UPDATE column lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvoiceColumn {
    SupplierId,
    InvoiceNumber,
    SapInvoiceNumber,
    InvoiceDate,
    Amount,
    CurrencyCode,
    Status,
    Message,
    PoNumber,
    UpdatedBy,
}

impl InvoiceColumn {
    pub const ALL: [InvoiceColumn; 10] = [
        InvoiceColumn::SupplierId,
        InvoiceColumn::InvoiceNumber,
        InvoiceColumn::SapInvoiceNumber,
        InvoiceColumn::InvoiceDate,
        InvoiceColumn::Amount,
        InvoiceColumn::CurrencyCode,
        InvoiceColumn::Status,
        InvoiceColumn::Message,
        InvoiceColumn::PoNumber,
        InvoiceColumn::UpdatedBy,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            InvoiceColumn::SupplierId => "supplier_id",
            InvoiceColumn::InvoiceNumber => "invoice_number",
            InvoiceColumn::SapInvoiceNumber => "sap_invoice_number",
            InvoiceColumn::InvoiceDate => "invoice_date",
            InvoiceColumn::Amount => "amount",
            InvoiceColumn::CurrencyCode => "currency_code",
            InvoiceColumn::Status => "status",
            InvoiceColumn::Message => "message",
            InvoiceColumn::PoNumber => "po_number",
            InvoiceColumn::UpdatedBy => "updated_by",
        }
    }

    /// Declared SQL type of the column
    pub const fn sql_type(self) -> ColumnType {
        match self {
            InvoiceColumn::SupplierId
            | InvoiceColumn::InvoiceNumber
            | InvoiceColumn::SapInvoiceNumber
            | InvoiceColumn::PoNumber => ColumnType::Varchar(50),
            InvoiceColumn::InvoiceDate => ColumnType::Date,
            InvoiceColumn::Amount => ColumnType::Numeric {
                precision: 15,
                scale: 2,
            },
            InvoiceColumn::CurrencyCode => ColumnType::Varchar(5),
            InvoiceColumn::Status => ColumnType::Varchar(1),
            InvoiceColumn::Message => ColumnType::Text,
            InvoiceColumn::UpdatedBy => ColumnType::Varchar(100),
        }
    }

    /// Whether the column is declared `NOT NULL`
    pub const fn is_required(self) -> bool {
        matches!(
            self,
            InvoiceColumn::SupplierId
                | InvoiceColumn::InvoiceNumber
                | InvoiceColumn::InvoiceDate
                | InvoiceColumn::Amount
                | InvoiceColumn::CurrencyCode
                | InvoiceColumn::Status
        )
    }
}

/// SQL type of `created_by`, which is written only on insert
pub const CREATED_BY_TYPE: ColumnType = ColumnType::Varchar(100);

/// One `column = value` pair of an UPDATE
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceAssignment {
    pub column: InvoiceColumn,
    pub value: FieldValue,
}

impl InvoiceAssignment {
    pub fn new(column: InvoiceColumn, value: FieldValue) -> Self {
        Self { column, value }
    }

    fn text(column: InvoiceColumn, value: Option<InputText>) -> Self {
        Self::new(column, FieldValue::Text(value.map(String::from)))
    }
}

fn optional_status(status: Option<Value>) -> Result<Option<InvoiceStatus>, ValidationError> {
    status.as_ref().map(InvoiceStatus::from_json).transpose()
}

/// Body of `POST /api/invoices`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateInvoiceRequest {
    pub supplier_id: Option<InputText>,
    pub invoice_number: Option<InputText>,
    pub sap_invoice_number: Option<InputText>,
    pub invoice_date: Option<InputText>,
    pub amount: Option<InputText>,
    pub currency_code: Option<InputText>,
    pub status: Option<Value>,
    pub message: Option<InputText>,
    pub po_number: Option<InputText>,
    pub created_by: Option<InputText>,
}

impl CreateInvoiceRequest {
    /// Check the status code and produce an insertable draft
    ///
    /// A missing or `null` status is rejected the same way as an unknown one.
    pub fn validate(self) -> Result<InvoiceDraft, ValidationError> {
        let status = match self.status.as_ref() {
            Some(value) => InvoiceStatus::from_json(value)?,
            None => return Err(ValidationError::InvalidStatus { value: None }),
        };

        Ok(InvoiceDraft {
            supplier_id: self.supplier_id.map(String::from),
            invoice_number: self.invoice_number.map(String::from),
            sap_invoice_number: self.sap_invoice_number.map(String::from),
            invoice_date: self.invoice_date.map(String::from),
            amount: self.amount.map(String::from),
            currency_code: self.currency_code.map(String::from),
            status,
            message: self.message.map(String::from),
            po_number: self.po_number.map(String::from),
            created_by: self.created_by.map(String::from),
        })
    }
}

/// A create request whose status passed validation
///
/// Every other column is still client text; the storage backend converts it.
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceDraft {
    pub supplier_id: Option<String>,
    pub invoice_number: Option<String>,
    pub sap_invoice_number: Option<String>,
    pub invoice_date: Option<String>,
    pub amount: Option<String>,
    pub currency_code: Option<String>,
    pub status: InvoiceStatus,
    pub message: Option<String>,
    pub po_number: Option<String>,
    pub created_by: Option<String>,
}

/// Body of `PUT /api/invoices/{id}`: every mutable column is written
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplaceInvoiceRequest {
    pub supplier_id: Option<InputText>,
    pub invoice_number: Option<InputText>,
    pub sap_invoice_number: Option<InputText>,
    pub invoice_date: Option<InputText>,
    pub amount: Option<InputText>,
    pub currency_code: Option<InputText>,
    pub status: Option<Value>,
    pub message: Option<InputText>,
    pub po_number: Option<InputText>,
    pub updated_by: Option<InputText>,
}

impl ReplaceInvoiceRequest {
    /// Assignments for all mutable columns, absent ones as `NULL`
    pub fn validate(self) -> Result<Vec<InvoiceAssignment>, ValidationError> {
        use InvoiceColumn::*;

        let status = optional_status(self.status)?;

        Ok(vec![
            InvoiceAssignment::text(SupplierId, self.supplier_id),
            InvoiceAssignment::text(InvoiceNumber, self.invoice_number),
            InvoiceAssignment::text(SapInvoiceNumber, self.sap_invoice_number),
            InvoiceAssignment::text(InvoiceDate, self.invoice_date),
            InvoiceAssignment::text(Amount, self.amount),
            InvoiceAssignment::text(CurrencyCode, self.currency_code),
            InvoiceAssignment::new(Status, FieldValue::Status(status)),
            InvoiceAssignment::text(Message, self.message),
            InvoiceAssignment::text(PoNumber, self.po_number),
            InvoiceAssignment::text(UpdatedBy, self.updated_by),
        ])
    }
}

/// Body of `PATCH /api/invoices/{id}`: only present keys are written
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvoicePatch {
    #[serde(default)]
    pub supplier_id: Patch<InputText>,
    #[serde(default)]
    pub invoice_number: Patch<InputText>,
    #[serde(default)]
    pub sap_invoice_number: Patch<InputText>,
    #[serde(default)]
    pub invoice_date: Patch<InputText>,
    #[serde(default)]
    pub amount: Patch<InputText>,
    #[serde(default)]
    pub currency_code: Patch<InputText>,
    #[serde(default)]
    pub status: Patch<Value>,
    #[serde(default)]
    pub message: Patch<InputText>,
    #[serde(default)]
    pub po_number: Patch<InputText>,
    #[serde(default)]
    pub updated_by: Patch<InputText>,
}

impl InvoicePatch {
    pub fn is_empty(&self) -> bool {
        !(self.supplier_id.is_present()
            || self.invoice_number.is_present()
            || self.sap_invoice_number.is_present()
            || self.invoice_date.is_present()
            || self.amount.is_present()
            || self.currency_code.is_present()
            || self.status.is_present()
            || self.message.is_present()
            || self.po_number.is_present()
            || self.updated_by.is_present())
    }

    /// Assignments for the keys present in the body
    pub fn validate(self) -> Result<Vec<InvoiceAssignment>, ValidationError> {
        use InvoiceColumn::*;

        if self.is_empty() {
            return Err(ValidationError::EmptyUpdate);
        }

        let status = match self.status.into_option() {
            Some(value) => Some(optional_status(value)?),
            None => None,
        };

        let text = |value: Patch<InputText>| {
            value
                .into_option()
                .map(|v| FieldValue::Text(v.map(String::from)))
        };

        let mut assignments = Vec::new();
        let mut push = |column: InvoiceColumn, value: Option<FieldValue>| {
            if let Some(value) = value {
                assignments.push(InvoiceAssignment::new(column, value));
            }
        };

        push(SupplierId, text(self.supplier_id));
        push(InvoiceNumber, text(self.invoice_number));
        push(SapInvoiceNumber, text(self.sap_invoice_number));
        push(InvoiceDate, text(self.invoice_date));
        push(Amount, text(self.amount));
        push(CurrencyCode, text(self.currency_code));
        push(Status, status.map(FieldValue::Status));
        push(Message, text(self.message));
        push(PoNumber, text(self.po_number));
        push(UpdatedBy, text(self.updated_by));

        Ok(assignments)
    }
}
