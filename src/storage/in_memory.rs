//! In-memory implementations of the storage services for testing and development
//!
//! Rows are kept in ordered maps keyed by a monotonically assigned identity.
//! Client text is converted the way the PostgreSQL column types convert it:
//! dates and numbers are parsed, `NUMERIC(p, s)` values are rounded to their
//! scale and `VARCHAR(n)` lengths are enforced. Failures carry the messages
//! PostgreSQL uses. Date parsing accepts ISO 8601 forms only.

use crate::core::error::StorageError;
use crate::core::field::{ColumnType, FieldValue, InputText};
use crate::core::invoice::{
    CREATED_BY_TYPE, INVOICE_TABLE, Invoice, InvoiceAssignment, InvoiceColumn, InvoiceDraft,
};
use crate::core::invoice_line::{CreateInvoiceLineRequest, INVOICE_LINE_TABLE, InvoiceLine};
use crate::core::service::{InvoiceLineService, InvoiceService, StorageResult};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Rows of one table plus its identity sequence
#[derive(Debug)]
struct Table<T> {
    rows: BTreeMap<i64, T>,
    last_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<T> Table<T> {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

fn read<T>(lock: &RwLock<Table<T>>) -> StorageResult<RwLockReadGuard<'_, Table<T>>> {
    lock.read().map_err(|e| StorageError::Connection {
        message: format!("Failed to acquire read lock: {}", e),
    })
}

fn write<T>(lock: &RwLock<Table<T>>) -> StorageResult<RwLockWriteGuard<'_, Table<T>>> {
    lock.write().map_err(|e| StorageError::Connection {
        message: format!("Failed to acquire write lock: {}", e),
    })
}

fn required<T>(value: Option<T>, table: &str, column: &str) -> StorageResult<T> {
    value.ok_or_else(|| StorageError::not_null(table, column))
}

// ---------------------------------------------------------------------------
// Input conversion
// ---------------------------------------------------------------------------

const LINE_CODE_TYPE: ColumnType = ColumnType::Varchar(50);
const LINE_CURRENCY_TYPE: ColumnType = ColumnType::Varchar(5);
const QUANTITY_TYPE: ColumnType = ColumnType::Numeric {
    precision: 15,
    scale: 3,
};
const UNIT_PRICE_TYPE: ColumnType = ColumnType::Numeric {
    precision: 15,
    scale: 2,
};

fn convert<S: AsRef<str>, T>(
    raw: Option<S>,
    parse: impl FnOnce(&str) -> StorageResult<T>,
) -> StorageResult<Option<T>> {
    raw.map(|r| parse(r.as_ref())).transpose()
}

fn text_input(raw: &str, ty: ColumnType) -> StorageResult<String> {
    if let ColumnType::Varchar(max_length) = ty {
        if raw.chars().count() > max_length {
            return Err(StorageError::value_too_long(max_length));
        }
    }
    Ok(raw.to_string())
}

/// `YYYY-MM-DD`, optionally followed by a time of day and offset
fn date_input(raw: &str) -> StorageResult<NaiveDate> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(trimmed).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
                .map(|dt| dt.date())
        })
        .ok_or_else(|| StorageError::invalid_input("date", raw))
}

/// Parse, round half away from zero to the column scale, then check precision
fn numeric_input(raw: &str, ty: ColumnType) -> StorageResult<Decimal> {
    let trimmed = raw.trim();
    let value = Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| StorageError::invalid_input("numeric", raw))?;

    let ColumnType::Numeric { precision, scale } = ty else {
        return Ok(value);
    };

    let mut rounded = value.round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(scale);

    let limit = Decimal::from(10_i64.pow(precision - scale));
    if rounded.abs() >= limit {
        return Err(StorageError::numeric_overflow());
    }
    Ok(rounded)
}

/// Write one assignment onto a row, enforcing `NOT NULL` columns
fn assign(row: &mut Invoice, assignment: &InvoiceAssignment) -> StorageResult<()> {
    use InvoiceColumn::*;

    let column = assignment.column;
    if column.is_required() && assignment.value.is_null() {
        return Err(StorageError::not_null(INVOICE_TABLE, column.name()));
    }
    let ty = column.sql_type();

    match (column, &assignment.value) {
        (Status, FieldValue::Status(Some(status))) => row.status = *status,
        (SupplierId, FieldValue::Text(Some(raw))) => row.supplier_id = text_input(raw, ty)?,
        (InvoiceNumber, FieldValue::Text(Some(raw))) => row.invoice_number = text_input(raw, ty)?,
        (InvoiceDate, FieldValue::Text(Some(raw))) => row.invoice_date = date_input(raw)?,
        (Amount, FieldValue::Text(Some(raw))) => row.amount = numeric_input(raw, ty)?,
        (CurrencyCode, FieldValue::Text(Some(raw))) => row.currency_code = text_input(raw, ty)?,
        (SapInvoiceNumber, FieldValue::Text(raw)) => {
            row.sap_invoice_number = convert(raw.as_ref(), |r| text_input(r, ty))?
        }
        (Message, FieldValue::Text(raw)) => {
            row.message = convert(raw.as_ref(), |r| text_input(r, ty))?
        }
        (PoNumber, FieldValue::Text(raw)) => {
            row.po_number = convert(raw.as_ref(), |r| text_input(r, ty))?
        }
        (UpdatedBy, FieldValue::Text(raw)) => {
            row.updated_by = convert(raw.as_ref(), |r| text_input(r, ty))?
        }
        (_, value) => {
            return Err(StorageError::Query {
                message: format!(
                    "column \"{}\" cannot be assigned {:?}",
                    column.name(),
                    value
                ),
            });
        }
    }

    Ok(())
}

/// In-memory invoice service
///
/// Uses RwLock for thread-safe access. Cloning shares the same table.
#[derive(Clone, Default)]
pub struct InMemoryInvoiceService {
    table: Arc<RwLock<Table<Invoice>>>,
}

impl InMemoryInvoiceService {
    /// Create a new, empty in-memory invoice service
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply all assignments to a copy of the row and commit only on success
    fn update_row(
        &self,
        id: i64,
        assignments: &[InvoiceAssignment],
    ) -> StorageResult<Option<Invoice>> {
        let mut table = write(&self.table)?;

        let Some(existing) = table.rows.get(&id) else {
            return Ok(None);
        };

        let mut updated = existing.clone();
        for assignment in assignments {
            assign(&mut updated, assignment)?;
        }
        updated.updated_at = Utc::now().max(existing.updated_at);

        table.rows.insert(id, updated.clone());
        Ok(Some(updated))
    }
}

#[async_trait]
impl InvoiceService for InMemoryInvoiceService {
    async fn list(&self) -> StorageResult<Vec<Invoice>> {
        Ok(read(&self.table)?.rows.values().cloned().collect())
    }

    async fn get(&self, id: i64) -> StorageResult<Option<Invoice>> {
        Ok(read(&self.table)?.rows.get(&id).cloned())
    }

    async fn create(&self, draft: InvoiceDraft) -> StorageResult<Invoice> {
        use InvoiceColumn::*;

        let text = |raw: Option<String>, column: InvoiceColumn| {
            convert(raw, |r| text_input(r, column.sql_type()))
        };

        let supplier_id = text(draft.supplier_id, SupplierId)?;
        let invoice_number = text(draft.invoice_number, InvoiceNumber)?;
        let sap_invoice_number = text(draft.sap_invoice_number, SapInvoiceNumber)?;
        let invoice_date = convert(draft.invoice_date, date_input)?;
        let amount = convert(draft.amount, |r| numeric_input(r, Amount.sql_type()))?;
        let currency_code = text(draft.currency_code, CurrencyCode)?;
        let message = text(draft.message, Message)?;
        let po_number = text(draft.po_number, PoNumber)?;
        let created_by = convert(draft.created_by, |r| text_input(r, CREATED_BY_TYPE))?;

        let supplier_id = required(supplier_id, INVOICE_TABLE, SupplierId.name())?;
        let invoice_number = required(invoice_number, INVOICE_TABLE, InvoiceNumber.name())?;
        let invoice_date = required(invoice_date, INVOICE_TABLE, InvoiceDate.name())?;
        let amount = required(amount, INVOICE_TABLE, Amount.name())?;
        let currency_code = required(currency_code, INVOICE_TABLE, CurrencyCode.name())?;
        let created_by = required(created_by, INVOICE_TABLE, "created_by")?;

        let mut table = write(&self.table)?;

        let now = Utc::now();
        let invoice = Invoice {
            invoice_id: table.next_id(),
            supplier_id,
            invoice_number,
            sap_invoice_number,
            invoice_date,
            amount,
            currency_code,
            status: draft.status,
            message,
            po_number,
            created_by,
            updated_by: None,
            created_at: now,
            updated_at: now,
        };

        table.rows.insert(invoice.invoice_id, invoice.clone());
        Ok(invoice)
    }

    async fn replace(
        &self,
        id: i64,
        assignments: Vec<InvoiceAssignment>,
    ) -> StorageResult<Option<Invoice>> {
        self.update_row(id, &assignments)
    }

    async fn patch(
        &self,
        id: i64,
        assignments: Vec<InvoiceAssignment>,
    ) -> StorageResult<Option<Invoice>> {
        self.update_row(id, &assignments)
    }

    async fn delete(&self, id: i64) -> StorageResult<Option<Invoice>> {
        Ok(write(&self.table)?.rows.remove(&id))
    }

    async fn delete_all(&self) -> StorageResult<u64> {
        let mut table = write(&self.table)?;
        let deleted = table.rows.len() as u64;
        table.rows.clear();
        Ok(deleted)
    }
}

/// In-memory invoice line service
#[derive(Clone, Default)]
pub struct InMemoryInvoiceLineService {
    table: Arc<RwLock<Table<InvoiceLine>>>,
}

impl InMemoryInvoiceLineService {
    /// Create a new, empty in-memory invoice line service
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InvoiceLineService for InMemoryInvoiceLineService {
    async fn list(&self) -> StorageResult<Vec<InvoiceLine>> {
        Ok(read(&self.table)?.rows.values().cloned().collect())
    }

    async fn get(&self, id: i64) -> StorageResult<Option<InvoiceLine>> {
        Ok(read(&self.table)?.rows.get(&id).cloned())
    }

    async fn create(&self, request: CreateInvoiceLineRequest) -> StorageResult<InvoiceLine> {
        let text = |raw: Option<InputText>, ty: ColumnType| convert(raw, |r| text_input(r, ty));

        let invoice_number = text(request.invoice_number, LINE_CODE_TYPE)?;
        let supplier_number = text(request.supplier_number, LINE_CODE_TYPE)?;
        let order_number = text(request.order_number, LINE_CODE_TYPE)?;
        let item_number = text(request.item_number, LINE_CODE_TYPE)?;
        let description = text(request.description, ColumnType::Text)?;
        let quantity = convert(request.quantity, |r| numeric_input(r, QUANTITY_TYPE))?;
        let unit_price = convert(request.unit_price, |r| numeric_input(r, UNIT_PRICE_TYPE))?;
        let currency = text(request.currency, LINE_CURRENCY_TYPE)?;

        let invoice_number = required(invoice_number, INVOICE_LINE_TABLE, "invoice_number")?;
        let supplier_number = required(supplier_number, INVOICE_LINE_TABLE, "supplier_number")?;
        let quantity = required(quantity, INVOICE_LINE_TABLE, "quantity")?;
        let unit_price = required(unit_price, INVOICE_LINE_TABLE, "unit_price")?;
        let line_total = quantity
            .checked_mul(unit_price)
            .ok_or_else(StorageError::numeric_overflow)?;

        let mut table = write(&self.table)?;

        let line = InvoiceLine {
            id: table.next_id(),
            invoice_number,
            supplier_number,
            order_number,
            item_number,
            description,
            quantity,
            unit_price,
            currency,
            line_total,
            created_at: Utc::now(),
        };

        table.rows.insert(line.id, line.clone());
        Ok(line)
    }

    async fn ensure_table(&self) -> StorageResult<()> {
        Ok(())
    }
}
