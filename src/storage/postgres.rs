//! PostgreSQL storage backend using sqlx.
//!
//! Provides `PostgresInvoiceService` and `PostgresInvoiceLineService` backed
//! by a shared `sqlx::PgPool`. Every operation is a single auto-committed
//! statement; the pool hands each one a connection and takes it back when
//! the statement completes or fails.
//!
//! # Feature flag
//!
//! This module is gated behind the `postgres` feature flag (on by default).
//!
//! # Schema
//!
//! [`ensure_schema`] creates both tables and applies the additive column
//! migrations. It is meant to run once at startup, before serving requests.

use crate::core::error::StorageError;
use crate::core::field::{FieldValue, InputText};
use crate::core::invoice::{
    INVOICE_TABLE, Invoice, InvoiceAssignment, InvoiceColumn, InvoiceDraft, InvoiceStatus,
    STATUS_CONSTRAINT,
};
use crate::core::invoice_line::{CreateInvoiceLineRequest, INVOICE_LINE_TABLE, InvoiceLine};
use crate::core::service::{InvoiceLineService, InvoiceService, StorageResult};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::query_builder::Separated;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Schema management
// ---------------------------------------------------------------------------

fn create_invoice_table_sql() -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            invoice_id BIGSERIAL PRIMARY KEY,
            supplier_id VARCHAR(50) NOT NULL,
            invoice_number VARCHAR(50) NOT NULL,
            sap_invoice_number VARCHAR(50),
            invoice_date DATE NOT NULL,
            amount NUMERIC(15, 2) NOT NULL,
            currency_code VARCHAR(5) NOT NULL,
            status VARCHAR(1) NOT NULL
                CONSTRAINT {constraint} CHECK (status IN ('S', 'P', 'E')),
            message TEXT,
            po_number VARCHAR(50),
            created_by VARCHAR(100) NOT NULL,
            updated_by VARCHAR(100),
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )",
        table = INVOICE_TABLE,
        constraint = STATUS_CONSTRAINT,
    )
}

fn create_invoice_line_table_sql() -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            id BIGSERIAL PRIMARY KEY,
            invoice_number VARCHAR(50) NOT NULL,
            supplier_number VARCHAR(50) NOT NULL,
            order_number VARCHAR(50),
            item_number VARCHAR(50),
            description TEXT,
            quantity NUMERIC(15, 3) NOT NULL,
            unit_price NUMERIC(15, 2) NOT NULL,
            currency VARCHAR(5),
            line_total NUMERIC GENERATED ALWAYS AS (quantity * unit_price) STORED,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )",
        table = INVOICE_LINE_TABLE,
    )
}

/// Widen a `VARCHAR` column to `length`, leaving wider or unbounded ones alone
fn widen_varchar_sql(column: &str, length: usize) -> String {
    format!(
        "DO $$
        BEGIN
            IF EXISTS (
                SELECT 1 FROM information_schema.columns
                WHERE table_schema = current_schema()
                  AND table_name = '{INVOICE_TABLE}'
                  AND column_name = '{column}'
                  AND character_maximum_length < {length}
            ) THEN
                ALTER TABLE {INVOICE_TABLE} ALTER COLUMN {column} TYPE VARCHAR({length});
            END IF;
        END $$"
    )
}

/// Idempotent, widening-only migrations for tables created by earlier deployments
fn invoice_migrations() -> Vec<String> {
    vec![
        format!("ALTER TABLE {INVOICE_TABLE} ADD COLUMN IF NOT EXISTS po_number VARCHAR(50)"),
        format!("ALTER TABLE {INVOICE_TABLE} ADD COLUMN IF NOT EXISTS updated_by VARCHAR(100)"),
        format!(
            "ALTER TABLE {INVOICE_TABLE} ADD COLUMN IF NOT EXISTS updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()"
        ),
        widen_varchar_sql("sap_invoice_number", 50),
        format!("ALTER TABLE {INVOICE_TABLE} ALTER COLUMN message TYPE TEXT"),
    ]
}

/// Apply the required tables and column migrations (idempotent).
///
/// Acquires one connection, runs every statement on it in order and
/// releases it. Safe to call on every startup.
pub async fn ensure_schema(pool: &PgPool) -> StorageResult<()> {
    let mut conn = pool.acquire().await?;
    tracing::info!("Connected to PostgreSQL database");

    tracing::debug!(table = INVOICE_TABLE, "ensuring invoice table");
    sqlx::query(&create_invoice_table_sql())
        .execute(&mut *conn)
        .await?;

    for statement in invoice_migrations() {
        tracing::debug!(%statement, "applying migration");
        sqlx::query(&statement).execute(&mut *conn).await?;
    }

    tracing::debug!(table = INVOICE_LINE_TABLE, "ensuring invoice line table");
    sqlx::query(&create_invoice_line_table_sql())
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// Open a connection pool for the given connection string.
///
/// `ssl_mode` takes libpq names (`disable`, `prefer`, `require`, ...).
/// `require` encrypts without verifying the server certificate.
pub async fn connect(
    database_url: &str,
    max_connections: u32,
    ssl_mode: &str,
) -> StorageResult<PgPool> {
    let ssl_mode = PgSslMode::from_str(ssl_mode)?;
    let options = PgConnectOptions::from_str(database_url)?.ssl_mode(ssl_mode);

    Ok(PgPoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?)
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

const INVOICE_COLUMNS: &str = "invoice_id, supplier_id, invoice_number, sap_invoice_number, \
    invoice_date, amount, currency_code, status, message, po_number, created_by, updated_by, \
    created_at, updated_at";

const INVOICE_LINE_COLUMNS: &str = "id, invoice_number, supplier_number, order_number, \
    item_number, description, quantity, unit_price, currency, line_total, created_at";

/// Raw invoice row; `status` is decoded as text and checked afterwards
#[derive(Debug, sqlx::FromRow)]
struct InvoiceRow {
    invoice_id: i64,
    supplier_id: String,
    invoice_number: String,
    sap_invoice_number: Option<String>,
    invoice_date: NaiveDate,
    amount: Decimal,
    currency_code: String,
    status: String,
    message: Option<String>,
    po_number: Option<String>,
    created_by: String,
    updated_by: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<InvoiceRow> for Invoice {
    type Error = StorageError;

    fn try_from(row: InvoiceRow) -> Result<Self, Self::Error> {
        let status = InvoiceStatus::parse(&row.status).map_err(|_| StorageError::Query {
            message: format!(
                "invoice {} has unexpected status '{}'",
                row.invoice_id, row.status
            ),
        })?;

        Ok(Invoice {
            invoice_id: row.invoice_id,
            supplier_id: row.supplier_id,
            invoice_number: row.invoice_number,
            sap_invoice_number: row.sap_invoice_number,
            invoice_date: row.invoice_date,
            amount: row.amount,
            currency_code: row.currency_code,
            status,
            message: row.message,
            po_number: row.po_number,
            created_by: row.created_by,
            updated_by: row.updated_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct InvoiceLineRow {
    id: i64,
    invoice_number: String,
    supplier_number: String,
    order_number: Option<String>,
    item_number: Option<String>,
    description: Option<String>,
    quantity: Decimal,
    unit_price: Decimal,
    currency: Option<String>,
    line_total: Decimal,
    created_at: DateTime<Utc>,
}

impl From<InvoiceLineRow> for InvoiceLine {
    fn from(row: InvoiceLineRow) -> Self {
        InvoiceLine {
            id: row.id,
            invoice_number: row.invoice_number,
            supplier_number: row.supplier_number,
            order_number: row.order_number,
            item_number: row.item_number,
            description: row.description,
            quantity: row.quantity,
            unit_price: row.unit_price,
            currency: row.currency,
            line_total: row.line_total,
            created_at: row.created_at,
        }
    }
}

/// Bind a value as the next parameter of a `SET` list
///
/// Client text is cast to the column type, so the server parses it.
fn push_value(
    set: &mut Separated<'_, '_, Postgres, &'static str>,
    column: InvoiceColumn,
    value: FieldValue,
) {
    match value {
        FieldValue::Text(v) => set.push_bind_unseparated(v),
        FieldValue::Status(v) => set.push_bind_unseparated(v.map(InvoiceStatus::code)),
    };
    set.push_unseparated(column.sql_type().cast());
}

/// Build `UPDATE ... SET col = $n[::type], ..., updated_at = NOW() WHERE invoice_id = $m RETURNING ...`
///
/// Column names come only from the `InvoiceColumn` whitelist; every value is
/// a bound parameter.
fn build_update(id: i64, assignments: Vec<InvoiceAssignment>) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::new(format!("UPDATE {INVOICE_TABLE} SET "));

    {
        let mut set = builder.separated(", ");
        for assignment in assignments {
            set.push(assignment.column.name());
            set.push_unseparated(" = ");
            push_value(&mut set, assignment.column, assignment.value);
        }
        set.push("updated_at = NOW()");
    }

    builder.push(" WHERE invoice_id = ");
    builder.push_bind(id);
    builder.push(" RETURNING ");
    builder.push(INVOICE_COLUMNS);
    builder
}

// ---------------------------------------------------------------------------
// PostgresInvoiceService
// ---------------------------------------------------------------------------

/// Invoice storage backed by PostgreSQL.
///
/// # Example
///
/// ```rust,ignore
/// let pool = postgres::connect(&url, 10, "prefer").await?;
/// postgres::ensure_schema(&pool).await?;
/// let service = PostgresInvoiceService::new(pool);
/// ```
#[derive(Clone, Debug)]
pub struct PostgresInvoiceService {
    pool: PgPool,
}

impl PostgresInvoiceService {
    /// Create a new `PostgresInvoiceService` with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn update(
        &self,
        id: i64,
        assignments: Vec<InvoiceAssignment>,
    ) -> StorageResult<Option<Invoice>> {
        let row = build_update(id, assignments)
            .build_query_as::<InvoiceRow>()
            .fetch_optional(&self.pool)
            .await?;

        row.map(Invoice::try_from).transpose()
    }
}

#[async_trait]
impl InvoiceService for PostgresInvoiceService {
    async fn list(&self) -> StorageResult<Vec<Invoice>> {
        let sql = format!("SELECT {INVOICE_COLUMNS} FROM {INVOICE_TABLE} ORDER BY invoice_id");
        let rows = sqlx::query_as::<_, InvoiceRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Invoice::try_from).collect()
    }

    async fn get(&self, id: i64) -> StorageResult<Option<Invoice>> {
        let sql =
            format!("SELECT {INVOICE_COLUMNS} FROM {INVOICE_TABLE} WHERE invoice_id = $1");
        let row = sqlx::query_as::<_, InvoiceRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Invoice::try_from).transpose()
    }

    async fn create(&self, draft: InvoiceDraft) -> StorageResult<Invoice> {
        let sql = format!(
            "INSERT INTO {INVOICE_TABLE} \
             (supplier_id, invoice_number, sap_invoice_number, invoice_date, amount, \
              currency_code, status, message, po_number, created_by, created_at, updated_at) \
             VALUES ($1, $2, $3, $4::date, $5::numeric, $6, $7, $8, $9, $10, NOW(), NOW()) \
             RETURNING {INVOICE_COLUMNS}"
        );

        let row = sqlx::query_as::<_, InvoiceRow>(&sql)
            .bind(draft.supplier_id)
            .bind(draft.invoice_number)
            .bind(draft.sap_invoice_number)
            .bind(draft.invoice_date)
            .bind(draft.amount)
            .bind(draft.currency_code)
            .bind(draft.status.code())
            .bind(draft.message)
            .bind(draft.po_number)
            .bind(draft.created_by)
            .fetch_one(&self.pool)
            .await?;

        Invoice::try_from(row)
    }

    async fn replace(
        &self,
        id: i64,
        assignments: Vec<InvoiceAssignment>,
    ) -> StorageResult<Option<Invoice>> {
        self.update(id, assignments).await
    }

    async fn patch(
        &self,
        id: i64,
        assignments: Vec<InvoiceAssignment>,
    ) -> StorageResult<Option<Invoice>> {
        self.update(id, assignments).await
    }

    async fn delete(&self, id: i64) -> StorageResult<Option<Invoice>> {
        let sql = format!(
            "DELETE FROM {INVOICE_TABLE} WHERE invoice_id = $1 RETURNING {INVOICE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, InvoiceRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Invoice::try_from).transpose()
    }

    async fn delete_all(&self) -> StorageResult<u64> {
        let result = sqlx::query(&format!("DELETE FROM {INVOICE_TABLE}"))
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

// ---------------------------------------------------------------------------
// PostgresInvoiceLineService
// ---------------------------------------------------------------------------

/// Invoice line storage backed by PostgreSQL.
#[derive(Clone, Debug)]
pub struct PostgresInvoiceLineService {
    pool: PgPool,
}

impl PostgresInvoiceLineService {
    /// Create a new `PostgresInvoiceLineService` with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

}

#[async_trait]
impl InvoiceLineService for PostgresInvoiceLineService {
    async fn list(&self) -> StorageResult<Vec<InvoiceLine>> {
        let sql = format!("SELECT {INVOICE_LINE_COLUMNS} FROM {INVOICE_LINE_TABLE} ORDER BY id");
        let rows = sqlx::query_as::<_, InvoiceLineRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(InvoiceLine::from).collect())
    }

    async fn get(&self, id: i64) -> StorageResult<Option<InvoiceLine>> {
        let sql = format!("SELECT {INVOICE_LINE_COLUMNS} FROM {INVOICE_LINE_TABLE} WHERE id = $1");
        let row = sqlx::query_as::<_, InvoiceLineRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(InvoiceLine::from))
    }

    async fn create(&self, request: CreateInvoiceLineRequest) -> StorageResult<InvoiceLine> {
        let sql = format!(
            "INSERT INTO {INVOICE_LINE_TABLE} \
             (invoice_number, supplier_number, order_number, item_number, description, \
              quantity, unit_price, currency) \
             VALUES ($1, $2, $3, $4, $5, $6::numeric, $7::numeric, $8) \
             RETURNING {INVOICE_LINE_COLUMNS}"
        );

        let text = |value: Option<InputText>| value.map(String::from);

        let row = sqlx::query_as::<_, InvoiceLineRow>(&sql)
            .bind(text(request.invoice_number))
            .bind(text(request.supplier_number))
            .bind(text(request.order_number))
            .bind(text(request.item_number))
            .bind(text(request.description))
            .bind(text(request.quantity))
            .bind(text(request.unit_price))
            .bind(text(request.currency))
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }

    async fn ensure_table(&self) -> StorageResult<()> {
        sqlx::query(&create_invoice_line_table_sql())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
