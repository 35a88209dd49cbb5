//! HTTP handlers for supplier invoices
//!
//! Each handler performs exactly one storage operation and wraps the result
//! in the standard [`Envelope`].

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::core::{
    CreateInvoiceRequest, Envelope, GatewayError, Invoice, InvoicePatch, JsonBody, RecordId,
    ReplaceInvoiceRequest,
};
use crate::server::host::ServerHost;

const RESOURCE: &str = "Invoice";

type InvoiceResult<T> = Result<Json<Envelope<T>>, GatewayError>;

/// List all invoices
///
/// GET /api/invoices
pub async fn list_invoices(State(host): State<ServerHost>) -> InvoiceResult<Vec<Invoice>> {
    let invoices = host.invoices.list().await?;
    Ok(Json(Envelope::list(invoices)))
}

/// Get one invoice
///
/// GET /api/invoices/{id}
pub async fn get_invoice(
    State(host): State<ServerHost>,
    RecordId(id): RecordId,
) -> InvoiceResult<Invoice> {
    let invoice = host
        .invoices
        .get(id)
        .await?
        .ok_or(GatewayError::NotFound { resource: RESOURCE })?;

    Ok(Json(Envelope::ok(invoice)))
}

/// Create an invoice
///
/// POST /api/invoices
///
/// Rejects with 400 before touching the datastore when the status is not
/// one of `S`, `P`, `E`.
pub async fn create_invoice(
    State(host): State<ServerHost>,
    JsonBody(request): JsonBody<CreateInvoiceRequest>,
) -> Result<(StatusCode, Json<Envelope<Invoice>>), GatewayError> {
    let draft = request.validate()?;
    let invoice = host.invoices.create(draft).await?;

    tracing::info!(invoice_id = invoice.invoice_id, status = %invoice.status, "invoice created");

    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(invoice).with_message("Invoice created successfully")),
    ))
}

/// Replace every mutable field of an invoice
///
/// PUT /api/invoices/{id}
pub async fn replace_invoice(
    State(host): State<ServerHost>,
    RecordId(id): RecordId,
    JsonBody(request): JsonBody<ReplaceInvoiceRequest>,
) -> InvoiceResult<Invoice> {
    let assignments = request.validate()?;
    let invoice = host
        .invoices
        .replace(id, assignments)
        .await?
        .ok_or(GatewayError::NotFound { resource: RESOURCE })?;

    Ok(Json(
        Envelope::ok(invoice).with_message("Invoice updated successfully"),
    ))
}

/// Update only the fields present in the body
///
/// PATCH /api/invoices/{id}
pub async fn patch_invoice(
    State(host): State<ServerHost>,
    RecordId(id): RecordId,
    JsonBody(patch): JsonBody<InvoicePatch>,
) -> InvoiceResult<Invoice> {
    let assignments = patch.validate()?;
    let columns: Vec<&str> = assignments.iter().map(|a| a.column.name()).collect();
    tracing::debug!(invoice_id = id, ?columns, "patching invoice");

    let invoice = host
        .invoices
        .patch(id, assignments)
        .await?
        .ok_or(GatewayError::NotFound { resource: RESOURCE })?;

    Ok(Json(
        Envelope::ok(invoice).with_message("Invoice updated successfully"),
    ))
}

/// Delete one invoice, returning the removed row
///
/// DELETE /api/invoices/{id}
pub async fn delete_invoice(
    State(host): State<ServerHost>,
    RecordId(id): RecordId,
) -> InvoiceResult<Invoice> {
    let invoice = host
        .invoices
        .delete(id)
        .await?
        .ok_or(GatewayError::NotFound { resource: RESOURCE })?;

    tracing::info!(invoice_id = id, "invoice deleted");

    Ok(Json(
        Envelope::ok(invoice).with_message("Invoice deleted successfully"),
    ))
}

/// Delete every invoice
///
/// DELETE /api/invoices
pub async fn delete_all_invoices(State(host): State<ServerHost>) -> InvoiceResult<()> {
    let deleted = host.invoices.delete_all().await?;

    tracing::warn!(deleted, "all invoices deleted");

    Ok(Json(
        Envelope::empty()
            .with_message("All invoices deleted successfully")
            .with_deleted_count(deleted),
    ))
}
