//! HTTP handlers for invoice lines

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::core::{
    CreateInvoiceLineRequest, Envelope, GatewayError, InvoiceLine, JsonBody, RecordId,
};
use crate::server::host::ServerHost;

const RESOURCE: &str = "Invoice line";

/// GET /api/new-invoices
pub async fn list_invoice_lines(
    State(host): State<ServerHost>,
) -> Result<Json<Envelope<Vec<InvoiceLine>>>, GatewayError> {
    let lines = host.invoice_lines.list().await?;
    Ok(Json(Envelope::list(lines)))
}

/// GET /api/new-invoices/{id}
pub async fn get_invoice_line(
    State(host): State<ServerHost>,
    RecordId(id): RecordId,
) -> Result<Json<Envelope<InvoiceLine>>, GatewayError> {
    let line = host
        .invoice_lines
        .get(id)
        .await?
        .ok_or(GatewayError::NotFound { resource: RESOURCE })?;

    Ok(Json(Envelope::ok(line)))
}

/// Create an invoice line
///
/// POST /api/new-invoices
///
/// The body never carries `line_total`; the stored row reports the value
/// computed from `quantity * unit_price`.
pub async fn create_invoice_line(
    State(host): State<ServerHost>,
    JsonBody(request): JsonBody<CreateInvoiceLineRequest>,
) -> Result<(StatusCode, Json<Envelope<InvoiceLine>>), GatewayError> {
    let line = host.invoice_lines.create(request).await?;

    tracing::info!(
        id = line.id,
        invoice_number = %line.invoice_number,
        "invoice line created"
    );

    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(line).with_message("Invoice line created successfully")),
    ))
}

/// Create the invoice line table if it does not exist yet
///
/// POST /api/create-new-invoice-table
pub async fn create_invoice_line_table(
    State(host): State<ServerHost>,
) -> Result<Json<Envelope<()>>, GatewayError> {
    host.invoice_lines.ensure_table().await?;

    Ok(Json(
        Envelope::empty().with_message("Invoice line table created successfully"),
    ))
}
