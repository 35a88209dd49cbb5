//! Route table for the gateway

use crate::core::Envelope;
use crate::invoice_lines::{
    create_invoice_line, create_invoice_line_table, get_invoice_line, list_invoice_lines,
};
use crate::invoices::{
    create_invoice, delete_all_invoices, delete_invoice, get_invoice, list_invoices,
    patch_invoice, replace_invoice,
};
use crate::server::host::ServerHost;
use axum::{
    Json, Router,
    routing::{get, post},
};
use chrono::Utc;

/// Build every API route bound to the given host
///
/// - GET, POST, DELETE /api/invoices
/// - GET, PUT, PATCH, DELETE /api/invoices/{id}
/// - GET, POST /api/new-invoices
/// - GET /api/new-invoices/{id}
/// - POST /api/create-new-invoice-table
/// - GET /health and /healthz
pub fn build_routes(host: ServerHost) -> Router {
    let api = Router::new()
        .route(
            "/api/invoices",
            get(list_invoices)
                .post(create_invoice)
                .delete(delete_all_invoices),
        )
        .route(
            "/api/invoices/{id}",
            get(get_invoice)
                .put(replace_invoice)
                .patch(patch_invoice)
                .delete(delete_invoice),
        )
        .route(
            "/api/new-invoices",
            get(list_invoice_lines).post(create_invoice_line),
        )
        .route("/api/new-invoices/{id}", get(get_invoice_line))
        .route(
            "/api/create-new-invoice-table",
            post(create_invoice_line_table),
        )
        .with_state(host);

    health_routes().merge(api)
}

fn health_routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
}

/// Liveness check; never touches the datastore
async fn health_check() -> Json<Envelope<()>> {
    Json(
        Envelope::empty()
            .with_message("API is running successfully")
            .with_timestamp(Utc::now()),
    )
}
