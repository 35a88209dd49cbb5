//! Invoice gateway binary
//!
//! Loads configuration, connects to PostgreSQL, ensures the schema exists and
//! serves the REST API until SIGTERM or Ctrl+C.

use anyhow::Result;
use invoice_gateway::config::GatewayConfig;
use invoice_gateway::server::ServerBuilder;
use invoice_gateway::storage::postgres;
use invoice_gateway::storage::{PostgresInvoiceLineService, PostgresInvoiceService};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,invoice_gateway=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = GatewayConfig::load()?;

    let pool = postgres::connect(
        config.database_url()?,
        config.database_max_connections,
        &config.database_ssl_mode,
    )
    .await
    .inspect_err(|e| tracing::error!(error = %e, "Error connecting to PostgreSQL"))?;

    postgres::ensure_schema(&pool)
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Error initializing database schema"))?;
    tracing::info!("Database schema is ready");

    let serve_result = ServerBuilder::new()
        .with_invoice_service(PostgresInvoiceService::new(pool.clone()))
        .with_invoice_line_service(PostgresInvoiceLineService::new(pool.clone()))
        .with_cors(config.cors_settings())
        .serve(&config.bind_address())
        .await;

    pool.close().await;
    tracing::info!("Database pool closed");

    serve_result
}
