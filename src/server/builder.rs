//! ServerBuilder for fluent API to build the gateway's HTTP server

use super::cors::{CorsSettings, build_cors_layer};
use super::host::ServerHost;
use super::router::build_routes;
use crate::core::{InvoiceLineService, InvoiceService};
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Builder for the gateway router
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_invoice_service(InMemoryInvoiceService::new())
///     .with_invoice_line_service(InMemoryInvoiceLineService::new())
///     .with_cors(CorsSettings::new(origins))
///     .build()?;
/// ```
pub struct ServerBuilder {
    invoice_service: Option<Arc<dyn InvoiceService>>,
    invoice_line_service: Option<Arc<dyn InvoiceLineService>>,
    cors: CorsSettings,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new() -> Self {
        Self {
            invoice_service: None,
            invoice_line_service: None,
            cors: CorsSettings::default(),
            custom_routes: Vec::new(),
        }
    }

    /// Set the invoice storage (required)
    pub fn with_invoice_service(mut self, service: impl InvoiceService + 'static) -> Self {
        self.invoice_service = Some(Arc::new(service));
        self
    }

    /// Set the invoice line storage (required)
    pub fn with_invoice_line_service(
        mut self,
        service: impl InvoiceLineService + 'static,
    ) -> Self {
        self.invoice_line_service = Some(Arc::new(service));
        self
    }

    /// Set the cross-origin policy
    pub fn with_cors(mut self, cors: CorsSettings) -> Self {
        self.cors = cors;
        self
    }

    /// Add routes outside the invoice API
    ///
    /// Custom routes share the CORS and tracing layers.
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Build the handler state
    pub fn build_host(&mut self) -> Result<ServerHost> {
        let invoices = self.invoice_service.take().ok_or_else(|| {
            anyhow::anyhow!("InvoiceService is required. Call .with_invoice_service()")
        })?;
        let invoice_lines = self.invoice_line_service.take().ok_or_else(|| {
            anyhow::anyhow!("InvoiceLineService is required. Call .with_invoice_line_service()")
        })?;

        Ok(ServerHost::new(invoices, invoice_lines))
    }

    /// Build the final router with tracing and CORS layers applied
    pub fn build(mut self) -> Result<Router> {
        let host = self.build_host()?;

        let mut app = build_routes(host);
        for custom_router in std::mem::take(&mut self.custom_routes) {
            app = app.merge(custom_router);
        }

        Ok(app
            .layer(build_cors_layer(&self.cors))
            .layer(TraceLayer::new_for_http()))
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to the provided address
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    pub async fn serve(self, addr: &str) -> Result<()> {
        let origins = self.cors.allowed_origins.clone();
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);
        tracing::info!(?origins, "CORS enabled for origins");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
