//! Cross-origin policy
//!
//! Only origins on an explicit allow-list receive CORS headers; credentials are
//! allowed so browser frontends can send cookies or bearer tokens.

use axum::http::{HeaderName, HeaderValue, Method, header};
use std::time::Duration;
use tower_http::cors::CorsLayer;

/// Methods answered on preflight
pub const ALLOWED_METHODS: [Method; 6] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::OPTIONS,
];

/// Request headers browsers may send
pub const ALLOWED_HEADERS: [HeaderName; 3] =
    [header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT];

/// CORS settings for the router
#[derive(Debug, Clone, PartialEq)]
pub struct CorsSettings {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
    pub max_age_secs: u64,
}

impl Default for CorsSettings {
    fn default() -> Self {
        Self {
            allowed_origins: Vec::new(),
            allow_credentials: true,
            max_age_secs: 3600,
        }
    }
}

impl CorsSettings {
    pub fn new(allowed_origins: Vec<String>) -> Self {
        Self {
            allowed_origins,
            ..Self::default()
        }
    }

    /// Origins that parse as header values; anything else is skipped
    pub fn origin_values(&self) -> Vec<HeaderValue> {
        self.allowed_origins
            .iter()
            .filter_map(|origin| match origin.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(%origin, "ignoring malformed CORS origin");
                    None
                }
            })
            .collect()
    }
}

/// Build the CORS layer from an explicit allow-list
///
/// An empty list allows no cross-origin caller at all; same-origin requests
/// are unaffected.
pub fn build_cors_layer(settings: &CorsSettings) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(settings.origin_values())
        .allow_methods(ALLOWED_METHODS.to_vec())
        .allow_headers(ALLOWED_HEADERS.to_vec())
        .allow_credentials(settings.allow_credentials)
        .max_age(Duration::from_secs(settings.max_age_secs))
}
