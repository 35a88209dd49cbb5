//! HTTP server: route table, CORS policy, shared state and the builder

pub mod builder;
pub mod cors;
pub mod host;
pub mod router;

pub use builder::ServerBuilder;
pub use cors::{CorsSettings, build_cors_layer};
pub use host::ServerHost;
pub use router::build_routes;
