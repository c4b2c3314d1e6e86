//! HTTP middleware: CORS configuration and security headers.

pub mod cors;
pub mod security;

pub use cors::{cors_layer_from_env, cors_layer_from_origins};
pub use security::security_headers;
