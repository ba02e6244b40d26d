//! Concrete adapters behind the ports: an in-memory store for tests
//! and local runs, and HTTP clients for the real kv-service and web
//! app.

pub mod http_purge;
pub mod http_verify;
pub mod memory;
pub mod signing;

pub use http_purge::HttpCachePurger;
pub use http_verify::HttpWriteVerifier;
pub use memory::{InMemoryTaskRepository, InMemoryVerifier};

/// Header carrying the correlation id end to end across services.
pub const CORRELATION_ID_HEADER: &str = "X-Correlation-Id";
