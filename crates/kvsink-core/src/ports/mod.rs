//! Ports: the seams where external collaborators plug in.
//!
//! Implementations are selected at process startup via configuration
//! (durable store vs. in-memory), never via inheritance-style layering.

pub mod cache;
pub mod repository;
pub mod verify;

pub use cache::CachePurger;
pub use repository::{RepositoryError, TaskRepository, kv_key};
pub use verify::WriteVerifier;
