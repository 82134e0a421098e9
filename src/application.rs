//! Application layer
//!
//! Read-side use cases over stored media assets and the process-wide
//! service wiring.

pub mod query_service;
pub mod state;

pub use query_service::{MediaQuery, QueryService};
pub use state::{AppState, StorageMode};
