//! HTTP server for scriptvault.
//!
//! Exposes the dispatcher over a single query-parameter endpoint that
//! scripts and the markup view's buttons both call.

pub mod routes;
pub mod state;

pub use routes::{create_router, serve};
pub use state::AppState;
