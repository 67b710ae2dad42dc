//! Command handlers for the scriptvault CLI.

pub mod history;
pub mod logging;
pub mod serve;
