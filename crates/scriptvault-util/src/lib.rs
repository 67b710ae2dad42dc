//! Shared utilities for scriptvault.
//!
//! This crate provides common utilities used across the scriptvault workspace:
//! - Logging setup with tracing
//! - Platform paths for configuration and data
//! - RAII-based timing for request measurement

pub mod log;
pub mod path;
pub mod timing;

pub use log::{LogConfig, LogLevel};
pub use timing::TimingGuard;
