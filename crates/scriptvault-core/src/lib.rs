//! Core coordination layer for scriptvault.
//!
//! This crate sits between the transports (HTTP server, CLI) and the
//! snapshot store:
//! - Configuration management (multi-source, JSONC support)
//! - Request parameters and their validation into a typed request
//! - The process-wide request gate that serializes every call
//! - Dispatch of validated requests to the snapshot store
//! - Markup rendering of snapshot logs

pub mod config;
pub mod dispatch;
pub mod error;
pub mod gate;
pub mod render;
pub mod request;

pub use config::Config;
pub use dispatch::{Dispatcher, Response};
pub use error::{ConfigError, ErrorKind, VaultError, VaultResult};
pub use gate::{RequestGate, DEFAULT_LOCK_TIMEOUT};
pub use request::{Operation, OutputFormat, RequestConfig, RequestParams};
