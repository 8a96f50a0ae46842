//! # dora-core
//!
//! Core crate for the Doraemon quant client, providing:
//!
//! - **Types** (`types`): symbol search filters and pages, jobs, tasks
//! - **Envelope** (`envelope`): `{message, data}` response unwrapping
//! - **Configuration** (`config`): JSON config deserialization
//! - **Error types** (`error`): normalized `ApiError` via thiserror
//! - **Logging** (`logging`): tracing-based structured logging

pub mod config;
pub mod envelope;
pub mod error;
pub mod logging;
pub mod types;

// Re-export types at crate root for convenience.
pub use error::ApiError;
pub use types::*;
