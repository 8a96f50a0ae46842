//! # dora-store
//!
//! Client-side state for the Doraemon quant backend.
//!
//! - [`QuantStore`]: symbol search with pagination, job start/poll/delete
//!   and the recent-jobs list
//! - [`TaskStore`]: the to-do list
//!
//! State lives in a `tokio::sync::watch` channel: callers read a snapshot
//! at any time or subscribe to every committed mutation. Each aggregate owns
//! a [`LoadState`]; actions never lock across an await, so any number of
//! actions may be in flight on a shared store.
//!
//! ## Error isolation
//!
//! | Operation                 | On failure                              |
//! |---------------------------|-----------------------------------------|
//! | `refresh`                 | `symbols_status.error` set, data kept   |
//! | `import_symbols`          | returns `None`, `symbols_status.error`  |
//! | `fetch_jobs`              | `jobs_status.error` set, list kept      |
//! | `fetch_job`               | `Err` returned to the caller            |
//! | `start_*` / `create_job`  | `Err` returned to the caller            |
//! | `delete_job`              | `Err` returned to the caller            |

pub mod quant;
pub mod status;
pub mod tasks;

#[cfg(test)]
mod testing;

pub use quant::{QuantState, QuantStore};
pub use status::LoadState;
pub use tasks::{TaskState, TaskStore};
