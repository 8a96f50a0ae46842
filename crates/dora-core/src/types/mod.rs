//! Domain types shared by the client adapter, the stores and the runner.
//!
//! Records returned by the backend are deserialized leniently: every field a
//! record may omit carries a serde default, because an absent envelope
//! payload decodes from `{}`.

pub mod job;
pub mod symbol;
pub mod task;

pub use job::*;
pub use symbol::*;
pub use task::*;
