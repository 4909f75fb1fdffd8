//! Common types shared across Curie crates.
//!
//! This crate provides the error type every library crate returns and the
//! message and task types agents exchange while a report is produced.

pub mod error;
pub mod message;
pub mod task;

pub use error::{CurieError, Result};
pub use message::{AgentMessage, MessageRole};
pub use task::Task;
