//! # nestql-core
//!
//! Core error types, logging helpers, and text utilities for nestql.
//! This crate has no knowledge of schemas or SQL and provides the
//! foundation for the query crate.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result alias
//! - [`logging`] - Tracing-based logging integration
//! - [`utils`] - Text helpers (`underscore`, `pluralize`)

pub mod error;
pub mod logging;
pub mod utils;

// Re-export the most commonly used types at the crate root.
pub use error::{NestqlError, NestqlResult};
