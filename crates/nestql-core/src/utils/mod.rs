//! Utility helpers shared across nestql crates.

pub mod text;
