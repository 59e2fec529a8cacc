//! Shared utilities for tabet crates.
//!
//! This crate provides common utilities used across the tabet workspace,
//! including Polars `AnyValue` helpers.

pub mod polars;

// Re-export commonly used functions at crate root for convenience
pub use polars::{any_to_f64, any_to_string, format_numeric};
