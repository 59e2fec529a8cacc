//! Pipeline configuration model.
//!
//! This crate defines the typed configuration for a tabular pipeline:
//!
//! - **schema**: the [`Schema`] aggregate (one read spec, ordered transforms)
//!   and the discriminated unions it is built from
//! - **parse**: the validating parser from untyped JSON documents, which
//!   accumulates every violation instead of stopping at the first
//! - **error**: [`ValidationError`] and its per-field [`Violation`]s

pub mod error;
pub mod parse;
pub mod schema;

pub use error::{ValidationError, Violation};
pub use parse::parse_schema;
pub use schema::{
    Axis, ColumnSelector, CsvRead, Dtype, FillValue, How, PatternSelector, ReadSpec, Schema,
    SheetSelector, SpreadsheetRead, TransformSpec,
};
