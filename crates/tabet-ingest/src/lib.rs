//! File ingestion for the tabet pipeline.
//!
//! Turns a path plus a validated [`tabet_model::ReadSpec`] into a Polars
//! `DataFrame`: CSV via the `csv` crate, workbooks via `calamine`. All
//! values are read as text; empty cells become nulls.

mod columns;
pub mod csv_ingest;
pub mod error;
mod read;
pub mod sheet_ingest;

pub use csv_ingest::read_csv;
pub use error::ReadError;
pub use read::read_file;
pub use sheet_ingest::read_spreadsheet;
