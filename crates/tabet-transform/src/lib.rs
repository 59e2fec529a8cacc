//! Transform engine for tabet pipelines.
//!
//! This crate provides the column-level operations of the pipeline:
//!
//! - **executors**: one adapter function per operation, each a thin call
//!   into the table engine
//! - **pipeline**: dispatch over the closed spec enum and the left-to-right
//!   fold that runs a transform sequence
//! - **error**: [`TransformError`]

pub mod error;
pub mod executors;
pub mod pipeline;

pub use error::TransformError;
pub use pipeline::{apply_transform, apply_transforms};
