//! Declarative tabular pipeline: configuration in, frame out.
//!
//! The workspace splits the pipeline into one crate per concern; this crate
//! ties them together and is the intended entry point for callers:
//!
//! ```ignore
//! use tabet_core::{Schema, process_file};
//!
//! let schema = Schema::from_json_str(config_text)?;
//! let frame = process_file(path.as_ref(), &schema)?;
//! ```

pub mod error;
pub mod processor;

pub use error::ProcessError;
pub use processor::process_file;

// Re-export the configuration surface so callers need only this crate.
pub use tabet_model::{Schema, ValidationError};
