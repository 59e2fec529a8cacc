//! Pipeline orchestration.

use std::path::Path;

use polars::prelude::DataFrame;
use tracing::debug;

use tabet_ingest::read_file;
use tabet_model::Schema;
use tabet_transform::apply_transforms;

use crate::error::Result;

/// Read a file per the schema's read spec, then fold its transform sequence
/// over the resulting frame.
///
/// The schema is read-only and may be shared across any number of
/// concurrent callers; each call works on its own frame. File handles are
/// released before the transform stage begins.
///
/// # Errors
///
/// Propagates [`tabet_ingest::ReadError`] before any transform has run, or
/// [`tabet_transform::TransformError`] from the first failing operation;
/// transforms already applied are not undone.
pub fn process_file(path: &Path, schema: &Schema) -> Result<DataFrame> {
    let frame = read_file(path, &schema.read)?;
    debug!(
        rows = frame.height(),
        columns = frame.width(),
        transforms = schema.transforms.len(),
        "loaded source table"
    );
    Ok(apply_transforms(frame, &schema.transforms)?)
}
