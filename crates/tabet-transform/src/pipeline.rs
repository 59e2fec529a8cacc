//! Transform dispatch and the pipeline fold.

use polars::prelude::DataFrame;
use tracing::debug;

use tabet_model::TransformSpec;

use crate::error::Result;
use crate::executors;

/// Apply one validated transform to a frame.
///
/// Dispatch is a total `match` over the closed spec enum: the validation
/// layer cannot produce an operation tag without an adapter here, so there
/// is no runtime registry lookup to miss.
pub fn apply_transform(frame: DataFrame, spec: &TransformSpec) -> Result<DataFrame> {
    match spec {
        TransformSpec::Extract {
            pattern,
            source,
            destination,
        } => executors::extract(frame, pattern, source, destination),
        TransformSpec::Rename { mapping } => executors::rename(frame, mapping),
        TransformSpec::Convert {
            dtype,
            source,
            destination,
        } => executors::convert(frame, *dtype, source, destination.as_deref()),
        TransformSpec::DropNa { axis, how, columns } => {
            executors::drop_na(frame, *axis, *how, columns.as_deref())
        }
        TransformSpec::FillNa { columns, value } => {
            executors::fill_na(frame, columns.as_deref(), value)
        }
        TransformSpec::Query { expression } => executors::query(frame, expression),
        TransformSpec::Reindex { columns } => executors::reindex(frame, columns),
        TransformSpec::Sort {
            by,
            ascending,
            natsort,
        } => executors::sort(frame, by, *ascending, *natsort),
        TransformSpec::Concat {
            columns,
            destination,
            sep,
        } => executors::concat(frame, columns, destination, sep),
        TransformSpec::NormalizeWhitespaces { columns } => {
            executors::normalize_whitespaces(frame, columns.as_deref())
        }
    }
}

/// Fold an ordered transform sequence over a frame, left to right.
///
/// Each operation sees the cumulative result of all prior ones. There is no
/// rollback: when an operation fails, earlier effects are already applied
/// and the remaining sequence is abandoned.
pub fn apply_transforms(frame: DataFrame, transforms: &[TransformSpec]) -> Result<DataFrame> {
    transforms.iter().try_fold(frame, |acc, spec| {
        debug!(op = spec.op_name(), "applying transform");
        apply_transform(acc, spec)
    })
}
