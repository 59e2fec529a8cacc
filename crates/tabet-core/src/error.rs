use thiserror::Error;

use tabet_ingest::ReadError;
use tabet_transform::TransformError;

/// Umbrella error for a full pipeline run.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Transform(#[from] TransformError),
}

pub type Result<T> = std::result::Result<T, ProcessError>;
