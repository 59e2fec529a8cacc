use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("{op}: column {column:?} not found")]
    MissingColumn { op: &'static str, column: String },

    #[error("extract: invalid pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("convert: cannot cast column {column:?} to {dtype}: {source}")]
    Cast {
        column: String,
        dtype: &'static str,
        #[source]
        source: polars::prelude::PolarsError,
    },

    #[error("query: invalid expression {expression:?}: {source}")]
    Expression {
        expression: String,
        #[source]
        source: polars::prelude::PolarsError,
    },

    #[error("transform failed: {0}")]
    Frame(#[from] polars::prelude::PolarsError),
}

impl TransformError {
    pub(crate) fn missing(op: &'static str, column: &str) -> Self {
        Self::MissingColumn {
            op,
            column: column.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TransformError>;
