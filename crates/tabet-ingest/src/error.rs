use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("failed to read csv {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to read workbook {path}: {source}")]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("sheet index {index} out of range for workbook with {count} sheet(s)")]
    SheetIndex { index: i64, count: usize },

    #[error("sheet selector matched no sheets in {path}")]
    EmptySheetSelection { path: PathBuf },

    #[error("failed to assemble table: {0}")]
    Frame(#[from] polars::prelude::PolarsError),
}

pub type Result<T> = std::result::Result<T, ReadError>;
