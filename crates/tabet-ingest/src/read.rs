//! Read dispatch and post-processing shared by both file kinds.

use std::path::Path;

use polars::prelude::{Column, DataFrame};
use tracing::debug;

use tabet_model::ReadSpec;

use crate::csv_ingest::read_csv;
use crate::error::Result;
use crate::sheet_ingest::read_spreadsheet;

/// Produce a frame from a file path and a validated read spec.
///
/// File handles live only for the duration of this call. On any failure no
/// partial frame is returned.
pub fn read_file(path: &Path, spec: &ReadSpec) -> Result<DataFrame> {
    let mut frame = match spec {
        ReadSpec::Csv(csv) => read_csv(path, csv)?,
        ReadSpec::Spreadsheet(spreadsheet) => read_spreadsheet(path, spreadsheet)?,
    };

    if let Some(column) = spec.filename_column() {
        let base = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        frame.with_column(Column::new(column.into(), vec![base.as_str(); frame.height()]))?;
    }

    debug!(
        path = %path.display(),
        rows = frame.height(),
        columns = frame.width(),
        "read source file"
    );
    Ok(frame)
}
