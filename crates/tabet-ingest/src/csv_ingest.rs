//! CSV ingestion.
//!
//! Every value is materialized as text; an empty field is a null. There is
//! no type inference here — typed conversion is an explicit transform.

use std::path::Path;

use polars::prelude::{Column, DataFrame};
use tracing::debug;

use tabet_model::CsvRead;

use crate::columns::ColumnFilter;
use crate::error::{ReadError, Result};

pub fn read_csv(path: &Path, spec: &CsvRead) -> Result<DataFrame> {
    let csv_error = |source| ReadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(spec.separator as u8)
        .has_headers(true)
        .from_path(path)
        .map_err(csv_error)?;
    let headers = reader.headers().map_err(csv_error)?.clone();

    let filter = ColumnFilter::new(spec.columns.as_ref());
    let kept: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(_, header)| filter.keep(header))
        .map(|(index, header)| (index, header.to_string()))
        .collect();

    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); kept.len()];
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        for (slot, (index, _)) in kept.iter().enumerate() {
            let value = record.get(*index).unwrap_or("");
            cells[slot].push((!value.is_empty()).then(|| value.to_string()));
        }
    }

    let columns: Vec<Column> = kept
        .iter()
        .zip(cells)
        .map(|((_, name), values)| Column::new(name.as_str().into(), values))
        .collect();
    let frame = DataFrame::new(columns)?;
    debug!(path = %path.display(), rows = frame.height(), "read csv file");
    Ok(frame)
}
