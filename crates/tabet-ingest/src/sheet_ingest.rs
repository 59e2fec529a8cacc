//! Spreadsheet ingestion.
//!
//! A workbook's sheets are enumerated in file order, filtered by the
//! configured selector, read one by one, and concatenated row-wise into a
//! single frame. As with CSV, every cell is materialized as text and empty
//! cells are nulls.

use std::path::Path;

use calamine::{Data, Reader as _, open_workbook_auto};
use polars::prelude::{Column, DataFrame, DataType, Series};
use tracing::debug;

use tabet_common::format_numeric;
use tabet_model::{SheetSelector, SpreadsheetRead};

use crate::columns::ColumnFilter;
use crate::error::{ReadError, Result};

pub fn read_spreadsheet(path: &Path, spec: &SpreadsheetRead) -> Result<DataFrame> {
    let workbook_error = |source| ReadError::Workbook {
        path: path.to_path_buf(),
        source,
    };

    let mut workbook = open_workbook_auto(path).map_err(workbook_error)?;
    let sheet_names = workbook.sheet_names().to_owned();
    debug!(path = %path.display(), sheets = ?sheet_names, "enumerated workbook sheets");

    let selected = select_sheets(&sheet_names, &spec.sheets)?;
    if selected.is_empty() {
        return Err(ReadError::EmptySheetSelection {
            path: path.to_path_buf(),
        });
    }

    let filter = ColumnFilter::new(spec.columns.as_ref());
    let mut frames = Vec::with_capacity(selected.len());
    for name in &selected {
        let range = workbook.worksheet_range(name).map_err(workbook_error)?;
        let mut frame = frame_from_range(&range, &filter)?;
        if let Some(tag) = spec.sheetname_column.as_deref() {
            frame.with_column(Column::new(tag.into(), vec![name.as_str(); frame.height()]))?;
        }
        frames.push(frame);
    }
    concat_frames(frames)
}

/// Apply the sheet selector to the workbook's sheet names, preserving file
/// order for the list and pattern forms.
pub(crate) fn select_sheets(names: &[String], selector: &SheetSelector) -> Result<Vec<String>> {
    match selector {
        SheetSelector::All => Ok(names.to_vec()),
        SheetSelector::Index(index) => {
            let count = names.len();
            let resolved = if *index < 0 {
                *index + count as i64
            } else {
                *index
            };
            if resolved < 0 || resolved >= count as i64 {
                return Err(ReadError::SheetIndex {
                    index: *index,
                    count,
                });
            }
            Ok(vec![names[resolved as usize].clone()])
        }
        SheetSelector::Name(name) => {
            if names.contains(name) {
                Ok(vec![name.clone()])
            } else {
                Ok(Vec::new())
            }
        }
        SheetSelector::Names(wanted) => Ok(names
            .iter()
            .filter(|name| wanted.contains(name))
            .cloned()
            .collect()),
        SheetSelector::Pattern(pattern) => Ok(names
            .iter()
            .filter(|name| pattern.matches_start(name))
            .cloned()
            .collect()),
    }
}

/// Build a frame from one sheet's cell range. The first row supplies the
/// headers; the rest are data.
fn frame_from_range(range: &calamine::Range<Data>, filter: &ColumnFilter<'_>) -> Result<DataFrame> {
    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(DataFrame::empty());
    };

    let kept: Vec<(usize, String)> = header_row
        .iter()
        .enumerate()
        .map(|(index, cell)| (index, cell_to_string(cell)))
        .filter(|(_, header)| filter.keep(header))
        .collect();

    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); kept.len()];
    for row in rows {
        for (slot, (index, _)) in kept.iter().enumerate() {
            let value = row.get(*index).map(cell_to_string).unwrap_or_default();
            cells[slot].push((!value.is_empty()).then_some(value));
        }
    }

    let columns: Vec<Column> = kept
        .iter()
        .zip(cells)
        .map(|((_, name), values)| Column::new(name.as_str().into(), values))
        .collect();
    Ok(DataFrame::new(columns)?)
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => text.clone(),
        Data::Int(value) => value.to_string(),
        Data::Float(value) => format_numeric(*value),
        Data::Bool(value) => value.to_string(),
        Data::DateTime(value) => format_numeric(value.as_f64()),
        Data::DateTimeIso(text) | Data::DurationIso(text) => text.clone(),
        Data::Error(error) => error.to_string(),
    }
}

/// Concatenate the selected sheets' frames row-wise, aligning on the union
/// of their columns in first-seen order; columns a sheet lacks are null.
fn concat_frames(frames: Vec<DataFrame>) -> Result<DataFrame> {
    let mut order: Vec<String> = Vec::new();
    for frame in &frames {
        for name in frame.get_column_names_owned() {
            let name = name.to_string();
            if !order.contains(&name) {
                order.push(name);
            }
        }
    }
    if order.is_empty() {
        return Ok(DataFrame::empty());
    }

    let mut out: Option<DataFrame> = None;
    for frame in frames {
        let height = frame.height();
        let mut aligned = Vec::with_capacity(order.len());
        for name in &order {
            match frame.column(name) {
                Ok(column) => aligned.push(column.clone()),
                Err(_) => aligned.push(
                    Series::full_null(name.as_str().into(), height, &DataType::String).into(),
                ),
            }
        }
        let aligned = DataFrame::new(aligned)?;
        out = Some(match out {
            None => aligned,
            Some(mut acc) => {
                acc.vstack_mut(&aligned)?;
                acc
            }
        });
    }
    Ok(out.unwrap_or_else(DataFrame::empty))
}
