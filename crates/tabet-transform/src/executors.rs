//! Transform executor functions.
//!
//! One function per operation in the configuration model. Each takes the
//! working frame by value and returns the frame reflecting the operation;
//! the pipeline fold in [`crate::pipeline`] threads the frame through.
//!
//! Column-level primitives (casting, filtering, sorting, null handling) are
//! delegated to Polars; regex matching to the `regex` crate; natural
//! ordering to `natord`.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use polars::prelude::*;
use polars::sql::SQLContext;
use regex::Regex;
use tracing::debug;

use tabet_common::any_to_string;
use tabet_model::{Axis, Dtype, FillValue, How};

use crate::error::{Result, TransformError};

/// Match `pattern` against each value of `source`, writing the first capture
/// group (or the whole match when the pattern has no group) to `destination`.
/// Non-matching and null rows become null. Destination may equal source.
pub fn extract(mut df: DataFrame, pattern: &str, source: &str, destination: &str) -> Result<DataFrame> {
    let re = Regex::new(pattern).map_err(|source_error| TransformError::Pattern {
        pattern: pattern.to_string(),
        source: source_error,
    })?;
    let group = if re.captures_len() > 1 { 1 } else { 0 };

    let new_column = {
        let column = df
            .column(source)
            .map_err(|_| TransformError::missing("extract", source))?;
        let ca = column.str()?;
        let mut builder = StringChunkedBuilder::new(destination.into(), ca.len());
        for value in ca.into_iter() {
            match value.and_then(|v| re.captures(v)).and_then(|c| c.get(group)) {
                Some(matched) => builder.append_value(matched.as_str()),
                None => builder.append_null(),
            }
        }
        builder.finish().into_series()
    };
    df.with_column(new_column)?;
    Ok(df)
}

/// Rename columns per the mapping, applied simultaneously; unmentioned
/// columns pass through, and mapping entries for absent columns are ignored.
pub fn rename(df: DataFrame, mapping: &BTreeMap<String, String>) -> Result<DataFrame> {
    let names: Vec<String> = df
        .get_column_names_owned()
        .iter()
        .map(|name| name.to_string())
        .collect();
    let finals: Vec<String> = names
        .iter()
        .map(|name| mapping.get(name).cloned().unwrap_or_else(|| name.clone()))
        .collect();

    // Polars forbids duplicate column names, so when two columns end up
    // with the same name only the later one survives (last write wins).
    let mut keep = vec![true; names.len()];
    let mut last_index: HashMap<&str, usize> = HashMap::new();
    for (index, name) in finals.iter().enumerate() {
        if let Some(previous) = last_index.insert(name.as_str(), index) {
            keep[previous] = false;
        }
    }

    let mut columns = Vec::with_capacity(names.len());
    for (index, name) in names.iter().enumerate() {
        if !keep[index] {
            continue;
        }
        columns.push(df.column(name)?.clone().with_name(finals[index].as_str().into()));
    }
    Ok(DataFrame::new(columns)?)
}

/// Strict-cast `source` to the named dtype, writing to `destination`
/// (defaults to source). A single uncastable value fails the operation.
pub fn convert(df: DataFrame, dtype: Dtype, source: &str, destination: Option<&str>) -> Result<DataFrame> {
    if df.column(source).is_err() {
        return Err(TransformError::missing("convert", source));
    }
    let destination = destination.unwrap_or(source);
    df.lazy()
        .with_column(col(source).strict_cast(polars_dtype(dtype)).alias(destination))
        .collect()
        .map_err(|source_error| TransformError::Cast {
            column: source.to_string(),
            dtype: dtype.name(),
            source: source_error,
        })
}

fn polars_dtype(dtype: Dtype) -> DataType {
    match dtype {
        Dtype::Str => DataType::String,
        Dtype::Int => DataType::Int64,
        Dtype::Float => DataType::Float64,
        Dtype::Bool => DataType::Boolean,
    }
}

/// Remove rows or columns containing nulls per the `how` policy. An
/// optional subset restricts which columns are inspected for missingness.
pub fn drop_na(df: DataFrame, axis: Axis, how: How, columns: Option<&[String]>) -> Result<DataFrame> {
    let inspect: Vec<String> = match columns {
        Some(subset) => subset.to_vec(),
        None => df
            .get_column_names_owned()
            .iter()
            .map(|name| name.to_string())
            .collect(),
    };
    for name in &inspect {
        if df.column(name).is_err() {
            return Err(TransformError::missing("drop_na", name));
        }
    }
    if inspect.is_empty() {
        return Ok(df);
    }

    match axis {
        Axis::Rows => {
            let not_null: Vec<Expr> = inspect
                .iter()
                .map(|name| col(name.as_str()).is_not_null())
                .collect();
            let keep = match how {
                How::Any => all_horizontal(not_null)?,
                How::All => any_horizontal(not_null)?,
            };
            Ok(df.lazy().filter(keep).collect()?)
        }
        Axis::Columns => {
            let height = df.height();
            let mut out = df;
            for name in &inspect {
                let nulls = out.column(name)?.null_count();
                let remove = match how {
                    How::Any => nulls > 0,
                    How::All => height > 0 && nulls == height,
                };
                if remove {
                    debug!(column = %name, "drop_na removed column");
                    out = out.drop(name)?;
                }
            }
            Ok(out)
        }
    }
}

/// Replace nulls with the configured value, in all columns or the subset.
pub fn fill_na(df: DataFrame, columns: Option<&[String]>, value: &FillValue) -> Result<DataFrame> {
    let targets: Vec<String> = match columns {
        Some(subset) => {
            for name in subset {
                if df.column(name).is_err() {
                    return Err(TransformError::missing("fill_na", name));
                }
            }
            subset.to_vec()
        }
        None => df
            .get_column_names_owned()
            .iter()
            .map(|name| name.to_string())
            .collect(),
    };
    if targets.is_empty() {
        return Ok(df);
    }
    let filled: Vec<Expr> = targets
        .iter()
        .map(|name| col(name.as_str()).fill_null(fill_literal(value)))
        .collect();
    Ok(df.lazy().with_columns(filled).collect()?)
}

fn fill_literal(value: &FillValue) -> Expr {
    match value {
        FillValue::Text(text) => lit(text.clone()),
        FillValue::Int(v) => lit(*v),
        FillValue::Float(v) => lit(*v),
        FillValue::Bool(v) => lit(*v),
    }
}

/// Keep rows satisfying the filter expression. The expression language is
/// the table engine's SQL dialect; the frame is addressable as `self`.
pub fn query(df: DataFrame, expression: &str) -> Result<DataFrame> {
    let mut context = SQLContext::new();
    context.register("self", df.lazy());
    context
        .execute(&format!("SELECT * FROM self WHERE {expression}"))
        .and_then(LazyFrame::collect)
        .map_err(|source_error| TransformError::Expression {
            expression: expression.to_string(),
            source: source_error,
        })
}

/// Reorder and select columns to exactly the given list. Unlisted columns
/// are dropped; listed columns absent from the frame become all-null.
pub fn reindex(df: DataFrame, columns: &[String]) -> Result<DataFrame> {
    let height = df.height();
    let mut selected = Vec::with_capacity(columns.len());
    for name in columns {
        match df.column(name) {
            Ok(column) => selected.push(column.clone()),
            Err(_) => selected.push(
                Series::full_null(name.as_str().into(), height, &DataType::String).into(),
            ),
        }
    }
    Ok(DataFrame::new(selected)?)
}

/// Stable sort by one or more columns. Natural ordering compares embedded
/// integers numerically; nulls sort last either way.
pub fn sort(df: DataFrame, by: &[String], ascending: bool, natsort: bool) -> Result<DataFrame> {
    for name in by {
        if df.column(name).is_err() {
            return Err(TransformError::missing("sort", name));
        }
    }

    if !natsort {
        let options = SortMultipleOptions::default()
            .with_order_descending(!ascending)
            .with_nulls_last(true)
            .with_maintain_order(true);
        let by: Vec<PlSmallStr> = by.iter().map(|name| name.as_str().into()).collect();
        return Ok(df.sort(by, options)?);
    }

    // Natural ordering is not a table-engine primitive: build the row
    // permutation with the natord comparator, then take it.
    let mut keys: Vec<Vec<Option<String>>> = Vec::with_capacity(by.len());
    for name in by {
        let column = df.column(name)?;
        let mut values = Vec::with_capacity(df.height());
        for index in 0..df.height() {
            values.push(match column.get(index).unwrap_or(AnyValue::Null) {
                AnyValue::Null => None,
                other => Some(any_to_string(other)),
            });
        }
        keys.push(values);
    }
    let mut order: Vec<IdxSize> = (0..df.height() as IdxSize).collect();
    order.sort_by(|&left, &right| {
        for key in &keys {
            let ordering = match (&key[left as usize], &key[right as usize]) {
                (Some(a), Some(b)) => {
                    let ordering = natord::compare(a, b);
                    if ascending { ordering } else { ordering.reverse() }
                }
                // Nulls sort last regardless of direction.
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
    let order = IdxCa::from_vec("order".into(), order);
    Ok(df.take(&order)?)
}

/// Join the listed columns' values row-wise into `destination` with the
/// separator. Nulls join as empty strings. An empty column list leaves the
/// frame unchanged; a single column is copied verbatim.
pub fn concat(mut df: DataFrame, columns: &[String], destination: &str, sep: &str) -> Result<DataFrame> {
    if columns.is_empty() {
        return Ok(df);
    }
    for name in columns {
        if df.column(name).is_err() {
            return Err(TransformError::missing("concat", name));
        }
    }

    if let [only] = columns {
        let copy = df.column(only)?.clone().with_name(destination.into());
        df.with_column(copy)?;
        return Ok(df);
    }

    let joined: Vec<String> = {
        let sources: Vec<&Column> = columns
            .iter()
            .map(|name| df.column(name))
            .collect::<PolarsResult<_>>()?;
        (0..df.height())
            .map(|index| {
                sources
                    .iter()
                    .map(|column| match column.get(index).unwrap_or(AnyValue::Null) {
                        AnyValue::Null => String::new(),
                        other => any_to_string(other),
                    })
                    .collect::<Vec<_>>()
                    .join(sep)
            })
            .collect()
    };
    df.with_column(Column::new(destination.into(), joined))?;
    Ok(df)
}

/// Null becomes empty, runs of whitespace collapse to one space, and ends
/// are trimmed; all columns or the subset. Idempotent.
pub fn normalize_whitespaces(mut df: DataFrame, columns: Option<&[String]>) -> Result<DataFrame> {
    let targets: Vec<String> = match columns {
        Some(subset) => {
            for name in subset {
                if df.column(name).is_err() {
                    return Err(TransformError::missing("normalize_whitespaces", name));
                }
            }
            subset.to_vec()
        }
        None => df
            .get_column_names_owned()
            .iter()
            .map(|name| name.to_string())
            .collect(),
    };

    for name in &targets {
        let new_column = {
            let column = df.column(name)?;
            let ca = column.str()?;
            let mut builder = StringChunkedBuilder::new(name.as_str().into(), ca.len());
            for value in ca.into_iter() {
                builder.append_value(value.map(collapse_whitespace).unwrap_or_default());
            }
            builder.finish().into_series()
        };
        df.with_column(new_column)?;
    }
    Ok(df)
}

fn collapse_whitespace(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for part in raw.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(part);
    }
    out
}
