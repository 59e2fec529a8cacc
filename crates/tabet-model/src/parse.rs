//! Validating parser for untyped configuration documents.
//!
//! The entry point is [`parse_schema`], which walks a `serde_json::Value`
//! and either produces a typed [`Schema`] or a [`ValidationError`] listing
//! every offending field with its path. Validation is purely structural:
//! no I/O happens here, and a document that validates is guaranteed to
//! dispatch cleanly in the reader and the transform engine.
//!
//! Unrecognized fields are rejected, uniformly across all variants.

use serde_json::{Map, Value};

use crate::error::{ValidationError, Violation};
use crate::schema::{
    Axis, ColumnSelector, CsvRead, Dtype, FillValue, How, PatternSelector, ReadSpec, Schema,
    SheetSelector, SpreadsheetRead, TransformSpec,
};

#[derive(Default)]
struct Collector {
    violations: Vec<Violation>,
}

impl Collector {
    fn push(&mut self, path: impl Into<String>, reason: impl Into<String>) {
        self.violations.push(Violation::new(path, reason));
    }
}

/// Validate a configuration document into a [`Schema`].
///
/// # Errors
///
/// Returns a [`ValidationError`] enumerating every violation found.
pub fn parse_schema(doc: &Value) -> Result<Schema, ValidationError> {
    let mut collector = Collector::default();

    let schema = (|| {
        let Some(root) = doc.as_object() else {
            collector.push("$", "expected an object");
            return None;
        };
        reject_unknown_fields(root, "$", &["read", "transforms"], &mut collector);

        let read = match root.get("read") {
            Some(value) => parse_read(value, "$.read", &mut collector),
            None => {
                collector.push("$.read", "missing required field");
                None
            }
        };

        let transforms = match root.get("transforms") {
            None => Some(Vec::new()),
            Some(Value::Array(items)) => {
                let mut transforms = Vec::with_capacity(items.len());
                let mut complete = true;
                for (index, item) in items.iter().enumerate() {
                    match parse_transform(item, &format!("$.transforms[{index}]"), &mut collector) {
                        Some(transform) => transforms.push(transform),
                        None => complete = false,
                    }
                }
                complete.then_some(transforms)
            }
            Some(_) => {
                collector.push("$.transforms", "expected an array of transform objects");
                None
            }
        };

        Some(Schema {
            read: read?,
            transforms: transforms?,
        })
    })();

    match schema {
        Some(schema) if collector.violations.is_empty() => Ok(schema),
        _ => Err(ValidationError::new(collector.violations)),
    }
}

fn reject_unknown_fields(
    object: &Map<String, Value>,
    path: &str,
    allowed: &[&str],
    collector: &mut Collector,
) {
    for key in object.keys() {
        if !allowed.contains(&key.as_str()) {
            collector.push(format!("{path}.{key}"), "unrecognized field");
        }
    }
}

fn parse_read(value: &Value, path: &str, collector: &mut Collector) -> Option<ReadSpec> {
    let Some(object) = value.as_object() else {
        collector.push(path, "expected an object");
        return None;
    };
    let tag = match object.get("type") {
        Some(Value::String(tag)) => tag.as_str(),
        Some(_) => {
            collector.push(format!("{path}.type"), "expected a string");
            return None;
        }
        None => {
            collector.push(format!("{path}.type"), "missing required field");
            return None;
        }
    };
    match tag {
        "csv" => parse_csv_read(object, path, collector).map(ReadSpec::Csv),
        "spreadsheet" => parse_spreadsheet_read(object, path, collector).map(ReadSpec::Spreadsheet),
        other => {
            collector.push(
                format!("{path}.type"),
                format!("unknown read type {other:?}; expected \"csv\" or \"spreadsheet\""),
            );
            None
        }
    }
}

fn parse_csv_read(
    object: &Map<String, Value>,
    path: &str,
    collector: &mut Collector,
) -> Option<CsvRead> {
    reject_unknown_fields(
        object,
        path,
        &["type", "columns", "filename_column", "separator"],
        collector,
    );
    let columns = parse_column_selector(object.get("columns"), path, collector);
    let filename_column = optional_string(object, "filename_column", path, collector);
    let separator = match object.get("separator") {
        None | Some(Value::Null) => Some(crate::schema::default_separator()),
        Some(Value::String(sep)) if sep.len() == 1 && sep.is_ascii() => {
            sep.chars().next()
        }
        Some(_) => {
            collector.push(
                format!("{path}.separator"),
                "expected a single ASCII character",
            );
            None
        }
    };
    Some(CsvRead {
        columns: columns?,
        filename_column: filename_column?,
        separator: separator?,
    })
}

fn parse_spreadsheet_read(
    object: &Map<String, Value>,
    path: &str,
    collector: &mut Collector,
) -> Option<SpreadsheetRead> {
    reject_unknown_fields(
        object,
        path,
        &[
            "type",
            "columns",
            "filename_column",
            "sheets",
            "sheetname_column",
        ],
        collector,
    );
    let columns = parse_column_selector(object.get("columns"), path, collector);
    let filename_column = optional_string(object, "filename_column", path, collector);
    let sheetname_column = optional_string(object, "sheetname_column", path, collector);
    let sheets = parse_sheet_selector(object.get("sheets"), path, collector);
    Some(SpreadsheetRead {
        columns: columns?,
        filename_column: filename_column?,
        sheets: sheets?,
        sheetname_column: sheetname_column?,
    })
}

/// `Some(None)` means "no selector, keep everything"; outer `None` means a
/// violation was recorded.
fn parse_column_selector(
    value: Option<&Value>,
    path: &str,
    collector: &mut Collector,
) -> Option<Option<ColumnSelector>> {
    let field = format!("{path}.columns");
    match value {
        None | Some(Value::Null) => Some(None),
        Some(Value::Array(_)) => {
            let names = string_list(value?, &field, collector)?;
            Some(Some(ColumnSelector::Names(names)))
        }
        Some(Value::String(pattern)) => {
            compile_pattern(pattern, &field, collector).map(|p| Some(ColumnSelector::Pattern(p)))
        }
        Some(Value::Object(object)) => pattern_object(object, &field, collector)
            .map(|p| Some(ColumnSelector::Pattern(p))),
        Some(_) => {
            collector.push(field, "expected a list of names, a pattern string, or null");
            None
        }
    }
}

fn parse_sheet_selector(
    value: Option<&Value>,
    path: &str,
    collector: &mut Collector,
) -> Option<SheetSelector> {
    let field = format!("{path}.sheets");
    match value {
        // Absent keeps the configuration model's default: the first sheet.
        None => Some(SheetSelector::default()),
        // An explicit null selects every sheet.
        Some(Value::Null) => Some(SheetSelector::All),
        Some(Value::Number(number)) => match number.as_i64() {
            Some(index) => Some(SheetSelector::Index(index)),
            None => {
                collector.push(field, "expected an integer sheet index");
                None
            }
        },
        Some(Value::String(name)) => Some(SheetSelector::Name(name.clone())),
        Some(Value::Array(_)) => {
            let names = string_list(value?, &field, collector)?;
            Some(SheetSelector::Names(names))
        }
        Some(Value::Object(object)) => {
            pattern_object(object, &field, collector).map(SheetSelector::Pattern)
        }
        Some(_) => {
            collector.push(
                field,
                "expected null, an integer, a name, a list of names, or a pattern object",
            );
            None
        }
    }
}

fn pattern_object(
    object: &Map<String, Value>,
    path: &str,
    collector: &mut Collector,
) -> Option<PatternSelector> {
    reject_unknown_fields(object, path, &["pattern"], collector);
    match object.get("pattern") {
        Some(Value::String(pattern)) => compile_pattern(pattern, path, collector),
        Some(_) => {
            collector.push(format!("{path}.pattern"), "expected a string");
            None
        }
        None => {
            collector.push(format!("{path}.pattern"), "missing required field");
            None
        }
    }
}

fn compile_pattern(pattern: &str, path: &str, collector: &mut Collector) -> Option<PatternSelector> {
    match PatternSelector::new(pattern) {
        Ok(selector) => Some(selector),
        Err(error) => {
            collector.push(path, format!("invalid pattern: {error}"));
            None
        }
    }
}

fn parse_transform(value: &Value, path: &str, collector: &mut Collector) -> Option<TransformSpec> {
    let Some(object) = value.as_object() else {
        collector.push(path, "expected an object");
        return None;
    };
    let op = match object.get("op") {
        Some(Value::String(op)) => op.as_str(),
        Some(_) => {
            collector.push(format!("{path}.op"), "expected a string");
            return None;
        }
        None => {
            collector.push(format!("{path}.op"), "missing required field");
            return None;
        }
    };
    match op {
        "extract" => parse_extract(object, path, collector),
        "rename" => parse_rename(object, path, collector),
        "convert" => parse_convert(object, path, collector),
        "drop_na" => parse_drop_na(object, path, collector),
        "fill_na" => parse_fill_na(object, path, collector),
        "query" => parse_query(object, path, collector),
        "reindex" => parse_reindex(object, path, collector),
        "sort" => parse_sort(object, path, collector),
        "concat" => parse_concat(object, path, collector),
        "normalize_whitespaces" => parse_normalize_whitespaces(object, path, collector),
        other => {
            collector.push(format!("{path}.op"), format!("unknown operation {other:?}"));
            None
        }
    }
}

fn parse_extract(
    object: &Map<String, Value>,
    path: &str,
    collector: &mut Collector,
) -> Option<TransformSpec> {
    reject_unknown_fields(
        object,
        path,
        &["op", "pattern", "source", "destination"],
        collector,
    );
    let mut pattern = required_string(object, "pattern", path, collector);
    if let Some(checked) = &pattern {
        if let Err(error) = regex::Regex::new(checked) {
            collector.push(format!("{path}.pattern"), format!("invalid pattern: {error}"));
            pattern = None;
        }
    }
    let source = required_string(object, "source", path, collector);
    let destination = required_string(object, "destination", path, collector);
    Some(TransformSpec::Extract {
        pattern: pattern?,
        source: source?,
        destination: destination?,
    })
}

fn parse_rename(
    object: &Map<String, Value>,
    path: &str,
    collector: &mut Collector,
) -> Option<TransformSpec> {
    reject_unknown_fields(object, path, &["op", "mapping"], collector);
    let mapping = match object.get("mapping") {
        Some(Value::Object(entries)) => {
            let mut mapping = std::collections::BTreeMap::new();
            let mut complete = true;
            for (old, new) in entries {
                match new {
                    Value::String(new) => {
                        mapping.insert(old.clone(), new.clone());
                    }
                    _ => {
                        collector.push(format!("{path}.mapping.{old}"), "expected a string");
                        complete = false;
                    }
                }
            }
            complete.then_some(mapping)
        }
        Some(_) => {
            collector.push(format!("{path}.mapping"), "expected an object of old-to-new names");
            None
        }
        None => {
            collector.push(format!("{path}.mapping"), "missing required field");
            None
        }
    };
    Some(TransformSpec::Rename { mapping: mapping? })
}

fn parse_convert(
    object: &Map<String, Value>,
    path: &str,
    collector: &mut Collector,
) -> Option<TransformSpec> {
    reject_unknown_fields(
        object,
        path,
        &["op", "dtype", "source", "destination"],
        collector,
    );
    let dtype = match required_string(object, "dtype", path, collector) {
        Some(name) => match Dtype::parse(&name) {
            Some(dtype) => Some(dtype),
            None => {
                collector.push(
                    format!("{path}.dtype"),
                    format!("unsupported dtype {name:?}; expected str, int, float, or bool"),
                );
                None
            }
        },
        None => None,
    };
    let source = required_string(object, "source", path, collector);
    let destination = optional_string(object, "destination", path, collector);
    Some(TransformSpec::Convert {
        dtype: dtype?,
        source: source?,
        destination: destination?,
    })
}

fn parse_drop_na(
    object: &Map<String, Value>,
    path: &str,
    collector: &mut Collector,
) -> Option<TransformSpec> {
    reject_unknown_fields(object, path, &["op", "axis", "how", "columns"], collector);
    let axis = match object.get("axis") {
        None => Some(Axis::default()),
        Some(Value::String(axis)) => match axis.as_str() {
            "rows" => Some(Axis::Rows),
            "columns" => Some(Axis::Columns),
            other => {
                collector.push(
                    format!("{path}.axis"),
                    format!("unknown axis {other:?}; expected \"rows\" or \"columns\""),
                );
                None
            }
        },
        Some(_) => {
            collector.push(format!("{path}.axis"), "expected a string");
            None
        }
    };
    let how = match object.get("how") {
        None => Some(How::default()),
        Some(Value::String(how)) => match how.as_str() {
            "any" => Some(How::Any),
            "all" => Some(How::All),
            other => {
                collector.push(
                    format!("{path}.how"),
                    format!("unknown policy {other:?}; expected \"any\" or \"all\""),
                );
                None
            }
        },
        Some(_) => {
            collector.push(format!("{path}.how"), "expected a string");
            None
        }
    };
    let columns = optional_string_list(object, "columns", path, collector);
    Some(TransformSpec::DropNa {
        axis: axis?,
        how: how?,
        columns: columns?,
    })
}

fn parse_fill_na(
    object: &Map<String, Value>,
    path: &str,
    collector: &mut Collector,
) -> Option<TransformSpec> {
    reject_unknown_fields(object, path, &["op", "columns", "value"], collector);
    let columns = optional_string_list(object, "columns", path, collector);
    let value = match object.get("value") {
        None | Some(Value::Null) => Some(FillValue::default()),
        Some(Value::String(text)) => Some(FillValue::Text(text.clone())),
        Some(Value::Number(number)) => Some(match number.as_i64() {
            Some(int) => FillValue::Int(int),
            None => FillValue::Float(number.as_f64().unwrap_or(f64::NAN)),
        }),
        Some(Value::Bool(flag)) => Some(FillValue::Bool(*flag)),
        Some(_) => {
            collector.push(format!("{path}.value"), "expected a scalar value");
            None
        }
    };
    Some(TransformSpec::FillNa {
        columns: columns?,
        value: value?,
    })
}

fn parse_query(
    object: &Map<String, Value>,
    path: &str,
    collector: &mut Collector,
) -> Option<TransformSpec> {
    reject_unknown_fields(object, path, &["op", "expression"], collector);
    let expression = required_string(object, "expression", path, collector);
    Some(TransformSpec::Query {
        expression: expression?,
    })
}

fn parse_reindex(
    object: &Map<String, Value>,
    path: &str,
    collector: &mut Collector,
) -> Option<TransformSpec> {
    reject_unknown_fields(object, path, &["op", "columns"], collector);
    let columns = required_string_list(object, "columns", path, collector);
    Some(TransformSpec::Reindex { columns: columns? })
}

fn parse_sort(
    object: &Map<String, Value>,
    path: &str,
    collector: &mut Collector,
) -> Option<TransformSpec> {
    reject_unknown_fields(object, path, &["op", "by", "ascending", "natsort"], collector);
    let by = match object.get("by") {
        Some(Value::String(column)) => Some(vec![column.clone()]),
        Some(Value::Array(_)) => {
            let field = format!("{path}.by");
            match string_list(object.get("by")?, &field, collector) {
                Some(columns) if columns.is_empty() => {
                    collector.push(field, "expected at least one column");
                    None
                }
                other => other,
            }
        }
        Some(_) => {
            collector.push(format!("{path}.by"), "expected a column name or a list of names");
            None
        }
        None => {
            collector.push(format!("{path}.by"), "missing required field");
            None
        }
    };
    let ascending = optional_bool(object, "ascending", path, collector, true);
    let natsort = optional_bool(object, "natsort", path, collector, false);
    Some(TransformSpec::Sort {
        by: by?,
        ascending: ascending?,
        natsort: natsort?,
    })
}

fn parse_concat(
    object: &Map<String, Value>,
    path: &str,
    collector: &mut Collector,
) -> Option<TransformSpec> {
    reject_unknown_fields(
        object,
        path,
        &["op", "columns", "destination", "sep"],
        collector,
    );
    let columns = required_string_list(object, "columns", path, collector);
    let destination = required_string(object, "destination", path, collector);
    let sep = match object.get("sep") {
        None => Some(" ".to_string()),
        Some(Value::String(sep)) => Some(sep.clone()),
        Some(_) => {
            collector.push(format!("{path}.sep"), "expected a string");
            None
        }
    };
    Some(TransformSpec::Concat {
        columns: columns?,
        destination: destination?,
        sep: sep?,
    })
}

fn parse_normalize_whitespaces(
    object: &Map<String, Value>,
    path: &str,
    collector: &mut Collector,
) -> Option<TransformSpec> {
    reject_unknown_fields(object, path, &["op", "columns"], collector);
    let columns = optional_string_list(object, "columns", path, collector);
    Some(TransformSpec::NormalizeWhitespaces { columns: columns? })
}

fn required_string(
    object: &Map<String, Value>,
    key: &str,
    path: &str,
    collector: &mut Collector,
) -> Option<String> {
    match object.get(key) {
        Some(Value::String(value)) => Some(value.clone()),
        Some(_) => {
            collector.push(format!("{path}.{key}"), "expected a string");
            None
        }
        None => {
            collector.push(format!("{path}.{key}"), "missing required field");
            None
        }
    }
}

/// `Some(None)` means the optional field is absent; outer `None` means a
/// violation was recorded.
fn optional_string(
    object: &Map<String, Value>,
    key: &str,
    path: &str,
    collector: &mut Collector,
) -> Option<Option<String>> {
    match object.get(key) {
        None | Some(Value::Null) => Some(None),
        Some(Value::String(value)) => Some(Some(value.clone())),
        Some(_) => {
            collector.push(format!("{path}.{key}"), "expected a string");
            None
        }
    }
}

fn required_string_list(
    object: &Map<String, Value>,
    key: &str,
    path: &str,
    collector: &mut Collector,
) -> Option<Vec<String>> {
    match object.get(key) {
        Some(value @ Value::Array(_)) => string_list(value, &format!("{path}.{key}"), collector),
        Some(_) => {
            collector.push(format!("{path}.{key}"), "expected a list of strings");
            None
        }
        None => {
            collector.push(format!("{path}.{key}"), "missing required field");
            None
        }
    }
}

fn optional_string_list(
    object: &Map<String, Value>,
    key: &str,
    path: &str,
    collector: &mut Collector,
) -> Option<Option<Vec<String>>> {
    match object.get(key) {
        None | Some(Value::Null) => Some(None),
        Some(value @ Value::Array(_)) => {
            string_list(value, &format!("{path}.{key}"), collector).map(Some)
        }
        Some(_) => {
            collector.push(format!("{path}.{key}"), "expected a list of strings");
            None
        }
    }
}

fn string_list(value: &Value, path: &str, collector: &mut Collector) -> Option<Vec<String>> {
    let items = value.as_array()?;
    let mut names = Vec::with_capacity(items.len());
    let mut complete = true;
    for (index, item) in items.iter().enumerate() {
        match item {
            Value::String(name) => names.push(name.clone()),
            _ => {
                collector.push(format!("{path}[{index}]"), "expected a string");
                complete = false;
            }
        }
    }
    complete.then_some(names)
}

fn optional_bool(
    object: &Map<String, Value>,
    key: &str,
    path: &str,
    collector: &mut Collector,
    default: bool,
) -> Option<bool> {
    match object.get(key) {
        None => Some(default),
        Some(Value::Bool(flag)) => Some(*flag),
        Some(_) => {
            collector.push(format!("{path}.{key}"), "expected a boolean");
            None
        }
    }
}
