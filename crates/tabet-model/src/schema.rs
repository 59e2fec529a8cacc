//! Typed pipeline configuration.
//!
//! A [`Schema`] is one [`ReadSpec`] (how to load a file into a table) plus an
//! ordered list of [`TransformSpec`]s (which operations to apply, left to
//! right). Instances are produced by the validating parser in
//! [`crate::parse`]; once constructed they are immutable and safe to share
//! across threads.

use std::collections::BTreeMap;

use regex::Regex;
use serde::ser::SerializeStruct as _;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A regex selector with match-at-start semantics.
///
/// Compiled once at validation time; matching tests the pattern against the
/// start of the candidate string, not the full string.
#[derive(Debug, Clone)]
pub struct PatternSelector {
    pattern: String,
    anchored: Regex,
}

impl PatternSelector {
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let anchored = Regex::new(&format!("^(?:{pattern})"))?;
        Ok(Self {
            pattern: pattern.to_string(),
            anchored,
        })
    }

    /// The pattern as written in the configuration.
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// True when the pattern matches at the start of `candidate`.
    pub fn matches_start(&self, candidate: &str) -> bool {
        self.anchored.is_match(candidate)
    }
}

impl Serialize for PatternSelector {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("PatternSelector", 1)?;
        state.serialize_field("pattern", &self.pattern)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for PatternSelector {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Bare(String),
            Tagged { pattern: String },
        }
        let (Repr::Bare(pattern) | Repr::Tagged { pattern }) = Repr::deserialize(deserializer)?;
        Self::new(&pattern).map_err(serde::de::Error::custom)
    }
}

/// Which columns to keep when reading a file.
///
/// Absent selector (`None` at the use site) keeps every column.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnSelector {
    /// Keep exactly the named columns. Requested names missing from the
    /// source are simply absent from the output.
    Names(Vec<String>),
    /// Keep columns whose header matches the pattern at string start.
    Pattern(PatternSelector),
}

/// Which sheets of a workbook to read.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SheetSelector {
    /// Every sheet, in file order. Written as `null` in the document.
    All,
    /// The sheet at this position; negative values count from the end.
    Index(i64),
    /// The one sheet with this exact name, or nothing if absent.
    Name(String),
    /// Sheets whose names are in the list, in original file order.
    Names(Vec<String>),
    /// Sheets whose names match the pattern at string start.
    Pattern(PatternSelector),
}

impl Default for SheetSelector {
    fn default() -> Self {
        Self::Index(0)
    }
}

/// How to read a CSV file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CsvRead {
    #[serde(default)]
    pub columns: Option<ColumnSelector>,
    #[serde(default)]
    pub filename_column: Option<String>,
    /// Field separator, a single ASCII character.
    #[serde(default = "default_separator")]
    pub separator: char,
}

pub(crate) fn default_separator() -> char {
    ','
}

/// How to read a spreadsheet workbook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpreadsheetRead {
    #[serde(default)]
    pub columns: Option<ColumnSelector>,
    #[serde(default)]
    pub filename_column: Option<String>,
    #[serde(default)]
    pub sheets: SheetSelector,
    /// When set, each row is tagged with its originating sheet name.
    #[serde(default)]
    pub sheetname_column: Option<String>,
}

/// How to load the source file, discriminated on `type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReadSpec {
    Csv(CsvRead),
    Spreadsheet(SpreadsheetRead),
}

impl ReadSpec {
    pub fn columns(&self) -> Option<&ColumnSelector> {
        match self {
            Self::Csv(spec) => spec.columns.as_ref(),
            Self::Spreadsheet(spec) => spec.columns.as_ref(),
        }
    }

    pub fn filename_column(&self) -> Option<&str> {
        match self {
            Self::Csv(spec) => spec.filename_column.as_deref(),
            Self::Spreadsheet(spec) => spec.filename_column.as_deref(),
        }
    }
}

/// Target type for the `convert` operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dtype {
    #[serde(alias = "string", alias = "utf8")]
    Str,
    #[serde(alias = "int64", alias = "i64")]
    Int,
    #[serde(alias = "float64", alias = "f64")]
    Float,
    #[serde(alias = "boolean")]
    Bool,
}

impl Dtype {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "str" | "string" | "utf8" => Some(Self::Str),
            "int" | "int64" | "i64" => Some(Self::Int),
            "float" | "float64" | "f64" => Some(Self::Float),
            "bool" | "boolean" => Some(Self::Bool),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Str => "str",
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
        }
    }
}

/// Which axis `drop_na` removes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    #[default]
    Rows,
    Columns,
}

/// Missing-value policy for `drop_na`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum How {
    #[default]
    Any,
    All,
}

/// Replacement value for `fill_na`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FillValue {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Default for FillValue {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

/// One named table operation and its parameters, discriminated on `op`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TransformSpec {
    Extract {
        pattern: String,
        source: String,
        destination: String,
    },
    Rename {
        mapping: BTreeMap<String, String>,
    },
    Convert {
        dtype: Dtype,
        source: String,
        #[serde(default)]
        destination: Option<String>,
    },
    DropNa {
        #[serde(default)]
        axis: Axis,
        #[serde(default)]
        how: How,
        #[serde(default)]
        columns: Option<Vec<String>>,
    },
    FillNa {
        #[serde(default)]
        columns: Option<Vec<String>>,
        #[serde(default)]
        value: FillValue,
    },
    Query {
        expression: String,
    },
    Reindex {
        columns: Vec<String>,
    },
    Sort {
        by: Vec<String>,
        #[serde(default = "default_ascending")]
        ascending: bool,
        #[serde(default)]
        natsort: bool,
    },
    Concat {
        columns: Vec<String>,
        destination: String,
        #[serde(default = "default_concat_sep")]
        sep: String,
    },
    NormalizeWhitespaces {
        #[serde(default)]
        columns: Option<Vec<String>>,
    },
}

pub(crate) fn default_ascending() -> bool {
    true
}

pub(crate) fn default_concat_sep() -> String {
    " ".to_string()
}

impl TransformSpec {
    /// The operation tag as written in configuration documents.
    pub fn op_name(&self) -> &'static str {
        match self {
            Self::Extract { .. } => "extract",
            Self::Rename { .. } => "rename",
            Self::Convert { .. } => "convert",
            Self::DropNa { .. } => "drop_na",
            Self::FillNa { .. } => "fill_na",
            Self::Query { .. } => "query",
            Self::Reindex { .. } => "reindex",
            Self::Sort { .. } => "sort",
            Self::Concat { .. } => "concat",
            Self::NormalizeWhitespaces { .. } => "normalize_whitespaces",
        }
    }
}

/// A full pipeline definition: one read spec plus an ordered transform list.
///
/// An empty transform list is valid and acts as a pass-through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    pub read: ReadSpec,
    #[serde(default)]
    pub transforms: Vec<TransformSpec>,
}

impl Schema {
    /// Validate an untyped configuration document into a `Schema`.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] listing every offending field.
    pub fn from_value(doc: &serde_json::Value) -> Result<Self, ValidationError> {
        crate::parse::parse_schema(doc)
    }

    /// Parse JSON text, then validate it into a `Schema`.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for malformed JSON or for any
    /// structural violation.
    pub fn from_json_str(text: &str) -> Result<Self, ValidationError> {
        let doc: serde_json::Value = serde_json::from_str(text).map_err(|error| {
            ValidationError::new(vec![crate::error::Violation::new(
                "$",
                format!("not valid JSON: {error}"),
            )])
        })?;
        Self::from_value(&doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_selector_matches_at_start_only() {
        let selector = PatternSelector::new("item_").unwrap();
        assert!(selector.matches_start("item_1"));
        assert!(!selector.matches_start("my_item_1"));
    }

    #[test]
    fn pattern_selector_keeps_original_pattern() {
        let selector = PatternSelector::new(r"col\d+").unwrap();
        assert_eq!(selector.as_str(), r"col\d+");
    }

    #[test]
    fn dtype_parses_aliases() {
        assert_eq!(Dtype::parse("int64"), Some(Dtype::Int));
        assert_eq!(Dtype::parse("string"), Some(Dtype::Str));
        assert_eq!(Dtype::parse("f64"), Some(Dtype::Float));
        assert_eq!(Dtype::parse("decimal"), None);
    }

    #[test]
    fn sheet_selector_defaults_to_first_sheet() {
        assert!(matches!(SheetSelector::default(), SheetSelector::Index(0)));
    }
}
