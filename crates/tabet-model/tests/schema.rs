//! Tests for the validating configuration parser.

use serde_json::json;
use tabet_model::{
    Axis, ColumnSelector, Dtype, FillValue, How, ReadSpec, Schema, SheetSelector, TransformSpec,
};

#[test]
fn minimal_csv_schema_applies_defaults() {
    let schema = Schema::from_value(&json!({"read": {"type": "csv"}})).unwrap();

    let ReadSpec::Csv(csv) = &schema.read else {
        panic!("expected csv read spec");
    };
    assert_eq!(csv.separator, ',');
    assert!(csv.columns.is_none());
    assert!(csv.filename_column.is_none());
    assert!(schema.transforms.is_empty());
}

#[test]
fn csv_schema_with_column_list_and_separator() {
    let schema = Schema::from_value(&json!({
        "read": {
            "type": "csv",
            "separator": ";",
            "columns": ["id", "name"],
            "filename_column": "source",
        },
    }))
    .unwrap();

    let ReadSpec::Csv(csv) = &schema.read else {
        panic!("expected csv read spec");
    };
    assert_eq!(csv.separator, ';');
    assert!(matches!(
        csv.columns,
        Some(ColumnSelector::Names(ref names)) if names == &["id", "name"]
    ));
    assert_eq!(csv.filename_column.as_deref(), Some("source"));
}

#[test]
fn column_pattern_accepts_bare_string_and_object() {
    for columns in [json!("^val"), json!({"pattern": "^val"})] {
        let schema = Schema::from_value(&json!({
            "read": {"type": "csv", "columns": columns},
        }))
        .unwrap();
        assert!(matches!(
            schema.read.columns(),
            Some(ColumnSelector::Pattern(_))
        ));
    }
}

#[test]
fn sheet_selector_forms() {
    let cases = [
        (json!({"type": "spreadsheet"}), SheetSelector::Index(0)),
        (
            json!({"type": "spreadsheet", "sheets": null}),
            SheetSelector::All,
        ),
        (
            json!({"type": "spreadsheet", "sheets": -1}),
            SheetSelector::Index(-1),
        ),
        (
            json!({"type": "spreadsheet", "sheets": "Jan"}),
            SheetSelector::Name("Jan".into()),
        ),
        (
            json!({"type": "spreadsheet", "sheets": ["Jan", "Feb"]}),
            SheetSelector::Names(vec!["Jan".into(), "Feb".into()]),
        ),
    ];
    for (read, expected) in cases {
        let schema = Schema::from_value(&json!({"read": read})).unwrap();
        let ReadSpec::Spreadsheet(spreadsheet) = &schema.read else {
            panic!("expected spreadsheet read spec");
        };
        match (&spreadsheet.sheets, &expected) {
            (SheetSelector::All, SheetSelector::All) => {}
            (SheetSelector::Index(a), SheetSelector::Index(b)) => assert_eq!(a, b),
            (SheetSelector::Name(a), SheetSelector::Name(b)) => assert_eq!(a, b),
            (SheetSelector::Names(a), SheetSelector::Names(b)) => assert_eq!(a, b),
            (actual, expected) => panic!("selector mismatch: {actual:?} vs {expected:?}"),
        }
    }

    let schema = Schema::from_value(&json!({
        "read": {"type": "spreadsheet", "sheets": {"pattern": "^data"}},
    }))
    .unwrap();
    let ReadSpec::Spreadsheet(spreadsheet) = &schema.read else {
        panic!("expected spreadsheet read spec");
    };
    assert!(matches!(spreadsheet.sheets, SheetSelector::Pattern(_)));
}

#[test]
fn transform_variants_parse_with_defaults() {
    let schema = Schema::from_value(&json!({
        "read": {"type": "csv"},
        "transforms": [
            {"op": "extract", "pattern": "(a)", "source": "s", "destination": "d"},
            {"op": "rename", "mapping": {"old": "new"}},
            {"op": "convert", "dtype": "int64", "source": "n"},
            {"op": "drop_na"},
            {"op": "fill_na"},
            {"op": "query", "expression": "a = 'x'"},
            {"op": "reindex", "columns": ["a"]},
            {"op": "sort", "by": "a"},
            {"op": "concat", "columns": ["a", "b"], "destination": "c"},
            {"op": "normalize_whitespaces"},
        ],
    }))
    .unwrap();

    assert_eq!(schema.transforms.len(), 10);
    assert!(matches!(
        schema.transforms[2],
        TransformSpec::Convert { dtype: Dtype::Int, ref destination, .. } if destination.is_none()
    ));
    assert!(matches!(
        schema.transforms[3],
        TransformSpec::DropNa { axis: Axis::Rows, how: How::Any, ref columns } if columns.is_none()
    ));
    assert!(matches!(
        schema.transforms[4],
        TransformSpec::FillNa { ref value, .. } if *value == FillValue::Text(String::new())
    ));
    assert!(matches!(
        schema.transforms[7],
        TransformSpec::Sort { ref by, ascending: true, natsort: false } if by == &["a"]
    ));
    assert!(matches!(
        schema.transforms[8],
        TransformSpec::Concat { ref sep, .. } if sep == " "
    ));
}

#[test]
fn sort_by_accepts_a_list() {
    let schema = Schema::from_value(&json!({
        "read": {"type": "csv"},
        "transforms": [{"op": "sort", "by": ["a", "b"], "ascending": false, "natsort": true}],
    }))
    .unwrap();

    assert!(matches!(
        schema.transforms[0],
        TransformSpec::Sort { ref by, ascending: false, natsort: true } if by == &["a", "b"]
    ));
}

#[test]
fn every_violation_is_reported_with_its_path() {
    let error = Schema::from_value(&json!({
        "read": {"type": "teletype", "separator": ",,"},
        "transforms": [
            {"op": "convert", "dtype": "decimal", "source": "n"},
            {"op": "warp"},
            {"op": "sort"},
        ],
    }))
    .unwrap_err();

    let paths: Vec<&str> = error
        .violations
        .iter()
        .map(|violation| violation.path.as_str())
        .collect();
    assert!(paths.contains(&"$.read.type"));
    assert!(paths.contains(&"$.transforms[0].dtype"));
    assert!(paths.contains(&"$.transforms[1].op"));
    assert!(paths.contains(&"$.transforms[2].by"));
    assert!(error.violations.len() >= 4);
}

#[test]
fn unrecognized_fields_are_rejected() {
    let error = Schema::from_value(&json!({
        "read": {"type": "csv", "sheets": 0},
        "transforms": [{"op": "rename", "mapping": {}, "extra": true}],
        "comment": "hello",
    }))
    .unwrap_err();

    let paths: Vec<&str> = error
        .violations
        .iter()
        .map(|violation| violation.path.as_str())
        .collect();
    assert!(paths.contains(&"$.read.sheets"));
    assert!(paths.contains(&"$.transforms[0].extra"));
    assert!(paths.contains(&"$.comment"));
}

#[test]
fn invalid_patterns_are_violations() {
    let error = Schema::from_value(&json!({
        "read": {"type": "csv", "columns": "("},
        "transforms": [{"op": "extract", "pattern": "[", "source": "s", "destination": "d"}],
    }))
    .unwrap_err();

    assert!(error
        .violations
        .iter()
        .any(|violation| violation.path == "$.read.columns"));
    assert!(error
        .violations
        .iter()
        .any(|violation| violation.path == "$.transforms[0].pattern"));
}

#[test]
fn missing_read_is_a_violation() {
    let error = Schema::from_value(&json!({"transforms": []})).unwrap_err();
    assert!(error
        .violations
        .iter()
        .any(|violation| violation.path == "$.read"));
}

#[test]
fn malformed_json_text_is_reported() {
    let error = Schema::from_json_str("{not json").unwrap_err();
    assert_eq!(error.violations.len(), 1);
    assert_eq!(error.violations[0].path, "$");
}

#[test]
fn display_lists_every_violation() {
    let error = Schema::from_value(&json!({
        "read": {"type": "csv", "bogus": 1, "separator": 9},
    }))
    .unwrap_err();

    let rendered = error.to_string();
    assert!(rendered.contains("2 violations"));
    assert!(rendered.contains("$.read.bogus"));
    assert!(rendered.contains("$.read.separator"));
}
