use std::str::FromStr;

use chrono::NaiveDate;
use rowmatch_core::{Column, ConversionMode, DataType, Literal, Table, TableError, Value};
use rowmatch_engine::{compare, AlignedPair, ColumnMode, CompareConfig, Comparison, MatchError, RowMode};
use rust_decimal::Decimal;

fn table(columns: Vec<Column>, rows: Vec<Vec<Value>>) -> Table {
    let mut t = Table::new(columns).unwrap();
    for row in rows {
        t.push_row(row).unwrap();
    }
    t
}

fn int_columns(n: usize) -> Vec<Column> {
    vec![Column::new(DataType::Integer); n]
}

fn positive() -> Value {
    Value::predicate("x > 0", |v| matches!(v, Some(Literal::Integer(n)) if *n > 0))
}

fn any_order() -> CompareConfig {
    CompareConfig::default().with_row_mode(RowMode::AnyOrder)
}

fn all_configs() -> Vec<CompareConfig> {
    let mut out = Vec::new();
    for column_mode in [ColumnMode::Positional, ColumnMode::ByName] {
        for row_mode in [RowMode::Ordered, RowMode::AnyOrder, RowMode::ByKey] {
            out.push(
                CompareConfig::default()
                    .with_column_mode(column_mode)
                    .with_row_mode(row_mode),
            );
        }
    }
    out
}

// -------------------------------------------------------------------------
// Worked scenarios
// -------------------------------------------------------------------------

#[test]
fn predicate_row_matches_in_any_order() {
    let expected = table(int_columns(2), vec![vec![positive(), 5.into()], vec![3.into(), 4.into()]]);
    let actual = table(int_columns(2), vec![vec![3.into(), 4.into()], vec![10.into(), 5.into()]]);
    let c = Comparison::new(any_order(), &expected, &actual);
    assert!(c.matches().unwrap());
    assert_eq!(
        c.outcome().unwrap().rows,
        vec![AlignedPair::both(0, 1), AlignedPair::both(1, 0)]
    );
}

#[test]
fn duplicate_key_bucket_sizes_differ() {
    let columns = vec![Column::named("k", DataType::Integer).key(), Column::named("v", DataType::Integer)];
    let expected = table(columns.clone(), vec![vec![1.into(), 2.into()], vec![1.into(), 2.into()]]);
    let actual = table(columns, vec![vec![1.into(), 2.into()]]);
    let config = CompareConfig::default().with_row_mode(RowMode::ByKey);
    assert!(!compare(&config, &expected, &actual).unwrap());
}

#[test]
fn unique_assignment_within_budget_of_one() {
    let expected_rows = (0..10)
        .map(|n: i32| {
            let target = (n * 7) % 10;
            vec![Value::predicate(format!("== {target}"), move |v| v == Some(&Literal::Integer(target)))]
        })
        .collect();
    let actual_rows = (0..10).map(|n: i32| vec![Value::from(n)]).collect();
    let expected = table(int_columns(1), expected_rows);
    let actual = table(int_columns(1), actual_rows);

    let config = any_order().with_permutation_limit(1);
    let c = Comparison::new(config, &expected, &actual);
    assert!(c.matches().unwrap());
    for pair in &c.outcome().unwrap().rows {
        let (Some(e), Some(a)) = (pair.expected, pair.actual) else {
            panic!("incomplete pair {pair:?}");
        };
        assert_eq!(a, (e * 7) % 10);
    }
}

#[test]
fn by_name_extra_actual_column() {
    let expected = table(vec![Column::named("a", DataType::Integer)], vec![vec![1.into()]]);
    let actual = table(
        vec![Column::named("a", DataType::Integer), Column::named("b", DataType::Integer)],
        vec![vec![1.into(), 2.into()]],
    );
    let config = CompareConfig::default().with_column_mode(ColumnMode::ByName);
    let c = Comparison::new(config, &expected, &actual);
    assert!(!c.matches().unwrap());
    assert_eq!(
        c.outcome().unwrap().columns,
        vec![AlignedPair::both(0, 0), AlignedPair::actual_only(1)]
    );
}

#[test]
fn wildcard_column_rejects_second_type() {
    let mut t = Table::new(vec![Column::named("value", DataType::Any)]).unwrap();
    t.push_row(vec![5.into()]).unwrap();
    let err = t.push_row(vec!["text".into()]).unwrap_err();
    assert_eq!(
        err,
        TableError::TypeMismatch {
            column: "value".into(),
            expected: DataType::Integer,
            actual: DataType::String,
        }
    );
    assert_eq!(err.to_string(), "column value: expected type integer, got string");
}

// -------------------------------------------------------------------------
// General behaviour
// -------------------------------------------------------------------------

#[test]
fn every_mode_is_reflexive() {
    let date = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
    let columns = vec![
        Column::named("id", DataType::Integer).key(),
        Column::named("when", DataType::Date),
        Column::named("amount", DataType::Decimal),
        Column::named("note", DataType::String),
    ];
    let rows = vec![
        vec![1.into(), date.into(), Decimal::from_str("1.50").unwrap().into(), "a".into()],
        vec![2.into(), Value::Null, Decimal::from(7).into(), Value::Null],
        vec![1.into(), date.into(), Decimal::from(0).into(), "b".into()],
    ];
    let t = table(columns, rows);
    for config in all_configs() {
        assert!(compare(&config, &t, &t).unwrap(), "{config:?}");
    }
}

#[test]
fn ordered_mode_is_order_sensitive() {
    let expected = table(int_columns(1), vec![vec![1.into()], vec![2.into()]]);
    let actual = table(int_columns(1), vec![vec![2.into()], vec![1.into()]]);
    assert!(!compare(&CompareConfig::default(), &expected, &actual).unwrap());
    assert!(compare(&any_order(), &expected, &actual).unwrap());
}

#[test]
fn relaxed_conversion_across_numeric_types() {
    let expected = table(vec![Column::new(DataType::Integer)], vec![vec![5.into()]]);
    let actual = table(
        vec![Column::new(DataType::Decimal)],
        vec![vec![Decimal::from_str("5.00").unwrap().into()]],
    );
    assert!(!compare(&CompareConfig::default(), &expected, &actual).unwrap());
    let relaxed = CompareConfig::default().with_conversion(ConversionMode::Relaxed);
    assert!(compare(&relaxed, &expected, &actual).unwrap());
}

#[test]
fn exhausted_budget_is_distinguishable() {
    let small = || Value::predicate("< 10", |v| matches!(v, Some(Literal::Integer(n)) if *n < 10));
    let expected = table(int_columns(1), vec![vec![small()], vec![small()], vec![small()]]);
    let actual = table(int_columns(1), vec![vec![1.into()], vec![2.into()], vec![30.into()]]);
    // 30 is accepted by no row: rejected before any search.
    assert!(!compare(&any_order(), &expected, &actual).unwrap());

    // Both `< 10` rows can only take actual row 0.
    let anything = Value::predicate("anything", |_| true);
    let expected = table(
        int_columns(2),
        vec![
            vec![small(), small()],
            vec![small(), small()],
            vec![anything.clone(), anything],
        ],
    );
    let actual = table(
        int_columns(2),
        vec![vec![1.into(), 1.into()], vec![30.into(), 30.into()], vec![31.into(), 31.into()]],
    );
    let err = compare(&any_order().with_permutation_limit(1), &expected, &actual).unwrap_err();
    assert!(err.is_too_many_permutations());
    assert!(matches!(err, MatchError::TooManyPermutations { limit: 1 }));
    assert!(!compare(&any_order().with_permutation_limit(usize::MAX), &expected, &actual).unwrap());
}

#[test]
fn duplicate_names_rejected_in_every_row_mode() {
    let expected = table(
        vec![
            Column::named("k", DataType::Integer).key(),
            Column::named("v", DataType::Integer),
            Column::named("v", DataType::Integer),
        ],
        vec![vec![1.into(), 2.into(), 3.into()]],
    );
    let actual = table(
        vec![
            Column::named("k", DataType::Integer),
            Column::named("v", DataType::Integer).key(),
            Column::named("w", DataType::Integer),
        ],
        vec![vec![1.into(), 2.into(), 3.into()]],
    );
    for row_mode in [RowMode::Ordered, RowMode::AnyOrder, RowMode::ByKey] {
        let config = CompareConfig::default()
            .with_column_mode(ColumnMode::ByName)
            .with_row_mode(row_mode);
        let result = compare(&config, &expected, &actual);
        assert!(
            matches!(&result, Err(MatchError::DuplicateColumnNames { names, .. }) if names == "v"),
            "{row_mode:?}: {result:?}"
        );
    }
}

#[test]
fn outcome_serializes_for_renderers() {
    let expected = table(int_columns(1), vec![vec![1.into()], vec![2.into()]]);
    let actual = table(int_columns(1), vec![vec![2.into()]]);
    let c = Comparison::new(any_order(), &expected, &actual);
    let json = serde_json::to_value(c.outcome().unwrap()).unwrap();
    assert_eq!(json["matched"], serde_json::json!(false));
    assert_eq!(
        json["rows"],
        serde_json::json!([
            { "expected": 0, "actual": null },
            { "expected": 1, "actual": 0 },
        ])
    );
    assert_eq!(json["columns"][0], serde_json::json!({ "expected": 0, "actual": 0 }));
}

#[test]
fn config_file_drives_comparison() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rowmatch.toml");
    std::fs::write(&path, "row_mode = \"any_order\"\npermutation_limit = 50\n").unwrap();
    let config = CompareConfig::load(&path).unwrap();

    let expected = table(int_columns(1), vec![vec![1.into()], vec![2.into()]]);
    let actual = table(int_columns(1), vec![vec![2.into()], vec![1.into()]]);
    assert!(compare(&config, &expected, &actual).unwrap());
}
