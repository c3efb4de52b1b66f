//! Schema assembly from sampled rows.
//!
//! [`generate_schema()`] tallies the sample with [`count_samples()`], picks a
//! datatype per column, and layers the table's overrides on top:
//!
//! 1. `default_datatype`, when set, replaces the picked datatype for every column.
//! 2. A `date-time` result is declared as a nullable string with
//!    `format: date-time`.
//! 3. A `schema_overrides` entry for the column replaces the declaration
//!    wholesale with `["null", conversion_type]` and never carries `format`,
//!    even for `date-time`. Downstream catalogs rely on this shape.

use std::collections::{BTreeMap, HashMap};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    config::TableSpec,
    counts::{Row, count_samples},
    datatype::Datatype,
    pick::pick_datatype,
};

const NULL_TYPE: &str = "null";
const DATE_TIME_FORMAT: &str = "date-time";

/// Column declaration in JSON-schema form: `{"type": ["null", T]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    #[serde(rename = "type")]
    pub types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl ColumnSchema {
    pub fn nullable(datatype: Datatype) -> Self {
        Self {
            types: vec![NULL_TYPE.to_string(), datatype.as_str().to_string()],
            format: None,
        }
    }

    fn nullable_date_time_string() -> Self {
        Self {
            types: vec![NULL_TYPE.to_string(), Datatype::String.as_str().to_string()],
            format: Some(DATE_TIME_FORMAT.to_string()),
        }
    }

    fn declared(datatype: Datatype) -> Self {
        match datatype {
            Datatype::DateTime => Self::nullable_date_time_string(),
            other => Self::nullable(other),
        }
    }
}

pub type Schema = BTreeMap<String, ColumnSchema>;

pub fn generate_schema(rows: &[Row], table_spec: &TableSpec) -> Schema {
    let counts = count_samples(rows);
    let overrides: HashMap<&str, Datatype> = table_spec
        .schema_overrides()
        .iter()
        .map(|column| (column.column_name.as_str(), column.conversion_type))
        .collect();

    counts
        .into_iter()
        .map(|(column, column_counts)| {
            let datatype = table_spec
                .default_datatype
                .unwrap_or_else(|| pick_datatype(&column_counts));
            let declaration = match overrides.get(column.as_str()) {
                Some(forced) => ColumnSchema::nullable(*forced),
                None => ColumnSchema::declared(datatype),
            };
            debug!(
                "Column '{column}' observed {column_counts:?} -> {:?}",
                declaration.types
            );
            (column, declaration)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchemaOverride;
    use proptest::prelude::*;

    fn rows(column: &str, values: &[&str]) -> Vec<Row> {
        values
            .iter()
            .map(|value| Row::from([(column.to_string(), Some(value.to_string()))]))
            .collect()
    }

    fn override_spec(column: &str, datatype: Datatype) -> TableSpec {
        TableSpec {
            schema_overrides: Some(vec![SchemaOverride {
                column_name: column.to_string(),
                conversion_type: datatype,
            }]),
            ..Default::default()
        }
    }

    #[test]
    fn integer_column_declares_nullable_integer() {
        let schema = generate_schema(&rows("a", &["1", "2"]), &TableSpec::default());
        assert_eq!(schema.len(), 1);
        assert_eq!(schema["a"], ColumnSchema::nullable(Datatype::Integer));
    }

    #[test]
    fn mixed_numeric_and_text_declares_string() {
        let schema = generate_schema(&rows("a", &["1", "x"]), &TableSpec::default());
        assert_eq!(schema["a"].types, vec!["null", "string"]);
    }

    #[test]
    fn integer_and_number_widen() {
        let schema = generate_schema(&rows("a", &["1", "2.5"]), &TableSpec::default());
        assert_eq!(schema["a"].types, vec!["null", "number"]);
    }

    #[test]
    fn per_column_date_time_override_has_no_format() {
        let schema = generate_schema(
            &rows("a", &["2020-01-01"]),
            &override_spec("a", Datatype::DateTime),
        );
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"a": {"type": ["null", "date-time"]}})
        );
    }

    #[test]
    fn default_date_time_declares_formatted_string() {
        let spec = TableSpec {
            default_datatype: Some(Datatype::DateTime),
            ..Default::default()
        };
        let schema = generate_schema(&rows("a", &["whatever"]), &spec);
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"a": {"type": ["null", "string"], "format": "date-time"}})
        );
    }

    #[test]
    fn default_datatype_ignores_observed_counts() {
        let spec = TableSpec {
            default_datatype: Some(Datatype::Number),
            ..Default::default()
        };
        let schema = generate_schema(&rows("a", &["abc", "1"]), &spec);
        assert_eq!(schema["a"], ColumnSchema::nullable(Datatype::Number));
    }

    #[test]
    fn override_beats_default_datatype() {
        let mut spec = override_spec("b", Datatype::Integer);
        spec.default_datatype = Some(Datatype::String);
        let sample = vec![Row::from([
            ("a".to_string(), Some("1".to_string())),
            ("b".to_string(), Some("x".to_string())),
        ])];
        let schema = generate_schema(&sample, &spec);
        assert_eq!(schema["a"], ColumnSchema::nullable(Datatype::String));
        assert_eq!(schema["b"], ColumnSchema::nullable(Datatype::Integer));
    }

    #[test]
    fn overrides_for_unseen_columns_add_nothing() {
        let schema = generate_schema(&rows("a", &["1"]), &override_spec("zzz", Datatype::Number));
        assert_eq!(schema.keys().collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn always_empty_column_defaults_to_string() {
        let sample = vec![
            Row::from([
                ("a".to_string(), Some("1".to_string())),
                ("blank".to_string(), Some(String::new())),
            ]),
            Row::from([("a".to_string(), Some("2".to_string())), ("blank".to_string(), None)]),
        ];
        let schema = generate_schema(&sample, &TableSpec::default());
        assert_eq!(schema["blank"], ColumnSchema::nullable(Datatype::String));
    }

    #[test]
    fn no_rows_yields_empty_schema() {
        assert!(generate_schema(&[], &TableSpec::default()).is_empty());
    }

    proptest! {
        #[test]
        fn integer_columns_always_declare_integer(values in prop::collection::vec(any::<i64>(), 1..20)) {
            let text: Vec<String> = values.iter().map(i64::to_string).collect();
            let refs: Vec<&str> = text.iter().map(String::as_str).collect();
            let schema = generate_schema(&rows("n", &refs), &TableSpec::default());
            prop_assert_eq!(&schema["n"], &ColumnSchema::nullable(Datatype::Integer));
        }

        #[test]
        fn generation_is_idempotent(cells in prop::collection::vec(("[a-d]", "[0-9a-z.]{0,4}"), 0..30)) {
            let sample: Vec<Row> = cells
                .into_iter()
                .map(|(column, value)| Row::from([(column, Some(value))]))
                .collect();
            let spec = TableSpec::default();
            let first = serde_json::to_string(&generate_schema(&sample, &spec)).unwrap();
            let second = serde_json::to_string(&generate_schema(&sample, &spec)).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn every_seen_column_gets_an_entry(cells in prop::collection::vec(("[a-f]", "[0-9x]{0,3}"), 0..30)) {
            let sample: Vec<Row> = cells
                .into_iter()
                .map(|(column, value)| Row::from([(column, Some(value))]))
                .collect();
            let schema = generate_schema(&sample, &TableSpec::default());
            for row in &sample {
                for column in row.keys() {
                    prop_assert!(schema.contains_key(column));
                }
            }
        }
    }
}
