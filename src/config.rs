//! Table configuration: the list of [`TableSpec`] entries a run is driven by.
//!
//! Shape checks (known keys, enumerated datatypes, required fields) happen while
//! deserializing; [`validate_table_specs()`] adds the semantic checks and
//! reports every problem at once.

use std::{collections::HashSet, fs, path::Path};

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::datatype::Datatype;

pub const DEFAULT_DELIMITER: u8 = b',';
pub const DEFAULT_SAMPLE_RATE: usize = 5;
pub const DEFAULT_MAX_RECORDS: usize = 1000;
pub const DEFAULT_MAX_FILES: usize = 5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Reading table config {path:?}")]
    Read {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Parsing table config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid table config:\n  {}", .0.join("\n  "))]
    Invalid(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaOverride {
    pub column_name: String,
    pub conversion_type: Datatype,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableSpec {
    pub table_name: String,
    pub search_pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_properties: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_overrides: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_datatype: Option<Datatype>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_overrides: Option<Vec<SchemaOverride>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_records: Option<usize>,
}

impl TableSpec {
    pub fn schema_overrides(&self) -> &[SchemaOverride] {
        self.schema_overrides.as_deref().unwrap_or_default()
    }

    /// Single-byte field delimiter; multi-byte values are rejected by validation.
    pub fn delimiter_byte(&self) -> u8 {
        match self.delimiter.as_deref() {
            Some(value) if value.len() == 1 => value.as_bytes()[0],
            Some("\\t") | Some("tab") => b'\t',
            _ => DEFAULT_DELIMITER,
        }
    }

    pub fn sample_rate(&self) -> usize {
        self.sample_rate.unwrap_or(DEFAULT_SAMPLE_RATE)
    }

    pub fn max_records(&self) -> usize {
        self.max_records.unwrap_or(DEFAULT_MAX_RECORDS)
    }
}

pub fn parse_table_specs(input: &str) -> Result<Vec<TableSpec>, ConfigError> {
    Ok(serde_yaml::from_str(input)?)
}

pub fn load_table_specs(path: &Path) -> Result<Vec<TableSpec>, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let specs = parse_table_specs(&raw)?;
    validate_table_specs(&specs)?;
    Ok(specs)
}

pub fn validate_table_specs(specs: &[TableSpec]) -> Result<(), ConfigError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for (idx, spec) in specs.iter().enumerate() {
        let context = format!("table #{} ({})", idx + 1, spec.table_name);
        if spec.table_name.trim().is_empty() {
            errors.push(format!("{context}: table_name must not be empty"));
        } else if !seen.insert(spec.table_name.as_str()) {
            errors.push(format!("{context}: duplicate table_name"));
        }
        if let Err(err) = Regex::new(&spec.search_pattern) {
            errors.push(format!("{context}: invalid search_pattern: {err}"));
        }
        if let Some(delimiter) = spec.delimiter.as_deref() {
            if delimiter.len() != 1 && !matches!(delimiter, "\\t" | "tab") {
                errors.push(format!(
                    "{context}: delimiter '{delimiter}' must be a single byte"
                ));
            }
        }
        if spec.sample_rate == Some(0) {
            errors.push(format!("{context}: sample_rate must be at least 1"));
        }
        if spec.max_records == Some(0) {
            errors.push(format!("{context}: max_records must be at least 1"));
        }
        for column in spec.schema_overrides() {
            if column.column_name.trim().is_empty() {
                errors.push(format!(
                    "{context}: schema_overrides entries need a column_name"
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Invalid(errors))
    }
}
