//! Sample acquisition: locate a table's files and decode a bounded, strided
//! subset of their rows.
//!
//! Files live under `root/search_prefix` and are selected when their path
//! relative to `root` matches the table's `search_pattern`. The newest files are
//! sampled first. Within a file every `sample_rate`-th data row is kept, and
//! sampling stops once `max_records` rows have been collected for the table.

use std::{
    cmp::Reverse,
    fs,
    path::{Path, PathBuf},
    time::SystemTime,
};

use anyhow::{Context, Result};
use encoding_rs::Encoding;
use itertools::Itertools;
use log::{debug, info, warn};
use regex::Regex;

use crate::{
    config::{DEFAULT_MAX_FILES, TableSpec},
    counts::Row,
    io_utils,
    schema::{Schema, generate_schema},
};

pub fn list_matching_files(root: &Path, table_spec: &TableSpec) -> Result<Vec<PathBuf>> {
    let pattern = Regex::new(&table_spec.search_pattern).with_context(|| {
        format!(
            "Compiling search_pattern for table '{}'",
            table_spec.table_name
        )
    })?;
    let start = match table_spec.search_prefix.as_deref() {
        Some(prefix) => root.join(prefix),
        None => root.to_path_buf(),
    };
    if !start.is_dir() {
        warn!("Search location {start:?} does not exist; no files to sample");
        return Ok(Vec::new());
    }

    let candidates = format!("{}/**/*", glob::Pattern::escape(&start.to_string_lossy()));
    let entries = glob::glob(&candidates)
        .with_context(|| format!("Building file listing pattern for {start:?}"))?;

    let mut matches = Vec::new();
    for entry in entries {
        let path = match entry {
            Ok(path) => path,
            Err(err) => {
                warn!("Skipping unreadable path while listing {start:?}: {err}");
                continue;
            }
        };
        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(err) => {
                warn!("Skipping {path:?}: {err}");
                continue;
            }
        };
        if !metadata.is_file() {
            continue;
        }
        let relative = path.strip_prefix(root).unwrap_or(path.as_path());
        let key = relative.to_string_lossy().replace('\\', "/");
        if pattern.is_match(&key) {
            let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            matches.push((modified, path));
        }
    }

    Ok(matches
        .into_iter()
        .sorted_by_key(|(modified, path)| (Reverse(*modified), path.clone()))
        .map(|(_, path)| path)
        .collect())
}

/// Reads up to `limit` rows from `path`, keeping every `sample_rate`-th data row.
pub fn sample_file(
    path: &Path,
    table_spec: &TableSpec,
    encoding: &'static Encoding,
    limit: usize,
) -> Result<Vec<Row>> {
    let mut reader = io_utils::open_csv_reader_from_path(path, table_spec.delimiter_byte())?;
    let headers = io_utils::reader_headers(&mut reader, encoding)
        .with_context(|| format!("Reading headers from {path:?}"))?;
    let sample_rate = table_spec.sample_rate().max(1);

    let mut rows = Vec::new();
    let mut record = csv::ByteRecord::new();
    let mut index = 0usize;
    while rows.len() < limit
        && reader
            .read_byte_record(&mut record)
            .with_context(|| format!("Reading row {} of {path:?}", index + 1))?
    {
        if index % sample_rate == 0 {
            let values = io_utils::decode_record(&record, encoding)
                .with_context(|| format!("Decoding row {} of {path:?}", index + 1))?;
            rows.push(build_row(&headers, values));
        }
        index += 1;
    }
    debug!("Sampled {} of {index} row(s) from {path:?}", rows.len());
    Ok(rows)
}

// Short rows leave trailing columns absent; surplus fields are dropped.
fn build_row(headers: &[String], values: Vec<String>) -> Row {
    let mut values = values.into_iter();
    headers
        .iter()
        .map(|header| (header.clone(), values.next()))
        .collect()
}

pub fn sample_files(
    root: &Path,
    table_spec: &TableSpec,
    encoding: &'static Encoding,
) -> Result<Vec<Row>> {
    let files = list_matching_files(root, table_spec)?;
    let max_records = table_spec.max_records();
    let mut rows = Vec::new();

    for path in files.iter().take(DEFAULT_MAX_FILES) {
        let remaining = max_records.saturating_sub(rows.len());
        if remaining == 0 {
            break;
        }
        match sample_file(path, table_spec, encoding, remaining) {
            Ok(mut sampled) => {
                info!(
                    "Sampled {} row(s) from {path:?} for table '{}'",
                    sampled.len(),
                    table_spec.table_name
                );
                rows.append(&mut sampled);
            }
            Err(err) => warn!("Skipping {path:?}: {err:#}"),
        }
    }
    Ok(rows)
}

pub fn sampled_schema(
    root: &Path,
    table_spec: &TableSpec,
    encoding: &'static Encoding,
) -> Result<Schema> {
    let rows = sample_files(root, table_spec, encoding)?;
    if rows.is_empty() {
        warn!(
            "No rows sampled for table '{}'; schema will be empty",
            table_spec.table_name
        );
    }
    Ok(generate_schema(&rows, table_spec))
}
