//! Per-column datatype tallies over a sample set.

use std::collections::BTreeMap;

use crate::{convert::convert, datatype::Datatype};

/// One sampled record: column name to raw cell text (`None` when absent).
pub type Row = BTreeMap<String, Option<String>>;

/// Occurrences of each datatype observed in a single column.
pub type ColumnCounts = BTreeMap<Datatype, usize>;

/// Column name to its [`ColumnCounts`]. Columns seen only with absent or empty
/// cells keep an empty inner map.
pub type TypeCount = BTreeMap<String, ColumnCounts>;

/// Folds one row into `counts` and returns the updated tally.
pub fn count_sample(row: &Row, mut counts: TypeCount) -> TypeCount {
    for (column, raw) in row {
        let column_counts = counts.entry(column.clone()).or_default();
        if let Some(value) = convert(raw.as_deref(), None) {
            *column_counts.entry(value.datatype()).or_insert(0) += 1;
        }
    }
    counts
}

pub fn count_samples<'a, I>(rows: I) -> TypeCount
where
    I: IntoIterator<Item = &'a Row>,
{
    rows.into_iter()
        .fold(TypeCount::new(), |counts, row| count_sample(row, counts))
}
