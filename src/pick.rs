//! Resolution of a column's observed datatypes into one declared datatype.
//!
//! The policy is a small rule table over the set of distinct labels seen:
//!
//! | observed            | declared  |
//! |---------------------|-----------|
//! | `{integer}`         | `integer` |
//! | `{number}`          | `number`  |
//! | `{integer, number}` | `number`  |
//! | anything else       | `string`  |
//!
//! Only purely numeric columns widen; any other mix resolves to `string`.
//! `date-time` is never produced here.

use std::collections::BTreeSet;

use crate::{counts::ColumnCounts, datatype::Datatype};

pub fn pick_datatype(counts: &ColumnCounts) -> Datatype {
    let observed: BTreeSet<Datatype> = counts
        .iter()
        .filter(|(_, count)| **count > 0)
        .map(|(datatype, _)| *datatype)
        .collect();
    resolve(&observed)
}

fn resolve(observed: &BTreeSet<Datatype>) -> Datatype {
    let labels: Vec<Datatype> = observed.iter().copied().collect();
    match labels.as_slice() {
        [Datatype::Integer] => Datatype::Integer,
        [Datatype::Number] => Datatype::Number,
        [Datatype::Integer, Datatype::Number] => Datatype::Number,
        _ => Datatype::String,
    }
}
