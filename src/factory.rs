//! Row factories: how one split line becomes a record.
//!
//! A factory is any `FnMut(Row) -> FactoryResult<T>`. The stock variants below
//! are plain functions, so callers pick one at the call site:
//!
//! ```
//! use csv_search::{factory, parse_lines};
//!
//! let lines = ["k,v1,v2"].map(|l| Ok(l.to_string()));
//! let table = parse_lines(lines, factory::key_rest).unwrap();
//! assert_eq!(table.rows()[0].key, "k");
//! ```
use std::collections::LinkedList;
use thiserror::Error;

/// Fields of one source line, in order, exactly as split.
pub type Row = Vec<String>;

pub type FactoryResult<T> = std::result::Result<T, FactoryError>;

/// A factory refused a row. Carries the row for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FactoryError {
    pub message: String,
    pub row: Row,
}

impl FactoryError {
    pub fn new(message: impl Into<String>, row: Row) -> Self {
        Self {
            message: message.into(),
            row,
        }
    }

    pub fn empty_pair(row: Row) -> Self {
        Self::new("Cannot parse an empty row into a pair", row)
    }
}

/// First field as key, the remaining fields as values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyedRow {
    pub key: String,
    pub values: Vec<String>,
}

/// Keeps the row as is.
pub fn identity(row: Row) -> FactoryResult<Row> {
    Ok(row)
}

/// Fixed-size copy of the row.
pub fn array(row: Row) -> FactoryResult<Box<[String]>> {
    Ok(row.into_boxed_slice())
}

pub fn linked(row: Row) -> FactoryResult<LinkedList<String>> {
    Ok(row.into_iter().collect())
}

/// Splits off field 0 as the key. Fails on `[]` and on `[""]`, which is what a
/// blank line splits into.
pub fn key_rest(row: Row) -> FactoryResult<KeyedRow> {
    match row.as_slice() {
        [] => Err(FactoryError::empty_pair(row)),
        [only] if only.is_empty() => Err(FactoryError::empty_pair(row)),
        _ => {
            let mut fields = row.into_iter();
            let key = fields.next().unwrap_or_default();
            Ok(KeyedRow {
                key,
                values: fields.collect(),
            })
        }
    }
}
