//! Exact-match search over parsed string rows.
//!
//! Resolution order for a search call:
//! 1. empty table -> no matches, whatever the arguments
//! 2. `*` -> every field of every data row
//! 3. numeric reference, or any reference when the table has headers ->
//!    one resolved column
//! 4. otherwise -> error, a name needs a header row
//!
//! The header row (when present) names columns and is never returned.
use std::collections::LinkedList;
use std::fmt;
use thiserror::Error;

pub const WILDCARD: &str = "*";

/// A row that exposes its fields as strings.
pub trait FieldSeq {
    fn field_count(&self) -> usize;
    fn field(&self, idx: usize) -> Option<&str>;

    fn contains_field(&self, target: &str) -> bool {
        (0..self.field_count()).any(|i| self.field(i) == Some(target))
    }
}

impl FieldSeq for [String] {
    fn field_count(&self) -> usize {
        self.len()
    }

    fn field(&self, idx: usize) -> Option<&str> {
        self.get(idx).map(String::as_str)
    }

    fn contains_field(&self, target: &str) -> bool {
        self.iter().any(|f| f == target)
    }
}

impl FieldSeq for Vec<String> {
    fn field_count(&self) -> usize {
        self.len()
    }

    fn field(&self, idx: usize) -> Option<&str> {
        self.as_slice().field(idx)
    }

    fn contains_field(&self, target: &str) -> bool {
        self.as_slice().contains_field(target)
    }
}

impl FieldSeq for Box<[String]> {
    fn field_count(&self) -> usize {
        self.len()
    }

    fn field(&self, idx: usize) -> Option<&str> {
        (**self).field(idx)
    }

    fn contains_field(&self, target: &str) -> bool {
        (**self).contains_field(target)
    }
}

impl FieldSeq for LinkedList<String> {
    fn field_count(&self) -> usize {
        self.len()
    }

    fn field(&self, idx: usize) -> Option<&str> {
        self.iter().nth(idx).map(String::as_str)
    }

    fn contains_field(&self, target: &str) -> bool {
        self.iter().any(|f| f == target)
    }
}

/// Which column(s) a search looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ColumnRef {
    /// `*`: all columns.
    #[default]
    All,
    /// An optionally signed integer, kept verbatim; it may not fit any
    /// index type and is then simply out of range.
    Index(String),
    /// Header name.
    Name(String),
}

impl ColumnRef {
    pub fn parse(raw: &str) -> Self {
        if raw == WILDCARD {
            ColumnRef::All
        } else if is_integer(raw) {
            ColumnRef::Index(raw.to_string())
        } else {
            ColumnRef::Name(raw.to_string())
        }
    }
}

impl From<&str> for ColumnRef {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRef::All => f.write_str(WILDCARD),
            ColumnRef::Index(raw) | ColumnRef::Name(raw) => f.write_str(raw),
        }
    }
}

fn is_integer(raw: &str) -> bool {
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// The column reference could not be resolved. Messages list the valid
/// alternatives and are meant to be shown to end users as is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("Column index {column} not found. Can search numeric column identifiers between 0 and {max_index} inclusive.")]
    IndexOutOfRange { column: String, max_index: i64 },
    #[error("Column identifier {column} not found. Valid column identifiers include [{}] and numbers between 0 and {max_index} inclusive.", .headers.join(", "))]
    ColumnNotFound {
        column: String,
        headers: Vec<String>,
        max_index: i64,
    },
    #[error("Cannot search non-numeric column {column} if no headers. Can search numeric column identifiers between 0 and {max_index} inclusive.")]
    NonNumericWithoutHeaders { column: String, max_index: i64 },
}

/// Read-only searcher over a borrowed table.
#[derive(Debug, Clone, Copy)]
pub struct TableSearcher<'a, R> {
    rows: &'a [R],
}

impl<'a, R: FieldSeq> TableSearcher<'a, R> {
    pub fn new(rows: &'a [R]) -> Self {
        Self { rows }
    }

    /// Rows (header excluded) holding `target` in the referenced column(s),
    /// in table order, each at most once.
    pub fn search(
        &self,
        has_headers: bool,
        target: &str,
        column: &ColumnRef,
    ) -> Result<Vec<&'a R>, SearchError> {
        let Some(first) = self.rows.first() else {
            return Ok(Vec::new());
        };
        let data = if has_headers {
            &self.rows[1..]
        } else {
            self.rows
        };

        let idx = match column {
            ColumnRef::All => {
                return Ok(data.iter().filter(|r| r.contains_field(target)).collect());
            }
            ColumnRef::Index(raw) => resolve_index(first, raw)?,
            ColumnRef::Name(name) if has_headers => resolve_name(first, name)?,
            ColumnRef::Name(name) => {
                return Err(SearchError::NonNumericWithoutHeaders {
                    column: name.clone(),
                    max_index: max_index(first),
                });
            }
        };
        Ok(data
            .iter()
            .filter(|r| r.field(idx) == Some(target))
            .collect())
    }
}

fn max_index<R: FieldSeq>(first: &R) -> i64 {
    first.field_count() as i64 - 1
}

fn resolve_index<R: FieldSeq>(first: &R, raw: &str) -> Result<usize, SearchError> {
    raw.parse::<i64>()
        .ok()
        .and_then(|i| usize::try_from(i).ok())
        .filter(|&i| i < first.field_count())
        .ok_or_else(|| SearchError::IndexOutOfRange {
            column: raw
                .parse::<i64>()
                .map_or_else(|_| raw.to_string(), |i| i.to_string()),
            max_index: max_index(first),
        })
}

/// Look `name` up in the header row.
fn resolve_name<R: FieldSeq>(header: &R, name: &str) -> Result<usize, SearchError> {
    let width = header.field_count();
    (0..width)
        .position(|i| header.field(i) == Some(name))
        .ok_or_else(|| SearchError::ColumnNotFound {
            column: name.to_string(),
            headers: (0..width)
                .filter_map(|i| header.field(i).map(str::to_string))
                .collect(),
            max_index: max_index(header),
        })
}

/// Search `rows` for `target` in the column named by `column` (`*`, an index
/// or a header name).
///
/// ```
/// use csv_search::search;
///
/// let rows = vec![
///     vec!["Name".to_string(), "Hobby".to_string()],
///     vec!["Sarah".to_string(), "Sewing".to_string()],
/// ];
/// let found = search(&rows, true, "Sewing", "Hobby").unwrap();
/// assert_eq!(found, vec![&rows[1]]);
/// ```
pub fn search<'a, R: FieldSeq>(
    rows: &'a [R],
    has_headers: bool,
    target: &str,
    column: &str,
) -> Result<Vec<&'a R>, SearchError> {
    TableSearcher::new(rows).search(has_headers, target, &ColumnRef::parse(column))
}
