//! Quote-aware CSV parsing into typed records, plus exact-match row search.
//!
//! - Parsing: one physical line is one row; commas inside paired double quotes
//!   do not split, and quote characters stay in the field text.
//! - Records: a row factory (`fn(Row) -> FactoryResult<T>`) decides the record
//!   type. See [`factory`] for the stock variants.
//! - Search: [`search()`] resolves a column reference (index, header name or
//!   `*`) once, then scans the data rows for byte-equal fields.
//! - Sources: sync iterators of lines, any `tokio::io::AsyncRead`, local files
//!   with gzip/zstd and non-UTF-8 charsets, and (feature `fast_local`) an mmap
//!   path for uncompressed UTF-8 files.
//!
//! Data shape:
//! - `Row = Vec<String>`
//! - `Table<T>`: rows in file order, replaced wholesale by each parse
#![cfg_attr(docsrs, feature(doc_cfg))]
//
mod codec;
pub mod factory;
#[cfg(feature = "fast_local")]
mod fast;
mod io;
pub mod parser;
pub mod search;
pub mod split;
pub mod store;

#[cfg(feature = "fast_local")]
pub use crate::fast::parse_mmap;
pub use crate::factory::{FactoryError, FactoryResult, KeyedRow, Row};
pub use crate::io::{build_line_reader, source_from_path, Compression, SourceMeta};
pub use crate::parser::{parse_lines, CsvParser, ParserConfig, Table};
pub use crate::search::{search, ColumnRef, FieldSeq, SearchError, TableSearcher};
pub use crate::split::split_line;
pub use crate::store::TableStore;

use thiserror::Error;

/// Error type returned by parsing and source setup.
#[derive(Debug, Error)]
pub enum CsvError {
    /// The line source failed mid-read. The underlying cause is dropped so
    /// callers always see the same message.
    #[error("Issue while reading the given Reader")]
    Read,
    #[error(transparent)]
    Factory(#[from] FactoryError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type CsvResult<T> = std::result::Result<T, CsvError>;
