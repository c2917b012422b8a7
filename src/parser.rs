//! Line source -> split rows -> factory -> [`Table`].
//!
//! Every parse builds its rows off to the side and swaps them in only when
//! the whole source converted, so a failed parse leaves the previous table
//! untouched.
use crate::factory::{FactoryResult, Row};
use crate::search::FieldSeq;
use crate::split::split_line;
use crate::{CsvError, CsvResult};
use crc32fast::Hasher as Crc32;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

const FIELD_SEPARATOR: u8 = 0x1f;
const ROW_SEPARATOR: u8 = 0x1e;

/// Records of one parse, in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table<T> {
    rows: Vec<T>,
}

impl<T> Table<T> {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Read-only view of the records.
    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.rows.iter()
    }

    pub fn into_rows(self) -> Vec<T> {
        self.rows
    }
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<T>> for Table<T> {
    fn from(rows: Vec<T>) -> Self {
        Self { rows }
    }
}

impl<'a, T> IntoIterator for &'a Table<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl<R: FieldSeq> Table<R> {
    /// CRC32 over all fields (0x1f between fields, 0x1e between rows).
    /// Equal tables always produce equal fingerprints.
    pub fn fingerprint(&self) -> u32 {
        let mut crc = Crc32::new();
        for (ri, row) in self.rows.iter().enumerate() {
            if ri > 0 {
                crc.update(&[ROW_SEPARATOR]);
            }
            for fi in 0..row.field_count() {
                if fi > 0 {
                    crc.update(&[FIELD_SEPARATOR]);
                }
                crc.update(row.field(fi).unwrap_or_default().as_bytes());
            }
        }
        crc.finalize()
    }
}

/// Parser knobs.
#[derive(Debug, Clone, Default)]
pub struct ParserConfig {
    /// Longest accepted line in bytes, terminator excluded. `None` = unbounded.
    pub max_line_length: Option<usize>,
}

impl ParserConfig {
    fn check_line(&self, line: &str) -> CsvResult<()> {
        match self.max_line_length {
            Some(max) if line.len() > max => Err(CsvError::Read),
            _ => Ok(()),
        }
    }
}

/// Holds the table of the last successful parse.
#[derive(Debug, Clone)]
pub struct CsvParser<T> {
    config: ParserConfig,
    table: Table<T>,
}

impl<T> Default for CsvParser<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> CsvParser<T> {
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            config,
            table: Table::new(),
        }
    }

    /// Parse every line of `lines`, replacing the current table on success.
    ///
    /// A read error surfaces as [`CsvError::Read`]; a factory error aborts the
    /// parse and is returned with the offending row.
    pub fn parse<I, F>(&mut self, lines: I, mut factory: F) -> CsvResult<&Table<T>>
    where
        I: IntoIterator<Item = std::io::Result<String>>,
        F: FnMut(Row) -> FactoryResult<T>,
    {
        let mut rows = Vec::new();
        for line in lines {
            let line = line.map_err(|_| CsvError::Read)?;
            self.config.check_line(&line)?;
            rows.push(factory(split_line(&line))?);
        }
        self.table = Table::from(rows);
        Ok(&self.table)
    }

    /// Async twin of [`CsvParser::parse`] over any `AsyncRead`.
    /// Lines end at `\n` or `\r\n` exactly as with `BufRead::lines`; a `\r`
    /// not followed by `\n` stays in the line. Input must be UTF-8 (see
    /// [`crate::build_line_reader`] for other charsets).
    pub async fn parse_reader<R, F>(&mut self, reader: R, mut factory: F) -> CsvResult<&Table<T>>
    where
        R: AsyncRead + Unpin,
        F: FnMut(Row) -> FactoryResult<T>,
    {
        let mut lines = BufReader::new(reader).lines();
        let mut rows = Vec::new();
        while let Some(line) = lines.next_line().await.map_err(|_| CsvError::Read)? {
            self.config.check_line(&line)?;
            rows.push(factory(split_line(&line))?);
        }
        self.table = Table::from(rows);
        Ok(&self.table)
    }

    pub fn table(&self) -> &Table<T> {
        &self.table
    }

    pub fn rows(&self) -> &[T] {
        self.table.rows()
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn into_table(self) -> Table<T> {
        self.table
    }
}

/// One-shot parse into a fresh table.
///
/// ```
/// use csv_search::{factory, parse_lines};
/// use std::io::{BufRead, Cursor};
///
/// let table = parse_lines(Cursor::new("a,\"b,c\",d\n").lines(), factory::identity).unwrap();
/// assert_eq!(table.rows(), &[vec!["a", "\"b,c\"", "d"]]);
/// ```
pub fn parse_lines<T, I, F>(lines: I, factory: F) -> CsvResult<Table<T>>
where
    I: IntoIterator<Item = std::io::Result<String>>,
    F: FnMut(Row) -> FactoryResult<T>,
{
    let mut parser = CsvParser::new();
    parser.parse(lines, factory)?;
    Ok(parser.into_table())
}
