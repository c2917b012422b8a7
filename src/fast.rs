use crate::factory::{FactoryResult, Row};
use crate::parser::Table;
use crate::split::split_line;
use crate::{CsvError, CsvResult};
use memchr::{memchr, memchr_iter};
use memmap2::MmapOptions;
use std::fs::File;
use std::path::Path;
use std::thread;

const LINE_BREAK: u8 = b'\n';

/// Fast local parse for uncompressed UTF-8 files using mmap and parallel
/// splitting. Produces the same table as the streaming path: chunks are cut
/// on line breaks, rows keep file order, and the factory runs on one thread so
/// the first bad row in file order is the one reported.
pub fn parse_mmap<T, F>(path: &Path, mut factory: F) -> CsvResult<Table<T>>
where
    F: FnMut(Row) -> FactoryResult<T>,
{
    let file = File::open(path)?;
    let len = file.metadata()?.len() as usize;
    if len == 0 {
        return Ok(Table::new());
    }
    // SAFETY: the map is read-only and dropped before we return.
    let mmap = unsafe { MmapOptions::new().map(&file)? };
    let data: &[u8] = &mmap[..];

    let bounds = chunk_bounds(data, num_cpus::get().max(1));
    let chunks = thread::scope(|s| {
        let handles: Vec<_> = bounds
            .windows(2)
            .map(|w| {
                let slice = &data[w[0]..w[1]];
                s.spawn(move || split_chunk(slice))
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|p| std::panic::resume_unwind(p)))
            .collect::<Vec<_>>()
    });

    let mut rows = Vec::with_capacity(chunks.iter().map(|c| c.as_ref().map_or(0, Vec::len)).sum());
    for chunk in chunks {
        for row in chunk? {
            rows.push(factory(row)?);
        }
    }
    Ok(Table::from(rows))
}

/// Byte offsets `[0, .., len]` where every inner offset starts a line.
fn chunk_bounds(data: &[u8], parts: usize) -> Vec<usize> {
    let len = data.len();
    let approx = (len / parts).max(1);
    let mut bounds = vec![0];
    let mut pos = approx;
    while pos < len {
        match memchr(LINE_BREAK, &data[pos..]) {
            Some(off) => {
                let next = pos + off + 1;
                if next < len {
                    bounds.push(next);
                }
                pos = next + approx;
            }
            None => break,
        }
    }
    bounds.push(len);
    bounds
}

fn split_chunk(slice: &[u8]) -> CsvResult<Vec<Row>> {
    let mut rows = Vec::new();
    let mut cursor = 0usize;
    for nl in memchr_iter(LINE_BREAK, slice) {
        let line = &slice[cursor..nl];
        rows.push(split_raw(line.strip_suffix(b"\r").unwrap_or(line))?);
        cursor = nl + 1;
    }
    // only the final chunk can end without a line break; a lone `\r` there is data
    if cursor < slice.len() {
        rows.push(split_raw(&slice[cursor..])?);
    }
    Ok(rows)
}

fn split_raw(line: &[u8]) -> CsvResult<Row> {
    let line = std::str::from_utf8(line).map_err(|_| CsvError::Read)?;
    Ok(split_line(line))
}
