//! Single-line field splitting.
//!
//! A comma separates fields unless it sits after an odd number of `"` on the
//! line and another `"` still follows it. Quote characters are kept in the
//! field text. Lines are never joined, so a quoted field cannot span lines.
//!
//! Once a line has split at least once, trailing empty fields are dropped:
//! `a,b,` is `[a, b]` and `,,` is an empty row. A line with no split point,
//! blank lines included, is always one field.
use crate::factory::Row;

const DELIMITER: u8 = b',';
const QUOTE: u8 = b'"';

/// Split one physical line (without its terminator) into fields.
///
/// ```
/// use csv_search::split_line;
///
/// assert_eq!(split_line(r#"a,"b,c",d"#), vec!["a", "\"b,c\"", "d"]);
/// assert_eq!(split_line(""), vec![""]);
/// assert_eq!(split_line("a,b,"), vec!["a", "b"]);
/// assert!(split_line(",,").is_empty());
/// ```
pub fn split_line(line: &str) -> Row {
    let bytes = line.as_bytes();
    let mut quotes_left = bytes.iter().filter(|&&b| b == QUOTE).count();
    let mut quotes_seen = 0usize;
    let mut fields = Vec::new();
    let mut start = 0usize;

    // Both delimiter and quote are ASCII, so every split index is a char boundary.
    for (i, &b) in bytes.iter().enumerate() {
        match b {
            QUOTE => {
                quotes_seen += 1;
                quotes_left -= 1;
            }
            DELIMITER if quotes_seen % 2 == 0 || quotes_left == 0 => {
                fields.push(line[start..i].to_string());
                start = i + 1;
            }
            _ => {}
        }
    }
    if fields.is_empty() {
        return vec![line.to_string()];
    }
    fields.push(line[start..].to_string());
    while fields.last().is_some_and(String::is_empty) {
        fields.pop();
    }
    fields
}
