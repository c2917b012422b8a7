use bytes::Bytes;
use csv_search::{factory, parse_lines, split_line, CsvError, CsvParser, ParserConfig, Row};
use std::io::{self, BufRead, Cursor};
use tokio_util::io::StreamReader;

fn lines(text: &str) -> io::Lines<Cursor<String>> {
    Cursor::new(text.to_string()).lines()
}

fn rows(data: &[&[&str]]) -> Vec<Row> {
    data.iter()
        .map(|r| r.iter().map(|s| s.to_string()).collect())
        .collect()
}

const PEOPLE: &str = "ID,Name,Favorite Food,State,Country
1,Sarah,\"Vanilla, Strawberry\",NC,USA
2,Sara,\"Vanilla, \"Strawberry\"\",NM,USA
3,Sera,\"\"Vanilla\", \"Strawberry\"\",ND,USA
4,Amy,Chocolate,MN,USA,extra!
";

#[test]
fn quoted_commas_do_not_split_and_quotes_stay() {
    assert_eq!(split_line(r#"a,"b,c",d"#), vec!["a", "\"b,c\"", "d"]);

    let table = parse_lines(lines(PEOPLE), factory::identity).unwrap();
    assert_eq!(
        table.rows(),
        rows(&[
            &["ID", "Name", "Favorite Food", "State", "Country"],
            &["1", "Sarah", "\"Vanilla, Strawberry\"", "NC", "USA"],
            &["2", "Sara", "\"Vanilla, \"Strawberry\"\"", "NM", "USA"],
            &["3", "Sera", "\"\"Vanilla\", \"Strawberry\"\"", "ND", "USA"],
            &["4", "Amy", "Chocolate", "MN", "USA", "extra!"],
        ])
    );
}

#[test]
fn unbalanced_quote_does_not_protect_later_commas() {
    assert_eq!(split_line(r#"a,"b,c"#), vec!["a", "\"b", "c"]);
    assert_eq!(split_line(r#""x,y",z,"w"#), vec!["\"x,y\"", "z", "\"w"]);
}

#[test]
fn trailing_empty_fields_are_dropped() {
    assert_eq!(split_line("1,,282.4,"), vec!["1", "", "282.4"]);
    assert_eq!(split_line("a,b,"), vec!["a", "b"]);
    assert_eq!(split_line("a,,,"), vec!["a"]);
    assert_eq!(split_line(",a"), vec!["", "a"]);
    assert!(split_line(",,").is_empty());
    // no split point: the whole line is one field, even when blank
    assert_eq!(split_line(""), vec![""]);
    assert_eq!(split_line("   "), vec!["   "]);
}

#[test]
fn all_comma_line_fails_key_rest() {
    let err = parse_lines(lines("k,v\n,,\n"), factory::key_rest).unwrap_err();
    match err {
        CsvError::Factory(e) => {
            assert_eq!(e.to_string(), "Cannot parse an empty row into a pair");
            assert!(e.row.is_empty());
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn empty_input_has_no_rows_but_blank_lines_do() {
    let empty = parse_lines(lines(""), factory::identity).unwrap();
    assert!(empty.is_empty());

    let blank = parse_lines(lines("\n"), factory::identity).unwrap();
    assert_eq!(blank.rows(), rows(&[&[""]]));

    let mixed = parse_lines(lines("a\n\nb"), factory::identity).unwrap();
    assert_eq!(mixed.rows(), rows(&[&["a"], &[""], &["b"]]));
}

#[test]
fn crlf_lines_lose_their_terminator() {
    let table = parse_lines(lines("a,b\r\nc,d\r\n"), factory::identity).unwrap();
    assert_eq!(table.rows(), rows(&[&["a", "b"], &["c", "d"]]));
}

#[test]
fn lone_carriage_return_is_data_on_every_path() {
    let text = "a,b\r\nc,d\r";
    let expected = rows(&[&["a", "b"], &["c", "d\r"]]);
    let table = parse_lines(lines(text), factory::identity).unwrap();
    assert_eq!(table.rows(), expected);

    let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
    let mut parser = CsvParser::new();
    let table = runtime
        .block_on(parser.parse_reader(text.as_bytes(), factory::identity))
        .unwrap();
    assert_eq!(table.rows(), expected);
}

#[test]
fn rows_may_differ_in_length() {
    let table = parse_lines(
        lines("this,is,a,row\nhow,many,rows,will,there\nbe,in,total?"),
        factory::linked,
    )
    .unwrap();
    let lens: Vec<usize> = table.iter().map(|r| r.len()).collect();
    assert_eq!(lens, vec![4, 5, 3]);
}

#[test]
fn parsing_twice_gives_equal_tables() {
    let first = parse_lines(lines(PEOPLE), factory::identity).unwrap();
    let second = parse_lines(lines(PEOPLE), factory::identity).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.fingerprint(), second.fingerprint());

    let other = parse_lines(lines("ID,Name"), factory::identity).unwrap();
    assert_ne!(first.fingerprint(), other.fingerprint());
}

#[test]
fn parse_replaces_instead_of_appending() {
    let mut parser = CsvParser::new();
    parser.parse(lines("a,b\nc,d"), factory::identity).unwrap();
    assert_eq!(parser.rows().len(), 2);

    parser.parse(lines("e,f"), factory::identity).unwrap();
    assert_eq!(parser.rows(), rows(&[&["e", "f"]]));
}

#[test]
fn factory_failure_leaves_previous_table() {
    let mut parser = CsvParser::new();
    parser.parse(lines("k,v1,v2\nj,w"), factory::key_rest).unwrap();
    let before = parser.table().clone();

    let err = parser
        .parse(lines("x,1\ny,2\n\nz,3"), factory::key_rest)
        .unwrap_err();
    match err {
        CsvError::Factory(e) => {
            assert_eq!(e.to_string(), "Cannot parse an empty row into a pair");
            assert_eq!(e.row, vec![String::new()]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(parser.table(), &before);
}

#[test]
fn read_failure_hides_cause_and_keeps_table() {
    let mut parser = CsvParser::new();
    parser.parse(lines("a"), factory::identity).unwrap();

    let source = vec![
        Ok("b".to_string()),
        Err(io::Error::new(io::ErrorKind::Other, "disk on fire")),
    ];
    let err = parser.parse(source, factory::identity).unwrap_err();
    assert!(matches!(err, CsvError::Read));
    assert_eq!(err.to_string(), "Issue while reading the given Reader");
    assert_eq!(parser.rows(), rows(&[&["a"]]));
}

#[test]
fn overlong_line_is_a_read_failure() {
    let mut parser = CsvParser::with_config(ParserConfig {
        max_line_length: Some(4),
    });
    assert!(parser.parse(lines("abcd\nabcde"), factory::identity).is_err());
    assert!(parser.rows().is_empty());
    assert!(parser.parse(lines("abcd\nab"), factory::identity).is_ok());
}

#[test]
fn custom_closure_factory() {
    let table = parse_lines(lines("1,2,3\n4,5"), |row: Row| Ok(row.len())).unwrap();
    assert_eq!(table.rows(), &[3, 2]);
}

#[tokio::test]
async fn async_reader_matches_sync_parse() {
    let expected = parse_lines(lines(PEOPLE), factory::identity).unwrap();

    let mut parser = CsvParser::new();
    let table = parser
        .parse_reader(PEOPLE.as_bytes(), factory::identity)
        .await
        .unwrap();
    assert_eq!(table, &expected);

    let table = parser.parse_reader(&b""[..], factory::identity).await.unwrap();
    assert!(table.is_empty());
}

#[tokio::test]
async fn async_reader_errors_are_read_failures() {
    let mut parser = CsvParser::new();
    let bad_utf8 = parser
        .parse_reader(&b"a,\xff\n"[..], factory::identity)
        .await
        .unwrap_err();
    assert!(matches!(bad_utf8, CsvError::Read));

    let chunks = futures::stream::iter(vec![
        Ok(Bytes::from_static(b"a,b\n")),
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone")),
    ]);
    let err = parser
        .parse_reader(StreamReader::new(chunks), factory::identity)
        .await
        .unwrap_err();
    assert!(matches!(err, CsvError::Read));
    assert!(parser.rows().is_empty());
}
