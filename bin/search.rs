use anyhow::{anyhow, Context};
use clap::{Arg, ArgAction, Command};
use csv_async::AsyncWriterBuilder;
use csv_search::{factory, source_from_path, ColumnRef, CsvError, CsvParser, Row, TableSearcher};
use serde::Serialize;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Serialize)]
#[serde(untagged)]
enum Envelope<'a> {
    Success {
        result: &'static str,
        data: Vec<&'a Row>,
    },
    Failure {
        result: &'static str,
        error_message: String,
    },
}

impl<'a> Envelope<'a> {
    fn success(data: Vec<&'a Row>) -> Self {
        Envelope::Success {
            result: "success",
            data,
        }
    }

    fn failure(result: &'static str, error_message: impl Into<String>) -> Self {
        Envelope::Failure {
            result,
            error_message: error_message.into(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("csv-search")
        .about("Print the rows of a CSV file holding an exact value")
        .arg(Arg::new("path").required(true).value_parser(clap::value_parser!(PathBuf)))
        .arg(Arg::new("value").required(true))
        .arg(Arg::new("headers").long("headers").help("First row is a header row").action(ArgAction::SetTrue))
        .arg(Arg::new("column").long("column").help("Column index, header name, or * for all columns").default_value("*"))
        .arg(Arg::new("format").long("format").value_parser(["csv", "json"]).default_value("csv"))
        .arg(Arg::new("encoding").long("encoding").help("Charset label of the file, e.g. latin1").default_value("utf-8"))
        .arg(Arg::new("fast-local").long("fast-local").help("Use mmap+parallel fast path for local uncompressed UTF-8 files (feature: fast_local)").action(ArgAction::SetTrue))
        .get_matches();

    let path = matches.get_one::<PathBuf>("path").cloned().unwrap_or_default();
    let value = matches.get_one::<String>("value").cloned().unwrap_or_default();
    let has_headers = matches.get_flag("headers");
    let column = ColumnRef::parse(matches.get_one::<String>("column").map_or("*", String::as_str));
    let json = matches.get_one::<String>("format").map(String::as_str) == Some("json");
    let label = matches.get_one::<String>("encoding").map_or("utf-8", String::as_str);
    let charset = encoding_rs::Encoding::for_label(label.as_bytes())
        .ok_or_else(|| anyhow!("unknown encoding label: {label}"))?;

    let rows = match load(&path, charset, matches.get_flag("fast-local")).await {
        Ok(rows) => rows,
        Err(CsvError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound && json => {
            return emit_json(&Envelope::failure("error_datasource", "File not found")).await;
        }
        Err(e) if json => {
            return emit_json(&Envelope::failure("error_bad_request", e.to_string())).await;
        }
        Err(CsvError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(anyhow!("No file found at path {}", path.display()));
        }
        Err(e) => return Err(e.into()),
    };
    info!(source = %path.display(), rows = rows.len(), "parsed");

    let found = match TableSearcher::new(&rows).search(has_headers, &value, &column) {
        Ok(found) => found,
        Err(e) if json => {
            return emit_json(&Envelope::failure("error_bad_request", e.to_string())).await;
        }
        Err(e) => return Err(e.into()),
    };

    if found.is_empty() {
        let scope = match &column {
            ColumnRef::All => "any column".to_string(),
            other => format!("column {other}"),
        };
        warn!("No rows found with value {value} in {scope}");
    }

    if json {
        emit_json(&Envelope::success(found)).await
    } else {
        emit_csv(&found).await
    }
}

async fn load(
    path: &std::path::Path,
    charset: &'static encoding_rs::Encoding,
    fast_local: bool,
) -> Result<Vec<Row>, CsvError> {
    #[cfg(feature = "fast_local")]
    if fast_local
        && charset == encoding_rs::UTF_8
        && path.extension().and_then(|s| s.to_str()) == Some("csv")
    {
        return Ok(csv_search::parse_mmap(path, factory::identity)?.into_rows());
    }
    #[cfg(not(feature = "fast_local"))]
    if fast_local {
        warn!("built without feature fast_local; using the streaming path");
    }

    let (reader, _meta) = source_from_path(path, charset).await?;
    let mut parser = CsvParser::new();
    parser.parse_reader(reader, factory::identity).await?;
    Ok(parser.into_table().into_rows())
}

async fn emit_json(envelope: &Envelope<'_>) -> anyhow::Result<()> {
    let mut out = serde_json::to_vec(envelope).context("serialize response")?;
    out.push(b'\n');
    let mut stdout = tokio::io::stdout();
    stdout.write_all(&out).await?;
    stdout.flush().await?;
    Ok(())
}

async fn emit_csv(rows: &[&Row]) -> anyhow::Result<()> {
    let mut wri = AsyncWriterBuilder::new()
        .flexible(true)
        .create_writer(tokio::io::stdout());
    for row in rows {
        wri.write_record(row.iter()).await?;
    }
    wri.flush().await?;
    Ok(())
}
