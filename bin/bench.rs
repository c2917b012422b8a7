use clap::{Arg, ArgAction, Command};
use csv_search::{factory, source_from_path, search, CsvParser, Row, Table};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let matches = Command::new("bench")
        .arg(Arg::new("path").long("path").value_parser(clap::value_parser!(PathBuf)).required(true))
        .arg(Arg::new("value").long("value").help("Value to search for after parsing"))
        .arg(Arg::new("column").long("column").default_value("*"))
        .arg(Arg::new("headers").long("headers").action(ArgAction::SetTrue))
        .arg(Arg::new("verify").long("verify").help("Print a CRC32 fingerprint of the parsed table").action(ArgAction::SetTrue))
        .arg(Arg::new("fast-local").long("fast-local").help("Use mmap+parallel fast path for local uncompressed UTF-8 files (feature: fast_local)").action(ArgAction::SetTrue))
        .get_matches();

    let path = matches
        .get_one::<PathBuf>("path")
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Provide --path <file>"))?;

    let start = Instant::now();
    let table = parse(&path, matches.get_flag("fast-local")).await?;
    let elapsed = start.elapsed().as_secs_f64();
    let rps = (table.len() as f64) / elapsed;
    println!(
        "source={} rows={}\nparse elapsed={:.3}s rows/sec={:.0}",
        path.display(),
        table.len(),
        elapsed,
        rps
    );

    if matches.get_flag("verify") {
        println!("fingerprint=0x{:08x}", table.fingerprint());
    }

    if let Some(value) = matches.get_one::<String>("value") {
        let column = matches.get_one::<String>("column").map_or("*", String::as_str);
        let start = Instant::now();
        let found = search(table.rows(), matches.get_flag("headers"), value, column)?;
        let elapsed = start.elapsed().as_secs_f64();
        println!(
            "matches={} search elapsed={:.3}s rows/sec={:.0}",
            found.len(),
            elapsed,
            (table.len() as f64) / elapsed
        );
    }
    Ok(())
}

async fn parse(path: &std::path::Path, fast_local: bool) -> anyhow::Result<Table<Row>> {
    #[cfg(feature = "fast_local")]
    if fast_local && path.extension().and_then(|s| s.to_str()) == Some("csv") {
        info!("fast local path");
        return Ok(csv_search::parse_mmap(path, factory::identity)?);
    }
    #[cfg(not(feature = "fast_local"))]
    if fast_local {
        info!("built without feature fast_local; using the streaming path");
    }

    let (reader, meta) = source_from_path(path, encoding_rs::UTF_8).await?;
    info!(compression = ?meta.compression(), "streaming path");
    let mut parser = CsvParser::new();
    parser.parse_reader(reader, factory::identity).await?;
    Ok(parser.into_table())
}
