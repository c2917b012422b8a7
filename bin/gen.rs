use clap::{Arg, Command};
use std::io::{self, Write};

fn main() -> anyhow::Result<()> {
    let matches = Command::new("gen")
        .arg(
            Arg::new("rows")
                .long("rows")
                .value_parser(clap::value_parser!(u64))
                .required(true),
        )
        .arg(
            Arg::new("with_header")
                .long("with-header")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quoted")
                .long("quoted")
                .help("Make the last column a quoted field with an embedded comma")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("cols")
                .long("cols")
                .value_parser(clap::value_parser!(usize))
                .default_value("3"),
        )
        .get_matches();

    let rows: u64 = matches.get_one::<u64>("rows").copied().unwrap_or_default();
    let with_header = matches.get_flag("with_header");
    let quoted = matches.get_flag("quoted");
    let cols: usize = matches.get_one::<usize>("cols").copied().unwrap_or(3).max(1);

    let mut out = io::BufWriter::new(io::stdout().lock());

    if with_header {
        write!(&mut out, "id")?;
        for i in 1..cols {
            write!(&mut out, ",col{i}")?;
        }
        writeln!(&mut out)?;
    }

    // id, v1_<row>, v2_<row>, ... and optionally "note <row>, x" last
    for i in 0..rows {
        write!(&mut out, "ID{i:010}")?;
        for c in 1..cols {
            if quoted && c == cols - 1 {
                write!(&mut out, ",\"note {i}, v{c}\"")?;
            } else {
                write!(&mut out, ",v{c}_{i}")?;
            }
        }
        writeln!(&mut out)?;
        if i % 10_000 == 0 {
            out.flush()?;
        }
    }

    out.flush()?;
    Ok(())
}
