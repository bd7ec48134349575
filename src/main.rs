use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use dsfeed::options::DEFAULT_BATCH_SIZE;
use dsfeed::{open_with_options, ReaderOptions};

/// Check if an error is a broken pipe (EPIPE), e.g. when piping into `head`.
fn is_broken_pipe(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::BrokenPipe
}

/// Inspect columnar files through the benchmark row reader
#[derive(Parser, Debug)]
#[command(name = "dsfeed", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print column names and their encodings
    Schema(SchemaArgs),

    /// Print rows starting at an offset
    Head(HeadArgs),

    /// Count the rows the reader produces
    Count(CountArgs),
}

#[derive(Parser, Debug)]
struct SchemaArgs {
    /// Parquet file
    input: PathBuf,
}

#[derive(Parser, Debug)]
struct HeadArgs {
    /// Parquet file
    input: PathBuf,

    /// Number of rows to print
    #[arg(short = 'n', long, default_value_t = 10)]
    rows: u64,

    /// Rows to skip before printing
    #[arg(long, default_value_t = 0)]
    offset: u64,

    /// Wrap around to the first row when the file runs out
    #[arg(long)]
    circular: bool,

    /// Rows per decoded batch
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,
}

#[derive(Parser, Debug)]
struct CountArgs {
    /// Parquet file
    input: PathBuf,

    /// Rows per decoded batch
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Schema(args) => run_schema(args),
        Commands::Head(args) => run_head(args),
        Commands::Count(args) => run_count(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_schema(args: SchemaArgs) -> Result<(), Box<dyn std::error::Error>> {
    let source = dsfeed::open(&args.input, 0, false)?;

    let mut out = BufWriter::new(io::stdout().lock());
    for (name, encoding) in source.column_names().iter().zip(source.encodings()) {
        writeln!(out, "{}\t{}", name, encoding)?;
    }
    out.flush()?;
    Ok(())
}

fn run_head(args: HeadArgs) -> Result<(), Box<dyn std::error::Error>> {
    let options = ReaderOptions::default()
        .with_start_offset(args.offset)
        .with_circular(args.circular)
        .with_batch_size(args.batch_size);
    let mut source = open_with_options(&args.input, &options)?;

    let mut out = BufWriter::new(io::stdout().lock());
    let header = source.column_names().join("\t");

    let result = (|| -> Result<(), Box<dyn std::error::Error>> {
        writeln!(out, "{}", header)?;
        for _ in 0..args.rows {
            let Some(row) = source.next_row()? else {
                break;
            };
            let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            writeln!(out, "{}", line.join("\t"))?;
        }
        out.flush()?;
        Ok(())
    })();
    source.close();

    match result {
        Err(e) if e.downcast_ref::<io::Error>().is_some_and(is_broken_pipe) => Ok(()),
        other => other,
    }
}

fn run_count(args: CountArgs) -> Result<(), Box<dyn std::error::Error>> {
    let options = ReaderOptions::default().with_batch_size(args.batch_size);
    let mut source = open_with_options(&args.input, &options)?;

    let mut count: u64 = 0;
    while source.next_row()?.is_some() {
        count += 1;
    }
    source.close();

    println!("{}", count);
    Ok(())
}
