use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use dsstorust::format::{write_human, write_jsonl};
use env_logger::{Builder, Env};
use log::{error, info};
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Output {
    /// Indented listing, one filename per block.
    Human,
    /// One JSON object per filename and line.
    Jsonl,
}

/// Print the records stored in a macOS .DS_Store file.
#[derive(Parser, Debug)]
#[command(name = "dsdump", version)]
struct Cli {
    /// File to read.
    #[arg(default_value = ".DS_Store")]
    path: PathBuf,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Output::Human)]
    output: Output,

    /// Exit with status 2 if any record had to be skipped.
    #[arg(long)]
    strict: bool,
}

fn init_logger() {
    // Warnings about the file go to stderr unless RUST_LOG says otherwise.
    Builder::from_env(Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let data = fs::read(&cli.path)
        .with_context(|| format!("read file '{}'", cli.path.display()))?;

    let store = dsstorust::parse(&data)
        .with_context(|| format!("parse '{}'", cli.path.display()))?;
    info!(
        "{} filenames, {} warnings",
        store.records().len(),
        store.warnings().len()
    );

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    match cli.output {
        Output::Human => write_human(store.records(), &mut out)?,
        Output::Jsonl => write_jsonl(store.records(), &mut out)?,
    }
    out.flush()?;

    let skipped = store.skipped_entries();
    if cli.strict && skipped > 0 {
        error!("{skipped} record(s) skipped");
        return Ok(ExitCode::from(2));
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    init_logger();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{e:?}");
            ExitCode::FAILURE
        }
    }
}
