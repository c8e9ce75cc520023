//! Binary entrypoint for the blackbox log decoder CLI.
//!
//! Decodes one log file to CSV, written next to the input as
//! `<stem>.01.csv`, and reports decode statistics when done.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info, warn};

use bbdecode::blackbox::{Frame, LogReader, ReaderOptions};
use bbdecode::export::CsvExporter;

#[derive(Parser)]
#[command(name = "bbdecode")]
#[command(about = "Decode blackbox flight recorder logs to CSV")]
#[command(version)]
struct Cli {
    /// Path to the blackbox log file
    log: PathBuf,

    /// Don't apply predictions to fields (show raw field deltas)
    #[arg(long)]
    raw: bool,

    /// Show extra debugging information
    #[arg(long)]
    debug: bool,

    /// Verbose logging (-v, -vv for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let input = File::open(&cli.log)
        .with_context(|| format!("could not open log file {}", cli.log.display()))?;
    let mut reader = LogReader::new(input, ReaderOptions { raw: cli.raw })
        .with_context(|| format!("could not parse headers of {}", cli.log.display()))?;
    info!(
        "decoding {} ({}, data version {})",
        cli.log.display(),
        reader.definition().product,
        reader.definition().data_version
    );

    let csv_path = output_path(&cli.log);
    let csv_file = File::create(&csv_path)
        .with_context(|| format!("could not create {}", csv_path.display()))?;
    let mut out = BufWriter::new(csv_file);

    let mut exporter = CsvExporter::new(&mut out, reader.definition());
    exporter.write_headers()?;

    loop {
        let frame = reader.next_frame();
        match frame.error() {
            Some(err) if err.is_eof() && frame.size() == 0 => break,
            Some(err) if err.is_fatal() => {
                error!("read failed at offset {}: {err}", frame.start());
                anyhow::bail!("read error in {}: {err}", cli.log.display());
            }
            Some(err) => {
                warn!(
                    "skipping {} bytes at offset {}: {err}",
                    frame.size(),
                    frame.start()
                );
            }
            None => {
                if cli.debug {
                    if let Frame::Event(event) = &frame {
                        info!(
                            "event at offset {}: {}",
                            event.start,
                            serde_json::to_string(&event.values)?
                        );
                    }
                }
            }
        }
        exporter.write_frame(&frame)?;
    }

    let frames_written = exporter.frames_written();
    drop(exporter);
    out.flush()?;
    info!("wrote {frames_written} frames to {}", csv_path.display());

    let stats = reader.stats();
    info!(
        "{} frames ({} corrupted), {} bytes, {} intentionally absent iterations",
        stats.total_frames,
        stats.total_corrupted_frames,
        stats.total_bytes,
        stats.intentionally_absent_iterations
    );
    if cli.debug {
        println!("{}", serde_json::to_string_pretty(stats)?);
    }

    Ok(())
}

/// Decoded output lands next to the input as `<stem>.01.csv`.
fn output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("log");
    input.with_file_name(format!("{stem}.01.csv"))
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);
    builder.format(|fmt, record| {
        writeln!(
            fmt,
            "{} [{}] {}",
            chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
            record.level(),
            record.args()
        )
    });
    let _ = builder.try_init();
}
