//! Result output.

use std::io::Write;

use crate::error::BenchError;
use crate::workload::BenchResult;

/// Header line of the CSV output.
pub const CSV_HEADER: &str = "benchmark,producers,consumers,items,duration_ms";

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    Csv,
    Json,
}

pub fn write_csv<W: Write>(mut out: W, results: &[BenchResult]) -> Result<(), BenchError> {
    writeln!(out, "{}", CSV_HEADER)?;
    for result in results {
        writeln!(out, "{}", result.csv_row())?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_json<W: Write>(mut out: W, results: &[BenchResult]) -> Result<(), BenchError> {
    serde_json::to_writer_pretty(&mut out, results)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

pub fn write_results<W: Write>(
    out: W,
    format: Format,
    results: &[BenchResult],
) -> Result<(), BenchError> {
    match format {
        Format::Csv => write_csv(out, results),
        Format::Json => write_json(out, results),
    }
}
