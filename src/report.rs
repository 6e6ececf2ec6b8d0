use std::fmt::Write as _;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Serialize;

use crate::rank::RankedReport;

// ---------------------------------------------------------------------------
// Report writers
// ---------------------------------------------------------------------------

/// CSV record layout of the ranked report.
#[derive(Debug, Serialize)]
struct CsvRecord<'a> {
    #[serde(rename = "Name")]
    name: &'a str,
    #[serde(rename = "Total Distance")]
    total_distance: f64,
    #[serde(rename = "Outlier Detected In")]
    outlier_detected_in: &'a str,
    #[serde(rename = "Samples")]
    samples: usize,
}

/// Write the report to a file.  Dispatch by extension (`.csv` or `.json`).
pub fn write_report(report: &RankedReport, path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    if ext != "csv" && ext != "json" {
        bail!("Unsupported report extension: .{ext}");
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    let written = if ext == "csv" {
        write_csv(report, file)
    } else {
        write_json(report, file)
    };
    written.with_context(|| format!("writing {}", path.display()))
}

/// Ranked entries as CSV, one compound per line, best first.
pub fn write_csv<W: Write>(report: &RankedReport, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for entry in &report.entries {
        csv_writer.serialize(CsvRecord {
            name: &entry.display_name,
            total_distance: entry.consensus_distance,
            outlier_detected_in: entry.outlier_experiment_id.as_deref().unwrap_or(""),
            samples: entry.samples,
        })?;
    }
    csv_writer.flush().context("flushing CSV")?;
    Ok(())
}

/// The whole report, experiment summaries included, as pretty JSON.
pub fn write_json<W: Write>(report: &RankedReport, mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, report).context("serializing report")?;
    writeln!(writer)?;
    Ok(())
}

/// Plain-text table for the terminal.
pub fn render_table(report: &RankedReport) -> String {
    let name_width = report
        .entries
        .iter()
        .map(|e| e.display_name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Name".len());

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>4}  {:<name_width$}  {:>14}  Outlier Detected In",
        "#", "Name", "Total Distance"
    );
    for e in &report.entries {
        let _ = writeln!(
            out,
            "{:>4}  {:<name_width$}  {:>14.4}  {}",
            e.rank,
            e.display_name,
            e.consensus_distance,
            e.outlier_experiment_id.as_deref().unwrap_or("")
        );
    }
    let _ = writeln!(
        out,
        "({} of {} compounds, {} experiments)",
        report.entries.len(),
        report.compounds,
        report.experiments.len()
    );
    out
}
