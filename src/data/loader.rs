use std::collections::{BTreeSet, HashMap};
use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::util::display::array_value_to_string;
use log::{debug, info, warn};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use crate::config::ColumnNames;

use super::model::{CellValue, CompoundRow, ExperimentTable, RawTable};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load every comparison found in the given files, in argument order.
///
/// Experiments are labelled by file name, or by the full path when two
/// inputs share a file name.
pub fn load_experiments(paths: &[impl AsRef<Path>], columns: &ColumnNames) -> Result<Vec<ExperimentTable>> {
    let mut name_counts: HashMap<&OsStr, usize> = HashMap::new();
    for path in paths {
        if let Some(name) = path.as_ref().file_name() {
            *name_counts.entry(name).or_default() += 1;
        }
    }

    let mut experiments = Vec::new();
    for path in paths {
        let path = path.as_ref();
        let raw = load_file(path).with_context(|| format!("loading {}", path.display()))?;
        let label = match path.file_name() {
            Some(name) if name_counts.get(name) == Some(&1) => name.to_string_lossy().into_owned(),
            _ => path.display().to_string(),
        };
        let tables = experiments_from_raw(&label, &raw, columns)
            .with_context(|| format!("reading comparisons from {}", path.display()))?;
        info!(
            "{}: {} rows, {} comparison(s)",
            path.display(),
            raw.rows.len(),
            tables.len()
        );
        experiments.extend(tables);
    }
    Ok(experiments)
}

/// Load a raw table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.parquet` – flat Parquet file, one column per field (recommended)
/// * `.json`    – `[{ "Compounds ID": "...", "Log2 Fold Change: (a) / (b)": 1.2, ... }, ...]`
/// * `.csv`     – header row plus one compound per line; UTF-8 or ISO-8859-1
pub fn load_file(path: &Path) -> Result<RawTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// Comparison discovery
// ---------------------------------------------------------------------------

/// A fold-change / p-value column pair sharing one comparison label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparisonColumns {
    pub label: String,
    pub fold_change_idx: usize,
    pub p_value_idx: usize,
}

/// Find every `"{fc_prefix}{label}"` header with a matching
/// `"{p_prefix}{label}"` header, in header order.
pub fn find_comparisons(headers: &[String], columns: &ColumnNames) -> Vec<ComparisonColumns> {
    headers
        .iter()
        .enumerate()
        .filter_map(|(fc_idx, header)| {
            let label = header.strip_prefix(&columns.fold_change_prefix)?;
            let p_header = format!("{}{}", columns.p_value_prefix, label);
            let p_idx = headers.iter().position(|h| *h == p_header)?;
            Some(ComparisonColumns {
                label: label.to_string(),
                fold_change_idx: fc_idx,
                p_value_idx: p_idx,
            })
        })
        .collect()
}

/// Split a raw table into one [`ExperimentTable`] per comparison.
///
/// Rows without a compound id or without a numeric fold change / p-value
/// are dropped from that comparison. A repeated id keeps its first row,
/// unless that row is unflagged and a later one is flagged.
pub fn experiments_from_raw(file_label: &str, raw: &RawTable, columns: &ColumnNames) -> Result<Vec<ExperimentTable>> {
    let id_idx = raw
        .column_index(&columns.compound_id)
        .with_context(|| format!("missing '{}' column", columns.compound_id))?;
    let name_idx = raw.column_index(&columns.name);
    let mw_idx = raw.column_index(&columns.calc_mw);
    let flag_idx = raw.column_index(&columns.flag);
    if flag_idx.is_none() {
        warn!(
            "{file_label}: no '{}' column, treating every row as flagged",
            columns.flag
        );
    }

    let comparisons = find_comparisons(&raw.headers, columns);
    if comparisons.is_empty() {
        bail!(
            "no '{}…' / '{}…' column pair found",
            columns.fold_change_prefix,
            columns.p_value_prefix
        );
    }

    let mut experiments = Vec::with_capacity(comparisons.len());
    for cmp in &comparisons {
        let experiment_id = if comparisons.len() == 1 {
            file_label.to_string()
        } else {
            format!("{file_label} [{}]", cmp.label)
        };

        let mut rows: Vec<CompoundRow> = Vec::with_capacity(raw.rows.len());
        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut dropped = 0usize;

        for row_no in 0..raw.rows.len() {
            let Some(compound_id) = raw.cell(row_no, id_idx).as_text() else {
                dropped += 1;
                continue;
            };
            let fold_change = raw.cell(row_no, cmp.fold_change_idx).as_f64();
            let p_value = raw.cell(row_no, cmp.p_value_idx).as_f64();
            let (Some(fold_change), Some(p_value)) = (fold_change, p_value) else {
                debug!("{experiment_id}: row {row_no} ({compound_id}) has no numeric fold change / p-value");
                dropped += 1;
                continue;
            };
            if fold_change.is_nan() || p_value.is_nan() {
                dropped += 1;
                continue;
            }
            let flagged = match flag_idx {
                Some(idx) => {
                    let cell = raw.cell(row_no, idx);
                    cell.as_flag().unwrap_or_else(|| {
                        warn!("{experiment_id}: unrecognised flag value '{cell}' for '{compound_id}', treating as unflagged");
                        false
                    })
                }
                None => true,
            };

            let row = CompoundRow {
                compound_id,
                name: name_idx.and_then(|i| raw.cell(row_no, i).as_text()),
                calc_mw: mw_idx.and_then(|i| raw.cell(row_no, i).as_f64()),
                fold_change,
                p_value,
                flagged,
            };

            match seen.get(&row.compound_id) {
                Some(&i) if !rows[i].flagged && row.flagged => {
                    warn!(
                        "{experiment_id}: duplicate compound id '{}' at row {row_no}, keeping this flagged row",
                        row.compound_id
                    );
                    rows[i] = row;
                }
                Some(_) => {
                    warn!(
                        "{experiment_id}: duplicate compound id '{}' at row {row_no}, keeping the first",
                        row.compound_id
                    );
                }
                None => {
                    seen.insert(row.compound_id.clone(), rows.len());
                    rows.push(row);
                }
            }
        }

        if dropped > 0 {
            warn!("{experiment_id}: dropped {dropped} row(s) with missing id or non-numeric values");
        }
        experiments.push(ExperimentTable::new(experiment_id, rows));
    }

    Ok(experiments)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "Compounds ID": "C0001",
///     "Name": "Glucose",
///     "Checked": true,
///     "Log2 Fold Change: (a) / (b)": 1.25,
///     "P-value: (a) / (b)": 0.003
///   },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut headers: Vec<String> = Vec::new();
    let mut known: BTreeSet<String> = BTreeSet::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if known.insert(key.clone()) {
                headers.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(|rec| rec.as_object())
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).map(json_to_cell).unwrap_or(CellValue::Null))
                .collect()
        })
        .collect();

    Ok(RawTable { headers, rows })
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one compound per record.
/// Files exported by vendor software are often ISO-8859-1; anything that is
/// not valid UTF-8 is decoded as Latin-1.
fn load_csv(path: &Path) -> Result<RawTable> {
    let bytes = std::fs::read(path).context("reading CSV file")?;
    let text = decode_text(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(clean_header)
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(record.iter().map(guess_cell_type).collect());
    }

    Ok(RawTable { headers, rows })
}

fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(mut text) => {
            if text.starts_with('\u{feff}') {
                text.remove(0);
            }
            text
        }
        Err(err) => {
            debug!("input is not UTF-8, decoding as ISO-8859-1");
            err.into_bytes().iter().map(|&b| b as char).collect()
        }
    }
}

fn clean_header(h: &str) -> String {
    h.trim().replace('"', "")
}

fn guess_cell_type(s: &str) -> CellValue {
    let s = s.trim();
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    match s.to_ascii_lowercase().as_str() {
        "true" => return CellValue::Bool(true),
        "false" => return CellValue::Bool(false),
        _ => {}
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat Parquet file (one scalar column per field).
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            rows.push(
                batch
                    .columns()
                    .iter()
                    .map(|col| extract_cell(col, row))
                    .collect(),
            );
        }
    }

    Ok(RawTable { headers, rows })
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Utf8View => CellValue::String(col.as_string_view().value(row).to_string()),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        // Dictionaries (pandas categoricals), dates, decimals, ...
        other => match array_value_to_string(col, row) {
            Ok(text) => CellValue::String(text),
            Err(err) => {
                warn!("cannot read parquet {other:?} cell at row {row}: {err}");
                CellValue::Null
            }
        },
    }
}
