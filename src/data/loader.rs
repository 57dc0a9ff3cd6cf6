use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::util::display::array_value_to_string;
use indexmap::IndexSet;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{
    CellValue, MovieRecord, RawTable, COL_BUDGET, COL_GENRES, COL_ORIGINAL_LANGUAGE,
    COL_POPULARITY, COL_PRODUCTION_COMPANIES, COL_RELEASE_DATE, COL_TITLE, COL_VOTE_AVERAGE,
    REQUIRED_COLUMNS,
};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a dataset could not be loaded. Never fatal to the caller: the UI
/// reports it and keeps running without a table.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("dataset file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("could not parse {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a movie table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, comma-delimited, UTF-8 (the TMDB export)
/// * `.json`    – `[{ "title": ..., "genres": ..., ... }, ...]`
/// * `.parquet` – flat scalar columns
pub fn load_file(path: &Path) -> Result<RawTable, LoadError> {
    if let Err(e) = std::fs::metadata(path) {
        if e.kind() == io::ErrorKind::NotFound {
            return Err(LoadError::NotFound {
                path: path.to_path_buf(),
            });
        }
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(anyhow::anyhow!("unsupported file extension: .{other}")),
    };

    parsed.map_err(|e| LoadError::Parse {
        path: path.to_path_buf(),
        reason: format!("{e:#}"),
    })
}

// ---------------------------------------------------------------------------
// Column layout shared by every format
// ---------------------------------------------------------------------------

/// Where each known column sits in a row of cells.
struct ColumnLayout {
    title: usize,
    genres: usize,
    vote_average: usize,
    popularity: usize,
    original_language: Option<usize>,
    release_date: Option<usize>,
    budget: Option<usize>,
    production_companies: Option<usize>,
    extras: Vec<(usize, String)>,
}

impl ColumnLayout {
    fn from_columns(columns: &[String]) -> Result<Self> {
        let mut seen: IndexSet<&str> = IndexSet::new();
        for c in columns {
            if !seen.insert(c.as_str()) {
                bail!("duplicate column '{c}'");
            }
        }

        let find = |name: &str| columns.iter().position(|c| c == name);

        for required in REQUIRED_COLUMNS {
            if find(required).is_none() {
                bail!("missing required column '{required}'");
            }
        }
        let required = |name: &str| find(name).context("missing required column");

        let known = [
            COL_TITLE,
            COL_GENRES,
            COL_VOTE_AVERAGE,
            COL_POPULARITY,
            COL_ORIGINAL_LANGUAGE,
            COL_RELEASE_DATE,
            COL_BUDGET,
            COL_PRODUCTION_COMPANIES,
        ];
        let extras = columns
            .iter()
            .enumerate()
            .filter(|(_, c)| !known.contains(&c.as_str()))
            .map(|(i, c)| (i, c.clone()))
            .collect();

        Ok(ColumnLayout {
            title: required(COL_TITLE)?,
            genres: required(COL_GENRES)?,
            vote_average: required(COL_VOTE_AVERAGE)?,
            popularity: required(COL_POPULARITY)?,
            original_language: find(COL_ORIGINAL_LANGUAGE),
            release_date: find(COL_RELEASE_DATE),
            budget: find(COL_BUDGET),
            production_companies: find(COL_PRODUCTION_COMPANIES),
            extras,
        })
    }

    fn record(&self, cells: &[CellValue], row: usize) -> Result<MovieRecord> {
        let cell = |idx: usize| cells.get(idx).unwrap_or(&CellValue::Null);
        let text = |idx: Option<usize>| idx.and_then(|i| cell(i).as_text());
        let number = |idx: Option<usize>, col: &str| match idx {
            Some(i) => parse_number(cell(i), row, col),
            None => Ok(None),
        };

        let genres = match cell(self.genres) {
            CellValue::String(s) => Some(s.clone()),
            _ => None,
        };

        let extra = self
            .extras
            .iter()
            .map(|(i, name)| (name.clone(), cell(*i).clone()))
            .collect::<BTreeMap<_, _>>();

        Ok(MovieRecord {
            title: cell(self.title).as_text().unwrap_or_default(),
            genres,
            vote_average: number(Some(self.vote_average), COL_VOTE_AVERAGE)?,
            popularity: number(Some(self.popularity), COL_POPULARITY)?,
            original_language: text(self.original_language),
            release_date: text(self.release_date),
            budget: number(self.budget, COL_BUDGET)?,
            production_companies: text(self.production_companies),
            extra,
        })
    }
}

fn parse_number(cell: &CellValue, row: usize, col: &str) -> Result<Option<f64>> {
    match cell {
        CellValue::Null => Ok(None),
        CellValue::Integer(_) | CellValue::Float(_) => Ok(cell.as_f64()),
        CellValue::String(s) if s.trim().is_empty() => Ok(None),
        CellValue::String(s) => {
            let v = s
                .trim()
                .parse::<f64>()
                .with_context(|| format!("row {row}, column '{col}': '{s}' is not a number"))?;
            Ok((!v.is_nan()).then_some(v))
        }
        CellValue::Bool(b) => bail!("row {row}, column '{col}': '{b}' is not a number"),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one movie per line.
/// Cells stay verbatim text; only the numeric movie columns are parsed,
/// in [`ColumnLayout::record`].
fn load_csv(path: &Path) -> Result<RawTable> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let columns: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let layout = ColumnLayout::from_columns(&columns)?;
    let mut records = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        let cells: Vec<CellValue> = record
            .iter()
            .map(|value| {
                if value.is_empty() {
                    CellValue::Null
                } else {
                    CellValue::String(value.to_string())
                }
            })
            .collect();

        records.push(layout.record(&cells, row_no)?);
    }

    Ok(RawTable { columns, records })
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "title": "Heat", "genres": "['Crime', 'Drama']", "vote_average": 7.9, ... },
///   ...
/// ]
/// ```
///
/// Columns are the union of all object keys in order of first appearance
/// (`serde_json` keeps key order with `preserve_order`); a key missing from
/// one object is a null cell.
fn load_json(path: &Path) -> Result<RawTable> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let rows = root.as_array().context("expected top-level JSON array")?;

    let mut objects = Vec::with_capacity(rows.len());
    let mut keys: IndexSet<String> = IndexSet::new();
    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .with_context(|| format!("row {i} is not a JSON object"))?;
        keys.extend(obj.keys().cloned());
        objects.push(obj);
    }

    let columns: Vec<String> = keys.into_iter().collect();
    let layout = ColumnLayout::from_columns(&columns)?;

    let records = objects
        .iter()
        .enumerate()
        .map(|(i, obj)| {
            let cells: Vec<CellValue> = columns
                .iter()
                .map(|c| obj.get(c).map(json_to_cell).unwrap_or(CellValue::Null))
                .collect();
            layout.record(&cells, i)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(RawTable { columns, records })
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
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one scalar column per field, as written by
/// `df.to_parquet()` (Pandas) or `df.write_parquet()` (Polars).
fn load_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;

    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let layout = ColumnLayout::from_columns(&columns)?;

    let reader = builder.build().context("building parquet reader")?;
    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let cells: Vec<CellValue> = batch
                .columns()
                .iter()
                .map(|col| extract_cell(col, row))
                .collect::<Result<_>>()?;
            let row_no = records.len();
            records.push(layout.record(&cells, row_no)?);
        }
    }

    Ok(RawTable { columns, records })
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    let cell = match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        // Dates, timestamps, lists: keep Arrow's textual rendering.
        other => CellValue::String(
            array_value_to_string(col.as_ref(), row)
                .with_context(|| format!("row {row}: cannot render {other:?} value"))?,
        ),
    };
    Ok(cell)
}
