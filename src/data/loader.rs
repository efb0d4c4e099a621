use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use calamine::{open_workbook_auto, Data, Reader};

use super::model::{ExamDataset, Record, Subject, ID_COLUMN};
use super::regions::RegionTable;
use crate::error::ExamError;

/// Accepted spellings of the identifier column header.
const ID_ALIASES: &[&str] = &[ID_COLUMN, "SBD"];

const MIN_SCORE: f64 = 0.0;
const MAX_SCORE: f64 = 10.0;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Read every file and concatenate their rows, preserving file then row order.
pub fn load_and_combine(paths: &[PathBuf], table: &RegionTable) -> Result<ExamDataset, ExamError> {
    let mut combined = ExamDataset::default();
    for path in paths {
        let dataset = load_file(path, table).map_err(|source| ExamError::SourceRead {
            path: path.clone(),
            source,
        })?;
        log::info!("Read {} rows from {}", dataset.len(), path.display());
        combined.extend(dataset);
    }
    log::info!(
        "Combined {} rows from {} file(s)",
        combined.len(),
        paths.len()
    );
    Ok(combined)
}

/// Load one source file.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xls` / `.ods` – first worksheet, header in row 1
/// * `.csv` – header row, comma separated
pub fn load_file(path: &Path, table: &RegionTable) -> Result<ExamDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let sheet = match ext.as_str() {
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => read_workbook(path)?,
        "csv" => read_csv(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };
    sheet.into_dataset(table)
}

// ---------------------------------------------------------------------------
// Raw sheet – format independent grid of cells
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Empty,
    Number(f64),
    Text(String),
    /// Spreadsheet error value such as `#N/A` or `#DIV/0!`.
    Error(String),
}

impl Cell {
    fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) | Cell::Error(_) => false,
        }
    }
}

struct RawSheet {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl RawSheet {
    fn into_dataset(self, table: &RegionTable) -> Result<ExamDataset> {
        let id_idx = self
            .headers
            .iter()
            .position(|h| ID_ALIASES.contains(&h.trim()))
            .with_context(|| format!("missing '{ID_COLUMN}' column"))?;

        let mut subject_cols: Vec<(Subject, usize)> = Vec::new();
        for (i, header) in self.headers.iter().enumerate() {
            if let Some(subject) = Subject::from_header(header) {
                if !subject_cols.iter().any(|(s, _)| *s == subject) {
                    subject_cols.push((subject, i));
                }
            }
        }
        for subject in Subject::ALL {
            if !subject_cols.iter().any(|(s, _)| *s == subject) {
                log::warn!("Column '{subject}' not found, treating its scores as absent");
            }
        }

        let mut records = Vec::with_capacity(self.rows.len());
        for (row_no, row) in self.rows.iter().enumerate() {
            if row.iter().all(Cell::is_empty) {
                continue;
            }
            // Header is line 1 of the sheet.
            let line = row_no + 2;

            let candidate_id = row.get(id_idx).map(cell_to_id).unwrap_or_default();
            let mut scores = [None; Subject::COUNT];
            for (subject, col) in &subject_cols {
                let cell = row.get(*col).unwrap_or(&Cell::Empty);
                scores[subject.index()] = parse_score(cell)
                    .with_context(|| format!("row {line}, column '{subject}'"))?;
            }

            let (region_code, region_name) = table.derive(&candidate_id);
            records.push(Record {
                candidate_id,
                scores,
                region_code,
                region_name: region_name.map(str::to_string),
            });
        }

        Ok(ExamDataset::from_records(records))
    }
}

fn cell_to_id(cell: &Cell) -> String {
    match cell {
        Cell::Empty => String::new(),
        Cell::Number(v) if v.is_finite() && v.fract() == 0.0 => format!("{}", *v as i64),
        Cell::Number(v) => v.to_string(),
        Cell::Text(s) => s.trim().to_string(),
        Cell::Error(_) => String::new(),
    }
}

fn parse_score(cell: &Cell) -> Result<Option<f64>> {
    let value = match cell {
        Cell::Empty => return Ok(None),
        Cell::Number(v) => *v,
        Cell::Error(e) => bail!("spreadsheet error {e} is not a score"),
        Cell::Text(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            s.replace(',', ".")
                .parse::<f64>()
                .with_context(|| format!("'{s}' is not a score"))?
        }
    };
    if !(MIN_SCORE..=MAX_SCORE).contains(&value) {
        bail!("score {value} outside {MIN_SCORE}..={MAX_SCORE}");
    }
    Ok(Some(value))
}

// ---------------------------------------------------------------------------
// Spreadsheet reader
// ---------------------------------------------------------------------------

fn read_workbook(path: &Path) -> Result<RawSheet> {
    let mut workbook = open_workbook_auto(path).context("opening workbook")?;
    let range = workbook
        .worksheet_range_at(0)
        .context("workbook has no worksheet")?
        .context("reading first worksheet")?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .context("worksheet is empty")?
        .iter()
        .map(|c| c.to_string())
        .collect();

    let rows = rows
        .map(|row| row.iter().map(data_to_cell).collect())
        .collect();

    Ok(RawSheet { headers, rows })
}

fn data_to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::String(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Error(e.to_string()),
        other => Cell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

fn read_csv(path: &Path) -> Result<RawSheet> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(
            record
                .iter()
                .map(|v| {
                    if v.is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(v.to_string())
                    }
                })
                .collect(),
        );
    }

    Ok(RawSheet { headers, rows })
}
