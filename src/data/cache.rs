use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use glob::{glob, Pattern};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;

use super::model::{
    ExamDataset, Record, Subject, ID_COLUMN, REGION_CODE_COLUMN, REGION_NAME_COLUMN,
};
use crate::error::ExamError;

/// Extension of cache entries.
pub const CACHE_EXT: &str = "parquet";

// ---------------------------------------------------------------------------
// Cache entries
// ---------------------------------------------------------------------------

/// A persisted dataset snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub name: String,
    pub path: PathBuf,
}

/// Result of a save request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(CacheEntry),
    /// An entry of that name existed and the caller declined to replace it.
    OverwriteDeclined,
}

/// Named dataset snapshots stored as Parquet files in one directory.
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the cache directory if needed.
    pub fn ensure_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)
    }

    /// Path of the entry `name` (not checked for existence).
    pub fn entry_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{CACHE_EXT}"))
    }

    /// Whether an entry called `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.entry_path(name).is_file()
    }

    /// Persist `dataset` under `name`.
    ///
    /// When an entry of that name already exists `confirm_overwrite` is asked
    /// first; a `false` answer leaves the store untouched.
    pub fn save(
        &self,
        dataset: &ExamDataset,
        name: &str,
        confirm_overwrite: impl FnOnce(&CacheEntry) -> bool,
    ) -> Result<SaveOutcome, ExamError> {
        let name = validate_name(name)?;
        let entry = CacheEntry {
            path: self.entry_path(&name),
            name: name.clone(),
        };

        if entry.path.exists() && !confirm_overwrite(&entry) {
            log::info!("Kept existing cache entry {}", entry.path.display());
            return Ok(SaveOutcome::OverwriteDeclined);
        }

        self.write_entry(dataset, &entry)
            .map_err(|source| ExamError::CacheWrite { name, source })?;
        log::info!(
            "Saved {} records to {}",
            dataset.len(),
            entry.path.display()
        );
        Ok(SaveOutcome::Saved(entry))
    }

    /// Names of all entries, sorted. A missing directory has no entries.
    pub fn list_entries(&self) -> Result<Vec<String>> {
        if !self.dir.is_dir() {
            return Ok(Vec::new());
        }
        let pattern = format!(
            "{}/*.{CACHE_EXT}",
            Pattern::escape(&self.dir.to_string_lossy())
        );
        let mut names: Vec<String> = glob(&pattern)
            .with_context(|| format!("invalid pattern '{pattern}'"))?
            .filter_map(Result::ok)
            .filter(|p| p.is_file())
            .filter_map(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .collect();
        names.sort();
        Ok(names)
    }

    /// Read the entry `name` back.
    pub fn load(&self, name: &str) -> Result<ExamDataset, ExamError> {
        let name = validate_name(name).map_err(|e| ExamError::CacheRead {
            name: name.to_string(),
            source: e.into(),
        })?;
        let path = self.entry_path(&name);
        let dataset =
            read_parquet(&path).map_err(|source| ExamError::CacheRead { name, source })?;
        log::info!("Loaded {} records from {}", dataset.len(), path.display());
        Ok(dataset)
    }

    fn write_entry(&self, dataset: &ExamDataset, entry: &CacheEntry) -> Result<()> {
        self.ensure_dir()
            .with_context(|| format!("creating {}", self.dir.display()))?;

        let tmp_path = entry.path.with_extension(format!("{CACHE_EXT}.tmp"));
        let schema = cache_schema();
        let batch = to_record_batch(dataset, schema.clone())?;
        if log::log_enabled!(log::Level::Debug) {
            let head = batch.slice(0, batch.num_rows().min(5));
            if let Ok(table) = arrow::util::pretty::pretty_format_batches(&[head]) {
                log::debug!("Writing cache entry '{}':\n{table}", entry.name);
            }
        }

        let written = write_parquet(&tmp_path, schema, &batch).and_then(|()| {
            fs::rename(&tmp_path, &entry.path).with_context(|| {
                format!(
                    "failed to rename `{}` to `{}`",
                    tmp_path.display(),
                    entry.path.display()
                )
            })
        });
        if written.is_err() && tmp_path.exists() {
            if let Err(e) = fs::remove_file(&tmp_path) {
                log::warn!("Could not remove {}: {e}", tmp_path.display());
            }
        }
        written
    }
}

fn write_parquet(path: &Path, schema: SchemaRef, batch: &RecordBatch) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("could not create temporary file `{}`", path.display()))?;
    let mut writer = ArrowWriter::try_new(BufWriter::new(file), schema, None)
        .context("creating ArrowWriter")?;
    writer.write(batch).context("writing record batch")?;
    writer.close().context("closing ArrowWriter")?;
    Ok(())
}

fn validate_name(name: &str) -> Result<String, ExamError> {
    let trimmed = name.trim();
    let invalid = trimmed.is_empty()
        || trimmed == "."
        || trimmed.contains("..")
        || trimmed.contains(['/', '\\']);
    if invalid {
        return Err(ExamError::InvalidCacheName(name.to_string()));
    }
    Ok(trimmed.to_string())
}

// ---------------------------------------------------------------------------
// Arrow conversion
// ---------------------------------------------------------------------------

fn cache_schema() -> SchemaRef {
    let mut fields = vec![Field::new(ID_COLUMN, DataType::Utf8, false)];
    fields.extend(
        Subject::ALL
            .iter()
            .map(|s| Field::new(s.column_name(), DataType::Float64, true)),
    );
    fields.push(Field::new(REGION_CODE_COLUMN, DataType::Utf8, true));
    fields.push(Field::new(REGION_NAME_COLUMN, DataType::Utf8, true));
    Arc::new(Schema::new(fields))
}

fn to_record_batch(dataset: &ExamDataset, schema: SchemaRef) -> Result<RecordBatch> {
    let records = &dataset.records;
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(schema.fields().len());

    columns.push(Arc::new(StringArray::from_iter_values(
        records.iter().map(|r| r.candidate_id.as_str()),
    )));
    for subject in Subject::ALL {
        columns.push(Arc::new(Float64Array::from_iter(
            records.iter().map(|r| r.score(subject)),
        )));
    }
    columns.push(Arc::new(StringArray::from_iter(
        records.iter().map(|r| r.region_code.as_deref()),
    )));
    columns.push(Arc::new(StringArray::from_iter(
        records.iter().map(|r| r.region_name.as_deref()),
    )));

    RecordBatch::try_new(schema, columns).context("building RecordBatch")
}

fn read_parquet(path: &Path) -> Result<ExamDataset> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        append_records(&batch, &mut records)?;
    }
    Ok(ExamDataset::from_records(records))
}

fn append_records(batch: &RecordBatch, out: &mut Vec<Record>) -> Result<()> {
    let ids = string_column(batch, ID_COLUMN)?;
    let codes = string_column(batch, REGION_CODE_COLUMN)?;
    let names = string_column(batch, REGION_NAME_COLUMN)?;
    let scores = Subject::ALL
        .iter()
        .map(|s| float_column(batch, s.column_name()))
        .collect::<Result<Vec<_>>>()?;

    for row in 0..batch.num_rows() {
        if ids.is_null(row) {
            bail!("row {row}: null '{ID_COLUMN}'");
        }
        let mut record = Record {
            candidate_id: ids.value(row).to_string(),
            scores: [None; Subject::COUNT],
            region_code: optional_str(codes, row),
            region_name: optional_str(names, row),
        };
        for (subject, col) in Subject::ALL.into_iter().zip(&scores) {
            record.set_score(subject, (!col.is_null(row)).then(|| col.value(row)));
        }
        out.push(record);
    }
    Ok(())
}

fn optional_str(col: &StringArray, row: usize) -> Option<String> {
    (!col.is_null(row)).then(|| col.value(row).to_string())
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .with_context(|| format!("missing column '{name}'"))?
        .as_any()
        .downcast_ref::<StringArray>()
        .with_context(|| format!("column '{name}' is not Utf8"))
}

fn float_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Float64Array> {
    batch
        .column_by_name(name)
        .with_context(|| format!("missing column '{name}'"))?
        .as_any()
        .downcast_ref::<Float64Array>()
        .with_context(|| format!("column '{name}' is not Float64"))
}
