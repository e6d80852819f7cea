// src/write/mod.rs
use arrow::{
    array::{ArrayRef, StringArray},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use parquet::{arrow::ArrowWriter, basic::Compression, file::properties::WriterProperties};
use serde::Serialize;
use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
    sync::Arc,
};
use tempfile::NamedTempFile;
use tracing::info;

use crate::config::OutputFormat;
use crate::error::{CleanError, Result};
use crate::schema::{CleanedRecord, OUTPUT_COLUMNS};

/// A complete, synced temp file sitting next to its destination. Dropping
/// it without `commit` deletes the temp file and leaves the destination
/// untouched.
#[derive(Debug)]
pub struct Staged {
    tmp: NamedTempFile,
    path: PathBuf,
}

impl Staged {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rename the temp file over the destination.
    pub fn commit(self) -> Result<()> {
        let Staged { tmp, path } = self;
        tmp.persist(&path)
            .map_err(|e| CleanError::write(&path, e.error))?;
        Ok(())
    }
}

/// Write `rows` to `path` in the given format, replacing any existing file.
/// The destination only ever holds a complete table.
pub fn write_dataset(path: &Path, rows: &[CleanedRecord], format: OutputFormat) -> Result<()> {
    stage_dataset(path, rows, format)?.commit()
}

#[tracing::instrument(level = "info", skip(rows), fields(path = %path.display(), rows = rows.len()))]
pub fn stage_dataset(path: &Path, rows: &[CleanedRecord], format: OutputFormat) -> Result<Staged> {
    let staged = match format {
        OutputFormat::Csv => stage(path, |file| write_csv(file, rows))?,
        OutputFormat::Parquet => stage(path, |file| write_parquet(file, rows))?,
    };
    info!(?format, "staged cleaned table");
    Ok(staged)
}

/// Pretty JSON with a trailing newline, same replace-on-success discipline.
pub fn stage_json<T: Serialize>(path: &Path, value: &T) -> Result<Staged> {
    stage(path, |file| {
        let mut w = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut w, value)?;
        w.write_all(b"\n")?;
        w.flush()
    })
}

/// Fill a temp file next to `path`, then rename it over `path`. On any
/// failure the temp file is removed and `path` is left as it was.
pub fn write_atomic<F>(path: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    stage(path, fill)?.commit()
}

/// Fill and sync a temp file in `path`'s directory without touching `path`.
pub fn stage<F>(path: &Path, fill: F) -> Result<Staged>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| CleanError::write(path, e))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| CleanError::write(path, e))?;
    fill(tmp.as_file_mut()).map_err(|e| CleanError::write(path, e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| CleanError::write(path, e))?;
    Ok(Staged {
        tmp,
        path: path.to_path_buf(),
    })
}

fn write_csv(file: &mut File, rows: &[CleanedRecord]) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(file);
    wtr.write_record(OUTPUT_COLUMNS)?;
    for rec in rows {
        wtr.write_record(rec.fields())?;
    }
    wtr.flush()
}

/// Arrow schema of the cleaned table: every column a non-null UTF-8 string.
pub fn output_schema() -> Schema {
    Schema::new(
        OUTPUT_COLUMNS
            .iter()
            .map(|name| Field::new(*name, DataType::Utf8, false))
            .collect::<Vec<_>>(),
    )
}

fn write_parquet(file: &mut File, rows: &[CleanedRecord]) -> io::Result<()> {
    let schema = Arc::new(output_schema());
    let columns: Vec<ArrayRef> = (0..OUTPUT_COLUMNS.len())
        .map(|i| {
            let values: StringArray = rows.iter().map(|r| Some(r.fields()[i])).collect();
            Arc::new(values) as ArrayRef
        })
        .collect();
    let batch = RecordBatch::try_new(schema.clone(), columns).map_err(io::Error::other)?;

    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, schema, Some(props)).map_err(io::Error::other)?;
    writer.write(&batch).map_err(io::Error::other)?;
    writer.close().map_err(io::Error::other)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use parquet::file::reader::{FileReader, SerializedFileReader};
    use tempfile::tempdir;

    fn sample() -> Vec<CleanedRecord> {
        vec![CleanedRecord {
            ein: "123456789".into(),
            legal_name: "Acme, Charity".into(),
            street: "1 Main St".into(),
            city: "BOSTON".into(),
            state: "MA".into(),
            zip: "02134".into(),
            subsection: "03".into(),
            deductibility: "deductible".into(),
            status: "active".into(),
            ntee_code: "B20".into(),
            ntee_major: "B".into(),
            region: "eo1".into(),
        }]
    }

    #[test]
    fn csv_has_header_and_canonical_order() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested/out/clean.csv");
        write_dataset(&path, &sample(), OutputFormat::Csv)?;

        let text = fs::read_to_string(&path)?;
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(OUTPUT_COLUMNS.join(",").as_str()));
        assert_eq!(
            lines.next(),
            Some("123456789,\"Acme, Charity\",1 Main St,BOSTON,MA,02134,03,deductible,active,B20,B,eo1")
        );
        assert_eq!(lines.next(), None);
        Ok(())
    }

    #[test]
    fn failed_fill_leaves_existing_file_and_no_temp() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("clean.csv");
        fs::write(&path, "previous run\n")?;

        let err = write_atomic(&path, |file| {
            file.write_all(b"half a tab")?;
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        })
        .unwrap_err();
        assert!(matches!(err, CleanError::Write { .. }));
        assert!(err.to_string().contains("disk full"));

        assert_eq!(fs::read_to_string(&path)?, "previous run\n");
        let leftovers = fs::read_dir(dir.path())?.count();
        assert_eq!(leftovers, 1);
        Ok(())
    }

    #[test]
    fn dropped_stage_leaves_destination_alone() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("clean.csv");
        fs::write(&path, "previous run\n")?;

        let staged = stage_dataset(&path, &sample(), OutputFormat::Csv)?;
        assert_eq!(staged.path(), path.as_path());
        assert_eq!(fs::read_dir(dir.path())?.count(), 2);
        drop(staged);

        assert_eq!(fs::read_to_string(&path)?, "previous run\n");
        assert_eq!(fs::read_dir(dir.path())?.count(), 1);
        Ok(())
    }

    #[test]
    fn unwritable_destination_is_write_error() -> Result<()> {
        let dir = tempdir()?;
        // a regular file where the parent directory should be
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "")?;
        let err = write_dataset(&blocker.join("clean.csv"), &sample(), OutputFormat::Csv)
            .unwrap_err();
        assert!(matches!(err, CleanError::Write { .. }), "{err}");
        Ok(())
    }

    #[test]
    fn parquet_round_trips_row_count() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("clean.parquet");
        write_dataset(&path, &sample(), OutputFormat::Parquet)?;

        let reader = SerializedFileReader::new(File::open(&path)?)?;
        let meta = reader.metadata().file_metadata();
        assert_eq!(meta.num_rows(), 1);
        assert_eq!(meta.schema_descr().num_columns(), OUTPUT_COLUMNS.len());
        Ok(())
    }
}
