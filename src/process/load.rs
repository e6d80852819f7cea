// src/process/load.rs
use csv::{ReaderBuilder, StringRecord};
use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufReader, Cursor, Read},
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};
use zip::ZipArchive;

use crate::config::RegionFile;
use crate::error::{CleanError, Result};
use crate::schema::{resolve_header, CanonicalField, RawRecord};

/// All regions concatenated in processing order.
#[derive(Debug, Default)]
pub struct LoadedRegions {
    pub records: Vec<RawRecord>,
    /// `(label, rows read)` per region, in processing order.
    pub rows_per_region: Vec<(String, usize)>,
}

/// Load every region in the given order. The first failing region aborts
/// the whole load.
pub fn load_regions(regions: &[RegionFile]) -> Result<LoadedRegions> {
    let mut loaded = LoadedRegions::default();
    for region in regions {
        let records = load_region(region)?;
        loaded
            .rows_per_region
            .push((region.label.clone(), records.len()));
        loaded.records.extend(records);
    }
    Ok(loaded)
}

/// Load one region: a plain CSV, or a `.zip` whose CSV entries are read in
/// archive order.
#[tracing::instrument(level = "info", skip(region), fields(region = %region.label, path = %region.path.display()))]
pub fn load_region(region: &RegionFile) -> Result<Vec<RawRecord>> {
    let path = region.path.as_path();
    if !path.is_file() {
        return Err(CleanError::MissingFile {
            path: path.to_path_buf(),
        });
    }

    let is_zip = path
        .extension()
        .and_then(|s| s.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("zip"));

    let records = if is_zip {
        load_zip(path, &region.label)?
    } else {
        let file = File::open(path).map_err(|e| CleanError::malformed(path, e))?;
        read_region_csv(BufReader::new(file), path, &region.label)?
    };
    info!(rows = records.len(), "loaded region");
    Ok(records)
}

fn load_zip(path: &Path, label: &str) -> Result<Vec<RawRecord>> {
    let file = File::open(path).map_err(|e| CleanError::malformed(path, e))?;
    let mut archive = ZipArchive::new(file).map_err(|e| CleanError::malformed(path, e))?;

    // buffer each CSV entry first so the archive handle is released before parsing
    let mut buffers: Vec<(String, Vec<u8>)> = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| CleanError::malformed(path, e))?;
        let name = entry.name().to_string();
        if !(entry.is_file() && name.to_lowercase().ends_with(".csv")) {
            debug!(entry = %name, "skipping non-CSV zip entry");
            continue;
        }
        // no pre-sizing from entry.size(): the header value is untrusted
        let mut buf = Vec::new();
        entry
            .read_to_end(&mut buf)
            .map_err(|e| CleanError::malformed(path, format!("reading {name}: {e}")))?;
        buffers.push((name, buf));
    }
    drop(archive);

    if buffers.is_empty() {
        return Err(CleanError::malformed(path, "no CSV entries in archive"));
    }

    let mut records = Vec::new();
    for (name, data) in buffers {
        let entry_path = path.join(&name);
        records.extend(read_region_csv(Cursor::new(data), &entry_path, label)?);
    }
    Ok(records)
}

/// Map each header cell to a canonical field. Unknown columns are dropped;
/// a required field with no column is a schema mismatch.
pub fn resolve_columns(
    headers: &StringRecord,
    source: &Path,
) -> Result<Vec<(usize, CanonicalField)>> {
    let mut columns: Vec<(usize, CanonicalField)> = Vec::new();
    for (idx, header) in headers.iter().enumerate() {
        match resolve_header(header) {
            Some(field) if columns.iter().any(|(_, f)| *f == field) => {
                warn!(column = header, field = %field, "duplicate column for field; keeping first");
            }
            Some(field) => columns.push((idx, field)),
            None => debug!(column = header, "dropping unrecognized column"),
        }
    }

    for field in CanonicalField::ALL {
        if field.is_required() && !columns.iter().any(|(_, f)| *f == field) {
            return Err(CleanError::SchemaMismatch {
                path: source.to_path_buf(),
                field: field.name(),
            });
        }
    }
    Ok(columns)
}

/// Parse one CSV stream into raw records tagged with `label`.
pub fn read_region_csv<R: Read>(reader: R, source: &Path, label: &str) -> Result<Vec<RawRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| csv_error(source, e))?
        .clone();
    let columns = resolve_columns(&headers, source)?;

    let mut records = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result.map_err(|e| csv_error(source, e))?;
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(idx as u64 + 2);

        let values: BTreeMap<CanonicalField, String> = columns
            .iter()
            .filter_map(|(col, field)| record.get(*col).map(|v| (*field, v.to_string())))
            .collect();
        records.push(RawRecord {
            region: label.to_string(),
            line,
            values,
        });
    }
    Ok(records)
}

fn csv_error(source: &Path, err: csv::Error) -> CleanError {
    CleanError::MalformedInput {
        path: PathBuf::from(source),
        line: err.position().map(|p| p.line()),
        detail: err.to_string(),
    }
}
