//! CSV export of the final feature table.
//!
//! The file is written to a temporary sibling of the destination and renamed
//! into place only after every row has been flushed, so a failed run never
//! leaves a partial artifact behind.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

use crate::domain::pair::PairKeyFormat;
use crate::domain::row::{format_optional_real, format_real, FeatureRow, FEATURE_COLUMNS};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("could not write feature file `{path}`: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("could not encode feature file `{path}`: {source}")]
    Csv { path: PathBuf, source: csv::Error },
}

pub fn write_feature_csv(
    path: &Path,
    rows: &[FeatureRow],
    keys: &PairKeyFormat,
) -> Result<u64, ExportError> {
    let io_error = |source| ExportError::Io { path: path.to_path_buf(), source };
    let csv_error = |source| ExportError::Csv { path: path.to_path_buf(), source };

    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&directory).map_err(io_error)?;

    let staging = NamedTempFile::new_in(&directory).map_err(io_error)?;
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(staging);

    writer.write_record(FEATURE_COLUMNS).map_err(csv_error)?;
    let mut written = 0u64;
    for row in rows {
        writer.write_record(record(row, keys)).map_err(csv_error)?;
        written += 1;
    }

    let mut staging = writer.into_inner().map_err(|error| io_error(error.into_error()))?;
    staging.flush().map_err(io_error)?;
    staging.as_file().sync_all().map_err(io_error)?;
    staging.persist(path).map_err(|error| io_error(error.error))?;

    Ok(written)
}

fn record(row: &FeatureRow, keys: &PairKeyFormat) -> [String; 7] {
    [
        keys.render_unchecked(row.pair),
        row.y.to_string(),
        row.total_buy_n5.to_string(),
        format_real(row.total_buy_ratio_n5),
        format_real(row.order_ratio_by_chance_n5),
        format_real(row.useritem_order_days_max_n5),
        format_optional_real(row.useritem_order_days_min_n5),
    ]
}
