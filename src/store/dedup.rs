//! Header-row deduplication for multi-run CSV files.
//!
//! Every download run appends its own header row, so a file that has seen N
//! runs holds N headers. One streaming pass copies every record to
//! `<stem>_dedup.csv`, keeping only the first exact occurrence of the
//! header tuple. Equality is full-tuple equality; a data row that merely
//! resembles the header survives.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use super::{derived_path, read_records, write_records, Entity, StoreError};

/// Deduplicate one CSV against its entity header. Returns the path holding
/// the deduplicated data: the dedup sibling, or the original when
/// `overwrite` replaced it.
pub fn deduplicate_file(
    path: &Path,
    header: &[&str],
    overwrite: bool,
) -> Result<PathBuf, StoreError> {
    let dedup_path = derived_path(path, "_dedup");
    let records = read_records(path)?;

    let mut kept = Vec::with_capacity(records.len());
    let mut seen_header = false;
    for record in records {
        if record == header {
            if !seen_header {
                kept.push(record);
                seen_header = true;
            }
        } else {
            kept.push(record);
        }
    }

    write_records(&dedup_path, &kept)?;
    info!(file = %dedup_path.display(), rows = kept.len(), "deduplicated");

    if overwrite {
        fs::rename(&dedup_path, path)?;
        Ok(path.to_path_buf())
    } else {
        Ok(dedup_path)
    }
}

/// Deduplicate all three canonical CSVs in a data directory.
pub fn deduplicate(data_dir: &Path, overwrite: bool) -> Result<(), StoreError> {
    for entity in Entity::ALL {
        deduplicate_file(&entity.csv_path(data_dir), entity.header(), overwrite)?;
    }
    Ok(())
}
