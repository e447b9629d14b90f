//! Flat-file persistence: the per-entity CSV layout, append-with-header
//! writes, and shared CSV read/write plumbing.
//!
//! Files are comma-delimited, double-quote-quoted, minimal-quoting CSV.
//! Every append carries its own header row; the deduplicator collapses the
//! repeats afterwards.

pub mod archive;
pub mod dedup;

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::table::{COMMITS_HEADER, ISSUES_HEADER, PULL_REQUESTS_HEADER};

/// Marker substituted for null bytes before CSV parsing; raw null bytes
/// fault the reader.
pub const NULL_MARKER: &str = "<NULL>";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("archive serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The three persisted entity types. Each owns one subdirectory of the data
/// dir and one canonical CSV named after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Issues,
    Commits,
    PullRequests,
}

impl Entity {
    pub const ALL: [Entity; 3] = [Entity::Issues, Entity::Commits, Entity::PullRequests];

    pub fn name(self) -> &'static str {
        match self {
            Entity::Issues => "issues",
            Entity::Commits => "commits",
            Entity::PullRequests => "pull_requests",
        }
    }

    pub fn header(self) -> &'static [&'static str] {
        match self {
            Entity::Issues => &ISSUES_HEADER,
            Entity::Commits => &COMMITS_HEADER,
            Entity::PullRequests => &PULL_REQUESTS_HEADER,
        }
    }

    /// Canonical CSV path: `<data_dir>/<name>/<name>.csv`.
    pub fn csv_path(self, data_dir: &Path) -> PathBuf {
        data_dir
            .join(self.name())
            .join(format!("{}.csv", self.name()))
    }
}

/// Create the three entity subdirectories if missing.
pub fn ensure_layout(data_dir: &Path) -> Result<(), StoreError> {
    for entity in Entity::ALL {
        fs::create_dir_all(data_dir.join(entity.name()))?;
    }
    Ok(())
}

pub fn fix_null_bytes(text: &str) -> String {
    text.replace('\0', NULL_MARKER)
}

/// Derive a sibling path with a suffix on the file stem:
/// `issues.csv` becomes `issues_dedup.csv` for suffix `"_dedup"`.
pub fn derived_path(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{stem}{suffix}.csv"))
}

/// Append one formatted batch to an entity's canonical CSV, preceded by its
/// header row. An empty batch writes nothing, not even the header.
pub fn append_batch(
    data_dir: &Path,
    entity: Entity,
    rows: &[Vec<String>],
) -> Result<(), StoreError> {
    if rows.is_empty() {
        return Ok(());
    }
    ensure_layout(data_dir)?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(entity.csv_path(data_dir))?;
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(file);

    writer.write_record(entity.header())?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read every record of a CSV, substituting null bytes first. A missing
/// file reads as no records.
pub fn read_records(path: &Path) -> Result<Vec<Vec<String>>, StoreError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let contents = fix_null_bytes(&fs::read_to_string(path)?);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(contents.as_bytes());

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        records.push(record.iter().map(str::to_string).collect());
    }
    Ok(records)
}

/// Delete the three canonical CSVs. Missing files are reported, not fatal.
pub fn delete_data(data_dir: &Path) -> Result<(), StoreError> {
    for entity in Entity::ALL {
        let path = entity.csv_path(data_dir);
        if path.exists() {
            fs::remove_file(&path)?;
            tracing::info!(file = %path.display(), "deleted");
        } else {
            tracing::warn!(file = %path.display(), "nothing to delete");
        }
    }
    Ok(())
}

pub fn write_records(path: &Path, records: &[Vec<String>]) -> Result<(), StoreError> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .from_path(path)?;
    for record in records {
        writer.write_record(record)?;
    }
    writer.flush()?;
    Ok(())
}
