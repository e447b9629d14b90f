//! The persisted columnar archive.
//!
//! A single JSON file holding one named dataset per entity type. Each
//! dataset is a row-major matrix of variable-length strings whose first row
//! is the column header, plus a `description` attribute naming the schema.
//! Rows grow without bound across append runs.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{read_records, Entity, StoreError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub description: String,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Archive {
    pub datasets: BTreeMap<String, Dataset>,
}

impl Archive {
    /// Load an existing archive. A missing file loads as an empty archive
    /// so the first append behaves like create.
    pub fn load(path: &Path) -> Result<Archive, StoreError> {
        if !path.exists() {
            return Ok(Archive::default());
        }
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    pub fn dataset(&self, name: &str) -> Option<&Dataset> {
        self.datasets.get(name)
    }
}

fn description_for(entity: Entity) -> String {
    format!(
        "GitHub {} with relevant metadata and comments. Columns: [{}].",
        entity.name(),
        entity.header().join(", ")
    )
}

fn header_matches(row: &[String], entity: Entity) -> bool {
    row == entity.header()
}

/// Build the archive from scratch out of the canonical CSVs, replacing any
/// existing file.
pub fn create(archive_path: &Path, data_dir: &Path) -> Result<(), StoreError> {
    let mut archive = Archive::default();
    for entity in Entity::ALL {
        let rows = read_records(&entity.csv_path(data_dir))?;
        info!(dataset = entity.name(), rows = rows.len(), "created dataset");
        archive.datasets.insert(
            entity.name().to_string(),
            Dataset {
                description: description_for(entity),
                rows,
            },
        );
    }
    archive.save(archive_path)
}

/// Merge the canonical CSVs into an existing archive.
///
/// Per dataset: empty new data leaves it untouched; an empty (or absent)
/// existing dataset is replaced wholesale with a refreshed description;
/// otherwise the new data's leading header row is dropped and the remainder
/// extends the dataset. After any append the row count equals the prior
/// count plus the new rows, minus one when both sides contributed a header.
pub fn append(archive_path: &Path, data_dir: &Path) -> Result<(), StoreError> {
    let mut archive = Archive::load(archive_path)?;

    for entity in Entity::ALL {
        let mut new_rows = read_records(&entity.csv_path(data_dir))?;
        if new_rows.is_empty() {
            info!(dataset = entity.name(), "no new rows; dataset untouched");
            continue;
        }

        let existing = archive.datasets.get_mut(entity.name());
        match existing {
            Some(dataset) if !dataset.rows.is_empty() => {
                if new_rows.first().is_some_and(|row| header_matches(row, entity)) {
                    new_rows.remove(0);
                }
                info!(
                    dataset = entity.name(),
                    added = new_rows.len(),
                    "extended dataset"
                );
                dataset.rows.extend(new_rows);
            }
            _ => {
                info!(
                    dataset = entity.name(),
                    rows = new_rows.len(),
                    "replaced empty dataset"
                );
                archive.datasets.insert(
                    entity.name().to_string(),
                    Dataset {
                        description: description_for(entity),
                        rows: new_rows,
                    },
                );
            }
        }
    }

    archive.save(archive_path)
}
