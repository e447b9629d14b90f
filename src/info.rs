//! Summaries of what has been collected so far.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use colored::Colorize;

use crate::store::{archive::Archive, read_records, Entity, StoreError};

/// Counts for one canonical CSV.
#[derive(Debug, Default)]
pub struct EntityCounts {
    /// Distinct parent entities, counted per repository.
    pub parents: usize,
    /// Rows whose comment field is non-empty.
    pub comments: usize,
    pub repos: HashSet<String>,
    pub size_mb: f64,
}

pub fn file_size_mb(path: &Path) -> f64 {
    std::fs::metadata(path)
        .map(|m| m.len() as f64 / (1024.0 * 1024.0))
        .unwrap_or(0.0)
}

/// Count distinct parents (repo URL in column 0, parent key in column 3)
/// and commented rows in one canonical CSV. Stray header repeats are
/// ignored.
fn count_file(path: &Path) -> Result<EntityCounts, StoreError> {
    let records = read_records(path)?;
    let mut counts = EntityCounts {
        size_mb: file_size_mb(path),
        ..EntityCounts::default()
    };

    let mut parents_per_repo: HashMap<String, HashSet<String>> = HashMap::new();
    for row in records.iter().skip(1) {
        if row.len() < 4 || row[0] == "REPO_URL" {
            continue;
        }
        parents_per_repo
            .entry(row[0].clone())
            .or_default()
            .insert(row[3].clone());
        if row.last().is_some_and(|text| !text.is_empty()) {
            counts.comments += 1;
        }
    }

    counts.parents = parents_per_repo.values().map(HashSet::len).sum();
    counts.repos = parents_per_repo.into_keys().collect();
    Ok(counts)
}

/// Print per-entity counts and the distinct repository total for a data
/// directory.
pub fn info_data(data_dir: &Path) -> Result<(), StoreError> {
    println!("Data directory: {}", data_dir.display());

    let mut all_repos = HashSet::new();
    for entity in Entity::ALL {
        let path = entity.csv_path(data_dir);
        if !path.exists() {
            println!("  {} {}", entity.name().bold(), "(no data)".dimmed());
            continue;
        }
        let counts = count_file(&path)?;
        println!(
            "  {} {} parents, {} comments, {:.2} MB",
            entity.name().bold(),
            counts.parents,
            counts.comments,
            counts.size_mb
        );
        all_repos.extend(counts.repos);
    }
    println!("  {} {}", "repos:".bold(), all_repos.len());
    Ok(())
}

/// Print the archive's datasets: row counts, distinct repositories, and
/// schema descriptions.
pub fn info_archive(archive_path: &Path) -> Result<(), StoreError> {
    let archive = Archive::load(archive_path)?;
    println!(
        "Archive: {} ({:.2} MB)",
        archive_path.display(),
        file_size_mb(archive_path)
    );
    for (name, dataset) in &archive.datasets {
        let repos: HashSet<&String> = dataset
            .rows
            .iter()
            .skip(1)
            .filter_map(|row| row.first())
            .collect();
        println!(
            "  {} {} rows, {} repos",
            name.bold(),
            dataset.rows.len(),
            repos.len()
        );
        println!("    {}", dataset.description.dimmed());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::append_batch;
    use crate::table::ISSUES_HEADER;
    use tempfile::TempDir;

    fn issue_row(repo: &str, number: u64, comment: &str) -> Vec<String> {
        let mut row = vec![String::new(); ISSUES_HEADER.len()];
        row[0] = repo.to_string();
        row[3] = number.to_string();
        row[ISSUES_HEADER.len() - 1] = comment.to_string();
        row
    }

    #[test]
    fn test_count_distinct_parents_and_comments() {
        let dir = TempDir::new().unwrap();
        append_batch(
            dir.path(),
            Entity::Issues,
            &[
                // Issue 1 has two comments, issue 2 none.
                issue_row("https://github.com/o/a", 1, "first"),
                issue_row("https://github.com/o/a", 1, "second"),
                issue_row("https://github.com/o/a", 2, ""),
                // Same issue number in a different repo counts separately.
                issue_row("https://github.com/o/b", 1, "other"),
            ],
        )
        .unwrap();

        let counts = count_file(&Entity::Issues.csv_path(dir.path())).unwrap();
        assert_eq!(counts.parents, 3);
        assert_eq!(counts.comments, 3);
        assert_eq!(counts.repos.len(), 2);
        assert!(counts.size_mb > 0.0);
    }

    #[test]
    fn test_count_ignores_repeated_headers() {
        let dir = TempDir::new().unwrap();
        append_batch(
            dir.path(),
            Entity::Issues,
            &[issue_row("https://github.com/o/a", 1, "hi")],
        )
        .unwrap();
        append_batch(
            dir.path(),
            Entity::Issues,
            &[issue_row("https://github.com/o/a", 2, "")],
        )
        .unwrap();

        let counts = count_file(&Entity::Issues.csv_path(dir.path())).unwrap();
        assert_eq!(counts.parents, 2);
        assert_eq!(counts.comments, 1);
    }
}
