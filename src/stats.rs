//! Aggregate statistics over classified comment data.
//!
//! Scans one level of subdirectories for canonical CSVs (falling back to
//! the data directory itself), counts per row on the rayon pool, and
//! aggregates sequentially.

use std::path::{Path, PathBuf};

use colored::Colorize;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::store::{read_records, Entity, StoreError};

/// Frequency-table vocabulary: the apology lemmas plus three near misses
/// tracked for comparison.
pub const STATS_LEMMAS: [&str; 16] = [
    "admit",
    "afraid",
    "apology",
    "apologise",
    "apologize",
    "blame",
    "excuse",
    "fault",
    "forgive",
    "forgot",
    "mistake",
    "mistaken",
    "oops",
    "pardon",
    "regret",
    "sorry",
];

/// Per-comment measurements taken in parallel.
struct RowSample {
    is_apology: bool,
    word_count: usize,
    apology_lemma_count: usize,
    lemma_counts: [usize; STATS_LEMMAS.len()],
}

/// Everything the stats command reports.
#[derive(Debug, Default)]
pub struct Report {
    pub apology_word_counts: Vec<usize>,
    pub apology_lemma_counts: Vec<usize>,
    pub non_apology_word_counts: Vec<usize>,
    pub lemma_totals: [usize; STATS_LEMMAS.len()],
}

/// Mean/median/min/max of one measurement list. `None` for an empty list.
#[derive(Debug, PartialEq)]
pub struct Distribution {
    pub mean: f64,
    pub median: f64,
    pub min: usize,
    pub max: usize,
}

impl Distribution {
    pub fn of(values: &[usize]) -> Option<Distribution> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_unstable();
        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) as f64 / 2.0
        } else {
            sorted[mid] as f64
        };
        Some(Distribution {
            mean: sorted.iter().sum::<usize>() as f64 / sorted.len() as f64,
            median,
            min: sorted[0],
            max: sorted[sorted.len() - 1],
        })
    }
}

/// Collect every canonical CSV one subdirectory level down; a data dir that
/// holds the CSVs directly is its own population of one.
fn population_files(data_dir: &Path) -> Result<Vec<PathBuf>, StoreError> {
    let mut sub_dirs: Vec<PathBuf> = std::fs::read_dir(data_dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    sub_dirs.sort();

    let mut files = Vec::new();
    for sub_dir in &sub_dirs {
        for entity in Entity::ALL {
            let path = entity.csv_path(sub_dir);
            if path.exists() {
                files.push(path);
            }
        }
    }
    if files.is_empty() {
        for entity in Entity::ALL {
            let path = entity.csv_path(data_dir);
            if path.exists() {
                files.push(path);
            }
        }
    }
    Ok(files)
}

fn sample(comment: &str, lemmatized: &str, apology_lemma_count: usize) -> RowSample {
    let lemmas: Vec<&str> = lemmatized.split(' ').collect();
    let mut lemma_counts = [0usize; STATS_LEMMAS.len()];
    for (slot, lemma) in lemma_counts.iter_mut().zip(STATS_LEMMAS) {
        *slot = lemmas.iter().filter(|l| **l == lemma).count();
    }
    RowSample {
        is_apology: apology_lemma_count > 0,
        word_count: comment.split(' ').count(),
        apology_lemma_count,
        lemma_counts,
    }
}

fn sample_file(path: &Path) -> Result<Vec<RowSample>, StoreError> {
    let records = read_records(path)?;
    let Some((header, rows)) = records.split_first() else {
        return Ok(Vec::new());
    };

    let find = |name: &str| header.iter().position(|col| col == name);
    let (Some(comment_col), Some(lemmatized_col), Some(count_col)) = (
        find("COMMENT_TEXT"),
        find("COMMENT_TEXT_LEMMATIZED"),
        find("NUM_APOLOGY_LEMMAS"),
    ) else {
        warn!(file = %path.display(), "missing classified columns; skipping");
        return Ok(Vec::new());
    };

    let samples = rows
        .par_iter()
        .filter(|row| {
            // Repeated header rows (full-tuple equality, so a real comment
            // that happens to read "COMMENT_TEXT" survives) and commentless
            // parent rows do not count.
            row.len() > count_col.max(comment_col).max(lemmatized_col)
                && !row[comment_col].is_empty()
                && row.as_slice() != header.as_slice()
        })
        .map(|row| {
            let count = row[count_col].parse().unwrap_or(0);
            sample(&row[comment_col], &row[lemmatized_col], count)
        })
        .collect();
    Ok(samples)
}

pub fn compute(data_dir: &Path) -> Result<Report, StoreError> {
    let mut report = Report::default();
    for path in population_files(data_dir)? {
        info!(file = %path.display(), "counting");
        for sample in sample_file(&path)? {
            if sample.is_apology {
                report.apology_word_counts.push(sample.word_count);
                report.apology_lemma_counts.push(sample.apology_lemma_count);
                for (total, count) in report.lemma_totals.iter_mut().zip(sample.lemma_counts) {
                    *total += count;
                }
            } else {
                report.non_apology_word_counts.push(sample.word_count);
            }
        }
    }
    Ok(report)
}

fn print_distribution(label: &str, values: &[usize]) {
    match Distribution::of(values) {
        Some(dist) => {
            println!("    {} {:.2}", format!("mean {label}:").bold(), dist.mean);
            println!("  {} {:.2}", format!("median {label}:").bold(), dist.median);
            println!("     {} {}", format!("min {label}:").bold(), dist.min);
            println!("     {} {}", format!("max {label}:").bold(), dist.max);
        }
        None => println!("    {}", "no data".dimmed()),
    }
}

pub fn print_report(report: &Report) {
    println!("{}", "APOLOGIES:".green().bold());
    println!("      {} {}", "total:".bold(), report.apology_word_counts.len());
    print_distribution("wc", &report.apology_word_counts);
    print_distribution("lc", &report.apology_lemma_counts);

    println!("{}", "NON-APOLOGIES:".red().bold());
    println!(
        "      {} {}",
        "total:".bold(),
        report.non_apology_word_counts.len()
    );
    print_distribution("wc", &report.non_apology_word_counts);

    println!("{}", "LEMMAS:".blue().bold());
    for (lemma, total) in STATS_LEMMAS.iter().zip(report.lemma_totals) {
        println!("  {:>10}: {}", lemma, total);
    }
}
