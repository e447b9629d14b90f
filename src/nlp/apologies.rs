//! Apology classification over lemmatized comment text.
//!
//! A comment's score is the number of apology-lemma occurrences minus the
//! number of non-apology phrase occurrences, floored at zero. A positive
//! score labels the comment an apology.

use std::path::Path;

use tracing::info;

use crate::store::{read_records, Entity, StoreError};

pub const APOLOGY_LEMMAS: [&str; 13] = [
    "apology",
    "apologise",
    "apologize",
    "blame",
    "excuse",
    "fault",
    "forgive",
    "mistake",
    "mistaken",
    "oops",
    "pardon",
    "regret",
    "sorry",
];

/// Lemma sequences whose presence discounts an apology-lemma hit: negations
/// and technical senses ("git blame", "segmentation fault").
pub const NON_APOLOGY_LEMMA_PHRASES: &[&[&str]] = &[
    &["not", "apologize"],
    &["n't", "apologize"],
    &["not", "apologise"],
    &["n't", "apologise"],
    &["git", "blame"],
    &["n't", "blame"],
    &["not", "to", "blame"],
    &["seg", "fault"],
    &["segmentation", "fault"],
    &["page", "fault"],
    &["permission", "fault"],
    &["protection", "fault"],
    &["not", "-PRON-", "fault"],
    &["not", "a", "mistake"],
    &["not", "mistaken"],
    &["n't", "regret"],
    &["better", "safe", "than", "sorry"],
    &["not", "sorry"],
];

fn count_phrase_hits(lemmas: &[&str]) -> usize {
    let mut hits = 0;
    for phrase in NON_APOLOGY_LEMMA_PHRASES {
        if phrase.len() > lemmas.len() {
            continue;
        }
        hits += lemmas
            .windows(phrase.len())
            .filter(|window| window == phrase)
            .count();
    }
    hits
}

/// Count apology lemmas in a space-joined lemma string, discounting
/// non-apology phrase occurrences. Never negative.
pub fn count_apology_lemmas(lemmatized: &str) -> usize {
    let lemmas: Vec<&str> = lemmatized.split(' ').collect();
    let apologies = lemmas
        .iter()
        .filter(|lemma| APOLOGY_LEMMAS.contains(*lemma))
        .count();
    apologies.saturating_sub(count_phrase_hits(&lemmas))
}

pub fn is_apology(count: usize) -> &'static str {
    if count > 0 {
        "1"
    } else {
        "0"
    }
}

/// Append `NUM_APOLOGY_LEMMAS` and `IS_APOLOGY` to each preprocessed CSV
/// (the lemmatized text is the last column) and report per-entity apology
/// totals.
pub fn classify(data_dir: &Path, overwrite: bool) -> Result<(), StoreError> {
    for entity in Entity::ALL {
        let path = entity.csv_path(data_dir);
        super::transform_file(
            &path,
            "_classified",
            &["NUM_APOLOGY_LEMMAS", "IS_APOLOGY"],
            overwrite,
            |row| {
                let lemmatized = row.last().map(String::as_str).unwrap_or_default();
                let count = count_apology_lemmas(lemmatized);
                vec![count.to_string(), is_apology(count).to_string()]
            },
        )?;

        if path.exists() {
            let classified = if overwrite {
                path.clone()
            } else {
                crate::store::derived_path(&path, "_classified")
            };
            let apologies = read_records(&classified)?
                .iter()
                .skip(1)
                .filter(|row| row.last().map(String::as_str) == Some("1"))
                .count();
            info!(entity = entity.name(), apologies, "classified");
            println!("{} apologies: {}", entity.name(), apologies);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlp::{lemmatize_comment, SuffixLemmatizer};
    use crate::store::{append_batch, read_records};
    use crate::table::ISSUES_HEADER;
    use tempfile::TempDir;

    #[test]
    fn test_simple_apology_counts() {
        assert_eq!(count_apology_lemmas("sorry about that"), 1);
        assert_eq!(count_apology_lemmas("-PRON- apologize for the mistake"), 2);
        assert_eq!(count_apology_lemmas("looks good to -PRON-"), 0);
    }

    #[test]
    fn test_non_apology_phrases_discount() {
        // "git blame" neutralizes the "blame" hit.
        assert_eq!(count_apology_lemmas("check git blame for the culprit"), 0);
        assert_eq!(count_apology_lemmas("segmentation fault in the parser"), 0);
        assert_eq!(count_apology_lemmas("better safe than sorry"), 0);
    }

    #[test]
    fn test_count_never_negative() {
        // Two phrase hits against one lemma hit.
        assert_eq!(count_apology_lemmas("not to blame git blame"), 0);
    }

    #[test]
    fn test_mixed_comment_keeps_surplus() {
        // One discounted hit plus one genuine apology.
        assert_eq!(count_apology_lemmas("git blame says sorry"), 1);
    }

    #[test]
    fn test_end_to_end_with_lemmatizer() {
        let lemmatizer = SuffixLemmatizer;
        let lemmas = lemmatize_comment(&lemmatizer, "Not my fault!");
        assert_eq!(count_apology_lemmas(&lemmas), 0);

        let lemmas = lemmatize_comment(&lemmatizer, "Sorry, my mistake.");
        assert_eq!(count_apology_lemmas(&lemmas), 2);
    }

    #[test]
    fn test_classify_appends_count_and_label() {
        let dir = TempDir::new().unwrap();
        let mut apology = vec![String::new(); ISSUES_HEADER.len()];
        apology[ISSUES_HEADER.len() - 1] = "So sorry!".to_string();
        let mut neutral = vec![String::new(); ISSUES_HEADER.len()];
        neutral[ISSUES_HEADER.len() - 1] = "LGTM".to_string();
        append_batch(dir.path(), Entity::Issues, &[apology, neutral]).unwrap();

        crate::nlp::preprocess(dir.path(), true).unwrap();
        classify(dir.path(), true).unwrap();

        let records = read_records(&Entity::Issues.csv_path(dir.path())).unwrap();
        let header = &records[0];
        assert_eq!(header[header.len() - 2], "NUM_APOLOGY_LEMMAS");
        assert_eq!(*header.last().unwrap(), "IS_APOLOGY");
        assert_eq!(records[1][header.len() - 2], "1");
        assert_eq!(*records[1].last().unwrap(), "1");
        assert_eq!(*records[2].last().unwrap(), "0");
    }
}
