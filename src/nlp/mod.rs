//! Comment text preprocessing: cleaning, tokenization, and lemmatization.
//!
//! The per-row transforms are pure `row -> row` functions, so they run on
//! the rayon pool as an order-preserving parallel map; the output row list
//! lines up with the input structurally, not by positional re-zipping.

pub mod apologies;

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;
use tracing::info;

use crate::store::{derived_path, read_records, write_records, Entity, StoreError};

static RE_PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.,:;?!]").unwrap());
// Every whitespace class except the regular space.
static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\n\r\t\x0B\x0C]").unwrap());
static RE_DUPLICATE_SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Lowercase, strip sentence punctuation, replace non-space whitespace with
/// spaces, and collapse runs of spaces.
pub fn clean(comment: &str) -> String {
    let lowered = comment.to_lowercase();
    let no_punct = RE_PUNCT.replace_all(&lowered, "");
    let spaced = RE_WHITESPACE.replace_all(&no_punct, " ");
    RE_DUPLICATE_SPACES.replace_all(&spaced, " ").into_owned()
}

/// Whitespace tokenization with negated-contraction splitting: "won't"
/// yields ["wo", "n't"], matching the phrase shapes the apology lexicon
/// expects.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for word in text.split_whitespace() {
        if word.len() > 3 && word.ends_with("n't") {
            tokens.push(word[..word.len() - 3].to_string());
            tokens.push("n't".to_string());
        } else {
            tokens.push(word.to_string());
        }
    }
    tokens
}

/// Token-to-lemma mapping. The concrete strategy is pluggable; everything
/// downstream only depends on lemmas matching the lexicon vocabulary.
pub trait Lemmatizer: Sync {
    fn lemma(&self, token: &str) -> String;
}

static IRREGULAR_LEMMAS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut map = HashMap::new();
    // Personal pronouns collapse to a single marker, which the non-apology
    // phrase list relies on ("not -PRON- fault").
    for pronoun in [
        "i", "me", "my", "mine", "myself", "we", "us", "our", "ours", "ourselves", "you", "your",
        "yours", "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers",
        "herself", "it", "its", "itself", "they", "them", "their", "theirs", "themselves",
    ] {
        map.insert(pronoun, "-PRON-");
    }
    for (form, lemma) in [
        ("am", "be"),
        ("is", "be"),
        ("are", "be"),
        ("was", "be"),
        ("were", "be"),
        ("been", "be"),
        ("'m", "be"),
        ("'re", "be"),
        ("'s", "be"),
        ("has", "have"),
        ("had", "have"),
        ("'ve", "have"),
        ("does", "do"),
        ("did", "do"),
        ("done", "do"),
        ("wo", "will"),
        ("ca", "can"),
        ("could", "can"),
        // "n't" stays its own lemma; the non-apology phrase list carries
        // both "n't" and "not" variants.
        ("oops", "oops"),
        ("apologies", "apology"),
        ("apologized", "apologize"),
        ("apologizing", "apologize"),
        ("apologised", "apologise"),
        ("apologising", "apologise"),
        ("blamed", "blame"),
        ("blaming", "blame"),
        ("blames", "blame"),
        ("excused", "excuse"),
        ("excuses", "excuse"),
        ("faults", "fault"),
        ("forgave", "forgive"),
        ("forgiven", "forgive"),
        ("forgives", "forgive"),
        ("forgot", "forget"),
        ("forgotten", "forget"),
        ("mistakes", "mistake"),
        ("mistook", "mistake"),
        ("regrets", "regret"),
        ("regretted", "regret"),
        ("regretting", "regret"),
    ] {
        map.insert(form, lemma);
    }
    map
});

/// Rule-based lemmatizer: an irregular-form table first, then a few
/// inflectional suffix rules. Words the rules do not cover pass through
/// unchanged.
#[derive(Debug, Default)]
pub struct SuffixLemmatizer;

impl Lemmatizer for SuffixLemmatizer {
    fn lemma(&self, token: &str) -> String {
        if let Some(lemma) = IRREGULAR_LEMMAS.get(token) {
            return (*lemma).to_string();
        }
        if let Some(stem) = token.strip_suffix("ies") {
            if !stem.is_empty() {
                return format!("{stem}y");
            }
        }
        if let Some(stem) = token.strip_suffix("sses") {
            return format!("{stem}ss");
        }
        if let Some(stem) = token.strip_suffix("s") {
            if stem.len() > 2 && !stem.ends_with('s') && !stem.ends_with('u') {
                return stem.to_string();
            }
        }
        token.to_string()
    }
}

/// Clean, tokenize, and lemmatize one comment into a space-joined lemma
/// string.
pub fn lemmatize_comment(lemmatizer: &dyn Lemmatizer, comment: &str) -> String {
    tokenize(&clean(comment))
        .iter()
        .map(|token| lemmatizer.lemma(token))
        .collect::<Vec<_>>()
        .join(" ")
}

fn transform_file(
    path: &Path,
    suffix: &str,
    new_columns: &[&str],
    overwrite: bool,
    extend_row: impl Fn(&[String]) -> Vec<String> + Sync,
) -> Result<(), StoreError> {
    if !path.exists() {
        return Ok(());
    }
    let new_path = derived_path(path, suffix);
    let records = read_records(path)?;

    let Some((header, rows)) = records.split_first() else {
        write_records(&new_path, &[])?;
        if overwrite {
            fs::rename(&new_path, path)?;
        }
        return Ok(());
    };

    let mut new_header = header.clone();
    new_header.extend(new_columns.iter().map(|c| c.to_string()));

    let mut out = Vec::with_capacity(records.len());
    out.push(new_header);
    out.par_extend(rows.par_iter().map(|row| {
        let mut new_row = row.clone();
        new_row.extend(extend_row(row));
        new_row
    }));

    write_records(&new_path, &out)?;
    info!(file = %new_path.display(), rows = out.len() - 1, "transformed");

    if overwrite {
        fs::rename(&new_path, path)?;
    }
    Ok(())
}

/// Append `COMMENT_TEXT_LEMMATIZED` to each canonical CSV. The comment text
/// is the last column of every entity schema.
pub fn preprocess(data_dir: &Path, overwrite: bool) -> Result<(), StoreError> {
    let lemmatizer = SuffixLemmatizer;
    for entity in Entity::ALL {
        transform_file(
            &entity.csv_path(data_dir),
            "_preprocessed",
            &["COMMENT_TEXT_LEMMATIZED"],
            overwrite,
            |row| {
                let comment = row.last().map(String::as_str).unwrap_or_default();
                vec![lemmatize_comment(&lemmatizer, comment)]
            },
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::append_batch;
    use crate::table::ISSUES_HEADER;
    use tempfile::TempDir;

    #[test]
    fn test_clean_strips_punctuation_and_whitespace() {
        assert_eq!(clean("Sorry, my\tbad!\nIt won't happen."), "sorry my bad it won't happen");
    }

    #[test]
    fn test_clean_collapses_duplicate_spaces() {
        assert_eq!(clean("a   b\r\nc"), "a b c");
    }

    #[test]
    fn test_tokenize_splits_negated_contractions() {
        assert_eq!(tokenize("i won't blame you"), ["i", "wo", "n't", "blame", "you"]);
        assert_eq!(tokenize("isn't"), ["is", "n't"]);
    }

    #[test]
    fn test_pronouns_collapse_to_marker() {
        let lemmatizer = SuffixLemmatizer;
        assert_eq!(lemmatizer.lemma("my"), "-PRON-");
        assert_eq!(lemmatizer.lemma("their"), "-PRON-");
    }

    #[test]
    fn test_suffix_rules() {
        let lemmatizer = SuffixLemmatizer;
        assert_eq!(lemmatizer.lemma("apologies"), "apology");
        assert_eq!(lemmatizer.lemma("mistakes"), "mistake");
        assert_eq!(lemmatizer.lemma("oops"), "oops");
        assert_eq!(lemmatizer.lemma("sorry"), "sorry");
    }

    #[test]
    fn test_lemmatize_comment_phrase_shape() {
        let lemmatizer = SuffixLemmatizer;
        assert_eq!(
            lemmatize_comment(&lemmatizer, "Not my fault!"),
            "not -PRON- fault"
        );
        assert_eq!(
            lemmatize_comment(&lemmatizer, "I won't apologize."),
            "-PRON- will n't apologize"
        );
    }

    #[test]
    fn test_preprocess_appends_lemmatized_column() {
        let dir = TempDir::new().unwrap();
        let mut row = vec![String::new(); ISSUES_HEADER.len()];
        row[ISSUES_HEADER.len() - 1] = "Sorry, my mistake!".to_string();
        append_batch(dir.path(), Entity::Issues, &[row]).unwrap();

        preprocess(dir.path(), true).unwrap();

        let records = read_records(&Entity::Issues.csv_path(dir.path())).unwrap();
        assert_eq!(*records[0].last().unwrap(), "COMMENT_TEXT_LEMMATIZED");
        assert_eq!(*records[1].last().unwrap(), "sorry -PRON- mistake");
    }

    #[test]
    fn test_preprocess_skips_missing_files() {
        let dir = TempDir::new().unwrap();
        preprocess(dir.path(), false).unwrap();
        let out = derived_path(&Entity::Commits.csv_path(dir.path()), "_preprocessed");
        assert!(!out.exists());
    }
}
