mod collect;
mod config;
mod github;
mod info;
mod nlp;
mod repo;
mod search;
mod stats;
mod store;
mod table;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{info, info_span, warn};
use tracing_subscriber::EnvFilter;

/// Apology Miner — collects GitHub issue, pull request, and commit comment
/// threads, persists them as tabular data, and classifies comments as
/// apologies by lemma counting.
#[derive(Parser, Debug)]
#[command(name = "apology-miner", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download data for every repository listed in a file (one URL per line)
    Download {
        /// File of GitHub repository URLs
        repo_file: PathBuf,

        /// Directory the per-entity CSVs are written into
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Which entity types to collect
        #[arg(long, value_enum, default_value = "all")]
        data: collect::DataKind,
    },

    /// Remove repeated header rows from the canonical CSVs
    Dedup {
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Replace the originals instead of writing *_dedup.csv siblings
        #[arg(long)]
        overwrite: bool,
    },

    /// Clean and lemmatize comment text (adds COMMENT_TEXT_LEMMATIZED)
    Preprocess {
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Replace the originals instead of writing *_preprocessed.csv siblings
        #[arg(long)]
        overwrite: bool,
    },

    /// Count apology lemmas and label comments (adds NUM_APOLOGY_LEMMAS, IS_APOLOGY)
    Classify {
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Replace the originals instead of writing *_classified.csv siblings
        #[arg(long)]
        overwrite: bool,
    },

    /// Load the canonical CSVs into the columnar archive
    Load {
        /// Archive file to create or extend
        archive: PathBuf,

        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Merge into an existing archive instead of rebuilding it
        #[arg(long)]
        append: bool,
    },

    /// Aggregate apology statistics over classified data
    Stats {
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },

    /// Search GitHub for repositories to mine
    Search {
        /// Free-text search term
        #[arg(long)]
        term: Option<String>,

        /// Minimum stargazer count
        #[arg(long)]
        stars: Option<u64>,

        /// Primary language filter
        #[arg(long)]
        language: Option<String>,

        /// Number of results to return (capped by the API at 1000)
        #[arg(long, default_value_t = 100)]
        total: usize,

        /// Save result URLs to this file
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Summarize the collected CSV data
    InfoData {
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },

    /// Summarize the columnar archive's datasets
    InfoArchive { archive: PathBuf },

    /// Show the authenticated API rate limit state
    InfoRateLimit,

    /// Delete the canonical CSVs
    Delete {
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Download {
            repo_file,
            data_dir,
            data,
        } => download(&repo_file, &data_dir, data).await?,
        Command::Dedup { data_dir, overwrite } => {
            store::dedup::deduplicate(&data_dir, overwrite)?;
        }
        Command::Preprocess { data_dir, overwrite } => {
            nlp::preprocess(&data_dir, overwrite)?;
        }
        Command::Classify { data_dir, overwrite } => {
            nlp::apologies::classify(&data_dir, overwrite)?;
        }
        Command::Load {
            archive,
            data_dir,
            append,
        } => {
            if append {
                store::archive::append(&archive, &data_dir)?;
            } else {
                store::archive::create(&archive, &data_dir)?;
            }
        }
        Command::Stats { data_dir } => {
            let report = stats::compute(&data_dir)?;
            stats::print_report(&report);
        }
        Command::Search {
            term,
            stars,
            language,
            total,
            save,
        } => {
            let config = config::Config::load()?;
            let client = github::GitHubClient::from_config(&config)?;
            let filters = search::SearchFilters {
                term,
                stars,
                language,
            };
            let results = search::search(&client, &filters, total).await;
            search::print_results(&results);
            if let Some(path) = save {
                search::save_urls(&results, &path)?;
                println!("Search results saved to '{}'.", path.display());
            }
        }
        Command::InfoData { data_dir } => info::info_data(&data_dir)?,
        Command::InfoArchive { archive } => info::info_archive(&archive)?,
        Command::InfoRateLimit => {
            let config = config::Config::load()?;
            let client = github::GitHubClient::from_config(&config)?;
            match client.run_query_value(&github::queries::rate_limit()).await {
                Some(value) => println!("{}", serde_json::to_string_pretty(&value)?),
                None => return Err("rate limit query failed".into()),
            }
        }
        Command::Delete { data_dir, yes } => {
            if !yes {
                return Err("refusing to delete without --yes".into());
            }
            store::delete_data(&data_dir)?;
        }
    }

    Ok(())
}

/// Run the full collection pipeline for every repository in the list file.
/// Invalid URLs are skipped with a warning; a repository that fails entirely
/// contributes nothing but never aborts the batch.
async fn download(
    repo_file: &std::path::Path,
    data_dir: &std::path::Path,
    kind: collect::DataKind,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = config::Config::load()?;
    let client = github::GitHubClient::from_config(&config)?;
    store::ensure_layout(data_dir)?;

    let contents = std::fs::read_to_string(repo_file)?;
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let repo = match repo::RepoRef::parse(line) {
            Ok(repo) => repo,
            Err(e) => {
                warn!(url = line, error = %e, "skipping repository");
                continue;
            }
        };

        let _span = info_span!("download", repo = %repo.url).entered();
        info!("collecting");
        let collected = collect::collect(&client, &repo, kind).await;

        store::append_batch(
            data_dir,
            store::Entity::Issues,
            &table::format_issues(&collected.repo, &collected.issues),
        )?;
        store::append_batch(
            data_dir,
            store::Entity::PullRequests,
            &table::format_pull_requests(&collected.repo, &collected.pull_requests),
        )?;
        store::append_batch(
            data_dir,
            store::Entity::Commits,
            &table::format_commits(&collected.repo, &collected.commits),
        )?;
        info!(
            issues = collected.issues.len(),
            pull_requests = collected.pull_requests.len(),
            commits = collected.commits.len(),
            "stored"
        );
    }

    Ok(())
}
