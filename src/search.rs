//! Repository search: seed a collection run by finding repositories to
//! mine.

use std::fs;
use std::io::Write;
use std::path::Path;

use tracing::{info, instrument};

use crate::github::queries;
use crate::github::types::SearchData;
use crate::github::GitHubClient;

/// The search API stops serving results past this rank regardless of
/// pagination.
pub const MAX_RESULTS: usize = 1000;

/// Search filters combined into one query string.
#[derive(Debug, Default, Clone)]
pub struct SearchFilters {
    pub term: Option<String>,
    pub stars: Option<u64>,
    pub language: Option<String>,
}

impl SearchFilters {
    /// Render the GitHub search qualifier string, e.g.
    /// `parser stars:>=100 language:Rust`.
    pub fn query_string(&self) -> String {
        let mut parts = Vec::new();
        if let Some(term) = &self.term {
            if !term.is_empty() {
                parts.push(term.clone());
            }
        }
        if let Some(stars) = self.stars {
            if stars > 0 {
                parts.push(format!("stars:>={stars}"));
            }
        }
        if let Some(language) = &self.language {
            if !language.is_empty() {
                parts.push(format!("language:{language}"));
            }
        }
        parts.join(" ")
    }
}

#[derive(Debug, Clone)]
pub struct SearchResult {
    pub url: String,
    pub stars: u64,
    pub language: Option<String>,
}

/// Run a repository search, paginating until `total` results are in hand or
/// the result stream ends. `total` is clamped to the API's result ceiling.
#[instrument(skip(client))]
pub async fn search(
    client: &GitHubClient,
    filters: &SearchFilters,
    total: usize,
) -> Vec<SearchResult> {
    let total = total.min(MAX_RESULTS);
    let query_string = filters.query_string();

    let mut results: Vec<SearchResult> = Vec::new();
    let mut cursor: Option<String> = None;

    loop {
        let query = queries::search_page(&query_string, cursor.as_deref());
        let Some(data) = client.run_query::<SearchData>(&query).await else {
            break;
        };
        results.extend(data.search.edges.into_iter().map(|edge| SearchResult {
            url: edge.node.url,
            stars: edge.node.stargazer_count,
            language: edge.node.primary_language.map(|l| l.name),
        }));

        if !data.search.page_info.has_next_page || results.len() >= total {
            break;
        }
        match data.search.page_info.end_cursor {
            Some(end_cursor) => cursor = Some(end_cursor),
            None => break,
        }
    }

    results.truncate(total);
    info!(results = results.len(), "search finished");
    results
}

pub fn print_results(results: &[SearchResult]) {
    for result in results {
        println!(
            "{} {} {}",
            result.url,
            result.stars,
            result.language.as_deref().unwrap_or("None")
        );
    }
}

/// Save the result URLs, one per line, ready to feed back into a download
/// run.
pub fn save_urls(results: &[SearchResult], path: &Path) -> std::io::Result<()> {
    let mut file = fs::File::create(path)?;
    for result in results {
        writeln!(file, "{}", result.url)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{body_string_contains, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_query_string_combines_set_filters() {
        let filters = SearchFilters {
            term: Some("parser".to_string()),
            stars: Some(100),
            language: Some("Rust".to_string()),
        };
        assert_eq!(filters.query_string(), "parser stars:>=100 language:Rust");
    }

    #[test]
    fn test_query_string_skips_unset_filters() {
        let filters = SearchFilters {
            term: None,
            stars: Some(50),
            language: None,
        };
        assert_eq!(filters.query_string(), "stars:>=50");
        assert_eq!(SearchFilters::default().query_string(), "");
    }

    fn repo_edge(url: &str, stars: u64, language: Option<&str>) -> serde_json::Value {
        json!({"node": {
            "url": url,
            "stargazerCount": stars,
            "primaryLanguage": language.map(|name| json!({"name": name})),
        }})
    }

    fn test_client(endpoint: String) -> GitHubClient {
        let config: Config = toml::from_str(&format!(
            "[github]\ntoken = \"ghp_test\"\nendpoint = \"{endpoint}\"\n"
        ))
        .unwrap();
        GitHubClient::from_config(&config).unwrap()
    }

    #[tokio::test]
    async fn test_search_paginates_and_truncates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains(r#"after:\"cur1\""#))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"search": {
                "edges": [
                    repo_edge("https://github.com/o/b", 20, Some("Rust")),
                    repo_edge("https://github.com/o/c", 10, None),
                ],
                "pageInfo": {"endCursor": null, "hasNextPage": false}
            }}})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"search": {
                "edges": [repo_edge("https://github.com/o/a", 30, Some("Rust"))],
                "pageInfo": {"endCursor": "cur1", "hasNextPage": true}
            }}})))
            .mount(&server)
            .await;

        let client = test_client(server.uri());
        let filters = SearchFilters {
            stars: Some(10),
            ..Default::default()
        };
        let results = search(&client, &filters, 2).await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].url, "https://github.com/o/a");
        assert_eq!(results[1].language.as_deref(), Some("Rust"));
    }

    #[test]
    fn test_save_urls_one_per_line() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.txt");
        let results = vec![
            SearchResult {
                url: "https://github.com/o/a".to_string(),
                stars: 1,
                language: None,
            },
            SearchResult {
                url: "https://github.com/o/b".to_string(),
                stars: 2,
                language: None,
            },
        ];
        save_urls(&results, &path).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "https://github.com/o/a\nhttps://github.com/o/b\n"
        );
    }
}
