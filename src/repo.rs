use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("'{0}' is not a valid GitHub repository URL")]
    InvalidUrl(String),
}

/// A GitHub repository reference parsed from a URL like
/// `https://github.com/octocat/Hello-World/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub url: String,
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    /// Parse a repository URL into its owner and name segments.
    ///
    /// The URL must start with `https://github.com/`; the owner and name are
    /// the third and fourth slash-separated segments. Anything else is
    /// rejected so one bad line in a repo list can be skipped without
    /// aborting the batch.
    pub fn parse(repo_url: &str) -> Result<RepoRef, RepoError> {
        if !repo_url.starts_with("https://github.com/") {
            return Err(RepoError::InvalidUrl(repo_url.to_string()));
        }

        let segments: Vec<&str> = repo_url.split('/').collect();
        let owner = segments.get(3).copied().unwrap_or_default();
        let name = segments.get(4).copied().unwrap_or_default();
        if owner.is_empty() || name.is_empty() {
            return Err(RepoError::InvalidUrl(repo_url.to_string()));
        }

        Ok(RepoRef {
            url: repo_url.to_string(),
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}
