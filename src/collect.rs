//! Collection orchestration: turn wire nodes into domain records, one
//! repository at a time.
//!
//! A fetch failure for one entity type is isolated: the repository gets an
//! empty list for that type and collection carries on, so one broken or
//! vanished repository never aborts a batch.

use clap::ValueEnum;
use tracing::warn;

use crate::github::types::{CommentNode, CommitNode, IssueNode};
use crate::github::GitHubClient;
use crate::repo::RepoRef;

/// Which entity types a download run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DataKind {
    Issues,
    PullRequests,
    Commits,
    All,
}

impl DataKind {
    pub fn wants_issues(self) -> bool {
        matches!(self, DataKind::Issues | DataKind::All)
    }

    pub fn wants_pull_requests(self) -> bool {
        matches!(self, DataKind::PullRequests | DataKind::All)
    }

    pub fn wants_commits(self) -> bool {
        matches!(self, DataKind::Commits | DataKind::All)
    }
}

#[derive(Debug, Clone)]
pub struct Comment {
    pub created_at: String,
    pub author: String,
    pub url: String,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct Issue {
    pub number: u64,
    pub created_at: String,
    pub author: String,
    pub title: String,
    pub url: String,
    pub text: String,
    pub comments: Vec<Comment>,
}

/// Pull requests carry the same fields as issues but flow into their own
/// table, so they stay a distinct type.
#[derive(Debug, Clone)]
pub struct PullRequest {
    pub number: u64,
    pub created_at: String,
    pub author: String,
    pub title: String,
    pub url: String,
    pub text: String,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone)]
pub struct Commit {
    pub oid: String,
    pub created_at: String,
    pub author: String,
    pub additions: u64,
    pub deletions: u64,
    pub headline: String,
    pub url: String,
    pub text: String,
    pub comments: Vec<Comment>,
}

/// Everything collected for one repository in one run.
#[derive(Debug)]
pub struct Collected {
    pub repo: RepoRef,
    pub issues: Vec<Issue>,
    pub pull_requests: Vec<PullRequest>,
    pub commits: Vec<Commit>,
}

// Deleted accounts come back as a null author; their contributions are kept
// with an empty author field.
fn author_login(author: Option<crate::github::types::Actor>) -> String {
    author.map(|a| a.login).unwrap_or_default()
}

fn convert_comments(comments: crate::github::types::Connection<CommentNode>) -> Vec<Comment> {
    comments
        .edges
        .into_iter()
        .map(|edge| {
            let node = edge.node;
            Comment {
                created_at: node.created_at,
                author: author_login(node.author),
                url: node.url,
                text: node.body_text,
            }
        })
        .collect()
}

impl From<IssueNode> for Issue {
    fn from(node: IssueNode) -> Issue {
        Issue {
            number: node.number,
            created_at: node.created_at,
            author: author_login(node.author),
            title: node.title,
            url: node.url,
            text: node.body_text,
            comments: convert_comments(node.comments),
        }
    }
}

impl From<IssueNode> for PullRequest {
    fn from(node: IssueNode) -> PullRequest {
        PullRequest {
            number: node.number,
            created_at: node.created_at,
            author: author_login(node.author),
            title: node.title,
            url: node.url,
            text: node.body_text,
            comments: convert_comments(node.comments),
        }
    }
}

impl From<CommitNode> for Commit {
    fn from(node: CommitNode) -> Commit {
        Commit {
            oid: node.oid,
            created_at: node.committed_date,
            author: author_login(node.author.and_then(|a| a.user)),
            additions: node.additions,
            deletions: node.deletions,
            headline: node.message_headline,
            url: node.url,
            text: node.message_body,
            comments: convert_comments(node.comments),
        }
    }
}

/// Collect the requested entity types for one repository.
pub async fn collect(client: &GitHubClient, repo: &RepoRef, kind: DataKind) -> Collected {
    let mut collected = Collected {
        repo: repo.clone(),
        issues: Vec::new(),
        pull_requests: Vec::new(),
        commits: Vec::new(),
    };

    if kind.wants_issues() {
        match crate::github::fetch_issues(client, &repo.owner, &repo.name).await {
            Some(fetched) => {
                collected.issues = fetched.parents.into_iter().map(Issue::from).collect();
            }
            None => warn!(repo = %repo.url, "issue collection failed; recording none"),
        }
    }

    if kind.wants_pull_requests() {
        match crate::github::fetch_pull_requests(client, &repo.owner, &repo.name).await {
            Some(fetched) => {
                collected.pull_requests =
                    fetched.parents.into_iter().map(PullRequest::from).collect();
            }
            None => warn!(repo = %repo.url, "pull request collection failed; recording none"),
        }
    }

    if kind.wants_commits() {
        match crate::github::fetch_commits(client, &repo.owner, &repo.name).await {
            Some(fetched) => {
                collected.commits = fetched.parents.into_iter().map(Commit::from).collect();
            }
            None => warn!(repo = %repo.url, "commit collection failed; recording none"),
        }
    }

    collected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::types::{Actor, CommitActor, Connection, Edge, PageInfo};

    fn comments(nodes: Vec<CommentNode>) -> Connection<CommentNode> {
        Connection {
            total_count: Some(nodes.len() as u64),
            edges: nodes.into_iter().map(|node| Edge { node }).collect(),
            page_info: PageInfo::default(),
        }
    }

    #[test]
    fn test_issue_conversion_keeps_comments_in_order() {
        let node = IssueNode {
            number: 7,
            title: "t".into(),
            author: Some(Actor { login: "a".into() }),
            created_at: "2020-01-01T00:00:00Z".into(),
            url: "u".into(),
            body_text: "b".into(),
            comments: comments(vec![
                CommentNode {
                    author: Some(Actor { login: "c1".into() }),
                    body_text: "first".into(),
                    created_at: "2020-01-02T00:00:00Z".into(),
                    url: "u1".into(),
                },
                CommentNode {
                    author: None,
                    body_text: "second".into(),
                    created_at: "2020-01-03T00:00:00Z".into(),
                    url: "u2".into(),
                },
            ]),
        };

        let issue = Issue::from(node);
        assert_eq!(issue.number, 7);
        assert_eq!(issue.comments.len(), 2);
        assert_eq!(issue.comments[0].text, "first");
        // Deleted account maps to an empty author, not a crash.
        assert_eq!(issue.comments[1].author, "");
    }

    #[test]
    fn test_commit_conversion_with_null_author() {
        let node = CommitNode {
            oid: "deadbeef".into(),
            author: Some(CommitActor { user: None }),
            additions: 3,
            deletions: 1,
            committed_date: "2020-02-02T00:00:00Z".into(),
            url: "u".into(),
            message_headline: "h".into(),
            message_body: "b".into(),
            comments: comments(vec![]),
        };

        let commit = Commit::from(node);
        assert_eq!(commit.author, "");
        assert_eq!(commit.headline, "h");
        assert_eq!(commit.created_at, "2020-02-02T00:00:00Z");
    }

    #[test]
    fn test_data_kind_all_covers_everything() {
        assert!(DataKind::All.wants_issues());
        assert!(DataKind::All.wants_pull_requests());
        assert!(DataKind::All.wants_commits());
        assert!(!DataKind::Issues.wants_commits());
        assert!(!DataKind::Commits.wants_pull_requests());
    }
}
