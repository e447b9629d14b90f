//! Typed records for the GraphQL wire format.
//!
//! Each response stage gets an explicit serde type instead of key-presence
//! checks on loose JSON: the transport envelope decodes into a tagged
//! [`QueryOutcome`], and each query has a `data` envelope mirroring its
//! GraphQL path.

use serde::Deserialize;

/// Raw response body from the GraphQL endpoint. Exactly one of the optional
/// fields is meaningful per response: `data` on success, `errors` on a query
/// error, `documentation_url` when the secondary rate limit trips.
#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    pub data: Option<serde_json::Value>,
    pub errors: Option<Vec<GraphQlError>>,
    pub documentation_url: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlError {
    pub message: String,
}

/// The envelope collapsed into a tag the client can match on.
#[derive(Debug)]
pub enum QueryOutcome {
    Data(serde_json::Value),
    RateLimited { documentation_url: String },
    Failed { messages: Vec<String> },
}

impl ApiResponse {
    pub fn into_outcome(self) -> QueryOutcome {
        if let Some(url) = self.documentation_url {
            return QueryOutcome::RateLimited {
                documentation_url: url,
            };
        }
        if let Some(errors) = self.errors {
            return QueryOutcome::Failed {
                messages: errors.into_iter().map(|e| e.message).collect(),
            };
        }
        match self.data {
            Some(data) => QueryOutcome::Data(data),
            None => QueryOutcome::Failed {
                messages: vec![self
                    .message
                    .unwrap_or_else(|| "response carried neither data nor errors".to_string())],
            },
        }
    }
}

/// Continuation token for one paginated list.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub end_cursor: Option<String>,
    pub has_next_page: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Edge<T> {
    pub node: T,
}

/// One page of a connection: the edges plus the cursor state needed to ask
/// for the next page.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    #[serde(default)]
    pub total_count: Option<u64>,
    pub edges: Vec<Edge<T>>,
    pub page_info: PageInfo,
}

/// `author { login }` — null for deleted accounts.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Actor {
    pub login: String,
}

/// `author { user { login } }` on commits; both levels can be null.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommitActor {
    pub user: Option<Actor>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentNode {
    pub author: Option<Actor>,
    pub body_text: String,
    pub created_at: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueNode {
    pub number: u64,
    pub title: String,
    pub author: Option<Actor>,
    pub created_at: String,
    pub url: String,
    pub body_text: String,
    pub comments: Connection<CommentNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitNode {
    pub oid: String,
    pub author: Option<CommitActor>,
    pub additions: u64,
    pub deletions: u64,
    pub committed_date: String,
    pub url: String,
    pub message_headline: String,
    pub message_body: String,
    pub comments: Connection<CommentNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRepoNode {
    pub url: String,
    pub stargazer_count: u64,
    pub primary_language: Option<LanguageNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LanguageNode {
    pub name: String,
}

// Per-query `data` envelopes, mirroring the GraphQL document paths. The
// `repository` level is Option because an unknown repo comes back as null
// data rather than an error.

#[derive(Debug, Deserialize)]
pub struct IssuesData {
    pub repository: Option<IssuesRepository>,
}

#[derive(Debug, Deserialize)]
pub struct IssuesRepository {
    pub name: String,
    pub owner: Actor,
    pub issues: Connection<IssueNode>,
}

#[derive(Debug, Deserialize)]
pub struct PullRequestsData {
    pub repository: Option<PullRequestsRepository>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestsRepository {
    pub name: String,
    pub owner: Actor,
    pub pull_requests: Connection<IssueNode>,
}

#[derive(Debug, Deserialize)]
pub struct CommitsData {
    pub repository: Option<CommitsRepository>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitsRepository {
    pub name: String,
    pub owner: Actor,
    pub default_branch_ref: Option<DefaultBranchRef>,
}

#[derive(Debug, Deserialize)]
pub struct DefaultBranchRef {
    pub target: Option<CommitHistoryTarget>,
}

#[derive(Debug, Deserialize)]
pub struct CommitHistoryTarget {
    pub history: Connection<CommitNode>,
}

/// The `comments` connection of a single parent, whatever its kind.
#[derive(Debug, Deserialize)]
pub struct CommentsHolder {
    pub comments: Connection<CommentNode>,
}

#[derive(Debug, Deserialize)]
pub struct SearchData {
    pub search: Connection<SearchRepoNode>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_rate_limited_wins_over_data() {
        let resp: ApiResponse = serde_json::from_str(
            r#"{"documentation_url": "https://docs.github.com/rest/...", "message": "You have exceeded a secondary rate limit"}"#,
        )
        .unwrap();
        assert!(matches!(
            resp.into_outcome(),
            QueryOutcome::RateLimited { .. }
        ));
    }

    #[test]
    fn test_outcome_errors() {
        let resp: ApiResponse = serde_json::from_str(
            r#"{"data": null, "errors": [{"message": "Could not resolve to a Repository"}]}"#,
        )
        .unwrap();
        match resp.into_outcome() {
            QueryOutcome::Failed { messages } => {
                assert_eq!(messages, vec!["Could not resolve to a Repository"]);
            }
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[test]
    fn test_outcome_data() {
        let resp: ApiResponse = serde_json::from_str(r#"{"data": {"x": 1}}"#).unwrap();
        assert!(matches!(resp.into_outcome(), QueryOutcome::Data(_)));
    }

    #[test]
    fn test_outcome_bare_message_is_failure() {
        let resp: ApiResponse =
            serde_json::from_str(r#"{"message": "Bad credentials"}"#).unwrap();
        match resp.into_outcome() {
            QueryOutcome::Failed { messages } => assert_eq!(messages, vec!["Bad credentials"]),
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_issues_page() {
        let data = r#"{
            "repository": {
                "name": "Hello-World",
                "owner": {"login": "octocat"},
                "issues": {
                    "totalCount": 1,
                    "edges": [{
                        "node": {
                            "number": 1,
                            "title": "First",
                            "author": null,
                            "createdAt": "2020-01-01T00:00:00Z",
                            "url": "https://github.com/octocat/Hello-World/issues/1",
                            "bodyText": "hello",
                            "comments": {
                                "totalCount": 0,
                                "edges": [],
                                "pageInfo": {"endCursor": null, "hasNextPage": false}
                            }
                        }
                    }],
                    "pageInfo": {"endCursor": "abc", "hasNextPage": false}
                }
            }
        }"#;
        let parsed: IssuesData = serde_json::from_str(data).unwrap();
        let repo = parsed.repository.unwrap();
        assert_eq!(repo.owner.login, "octocat");
        assert_eq!(repo.issues.edges.len(), 1);
        assert!(repo.issues.edges[0].node.author.is_none());
        assert_eq!(repo.issues.page_info.end_cursor.as_deref(), Some("abc"));
    }

    #[test]
    fn test_decode_commit_node_with_null_author_user() {
        let data = r#"{
            "oid": "deadbeef",
            "author": {"user": null},
            "additions": 3,
            "deletions": 1,
            "committedDate": "2020-02-02T00:00:00Z",
            "url": "u",
            "messageHeadline": "h",
            "messageBody": "b",
            "comments": {"totalCount": 0, "edges": [], "pageInfo": {"endCursor": null, "hasNextPage": false}}
        }"#;
        let node: CommitNode = serde_json::from_str(data).unwrap();
        assert!(node.author.unwrap().user.is_none());
    }
}
