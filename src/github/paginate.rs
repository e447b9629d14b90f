//! Cursor pagination and comment-thread completion.
//!
//! The network path is strictly sequential: each page's request depends on
//! the previous page's cursor, so there is nothing to parallelize here.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{info, instrument, warn};

use super::client::GitHubClient;
use super::queries;
use super::types::{
    CommentNode, CommentsHolder, CommitNode, CommitsData, Connection, IssueNode, IssuesData,
    PullRequestsData,
};

/// Fully paginated parent list for one repository and entity type, with the
/// repository identity as reported by the API.
#[derive(Debug)]
pub struct FetchedParents<T> {
    pub repo_name: String,
    pub repo_owner: String,
    pub parents: Vec<T>,
}

/// Follow a connection's cursor until the entity list is exhausted.
///
/// A query error mid-stream (the client returning `None`) stops pagination
/// for this list and keeps the partial result, with a warning, rather than
/// retrying forever.
async fn drain<D, T>(
    client: &GitHubClient,
    first: Connection<T>,
    next_query: impl Fn(&str) -> String,
    extract: impl Fn(D) -> Option<Connection<T>>,
) -> Vec<T>
where
    D: DeserializeOwned,
{
    let mut nodes: Vec<T> = first.edges.into_iter().map(|e| e.node).collect();
    let mut page_info = first.page_info;

    while page_info.has_next_page {
        let Some(cursor) = page_info.end_cursor.clone() else {
            warn!("pagination reported more pages but no cursor; stopping");
            break;
        };
        let Some(data) = client.run_query::<D>(&next_query(&cursor)).await else {
            warn!("page fetch failed; keeping partial list");
            break;
        };
        let Some(connection) = extract(data) else {
            warn!("page response missing the expected connection; keeping partial list");
            break;
        };
        nodes.extend(connection.edges.into_iter().map(|e| e.node));
        page_info = connection.page_info;
    }

    nodes
}

/// Fetch every issue of a repository, then complete each issue's comment
/// thread. Returns `None` if the very first page fails outright; the caller
/// records an empty list and the batch moves on.
#[instrument(skip(client))]
pub async fn fetch_issues(
    client: &GitHubClient,
    owner: &str,
    name: &str,
) -> Option<FetchedParents<IssueNode>> {
    let first: IssuesData = client
        .run_query(&queries::issues_page(owner, name, None))
        .await?;
    let repo = first.repository?;

    let mut issues = drain(
        client,
        repo.issues,
        |cursor| queries::issues_page(owner, name, Some(cursor)),
        |data: IssuesData| data.repository.map(|r| r.issues),
    )
    .await;

    for issue in &mut issues {
        let number = issue.number;
        complete_thread(client, &mut issue.comments, |cursor| {
            queries::issue_comments_page(owner, name, number, cursor)
        })
        .await;
    }

    info!(count = issues.len(), "collected issues");
    Some(FetchedParents {
        repo_name: repo.name,
        repo_owner: repo.owner.login,
        parents: issues,
    })
}

/// Fetch every pull request of a repository and complete its comment
/// threads. Pull requests share the issue node shape.
#[instrument(skip(client))]
pub async fn fetch_pull_requests(
    client: &GitHubClient,
    owner: &str,
    name: &str,
) -> Option<FetchedParents<IssueNode>> {
    let first: PullRequestsData = client
        .run_query(&queries::pull_requests_page(owner, name, None))
        .await?;
    let repo = first.repository?;

    let mut pull_requests = drain(
        client,
        repo.pull_requests,
        |cursor| queries::pull_requests_page(owner, name, Some(cursor)),
        |data: PullRequestsData| data.repository.map(|r| r.pull_requests),
    )
    .await;

    for pull_request in &mut pull_requests {
        let number = pull_request.number;
        complete_thread(client, &mut pull_request.comments, |cursor| {
            queries::pull_request_comments_page(owner, name, number, cursor)
        })
        .await;
    }

    info!(count = pull_requests.len(), "collected pull requests");
    Some(FetchedParents {
        repo_name: repo.name,
        repo_owner: repo.owner.login,
        parents: pull_requests,
    })
}

/// Fetch the default-branch commit history of a repository and complete
/// each commit's comment thread. A repository without a default branch
/// (an empty repository) yields an empty list.
#[instrument(skip(client))]
pub async fn fetch_commits(
    client: &GitHubClient,
    owner: &str,
    name: &str,
) -> Option<FetchedParents<CommitNode>> {
    let first: CommitsData = client
        .run_query(&queries::commits_page(owner, name, None))
        .await?;
    let repo = first.repository?;
    let repo_name = repo.name;
    let repo_owner = repo.owner.login;

    let history = repo
        .default_branch_ref
        .and_then(|r| r.target)
        .map(|t| t.history);

    let mut commits = match history {
        Some(history) => {
            drain(
                client,
                history,
                |cursor| queries::commits_page(owner, name, Some(cursor)),
                |data: CommitsData| {
                    data.repository
                        .and_then(|r| r.default_branch_ref)
                        .and_then(|r| r.target)
                        .map(|t| t.history)
                },
            )
            .await
        }
        None => {
            warn!("repository has no default branch; no commits to collect");
            Vec::new()
        }
    };

    for commit in &mut commits {
        let oid = commit.oid.clone();
        complete_thread(client, &mut commit.comments, |cursor| {
            queries::commit_comments_page(owner, name, &oid, cursor)
        })
        .await;
    }

    info!(count = commits.len(), "collected commits");
    Some(FetchedParents {
        repo_name,
        repo_owner,
        parents: commits,
    })
}

/// Fetch the remaining comment pages for one parent whose first page was
/// truncated. Each round appends the returned comments and replaces the
/// parent's page info; the loop converges once `has_next_page` is false.
/// A query error abandons completion for this parent only.
async fn complete_thread(
    client: &GitHubClient,
    comments: &mut Connection<CommentNode>,
    next_query: impl Fn(&str) -> String,
) {
    while comments.page_info.has_next_page {
        let Some(cursor) = comments.page_info.end_cursor.clone() else {
            warn!("comment thread reported more pages but no cursor; stopping");
            break;
        };
        let Some(data) = client
            .run_query::<CommentsPageData>(&next_query(&cursor))
            .await
        else {
            warn!("comment page fetch failed; thread left incomplete");
            break;
        };
        let Some(page) = data.into_comments() else {
            warn!("comment page response missing parent; thread left incomplete");
            break;
        };
        comments.edges.extend(page.edges);
        comments.page_info = page.page_info;
    }
}

/// Follow-up envelope shared by all three parent kinds. The three queries
/// nest the comments under different field names (`issue`, `pullRequest`,
/// `object`); exactly one is present per response.
#[derive(Debug, Deserialize)]
struct CommentsPageData {
    repository: Option<CommentsPageRepository>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentsPageRepository {
    issue: Option<CommentsHolder>,
    pull_request: Option<CommentsHolder>,
    object: Option<CommentsHolder>,
}

impl CommentsPageData {
    fn into_comments(self) -> Option<Connection<CommentNode>> {
        let repo = self.repository?;
        repo.issue
            .or(repo.pull_request)
            .or(repo.object)
            .map(|holder| holder.comments)
    }
}
