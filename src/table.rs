//! Flattening nested parent/comment structures into fixed-schema rows.
//!
//! One row per (parent, comment) pair; a commentless parent emits a single
//! row with the four comment fields empty. The header row is not part of
//! the formatter output; the store adds it on write.

use crate::collect::{Comment, Commit, Issue, PullRequest};
use crate::repo::RepoRef;

pub const ISSUES_HEADER: [&str; 13] = [
    "REPO_URL",
    "REPO_NAME",
    "REPO_OWNER",
    "ISSUE_NUMBER",
    "ISSUE_CREATION_DATE",
    "ISSUE_AUTHOR",
    "ISSUE_TITLE",
    "ISSUE_URL",
    "ISSUE_TEXT",
    "COMMENT_CREATION_DATE",
    "COMMENT_AUTHOR",
    "COMMENT_URL",
    "COMMENT_TEXT",
];

pub const COMMITS_HEADER: [&str; 15] = [
    "REPO_URL",
    "REPO_NAME",
    "REPO_OWNER",
    "COMMIT_OID",
    "COMMIT_CREATION_DATE",
    "COMMIT_AUTHOR",
    "COMMIT_ADDITIONS",
    "COMMIT_DELETIONS",
    "COMMIT_HEADLINE",
    "COMMIT_URL",
    "COMMIT_TEXT",
    "COMMENT_CREATION_DATE",
    "COMMENT_AUTHOR",
    "COMMENT_URL",
    "COMMENT_TEXT",
];

pub const PULL_REQUESTS_HEADER: [&str; 13] = [
    "REPO_URL",
    "REPO_NAME",
    "REPO_OWNER",
    "PULL_REQUEST_NUMBER",
    "PULL_REQUEST_TITLE",
    "PULL_REQUEST_AUTHOR",
    "PULL_REQUEST_CREATION_DATE",
    "PULL_REQUEST_URL",
    "PULL_REQUEST_TEXT",
    "COMMENT_CREATION_DATE",
    "COMMENT_AUTHOR",
    "COMMENT_URL",
    "COMMENT_TEXT",
];

pub type Row = Vec<String>;

fn comment_fields(comment: Option<&Comment>) -> [String; 4] {
    match comment {
        Some(c) => [
            c.created_at.clone(),
            c.author.clone(),
            c.url.clone(),
            c.text.clone(),
        ],
        None => Default::default(),
    }
}

fn explode<T>(parents: &[T], mut one_row: impl FnMut(&T, Option<&Comment>) -> Row) -> Vec<Row>
where
    T: HasComments,
{
    let mut rows = Vec::new();
    for parent in parents {
        let comments = parent.comments();
        if comments.is_empty() {
            rows.push(one_row(parent, None));
        } else {
            for comment in comments {
                rows.push(one_row(parent, Some(comment)));
            }
        }
    }
    rows
}

trait HasComments {
    fn comments(&self) -> &[Comment];
}

impl HasComments for Issue {
    fn comments(&self) -> &[Comment] {
        &self.comments
    }
}

impl HasComments for PullRequest {
    fn comments(&self) -> &[Comment] {
        &self.comments
    }
}

impl HasComments for Commit {
    fn comments(&self) -> &[Comment] {
        &self.comments
    }
}

/// Numeric sort on the parent number (column 3), then comment timestamp.
fn sort_by_number_then_comment(rows: &mut [Row]) {
    rows.sort_by(|a, b| {
        let na: u64 = a[3].parse().unwrap_or(0);
        let nb: u64 = b[3].parse().unwrap_or(0);
        na.cmp(&nb).then_with(|| a[9].cmp(&b[9]))
    });
}

/// Flatten issues into sorted rows matching [`ISSUES_HEADER`].
pub fn format_issues(repo: &RepoRef, issues: &[Issue]) -> Vec<Row> {
    let mut rows = explode(issues, |issue, comment| {
        let [c_created, c_author, c_url, c_text] = comment_fields(comment);
        vec![
            repo.url.clone(),
            repo.name.clone(),
            repo.owner.clone(),
            issue.number.to_string(),
            issue.created_at.clone(),
            issue.author.clone(),
            issue.title.clone(),
            issue.url.clone(),
            issue.text.clone(),
            c_created,
            c_author,
            c_url,
            c_text,
        ]
    });
    sort_by_number_then_comment(&mut rows);
    rows
}

/// Flatten pull requests into sorted rows matching [`PULL_REQUESTS_HEADER`].
pub fn format_pull_requests(repo: &RepoRef, pull_requests: &[PullRequest]) -> Vec<Row> {
    let mut rows = explode(pull_requests, |pr, comment| {
        let [c_created, c_author, c_url, c_text] = comment_fields(comment);
        vec![
            repo.url.clone(),
            repo.name.clone(),
            repo.owner.clone(),
            pr.number.to_string(),
            pr.title.clone(),
            pr.author.clone(),
            pr.created_at.clone(),
            pr.url.clone(),
            pr.text.clone(),
            c_created,
            c_author,
            c_url,
            c_text,
        ]
    });
    sort_by_number_then_comment(&mut rows);
    rows
}

/// Flatten commits into rows matching [`COMMITS_HEADER`], sorted by commit
/// timestamp (ISO 8601 sorts lexically) then comment timestamp.
pub fn format_commits(repo: &RepoRef, commits: &[Commit]) -> Vec<Row> {
    let mut rows = explode(commits, |commit, comment| {
        let [c_created, c_author, c_url, c_text] = comment_fields(comment);
        vec![
            repo.url.clone(),
            repo.name.clone(),
            repo.owner.clone(),
            commit.oid.clone(),
            commit.created_at.clone(),
            commit.author.clone(),
            commit.additions.to_string(),
            commit.deletions.to_string(),
            commit.headline.clone(),
            commit.url.clone(),
            commit.text.clone(),
            c_created,
            c_author,
            c_url,
            c_text,
        ]
    });
    rows.sort_by(|a, b| a[4].cmp(&b[4]).then_with(|| a[11].cmp(&b[11])));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> RepoRef {
        RepoRef::parse("https://github.com/octocat/Hello-World").unwrap()
    }

    fn comment(created: &str, text: &str) -> Comment {
        Comment {
            created_at: created.to_string(),
            author: "commenter".to_string(),
            url: "cu".to_string(),
            text: text.to_string(),
        }
    }

    fn issue(number: u64, comments: Vec<Comment>) -> Issue {
        Issue {
            number,
            created_at: "2020-01-01T00:00:00Z".to_string(),
            author: "octocat".to_string(),
            title: format!("Issue {number}"),
            url: format!("iu{number}"),
            text: "body".to_string(),
            comments,
        }
    }

    #[test]
    fn test_commentless_issue_emits_one_row_with_empty_comment_fields() {
        let rows = format_issues(&repo(), &[issue(1, vec![])]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), ISSUES_HEADER.len());
        assert_eq!(&rows[0][9..13], &["", "", "", ""]);
    }

    #[test]
    fn test_one_row_per_comment_with_parent_fields_duplicated() {
        let rows = format_issues(
            &repo(),
            &[issue(
                2,
                vec![
                    comment("2020-01-02T00:00:00Z", "a"),
                    comment("2020-01-03T00:00:00Z", "b"),
                ],
            )],
        );
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][3], "2");
        assert_eq!(rows[1][3], "2");
        assert_eq!(rows[0][12], "a");
        assert_eq!(rows[1][12], "b");
    }

    #[test]
    fn test_issues_sorted_numerically_then_by_comment_date() {
        let rows = format_issues(
            &repo(),
            &[
                issue(
                    10,
                    vec![
                        comment("2020-01-05T00:00:00Z", "later"),
                        comment("2020-01-04T00:00:00Z", "earlier"),
                    ],
                ),
                issue(2, vec![]),
            ],
        );
        // Numeric parent order, not lexicographic ("10" < "2" as strings).
        assert_eq!(rows[0][3], "2");
        assert_eq!(rows[1][3], "10");
        assert_eq!(rows[1][12], "earlier");
        assert_eq!(rows[2][12], "later");
    }

    #[test]
    fn test_pull_request_rows_match_header_order() {
        let pr = PullRequest {
            number: 5,
            created_at: "2020-03-01T00:00:00Z".to_string(),
            author: "octocat".to_string(),
            title: "Add feature".to_string(),
            url: "pu".to_string(),
            text: "body".to_string(),
            comments: vec![],
        };
        let rows = format_pull_requests(&repo(), &[pr]);
        let title_col = PULL_REQUESTS_HEADER
            .iter()
            .position(|c| *c == "PULL_REQUEST_TITLE")
            .unwrap();
        let date_col = PULL_REQUESTS_HEADER
            .iter()
            .position(|c| *c == "PULL_REQUEST_CREATION_DATE")
            .unwrap();
        assert_eq!(rows[0][title_col], "Add feature");
        assert_eq!(rows[0][date_col], "2020-03-01T00:00:00Z");
    }

    #[test]
    fn test_commits_sorted_by_date() {
        let commit = |oid: &str, date: &str| Commit {
            oid: oid.to_string(),
            created_at: date.to_string(),
            author: "octocat".to_string(),
            additions: 1,
            deletions: 0,
            headline: "h".to_string(),
            url: "cu".to_string(),
            text: "b".to_string(),
            comments: vec![],
        };
        let rows = format_commits(
            &repo(),
            &[
                commit("bbb", "2021-01-01T00:00:00Z"),
                commit("aaa", "2020-01-01T00:00:00Z"),
            ],
        );
        assert_eq!(rows[0][3], "aaa");
        assert_eq!(rows[1][3], "bbb");
        assert_eq!(rows[0].len(), COMMITS_HEADER.len());
    }
}
