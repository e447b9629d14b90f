//! GraphQL query builders.
//!
//! Every function returns a complete, directly-submittable query string with
//! all placeholders substituted. Owner/name content is not validated here;
//! malformed identifiers are surfaced by the API, not locally.

/// Parents and nested comment lists are both requested in pages of 100,
/// the API maximum.
pub const PAGE_SIZE: u32 = 100;

fn after_clause(after: Option<&str>) -> String {
    match after {
        Some(cursor) => format!(", after:\"{}\"", cursor),
        None => String::new(),
    }
}

const COMMENT_FIELDS: &str = "\
                        node {
                            author { login }
                            bodyText
                            createdAt
                            url
                        }";

/// Issues (open and closed) with their first page of comments.
pub fn issues_page(owner: &str, name: &str, after: Option<&str>) -> String {
    format!(
        r#"query {{
    repository(owner:"{owner}", name:"{name}") {{
        name
        owner {{ login }}
        issues(first:{PAGE_SIZE}, states:[OPEN,CLOSED]{after}) {{
            totalCount
            edges {{
                node {{
                    number
                    title
                    author {{ login }}
                    createdAt
                    url
                    bodyText
                    comments(first:{PAGE_SIZE}) {{
                        totalCount
                        edges {{
{COMMENT_FIELDS}
                        }}
                        pageInfo {{ endCursor hasNextPage }}
                    }}
                }}
            }}
            pageInfo {{ endCursor hasNextPage }}
        }}
    }}
}}"#,
        after = after_clause(after),
    )
}

/// Pull requests (open, closed, and merged) with their first page of comments.
pub fn pull_requests_page(owner: &str, name: &str, after: Option<&str>) -> String {
    format!(
        r#"query {{
    repository(owner:"{owner}", name:"{name}") {{
        name
        owner {{ login }}
        pullRequests(first:{PAGE_SIZE}, states:[OPEN,CLOSED,MERGED]{after}) {{
            totalCount
            edges {{
                node {{
                    number
                    title
                    author {{ login }}
                    createdAt
                    url
                    bodyText
                    comments(first:{PAGE_SIZE}) {{
                        totalCount
                        edges {{
{COMMENT_FIELDS}
                        }}
                        pageInfo {{ endCursor hasNextPage }}
                    }}
                }}
            }}
            pageInfo {{ endCursor hasNextPage }}
        }}
    }}
}}"#,
        after = after_clause(after),
    )
}

/// Default-branch commit history with the first page of commit comments.
pub fn commits_page(owner: &str, name: &str, after: Option<&str>) -> String {
    format!(
        r#"query {{
    repository(owner:"{owner}", name:"{name}") {{
        name
        owner {{ login }}
        defaultBranchRef {{
            target {{
                ... on Commit {{
                    history(first:{PAGE_SIZE}{after}) {{
                        edges {{
                            node {{
                                oid
                                author {{ user {{ login }} }}
                                additions
                                deletions
                                committedDate
                                url
                                messageHeadline
                                messageBody
                                comments(first:{PAGE_SIZE}) {{
                                    totalCount
                                    edges {{
{COMMENT_FIELDS}
                                    }}
                                    pageInfo {{ endCursor hasNextPage }}
                                }}
                            }}
                        }}
                        pageInfo {{ endCursor hasNextPage }}
                    }}
                }}
            }}
        }}
    }}
}}"#,
        after = after_clause(after),
    )
}

/// Remaining comments for one issue, starting after the given cursor.
pub fn issue_comments_page(owner: &str, name: &str, number: u64, after: &str) -> String {
    format!(
        r#"query {{
    repository(owner:"{owner}", name:"{name}") {{
        issue(number: {number}) {{
            comments(first:{PAGE_SIZE}, after:"{after}") {{
                edges {{
{COMMENT_FIELDS}
                }}
                pageInfo {{ endCursor hasNextPage }}
            }}
        }}
    }}
}}"#,
    )
}

/// Remaining comments for one pull request, starting after the given cursor.
pub fn pull_request_comments_page(owner: &str, name: &str, number: u64, after: &str) -> String {
    format!(
        r#"query {{
    repository(owner:"{owner}", name:"{name}") {{
        pullRequest(number: {number}) {{
            comments(first:{PAGE_SIZE}, after:"{after}") {{
                edges {{
{COMMENT_FIELDS}
                }}
                pageInfo {{ endCursor hasNextPage }}
            }}
        }}
    }}
}}"#,
    )
}

/// Remaining comments for one commit, addressed by object id.
pub fn commit_comments_page(owner: &str, name: &str, oid: &str, after: &str) -> String {
    format!(
        r#"query {{
    repository(owner:"{owner}", name:"{name}") {{
        object(oid:"{oid}") {{
            ... on Commit {{
                comments(first:{PAGE_SIZE}, after:"{after}") {{
                    edges {{
{COMMENT_FIELDS}
                    }}
                    pageInfo {{ endCursor hasNextPage }}
                }}
            }}
        }}
    }}
}}"#,
    )
}

/// Repository search, one page of results.
pub fn search_page(filters: &str, after: Option<&str>) -> String {
    format!(
        r#"{{
    search(query: "{filters}", type:REPOSITORY, first:{PAGE_SIZE}{after}) {{
        edges {{
            node {{
                ... on Repository {{
                    url
                    stargazerCount
                    primaryLanguage {{ name }}
                }}
            }}
        }}
        pageInfo {{ endCursor hasNextPage }}
    }}
}}"#,
        after = after_clause(after),
    )
}

/// Current rate limit state for the authenticated viewer.
pub fn rate_limit() -> String {
    r#"{
    viewer { login }
    rateLimit {
        limit
        cost
        remaining
        resetAt
    }
}"#
    .to_string()
}
