//! GitHub GraphQL access: query builders, wire types, the retrying client,
//! and cursor pagination.

pub mod client;
pub mod paginate;
pub mod queries;
pub mod types;

pub use client::GitHubClient;
pub use paginate::{fetch_commits, fetch_issues, fetch_pull_requests, FetchedParents};
