//! Wire shapes of the GitHub REST responses we read.

use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub avatar_url: String,
    #[serde(default)]
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub followers: u64,
    pub public_repos: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Repo {
    #[serde(default)]
    pub stargazers_count: Option<u64>,
}

/// Only the total of a search is needed; items are requested one per page.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchTotal {
    pub total_count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub message: String,
}
