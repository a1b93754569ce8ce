//! Statistics record and the stage tasks/payloads built around it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Public GitHub statistics for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHubStats {
    pub avatar_url: String,
    /// Display name; empty when the profile has none.
    pub fullname: String,
    pub username: String,
    pub join_date: DateTime<Utc>,
    pub commits: u64,
    pub stars: u64,
    pub followers: u64,
    pub pull_requests: u64,
    pub issues: u64,
    pub repos: u64,
}

/// Task of the fetch stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    pub username: String,
}

impl FetchRequest {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

/// Payload of the render stage: a rendered document and its media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedCard {
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl RenderedCard {
    pub fn html(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            content_type: "text/html",
            bytes: bytes.into(),
        }
    }

    /// File extension matching the content type.
    pub fn extension(&self) -> &'static str {
        match self.content_type {
            "text/html" => "html",
            _ => "bin",
        }
    }
}
