//! GitHub REST statistics provider.
//!
//! Pagination and rate-limit retries live here: the fetch stage's queue never
//! retries a failed task.

mod models;
mod retry;

pub use self::retry::RetryPolicy;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, HeaderMap, RETRY_AFTER};
use serde::de::DeserializeOwned;
use statcard_core::domain::GitHubStats;
use statcard_core::ports::{FetchError, StatsProvider};
use tracing::{debug, warn};

use self::models::{ApiMessage, Repo, SearchTotal, User};
use crate::config::Config;

const USER_AGENT: &str = concat!("statcard/", env!("CARGO_PKG_VERSION"));
const API_VERSION: &str = "2022-11-28";
const PER_PAGE: usize = 100;

pub struct GitHubClient {
    http: reqwest::Client,
    api_base: String,
    token: Option<String>,
    retry: RetryPolicy,
}

impl GitHubClient {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            api_base: config.api_base.clone(),
            token: config.github_token.clone(),
            retry: RetryPolicy::new(config.retries),
        })
    }

    /// GET with retries for rate limits and transient failures.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            let err = match self.get_json_once(path, query).await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            if !err.is_retryable() || !self.retry.allows_retry(attempts) {
                return Err(err);
            }

            let delay = match &err {
                FetchError::RateLimited {
                    retry_after: Some(after),
                } => *after,
                _ => self.retry.next_delay(attempts),
            };
            warn!(
                path,
                attempts,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "github request failed; retrying"
            );
            tokio::time::sleep(delay).await;
        }
    }

    async fn get_json_once<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let url = format!("{}{}", self.api_base, path);
        let mut request = self
            .http
            .get(&url)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .query(query);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Transport(Box::new(e)))?;
        let status = response.status();
        debug!(%url, status = status.as_u16(), "github response");
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| FetchError::Decode(e.to_string()));
        }

        let headers = response.headers();
        let exhausted = quota_exhausted(headers);
        let retry_after = retry_after(headers).or_else(|| {
            if exhausted {
                quota_reset_in(headers, Utc::now())
            } else {
                None
            }
        });
        let message = response
            .json::<ApiMessage>()
            .await
            .map(|m| m.message)
            .unwrap_or_default();
        Err(classify(status, exhausted, retry_after, message))
    }

    async fn total_stars(&self, username: &str) -> Result<u64, FetchError> {
        let path = format!("/users/{username}/repos");
        let mut stars = 0;
        let mut page = 1u32;
        loop {
            let repos: Vec<Repo> = self
                .get_json(
                    &path,
                    &[
                        ("sort", "created".to_string()),
                        ("direction", "desc".to_string()),
                        ("per_page", PER_PAGE.to_string()),
                        ("page", page.to_string()),
                    ],
                )
                .await?;
            stars += repos
                .iter()
                .map(|r| r.stargazers_count.unwrap_or(0))
                .sum::<u64>();
            if repos.len() < PER_PAGE {
                return Ok(stars);
            }
            page += 1;
        }
    }

    async fn search_total(
        &self,
        path: &str,
        q: String,
        advanced: bool,
    ) -> Result<u64, FetchError> {
        let mut query = vec![("q", q), ("per_page", "1".to_string())];
        if advanced {
            query.push(("advanced_search", "true".to_string()));
        }
        let total: SearchTotal = self.get_json(path, &query).await?;
        Ok(total.total_count)
    }
}

#[async_trait]
impl StatsProvider for GitHubClient {
    async fn user_stats(&self, username: &str) -> Result<GitHubStats, FetchError> {
        let user: User = self
            .get_json(&format!("/users/{username}"), &[])
            .await
            .map_err(|err| match err {
                FetchError::Status { status: 404, .. } => {
                    FetchError::UserNotFound(username.to_string())
                }
                other => other,
            })?;

        let stars = self.total_stars(username).await?;
        let commits = self
            .search_total("/search/commits", format!("author:{username}"), false)
            .await?;
        let pull_requests = self
            .search_total("/search/issues", format!("author:{username} is:pr"), true)
            .await?;
        let issues = self
            .search_total("/search/issues", format!("author:{username} is:issue"), true)
            .await?;

        Ok(GitHubStats {
            avatar_url: user.avatar_url,
            fullname: user.name.unwrap_or_default(),
            username: username.to_string(),
            join_date: user.created_at,
            commits,
            stars,
            followers: user.followers,
            pull_requests,
            issues,
            repos: user.public_repos,
        })
    }
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

/// Time left until an exhausted quota resets (`x-ratelimit-reset`, epoch seconds).
fn quota_reset_in(headers: &HeaderMap, now: DateTime<Utc>) -> Option<Duration> {
    let reset = headers
        .get("x-ratelimit-reset")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<i64>().ok())?;
    let secs = reset.saturating_sub(now.timestamp()).max(0);
    Some(Duration::from_secs(secs as u64))
}

fn quota_exhausted(headers: &HeaderMap) -> bool {
    headers
        .get("x-ratelimit-remaining")
        .is_some_and(|v| v.as_bytes() == b"0")
}

/// Map a non-success response to a fetch error.
///
/// GitHub signals primary rate limits with 403 plus an exhausted quota header
/// (the wait is then the time until `x-ratelimit-reset`), and secondary ones
/// with 403/429 plus `retry-after`.
fn classify(
    status: StatusCode,
    exhausted: bool,
    retry_after: Option<Duration>,
    message: String,
) -> FetchError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => FetchError::RateLimited { retry_after },
        StatusCode::FORBIDDEN if exhausted || retry_after.is_some() => {
            FetchError::RateLimited { retry_after }
        }
        _ => FetchError::Status {
            status: status.as_u16(),
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use chrono::TimeZone;
    use reqwest::header::HeaderValue;
    use statcard_core::domain::Blueprint;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    /// A canned HTTP response.
    struct Reply {
        status: u16,
        headers: Vec<(&'static str, String)>,
        body: String,
    }

    impl Reply {
        fn json(status: u16, body: impl Into<String>) -> Self {
            Self {
                status,
                headers: Vec::new(),
                body: body.into(),
            }
        }

        fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
            self.headers.push((name, value.into()));
            self
        }
    }

    /// Local HTTP server answering every request through `respond`.
    ///
    /// Returns its base URL and the request targets (path and query) it saw.
    async fn fake_github<F>(respond: F) -> (String, Arc<Mutex<Vec<String>>>)
    where
        F: Fn(&str) -> Reply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let respond = Arc::new(respond);

        let log = Arc::clone(&seen);
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let log = Arc::clone(&log);
                let respond = Arc::clone(&respond);
                tokio::spawn(async move {
                    let mut request = Vec::new();
                    let mut chunk = [0u8; 1024];
                    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut chunk).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => request.extend_from_slice(&chunk[..n]),
                        }
                    }
                    let head = String::from_utf8_lossy(&request);
                    let target = head.split_whitespace().nth(1).unwrap_or("/").to_string();
                    log.lock().unwrap().push(target.clone());

                    let reply = respond(&target);
                    let mut raw = format!(
                        "HTTP/1.1 {} Canned\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n",
                        reply.status,
                        reply.body.len()
                    );
                    for (name, value) in &reply.headers {
                        raw.push_str(&format!("{name}: {value}\r\n"));
                    }
                    raw.push_str("\r\n");
                    raw.push_str(&reply.body);
                    let _ = socket.write_all(raw.as_bytes()).await;
                    let _ = socket.shutdown().await;
                });
            }
        });
        (base, seen)
    }

    fn client(api_base: String, retries: u32) -> GitHubClient {
        let config = Config {
            usernames: Vec::new(),
            github_token: None,
            api_base,
            output_dir: PathBuf::from("."),
            blueprint: Blueprint::default(),
            retries,
        };
        let mut client = GitHubClient::new(&config).unwrap();
        client.retry.base_delay = Duration::from_millis(1);
        client
    }

    const USER: &str = r#"{
        "avatar_url": "https://avatars.example/u/1",
        "name": "The Octocat",
        "created_at": "2011-01-25T18:44:36Z",
        "followers": 12,
        "public_repos": 8
    }"#;

    fn repos(stars: impl IntoIterator<Item = u64>) -> String {
        let items: Vec<String> = stars
            .into_iter()
            .map(|n| format!(r#"{{"stargazers_count":{n}}}"#))
            .collect();
        format!("[{}]", items.join(","))
    }

    #[tokio::test]
    async fn server_errors_are_retried_then_surface() {
        let (base, seen) =
            fake_github(|_| Reply::json(502, r#"{"message":"Bad Gateway"}"#)).await;
        let github = client(base, 2);

        let err = github.user_stats("octocat").await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 502, .. }));
        assert_eq!(seen.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn no_retries_means_a_single_request() {
        let (base, seen) = fake_github(|_| Reply::json(503, "{}")).await;
        let github = client(base, 0);

        let err = github.user_stats("octocat").await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 503, .. }));
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rate_limit_waits_for_retry_after_not_backoff() {
        let calls = AtomicUsize::new(0);
        let (base, seen) = fake_github(move |_| {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Reply::json(429, r#"{"message":"slow down"}"#).header("retry-after", "0")
            } else {
                Reply::json(200, USER)
            }
        })
        .await;
        let mut github = client(base, 2);
        github.retry.base_delay = Duration::from_secs(60);

        let user: User = tokio::time::timeout(
            Duration::from_secs(5),
            github.get_json("/users/octocat", &[]),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(user.followers, 12);
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn missing_user_is_not_found_and_not_retried() {
        let (base, seen) = fake_github(|_| Reply::json(404, r#"{"message":"Not Found"}"#)).await;
        let github = client(base, 2);

        let err = github.user_stats("x").await.unwrap_err();
        assert!(matches!(err, FetchError::UserNotFound(ref name) if name == "x"));
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].starts_with("/users/x"));
    }

    #[tokio::test]
    async fn stars_are_summed_until_a_short_page() {
        let (base, seen) = fake_github(|target| {
            if target.contains("&page=1") {
                Reply::json(200, repos(std::iter::repeat_n(2, PER_PAGE)))
            } else if target.contains("&page=2") {
                Reply::json(200, repos([1, 2, 3]))
            } else {
                Reply::json(500, "{}")
            }
        })
        .await;
        let github = client(base, 0);

        assert_eq!(github.total_stars("octocat").await.unwrap(), 206);
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(|t| t.starts_with("/users/octocat/repos?")));
    }

    #[tokio::test]
    async fn collects_every_statistic() {
        let (base, _) = fake_github(|target| {
            if target.split('?').next() == Some("/users/octocat") {
                Reply::json(200, USER)
            } else if target.starts_with("/users/octocat/repos") {
                Reply::json(200, repos([5, 6]))
            } else if target.starts_with("/search/commits") {
                Reply::json(200, r#"{"total_count":1590}"#)
            } else if target.contains("is%3Apr") || target.contains("is:pr") {
                Reply::json(200, r#"{"total_count":40}"#)
            } else if target.contains("is%3Aissue") || target.contains("is:issue") {
                Reply::json(200, r#"{"total_count":7}"#)
            } else {
                Reply::json(404, "{}")
            }
        })
        .await;
        let github = client(base, 0);

        let stats = github.user_stats("octocat").await.unwrap();
        assert_eq!(stats.fullname, "The Octocat");
        assert_eq!(stats.stars, 11);
        assert_eq!(stats.commits, 1_590);
        assert_eq!(stats.pull_requests, 40);
        assert_eq!(stats.issues, 7);
        assert_eq!(stats.repos, 8);
        assert_eq!(stats.followers, 12);
    }

    #[test]
    fn exhausted_quota_waits_until_reset() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut headers = HeaderMap::new();
        assert_eq!(quota_reset_in(&headers, now), None);

        let reset = (now.timestamp() + 90).to_string();
        headers.insert("x-ratelimit-reset", HeaderValue::from_str(&reset).unwrap());
        assert_eq!(quota_reset_in(&headers, now), Some(Duration::from_secs(90)));

        let past = (now.timestamp() - 5).to_string();
        headers.insert("x-ratelimit-reset", HeaderValue::from_str(&past).unwrap());
        assert_eq!(quota_reset_in(&headers, now), Some(Duration::ZERO));
    }

    #[test]
    fn parses_retry_after_seconds() {
        let mut headers = HeaderMap::new();
        assert_eq!(retry_after(&headers), None);

        headers.insert(RETRY_AFTER, HeaderValue::from_static("60"));
        assert_eq!(retry_after(&headers), Some(Duration::from_secs(60)));

        headers.insert(RETRY_AFTER, HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"));
        assert_eq!(retry_after(&headers), None);
    }

    #[test]
    fn detects_exhausted_quota() {
        let mut headers = HeaderMap::new();
        assert!(!quota_exhausted(&headers));
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("0"));
        assert!(quota_exhausted(&headers));
        headers.insert("x-ratelimit-remaining", HeaderValue::from_static("12"));
        assert!(!quota_exhausted(&headers));
    }

    #[test]
    fn classifies_rate_limits() {
        let err = classify(StatusCode::FORBIDDEN, true, None, String::new());
        assert!(matches!(err, FetchError::RateLimited { retry_after: None }));

        let err = classify(
            StatusCode::TOO_MANY_REQUESTS,
            false,
            Some(Duration::from_secs(5)),
            String::new(),
        );
        assert!(matches!(err, FetchError::RateLimited { retry_after: Some(_) }));
        assert!(err.is_retryable());
    }

    #[test]
    fn plain_errors_keep_status_and_message() {
        let err = classify(StatusCode::FORBIDDEN, false, None, "forbidden".into());
        assert!(matches!(err, FetchError::Status { status: 403, .. }));
        assert!(!err.is_retryable());

        let err = classify(StatusCode::NOT_FOUND, false, None, "Not Found".into());
        assert_eq!(err.to_string(), "provider returned HTTP 404: Not Found");
    }
}
