// GitHub API endpoint functions.
// Provides typed methods for the user, repository and rate limit endpoints.

use crate::error::{GhError, Result};

use super::client::GitHubClient;
use super::transport::Transport;
use super::types::{ProfileRecord, RateLimitBucket, RateLimitResponse, RepoSummary};

pub const RATE_LIMIT_PATH: &str = "/rate_limit";

/// GitHub's largest page size for repository listings.
pub const MAX_REPO_COUNT: u32 = 100;

/// GitHub treats `per_page=0` as its default page of 30, so counts are kept
/// within `1..=MAX_REPO_COUNT`.
pub fn clamp_repo_count(count: u32) -> u32 {
    count.clamp(1, MAX_REPO_COUNT)
}

/// Trim a username and reject values that cannot form a valid request path.
pub fn normalize_username(username: &str) -> Result<&str> {
    let username = username.trim().trim_start_matches('@');
    if username.is_empty() {
        return Err(GhError::InvalidInput("empty username".to_string()));
    }
    if username
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '/' | '?' | '#' | '%' | '\\'))
    {
        return Err(GhError::InvalidInput(username.to_string()));
    }
    Ok(username)
}

pub fn profile_path(username: &str) -> String {
    format!("/users/{}", username)
}

/// Repositories sorted by stars, capped at `count`.
pub fn top_repos_path(username: &str, count: u32) -> String {
    format!(
        "/users/{}/repos?sort=stars&per_page={}",
        username,
        clamp_repo_count(count)
    )
}

impl<T: Transport> GitHubClient<T> {
    /// Get a user's public profile.
    pub async fn get_user(&self, username: &str) -> Result<ProfileRecord> {
        let username = normalize_username(username)?;
        self.fetch_json(&profile_path(username)).await
    }

    /// Get a user's most-starred repositories.
    pub async fn get_top_repos(&self, username: &str, count: u32) -> Result<Vec<RepoSummary>> {
        let username = normalize_username(username)?;
        self.fetch_json(&top_repos_path(username, count)).await
    }

    /// Get the core quota bucket. Polling is periodic, so failures are not retried.
    pub async fn get_rate_limit(&self) -> Result<RateLimitBucket> {
        let response: RateLimitResponse = self.fetch_with_retry(RATE_LIMIT_PATH, 0).await?;
        Ok(response.resources.core)
    }
}
