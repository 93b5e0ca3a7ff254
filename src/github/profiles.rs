// Profile and repository lookups for usernames.
// Serves from the TTL cache when possible and falls back to the retrying client.

use std::sync::Arc;

use crate::cache::{CacheStats, TtlCache};
use crate::config::Config;
use crate::error::Result;

use super::client::GitHubClient;
use super::endpoints::{clamp_repo_count, normalize_username};
use super::rate_limit::{RateLimitState, RateLimitTracker};
use super::retry::RetryPolicy;
use super::transport::{ReqwestTransport, Transport};
use super::types::{ProfileLookup, ProfileRecord, RepoSummary};

fn profile_key(username: &str) -> String {
    format!("profile:{}", username.to_lowercase())
}

fn repos_key(username: &str, count: u32) -> String {
    format!("repos:{}:{}", username.to_lowercase(), count)
}

/// Cached access to GitHub profiles and top repositories.
///
/// This is the one entry point presentation code uses: both the CLI and the
/// TUI profile card go through it, so they share cache and quota state.
pub struct ProfileClient<T = ReqwestTransport> {
    client: Arc<GitHubClient<T>>,
    profiles: TtlCache<ProfileRecord>,
    repos: TtlCache<Vec<RepoSummary>>,
    default_repo_count: u32,
}

impl ProfileClient<ReqwestTransport> {
    /// Build a reqwest-backed client from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = GitHubClient::new(
            &config.api,
            RetryPolicy::from(&config.retry),
            RateLimitTracker::new(&config.rate_limit),
        )?;
        Ok(Self::new(client, config))
    }
}

impl<T: Transport> ProfileClient<T> {
    pub fn new(client: GitHubClient<T>, config: &Config) -> Self {
        let ttl = config.cache.ttl();
        let max_entries = config.cache.max_entries;
        Self {
            client: Arc::new(client),
            profiles: TtlCache::new(ttl, max_entries),
            repos: TtlCache::new(ttl, max_entries),
            default_repo_count: config.repos.count,
        }
    }

    /// Shared handle to the underlying client, e.g. for the rate limit poller.
    pub fn github(&self) -> Arc<GitHubClient<T>> {
        Arc::clone(&self.client)
    }

    pub fn rate_limit(&self) -> &RateLimitTracker {
        self.client.rate_limit()
    }

    pub fn default_repo_count(&self) -> u32 {
        self.default_repo_count
    }

    /// Get a profile, from cache if fresh.
    pub async fn get_profile(&self, username: &str) -> Result<ProfileRecord> {
        let username = normalize_username(username)?;
        let key = profile_key(username);

        if let Some(profile) = self.profiles.get(&key) {
            tracing::debug!(%key, "Cache hit");
            return Ok(profile);
        }

        tracing::debug!(%key, "Cache miss");
        let profile = self.client.get_user(username).await?;
        self.profiles.set(key, profile.clone());
        Ok(profile)
    }

    /// Get the `count` most-starred repositories, from cache if fresh.
    pub async fn get_top_repos(&self, username: &str, count: u32) -> Result<Vec<RepoSummary>> {
        let username = normalize_username(username)?;
        let count = clamp_repo_count(count);
        let key = repos_key(username, count);

        if let Some(repos) = self.repos.get(&key) {
            tracing::debug!(%key, "Cache hit");
            return Ok(repos);
        }

        tracing::debug!(%key, "Cache miss");
        let repos = self.client.get_top_repos(username, count).await?;
        self.repos.set(key, repos.clone());
        Ok(repos)
    }

    /// Profile plus top repositories.
    ///
    /// A failed profile fetch fails the lookup. A failed repository fetch only
    /// produces a warning; the profile is returned with no repositories.
    pub async fn lookup(&self, username: &str, count: Option<u32>) -> Result<ProfileLookup> {
        let count = count.unwrap_or(self.default_repo_count);
        let profile = self.get_profile(username).await?;

        let (repos, repos_warning) = match self.get_top_repos(username, count).await {
            Ok(repos) => (repos, None),
            Err(e) => {
                tracing::warn!(username = %profile.login, error = %e, "Could not load repositories");
                (Vec::new(), Some(e.user_message()))
            }
        };

        Ok(ProfileLookup {
            profile,
            repos,
            repos_warning,
        })
    }

    /// Drop all cached profiles and repositories.
    pub fn clear_cache(&self) {
        self.profiles.clear();
        self.repos.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.profiles.stats().merge(self.repos.stats())
    }

    pub fn rate_limit_state(&self) -> RateLimitState {
        self.rate_limit().current_state()
    }

    pub fn is_near_limit(&self) -> bool {
        self.rate_limit().is_near_limit()
    }

    /// Poll the quota endpoint now.
    pub async fn refresh_rate_limit(&self) -> Result<RateLimitState> {
        self.client.refresh_rate_limit().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::error::GhError;
    use crate::github::client::tests::{ScriptedTransport, ok, status};
    use crate::github::transport::HttpResponse;

    const OCTOCAT: &str = r#"{
        "login": "octocat",
        "name": "The Octocat",
        "bio": "GitHub mascot",
        "public_repos": 8,
        "followers": 100,
        "following": 9,
        "created_at": "2011-01-25T18:44:36Z",
        "avatar_url": "https://avatars.githubusercontent.com/u/583231",
        "html_url": "https://github.com/octocat"
    }"#;

    const REPOS: &str = r#"[
        {"name": "Spoon-Knife", "description": "fork me", "stargazers_count": 12000,
         "forks_count": 140000, "watchers_count": 12000, "language": "HTML",
         "updated_at": "2024-01-01T00:00:00Z", "html_url": "https://github.com/octocat/Spoon-Knife"}
    ]"#;

    fn profile_client(responses: Vec<Result<HttpResponse>>) -> ProfileClient<ScriptedTransport> {
        let config = Config::default();
        let client = GitHubClient::with_transport(
            ScriptedTransport::new(responses),
            &config.api,
            RetryPolicy::from(&config.retry),
            RateLimitTracker::new(&config.rate_limit),
        )
        .unwrap();
        ProfileClient::new(client, &config)
    }

    fn calls(client: &ProfileClient<ScriptedTransport>) -> usize {
        client.github().transport().calls()
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_profile_lookup_is_cached() {
        let client = profile_client(vec![ok(OCTOCAT)]);

        let first = client.get_profile("octocat").await.unwrap();
        let second = client.get_profile("octocat").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(calls(&client), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_key_ignores_case_and_whitespace() {
        let client = profile_client(vec![ok(OCTOCAT)]);

        client.get_profile("octocat").await.unwrap();
        client.get_profile(" OctoCat ").await.unwrap();

        assert_eq!(calls(&client), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_profile_refetched_after_ttl() {
        let client = profile_client(vec![ok(OCTOCAT), ok(OCTOCAT)]);

        client.get_profile("octocat").await.unwrap();
        tokio::time::advance(Duration::from_secs(300)).await;
        client.get_profile("octocat").await.unwrap();

        assert_eq!(calls(&client), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repo_counts_are_cached_separately() {
        let client = profile_client(vec![ok(REPOS), ok("[]")]);

        assert_eq!(client.get_top_repos("octocat", 3).await.unwrap().len(), 1);
        assert_eq!(client.get_top_repos("octocat", 3).await.unwrap().len(), 1);
        assert!(client.get_top_repos("octocat", 10).await.unwrap().is_empty());
        assert_eq!(calls(&client), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_repo_count_requests_one() {
        let client = profile_client(vec![ok(REPOS)]);

        client.get_top_repos("octocat", 0).await.unwrap();
        client.get_top_repos("octocat", 1).await.unwrap();

        assert_eq!(calls(&client), 1);
        assert_eq!(
            client.github().transport().urls(),
            ["https://api.github.com/users/octocat/repos?sort=stars&per_page=1"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_combines_profile_and_repos() {
        let client = profile_client(vec![ok(OCTOCAT), ok(REPOS)]);

        let lookup = client.lookup("octocat", None).await.unwrap();
        assert_eq!(lookup.profile.login, "octocat");
        assert_eq!(lookup.repos[0].name, "Spoon-Knife");
        assert!(lookup.repos_warning.is_none());
        assert!(
            client
                .github()
                .transport()
                .urls()
                .iter()
                .any(|u| u.ends_with("/users/octocat/repos?sort=stars&per_page=3"))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_repo_failure_is_downgraded_to_warning() {
        let client = profile_client(vec![
            ok(OCTOCAT),
            status(500),
            status(500),
            status(500),
            status(500),
        ]);

        let lookup = client.lookup("octocat", Some(3)).await.unwrap();
        assert_eq!(lookup.profile.login, "octocat");
        assert!(lookup.repos.is_empty());
        assert_eq!(
            lookup.repos_warning.as_deref(),
            Some("GitHub server error (500)")
        );
        assert_eq!(calls(&client), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_profile_failure_propagates() {
        let client = profile_client(vec![status(404)]);

        let err = client.lookup("ghost", None).await.unwrap_err();
        assert!(matches!(err, GhError::NotFound(_)));
        assert_eq!(err.user_message(), "User not found on GitHub");
        assert_eq!(calls(&client), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_are_not_cached() {
        let client = profile_client(vec![status(404), ok(OCTOCAT)]);

        assert!(client.get_profile("octocat").await.is_err());
        assert!(client.get_profile("octocat").await.is_ok());
        assert_eq!(calls(&client), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_cache_and_stats() {
        let client = profile_client(vec![ok(OCTOCAT), ok(REPOS), ok(OCTOCAT)]);

        client.lookup("octocat", None).await.unwrap();
        assert_eq!(
            client.cache_stats(),
            CacheStats {
                total: 2,
                valid: 2,
                expired: 0
            }
        );

        client.clear_cache();
        assert_eq!(client.cache_stats(), CacheStats::default());

        client.get_profile("octocat").await.unwrap();
        assert_eq!(calls(&client), 3);
    }
}
