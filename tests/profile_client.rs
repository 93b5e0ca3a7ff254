//! Integration tests for cached, retrying profile lookups
//!
//! Drives the public `ProfileClient` API through a scripted transport, with
//! tokio's clock paused so backoff waits take no real time.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use ghpeek::config::Config;
use ghpeek::github::{
    GitHubClient, HttpResponse, ProfileClient, RateLimitTracker, RetryPolicy, Transport,
};
use ghpeek::{GhError, Result};
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use tokio::time::Instant;

/// Answers by URL: each path has its own queue of responses.
#[derive(Default)]
struct FakeGitHub {
    routes: Mutex<Vec<(String, VecDeque<Result<HttpResponse>>)>>,
    calls: Mutex<Vec<String>>,
}

impl FakeGitHub {
    fn route(self, path: &str, responses: Vec<Result<HttpResponse>>) -> Self {
        self.routes
            .lock()
            .unwrap()
            .push((path.to_string(), responses.into()));
        self
    }

    fn calls_to(&self, path: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|url| url.ends_with(path))
            .count()
    }

    fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Transport for FakeGitHub {
    async fn get(&self, url: &str, _headers: &HeaderMap) -> Result<HttpResponse> {
        self.calls.lock().unwrap().push(url.to_string());
        let mut routes = self.routes.lock().unwrap();
        let queue = routes
            .iter_mut()
            .find(|(path, _)| url.ends_with(path.as_str()))
            .map(|(_, queue)| queue);
        match queue.and_then(|q| q.pop_front()) {
            Some(response) => response,
            None => Ok(HttpResponse::new(StatusCode::NOT_FOUND, "{}")),
        }
    }
}

const PROFILE: &str = "/users/octocat";
const REPOS: &str = "/users/octocat/repos?sort=stars&per_page=3";

fn profile_json() -> Result<HttpResponse> {
    Ok(HttpResponse::new(
        StatusCode::OK,
        r#"{"login":"octocat","name":"The Octocat","bio":null,"public_repos":8,
            "followers":100,"following":9,"created_at":"2011-01-25T18:44:36Z",
            "avatar_url":null,"html_url":"https://github.com/octocat"}"#,
    ))
}

fn repos_json() -> Result<HttpResponse> {
    Ok(HttpResponse::new(
        StatusCode::OK,
        r#"[{"name":"hello-world","description":null,"stargazers_count":5,"forks_count":1,
             "watchers_count":5,"language":"Rust","updated_at":null,
             "html_url":"https://github.com/octocat/hello-world"}]"#,
    ))
}

fn server_error() -> Result<HttpResponse> {
    Ok(HttpResponse::new(StatusCode::INTERNAL_SERVER_ERROR, "{}"))
}

fn build(fake: FakeGitHub) -> ProfileClient<FakeGitHub> {
    let config = Config::default();
    let client = GitHubClient::with_transport(
        fake,
        &config.api,
        RetryPolicy::from(&config.retry),
        RateLimitTracker::new(&config.rate_limit),
    )
    .unwrap();
    ProfileClient::new(client, &config)
}

fn fake(client: &ProfileClient<FakeGitHub>) -> std::sync::Arc<GitHubClient<FakeGitHub>> {
    client.github()
}

#[tokio::test(start_paused = true)]
async fn test_repeat_profile_lookup_within_ttl_makes_one_request() {
    let client = build(FakeGitHub::default().route(PROFILE, vec![profile_json()]));

    client.get_profile("octocat").await.unwrap();
    tokio::time::advance(Duration::from_secs(60)).await;
    client.get_profile("octocat").await.unwrap();

    assert_eq!(fake(&client).transport().calls_to(PROFILE), 1);
}

#[tokio::test(start_paused = true)]
async fn test_not_found_profile_makes_one_request() {
    let client = build(FakeGitHub::default());

    let err = client.get_profile("ghost").await.unwrap_err();
    assert!(matches!(err, GhError::NotFound(_)));
    assert_eq!(fake(&client).transport().total_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_exhausted_quota_stops_after_one_request() {
    let reset = Utc::now().timestamp() + 3600;
    let mut response = HttpResponse::new(StatusCode::FORBIDDEN, "{}");
    response
        .headers
        .insert("x-ratelimit-remaining", HeaderValue::from_static("0"));
    response
        .headers
        .insert("x-ratelimit-limit", HeaderValue::from_static("60"));
    response.headers.insert(
        "x-ratelimit-reset",
        HeaderValue::from_str(&reset.to_string()).unwrap(),
    );
    let client = build(FakeGitHub::default().route(PROFILE, vec![Ok(response)]));

    let err = client.get_profile("octocat").await.unwrap_err();
    match err {
        GhError::RateLimited { reset_at } => {
            assert_eq!(reset_at, DateTime::from_timestamp(reset, 0));
        }
        other => panic!("expected RateLimited, got {:?}", other),
    }
    assert_eq!(fake(&client).transport().total_calls(), 1);
    assert!(client.is_near_limit());
    assert_eq!(client.rate_limit_state().remaining, 0);
}

#[tokio::test(start_paused = true)]
async fn test_server_errors_use_four_attempts_and_full_backoff() {
    let client = build(FakeGitHub::default().route(
        PROFILE,
        vec![server_error(), server_error(), server_error(), server_error()],
    ));
    let start = Instant::now();

    let err = client.get_profile("octocat").await.unwrap_err();

    assert!(matches!(err, GhError::ServerError(500)));
    assert_eq!(fake(&client).transport().calls_to(PROFILE), 4);
    assert_eq!(start.elapsed(), Duration::from_millis(1000 + 2000 + 4000));
}

#[tokio::test(start_paused = true)]
async fn test_lookup_survives_repo_failure() {
    let client = build(
        FakeGitHub::default()
            .route(REPOS, vec![server_error(), server_error(), server_error(), server_error()])
            .route(PROFILE, vec![profile_json()]),
    );

    let lookup = client.lookup("octocat", None).await.unwrap();

    assert_eq!(lookup.profile.login, "octocat");
    assert!(lookup.repos.is_empty());
    assert!(lookup.repos_warning.is_some());
    assert_eq!(fake(&client).transport().calls_to(REPOS), 4);
}

#[tokio::test(start_paused = true)]
async fn test_lookup_uses_cache_for_both_resources() {
    let client = build(
        FakeGitHub::default()
            .route(REPOS, vec![repos_json()])
            .route(PROFILE, vec![profile_json()]),
    );

    let first = client.lookup("octocat", None).await.unwrap();
    let second = client.lookup("octocat", None).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(second.repos[0].name, "hello-world");
    assert_eq!(fake(&client).transport().total_calls(), 2);

    let stats = client.cache_stats();
    assert_eq!((stats.total, stats.valid, stats.expired), (2, 2, 0));

    tokio::time::advance(Duration::from_secs(300)).await;
    let stats = client.cache_stats();
    assert_eq!((stats.total, stats.valid, stats.expired), (2, 0, 2));
}

#[tokio::test(start_paused = true)]
async fn test_poll_updates_shared_rate_limit_state() {
    let client = build(FakeGitHub::default().route(
        "/rate_limit",
        vec![Ok(HttpResponse::new(
            StatusCode::OK,
            r#"{"resources":{"core":{"limit":60,"remaining":5,"reset":4102444800}}}"#,
        ))],
    ));

    let state = client.refresh_rate_limit().await.unwrap();

    assert_eq!(state.remaining, 5);
    assert_eq!(state.limit, 60);
    assert!(client.is_near_limit());
    assert!(client.rate_limit().should_defer());
}
