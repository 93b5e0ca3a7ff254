// GitHub API HTTP client.
// Sends requests with the fixed header set, retries transient failures with
// backoff, and classifies responses into typed errors.

use reqwest::{
    StatusCode,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};
use serde::de::DeserializeOwned;

use crate::config::ApiConfig;
use crate::error::{GhError, Result};

use super::rate_limit::{RateLimitTracker, exhausted_reset};
use super::retry::RetryPolicy;
use super::transport::{HttpResponse, ReqwestTransport, Transport};

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";
const API_VERSION_HEADER: &str = "x-github-api-version";

/// GitHub API client with retry and rate limit tracking.
pub struct GitHubClient<T = ReqwestTransport> {
    transport: T,
    base_url: String,
    headers: HeaderMap,
    retry: RetryPolicy,
    rate_limit: RateLimitTracker,
}

/// Build the header set sent with every request.
pub fn default_headers(api: &ApiConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(&api.user_agent)
            .map_err(|e| GhError::Config(format!("invalid user agent: {}", e)))?,
    );
    headers.insert(
        API_VERSION_HEADER,
        HeaderValue::from_str(&api.api_version)
            .map_err(|e| GhError::Config(format!("invalid API version: {}", e)))?,
    );
    if let Some(token) = api.token.as_deref() {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| GhError::Config("invalid characters in token".to_string()))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    Ok(headers)
}

impl GitHubClient<ReqwestTransport> {
    /// Create a client backed by reqwest.
    pub fn new(api: &ApiConfig, retry: RetryPolicy, rate_limit: RateLimitTracker) -> Result<Self> {
        let transport = ReqwestTransport::new(api.request_timeout())?;
        Self::with_transport(transport, api, retry, rate_limit)
    }
}

impl<T: Transport> GitHubClient<T> {
    /// Create a client that sends requests through `transport`.
    pub fn with_transport(
        transport: T,
        api: &ApiConfig,
        retry: RetryPolicy,
        rate_limit: RateLimitTracker,
    ) -> Result<Self> {
        Ok(Self {
            transport,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            headers: default_headers(api)?,
            retry,
            rate_limit,
        })
    }

    /// Get the shared rate limit tracker.
    pub fn rate_limit(&self) -> &RateLimitTracker {
        &self.rate_limit
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// GET `endpoint` and decode the JSON body, using the configured retry bound.
    pub async fn fetch_json<R: DeserializeOwned>(&self, endpoint: &str) -> Result<R> {
        self.fetch_with_retry(endpoint, self.retry.max_retries).await
    }

    /// GET `endpoint` with up to `max_retries` retries and decode the JSON body.
    ///
    /// 404 and 422 fail at once. A 403 with an exhausted quota fails at once
    /// with the reset time; other 403s, other error statuses and transport
    /// failures are retried after `min(base * 2^attempt, max)`.
    pub async fn fetch_with_retry<R: DeserializeOwned>(
        &self,
        endpoint: &str,
        max_retries: u32,
    ) -> Result<R> {
        let url = self.url(endpoint);

        for attempt in 0..=max_retries {
            tracing::debug!(%url, attempt, "GET");

            let failure = match self.transport.get(&url, &self.headers).await {
                Ok(response) => {
                    self.rate_limit.update_from_headers(&response.headers);
                    match check_response(response, endpoint) {
                        Ok(body) => return Ok(serde_json::from_str(&body)?),
                        Err(e) => e,
                    }
                }
                Err(e) => e,
            };

            if !failure.is_retryable() || attempt == max_retries {
                if let GhError::RateLimited { reset_at } = &failure {
                    tracing::warn!(%url, ?reset_at, "GitHub rate limit reached");
                }
                return Err(failure);
            }

            let delay = self.retry.delay(attempt);
            tracing::warn!(
                %url,
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %failure,
                "Request failed, retrying"
            );
            tokio::time::sleep(delay).await;
        }

        Err(GhError::RetriesExhausted)
    }
}

/// Check response status and convert errors. Returns the body on success.
fn check_response(response: HttpResponse, endpoint: &str) -> Result<String> {
    match response.status {
        status if status.is_success() => Ok(response.body),
        StatusCode::NOT_FOUND => Err(GhError::NotFound(endpoint.to_string())),
        StatusCode::UNPROCESSABLE_ENTITY => Err(GhError::InvalidInput(endpoint.to_string())),
        StatusCode::FORBIDDEN => Err(GhError::RateLimited {
            reset_at: exhausted_reset(&response.headers),
        }),
        status => Err(GhError::ServerError(status.as_u16())),
    }
}
