// Rate limit tracking.
// Holds the process-wide quota state, fed by response headers and by polling /rate_limit.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::config::RateLimitConfig;
use crate::error::Result;

use super::client::GitHubClient;
use super::transport::Transport;
use super::types::RateLimitBucket;

/// Unauthenticated GitHub quota, used until the first real reading.
pub const DEFAULT_LIMIT: u64 = 60;

const LIMIT_HEADER: &str = "x-ratelimit-limit";
const REMAINING_HEADER: &str = "x-ratelimit-remaining";
const RESET_HEADER: &str = "x-ratelimit-reset";

/// Current quota as last reported by GitHub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitState {
    pub remaining: u64,
    pub limit: u64,
    pub reset_at: Option<DateTime<Utc>>,
}

impl Default for RateLimitState {
    fn default() -> Self {
        Self {
            remaining: DEFAULT_LIMIT,
            limit: DEFAULT_LIMIT,
            reset_at: None,
        }
    }
}

impl From<RateLimitBucket> for RateLimitState {
    fn from(bucket: RateLimitBucket) -> Self {
        Self {
            remaining: bucket.remaining,
            limit: bucket.limit,
            reset_at: DateTime::from_timestamp(bucket.reset, 0),
        }
    }
}

/// Severity bands for the status indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Ok,
    Low,
    Critical,
}

impl RateLimitState {
    /// Time left until the quota resets, or `None` if unknown or already past.
    pub fn time_until_reset(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.reset_at
            .and_then(|reset| reset.signed_duration_since(now).to_std().ok())
    }

    /// Whole minutes until reset, rounded up.
    pub fn minutes_until_reset(&self, now: DateTime<Utc>) -> Option<u64> {
        self.time_until_reset(now)
            .map(|left| left.as_secs().div_ceil(60))
    }

    /// True when fewer than `threshold` requests remain.
    pub fn is_below(&self, threshold: u64) -> bool {
        self.remaining < threshold
    }

    pub fn status_level(&self) -> StatusLevel {
        if self.remaining < 5 {
            StatusLevel::Critical
        } else if self.remaining < 20 {
            StatusLevel::Low
        } else {
            StatusLevel::Ok
        }
    }

    /// Fraction of the quota still available, 0.0 to 1.0.
    pub fn ratio(&self) -> f64 {
        if self.limit == 0 {
            return 0.0;
        }
        (self.remaining as f64 / self.limit as f64).clamp(0.0, 1.0)
    }
}

fn header_value<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

/// Reset time from an exhausted-quota response, i.e. `remaining == 0` with a reset header.
pub fn exhausted_reset(headers: &HeaderMap) -> Option<DateTime<Utc>> {
    let remaining: u64 = header_value(headers, REMAINING_HEADER)?;
    if remaining != 0 {
        return None;
    }
    let reset: i64 = header_value(headers, RESET_HEADER)?;
    DateTime::from_timestamp(reset, 0)
}

/// Shared handle to the quota state. Clones observe and update the same state.
#[derive(Debug, Clone)]
pub struct RateLimitTracker {
    state: Arc<Mutex<RateLimitState>>,
    near_limit_threshold: u64,
    defer_window: Duration,
}

impl Default for RateLimitTracker {
    fn default() -> Self {
        Self::new(&RateLimitConfig::default())
    }
}

impl RateLimitTracker {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(RateLimitState::default())),
            near_limit_threshold: config.near_limit_threshold,
            defer_window: Duration::from_secs(config.defer_window_secs),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RateLimitState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn current_state(&self) -> RateLimitState {
        *self.lock()
    }

    /// Replace the stored state wholesale.
    pub fn replace(&self, state: RateLimitState) {
        *self.lock() = state;
    }

    /// Update from `x-ratelimit-*` headers. Headers that are absent leave the
    /// corresponding field untouched. Returns the new state if anything was read.
    pub fn update_from_headers(&self, headers: &HeaderMap) -> Option<RateLimitState> {
        let limit: Option<u64> = header_value(headers, LIMIT_HEADER);
        let remaining: Option<u64> = header_value(headers, REMAINING_HEADER);
        let reset: Option<i64> = header_value(headers, RESET_HEADER);

        if limit.is_none() && remaining.is_none() && reset.is_none() {
            return None;
        }

        let mut state = self.lock();
        if let Some(limit) = limit {
            state.limit = limit;
        }
        if let Some(remaining) = remaining {
            state.remaining = remaining;
        }
        if let Some(reset) = reset.and_then(|r| DateTime::from_timestamp(r, 0)) {
            state.reset_at = Some(reset);
        }
        Some(*state)
    }

    /// True when fewer than the threshold (default 10) requests remain.
    pub fn is_near_limit(&self) -> bool {
        self.current_state().is_below(self.near_limit_threshold)
    }

    /// True when near the limit and the reset is still more than the defer
    /// window (default 5 minutes) away.
    pub fn should_defer(&self) -> bool {
        self.should_defer_at(Utc::now())
    }

    pub fn should_defer_at(&self, now: DateTime<Utc>) -> bool {
        let state = self.current_state();
        state.is_below(self.near_limit_threshold)
            && state
                .time_until_reset(now)
                .is_some_and(|left| left > self.defer_window)
    }
}

impl<T: Transport> GitHubClient<T> {
    /// Poll `/rate_limit` and replace the tracked state with the core bucket.
    pub async fn refresh_rate_limit(&self) -> Result<RateLimitState> {
        let bucket = self.get_rate_limit().await?;
        let state = RateLimitState::from(bucket);
        self.rate_limit().replace(state);
        tracing::debug!(
            remaining = state.remaining,
            limit = state.limit,
            "Rate limit refreshed"
        );
        Ok(state)
    }
}

/// Messages sent from the background poller.
#[derive(Debug, Clone)]
pub enum RateLimitMessage {
    Updated(RateLimitState),
    /// The poll failed; the previous state is kept.
    Failed(String),
}

/// Handle for the background rate limit poller.
pub struct RateLimitPoller {
    /// Channel for receiving poll results.
    pub receiver: mpsc::Receiver<RateLimitMessage>,
    shutdown_tx: mpsc::Sender<()>,
}

impl RateLimitPoller {
    /// Spawn a task that polls immediately and then every `interval`.
    pub fn spawn<T: Transport + 'static>(client: Arc<GitHubClient<T>>, interval: Duration) -> Self {
        let (msg_tx, msg_rx) = mpsc::channel(8);
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let message = match client.refresh_rate_limit().await {
                            Ok(state) => RateLimitMessage::Updated(state),
                            Err(e) => {
                                tracing::warn!(error = %e, "Could not check rate limit");
                                RateLimitMessage::Failed(e.user_message())
                            }
                        };
                        if msg_tx.send(message).await.is_err() {
                            break;
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        break;
                    }
                }
            }
        });

        Self {
            receiver: msg_rx,
            shutdown_tx,
        }
    }

    /// Next pending message, without waiting.
    pub fn try_recv(&mut self) -> Option<RateLimitMessage> {
        self.receiver.try_recv().ok()
    }

    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}
