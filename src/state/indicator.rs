// Rate limit indicator state.
// Shows a warning panel while the quota is low, until the user dismisses it.

use chrono::{DateTime, Utc};

use crate::github::{RateLimitMessage, RateLimitState};

#[derive(Debug, Clone, Default)]
pub struct RateLimitIndicator {
    pub state: Option<RateLimitState>,
    pub last_checked: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    /// Whether the warning panel is shown.
    pub visible: bool,
    near_limit_threshold: u64,
}

impl RateLimitIndicator {
    pub fn new(near_limit_threshold: u64) -> Self {
        Self {
            near_limit_threshold,
            ..Self::default()
        }
    }

    /// Apply a poll result. The panel reappears on every low reading, even
    /// after a dismissal.
    pub fn apply(&mut self, message: RateLimitMessage, now: DateTime<Utc>) {
        match message {
            RateLimitMessage::Updated(state) => {
                self.visible = state.is_below(self.near_limit_threshold);
                self.state = Some(state);
                self.last_checked = Some(now);
                self.last_error = None;
            }
            RateLimitMessage::Failed(message) => {
                self.last_error = Some(message);
            }
        }
    }

    /// Whole seconds since the last successful poll.
    pub fn seconds_since_check(&self, now: DateTime<Utc>) -> Option<i64> {
        self.last_checked
            .map(|checked| now.signed_duration_since(checked).num_seconds().max(0))
    }

    pub fn dismiss(&mut self) {
        self.visible = false;
    }
}
