// GitHub API module.
// Provides the retrying client, rate limit tracking and cached profile lookups.

pub mod client;
pub mod endpoints;
pub mod profiles;
pub mod rate_limit;
pub mod retry;
pub mod transport;
pub mod types;

pub use client::GitHubClient;
pub use profiles::ProfileClient;
pub use rate_limit::{RateLimitMessage, RateLimitPoller, RateLimitState, RateLimitTracker, StatusLevel};
pub use retry::RetryPolicy;
pub use transport::{HttpResponse, ReqwestTransport, Transport};
pub use types::*;
