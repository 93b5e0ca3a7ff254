// State management module.
// Holds the roster list, the profile card and the rate limit indicator for the TUI.

pub mod card;
pub mod indicator;
pub mod roster;

pub use card::ProfileCard;
pub use indicator::RateLimitIndicator;
pub use roster::{Roster, load_roster, parse_roster};

/// Loading state for async data.
#[derive(Debug, Clone, Default)]
pub enum LoadingState<T> {
    #[default]
    Idle,
    Loading,
    Loaded(T),
    Error(String),
}
