// Profile card state.
// Tracks which username the card shows so late results for a dismissed card are dropped.

use crate::github::ProfileLookup;

use super::LoadingState;

#[derive(Debug, Clone)]
pub struct ProfileCard {
    pub username: String,
    /// Identifies the lookup that fills this card.
    pub request_id: u64,
    pub data: LoadingState<ProfileLookup>,
}

impl ProfileCard {
    pub fn loading(username: impl Into<String>, request_id: u64) -> Self {
        Self {
            username: username.into(),
            request_id,
            data: LoadingState::Loading,
        }
    }

    /// Apply a finished lookup. Returns false if it belongs to another request.
    pub fn apply(&mut self, request_id: u64, result: Result<ProfileLookup, String>) -> bool {
        if request_id != self.request_id {
            return false;
        }
        self.data = match result {
            Ok(lookup) => LoadingState::Loaded(lookup),
            Err(message) => LoadingState::Error(message),
        };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_result_is_ignored() {
        let mut card = ProfileCard::loading("octocat", 2);
        assert!(!card.apply(1, Err("User not found on GitHub".into())));
        assert!(matches!(card.data, LoadingState::Loading));

        assert!(card.apply(2, Err("Connection error. Check your network".into())));
        assert!(matches!(card.data, LoadingState::Error(ref m) if m.starts_with("Connection")));
    }
}
