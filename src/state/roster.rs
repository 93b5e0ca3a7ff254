// Roster of student usernames.
// Loads usernames from arguments or a text file and tracks list selection.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use ratatui::widgets::ListState;

use crate::error::Result;

/// Parse a roster file: one username per line, `#` starts a comment.
/// Blank lines and case-insensitive duplicates are skipped.
pub fn parse_roster(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    text.lines()
        .map(|line| line.split('#').next().unwrap_or_default().trim())
        .map(|name| name.trim_start_matches('@'))
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(name.to_lowercase()))
        .map(str::to_string)
        .collect()
}

pub fn load_roster(path: &Path) -> Result<Vec<String>> {
    let contents = fs::read_to_string(path)?;
    Ok(parse_roster(&contents))
}

/// Selectable list of usernames.
#[derive(Debug, Default)]
pub struct Roster {
    pub usernames: Vec<String>,
    pub list_state: ListState,
}

impl Roster {
    pub fn new(usernames: Vec<String>) -> Self {
        let mut list_state = ListState::default();
        if !usernames.is_empty() {
            list_state.select(Some(0));
        }
        Self {
            usernames,
            list_state,
        }
    }

    pub fn len(&self) -> usize {
        self.usernames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.usernames.is_empty()
    }

    /// Select the next item in the list.
    pub fn select_next(&mut self) {
        if self.usernames.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i >= self.usernames.len() - 1 => i, // Stay at end
            Some(i) => i + 1,
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    /// Select the previous item in the list.
    pub fn select_prev(&mut self) {
        if self.usernames.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    /// Get the selected username.
    pub fn selected(&self) -> Option<&str> {
        let index = self.list_state.selected()?;
        self.usernames.get(index).map(String::as_str)
    }
}
