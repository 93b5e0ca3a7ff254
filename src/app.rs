// App state and main event loop for the roster browser.
// Lookups run as tokio tasks and report back over a channel so drawing never blocks.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::prelude::*;
use tokio::sync::mpsc;

use ghpeek::cache::CacheStats;
use ghpeek::github::{ProfileClient, ProfileLookup, RateLimitMessage, RateLimitPoller};
use ghpeek::state::{ProfileCard, RateLimitIndicator, Roster};

use crate::ui;

/// Results delivered from background tasks.
#[derive(Debug)]
pub enum AppEvent {
    Lookup {
        request_id: u64,
        result: Result<ProfileLookup, String>,
    },
    RateLimit(RateLimitMessage),
}

/// Main application state.
pub struct App {
    pub roster: Roster,
    /// Open profile card, if any.
    pub card: Option<ProfileCard>,
    pub indicator: RateLimitIndicator,
    pub show_help: bool,
    /// Transient message for the status bar.
    pub notice: Option<String>,
    /// Whether the app should exit.
    pub should_quit: bool,
    client: Arc<ProfileClient>,
    repo_count: u32,
    next_request_id: u64,
    events_tx: mpsc::UnboundedSender<AppEvent>,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,
    poller: Option<RateLimitPoller>,
}

impl App {
    pub fn new(client: ProfileClient, usernames: Vec<String>, near_limit_threshold: u64) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let repo_count = client.default_repo_count();
        Self {
            roster: Roster::new(usernames),
            card: None,
            indicator: RateLimitIndicator::new(near_limit_threshold),
            show_help: false,
            notice: None,
            should_quit: false,
            client: Arc::new(client),
            repo_count,
            next_request_id: 0,
            events_tx,
            events_rx,
            poller: None,
        }
    }

    /// Start polling the quota endpoint in the background.
    pub fn start_rate_limit_poller(&mut self, interval: Duration) {
        self.poller = Some(RateLimitPoller::spawn(self.client.github(), interval));
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.client.cache_stats()
    }

    pub fn should_defer(&self) -> bool {
        self.client.rate_limit().should_defer()
    }

    /// Main event loop.
    pub async fn run(&mut self, terminal: &mut Terminal<impl Backend>) -> io::Result<()> {
        while !self.should_quit {
            self.process_events();
            terminal.draw(|frame| ui::draw(frame, self))?;
            self.handle_input()?;
        }
        if let Some(poller) = self.poller.take() {
            poller.shutdown().await;
        }
        Ok(())
    }

    /// Apply everything the background tasks have delivered.
    fn process_events(&mut self) {
        let mut messages = Vec::new();
        if let Some(poller) = self.poller.as_mut() {
            while let Some(message) = poller.try_recv() {
                messages.push(message);
            }
        }
        for message in messages {
            self.indicator.apply(message, Utc::now());
        }

        while let Ok(event) = self.events_rx.try_recv() {
            self.apply_event(event);
        }
    }

    fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Lookup { request_id, result } => {
                // A dismissed or replaced card simply drops the result.
                if let Some(card) = self.card.as_mut() {
                    card.apply(request_id, result);
                }
            }
            AppEvent::RateLimit(message) => {
                self.notice = None;
                self.indicator.apply(message, Utc::now());
            }
        }
    }

    /// Handle keyboard events.
    #[allow(clippy::collapsible_if)]
    fn handle_input(&mut self) -> io::Result<()> {
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    self.handle_key(key);
                }
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if self.show_help {
            self.show_help = false;
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Esc => self.card = None,
            KeyCode::Down | KeyCode::Char('j') => {
                self.roster.select_next();
                self.card = None;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.roster.select_prev();
                self.card = None;
            }
            KeyCode::Enter => self.open_card(),
            KeyCode::Char('x') => self.indicator.dismiss(),
            KeyCode::Char('r') => self.refresh_rate_limit(),
            KeyCode::Char('c') => {
                self.client.clear_cache();
                self.notice = Some("Cache cleared".to_string());
            }
            _ => {}
        }
    }

    /// Open the profile card for the selected user and start its lookup.
    fn open_card(&mut self) {
        let Some(username) = self.roster.selected().map(str::to_string) else {
            return;
        };

        self.next_request_id += 1;
        let request_id = self.next_request_id;
        self.card = Some(ProfileCard::loading(username.clone(), request_id));
        self.notice = None;

        let client = Arc::clone(&self.client);
        let tx = self.events_tx.clone();
        let count = self.repo_count;
        tokio::spawn(async move {
            let result = client
                .lookup(&username, Some(count))
                .await
                .map_err(|e| e.user_message());
            let _ = tx.send(AppEvent::Lookup { request_id, result });
        });
    }

    fn refresh_rate_limit(&mut self) {
        let client = Arc::clone(&self.client);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let message = match client.refresh_rate_limit().await {
                Ok(state) => RateLimitMessage::Updated(state),
                Err(e) => RateLimitMessage::Failed(e.user_message()),
            };
            let _ = tx.send(AppEvent::RateLimit(message));
        });
        self.notice = Some("Checking rate limit...".to_string());
    }
}
