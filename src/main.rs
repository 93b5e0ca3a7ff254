//! ghpeek - GitHub profile lookups for student rosters
//!
//! One-shot CLI commands print profiles and the API quota. `ghpeek browse`
//! opens a terminal UI with a profile card and a rate limit indicator.

mod app;
mod ui;

use std::io;
use std::panic;
use std::process::ExitCode;

use chrono::Utc;
use clap::Parser;
use crossterm::{
    cursor::Show,
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use ghpeek::cli::{Cli, Command, format_cache_stats, format_lookup, format_rate_limit};
use ghpeek::config::Config;
use ghpeek::github::ProfileClient;
use ghpeek::state::{load_roster, parse_roster};
use ghpeek::{GhError, Result, logging};

use app::App;

/// Sets up a panic hook that restores the terminal before printing the panic message.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
}

/// Runs `restore` when dropped, so every exit after raw mode is enabled
/// leaves the terminal usable.
struct TerminalGuard<F: FnMut()> {
    restore: F,
}

impl<F: FnMut()> Drop for TerminalGuard<F> {
    fn drop(&mut self) {
        (self.restore)();
    }
}

fn log_level(cli: &Cli, config: &Config) -> String {
    if cli.verbose {
        "debug".to_string()
    } else {
        config.log.level.clone()
    }
}

/// `ghpeek profile`: look up each user in turn. Repeated names are served from cache.
async fn run_profile(
    client: &ProfileClient,
    usernames: &[String],
    repos: Option<u32>,
    json: bool,
    stats: bool,
) -> Result<bool> {
    let mut all_ok = true;
    let mut results = Vec::new();

    for username in usernames {
        match client.lookup(username, repos).await {
            Ok(lookup) => {
                if json {
                    results.push(serde_json::to_value(&lookup)?);
                } else {
                    println!("{}", format_lookup(&lookup));
                }
            }
            Err(e) => {
                all_ok = false;
                tracing::debug!(%username, error = %e, "Lookup failed");
                eprintln!("{}: {}", username.trim(), e.user_message());
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    }
    if stats {
        eprintln!("{}", format_cache_stats(&client.cache_stats()));
    }
    Ok(all_ok)
}

/// `ghpeek rate-limit`: poll the quota endpoint once.
async fn run_rate_limit(client: &ProfileClient, json: bool) -> Result<()> {
    let state = client.refresh_rate_limit().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    } else {
        println!("{}", format_rate_limit(&state, Utc::now()));
        if client.is_near_limit() {
            println!("warning: GitHub API quota is nearly exhausted");
        }
    }
    Ok(())
}

/// `ghpeek browse`: run the roster TUI.
async fn run_browse(client: ProfileClient, usernames: Vec<String>, config: &Config) -> Result<()> {
    setup_panic_hook();

    enable_raw_mode()?;
    let _guard = TerminalGuard {
        restore: restore_terminal,
    };
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(client, usernames, config.rate_limit.near_limit_threshold);
    app.start_rate_limit_poller(config.rate_limit.poll_interval());
    app.run(&mut terminal).await?;
    Ok(())
}

async fn run(cli: Cli) -> Result<bool> {
    let config = Config::load(cli.config.as_deref())?;
    let level = log_level(&cli, &config);

    match cli.command {
        Command::Profile {
            usernames,
            repos,
            json,
            stats,
        } => {
            logging::init_stderr(&level);
            let client = ProfileClient::from_config(&config)?;
            run_profile(&client, &usernames, repos, json, stats).await
        }
        Command::RateLimit { json } => {
            logging::init_stderr(&level);
            let client = ProfileClient::from_config(&config)?;
            run_rate_limit(&client, json).await?;
            Ok(true)
        }
        Command::Browse {
            mut usernames,
            roster,
        } => {
            if let Some(path) = roster {
                usernames.extend(load_roster(&path).map_err(|e| match e {
                    GhError::Io(io) => {
                        GhError::Config(format!("cannot read roster {}: {}", path.display(), io))
                    }
                    other => other,
                })?);
            }
            // Same rules for names given on the command line and in the file.
            let usernames = parse_roster(&usernames.join("\n"));
            logging::init_file(&level)?;
            let client = ProfileClient::from_config(&config)?;
            run_browse(client, usernames, &config).await?;
            Ok(true)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {}", e.user_message());
            ExitCode::FAILURE
        }
    }
}
