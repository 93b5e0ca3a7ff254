//! Command-line interface for ghpeek
//!
//! Argument parsing with clap, plus the plain-text renderings the one-shot
//! commands print.

use std::fmt::Write as _;
use std::path::PathBuf;

use chrono::{DateTime, Local, Utc};
use clap::{Parser, Subcommand};

use crate::cache::CacheStats;
use crate::github::{ProfileLookup, RateLimitState};

/// ghpeek - cached GitHub profile lookups for student rosters
#[derive(Parser, Debug)]
#[command(name = "ghpeek")]
#[command(about = "Cached, rate-limit aware GitHub profile lookups")]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show profile and top repositories for one or more users
    Profile {
        /// GitHub usernames
        #[arg(required = true, value_name = "USERNAME")]
        usernames: Vec<String>,

        /// Number of top repositories to show (1-100)
        #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..=100))]
        repos: Option<u32>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,

        /// Print cache statistics after the lookups
        #[arg(long)]
        stats: bool,
    },

    /// Show the current GitHub API quota
    RateLimit {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Browse a roster of users in the terminal UI
    Browse {
        /// GitHub usernames
        #[arg(value_name = "USERNAME")]
        usernames: Vec<String>,

        /// File with one username per line
        #[arg(long, value_name = "FILE")]
        roster: Option<PathBuf>,
    },
}

/// Render a lookup as the text shown by `ghpeek profile`.
pub fn format_lookup(lookup: &ProfileLookup) -> String {
    let profile = &lookup.profile;
    let mut out = String::new();

    let _ = writeln!(out, "{} (@{})", profile.display_name(), profile.login);
    if let Some(bio) = profile.bio.as_deref().filter(|b| !b.trim().is_empty()) {
        let _ = writeln!(out, "  {}", bio.trim());
    }
    let _ = writeln!(
        out,
        "  repos: {}  followers: {}  following: {}",
        profile.public_repos, profile.followers, profile.following
    );
    let _ = writeln!(
        out,
        "  member since {}  {}",
        profile.created_at.format("%Y-%m-%d"),
        profile.html_url
    );

    if !lookup.repos.is_empty() {
        let _ = writeln!(out, "  top repositories:");
        for repo in &lookup.repos {
            let _ = write!(
                out,
                "    {}  ★{} ⑂{}",
                repo.name, repo.stargazers_count, repo.forks_count
            );
            if let Some(language) = &repo.language {
                let _ = write!(out, "  [{}]", language);
            }
            let _ = writeln!(out);
        }
    }
    if let Some(warning) = &lookup.repos_warning {
        let _ = writeln!(out, "  (repositories unavailable: {})", warning);
    }
    out
}

/// Render the quota line shown by `ghpeek rate-limit`.
pub fn format_rate_limit(state: &RateLimitState, now: DateTime<Utc>) -> String {
    let mut out = format!("{} / {} requests remaining", state.remaining, state.limit);
    match (state.reset_at, state.minutes_until_reset(now)) {
        (Some(reset), Some(minutes)) => {
            let _ = write!(
                out,
                ", resets at {} (in {} min)",
                reset.with_timezone(&Local).format("%H:%M:%S"),
                minutes
            );
        }
        (Some(_), None) => out.push_str(", reset time has passed"),
        _ => {}
    }
    out
}

pub fn format_cache_stats(stats: &CacheStats) -> String {
    format!(
        "cache: {} entries ({} valid, {} expired)",
        stats.total, stats.valid, stats.expired
    )
}
