//! ghpeek library
//!
//! Cached, retrying, rate-limit aware access to GitHub profiles and
//! repositories. The binary's CLI commands and TUI are thin consumers of
//! [`github::ProfileClient`].

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod github;
pub mod logging;
pub mod state;

pub use error::{GhError, Result};
