//! Integration tests for the ghpeek binary
//!
//! Only cases that finish without network access or a terminal.

use std::process::Command;

use tempfile::TempDir;

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_ghpeek"))
        .args(args)
        .env_remove("GITHUB_TOKEN")
        .env_remove("GHPEEK_BASE_URL")
        .output()
        .expect("Failed to execute ghpeek")
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("profile"));
    assert!(stdout.contains("rate-limit"));
    assert!(stdout.contains("browse"));
}

#[test]
fn test_profile_without_username_fails() {
    let output = run_cli(&["profile"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("USERNAME"), "stderr: {}", stderr);
}

#[test]
fn test_zero_repo_count_is_rejected() {
    let output = run_cli(&["profile", "octocat", "--repos", "0"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--repos"), "stderr: {}", stderr);
}

#[test]
fn test_blank_username_is_rejected_without_network() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("config.toml");
    // Unroutable base URL: any request would fail as a connection error instead.
    std::fs::write(&config, "[api]\nbase_url = \"http://127.0.0.1:9\"\n").unwrap();

    let output = run_cli(&["profile", "   ", "--config", config.to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid username"), "stderr: {}", stderr);
}

#[test]
fn test_missing_config_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nope.toml");

    let output = run_cli(&["rate-limit", "--config", missing.to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("error:"), "stderr: {}", stderr);
}

#[test]
fn test_browse_with_missing_roster_fails_before_tui() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("students.txt");

    let output = run_cli(&["browse", "--roster", missing.to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cannot read roster"), "stderr: {}", stderr);
}

#[cfg(test)]
mod unit_tests {
    //! CLI parsing through the library, without running the binary

    use clap::Parser;
    use ghpeek::cli::{Cli, Command};

    #[test]
    fn test_profile_flags() {
        let cli = Cli::parse_from(["ghpeek", "profile", "octocat", "--json", "--stats"]);
        assert!(matches!(
            cli.command,
            Command::Profile {
                json: true,
                stats: true,
                repos: None,
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_subcommand_rejected() {
        assert!(Cli::try_parse_from(["ghpeek", "sync"]).is_err());
    }
}
