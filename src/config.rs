//! Configuration and CLI argument handling

use std::{path::PathBuf, time::Duration};

use clap::{Parser, ValueEnum};

/// How notifications reach the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NotifierKind {
    /// Desktop notifications via notify-send
    Desktop,
    /// Log lines only
    Log,
}

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "cf-reminder")]
#[command(about = "Background daemon that reminds you before Codeforces contests start")]
#[command(version)]
pub struct Config {
    /// Port to bind the API server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Reminder state file (defaults to the user data directory)
    #[arg(long)]
    pub state_file: Option<PathBuf>,

    /// Codeforces API base URL
    #[arg(long, default_value = "https://codeforces.com")]
    pub api_base: String,

    /// Hours between contest list refreshes
    #[arg(long, default_value = "6")]
    pub poll_interval_hours: u64,

    /// Minutes before the first scheduled refresh
    #[arg(long, default_value = "1")]
    pub poll_delay_minutes: u64,

    /// Timeout for contest list requests in seconds
    #[arg(long, default_value = "10")]
    pub request_timeout_secs: u64,

    /// Notification backend
    #[arg(long, value_enum, default_value = "desktop")]
    pub notifier: NotifierKind,

    /// Turn reminders on at startup
    #[arg(long)]
    pub enable: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Resolved location of the state file
    pub fn state_path(&self) -> PathBuf {
        self.state_file.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("cf-reminder")
                .join("state.json")
        })
    }

    pub fn poll_delay(&self) -> Duration {
        Duration::from_secs(self.poll_delay_minutes * 60)
    }

    /// Refresh period, never shorter than one hour
    pub fn poll_period(&self) -> Duration {
        Duration::from_secs(self.poll_interval_hours.max(1) * 3600)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::try_parse_from(["cf-reminder"]).expect("parse");
        assert_eq!(config.address(), "127.0.0.1:20554");
        assert_eq!(config.poll_period(), Duration::from_secs(6 * 3600));
        assert_eq!(config.poll_delay(), Duration::from_secs(60));
        assert_eq!(config.notifier, NotifierKind::Desktop);
        assert_eq!(config.log_level(), "info");
        assert!(config.state_path().ends_with("cf-reminder/state.json"));
    }

    #[test]
    fn overrides_are_applied() {
        let config = Config::try_parse_from([
            "cf-reminder",
            "--state-file",
            "/tmp/reminder.json",
            "--poll-interval-hours",
            "0",
            "--notifier",
            "log",
            "--enable",
            "-v",
        ])
        .expect("parse");

        assert_eq!(config.state_path(), PathBuf::from("/tmp/reminder.json"));
        assert_eq!(config.poll_period(), Duration::from_secs(3600));
        assert_eq!(config.notifier, NotifierKind::Log);
        assert!(config.enable);
        assert_eq!(config.log_level(), "debug");
    }
}
