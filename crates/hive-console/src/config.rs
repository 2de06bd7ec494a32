//! Configuration loading and resolution.
//!
//! Settings come from an optional TOML file; command-line flags override it.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::cli::Args;

const DEFAULT_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_REFRESH_DELAY_MS: u64 = 500;
const DEFAULT_LOG_CAPACITY: usize = 500;
const DEFAULT_SCHEDULE_DELAY_SECS: f64 = 3.0;

/// Console configuration file schema.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ConsoleConfig {
    /// Base URL of the host backend.
    pub(crate) server: Option<String>,
    /// Per-request timeout in milliseconds.
    pub(crate) timeout_ms: Option<u64>,
    /// Delay before re-polling status after start/stop.
    pub(crate) refresh_delay_ms: Option<u64>,
    /// Periodic status poll interval; 0 or absent disables polling.
    pub(crate) poll_interval_ms: Option<u64>,
    /// Log panel capacity; 0 keeps every line.
    pub(crate) log_capacity: Option<usize>,
    /// Schedule delay used when the delay input is empty or invalid.
    pub(crate) default_delay_secs: Option<f64>,
}

impl ConsoleConfig {
    /// Load configuration from disk.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let raw =
            std::fs::read_to_string(path).with_context(|| format!("read config {:?}", path))?;
        toml::from_str::<ConsoleConfig>(&raw).with_context(|| format!("parse config {:?}", path))
    }
}

/// Fully resolved runtime settings.
#[derive(Clone, Debug)]
pub(crate) struct Settings {
    pub(crate) server: String,
    pub(crate) timeout: Duration,
    pub(crate) refresh_delay: Duration,
    pub(crate) poll_interval: Option<Duration>,
    pub(crate) log_capacity: usize,
    pub(crate) default_delay_secs: f64,
}

/// Merge CLI flags over the config file and apply defaults.
pub(crate) fn resolve(args: &Args, file: ConsoleConfig) -> Result<Settings> {
    let server = args
        .server
        .clone()
        .or(file.server)
        .map(|s| s.trim().trim_end_matches('/').to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| anyhow::anyhow!("server URL is required; use --server or the config file"))?;
    if !server.starts_with("http://") && !server.starts_with("https://") {
        return Err(anyhow::anyhow!("server URL must start with http:// or https://: {server}"));
    }

    let timeout_ms = args.timeout_ms.or(file.timeout_ms).unwrap_or(DEFAULT_TIMEOUT_MS);
    if timeout_ms == 0 {
        return Err(anyhow::anyhow!("timeout_ms must be greater than zero"));
    }
    let refresh_delay_ms = args
        .refresh_delay_ms
        .or(file.refresh_delay_ms)
        .unwrap_or(DEFAULT_REFRESH_DELAY_MS);
    let poll_interval = args
        .poll_interval_ms
        .or(file.poll_interval_ms)
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis);
    let log_capacity = args
        .log_capacity
        .or(file.log_capacity)
        .unwrap_or(DEFAULT_LOG_CAPACITY);
    let default_delay_secs = file.default_delay_secs.unwrap_or(DEFAULT_SCHEDULE_DELAY_SECS);
    if !default_delay_secs.is_finite() || default_delay_secs < 0.0 {
        return Err(anyhow::anyhow!(
            "default_delay_secs must be a non-negative number, got {default_delay_secs}"
        ));
    }

    Ok(Settings {
        server,
        timeout: Duration::from_millis(timeout_ms),
        refresh_delay: Duration::from_millis(refresh_delay_ms),
        poll_interval,
        log_capacity,
        default_delay_secs,
    })
}

/// Load the config file named by `--config` (if any) and resolve settings.
pub(crate) fn load_settings(args: &Args) -> Result<Settings> {
    let file = match args.config.as_deref() {
        Some(path) => ConsoleConfig::load(path)?,
        None => ConsoleConfig::default(),
    };
    resolve(args, file)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::Parser;

    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["hive-console"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn defaults_apply_when_only_server_given() {
        let settings = resolve(&args(&["--server", "http://host:5000/"]), ConsoleConfig::default())
            .unwrap();
        assert_eq!(settings.server, "http://host:5000");
        assert_eq!(settings.refresh_delay, Duration::from_millis(500));
        assert_eq!(settings.timeout, Duration::from_secs(10));
        assert_eq!(settings.poll_interval, None);
        assert_eq!(settings.log_capacity, 500);
        assert_eq!(settings.default_delay_secs, 3.0);
    }

    #[test]
    fn missing_server_is_an_error() {
        let err = resolve(&args(&[]), ConsoleConfig::default()).unwrap_err();
        assert!(format!("{err:#}").contains("server URL is required"));
    }

    #[test]
    fn cli_flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "server = \"http://from-file:5000\"\nrefresh_delay_ms = 900\nlog_capacity = 20\npoll_interval_ms = 1500"
        )
        .unwrap();
        let path = file.path().to_string_lossy().to_string();
        let args = args(&["--config", &path, "--refresh-delay-ms", "250", "status"]);
        let settings = load_settings(&args).unwrap();
        assert_eq!(settings.server, "http://from-file:5000");
        assert_eq!(settings.refresh_delay, Duration::from_millis(250));
        assert_eq!(settings.log_capacity, 20);
        assert_eq!(settings.poll_interval, Some(Duration::from_millis(1500)));
    }

    #[test]
    fn unknown_config_keys_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "sever = \"http://typo:5000\"").unwrap();
        let err = ConsoleConfig::load(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("parse config"));
    }

    #[test]
    fn example_config_parses() {
        let cfg: ConsoleConfig = toml::from_str(include_str!("../config.example.toml")).unwrap();
        let settings = resolve(&args(&[]), cfg).unwrap();
        assert_eq!(settings.server, "http://127.0.0.1:5000");
        assert_eq!(settings.poll_interval, None);
    }

    #[test]
    fn non_http_server_is_rejected() {
        let err = resolve(&args(&["--server", "ftp://host"]), ConsoleConfig::default()).unwrap_err();
        assert!(err.to_string().contains("http://"));
    }
}
