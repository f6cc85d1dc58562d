//! Configuration loading from environment variables.

use crate::constants::*;
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Runtime configuration for ClipStash.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub db_path: String,
    pub poll_interval_ms: u64,
    pub page_size: usize,
    pub load_more_size: usize,
    /// `0` disables retention pruning.
    pub max_entries: usize,
    pub max_content_bytes: usize,
    pub copy_retries: u32,
    pub copy_base_delay_ms: u64,
    pub startup_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            page_size: DEFAULT_PAGE_SIZE,
            load_more_size: DEFAULT_LOAD_MORE_SIZE,
            max_entries: DEFAULT_MAX_ENTRIES,
            max_content_bytes: DEFAULT_MAX_CONTENT_BYTES,
            copy_retries: DEFAULT_COPY_RETRIES,
            copy_base_delay_ms: DEFAULT_COPY_BASE_DELAY_MS,
            startup_timeout_ms: DEFAULT_STARTUP_TIMEOUT_MS,
        }
    }
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: String) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = resolve_home_dir() {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path
}

fn resolve_home_dir() -> Option<PathBuf> {
    if let Ok(home) = env::var("HOME") {
        if !home.trim().is_empty() {
            return Some(PathBuf::from(home));
        }
    }

    if let Ok(profile) = env::var("USERPROFILE") {
        if !profile.trim().is_empty() {
            return Some(PathBuf::from(profile));
        }
    }

    std::env::current_dir().ok()
}

fn default_db_path() -> String {
    let home = resolve_home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".cache")
        .join("clipstash")
        .to_string_lossy()
        .to_string()
}

/// Parse a boolean-like environment flag value.
///
/// # Supported Values
/// - Truthy: `1`, `true`, `yes`, `on`
/// - Falsy: `0`, `false`, `no`, `off`, empty string
///
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Returns
/// `Some(bool)` when the value is recognized, otherwise `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean flag from the environment.
///
/// Missing or unrecognized values are treated as `false`.
pub fn env_flag_enabled(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_env_flag(&value))
        .unwrap_or(false)
}

/// Parse a numeric setting, falling back to `default` for missing or
/// non-numeric input.
pub fn parse_number_or<T: FromStr>(raw: Option<&str>, default: T) -> T {
    raw.map(str::trim)
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

fn env_number<T: FromStr>(name: &str, default: T) -> T {
    parse_number_or(env::var(name).ok().as_deref(), default)
}

/// Clamp a page size into `1..=MAX_PAGE_SIZE`.
pub fn clamp_page_size(value: usize) -> usize {
    value.clamp(1, MAX_PAGE_SIZE)
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing
    /// or malformed.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            db_path: env::var("CLIPSTASH_DB_PATH")
                .ok()
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
                .map(expand_tilde)
                .unwrap_or(defaults.db_path),
            poll_interval_ms: env_number("CLIPSTASH_POLL_INTERVAL_MS", defaults.poll_interval_ms)
                .max(1),
            page_size: clamp_page_size(env_number("CLIPSTASH_PAGE_SIZE", defaults.page_size)),
            load_more_size: clamp_page_size(env_number(
                "CLIPSTASH_LOAD_MORE_SIZE",
                defaults.load_more_size,
            )),
            max_entries: env_number("CLIPSTASH_MAX_ENTRIES", defaults.max_entries),
            max_content_bytes: env_number(
                "CLIPSTASH_MAX_CONTENT_BYTES",
                defaults.max_content_bytes,
            ),
            copy_retries: env_number("CLIPSTASH_COPY_RETRIES", defaults.copy_retries).max(1),
            copy_base_delay_ms: env_number(
                "CLIPSTASH_COPY_BASE_DELAY_MS",
                defaults.copy_base_delay_ms,
            ),
            startup_timeout_ms: env_number(
                "CLIPSTASH_STARTUP_TIMEOUT_MS",
                defaults.startup_timeout_ms,
            ),
        }
    }
}
