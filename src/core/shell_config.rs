use super::app_log::AppLog;
use crate::models::shell_config::{
    ShellConfig, DEFAULT_PROBE_TIMEOUT_MS, DEFAULT_USER_AGENT, DEFAULT_WINDOW_TITLE,
};
use anyhow::{Context, Result};
use serde_json::json;
use std::fs;
use std::path::Path;

pub const SHELL_CONFIG_FILE_NAME: &str = "shell.json";

const MIN_PROBE_TIMEOUT_MS: u64 = 500;
const MAX_PROBE_TIMEOUT_MS: u64 = 30_000;

fn normalize_probe_timeout_ms(ms: u64) -> u64 {
    if ms == 0 {
        return DEFAULT_PROBE_TIMEOUT_MS;
    }
    ms.clamp(MIN_PROBE_TIMEOUT_MS, MAX_PROBE_TIMEOUT_MS)
}

fn normalize_non_empty(value: String, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

fn normalize(config: ShellConfig) -> ShellConfig {
    ShellConfig {
        remote_url: config.remote_url.trim().to_string(),
        user_agent: normalize_non_empty(config.user_agent, DEFAULT_USER_AGENT),
        window_title: normalize_non_empty(config.window_title, DEFAULT_WINDOW_TITLE),
        probe_timeout_ms: normalize_probe_timeout_ms(config.probe_timeout_ms),
    }
}

fn try_load(path: &Path) -> Result<Option<ShellConfig>> {
    if !path.exists() {
        return Ok(None);
    }
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let config: ShellConfig = serde_json::from_slice(&bytes).context("Invalid shell config")?;
    Ok(Some(config))
}

/// Reads the optional override file; anything unreadable yields the built-in defaults.
pub fn load(path: &Path, log: &AppLog) -> ShellConfig {
    match try_load(path) {
        Ok(Some(config)) => normalize(config),
        Ok(None) => ShellConfig::default(),
        Err(e) => {
            let _ = log.warn(
                "config",
                "load_failed",
                json!({ "path": path.display().to_string(), "error": format!("{:#}", e) }),
            );
            ShellConfig::default()
        }
    }
}
