use serde::{Deserialize, Serialize};
use std::time::Duration;
use tauri::Url;

pub const DEFAULT_REMOTE_URL: &str = "https://app.example.com/";
pub const DEFAULT_WINDOW_TITLE: &str = "Webshell";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    pub remote_url: String,
    pub user_agent: String,
    pub window_title: String,
    pub probe_timeout_ms: u64,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            remote_url: DEFAULT_REMOTE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            window_title: DEFAULT_WINDOW_TITLE.to_string(),
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
        }
    }
}

impl ShellConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// The remote target, accepted only as an absolute http(s) URL.
    pub fn remote_target(&self) -> Result<Url, String> {
        let url = Url::parse(self.remote_url.trim())
            .map_err(|e| format!("Invalid remote_url {}: {}", self.remote_url, e))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(format!("Unsupported remote_url scheme: {}", other)),
        }
    }
}
