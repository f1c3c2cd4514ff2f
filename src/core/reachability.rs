//! Startup network check that decides between the remote target and the offline page.

use super::app_log::AppLog;
use crate::models::ContentSource;
use serde_json::json;
use std::future::Future;
use std::time::{Duration, Instant};
use tauri::Url;

pub trait ReachabilityProbe {
    /// Resolves `Ok` once the target answered at all, whatever the status code.
    fn probe(&self, target: &Url) -> impl Future<Output = Result<(), String>> + Send;
}

pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new(user_agent: &str) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| format!("Failed to build probe client: {}", e))?;
        Ok(Self { client })
    }
}

impl ReachabilityProbe for HttpProbe {
    fn probe(&self, target: &Url) -> impl Future<Output = Result<(), String>> + Send {
        let request = self.client.head(target.clone());
        async move {
            request
                .send()
                .await
                .map(|_| ())
                .map_err(|e| format!("PROBE_ERROR: {}", e))
        }
    }
}

/// Runs the probe once. An error or a timeout counts as offline.
pub async fn choose_content<P: ReachabilityProbe>(
    probe: &P,
    target: &Url,
    timeout: Duration,
    log: &AppLog,
) -> ContentSource {
    let started = Instant::now();
    let outcome = match tokio::time::timeout(timeout, probe.probe(target)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e),
        Err(_) => Err(format!("PROBE_TIMEOUT: no answer within {}ms", timeout.as_millis())),
    };
    let elapsed_ms = started.elapsed().as_millis() as u64;

    match outcome {
        Ok(()) => {
            let _ = log.record(
                "info",
                "reachability",
                "online",
                Some(json!({ "target": target.as_str(), "elapsed_ms": elapsed_ms })),
            );
            ContentSource::Remote(target.clone())
        }
        Err(e) => {
            let _ = log.record(
                "info",
                "reachability",
                "offline",
                Some(json!({ "target": target.as_str(), "elapsed_ms": elapsed_ms, "error": e })),
            );
            ContentSource::Fallback
        }
    }
}
