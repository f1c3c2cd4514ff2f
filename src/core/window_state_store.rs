use super::app_log::AppLog;
use crate::models::WindowState;
use anyhow::{anyhow, Context, Result};
use serde_json::{json, Value};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const WINDOW_STATE_FILE_NAME: &str = "window-state.json";

const LOG_SCOPE: &str = "window_state";

/// Single persisted geometry record for the main window.
///
/// Reads merge the stored object over the defaults; writes replace the whole
/// file. Neither direction surfaces an error to the caller.
#[derive(Debug, Clone)]
pub struct WindowStateStore {
    path: PathBuf,
    log: AppLog,
}

impl WindowStateStore {
    pub fn new(path: impl Into<PathBuf>, log: AppLog) -> Self {
        Self {
            path: path.into(),
            log,
        }
    }

    pub fn load(&self) -> WindowState {
        match self.try_load() {
            Ok(Some(state)) => state,
            Ok(None) => WindowState::default(),
            Err(e) => {
                let _ = self.log.warn(
                    LOG_SCOPE,
                    "load_failed",
                    json!({ "path": self.path.display().to_string(), "error": format!("{:#}", e) }),
                );
                WindowState::default()
            }
        }
    }

    /// `Ok(None)` when nothing has been persisted yet.
    pub fn try_load(&self) -> Result<Option<WindowState>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let value: Value = serde_json::from_slice(&bytes).context("Invalid JSON")?;
        if !value.is_object() {
            return Err(anyhow!("Expected a JSON object, found {}", kind_of(&value)));
        }
        let state: WindowState =
            serde_json::from_value(value).context("Invalid window state record")?;

        Ok(Some(state.normalized()))
    }

    pub fn save(&self, state: &WindowState) {
        if let Err(e) = self.try_save(state) {
            let _ = self.log.error(
                LOG_SCOPE,
                "save_failed",
                json!({ "path": self.path.display().to_string(), "error": format!("{:#}", e) }),
            );
        }
    }

    pub fn try_save(&self, state: &WindowState) -> Result<()> {
        write_state_atomically(&self.path, state)
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Per-process scratch name, so two writers never share a temp file.
fn temp_path(path: &Path) -> PathBuf {
    path.with_extension(format!("json.{}.tmp", std::process::id()))
}

fn write_state_atomically(path: &Path, state: &WindowState) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let tmp = temp_path(path);
    let mut file = fs::File::create(&tmp)
        .with_context(|| format!("Failed to create {}", tmp.display()))?;
    serde_json::to_writer(&mut file, state).context("Failed to serialize window state")?;
    file.write_all(b"\n")?;
    file.sync_all()?;
    drop(file);

    fs::rename(&tmp, path)
        .with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}
