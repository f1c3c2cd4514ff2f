use chrono::Utc;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};
use tauri::{AppHandle, Manager};

const LOG_FILE_NAME: &str = "app.log.jsonl";
const MAX_LOG_BYTES: u64 = 5 * 1024 * 1024;
const MAX_ROTATIONS: usize = 3;

static LOG_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppLogRecord {
    pub ts_ms: i64,
    pub level: String,
    pub scope: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// JSON-lines log rooted at a directory. Cheap to clone into handlers.
#[derive(Debug, Clone)]
pub struct AppLog {
    dir: PathBuf,
}

fn log_path(dir: &Path) -> PathBuf {
    dir.join(LOG_FILE_NAME)
}

fn rotated_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("app.log.{}.jsonl", index))
}

fn rotate_if_needed(dir: &Path, max_bytes: u64) -> Result<(), String> {
    let path = log_path(dir);
    let Ok(meta) = fs::metadata(&path) else {
        return Ok(());
    };
    if meta.len() < max_bytes {
        return Ok(());
    }

    let oldest = rotated_path(dir, MAX_ROTATIONS);
    if oldest.exists() {
        fs::remove_file(&oldest)
            .map_err(|e| format!("Failed to remove old log {}: {}", oldest.display(), e))?;
    }

    for i in (1..MAX_ROTATIONS).rev() {
        let src = rotated_path(dir, i);
        let dst = rotated_path(dir, i + 1);
        if src.exists() {
            fs::rename(&src, &dst).map_err(|e| {
                format!("Failed to rotate log ({} -> {}): {}", src.display(), dst.display(), e)
            })?;
        }
    }

    let first = rotated_path(dir, 1);
    fs::rename(&path, &first).map_err(|e| {
        format!("Failed to rotate log ({} -> {}): {}", path.display(), first.display(), e)
    })?;
    Ok(())
}

impl AppLog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn from_app(app: &AppHandle) -> Result<Self, String> {
        let dir = app
            .path()
            .app_log_dir()
            .map_err(|e| format!("Failed to resolve log dir: {}", e))?;
        Ok(Self::new(dir))
    }

    pub fn append(&self, record: AppLogRecord) -> Result<(), String> {
        self.append_with_limit(record, MAX_LOG_BYTES)
    }

    fn append_with_limit(&self, record: AppLogRecord, max_bytes: u64) -> Result<(), String> {
        let _guard = LOG_LOCK.lock();
        fs::create_dir_all(&self.dir).map_err(|e| format!("Failed to create log dir: {}", e))?;
        rotate_if_needed(&self.dir, max_bytes)?;
        let path = log_path(&self.dir);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| format!("Failed to open log file: {}", e))?;

        let line = serde_json::to_string(&record)
            .map_err(|e| format!("Failed to serialize log record: {}", e))?;
        file.write_all(line.as_bytes())
            .and_then(|_| file.write_all(b"\n"))
            .map_err(|e| format!("Failed to write log record: {}", e))?;
        Ok(())
    }

    pub fn record(
        &self,
        level: &str,
        scope: &str,
        message: &str,
        data: Option<Value>,
    ) -> Result<(), String> {
        self.append(AppLogRecord {
            ts_ms: Utc::now().timestamp_millis(),
            level: level.to_string(),
            scope: scope.to_string(),
            message: message.to_string(),
            data,
        })
    }

    pub fn info(&self, scope: &str, message: &str) -> Result<(), String> {
        self.record("info", scope, message, None)
    }

    pub fn warn(&self, scope: &str, message: &str, data: Value) -> Result<(), String> {
        self.record("warn", scope, message, Some(data))
    }

    pub fn error(&self, scope: &str, message: &str, data: Value) -> Result<(), String> {
        self.record("error", scope, message, Some(data))
    }
}

pub fn install_panic_hook(log: AppLog) {
    let prev = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let payload = if let Some(s) = info.payload().downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "panic".to_string()
        };
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_else(|| "unknown".to_string());

        let _ = log.record(
            "error",
            "panic",
            &format!("{} ({})", payload, location),
            None,
        );

        prev(info);
    }));
}
