use super::app_log::AppLog;
use serde_json::json;
use tauri::AppHandle;
use tauri_plugin_notification::NotificationExt;

const FALLBACK_TITLE: &str = "Webshell";
const HIDDEN_TO_TRAY_BODY: &str =
    "Still running in the tray. Use the tray icon to reopen the window or quit.";

fn title(app: &AppHandle) -> String {
    app.config()
        .product_name
        .clone()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_TITLE.to_string())
}

/// One-shot hint shown the first time the window is closed to the tray.
pub fn notify_hidden_to_tray(app: &AppHandle, log: &AppLog) {
    let result = app
        .notification()
        .builder()
        .title(title(app))
        .body(HIDDEN_TO_TRAY_BODY)
        .show();

    if let Err(e) = result {
        let _ = log.warn(
            "notifications",
            "show_failed",
            json!({ "error": e.to_string() }),
        );
    }
}
