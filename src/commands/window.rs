use crate::{MainSession, MAIN_WINDOW_LABEL};
use tauri::{AppHandle, Manager};

/// Brings the main window forward through the session, so a page load that
/// lands afterwards does not show and focus it a second time.
pub(crate) fn reveal_main_window(app_handle: &AppHandle) -> Result<(), String> {
    let window = app_handle
        .get_webview_window(MAIN_WINDOW_LABEL)
        .ok_or_else(|| "Main window not found".to_string())?;

    match app_handle.try_state::<MainSession>() {
        Some(session) => session.reveal()?,
        None => window
            .show()
            .map_err(|e| format!("Failed to show window: {}", e))?,
    }

    if window.is_minimized().unwrap_or(false) {
        window
            .unminimize()
            .map_err(|e| format!("Failed to restore window: {}", e))?;
    }

    window
        .set_focus()
        .map_err(|e| format!("Failed to focus window: {}", e))?;

    Ok(())
}

#[tauri::command]
pub async fn show_main_window(app_handle: AppHandle) -> Result<(), String> {
    reveal_main_window(&app_handle)
}

#[tauri::command]
pub async fn quit_app(app_handle: AppHandle) -> Result<(), String> {
    // exit() skips CloseRequested, so capture the geometry here
    if let Some(session) = app_handle.try_state::<MainSession>() {
        session.persist_geometry();
    }
    app_handle.exit(0);
    Ok(())
}
