use super::app_log::AppLog;
use crate::{MainSession, MAIN_WINDOW_LABEL};
use serde_json::json;
use tauri::{plugin::TauriPlugin, AppHandle, Manager, WebviewWindow, Wry};
use tauri_plugin_global_shortcut::{
    GlobalShortcut, GlobalShortcutExt, Shortcut, ShortcutEvent, ShortcutState,
};

const LOG_SCOPE: &str = "shortcuts";

pub const DEFAULT_ZOOM: f64 = 1.0;
const ZOOM_STEP: f64 = 0.1;
const MIN_ZOOM: f64 = 0.3;
const MAX_ZOOM: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomChange {
    In,
    Out,
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    Reload,
    HardReload,
    ToggleFullscreen,
    Zoom(ZoomChange),
    ToggleDevtools,
}

pub const SHORTCUTS: [(&str, ShortcutAction); 7] = [
    ("CommandOrControl+R", ShortcutAction::Reload),
    ("CommandOrControl+Shift+R", ShortcutAction::HardReload),
    ("F11", ShortcutAction::ToggleFullscreen),
    ("CommandOrControl+Equal", ShortcutAction::Zoom(ZoomChange::In)),
    ("CommandOrControl+Minus", ShortcutAction::Zoom(ZoomChange::Out)),
    ("CommandOrControl+Digit0", ShortcutAction::Zoom(ZoomChange::Reset)),
    ("CommandOrControl+Shift+KeyI", ShortcutAction::ToggleDevtools),
];

pub fn next_zoom(current: f64, change: ZoomChange) -> f64 {
    let next = match change {
        ZoomChange::In => current + ZOOM_STEP,
        ZoomChange::Out => current - ZOOM_STEP,
        ZoomChange::Reset => DEFAULT_ZOOM,
    };
    // keep the factor on the 0.1 grid
    ((next * 10.0).round() / 10.0).clamp(MIN_ZOOM, MAX_ZOOM)
}

pub fn action_for(shortcut: &Shortcut) -> Option<ShortcutAction> {
    SHORTCUTS.iter().find_map(|(accelerator, action)| {
        accelerator
            .parse::<Shortcut>()
            .ok()
            .filter(|candidate| candidate.id() == shortcut.id())
            .map(|_| *action)
    })
}

/// The plugin starts with nothing registered; [`sync_with_focus`] grabs the
/// table while the main window is focused.
pub fn plugin(log: AppLog) -> TauriPlugin<Wry> {
    tauri_plugin_global_shortcut::Builder::new()
        .with_handler(move |app, shortcut, event| handle(app, shortcut, event, &log))
        .build()
}

/// OS-level hotkey registration for one accelerator.
pub trait ShortcutRegistry {
    fn enable(&self, accelerator: &str) -> Result<(), String>;
    fn disable(&self, accelerator: &str) -> Result<(), String>;
}

impl ShortcutRegistry for GlobalShortcut<Wry> {
    fn enable(&self, accelerator: &str) -> Result<(), String> {
        if self.is_registered(accelerator) {
            return Ok(());
        }
        GlobalShortcut::register(self, accelerator).map_err(|e| e.to_string())
    }

    fn disable(&self, accelerator: &str) -> Result<(), String> {
        if !self.is_registered(accelerator) {
            return Ok(());
        }
        GlobalShortcut::unregister(self, accelerator).map_err(|e| e.to_string())
    }
}

/// Registers or releases every accelerator in [`SHORTCUTS`]. A combo another
/// program already holds is logged and skipped; the rest still apply.
/// Returns how many accelerators failed.
pub fn set_active<R>(registry: &R, active: bool, log: &AppLog) -> usize
where
    R: ShortcutRegistry + ?Sized,
{
    let mut failed = 0;
    for (accelerator, _) in SHORTCUTS {
        let result = if active {
            registry.enable(accelerator)
        } else {
            registry.disable(accelerator)
        };
        if let Err(e) = result {
            failed += 1;
            let _ = log.warn(
                LOG_SCOPE,
                if active { "register_failed" } else { "unregister_failed" },
                json!({ "accelerator": accelerator, "error": e }),
            );
        }
    }
    failed
}

/// Holds the hotkeys only while the main window has focus, leaving the combos
/// to other applications the rest of the time.
pub fn sync_with_focus(app: &AppHandle, focused: bool, log: &AppLog) {
    set_active(app.global_shortcut(), focused, log);
}

fn handle(app: &AppHandle, shortcut: &Shortcut, event: ShortcutEvent, log: &AppLog) {
    if event.state != ShortcutState::Pressed {
        return;
    }
    let Some(action) = action_for(shortcut) else {
        return;
    };
    let Some(window) = app.get_webview_window(MAIN_WINDOW_LABEL) else {
        return;
    };
    // Registered globally, but only meaningful while our window has focus.
    if !window.is_focused().unwrap_or(false) {
        return;
    }

    if let Err(e) = run_action(app, &window, action) {
        let _ = log.warn(
            LOG_SCOPE,
            "action_failed",
            json!({ "action": format!("{:?}", action), "error": e.to_string() }),
        );
    }
}

fn run_action(app: &AppHandle, window: &WebviewWindow, action: ShortcutAction) -> tauri::Result<()> {
    match action {
        ShortcutAction::Reload => window.eval("window.location.reload()"),
        ShortcutAction::HardReload => hard_reload(window),
        ShortcutAction::ToggleFullscreen => {
            let fullscreen = window.is_fullscreen()?;
            window.set_fullscreen(!fullscreen)
        }
        ShortcutAction::Zoom(change) => {
            let Some(session) = app.try_state::<MainSession>() else {
                return Ok(());
            };
            window.set_zoom(session.step_zoom(change))
        }
        ShortcutAction::ToggleDevtools => {
            if window.is_devtools_open() {
                window.close_devtools();
            } else {
                window.open_devtools();
            }
            Ok(())
        }
    }
}

/// Reloads bypassing the HTTP cache where the webview exposes it.
#[cfg(target_os = "linux")]
fn hard_reload(window: &WebviewWindow) -> tauri::Result<()> {
    use webkit2gtk::WebViewExt;

    window.with_webview(|webview| webview.inner().reload_bypass_cache())
}

/// Other webviews get a plain re-navigation to the current URL.
#[cfg(not(target_os = "linux"))]
fn hard_reload(window: &WebviewWindow) -> tauri::Result<()> {
    let url = window.url()?;
    let mut target = window.clone();
    target.navigate(url)
}
