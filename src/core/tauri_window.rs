use super::app_log::AppLog;
use super::permissions;
use super::shell_session::{ShellEvent, ShellWindow};
use crate::models::{ContentSource, ShellConfig, WindowBounds, WindowState, FALLBACK_DOCUMENT};
use crate::{MainSession, MAIN_WINDOW_LABEL};
use tauri::webview::PageLoadEvent;
use tauri::{AppHandle, Manager, Url, WebviewUrl, WebviewWindow, WebviewWindowBuilder};

/// Blank page the window starts on while the reachability probe runs.
pub const BOOTSTRAP_DOCUMENT: &str = "index.html";

const MIN_WIDTH: f64 = 400.0;
const MIN_HEIGHT: f64 = 300.0;

/// The main webview window plus the app-origin URL it was created on.
pub struct TauriWindow {
    window: WebviewWindow,
    app_origin: Url,
}

/// Pages served from the bundled frontend: `tauri://localhost/...` on macOS and
/// Linux, `http(s)://tauri.localhost/...` on Windows.
pub fn is_app_origin(url: &Url) -> bool {
    url.scheme() == "tauri" || url.host_str() == Some("tauri.localhost")
}

pub fn is_bootstrap_url(url: &Url) -> bool {
    is_app_origin(url) && url.path().trim_start_matches('/') == BOOTSTRAP_DOCUMENT
}

pub fn create_main_window(
    app: &AppHandle,
    geometry: &WindowState,
    config: &ShellConfig,
    log: &AppLog,
) -> Result<TauriWindow, String> {
    let mut builder = WebviewWindowBuilder::new(
        app,
        MAIN_WINDOW_LABEL,
        WebviewUrl::App(BOOTSTRAP_DOCUMENT.into()),
    )
    .title(&config.window_title)
    .inner_size(geometry.width as f64, geometry.height as f64)
    .min_inner_size(MIN_WIDTH, MIN_HEIGHT)
    .visible(false)
    .user_agent(&config.user_agent)
    .on_page_load(|window, payload| {
        if !matches!(payload.event(), PageLoadEvent::Finished) {
            return;
        }
        let bootstrap = is_bootstrap_url(payload.url());
        if let Some(session) = window.try_state::<MainSession>() {
            session.handle_event(ShellEvent::PageLoaded { bootstrap });
        }
    });

    if let Some((x, y)) = geometry.position() {
        builder = builder.position(x as f64, y as f64);
    }

    let window = builder
        .build()
        .map_err(|e| format!("Failed to create main window: {}", e))?;

    if let Err(e) = permissions::install(&window, log.clone()) {
        let _ = log.warn(
            "permissions",
            "install_failed",
            serde_json::json!({ "error": e.to_string() }),
        );
    }

    let app_origin = window
        .url()
        .map_err(|e| format!("Failed to read main window url: {}", e))?;

    Ok(TauriWindow { window, app_origin })
}

impl TauriWindow {
    fn fallback_url(&self) -> Result<Url, String> {
        self.app_origin
            .join(FALLBACK_DOCUMENT)
            .map_err(|e| format!("Failed to resolve {}: {}", FALLBACK_DOCUMENT, e))
    }
}

impl ShellWindow for TauriWindow {
    fn maximize(&self) -> Result<(), String> {
        self.window
            .maximize()
            .map_err(|e| format!("Failed to maximize window: {}", e))
    }

    fn show(&self) -> Result<(), String> {
        self.window
            .show()
            .map_err(|e| format!("Failed to show window: {}", e))?;
        self.window
            .set_focus()
            .map_err(|e| format!("Failed to focus window: {}", e))
    }

    fn hide(&self) -> Result<(), String> {
        self.window
            .hide()
            .map_err(|e| format!("Failed to hide window: {}", e))
    }

    fn bounds(&self) -> Result<WindowBounds, String> {
        let scale = self
            .window
            .scale_factor()
            .map_err(|e| format!("Failed to read scale factor: {}", e))?;
        let size = self
            .window
            .inner_size()
            .map_err(|e| format!("Failed to read window size: {}", e))?
            .to_logical::<f64>(scale);
        let position = self
            .window
            .outer_position()
            .map_err(|e| format!("Failed to read window position: {}", e))?
            .to_logical::<f64>(scale);

        Ok(WindowBounds {
            x: position.x.round() as i32,
            y: position.y.round() as i32,
            width: size.width.round().max(0.0) as u32,
            height: size.height.round().max(0.0) as u32,
        })
    }

    fn is_maximized(&self) -> Result<bool, String> {
        self.window
            .is_maximized()
            .map_err(|e| format!("Failed to query maximized state: {}", e))
    }

    fn is_minimized(&self) -> Result<bool, String> {
        self.window
            .is_minimized()
            .map_err(|e| format!("Failed to query minimized state: {}", e))
    }

    fn load(&self, source: &ContentSource) -> Result<(), String> {
        let url = match source {
            ContentSource::Remote(url) => url.clone(),
            ContentSource::Fallback => self.fallback_url()?,
        };
        let mut window = self.window.clone();
        window
            .navigate(url)
            .map_err(|e| format!("Failed to navigate: {}", e))
    }
}
