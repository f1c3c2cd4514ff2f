use super::app_log::AppLog;
use tauri::WebviewWindow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionKind {
    Notifications,
    Geolocation,
    Media,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionDecision {
    Allow,
    Deny,
}

pub fn permission_decision(kind: PermissionKind) -> PermissionDecision {
    match kind {
        PermissionKind::Notifications => PermissionDecision::Allow,
        _ => PermissionDecision::Deny,
    }
}

/// Routes WebKitGTK permission prompts through [`permission_decision`].
#[cfg(target_os = "linux")]
pub fn install(window: &WebviewWindow, log: AppLog) -> tauri::Result<()> {
    use glib::prelude::Cast;
    use webkit2gtk::{
        GeolocationPermissionRequest, NotificationPermissionRequest, PermissionRequestExt,
        UserMediaPermissionRequest, WebViewExt,
    };

    window.with_webview(move |webview| {
        webview.inner().connect_permission_request(move |_, request| {
            let kind = if request.downcast_ref::<NotificationPermissionRequest>().is_some() {
                PermissionKind::Notifications
            } else if request.downcast_ref::<GeolocationPermissionRequest>().is_some() {
                PermissionKind::Geolocation
            } else if request.downcast_ref::<UserMediaPermissionRequest>().is_some() {
                PermissionKind::Media
            } else {
                PermissionKind::Other
            };

            let decision = permission_decision(kind);
            match decision {
                PermissionDecision::Allow => request.allow(),
                PermissionDecision::Deny => request.deny(),
            }
            log_decision(&log, kind, decision);
            true
        });
    })
}

/// Routes WebView2 `PermissionRequested` through [`permission_decision`].
#[cfg(target_os = "windows")]
pub fn install(window: &WebviewWindow, log: AppLog) -> tauri::Result<()> {
    use webview2_com::Microsoft::Web::WebView2::Win32::{
        COREWEBVIEW2_PERMISSION_KIND, COREWEBVIEW2_PERMISSION_KIND_CAMERA,
        COREWEBVIEW2_PERMISSION_KIND_GEOLOCATION, COREWEBVIEW2_PERMISSION_KIND_MICROPHONE,
        COREWEBVIEW2_PERMISSION_KIND_NOTIFICATIONS, COREWEBVIEW2_PERMISSION_STATE_ALLOW,
        COREWEBVIEW2_PERMISSION_STATE_DENY,
    };
    use webview2_com::PermissionRequestedEventHandler;

    window.with_webview(move |webview| {
        let handler_log = log.clone();
        let handler = PermissionRequestedEventHandler::create(Box::new(move |_, args| {
            let Some(args) = args else {
                return Ok(());
            };

            let mut raw = COREWEBVIEW2_PERMISSION_KIND::default();
            unsafe { args.PermissionKind(&mut raw)? };
            let kind = if raw == COREWEBVIEW2_PERMISSION_KIND_NOTIFICATIONS {
                PermissionKind::Notifications
            } else if raw == COREWEBVIEW2_PERMISSION_KIND_GEOLOCATION {
                PermissionKind::Geolocation
            } else if raw == COREWEBVIEW2_PERMISSION_KIND_CAMERA
                || raw == COREWEBVIEW2_PERMISSION_KIND_MICROPHONE
            {
                PermissionKind::Media
            } else {
                PermissionKind::Other
            };

            let decision = permission_decision(kind);
            let state = match decision {
                PermissionDecision::Allow => COREWEBVIEW2_PERMISSION_STATE_ALLOW,
                PermissionDecision::Deny => COREWEBVIEW2_PERMISSION_STATE_DENY,
            };
            unsafe { args.SetState(state)? };
            log_decision(&handler_log, kind, decision);
            Ok(())
        }));

        let mut token = 0;
        let result = unsafe {
            webview
                .controller()
                .CoreWebView2()
                .and_then(|core| core.add_PermissionRequested(&handler, &mut token))
        };
        if let Err(e) = result {
            let _ = log.warn(
                "permissions",
                "install_failed",
                serde_json::json!({ "error": e.to_string() }),
            );
        }
    })
}

/// WKWebView exposes no permission hook through tauri; its own prompts stay.
#[cfg(not(any(target_os = "linux", target_os = "windows")))]
pub fn install(_window: &WebviewWindow, _log: AppLog) -> tauri::Result<()> {
    Ok(())
}

#[cfg(any(target_os = "linux", target_os = "windows"))]
fn log_decision(log: &AppLog, kind: PermissionKind, decision: PermissionDecision) {
    let _ = log.record(
        "info",
        "permissions",
        "request",
        Some(serde_json::json!({
            "kind": format!("{:?}", kind),
            "decision": format!("{:?}", decision),
        })),
    );
}
