mod commands;
mod core;
mod models;
mod tray_menu;

use crate::core::reachability::{self, HttpProbe};
use crate::core::shell_config::SHELL_CONFIG_FILE_NAME;
use crate::core::tauri_window::{self, TauriWindow};
use crate::core::window_state_store::WINDOW_STATE_FILE_NAME;
use crate::core::{AppLog, EventEffect, ShellEvent, ShellSession, WindowStateStore};
use crate::models::ContentSource;
use tauri::{Manager, WindowEvent};

pub(crate) const MAIN_WINDOW_LABEL: &str = "main";

pub(crate) type MainSession = ShellSession<TauriWindow>;

fn setup_error(e: impl std::fmt::Display) -> Box<dyn std::error::Error> {
    Box::new(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .plugin(tauri_plugin_single_instance::init(|app, _argv, _cwd| {
            let _ = commands::window::reveal_main_window(app);
        }))
        .plugin(tauri_plugin_notification::init())
        .setup(|app| {
            let app_handle = app.handle().clone();
            let log = AppLog::from_app(&app_handle).map_err(setup_error)?;
            core::app_log::install_panic_hook(log.clone());
            let _ = log.info("app", "startup");

            let config_path = app_handle
                .path()
                .app_config_dir()
                .map_err(setup_error)?
                .join(SHELL_CONFIG_FILE_NAME);
            let config = core::shell_config::load(&config_path, &log);

            app_handle.plugin(core::shortcuts::plugin(log.clone()))?;

            let state_path = app_handle
                .path()
                .app_data_dir()
                .map_err(setup_error)?
                .join(WINDOW_STATE_FILE_NAME);
            let store = WindowStateStore::new(state_path, log.clone());

            let session = ShellSession::open(store, log.clone(), |geometry| {
                tauri_window::create_main_window(&app_handle, geometry, &config, &log)
            })
            .map_err(setup_error)?;
            app.manage(session);

            tray_menu::create_tray(&app_handle)?;

            let target = config.remote_target();
            let timeout = config.probe_timeout();
            let user_agent = config.user_agent.clone();
            tauri::async_runtime::spawn(async move {
                let source = match (target, HttpProbe::new(&user_agent)) {
                    (Ok(target), Ok(probe)) => {
                        reachability::choose_content(&probe, &target, timeout, &log).await
                    }
                    (Err(e), _) | (_, Err(e)) => {
                        let _ = log.error(
                            "reachability",
                            "probe_unavailable",
                            serde_json::json!({ "error": e }),
                        );
                        ContentSource::Fallback
                    }
                };

                if let Some(session) = app_handle.try_state::<MainSession>() {
                    session.apply_content(source);
                }
            });

            Ok(())
        })
        .on_window_event(|window, event| {
            if window.label() != MAIN_WINDOW_LABEL {
                return;
            }
            let Some(session) = window.try_state::<MainSession>() else {
                return;
            };

            let shell_event = match event {
                WindowEvent::Focused(focused) => {
                    let app = window.app_handle();
                    core::shortcuts::sync_with_focus(app, *focused, session.log());
                    return;
                }
                WindowEvent::Resized(_) => ShellEvent::Resized,
                WindowEvent::Moved(_) => ShellEvent::Moved,
                WindowEvent::CloseRequested { api, .. } => {
                    // The window lives on in the tray; only "Quit" exits.
                    api.prevent_close();
                    ShellEvent::CloseRequested
                }
                _ => return,
            };

            let effect = session.handle_event(shell_event);
            if shell_event == ShellEvent::CloseRequested {
                core::shortcuts::sync_with_focus(window.app_handle(), false, session.log());
            }
            if effect == EventEffect::NotifyHiddenToTray {
                core::tray_notice::notify_hidden_to_tray(window.app_handle(), session.log());
            }
        })
        .invoke_handler(tauri::generate_handler![
            commands::window::show_main_window,
            commands::window::quit_app,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
