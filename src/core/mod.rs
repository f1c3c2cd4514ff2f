pub mod app_log;
pub mod permissions;
pub mod reachability;
pub mod shell_config;
pub mod shell_session;
pub mod shortcuts;
pub mod tauri_window;
pub mod tray_notice;
pub mod window_state_store;

pub use app_log::AppLog;
pub use shell_session::{EventEffect, ShellEvent, ShellSession};
pub use window_state_store::WindowStateStore;
