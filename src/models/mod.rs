pub mod content_source;
pub mod shell_config;
pub mod window_state;

pub use content_source::{ContentSource, FALLBACK_DOCUMENT};
pub use shell_config::ShellConfig;
pub use window_state::{WindowBounds, WindowState};
