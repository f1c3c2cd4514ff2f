use tauri::Url;

/// Bundled page shown when the remote target is unreachable at startup.
pub const FALLBACK_DOCUMENT: &str = "offline.html";

/// What the main window ends up displaying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    Remote(Url),
    Fallback,
}

impl ContentSource {
    pub fn label(&self) -> &'static str {
        match self {
            ContentSource::Remote(_) => "remote",
            ContentSource::Fallback => "fallback",
        }
    }
}
