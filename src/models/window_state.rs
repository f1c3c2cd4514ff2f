use serde::{Deserialize, Serialize};

pub const DEFAULT_WIDTH: u32 = 992;
pub const DEFAULT_HEIGHT: u32 = 600;

/// Persisted geometry of the main window.
///
/// Missing fields fall back to [`WindowState::default`] when read, which lets a
/// partial record on disk merge over the defaults. Writes always carry every field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WindowState {
    pub width: u32,
    pub height: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<i32>,
    pub is_maximized: bool,
}

impl Default for WindowState {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            x: None,
            y: None,
            is_maximized: false,
        }
    }
}

/// Live bounds of a window in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowBounds {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl WindowState {
    pub fn position(&self) -> Option<(i32, i32)> {
        self.x.zip(self.y)
    }

    /// Builds a full record from captured bounds; `None` for a degenerate size.
    pub fn from_bounds(bounds: WindowBounds, is_maximized: bool) -> Option<Self> {
        if bounds.width == 0 || bounds.height == 0 {
            return None;
        }
        Some(Self {
            width: bounds.width,
            height: bounds.height,
            x: Some(bounds.x),
            y: Some(bounds.y),
            is_maximized,
        })
    }

    /// Repairs a record read from disk: zero sizes take the default and an
    /// unpaired coordinate is dropped.
    pub fn normalized(mut self) -> Self {
        if self.width == 0 {
            self.width = DEFAULT_WIDTH;
        }
        if self.height == 0 {
            self.height = DEFAULT_HEIGHT;
        }
        if self.position().is_none() {
            self.x = None;
            self.y = None;
        }
        self
    }
}
