//! Whiteboard configuration and persisted preferences.

use crate::history::DEFAULT_HISTORY_LIMIT;
use crate::scene::{DARK_BACKGROUND, LIGHT_BACKGROUND};
use crate::shapes::SerializableColor;
use crate::snap::GRID_SIZE;
use kurbo::Size;
use serde::{Deserialize, Serialize};

/// Fixed scale of the minimap relative to logical space.
pub const MINIMAP_SCALE: f64 = 0.1;

/// Light or dark canvas palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanvasTheme {
    #[default]
    Light,
    Dark,
}

impl CanvasTheme {
    pub fn from_dark(dark: bool) -> Self {
        if dark { Self::Dark } else { Self::Light }
    }

    pub fn is_dark(&self) -> bool {
        matches!(self, Self::Dark)
    }

    pub fn background(&self) -> SerializableColor {
        match self {
            Self::Light => LIGHT_BACKGROUND,
            Self::Dark => DARK_BACKGROUND,
        }
    }

    /// Minor and major grid line colors.
    pub fn grid_colors(&self) -> (SerializableColor, SerializableColor) {
        match self {
            Self::Light => (
                SerializableColor::new(0, 0, 0, 15),
                SerializableColor::new(0, 0, 0, 26),
            ),
            Self::Dark => (
                SerializableColor::new(255, 255, 255, 20),
                SerializableColor::new(255, 255, 255, 31),
            ),
        }
    }

    /// Minimap background.
    pub fn minimap_background(&self) -> SerializableColor {
        match self {
            Self::Light => SerializableColor::new(0xF5, 0xF5, 0xF5, 255),
            Self::Dark => SerializableColor::new(0x2A, 0x2A, 0x2A, 255),
        }
    }
}

/// Whiteboard settings the user can change and that survive restarts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhiteboardPreferences {
    pub grid_size: f64,
    pub show_grid: bool,
    pub snap_to_grid: bool,
    pub show_minimap: bool,
    pub dark_canvas: bool,
}

impl Default for WhiteboardPreferences {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE,
            show_grid: true,
            snap_to_grid: false,
            show_minimap: true,
            dark_canvas: false,
        }
    }
}

/// Everything a session needs at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhiteboardConfig {
    /// Base grid cell and snapping step, in logical pixels.
    pub grid_size: f64,
    pub show_grid: bool,
    pub snap_to_grid: bool,
    pub show_minimap: bool,
    pub minimap_scale: f64,
    pub history_limit: usize,
    /// Size of the canvas element in device pixels.
    pub viewport_size: Size,
    pub theme: CanvasTheme,
}

impl Default for WhiteboardConfig {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE,
            show_grid: true,
            snap_to_grid: false,
            show_minimap: true,
            minimap_scale: MINIMAP_SCALE,
            history_limit: DEFAULT_HISTORY_LIMIT,
            viewport_size: Size::new(800.0, 600.0),
            theme: CanvasTheme::Light,
        }
    }
}

impl WhiteboardConfig {
    /// Build a config from stored preferences; non-positive grid sizes fall
    /// back to the default.
    pub fn from_preferences(prefs: &WhiteboardPreferences) -> Self {
        let grid_size = if prefs.grid_size.is_finite() && prefs.grid_size > 0.0 {
            prefs.grid_size
        } else {
            GRID_SIZE
        };
        Self {
            grid_size,
            show_grid: prefs.show_grid,
            snap_to_grid: prefs.snap_to_grid,
            show_minimap: prefs.show_minimap,
            theme: CanvasTheme::from_dark(prefs.dark_canvas),
            ..Self::default()
        }
    }

    pub fn with_viewport_size(mut self, size: Size) -> Self {
        self.viewport_size = size;
        self
    }

    /// The user-facing part of this config.
    pub fn preferences(&self) -> WhiteboardPreferences {
        WhiteboardPreferences {
            grid_size: self.grid_size,
            show_grid: self.show_grid,
            snap_to_grid: self.snap_to_grid,
            show_minimap: self.show_minimap,
            dark_canvas: self.theme.is_dark(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WhiteboardConfig::default();
        assert!((config.grid_size - 40.0).abs() < f64::EPSILON);
        assert!(config.show_grid);
        assert!(!config.snap_to_grid);
        assert!(config.show_minimap);
        assert_eq!(config.history_limit, 50);
        assert_eq!(config.theme, CanvasTheme::Light);
    }

    #[test]
    fn test_preferences_round_trip() {
        let prefs = WhiteboardPreferences {
            grid_size: 20.0,
            snap_to_grid: true,
            dark_canvas: true,
            ..WhiteboardPreferences::default()
        };
        let config = WhiteboardConfig::from_preferences(&prefs);
        assert_eq!(config.theme, CanvasTheme::Dark);
        assert_eq!(config.preferences(), prefs);
    }

    #[test]
    fn test_invalid_grid_size_falls_back() {
        let prefs = WhiteboardPreferences {
            grid_size: 0.0,
            ..WhiteboardPreferences::default()
        };
        assert!((WhiteboardConfig::from_preferences(&prefs).grid_size - GRID_SIZE).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_preferences_json() {
        let prefs: WhiteboardPreferences = serde_json::from_str(r#"{"show_grid": false}"#).unwrap();
        assert!(!prefs.show_grid);
        assert!(prefs.show_minimap);
    }

    #[test]
    fn test_theme_colors() {
        assert_eq!(CanvasTheme::Dark.background().to_hex(), DARK_BACKGROUND.to_hex());
        assert_eq!(CanvasTheme::Light.minimap_background().r, 0xF5);
    }
}
