//! Match settings and preferences
//!
//! Stored as pretty JSON next to the executable. Missing fields take their
//! defaults so older files keep loading.

use std::fmt;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Why settings could not be written
#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "settings I/O error: {e}"),
            SettingsError::Json(e) => write!(f, "settings JSON error: {e}"),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Io(e) => Some(e),
            SettingsError::Json(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for SettingsError {
    fn from(e: std::io::Error) -> Self {
        SettingsError::Io(e)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        SettingsError::Json(e)
    }
}

/// Match settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Turns ===
    /// Seconds on the clock each turn
    pub turn_seconds: u32,
    /// Pause between a detonation and the next turn (seconds)
    pub transition_delay: f32,
    /// Largest horizontal wind magnitude rolled at match start
    pub max_wind: f32,
    /// Jumps available before touching ground again
    pub max_jumps: u32,

    // === Camera ===
    /// Divisor of the per-tick camera ease (1 = snap)
    pub camera_smoothing: f32,
    /// Logical display size in world pixels
    pub viewport: Vec2,
    /// Window pixels per world pixel
    pub render_scale: f32,
    /// Screen shake on explosions
    pub screen_shake: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            turn_seconds: 120,
            transition_delay: 2.0,
            max_wind: 8.0,
            max_jumps: 1,

            camera_smoothing: 10.0,
            viewport: Vec2::new(320.0, 240.0),
            render_scale: 2.0,
            screen_shake: true,

            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from `path`, falling back to defaults
    pub fn load(path: &Path) -> Self {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                log::info!("Using default settings ({}: {e})", path.display());
                return Self::default();
            }
        };

        match Self::from_json(&json) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Ignoring unreadable settings {}: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        std::fs::write(path, self.to_json()?)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_take_defaults() {
        let settings = Settings::from_json(r#"{ "turn_seconds": 30, "muted": true }"#).unwrap();
        assert_eq!(settings.turn_seconds, 30);
        assert!(settings.muted);
        assert_eq!(settings.transition_delay, 2.0);
        assert_eq!(settings.camera_smoothing, 10.0);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(matches!(Settings::from_json("{ nope"), Err(SettingsError::Json(_))));
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("worms-duel-settings-{}.json", std::process::id()));
        let settings = Settings {
            max_wind: 0.0,
            viewport: Vec2::new(640.0, 360.0),
            ..Settings::default()
        };
        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path), settings);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let path = std::env::temp_dir().join("worms-duel-does-not-exist.json");
        assert_eq!(Settings::load(&path), Settings::default());
    }
}
