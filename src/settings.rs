//! Input settings and preferences
//!
//! Persisted separately from the high score. Board size and the speed curve are
//! fixed rules in [`crate::consts`] and are not configurable here.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{POINTER_TURN_THRESHOLD, SWIPE_THRESHOLD};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Minimum swipe displacement to turn (px)
    pub swipe_threshold: f32,
    /// Minimum pointer travel to turn (px)
    pub pointer_threshold: f32,
    /// Accept WASD in addition to arrow keys
    pub wasd_keys: bool,
    /// Steer by moving the pointer over the board
    pub pointer_steering: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            swipe_threshold: SWIPE_THRESHOLD,
            pointer_threshold: POINTER_TURN_THRESHOLD,
            wasd_keys: true,
            pointer_steering: true,
        }
    }
}

impl Settings {
    /// Storage key (LocalStorage on web, file stem on native)
    pub const STORAGE_KEY: &'static str = "snake-settings";

    /// Parse settings JSON, falling back to defaults on bad input
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<Settings>(json) {
            Ok(settings) => settings.sanitized(),
            Err(err) => {
                log::warn!("Invalid settings ({}), using defaults", err);
                Self::default()
            }
        }
    }

    /// Thresholds must be positive; anything else falls back to the default
    pub fn sanitized(mut self) -> Self {
        if !(self.swipe_threshold.is_finite() && self.swipe_threshold > 0.0) {
            self.swipe_threshold = SWIPE_THRESHOLD;
        }
        if !(self.pointer_threshold.is_finite() && self.pointer_threshold > 0.0) {
            self.pointer_threshold = POINTER_TURN_THRESHOLD;
        }
        self
    }

    /// Load settings from a JSON file (native)
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => {
                log::info!("Loaded settings from {}", path.display());
                Self::from_json(&json)
            }
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                log::info!("Loaded settings from LocalStorage");
                return Self::from_json(&json);
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }
}
