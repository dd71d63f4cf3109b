//! Player settings and calibration
//!
//! Persisted per profile. Read when input is mapped; the simulation never
//! writes them.

use serde::{Deserialize, Serialize};

use crate::consts::MAX_FUEL;
use crate::persistence::{KeyValueStore, ProfileStore, StorageError};
use crate::platform::motion::MotionConfig;

/// How the player steers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ControlScheme {
    #[default]
    Keyboard,
    /// Device tilt
    Tilt,
    /// On-screen joystick
    Touch,
}

impl ControlScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlScheme::Keyboard => "Keyboard",
            ControlScheme::Tilt => "Tilt",
            ControlScheme::Touch => "Touch",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "keyboard" | "keys" => Some(ControlScheme::Keyboard),
            "tilt" | "motion" => Some(ControlScheme::Tilt),
            "touch" | "joystick" => Some(ControlScheme::Touch),
            _ => None,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub control_scheme: ControlScheme,

    // === Tilt ===
    /// Tilt gain (1.0 = default)
    pub sensitivity: f32,
    /// Normalized tilt below this reads as zero
    pub deadzone: f32,
    /// Flip tilt direction
    pub invert_tilt: bool,
    /// Gamma angle treated as level (degrees)
    pub calibration_offset: f32,
    /// Tilt angle mapped to full deflection (degrees)
    pub max_tilt_deg: f32,

    // === Gameplay ===
    /// Fuel charged when the jetpack ignites
    pub jetpack_cost: f32,

    // === HUD ===
    pub show_fps: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            control_scheme: ControlScheme::Keyboard,

            sensitivity: 1.0,
            deadzone: 0.1,
            invert_tilt: false,
            calibration_offset: 0.0,
            max_tilt_deg: 30.0,

            jetpack_cost: 10.0,

            show_fps: false,
        }
    }
}

fn sane(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "settings";

    /// Clamp every numeric field into its usable range
    pub fn sanitized(mut self) -> Self {
        let d = Self::default();
        self.sensitivity = sane(self.sensitivity, 0.1, 5.0, d.sensitivity);
        self.deadzone = sane(self.deadzone, 0.0, 0.9, d.deadzone);
        self.calibration_offset = sane(self.calibration_offset, -90.0, 90.0, 0.0);
        self.max_tilt_deg = sane(self.max_tilt_deg, 5.0, 90.0, d.max_tilt_deg);
        self.jetpack_cost = sane(self.jetpack_cost, 0.0, MAX_FUEL, d.jetpack_cost);
        self
    }

    /// Tilt pipeline parameters
    pub fn motion_config(&self) -> MotionConfig {
        MotionConfig {
            sensitivity: self.sensitivity,
            deadzone: self.deadzone,
            invert: self.invert_tilt,
            calibration_offset: self.calibration_offset,
            max_tilt_deg: self.max_tilt_deg,
        }
    }

    /// Load settings; absent or corrupt entries fall back to defaults
    pub fn load<S: KeyValueStore>(store: &ProfileStore<S>) -> Self {
        match store.load::<Settings>(Self::STORAGE_KEY) {
            Some(settings) => {
                log::info!("Loaded settings for {}", store.profile());
                settings.sanitized()
            }
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    pub fn save<S: KeyValueStore>(&self, store: &ProfileStore<S>) -> Result<(), StorageError> {
        store.save(Self::STORAGE_KEY, self)?;
        log::info!("Settings saved");
        Ok(())
    }
}
