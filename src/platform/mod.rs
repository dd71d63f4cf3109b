//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Device motion (tilt steering, permission flow)
//! - Key names coming from DOM keyboard events

pub mod motion;

pub use motion::{MotionConfig, MotionError, MotionManager, OrientationSample, Permission};

/// Normalize a DOM `KeyboardEvent.key` value (letters lower-cased)
pub fn normalize_key(key: &str) -> String {
    if key.chars().count() == 1 {
        key.to_lowercase()
    } else {
        key.to_string()
    }
}
