//! Device tilt input
//!
//! Turns raw `deviceorientation` samples into a smoothed steering value in
//! [-1, 1]. The manager is a plain value owned by the game; the browser glue
//! feeds it samples and permission results.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw gain applied on top of the user's sensitivity
pub const TILT_MULTIPLIER: f32 = 1.5;

/// Exponential smoothing factor (weight of the newest sample)
pub const SMOOTHING: f32 = 0.4;

/// Smoothed tilt past this reads as a left/right press
pub const INTENT_THRESHOLD: f32 = 0.2;

/// Motion input errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MotionError {
    #[error("Motion permission denied")]
    PermissionDenied,

    #[error("Motion sensors not supported: {0}")]
    Unsupported(String),

    #[error("Motion manager not initialized")]
    NotInitialized,
}

/// Sensor permission state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Permission {
    /// Not asked yet
    #[default]
    Prompt,
    Granted,
    Denied,
    /// Platform has no permission API
    NotRequired,
}

impl Permission {
    /// Whether listening may start
    pub fn allows_listening(self) -> bool {
        !matches!(self, Permission::Denied)
    }
}

/// What the host reports about sensors at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorSupport {
    /// No orientation events at all
    Unavailable,
    /// Events available without asking
    Available,
    /// Events available after an explicit permission request (iOS)
    NeedsPermission,
}

/// One `deviceorientation` reading. Angles may be missing.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OrientationSample {
    pub alpha: Option<f64>,
    pub beta: Option<f64>,
    pub gamma: Option<f64>,
    pub absolute: bool,
}

impl OrientationSample {
    pub fn from_gamma(gamma: f64) -> Self {
        Self {
            gamma: Some(gamma),
            ..Default::default()
        }
    }
}

/// Tilt pipeline parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionConfig {
    pub sensitivity: f32,
    pub deadzone: f32,
    pub invert: bool,
    /// Gamma (degrees) treated as level
    pub calibration_offset: f32,
    /// Gamma deflection (degrees) that maps to full steering
    pub max_tilt_deg: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            sensitivity: 1.0,
            deadzone: 0.1,
            invert: false,
            calibration_offset: 0.0,
            max_tilt_deg: 30.0,
        }
    }
}

/// Discrete reading of the smoothed tilt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TiltIntent {
    Left,
    Neutral,
    Right,
}

/// Handle returned by `subscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u32);

/// Tilt normalization with an explicit lifecycle
#[derive(Debug)]
pub struct MotionManager {
    config: MotionConfig,
    support: Option<SensorSupport>,
    permission: Permission,
    listeners: Vec<ListenerId>,
    next_listener: u32,
    smoothed: f32,
    last_gamma: Option<f64>,
}

impl MotionManager {
    pub fn new(config: MotionConfig) -> Self {
        Self {
            config,
            support: None,
            permission: Permission::Prompt,
            listeners: Vec::new(),
            next_listener: 0,
            smoothed: 0.0,
            last_gamma: None,
        }
    }

    /// Record sensor support. Platforms without a permission API are granted.
    pub fn init(&mut self, support: SensorSupport) {
        self.support = Some(support);
        self.permission = match support {
            SensorSupport::Available => Permission::NotRequired,
            SensorSupport::NeedsPermission => Permission::Prompt,
            SensorSupport::Unavailable => Permission::Denied,
        };
        log::info!("Motion init: {support:?} -> {:?}", self.permission);
    }

    /// Drop every listener and forget sensor state
    pub fn dispose(&mut self) {
        self.listeners.clear();
        self.support = None;
        self.reset_smoothing();
        log::debug!("Motion disposed");
    }

    pub fn permission(&self) -> Permission {
        self.permission
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: MotionConfig) {
        self.config = config;
    }

    /// Outcome of the host's permission request. `Err(reason)` means the
    /// request threw or the API is missing.
    pub fn apply_permission_result(
        &mut self,
        result: Result<bool, String>,
    ) -> Result<(), MotionError> {
        match result {
            Ok(true) => {
                self.permission = Permission::Granted;
                log::info!("Motion permission granted");
                Ok(())
            }
            Ok(false) => {
                self.deny();
                log::warn!("Motion permission denied");
                Err(MotionError::PermissionDenied)
            }
            Err(reason) => {
                self.deny();
                log::warn!("Motion permission request failed: {reason}");
                Err(MotionError::Unsupported(reason))
            }
        }
    }

    fn deny(&mut self) {
        self.permission = Permission::Denied;
        self.listeners.clear();
        self.reset_smoothing();
    }

    /// Whether samples are currently being consumed
    pub fn is_listening(&self) -> bool {
        !self.listeners.is_empty()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Start consuming samples on behalf of a new listener
    pub fn subscribe(&mut self) -> Result<ListenerId, MotionError> {
        match self.support {
            None => return Err(MotionError::NotInitialized),
            Some(SensorSupport::Unavailable) => {
                return Err(MotionError::Unsupported("no orientation sensor".to_string()));
            }
            Some(_) => {}
        }
        if !self.permission.allows_listening() {
            return Err(MotionError::PermissionDenied);
        }
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        if self.listeners.is_empty() {
            log::debug!("Motion listening started");
        }
        self.listeners.push(id);
        Ok(id)
    }

    /// Remove a listener. Unknown ids and empty sets are fine.
    pub fn unsubscribe(&mut self, id: ListenerId) {
        let before = self.listeners.len();
        self.listeners.retain(|l| *l != id);
        if before > 0 && self.listeners.is_empty() {
            self.reset_smoothing();
            log::debug!("Motion listening stopped");
        }
    }

    fn reset_smoothing(&mut self) {
        self.smoothed = 0.0;
        self.last_gamma = None;
    }

    /// Normalize one gamma reading without smoothing
    pub fn normalize(&self, gamma: Option<f64>) -> f32 {
        let Some(gamma) = gamma.filter(|g| g.is_finite()) else {
            return 0.0;
        };
        let c = &self.config;
        let max = c.max_tilt_deg.max(1.0);
        let raw = (gamma as f32 - c.calibration_offset) * c.sensitivity * TILT_MULTIPLIER;
        let mut v = raw.clamp(-max, max) / max;
        if !v.is_finite() || v.abs() < c.deadzone {
            v = 0.0;
        }
        if c.invert { -v } else { v }
    }

    /// Feed a raw sample; returns the new smoothed value
    pub fn handle_sample(&mut self, sample: OrientationSample) -> f32 {
        if !self.is_listening() {
            return self.smoothed;
        }
        if let Some(g) = sample.gamma.filter(|g| g.is_finite()) {
            self.last_gamma = Some(g);
        }
        let target = self.normalize(sample.gamma);
        let next = self.smoothed + (target - self.smoothed) * SMOOTHING;
        self.smoothed = if next.is_finite() { next } else { 0.0 };
        self.smoothed
    }

    /// Current smoothed tilt in [-1, 1]
    pub fn tilt(&self) -> f32 {
        self.smoothed
    }

    pub fn intent(&self) -> TiltIntent {
        if self.smoothed < -INTENT_THRESHOLD {
            TiltIntent::Left
        } else if self.smoothed > INTENT_THRESHOLD {
            TiltIntent::Right
        } else {
            TiltIntent::Neutral
        }
    }

    /// Treat the latest reading as level. Returns the stored offset.
    pub fn calibrate(&mut self) -> Option<f32> {
        let gamma = self.last_gamma? as f32;
        self.config.calibration_offset = gamma;
        self.smoothed = 0.0;
        log::info!("Tilt calibrated at {gamma:.1} deg");
        Some(gamma)
    }
}

impl Default for MotionManager {
    fn default() -> Self {
        Self::new(MotionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listening() -> MotionManager {
        let mut m = MotionManager::default();
        m.init(SensorSupport::Available);
        m.subscribe().unwrap();
        m
    }

    #[test]
    fn test_smoothing_converges() {
        let mut m = listening();
        let first = m.handle_sample(OrientationSample::from_gamma(20.0));
        // 20 * 1.5 = 30 deg = full tilt, smoothed by 0.4
        assert!((first - 0.4).abs() < 1e-6);
        for _ in 0..30 {
            m.handle_sample(OrientationSample::from_gamma(20.0));
        }
        assert!((m.tilt() - 1.0).abs() < 1e-3);
        assert_eq!(m.intent(), TiltIntent::Right);
    }

    #[test]
    fn test_deadzone_and_clamp() {
        let m = listening();
        // 1 deg * 1.5 / 30 = 0.05 < deadzone 0.1
        assert_eq!(m.normalize(Some(1.0)), 0.0);
        assert_eq!(m.normalize(Some(-90.0)), -1.0);
    }

    #[test]
    fn test_invert_and_offset() {
        let mut m = listening();
        m.set_config(MotionConfig {
            invert: true,
            calibration_offset: 10.0,
            ..MotionConfig::default()
        });
        assert_eq!(m.normalize(Some(10.0)), 0.0);
        assert_eq!(m.normalize(Some(40.0)), -1.0);
    }

    #[test]
    fn test_missing_or_nan_gamma_is_zero() {
        let mut m = listening();
        m.handle_sample(OrientationSample::from_gamma(30.0));
        let before = m.tilt();
        let after = m.handle_sample(OrientationSample::from_gamma(f64::NAN));
        assert!(after.is_finite());
        assert!(after < before);
        let after = m.handle_sample(OrientationSample::default());
        assert!(after.is_finite());
        assert_eq!(m.normalize(Some(f64::INFINITY)), 0.0);
    }

    #[test]
    fn test_intent_threshold() {
        let mut m = listening();
        // One sample at ~0.5 normalized -> smoothed 0.2, not past the band
        m.handle_sample(OrientationSample::from_gamma(10.0));
        assert_eq!(m.intent(), TiltIntent::Neutral);
        m.handle_sample(OrientationSample::from_gamma(-30.0));
        m.handle_sample(OrientationSample::from_gamma(-30.0));
        assert_eq!(m.intent(), TiltIntent::Left);
    }

    #[test]
    fn test_unsubscribe_idempotent_and_stops() {
        let mut m = MotionManager::default();
        m.init(SensorSupport::Available);
        let a = m.subscribe().unwrap();
        let b = m.subscribe().unwrap();
        m.unsubscribe(a);
        assert!(m.is_listening());
        m.unsubscribe(b);
        assert!(!m.is_listening());
        m.unsubscribe(b);
        m.unsubscribe(a);
        assert_eq!(m.listener_count(), 0);

        // Samples are ignored with nobody listening
        assert_eq!(m.handle_sample(OrientationSample::from_gamma(30.0)), 0.0);
    }

    #[test]
    fn test_permission_flow() {
        let mut m = MotionManager::default();
        assert_eq!(m.subscribe(), Err(MotionError::NotInitialized));

        m.init(SensorSupport::NeedsPermission);
        assert_eq!(m.permission(), Permission::Prompt);
        // Prompt still listens (permissive default)
        let id = m.subscribe().unwrap();
        m.unsubscribe(id);

        assert_eq!(
            m.apply_permission_result(Ok(false)),
            Err(MotionError::PermissionDenied)
        );
        assert_eq!(m.permission(), Permission::Denied);
        assert_eq!(m.subscribe(), Err(MotionError::PermissionDenied));

        assert!(m.apply_permission_result(Ok(true)).is_ok());
        assert!(m.subscribe().is_ok());
    }

    #[test]
    fn test_request_failure_denies() {
        let mut m = MotionManager::default();
        m.init(SensorSupport::NeedsPermission);
        m.subscribe().unwrap();
        let err = m.apply_permission_result(Err("NotAllowedError".to_string()));
        assert!(matches!(err, Err(MotionError::Unsupported(_))));
        assert_eq!(m.permission(), Permission::Denied);
        assert!(!m.is_listening());
    }

    #[test]
    fn test_unavailable_sensor() {
        let mut m = MotionManager::default();
        m.init(SensorSupport::Unavailable);
        assert!(matches!(m.subscribe(), Err(MotionError::Unsupported(_))));
    }

    #[test]
    fn test_calibrate_uses_last_reading() {
        let mut m = listening();
        assert_eq!(m.calibrate(), None);
        m.handle_sample(OrientationSample::from_gamma(12.0));
        assert_eq!(m.calibrate(), Some(12.0));
        assert_eq!(m.normalize(Some(12.0)), 0.0);
    }

    #[test]
    fn test_dispose_clears_listeners() {
        let mut m = listening();
        m.dispose();
        assert!(!m.is_listening());
        assert_eq!(m.subscribe(), Err(MotionError::NotInitialized));
    }
}
