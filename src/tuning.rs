//! Data-driven game balance
//!
//! Physics and scoring constants that designers tweak. Everything here is
//! serializable so a tuning file can override the defaults.

use serde::{Deserialize, Serialize};

/// Simulation tuning values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Vertical motion ===
    /// Downward acceleration (px/s²)
    pub gravity: f32,
    /// Terminal falling speed (px/s)
    pub max_fall_speed: f32,
    /// Upward impulse of a regular jump (px/s)
    pub jump_impulse: f32,
    /// Upward impulse of a hyper jump (px/s)
    pub hyper_jump_impulse: f32,
    /// Upward impulse when landing on a spring
    pub spring_impulse: f32,

    // === Jump timing ===
    /// A jump press this long before landing triggers a hyper jump (ms)
    pub hyper_jump_window_ms: f64,
    /// A jump press is remembered for this long while airborne (ms)
    pub jump_buffer_ms: f64,
    /// Grace period after walking off a ledge where a jump still works (ms)
    pub coyote_time_ms: f64,

    // === Horizontal motion ===
    /// Horizontal acceleration toward the input direction (px/s²)
    pub move_accel: f32,
    /// Deceleration with no input (px/s²)
    pub move_friction: f32,
    /// Maximum horizontal speed (px/s)
    pub max_move_speed: f32,

    // === Jetpack ===
    /// One-time fuel charge when thrust begins (settings override this)
    pub jetpack_ignition_cost: f32,
    /// Upward thrust acceleration (px/s²)
    pub jetpack_thrust: f32,
    /// Maximum upward speed under thrust (px/s)
    pub jetpack_max_rise: f32,
    /// Fuel consumed per second of thrust
    pub fuel_drain_per_sec: f32,
    /// Fuel regenerated per second while standing
    pub fuel_regen_per_sec: f32,
    /// Regen stops at this fraction of the tank
    pub fuel_regen_cap: f32,

    // === Platforms ===
    /// Seconds before a broken platform reappears
    pub breakable_respawn_secs: f32,
    /// Vertical gap range between generated platforms (px)
    pub platform_gap_min: f32,
    pub platform_gap_max: f32,

    // === Damage ===
    /// Invulnerability after a hit (seconds)
    pub invulnerable_secs: f32,
    /// Starting lives before pet buffs
    pub base_lives: u8,

    // === Scoring ===
    /// Bonus points for a hyper jump (scaled by combo)
    pub hyper_jump_bonus: u64,
    /// Points per coin
    pub coin_bonus: u64,

    // === Camera ===
    /// Fraction of the view height where the player is kept
    pub camera_anchor: f32,
    /// Camera follow rate (per second, exponential)
    pub camera_follow_rate: f32,
    /// Zoom while the jetpack is firing
    pub jetpack_zoom: f32,
    /// Zoom easing rate (per second)
    pub zoom_rate: f32,
    /// Distance below the view bottom that counts as a fall (px)
    pub death_margin: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: 1500.0,
            max_fall_speed: 900.0,
            jump_impulse: 720.0,
            hyper_jump_impulse: 1050.0,
            spring_impulse: 1200.0,

            hyper_jump_window_ms: 120.0,
            jump_buffer_ms: 150.0,
            coyote_time_ms: 90.0,

            move_accel: 2400.0,
            move_friction: 1800.0,
            max_move_speed: 320.0,

            jetpack_ignition_cost: 10.0,
            jetpack_thrust: 2600.0,
            jetpack_max_rise: 520.0,
            fuel_drain_per_sec: 25.0,
            fuel_regen_per_sec: 12.0,
            fuel_regen_cap: 0.5,

            breakable_respawn_secs: 3.0,
            platform_gap_min: 60.0,
            platform_gap_max: 130.0,

            invulnerable_secs: 1.5,
            base_lives: 1,

            hyper_jump_bonus: 50,
            coin_bonus: 10,

            camera_anchor: 0.45,
            camera_follow_rate: 6.0,
            jetpack_zoom: 0.85,
            zoom_rate: 2.5,
            death_margin: 80.0,
        }
    }
}

impl Tuning {
    /// Parse a tuning override; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Peak height of a regular jump (px), handy for level generation
    pub fn jump_height(&self) -> f32 {
        self.jump_impulse * self.jump_impulse / (2.0 * self.gravity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_override_keeps_defaults() {
        let t = Tuning::from_json(r#"{ "hyper_jump_window_ms": 200.0 }"#).unwrap();
        assert_eq!(t.hyper_jump_window_ms, 200.0);
        assert_eq!(t.gravity, Tuning::default().gravity);
    }

    #[test]
    fn test_generated_gaps_are_reachable() {
        let t = Tuning::default();
        assert!(t.platform_gap_max < t.jump_height());
    }
}
