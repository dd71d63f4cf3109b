//! Sky Hopper - An endless vertical jumping arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, game state, editor)
//! - `input`: Per-frame input aggregation from keyboard, pointer, joystick and tilt
//! - `platform`: Browser/native platform abstraction (time, device motion)
//! - `pet`: Virtual pet growth engine and its persistence service
//! - `persistence`: Profile-scoped key/value storage bridge
//! - `leaderboard`: Global leaderboard with offline fallback
//! - `tuning`: Data-driven game balance
//! - `game`: Composition root tying the above together

pub mod game;
pub mod highscores;
pub mod input;
pub mod leaderboard;
pub mod persistence;
pub mod pet;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use game::Game;
pub use highscores::HighScores;
pub use settings::{ControlScheme, Settings};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz for smooth physics)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Logical viewport (world units == CSS pixels at zoom 1.0)
    pub const VIEW_WIDTH: f32 = 400.0;
    pub const VIEW_HEIGHT: f32 = 700.0;

    /// Player hitbox
    pub const PLAYER_WIDTH: f32 = 30.0;
    pub const PLAYER_HEIGHT: f32 = 34.0;

    /// Default platform size
    pub const PLATFORM_WIDTH: f32 = 70.0;
    pub const PLATFORM_HEIGHT: f32 = 14.0;

    /// Pickup hitbox (square)
    pub const PICKUP_SIZE: f32 = 18.0;

    /// Jetpack tank size
    pub const MAX_FUEL: f32 = 100.0;

    /// World pixels per metre of altitude
    pub const PIXELS_PER_METER: f32 = 10.0;

    /// Altitude (metres) used for the "fastest to milestone" run stat
    pub const ALTITUDE_MILESTONE: f32 = 500.0;

    /// Local leaderboard size
    pub const LEADERBOARD_SIZE: usize = 10;
}

/// Replace NaN/inf with zero
#[inline]
pub fn finite_or_zero(v: f32) -> f32 {
    if v.is_finite() { v } else { 0.0 }
}

/// Wrap an x coordinate into `[0, width)` (horizontal screen wrap)
#[inline]
pub fn wrap_x(x: f32, width: f32) -> f32 {
    let wrapped = x.rem_euclid(width);
    // rem_euclid can return `width` for tiny negative inputs
    if wrapped >= width { 0.0 } else { wrapped }
}

/// Unix time in milliseconds
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> i64 {
    js_sys::Date::now() as i64
}

/// Unix time in milliseconds
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
