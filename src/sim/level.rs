//! Level generation and custom level files
//!
//! Endless mode streams platforms one screen ahead of the camera and culls
//! what falls out below. Custom levels are whatever the editor saved.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{GameMode, GameState, Pickup, PickupKind, Platform, PlatformKind};
use crate::consts::*;
use crate::tuning::Tuning;

/// Storage key for the editor quick-save
pub const LEVEL_STORAGE_KEY: &str = "custom_level";

/// Current level file version
pub const LEVEL_VERSION: u32 = 1;

/// A saved editor level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub version: u32,
    pub platforms: Vec<Platform>,
}

impl Level {
    /// Capture the current platform layout
    pub fn from_state(state: &GameState) -> Self {
        let mut platforms = state.platforms.clone();
        for p in &mut platforms {
            p.broken = false;
            p.respawn_timer = 0.0;
            p.pos.x = p.initial_x;
        }
        platforms.sort_by_key(|p| p.id);
        Self {
            version: LEVEL_VERSION,
            platforms,
        }
    }

    /// Load this level into a menu-state game
    pub fn apply(self, state: &mut GameState) {
        state.platforms = self.platforms;
        state.pickups.clear();
        state.mode = GameMode::Custom;
        // Keep ids unique past the loaded ones
        let max_id = state.platforms.iter().map(|p| p.id).max().unwrap_or(0);
        while state.next_entity_id() <= max_id {}
        state.normalize_order();
    }
}

/// Altitude in metres of a world y
#[inline]
pub fn altitude_at(state: &GameState, y: f32) -> f32 {
    ((state.start_y - y) / PIXELS_PER_METER).max(0.0)
}

/// Generate platforms until one screen above the camera is filled
pub fn stream_platforms(state: &mut GameState, tuning: &Tuning) {
    let target_top = state.camera.y - state.camera.view.y;
    if state.generated_to_y <= target_top {
        return;
    }

    let mut rng = state.rng_state.next_rng();
    let mut y = state.generated_to_y;
    let mut spawned = 0;

    while y > target_top {
        let altitude = altitude_at(state, y);
        // Gaps widen toward the max as the climb goes on
        let difficulty = (altitude / 1000.0).min(1.0);
        let min_gap = tuning.platform_gap_min;
        let max_gap = min_gap + (tuning.platform_gap_max - min_gap) * (0.5 + 0.5 * difficulty);
        y -= rng.random_range(min_gap..=max_gap);

        let x = rng.random_range(0.0..=(VIEW_WIDTH - PLATFORM_WIDTH));
        let kind = choose_kind(&mut rng, altitude);

        let id = state.next_entity_id();
        let mut platform = Platform::new(id, Vec2::new(x, y), kind);
        if kind == PlatformKind::Moving {
            // Keep the sweep on screen
            let room_left = x;
            let room_right = VIEW_WIDTH - PLATFORM_WIDTH - x;
            platform.move_range = room_left.min(room_right).min(platform.move_range);
            platform.move_speed *= 1.0 + difficulty;
        }
        state.platforms.push(platform);
        spawned += 1;

        if kind == PlatformKind::Hazard {
            // A hazard row always has a safe platform on the other side
            let safe_x = wrap_x_away(x);
            let id = state.next_entity_id();
            state
                .platforms
                .push(Platform::new(id, Vec2::new(safe_x, y), PlatformKind::Static));
            spawned += 1;
            continue;
        }

        let roll: f32 = rng.random();
        let pickup = if roll < 0.12 {
            Some(PickupKind::Coin)
        } else if roll < 0.16 {
            Some(PickupKind::Fuel)
        } else {
            None
        };
        if let Some(kind) = pickup {
            let id = state.next_entity_id();
            state.pickups.push(Pickup {
                id,
                kind,
                pos: Vec2::new(
                    x + (PLATFORM_WIDTH - PICKUP_SIZE) / 2.0,
                    y - PICKUP_SIZE - 24.0,
                ),
            });
        }
    }

    state.generated_to_y = y;
    log::debug!("Generated {} platforms up to y={:.0}", spawned, y);
}

/// Drop platforms and pickups far below the view (endless mode only)
pub fn cull_below(state: &mut GameState) {
    if state.mode != GameMode::Endless {
        return;
    }
    let limit = state.camera.bottom() + state.camera.view.y * 0.5;
    let ground = state.player.ground_id;
    state
        .platforms
        .retain(|p| p.top() <= limit || Some(p.id) == ground);
    state.pickups.retain(|p| p.pos.y <= limit);
}

/// Platform type for a row at the given altitude
fn choose_kind(rng: &mut impl Rng, altitude: f32) -> PlatformKind {
    // First stretch is all static so new players can warm up
    if altitude < 50.0 {
        return PlatformKind::Static;
    }
    let roll = rng.random_range(0..100u32);
    match roll {
        0..15 => PlatformKind::Moving,
        15..27 if altitude >= 100.0 => PlatformKind::Breakable,
        27..33 if altitude >= 80.0 => PlatformKind::Spring,
        33..41 if altitude >= 150.0 => PlatformKind::Hazard,
        _ => PlatformKind::Static,
    }
}

/// X on the opposite half of the screen
fn wrap_x_away(x: f32) -> f32 {
    let half = VIEW_WIDTH / 2.0;
    let mirrored = if x < half { x + half } else { x - half };
    mirrored.clamp(0.0, VIEW_WIDTH - PLATFORM_WIDTH)
}
