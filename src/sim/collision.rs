//! Collision detection for axis-aligned boxes
//!
//! Platforms are one-way: the player passes through from below and only
//! lands when the feet cross a platform top while falling.

use glam::Vec2;

use super::state::{Pickup, Platform, Player};
use crate::consts::PICKUP_SIZE;

/// Slack for feet-vs-top comparisons (px)
const LANDING_EPSILON: f32 = 0.5;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self {
            min: pos,
            max: pos + size,
        }
    }

    /// Strict overlap (touching edges do not count)
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Horizontal extents overlap
    pub fn overlaps_x(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x && self.max.x > other.min.x
    }
}

pub fn player_box(player: &Player) -> Aabb {
    Aabb::from_pos_size(player.pos, player.size())
}

pub fn platform_box(platform: &Platform) -> Aabb {
    Aabb::from_pos_size(platform.pos, platform.size)
}

pub fn pickup_box(pickup: &Pickup) -> Aabb {
    Aabb::from_pos_size(pickup.pos, Vec2::splat(PICKUP_SIZE))
}

/// Did the player land on `platform` this step?
///
/// `prev_feet` is the feet y before integration. Landing requires a
/// non-upward velocity, horizontal overlap, and the feet crossing the top.
pub fn lands_on(prev_feet: f32, player: &Player, platform: &Platform) -> bool {
    if !platform.collidable() || player.vel.y < 0.0 {
        return false;
    }
    let top = platform.top();
    player_box(player).overlaps_x(&platform_box(platform))
        && prev_feet <= top + LANDING_EPSILON
        && player.feet() >= top
}

/// Is the player still standing on `platform`?
pub fn supported_by(player: &Player, platform: &Platform) -> bool {
    platform.collidable()
        && player_box(player).overlaps_x(&platform_box(platform))
        && (player.feet() - platform.top()).abs() <= LANDING_EPSILON
}

/// Any overlap with the platform body (hazards)
pub fn touches(player: &Player, platform: &Platform) -> bool {
    platform.collidable() && player_box(player).overlaps(&platform_box(platform))
}
