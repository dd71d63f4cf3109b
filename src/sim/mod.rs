//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod collision;
pub mod editor;
pub mod level;
pub mod state;
pub mod tick;

pub use collision::Aabb;
pub use editor::{Editor, EditorAction, EditorTool};
pub use level::{LEVEL_STORAGE_KEY, Level};
pub use state::{
    Camera, GameEvent, GameMode, GamePhase, GameState, Pickup, PickupKind, Platform, PlatformKind,
    Player, RunStats, RunSummary,
};
pub use tick::tick;
