//! Game state and core simulation types
//!
//! All state that must be persisted for Continue/determinism lives here.
//! Coordinates are canvas-style: +x right, +y down, so climbing means `y`
//! decreasing.

use glam::Vec2;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::pet::PetBuffs;
use crate::tuning::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title/menu, no run in progress
    #[default]
    NotPlaying,
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Run ended (until restart)
    GameOver,
}

/// Which level source a run uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameMode {
    /// Procedurally streamed platforms
    #[default]
    Endless,
    /// A hand-built level from the editor
    Custom,
}

/// Platform types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlatformKind {
    #[default]
    Static,
    /// Slides back and forth around `initial_x`
    Moving,
    /// Breaks on landing and respawns after a delay
    Breakable,
    /// Launches the player on landing
    Spring,
    /// Damages the player on contact
    Hazard,
}

/// A platform entity (axis-aligned box)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub id: u32,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    pub kind: PlatformKind,
    #[serde(default)]
    pub broken: bool,
    /// Seconds until a broken platform reappears
    #[serde(default)]
    pub respawn_timer: f32,
    /// Rest x for moving platforms (editor keeps this in sync)
    pub initial_x: f32,
    /// Half-width of the moving platform sweep (px)
    #[serde(default)]
    pub move_range: f32,
    /// Sweep speed (px/s), sign is the current direction
    #[serde(default)]
    pub move_speed: f32,
}

impl Platform {
    pub fn new(id: u32, pos: Vec2, kind: PlatformKind) -> Self {
        let (move_range, move_speed) = match kind {
            PlatformKind::Moving => (80.0, 60.0),
            _ => (0.0, 0.0),
        };
        Self {
            id,
            pos,
            size: Vec2::new(PLATFORM_WIDTH, PLATFORM_HEIGHT),
            kind,
            broken: false,
            respawn_timer: 0.0,
            initial_x: pos.x,
            move_range,
            move_speed,
        }
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    /// Broken platforms can't be stood on or hit
    #[inline]
    pub fn collidable(&self) -> bool {
        !self.broken
    }

    /// Point-in-box test (editor picking)
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.pos.x
            && p.x <= self.pos.x + self.size.x
            && p.y >= self.pos.y
            && p.y <= self.pos.y + self.size.y
    }

    /// Advance moving platforms; returns the horizontal displacement
    pub fn advance(&mut self, dt: f32) -> f32 {
        if self.kind != PlatformKind::Moving || self.move_range <= 0.0 {
            return 0.0;
        }
        let old_x = self.pos.x;
        let mut x = self.pos.x + self.move_speed * dt;
        let min_x = self.initial_x - self.move_range;
        let max_x = self.initial_x + self.move_range;
        if x > max_x {
            x = max_x;
            self.move_speed = -self.move_speed.abs();
        } else if x < min_x {
            x = min_x;
            self.move_speed = self.move_speed.abs();
        }
        self.pos.x = x;
        x - old_x
    }

    /// Break a breakable platform and start its respawn countdown
    pub fn break_now(&mut self, respawn_secs: f32) {
        if self.kind == PlatformKind::Breakable && !self.broken {
            self.broken = true;
            self.respawn_timer = respawn_secs;
        }
    }

    /// Count down the respawn timer; restores the platform when it elapses
    pub fn tick_respawn(&mut self, dt: f32) {
        if !self.broken {
            return;
        }
        self.respawn_timer -= dt;
        if self.respawn_timer <= 0.0 {
            self.broken = false;
            self.respawn_timer = 0.0;
        }
    }
}

/// Pickup types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    Coin,
    /// Refills a chunk of jetpack fuel
    Fuel,
}

/// A collectible
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pickup {
    pub id: u32,
    pub kind: PickupKind,
    /// Top-left corner
    pub pos: Vec2,
}

/// The player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner of the hitbox
    pub pos: Vec2,
    pub vel: Vec2,
    pub fuel: f32,
    pub grounded: bool,
    /// Airborne because of a jump (not a fall)
    pub jumping: bool,
    pub jetpack_active: bool,
    /// Platform currently supporting the player
    pub ground_id: Option<u32>,
    /// Sim time when the player last left the ground (coyote time)
    pub left_ground_at: f64,
    /// Seconds of remaining invulnerability
    pub invulnerable_timer: f32,
    pub shield: bool,
    #[serde(default)]
    pub skin_id: Option<String>,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            fuel: MAX_FUEL,
            grounded: false,
            jumping: false,
            jetpack_active: false,
            ground_id: None,
            left_ground_at: 0.0,
            invulnerable_timer: 0.0,
            shield: false,
            skin_id: None,
        }
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT)
    }

    #[inline]
    pub fn feet(&self) -> f32 {
        self.pos.y + PLAYER_HEIGHT
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size() * 0.5
    }

    #[inline]
    pub fn invulnerable(&self) -> bool {
        self.invulnerable_timer > 0.0
    }
}

/// Follow camera. `y` is the world y of the top of the view at zoom 1.0;
/// zoom scales around the view center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub y: f32,
    pub zoom: f32,
    pub view: Vec2,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            y: 0.0,
            zoom: 1.0,
            view: Vec2::new(VIEW_WIDTH, VIEW_HEIGHT),
        }
    }
}

impl Camera {
    /// World y of the bottom edge of the (unzoomed) view
    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.view.y
    }

    /// World position to screen position
    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        let half = self.view * 0.5;
        let rel = world - Vec2::new(0.0, self.y) - half;
        rel * self.zoom + half
    }

    /// Screen position to world position (inverse of `world_to_screen`)
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        let half = self.view * 0.5;
        let zoom = if self.zoom.abs() > f32::EPSILON { self.zoom } else { 1.0 };
        (screen - half) / zoom + half + Vec2::new(0.0, self.y)
    }

    /// Whether a world-space vertical band overlaps the view (plus margin)
    pub fn is_relevant(&self, top: f32, bottom: f32, margin: f32) -> bool {
        bottom >= self.y - margin && top <= self.bottom() + margin
    }
}

/// Per-run statistics, finalized into a `RunSummary` on game over
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub elapsed_secs: f32,
    pub coins_collected: u32,
    pub jetpack_secs: f32,
    pub perfect_jumps: u32,
    pub max_combo: u32,
    /// Altitude (m) at the last hit, start of the current clean stretch
    pub clean_since_altitude: f32,
    /// Longest stretch climbed without taking damage (m)
    pub best_no_damage_distance: f32,
    /// Seconds it took to reach `ALTITUDE_MILESTONE`
    pub milestone_secs: Option<f32>,
}

/// Final numbers of a finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub mode: GameMode,
    pub score: u64,
    pub altitude: f32,
    pub coins_collected: u32,
    pub jetpack_secs: f32,
    pub perfect_jumps: u32,
    pub max_combo: u32,
    pub no_damage_distance: f32,
    pub milestone_secs: Option<f32>,
    pub elapsed_secs: f32,
}

/// Things that happened during a tick, drained by the composition root
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    RunStarted,
    Jumped,
    HyperJump { combo: u32 },
    Landed { platform_id: u32 },
    Sprung { platform_id: u32 },
    PlatformBroke { platform_id: u32 },
    JetpackIgnited,
    ShieldLost,
    Damaged { lives_left: u8 },
    CoinCollected,
    FuelCollected,
    Paused,
    Resumed,
    GameOver(RunSummary),
}

/// RNG state wrapper for serialization
///
/// Every generation pass draws a fresh PCG stream, so the state is just the
/// seed and the next stream index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub stream: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    /// Take the next stream as an RNG
    pub fn next_rng(&mut self) -> Pcg32 {
        let rng = Pcg32::new(self.seed, self.stream);
        self.stream += 1;
        rng
    }
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng_state: RngState,
    pub phase: GamePhase,
    /// Level editor active (orthogonal to `phase`)
    pub editing: bool,
    pub mode: GameMode,
    pub score: u64,
    /// Points from hyper jumps and coins (on top of the altitude score)
    pub bonus_score: u64,
    /// Highest altitude reached (metres, never decreases)
    pub altitude: f32,
    /// Player y at run start (altitude zero)
    pub start_y: f32,
    pub lives: u8,
    pub combo: u32,
    /// Pet buff applied to the altitude score
    pub score_multiplier: f32,
    /// Simulation clock (ms)
    pub time_ms: f64,
    /// Press time of the last jump intent already acted upon
    pub consumed_jump_time: Option<f64>,
    pub player: Player,
    /// Platforms (sorted by id for determinism)
    pub platforms: Vec<Platform>,
    /// Pickups (sorted by id for determinism)
    pub pickups: Vec<Pickup>,
    pub camera: Camera,
    pub stats: RunStats,
    /// Highest (smallest y) row produced by the level generator
    pub generated_to_y: f32,
    /// Events produced since the last drain
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a new game state with the given seed (menu, no run yet)
    pub fn new(seed: u64) -> Self {
        let start_y = VIEW_HEIGHT - 120.0;
        let mut state = Self {
            seed,
            rng_state: RngState::new(seed),
            phase: GamePhase::NotPlaying,
            editing: false,
            mode: GameMode::Endless,
            score: 0,
            bonus_score: 0,
            altitude: 0.0,
            start_y,
            lives: 1,
            combo: 0,
            score_multiplier: 1.0,
            time_ms: 0.0,
            consumed_jump_time: None,
            player: Player::new(Vec2::new(
                (VIEW_WIDTH - PLAYER_WIDTH) / 2.0,
                start_y - PLAYER_HEIGHT,
            )),
            platforms: Vec::new(),
            pickups: Vec::new(),
            camera: Camera::default(),
            stats: RunStats::default(),
            generated_to_y: start_y,
            events: Vec::new(),
            next_id: 1,
        };
        state.spawn_floor();
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Wide starting platform under the spawn point
    fn spawn_floor(&mut self) {
        let id = self.next_entity_id();
        let mut floor = Platform::new(id, Vec2::new(0.0, self.start_y), PlatformKind::Static);
        floor.size.x = VIEW_WIDTH;
        self.platforms.push(floor);
    }

    /// Reset everything run-related and enter `Playing`.
    ///
    /// Pet buffs are applied here: they only affect the run being started.
    pub fn start_run(&mut self, buffs: &PetBuffs, tuning: &Tuning) {
        let seed = self.seed;
        let mode = self.mode;
        let level = (mode == GameMode::Custom).then(|| self.platforms.clone());
        let skin = self.player.skin_id.clone();

        *self = GameState::new(seed);
        self.mode = mode;
        if let Some(platforms) = level {
            // Custom levels keep their authored layout (floor included)
            self.platforms = platforms;
            for p in &mut self.platforms {
                p.broken = false;
                p.respawn_timer = 0.0;
                p.pos.x = p.initial_x;
            }
            self.next_id = self.platforms.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        }

        self.player.skin_id = skin;
        self.player.shield = buffs.starting_shield;
        self.lives = tuning.base_lives.max(1).saturating_add(buffs.extra_lives);
        self.score_multiplier = buffs.score_multiplier.max(0.0);
        self.phase = GamePhase::Playing;
        if self.mode == GameMode::Endless {
            super::level::stream_platforms(self, tuning);
        }
        self.events.push(GameEvent::RunStarted);
        log::info!(
            "Run started (seed {}, lives {}, multiplier {:.2}, shield {})",
            self.seed,
            self.lives,
            self.score_multiplier,
            self.player.shield
        );
    }

    /// Snapshot of the run statistics
    pub fn summary(&self) -> RunSummary {
        let clean = (self.altitude - self.stats.clean_since_altitude).max(0.0);
        RunSummary {
            mode: self.mode,
            score: self.score,
            altitude: self.altitude,
            coins_collected: self.stats.coins_collected,
            jetpack_secs: self.stats.jetpack_secs,
            perfect_jumps: self.stats.perfect_jumps,
            max_combo: self.stats.max_combo,
            no_damage_distance: self.stats.best_no_damage_distance.max(clean),
            milestone_secs: self.stats.milestone_secs,
            elapsed_secs: self.stats.elapsed_secs,
        }
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Find a platform by ID
    pub fn platform(&self, id: u32) -> Option<&Platform> {
        self.platforms.iter().find(|p| p.id == id)
    }

    /// Ensure entities are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.platforms.sort_by_key(|p| p.id);
        self.pickups.sort_by_key(|p| p.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_menu_with_floor() {
        let state = GameState::new(7);
        assert_eq!(state.phase, GamePhase::NotPlaying);
        assert_eq!(state.platforms.len(), 1);
        let floor = &state.platforms[0];
        assert!((state.player.feet() - floor.top()).abs() < 1e-4);
    }

    #[test]
    fn test_entity_ids_are_monotonic() {
        let mut state = GameState::new(1);
        let a = state.next_entity_id();
        let b = state.next_entity_id();
        assert!(b > a);
    }

    #[test]
    fn test_camera_round_trip() {
        let camera = Camera {
            y: -350.0,
            zoom: 0.8,
            view: Vec2::new(VIEW_WIDTH, VIEW_HEIGHT),
        };
        let world = Vec2::new(123.0, -200.0);
        let back = camera.screen_to_world(camera.world_to_screen(world));
        assert!((back - world).length() < 1e-3);
    }

    #[test]
    fn test_breakable_respawns() {
        let mut p = Platform::new(1, Vec2::ZERO, PlatformKind::Breakable);
        p.break_now(2.0);
        assert!(!p.collidable());
        p.tick_respawn(1.0);
        assert!(p.broken);
        p.tick_respawn(1.5);
        assert!(p.collidable());
    }

    #[test]
    fn test_moving_platform_bounces_within_range() {
        let mut p = Platform::new(1, Vec2::new(100.0, 0.0), PlatformKind::Moving);
        for _ in 0..1000 {
            p.advance(1.0 / 60.0);
            assert!(p.pos.x >= p.initial_x - p.move_range - 1e-3);
            assert!(p.pos.x <= p.initial_x + p.move_range + 1e-3);
        }
    }

    #[test]
    fn test_start_run_applies_buffs() {
        let mut state = GameState::new(3);
        let buffs = PetBuffs {
            score_multiplier: 1.5,
            starting_shield: true,
            extra_lives: 1,
        };
        state.start_run(&buffs, &Tuning::default());
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.lives, 2);
        assert!(state.player.shield);
        assert!(state.platforms.len() > 5);
    }

    #[test]
    fn test_serde_round_trip() {
        let mut state = GameState::new(11);
        state.start_run(&PetBuffs::default(), &Tuning::default());
        state.events.push(GameEvent::Jumped);
        let json = serde_json::to_string(&state).unwrap();
        let loaded: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.platforms, state.platforms);
        assert_eq!(loaded.player, state.player);
        assert_eq!(loaded.rng_state, state.rng_state);
        assert!(loaded.events.is_empty());
    }
}
