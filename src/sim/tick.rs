//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically. Every step
//! runs the same fixed order: phase handling, timers, vertical forces,
//! horizontal control, integration, collisions, jumping, scoring, camera,
//! level streaming, terminal check.

use super::collision::{lands_on, pickup_box, player_box, supported_by, touches};
use super::level::{altitude_at, cull_below, stream_platforms};
use super::state::{GameEvent, GameMode, GamePhase, GameState, PickupKind, PlatformKind};
use crate::consts::*;
use crate::input::Input;
use crate::tuning::Tuning;
use crate::wrap_x;

/// Extra band around the view where platforms still collide (px)
const COLLISION_MARGIN: f32 = 200.0;

/// Fuel restored by a fuel pickup
const FUEL_PICKUP_AMOUNT: f32 = 40.0;

/// Extra gravity while holding down in the air
const FAST_FALL_FACTOR: f32 = 1.5;

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &Input, dt: f32, tuning: &Tuning) {
    // The editor owns the world while it's open
    if state.editing {
        return;
    }

    // Handle pause toggle
    if input.pause || (input.menu_back && state.phase == GamePhase::Paused) {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                state.player.jetpack_active = false;
                state.events.push(GameEvent::Paused);
                return;
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Playing;
                state.events.push(GameEvent::Resumed);
            }
            _ => {}
        }
    }

    // Don't tick unless a run is live
    if state.phase != GamePhase::Playing {
        return;
    }

    state.time_ms += dt as f64 * 1000.0;
    state.stats.elapsed_secs += dt;
    if state.player.invulnerable_timer > 0.0 {
        state.player.invulnerable_timer = (state.player.invulnerable_timer - dt).max(0.0);
    }

    update_platforms(state, dt);
    apply_vertical_forces(state, input, dt, tuning);
    apply_horizontal_control(state, input, dt, tuning);

    // Integrate
    let prev_feet = state.player.feet();
    let vel = state.player.vel;
    state.player.pos += vel * dt;
    let half_w = PLAYER_WIDTH / 2.0;
    state.player.pos.x = wrap_x(state.player.pos.x + half_w, VIEW_WIDTH) - half_w;

    resolve_landing(state, input, prev_feet, tuning);
    check_support(state);
    resolve_hazards(state, tuning);
    if state.phase != GamePhase::Playing {
        return;
    }
    collect_pickups(state, tuning);
    try_jump(state, input, tuning);
    update_score(state);
    update_camera(state, dt, tuning);

    if state.mode == GameMode::Endless {
        stream_platforms(state, tuning);
        cull_below(state);
    }

    // Terminal check: fell out of the bottom of the view
    if state.player.pos.y > state.camera.bottom() + tuning.death_margin {
        log::info!("Player fell at altitude {:.1}m", state.altitude);
        game_over(state);
        return;
    }

    debug_assert!(state.player.pos.is_finite(), "player position went non-finite");
    debug_assert!(state.player.vel.is_finite(), "player velocity went non-finite");

    // Ensure deterministic ordering
    state.normalize_order();
}

/// Move platforms, count down respawns, carry a grounded player
fn update_platforms(state: &mut GameState, dt: f32) {
    let ground = state.player.ground_id;
    let mut carry = 0.0;
    for platform in &mut state.platforms {
        platform.tick_respawn(dt);
        let dx = platform.advance(dt);
        if state.player.grounded && Some(platform.id) == ground {
            carry = dx;
        }
    }
    state.player.pos.x += carry;
}

/// Gravity, jetpack ignition/thrust, fuel drain and regen
fn apply_vertical_forces(state: &mut GameState, input: &Input, dt: f32, tuning: &Tuning) {
    let player = &mut state.player;

    if input.jetpack {
        // Ignition is charged once per activation
        if !player.jetpack_active && player.fuel > 0.0 {
            player.fuel = (player.fuel - tuning.jetpack_ignition_cost).max(0.0);
            player.jetpack_active = true;
            state.events.push(GameEvent::JetpackIgnited);
        }
    } else {
        player.jetpack_active = false;
    }

    let thrusting = player.jetpack_active && player.fuel > 0.0;
    if thrusting {
        if player.grounded {
            player.grounded = false;
            player.ground_id = None;
            player.left_ground_at = state.time_ms;
        }
        player.vel.y = (player.vel.y - tuning.jetpack_thrust * dt).max(-tuning.jetpack_max_rise);
        player.fuel = (player.fuel - tuning.fuel_drain_per_sec * dt).max(0.0);
        state.stats.jetpack_secs += dt;
    } else if player.grounded && !player.jetpack_active {
        let cap = MAX_FUEL * tuning.fuel_regen_cap;
        if player.fuel < cap {
            player.fuel = (player.fuel + tuning.fuel_regen_per_sec * dt).min(cap);
        }
    }

    if !player.grounded {
        let gravity = if input.down && player.vel.y > 0.0 {
            tuning.gravity * FAST_FALL_FACTOR
        } else {
            tuning.gravity
        };
        player.vel.y = (player.vel.y + gravity * dt).min(tuning.max_fall_speed);
    } else {
        player.vel.y = 0.0;
    }
}

/// Accelerate toward the input direction, decelerate when idle
fn apply_horizontal_control(state: &mut GameState, input: &Input, dt: f32, tuning: &Tuning) {
    let axis = input.horizontal_axis();
    let vx = state.player.vel.x;
    state.player.vel.x = if axis.abs() > 0.01 {
        move_toward(vx, axis * tuning.max_move_speed, tuning.move_accel * dt)
    } else {
        move_toward(vx, 0.0, tuning.move_friction * dt)
    };
}

#[inline]
fn move_toward(current: f32, target: f32, max_delta: f32) -> f32 {
    let delta = target - current;
    if delta.abs() <= max_delta {
        target
    } else {
        current + max_delta * delta.signum()
    }
}

/// A press made while airborne, within the hyper window before this landing
fn hyper_jump_press(state: &GameState, input: &Input, tuning: &Tuning) -> Option<f64> {
    let pressed = input.jump_pressed_time?;
    if state.consumed_jump_time == Some(pressed) {
        return None;
    }
    let since = state.time_ms - pressed;
    let airborne_press = pressed >= state.player.left_ground_at;
    (airborne_press && (0.0..=tuning.hyper_jump_window_ms).contains(&since)).then_some(pressed)
}

/// Land on the highest platform the feet crossed this step
fn resolve_landing(state: &mut GameState, input: &Input, prev_feet: f32, tuning: &Tuning) {
    if state.player.grounded || state.player.vel.y < 0.0 {
        return;
    }

    let camera = &state.camera;
    let player = &state.player;
    let hit = state
        .platforms
        .iter()
        .enumerate()
        .filter(|(_, p)| p.kind != PlatformKind::Hazard)
        .filter(|(_, p)| camera.is_relevant(p.top(), p.bottom(), COLLISION_MARGIN))
        .filter(|(_, p)| lands_on(prev_feet, player, p))
        .min_by(|(_, a), (_, b)| a.top().total_cmp(&b.top()))
        .map(|(i, _)| i);

    let Some(idx) = hit else {
        return;
    };

    let platform_id = state.platforms[idx].id;
    let kind = state.platforms[idx].kind;
    let top = state.platforms[idx].top();
    let was_jumping = state.player.jumping;

    // Snap onto the surface
    state.player.pos.y = top - PLAYER_HEIGHT;
    state.player.vel.y = 0.0;
    state.player.jumping = false;

    if kind == PlatformKind::Breakable {
        state.platforms[idx].break_now(tuning.breakable_respawn_secs);
        state.events.push(GameEvent::PlatformBroke { platform_id });
    }

    if let Some(pressed) = hyper_jump_press(state, input, tuning) {
        state.consumed_jump_time = Some(pressed);
        state.combo += 1;
        state.stats.perfect_jumps += 1;
        state.stats.max_combo = state.stats.max_combo.max(state.combo);
        state.bonus_score += tuning.hyper_jump_bonus * state.combo as u64;
        launch(state, tuning.hyper_jump_impulse);
        state.events.push(GameEvent::HyperJump { combo: state.combo });
        return;
    }

    if was_jumping {
        // Ordinary landing after a jump breaks the perfect chain
        state.combo = 0;
    }

    if kind == PlatformKind::Spring {
        launch(state, tuning.spring_impulse);
        state.events.push(GameEvent::Sprung { platform_id });
        return;
    }

    state.player.grounded = true;
    state.player.ground_id = Some(platform_id);
    state.events.push(GameEvent::Landed { platform_id });
}

/// Drop to falling when the supporting platform goes away
fn check_support(state: &mut GameState) {
    if !state.player.grounded {
        return;
    }
    let supported = state
        .player
        .ground_id
        .and_then(|id| state.platform(id))
        .is_some_and(|p| supported_by(&state.player, p));
    if !supported {
        state.player.grounded = false;
        state.player.ground_id = None;
        state.player.left_ground_at = state.time_ms;
    }
}

/// Buffered / coyote-time jump
fn try_jump(state: &mut GameState, input: &Input, tuning: &Tuning) {
    let Some(pressed) = input.jump_pressed_time else {
        return;
    };
    if state.consumed_jump_time == Some(pressed) {
        return;
    }
    if state.time_ms - pressed > tuning.jump_buffer_ms {
        return;
    }
    let player = &state.player;
    let coyote = !player.jumping
        && player.vel.y >= 0.0
        && state.time_ms - player.left_ground_at <= tuning.coyote_time_ms;
    if !(player.grounded || coyote) {
        return;
    }
    state.consumed_jump_time = Some(pressed);
    launch(state, tuning.jump_impulse);
    state.events.push(GameEvent::Jumped);
}

/// Leave the ground with an upward impulse
fn launch(state: &mut GameState, impulse: f32) {
    let player = &mut state.player;
    player.vel.y = -impulse;
    player.grounded = false;
    player.ground_id = None;
    player.jumping = true;
    player.left_ground_at = state.time_ms;
}

fn resolve_hazards(state: &mut GameState, tuning: &Tuning) {
    if state.player.invulnerable() {
        return;
    }
    let camera = &state.camera;
    let hit = state
        .platforms
        .iter()
        .filter(|p| p.kind == PlatformKind::Hazard)
        .filter(|p| camera.is_relevant(p.top(), p.bottom(), COLLISION_MARGIN))
        .any(|p| touches(&state.player, p));
    if hit {
        damage(state, tuning);
    }
}

/// Take a hit: shield first, then a life
pub fn damage(state: &mut GameState, tuning: &Tuning) {
    if state.player.invulnerable() || state.phase != GamePhase::Playing {
        return;
    }

    state.combo = 0;
    let clean = state.altitude - state.stats.clean_since_altitude;
    state.stats.best_no_damage_distance = state.stats.best_no_damage_distance.max(clean);
    state.stats.clean_since_altitude = state.altitude;

    if state.player.shield {
        state.player.shield = false;
        state.player.invulnerable_timer = tuning.invulnerable_secs;
        state.events.push(GameEvent::ShieldLost);
        return;
    }

    state.lives = state.lives.saturating_sub(1);
    state.events.push(GameEvent::Damaged {
        lives_left: state.lives,
    });
    if state.lives == 0 {
        log::info!("Out of lives at altitude {:.1}m", state.altitude);
        game_over(state);
        return;
    }

    state.player.invulnerable_timer = tuning.invulnerable_secs;
    // Knock the player up and away from the hazard
    launch(state, tuning.jump_impulse);
}

fn collect_pickups(state: &mut GameState, tuning: &Tuning) {
    let player = player_box(&state.player);
    let mut collected = Vec::new();
    state.pickups.retain(|p| {
        if player.overlaps(&pickup_box(p)) {
            collected.push(p.kind);
            false
        } else {
            true
        }
    });
    for kind in collected {
        match kind {
            PickupKind::Coin => {
                state.stats.coins_collected += 1;
                state.bonus_score += tuning.coin_bonus;
                state.events.push(GameEvent::CoinCollected);
            }
            PickupKind::Fuel => {
                state.player.fuel = (state.player.fuel + FUEL_PICKUP_AMOUNT).min(MAX_FUEL);
                state.events.push(GameEvent::FuelCollected);
            }
        }
    }
}

/// Altitude only ever grows; score follows it
fn update_score(state: &mut GameState) {
    let climbed = altitude_at(state, state.player.feet());
    if climbed > state.altitude {
        state.altitude = climbed;
    }
    if state.stats.milestone_secs.is_none() && state.altitude >= ALTITUDE_MILESTONE {
        state.stats.milestone_secs = Some(state.stats.elapsed_secs);
        log::info!("Reached {}m in {:.1}s", ALTITUDE_MILESTONE, state.stats.elapsed_secs);
    }
    let altitude_score = (state.altitude * state.score_multiplier).floor().max(0.0) as u64;
    state.score = state.score.max(altitude_score + state.bonus_score);
}

/// Follow the player upward with lag; ease zoom
fn update_camera(state: &mut GameState, dt: f32, tuning: &Tuning) {
    let camera = &mut state.camera;
    let anchor_y = state.player.pos.y - camera.view.y * tuning.camera_anchor;
    // Camera never scrolls back down
    let target = camera.y.min(anchor_y);
    let follow = 1.0 - (-tuning.camera_follow_rate * dt).exp();
    camera.y += (target - camera.y) * follow;

    let thrusting = state.player.jetpack_active && state.player.fuel > 0.0;
    let zoom_target = if thrusting { tuning.jetpack_zoom } else { 1.0 };
    let ease = 1.0 - (-tuning.zoom_rate * dt).exp();
    camera.zoom += (zoom_target - camera.zoom) * ease;
}

/// Enter GameOver and publish the run summary
fn game_over(state: &mut GameState) {
    state.phase = GamePhase::GameOver;
    state.player.jetpack_active = false;
    let clean = state.altitude - state.stats.clean_since_altitude;
    state.stats.best_no_damage_distance = state.stats.best_no_damage_distance.max(clean);
    let summary = state.summary();
    log::info!(
        "Game over: score {} altitude {:.1}m coins {} perfect {}",
        summary.score,
        summary.altitude,
        summary.coins_collected,
        summary.perfect_jumps
    );
    state.events.push(GameEvent::GameOver(summary));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pet::PetBuffs;
    use crate::sim::state::{Platform, Player};
    use glam::Vec2;

    /// A playing state with a single platform under a free-falling player
    fn arena(kind: PlatformKind) -> (GameState, u32) {
        let mut state = GameState::new(12345);
        state.platforms.clear();
        state.mode = GameMode::Custom;
        state.phase = GamePhase::Playing;
        state.camera.y = -200.0;
        let id = state.next_entity_id();
        state
            .platforms
            .push(Platform::new(id, Vec2::new(80.0, 134.0), kind));
        state.player = Player::new(Vec2::new(100.0, 100.0));
        state.player.vel.y = 200.0;
        state.player.left_ground_at = -1000.0;
        (state, id)
    }

    fn step(state: &mut GameState, input: &Input) {
        tick(state, input, SIM_DT, &Tuning::default());
    }

    #[test]
    fn test_landing_snaps_to_platform_top() {
        let (mut state, id) = arena(PlatformKind::Static);
        state.player.jumping = true;
        step(&mut state, &Input::default());
        assert_eq!(state.player.pos.y, 100.0);
        assert_eq!(state.player.vel.y, 0.0);
        assert!(state.player.grounded);
        assert!(!state.player.jumping);
        assert_eq!(state.player.ground_id, Some(id));
        assert!(state.events.contains(&GameEvent::Landed { platform_id: id }));
    }

    #[test]
    fn test_stays_grounded() {
        let (mut state, _) = arena(PlatformKind::Static);
        for _ in 0..60 {
            step(&mut state, &Input::default());
        }
        assert!(state.player.grounded);
        assert_eq!(state.player.pos.y, 100.0);
    }

    #[test]
    fn test_hyper_jump_within_window() {
        let (mut state, _) = arena(PlatformKind::Static);
        state.player.jumping = true;
        let input = Input {
            jump_pressed_time: Some(state.time_ms),
            ..Default::default()
        };
        step(&mut state, &input);
        assert_eq!(state.player.vel.y, -Tuning::default().hyper_jump_impulse);
        assert_eq!(state.combo, 1);
        assert_eq!(state.stats.perfect_jumps, 1);
        assert!(state.bonus_score > 0);
        assert!(state.events.contains(&GameEvent::HyperJump { combo: 1 }));
    }

    #[test]
    fn test_late_press_is_regular_jump() {
        let tuning = Tuning::default();
        let (mut state, _) = arena(PlatformKind::Static);
        state.player.jumping = true;
        state.combo = 3;
        // Pressed earlier than the hyper window but within the buffer
        state.time_ms = 1000.0;
        let pressed = state.time_ms - tuning.hyper_jump_window_ms - 10.0;
        let input = Input {
            jump_pressed_time: Some(pressed),
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT, &tuning);
        assert_eq!(state.combo, 0);
        assert_eq!(state.player.vel.y, -tuning.jump_impulse);
        assert!(state.events.contains(&GameEvent::Jumped));
    }

    #[test]
    fn test_jump_press_consumed_once() {
        let (mut state, _) = arena(PlatformKind::Static);
        step(&mut state, &Input::default());
        assert!(state.player.grounded);

        let input = Input {
            jump_pressed_time: Some(state.time_ms),
            ..Default::default()
        };
        step(&mut state, &input);
        assert!(state.player.jumping);
        let jumps = state.events.iter().filter(|e| **e == GameEvent::Jumped).count();
        assert_eq!(jumps, 1);

        // Same press held in the snapshot must not double-jump
        for _ in 0..5 {
            step(&mut state, &input);
        }
        let jumps = state.events.iter().filter(|e| **e == GameEvent::Jumped).count();
        assert_eq!(jumps, 1);
    }

    #[test]
    fn test_coyote_jump_after_walking_off() {
        let tuning = Tuning::default();
        let (mut state, _) = arena(PlatformKind::Static);
        step(&mut state, &Input::default());
        assert!(state.player.grounded);

        // Walk off the right edge
        state.player.pos.x = 80.0 + PLATFORM_WIDTH + 1.0;
        step(&mut state, &Input::default());
        assert!(!state.player.grounded);

        let input = Input {
            jump_pressed_time: Some(state.time_ms),
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT, &tuning);
        assert_eq!(state.player.vel.y, -tuning.jump_impulse);
    }

    #[test]
    fn test_breakable_breaks_and_respawns() {
        let tuning = Tuning::default();
        let (mut state, id) = arena(PlatformKind::Breakable);
        step(&mut state, &Input::default());
        assert!(state.platform(id).unwrap().broken);
        assert!(state.events.contains(&GameEvent::PlatformBroke { platform_id: id }));

        // Falls through on the next step
        step(&mut state, &Input::default());
        assert!(!state.player.grounded);

        let ticks = (tuning.breakable_respawn_secs / SIM_DT).ceil() as usize + 1;
        // Keep the player from dying while we wait
        for _ in 0..ticks {
            state.player.pos.y = 0.0;
            state.player.vel.y = -1.0;
            step(&mut state, &Input::default());
        }
        assert!(!state.platform(id).unwrap().broken);
    }

    #[test]
    fn test_spring_bounces() {
        let (mut state, id) = arena(PlatformKind::Spring);
        step(&mut state, &Input::default());
        assert_eq!(state.player.vel.y, -Tuning::default().spring_impulse);
        assert!(state.events.contains(&GameEvent::Sprung { platform_id: id }));
    }

    #[test]
    fn test_jetpack_ignition_clamps_and_charges_once() {
        let (mut state, _) = arena(PlatformKind::Static);
        state.player.fuel = 5.0;
        let input = Input {
            jetpack: true,
            ..Default::default()
        };
        step(&mut state, &input);
        assert_eq!(state.player.fuel, 0.0);
        assert!(state.player.jetpack_active);
        step(&mut state, &input);
        step(&mut state, &input);
        assert_eq!(state.player.fuel, 0.0);
        let ignitions = state
            .events
            .iter()
            .filter(|e| **e == GameEvent::JetpackIgnited)
            .count();
        assert_eq!(ignitions, 1);
    }

    #[test]
    fn test_jetpack_thrust_drains_fuel() {
        let tuning = Tuning::default();
        let (mut state, _) = arena(PlatformKind::Static);
        state.player.fuel = 50.0;
        let input = Input {
            jetpack: true,
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT, &tuning);
        let expected = 50.0 - tuning.jetpack_ignition_cost - tuning.fuel_drain_per_sec * SIM_DT;
        assert!((state.player.fuel - expected).abs() < 1e-4);
        assert!(state.player.vel.y < 200.0);

        // Release and press again: a new ignition charge
        tick(&mut state, &Input::default(), SIM_DT, &tuning);
        assert!(!state.player.jetpack_active);
        let before = state.player.fuel;
        tick(&mut state, &input, SIM_DT, &tuning);
        assert!(state.player.fuel < before - tuning.jetpack_ignition_cost + 1e-3);
    }

    #[test]
    fn test_fuel_regens_when_grounded() {
        let (mut state, _) = arena(PlatformKind::Static);
        state.player.fuel = 0.0;
        for _ in 0..240 {
            step(&mut state, &Input::default());
        }
        let cap = MAX_FUEL * Tuning::default().fuel_regen_cap;
        assert!(state.player.fuel > 0.0 && state.player.fuel <= cap);
    }

    #[test]
    fn test_horizontal_control_respects_max_speed() {
        let tuning = Tuning::default();
        let (mut state, _) = arena(PlatformKind::Static);
        let input = Input {
            right: true,
            ..Default::default()
        };
        for _ in 0..240 {
            tick(&mut state, &input, SIM_DT, &tuning);
        }
        assert!(state.player.vel.x <= tuning.max_move_speed + 1e-3);
        assert!(state.player.pos.x >= -PLAYER_WIDTH && state.player.pos.x < VIEW_WIDTH);
    }

    #[test]
    fn test_nan_tilt_never_reaches_position() {
        let (mut state, _) = arena(PlatformKind::Static);
        let input = Input {
            tilt_x: f32::NAN,
            ..Default::default()
        };
        for _ in 0..10 {
            step(&mut state, &input);
        }
        assert!(state.player.pos.is_finite());
    }

    #[test]
    fn test_hazard_uses_shield_then_life() {
        let (mut state, _) = arena(PlatformKind::Hazard);
        state.lives = 2;
        state.player.shield = true;
        state.player.vel.y = 0.0;
        state.player.pos.y = 120.0;
        step(&mut state, &Input::default());
        assert!(!state.player.shield);
        assert_eq!(state.lives, 2);
        assert!(state.events.contains(&GameEvent::ShieldLost));

        // Invulnerable: no further damage
        state.player.pos = Vec2::new(100.0, 120.0);
        step(&mut state, &Input::default());
        assert_eq!(state.lives, 2);

        state.player.invulnerable_timer = 0.0;
        state.player.pos = Vec2::new(100.0, 120.0);
        step(&mut state, &Input::default());
        assert_eq!(state.lives, 1);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_hazard_with_no_lives_ends_run() {
        let (mut state, _) = arena(PlatformKind::Hazard);
        state.lives = 1;
        state.combo = 4;
        state.player.vel.y = 0.0;
        state.player.pos.y = 120.0;
        step(&mut state, &Input::default());
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.combo, 0);
        assert!(matches!(state.events.last(), Some(GameEvent::GameOver(_))));
    }

    #[test]
    fn test_falling_below_view_is_game_over() {
        let mut state = GameState::new(1);
        state.start_run(&PetBuffs::default(), &Tuning::default());
        state.player.grounded = false;
        state.player.ground_id = None;
        state.player.pos.y = state.camera.bottom() + 500.0;
        step(&mut state, &Input::default());
        assert_eq!(state.phase, GamePhase::GameOver);
        let summary = state.events.iter().find_map(|e| match e {
            GameEvent::GameOver(s) => Some(s.clone()),
            _ => None,
        });
        assert!(summary.is_some());
    }

    #[test]
    fn test_score_and_altitude_never_decrease() {
        let mut state = GameState::new(77);
        state.start_run(&PetBuffs::default(), &Tuning::default());
        let mut last_score = 0;
        let mut last_alt = 0.0;
        for i in 0..1200 {
            let input = Input {
                jump_pressed_time: (i % 90 == 0).then_some(state.time_ms),
                right: (i / 200) % 2 == 0,
                ..Default::default()
            };
            step(&mut state, &input);
            assert!(state.score >= last_score);
            assert!(state.altitude >= last_alt);
            last_score = state.score;
            last_alt = state.altitude;
            if state.phase != GamePhase::Playing {
                break;
            }
        }
    }

    #[test]
    fn test_camera_follows_upward_only() {
        let (mut state, _) = arena(PlatformKind::Static);
        state.player.pos.y = -2000.0;
        state.player.vel.y = -100.0;
        let before = state.camera.y;
        step(&mut state, &Input::default());
        assert!(state.camera.y < before);
        let high = state.camera.y;
        state.player.pos.y = high + 100.0;
        step(&mut state, &Input::default());
        assert!(state.camera.y <= high);
    }

    #[test]
    fn test_tick_pause() {
        let (mut state, _) = arena(PlatformKind::Static);
        let input = Input {
            pause: true,
            ..Default::default()
        };
        step(&mut state, &input);
        assert_eq!(state.phase, GamePhase::Paused);

        // Frozen while paused
        let pos = state.player.pos;
        step(&mut state, &Input::default());
        assert_eq!(state.player.pos, pos);

        // Unpause
        step(&mut state, &input);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_editing_skips_physics() {
        let (mut state, _) = arena(PlatformKind::Static);
        state.editing = true;
        let pos = state.player.pos;
        step(&mut state, &Input::default());
        assert_eq!(state.player.pos, pos);
        assert_eq!(state.time_ms, 0.0);
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let mut state1 = GameState::new(99999);
        let mut state2 = GameState::new(99999);
        state1.start_run(&PetBuffs::default(), &Tuning::default());
        state2.start_run(&PetBuffs::default(), &Tuning::default());

        for i in 0..600 {
            let input = Input {
                left: i % 100 < 30,
                jump_pressed_time: (i % 60 == 0).then_some(i as f64 * SIM_DT as f64 * 1000.0),
                jetpack: i % 150 < 20,
                ..Default::default()
            };
            step(&mut state1, &input);
            step(&mut state2, &input);
        }

        assert_eq!(state1.time_ms, state2.time_ms);
        assert_eq!(state1.player, state2.player);
        assert_eq!(state1.platforms, state2.platforms);
        assert_eq!(state1.score, state2.score);
    }
}
