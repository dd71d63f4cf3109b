//! Composition root
//!
//! `Game` owns every component and drives them from one place: the host
//! feeds it raw events and frame times, and reads back state and events.
//! Nothing here touches the DOM, so the whole loop runs in native tests.

use crate::consts::*;
use crate::highscores::HighScores;
use crate::input::{InputCommand, InputController};
use crate::leaderboard::ScoreSubmission;
use crate::persistence::{KeyValueStore, ProfileStore, StorageError};
use crate::pet::{Balancing, PetError, PetService};
use crate::platform::motion::{MotionManager, OrientationSample, SensorSupport, TiltIntent};
use crate::platform::{MotionError, normalize_key};
use crate::settings::{ControlScheme, Settings};
use crate::sim::{
    Editor, EditorAction, GameEvent, GameMode, GamePhase, GameState, LEVEL_STORAGE_KEY, Level,
    RunSummary, tick,
};
use crate::tuning::Tuning;
use glam::Vec2;

/// Saved in-progress run
pub const RESUME_KEY: &str = "resume";

/// Step a run seed forward (PCG multiplier)
fn next_seed(seed: u64) -> u64 {
    seed.wrapping_mul(6_364_136_223_846_793_005)
        .wrapping_add(1_442_695_040_888_963_407)
}

/// Horizontal drag (view units) for full joystick deflection
const JOYSTICK_RADIUS: f32 = 60.0;

/// Finger holding the virtual joystick
#[derive(Debug, Clone, Copy)]
struct TouchStick {
    pointer: i32,
    anchor_x: f32,
}

/// Game instance holding all state
pub struct Game<S: KeyValueStore> {
    state: GameState,
    controller: InputController,
    editor: Editor,
    motion: MotionManager,
    motion_listener: Option<crate::platform::motion::ListenerId>,
    stick: Option<TouchStick>,
    settings: Settings,
    tuning: Tuning,
    store: ProfileStore<S>,
    pets: PetService,
    highscores: HighScores,
    accumulator: f32,
    player_name: String,
    last_summary: Option<RunSummary>,
    /// Finished run waiting for the host to submit it
    pending_submission: Option<ScoreSubmission>,
}

impl<S: KeyValueStore> Game<S> {
    pub fn new(store: ProfileStore<S>, seed: u64) -> Self {
        let settings = Settings::load(&store);
        let highscores = HighScores::load(&store);
        let tuning = Tuning {
            jetpack_ignition_cost: settings.jetpack_cost,
            ..Tuning::default()
        };
        Self {
            state: GameState::new(seed),
            controller: InputController::new(),
            editor: Editor::new(),
            motion: MotionManager::new(settings.motion_config()),
            motion_listener: None,
            stick: None,
            settings,
            tuning,
            store,
            pets: PetService::new(Balancing::default(), seed),
            highscores,
            accumulator: 0.0,
            player_name: "Player".to_string(),
            last_summary: None,
            pending_submission: None,
        }
    }

    /// Replace the physics tuning (the settings' jetpack cost still applies)
    pub fn with_tuning(mut self, tuning: Tuning) -> Self {
        self.tuning = Tuning {
            jetpack_ignition_cost: self.settings.jetpack_cost,
            ..tuning
        };
        self
    }

    // === Accessors ===

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn highscores(&self) -> &HighScores {
        &self.highscores
    }

    pub fn store(&self) -> &ProfileStore<S> {
        &self.store
    }

    pub fn motion(&self) -> &MotionManager {
        &self.motion
    }

    pub fn last_summary(&self) -> Option<&RunSummary> {
        self.last_summary.as_ref()
    }

    pub fn set_player_name(&mut self, name: impl Into<String>) {
        self.player_name = name.into();
    }

    /// Run a pet operation against this profile's store
    pub fn with_pets<R>(&mut self, f: impl FnOnce(&mut PetService, &ProfileStore<S>) -> R) -> R {
        f(&mut self.pets, &self.store)
    }

    /// Take the last finished run for leaderboard submission
    pub fn take_submission(&mut self) -> Option<ScoreSubmission> {
        self.pending_submission.take()
    }

    // === Frame loop ===

    /// Advance by one display frame. Returns the events it produced.
    pub fn frame(&mut self, dt: f32, now: i64) -> Vec<GameEvent> {
        let dt = if dt.is_finite() { dt.clamp(0.0, 0.1) } else { 0.0 };
        self.accumulator += dt;

        let mut events = Vec::new();
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let input = self.controller.snapshot();
            let idle = matches!(self.state.phase, GamePhase::NotPlaying | GamePhase::GameOver);
            if input.menu_select && idle && !self.state.editing {
                self.start_run(now);
            } else {
                tick(&mut self.state, &input, SIM_DT, &self.tuning);
            }
            // Clear one-shot inputs after processing
            self.controller.end_frame();
            self.accumulator -= SIM_DT;
            substeps += 1;

            for event in self.state.drain_events() {
                self.on_event(&event, now);
                events.push(event);
            }
        }
        // Drop time we couldn't simulate instead of spiralling
        if substeps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        events
    }

    /// Begin a run with the pet's buffs
    pub fn start_run(&mut self, now: i64) {
        let buffs = self.pets.buffs(&self.store, now);
        self.state.seed = next_seed(self.state.seed);
        self.state.start_run(&buffs, &self.tuning);
        self.controller.reset_jump();
        self.last_summary = None;
        self.clear_resume();
    }

    fn on_event(&mut self, event: &GameEvent, now: i64) {
        match event {
            GameEvent::Paused => self.save_resume(),
            GameEvent::GameOver(summary) => self.finish_run(summary, now),
            _ => {}
        }
    }

    fn finish_run(&mut self, summary: &RunSummary, now: i64) {
        if let Some(rank) = self.highscores.add_run(summary, now) {
            log::info!("New high score #{rank}: {}", summary.score);
            if let Err(e) = self.highscores.save(&self.store) {
                log::warn!("Failed to save high scores: {e}");
            }
        }

        match self.pets.award_coins(&self.store, summary.coins_collected, now) {
            Ok(_) | Err(PetError::NoPet) => {}
            Err(e) => log::warn!("Failed to award coins: {e}"),
        }

        if summary.mode == GameMode::Endless && summary.score > 0 {
            self.pending_submission = Some(ScoreSubmission::new(
                &self.player_name,
                summary.score,
                self.state.player.skin_id.clone(),
            ));
        }
        self.last_summary = Some(summary.clone());
        self.clear_resume();
    }

    // === Resume ===

    fn save_resume(&self) {
        match self.store.save(RESUME_KEY, &self.state) {
            Ok(()) => log::info!("Run saved (altitude {:.0}m)", self.state.altitude),
            Err(e) => log::warn!("Failed to save run: {e}"),
        }
    }

    fn clear_resume(&self) {
        if let Err(e) = self.store.remove(RESUME_KEY) {
            log::warn!("Failed to clear saved run: {e}");
        }
    }

    pub fn has_resume(&self) -> bool {
        self.store.contains(RESUME_KEY)
    }

    /// Restore the saved run (paused). Returns false when there is none.
    pub fn continue_saved(&mut self) -> bool {
        let Some(mut state) = self.store.load::<GameState>(RESUME_KEY) else {
            return false;
        };
        state.phase = GamePhase::Paused;
        state.editing = false;
        state.normalize_order();
        self.state = state;
        self.accumulator = 0.0;
        self.controller.reset_jump();
        log::info!("Continuing saved run at {:.0}m", self.state.altitude);
        true
    }

    // === Input ===

    pub fn key_down(&mut self, key: &str, repeat: bool) {
        let key = normalize_key(key);
        let command = self.controller.key_down(
            &key,
            repeat,
            self.state.time_ms,
            &mut self.state,
            &mut self.editor,
        );
        match command {
            Some(InputCommand::ToggleEditor) => {
                self.toggle_editor();
            }
            Some(InputCommand::SaveLevel) => {
                if let Err(e) = self.save_level() {
                    log::warn!("Failed to save level: {e}");
                }
            }
            Some(InputCommand::Calibrate) => self.calibrate(),
            None => {}
        }
    }

    pub fn key_up(&mut self, key: &str) {
        self.controller.key_up(&normalize_key(key));
    }

    pub fn pointer_down(&mut self, screen: Vec2, add_modifier: bool) -> Option<EditorAction> {
        self.controller
            .pointer_down(screen, add_modifier, &mut self.state, &mut self.editor)
    }

    pub fn pointer_move(&mut self, screen: Vec2) -> bool {
        self.controller
            .pointer_move(screen, &mut self.state, &mut self.editor)
    }

    pub fn pointer_up(&mut self) {
        self.controller.pointer_up(&mut self.editor);
    }

    pub fn set_joystick(&mut self, axis: Option<f32>) {
        self.controller.set_joystick(axis);
    }

    /// Touch scheme: a press on the left half of the view anchors the
    /// virtual joystick. Returns whether the press was claimed.
    pub fn joystick_start(&mut self, pointer: i32, screen: Vec2) -> bool {
        if self.settings.control_scheme != ControlScheme::Touch
            || self.state.editing
            || self.stick.is_some()
            || screen.x >= VIEW_WIDTH * 0.5
        {
            return false;
        }
        self.stick = Some(TouchStick {
            pointer,
            anchor_x: screen.x,
        });
        self.controller.set_joystick(Some(0.0));
        true
    }

    /// Drag of the joystick finger; deflection is the offset from the anchor
    pub fn joystick_move(&mut self, pointer: i32, screen: Vec2) -> bool {
        match self.stick {
            Some(stick) if stick.pointer == pointer => {
                let axis = (screen.x - stick.anchor_x) / JOYSTICK_RADIUS;
                self.controller.set_joystick(Some(axis));
                true
            }
            _ => false,
        }
    }

    pub fn joystick_end(&mut self, pointer: i32) -> bool {
        match self.stick {
            Some(stick) if stick.pointer == pointer => {
                self.release_stick();
                true
            }
            _ => false,
        }
    }

    fn release_stick(&mut self) {
        self.stick = None;
        self.controller.set_joystick(None);
    }

    /// Menu confirm from a UI button
    pub fn select(&mut self) {
        self.controller.press_select();
    }

    pub fn toggle_pause(&mut self) {
        self.controller.press_pause();
    }

    /// Window hidden or blurred: drop held input and pause a live run
    pub fn focus_lost(&mut self) {
        self.controller.release_all();
        self.stick = None;
        if self.state.phase == GamePhase::Playing {
            self.controller.press_pause();
            log::info!("Auto-paused (focus lost)");
        }
    }

    // === Motion ===

    /// Record sensor support and start listening if tilt is selected
    pub fn init_motion(&mut self, support: SensorSupport) {
        self.motion.init(support);
        if self.settings.control_scheme == ControlScheme::Tilt {
            self.listen_for_tilt();
        }
    }

    /// Result of the host's permission prompt
    pub fn motion_permission_result(&mut self, result: Result<bool, String>) {
        match self.motion.apply_permission_result(result) {
            Ok(()) => {
                if self.settings.control_scheme == ControlScheme::Tilt {
                    self.listen_for_tilt();
                }
            }
            Err(e) => self.fall_back_from_tilt(&e),
        }
    }

    fn listen_for_tilt(&mut self) {
        if self.motion_listener.is_some() {
            return;
        }
        match self.motion.subscribe() {
            Ok(id) => self.motion_listener = Some(id),
            // Retried by `init_motion`
            Err(MotionError::NotInitialized) => {}
            Err(e) => self.fall_back_from_tilt(&e),
        }
    }

    fn stop_tilt(&mut self) {
        if let Some(id) = self.motion_listener.take() {
            self.motion.unsubscribe(id);
        }
        self.controller.set_tilt(0.0);
    }

    fn fall_back_from_tilt(&mut self, error: &MotionError) {
        self.motion_listener = None;
        self.controller.set_tilt(0.0);
        if self.settings.control_scheme == ControlScheme::Tilt {
            log::warn!("Tilt unavailable ({error}), switching to touch controls");
            self.settings.control_scheme = ControlScheme::Touch;
            if let Err(e) = self.settings.save(&self.store) {
                log::warn!("Failed to save settings: {e}");
            }
        }
    }

    pub fn orientation_sample(&mut self, sample: OrientationSample) {
        let tilt = self.motion.handle_sample(sample);
        if self.motion_listener.is_some() {
            // Inside the neutral band the player coasts
            let steer = match self.motion.intent() {
                TiltIntent::Neutral => 0.0,
                TiltIntent::Left | TiltIntent::Right => tilt,
            };
            self.controller.set_tilt(steer);
        }
    }

    fn calibrate(&mut self) {
        if let Some(offset) = self.motion.calibrate() {
            self.settings.calibration_offset = offset;
            if let Err(e) = self.settings.save(&self.store) {
                log::warn!("Failed to save calibration: {e}");
            }
        }
    }

    // === Settings ===

    pub fn set_control_scheme(&mut self, scheme: ControlScheme) {
        self.settings.control_scheme = scheme;
        if scheme != ControlScheme::Touch && self.stick.is_some() {
            self.release_stick();
        }
        if scheme == ControlScheme::Tilt {
            self.listen_for_tilt();
        } else {
            self.stop_tilt();
        }
        if let Err(e) = self.settings.save(&self.store) {
            log::warn!("Failed to save settings: {e}");
        }
    }

    pub fn update_settings(&mut self, settings: Settings) -> Result<(), StorageError> {
        let scheme = settings.control_scheme;
        self.settings = settings.sanitized();
        self.tuning.jetpack_ignition_cost = self.settings.jetpack_cost;
        self.motion.set_config(self.settings.motion_config());
        self.set_control_scheme(scheme);
        self.settings.save(&self.store)
    }

    /// Switch profile and reload everything stored per profile
    pub fn set_profile(&mut self, profile: &str) {
        self.store.set_profile(profile);
        let settings = Settings::load(&self.store);
        self.highscores = HighScores::load(&self.store);
        self.tuning.jetpack_ignition_cost = settings.jetpack_cost;
        self.motion.set_config(settings.motion_config());
        let scheme = settings.control_scheme;
        self.settings = settings;
        if scheme == ControlScheme::Tilt {
            self.listen_for_tilt();
        } else {
            self.stop_tilt();
        }
    }

    // === Levels and editor ===

    /// Open or close the editor. Refused during a live or paused run.
    pub fn toggle_editor(&mut self) -> bool {
        if self.state.editing {
            self.editor.exit(&mut self.state);
            return true;
        }
        if matches!(self.state.phase, GamePhase::Playing | GamePhase::Paused) {
            log::info!("Finish the run before editing");
            return false;
        }
        self.state = GameState::new(self.state.seed);
        self.load_level();
        self.editor.enter(&mut self.state)
    }

    /// Store the current layout as the custom level
    pub fn save_level(&self) -> Result<(), StorageError> {
        let level = Level::from_state(&self.state);
        self.store.save(LEVEL_STORAGE_KEY, &level)?;
        log::info!("Level saved ({} platforms)", level.platforms.len());
        Ok(())
    }

    /// Load the saved custom level into the menu state
    pub fn load_level(&mut self) -> bool {
        match self.store.load::<Level>(LEVEL_STORAGE_KEY) {
            Some(level) => {
                level.apply(&mut self.state);
                true
            }
            None => false,
        }
    }

    /// Choose between generated and custom levels for the next run
    pub fn set_mode(&mut self, mode: GameMode) {
        if self.state.editing || matches!(self.state.phase, GamePhase::Playing | GamePhase::Paused)
        {
            return;
        }
        self.state = GameState::new(self.state.seed);
        if mode == GameMode::Custom && !self.load_level() {
            log::info!("No custom level saved, staying on endless");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::pet::PetState;
    use crate::pet::service::PET_STORAGE_KEY;

    const FRAME: f32 = 1.0 / 60.0;

    fn game() -> Game<MemoryStore> {
        Game::new(ProfileStore::in_memory(), 99)
    }

    fn press(game: &mut Game<MemoryStore>, key: &str) {
        game.key_down(key, false);
        game.key_up(key);
    }

    /// Make the player fall out of the world on the next step
    fn drop_player(game: &mut Game<MemoryStore>) {
        let bottom = game.state.camera.bottom();
        game.state.player.pos.y = bottom + 500.0;
        game.state.player.grounded = false;
        game.state.player.ground_id = None;
    }

    #[test]
    fn test_enter_starts_run() {
        let mut g = game();
        assert_eq!(g.state().phase, GamePhase::NotPlaying);
        press(&mut g, "Enter");
        let events = g.frame(FRAME, 0);
        assert_eq!(g.state().phase, GamePhase::Playing);
        assert!(events.contains(&GameEvent::RunStarted));
        assert!(g.state().platforms.len() > 1);
    }

    #[test]
    fn test_accumulator_caps_substeps() {
        let mut g = game();
        g.start_run(0);
        g.frame(10.0, 0);
        // dt is clamped to 0.1s = 12 steps, capped at MAX_SUBSTEPS
        let expected = MAX_SUBSTEPS as f64 * SIM_DT as f64 * 1000.0;
        assert!((g.state().time_ms - expected).abs() < 1e-3);
    }

    #[test]
    fn test_pause_saves_resume_and_continue_restores() {
        let mut g = game();
        g.start_run(0);
        g.frame(FRAME, 0);
        press(&mut g, "Escape");
        let events = g.frame(FRAME, 0);
        assert!(events.contains(&GameEvent::Paused));
        assert!(g.has_resume());

        let saved_platforms = g.state().platforms.len();
        let mut other = Game::new(ProfileStore::new(MemoryStore::new(), "guest"), 1);
        assert!(!other.continue_saved());

        // Same store: restore into a fresh game
        g.state = GameState::new(5);
        assert!(g.continue_saved());
        assert_eq!(g.state().phase, GamePhase::Paused);
        assert_eq!(g.state().platforms.len(), saved_platforms);
    }

    #[test]
    fn test_game_over_records_score_and_coins() {
        let mut g = game();
        g.with_pets(|pets, store| pets.adopt(store, "Blob", 0)).unwrap();
        g.start_run(0);
        g.state.bonus_score = 50;
        g.state.stats.coins_collected = 3;
        drop_player(&mut g);

        let events = g.frame(FRAME, 1000);
        assert!(events.iter().any(|e| matches!(e, GameEvent::GameOver(_))));
        assert_eq!(g.state().phase, GamePhase::GameOver);
        assert_eq!(g.highscores().top_score(), Some(50));
        assert_eq!(HighScores::load(g.store()).top_score(), Some(50));
        assert!(!g.has_resume());

        let pet: PetState = g.store().load(PET_STORAGE_KEY).unwrap();
        assert_eq!(pet.coins, 3);
        assert_eq!(pet.counters.runs_played, 1);

        let submission = g.take_submission().unwrap();
        assert_eq!(submission.score, 50);
        assert!(g.take_submission().is_none());
        assert_eq!(g.last_summary().map(|s| s.score), Some(50));
    }

    #[test]
    fn test_restart_after_game_over_uses_new_seed() {
        let mut g = game();
        g.start_run(0);
        let first_seed = g.state().seed;
        drop_player(&mut g);
        g.frame(FRAME, 0);
        assert_eq!(g.state().phase, GamePhase::GameOver);

        press(&mut g, "Enter");
        g.frame(FRAME, 0);
        assert_eq!(g.state().phase, GamePhase::Playing);
        assert_ne!(g.state().seed, first_seed);
    }

    #[test]
    fn test_adult_pet_buffs_apply_to_run() {
        let mut g = game();
        let mut pet = PetState::new("p", "Blob", 0);
        pet.stage = crate::pet::PetStage::Adult;
        g.store().save(PET_STORAGE_KEY, &pet).unwrap();

        g.start_run(0);
        assert!(g.state().player.shield);
        assert_eq!(g.state().lives, g.tuning().base_lives + 1);
        assert!((g.state().score_multiplier - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_editor_round_trip() {
        let mut g = game();
        press(&mut g, "e");
        assert!(g.state().editing);

        press(&mut g, "2");
        let action = g.pointer_down(Vec2::new(200.0, 300.0), false);
        assert!(matches!(action, Some(EditorAction::Added(_))));
        g.pointer_up();
        press(&mut g, "s");
        press(&mut g, "e");
        assert!(!g.state().editing);

        let level: Level = g.store().load(LEVEL_STORAGE_KEY).unwrap();
        assert_eq!(level.platforms.len(), 2);

        // Next run plays the custom level untouched
        press(&mut g, "Enter");
        g.frame(FRAME, 0);
        assert_eq!(g.state().phase, GamePhase::Playing);
        assert_eq!(g.state().mode, GameMode::Custom);
        assert_eq!(g.state().platforms.len(), 2);
    }

    #[test]
    fn test_editor_refused_mid_run() {
        let mut g = game();
        g.start_run(0);
        assert!(!g.toggle_editor());
        assert!(!g.state().editing);
    }

    #[test]
    fn test_tilt_permission_denied_falls_back_to_touch() {
        let mut g = game();
        g.set_control_scheme(ControlScheme::Tilt);
        g.init_motion(SensorSupport::NeedsPermission);
        assert!(g.motion().is_listening());

        g.motion_permission_result(Ok(false));
        assert_eq!(g.settings().control_scheme, ControlScheme::Touch);
        assert_eq!(Settings::load(g.store()).control_scheme, ControlScheme::Touch);
        assert!(!g.motion().is_listening());
    }

    #[test]
    fn test_tilt_steers_when_selected() {
        let mut g = game();
        g.init_motion(SensorSupport::Available);
        g.set_control_scheme(ControlScheme::Tilt);
        for _ in 0..20 {
            g.orientation_sample(OrientationSample::from_gamma(30.0));
        }
        g.start_run(0);
        g.frame(FRAME * 4.0, 0);
        assert!(g.state().player.vel.x > 0.0);

        g.set_control_scheme(ControlScheme::Keyboard);
        assert!(!g.motion().is_listening());
    }

    #[test]
    fn test_small_tilt_inside_neutral_band_does_not_steer() {
        let mut g = game();
        g.init_motion(SensorSupport::Available);
        g.set_control_scheme(ControlScheme::Tilt);
        for _ in 0..20 {
            g.orientation_sample(OrientationSample::from_gamma(3.0));
        }
        assert!(g.motion().tilt() > 0.0);
        assert_eq!(g.motion().intent(), TiltIntent::Neutral);

        g.start_run(0);
        g.frame(FRAME * 4.0, 0);
        assert_eq!(g.state().player.vel.x, 0.0);
    }

    #[test]
    fn test_touch_joystick_steers_after_tilt_fallback() {
        let mut g = game();
        g.set_control_scheme(ControlScheme::Tilt);
        g.init_motion(SensorSupport::NeedsPermission);
        g.motion_permission_result(Err("NotAllowedError".to_string()));
        assert_eq!(g.settings().control_scheme, ControlScheme::Touch);

        g.start_run(0);
        let anchor = Vec2::new(100.0, 600.0);
        assert!(g.joystick_start(7, anchor));
        // A second finger on the left half is not the joystick
        assert!(!g.joystick_start(8, Vec2::new(50.0, 600.0)));
        assert!(!g.joystick_move(8, anchor + Vec2::new(90.0, 0.0)));
        assert!(g.joystick_move(7, anchor + Vec2::new(90.0, 0.0)));
        g.frame(FRAME * 4.0, 0);
        assert!(g.state().player.vel.x > 0.0);
        assert!(!g.controller.snapshot().jetpack);

        assert!(g.joystick_end(7));
        assert_eq!(g.controller.snapshot().tilt_x, 0.0);
        assert!(!g.joystick_end(7));
    }

    #[test]
    fn test_joystick_only_claims_left_half_in_touch_scheme() {
        let mut g = game();
        g.start_run(0);
        assert!(!g.joystick_start(1, Vec2::new(100.0, 600.0)));

        g.set_control_scheme(ControlScheme::Touch);
        assert!(!g.joystick_start(1, Vec2::new(VIEW_WIDTH * 0.75, 600.0)));
        assert!(g.joystick_start(1, Vec2::new(100.0, 600.0)));

        g.set_control_scheme(ControlScheme::Keyboard);
        assert!(!g.joystick_move(1, Vec2::new(200.0, 600.0)));
        assert_eq!(g.controller.snapshot().tilt_x, 0.0);
    }

    #[test]
    fn test_focus_lost_pauses() {
        let mut g = game();
        g.start_run(0);
        g.key_down("ArrowRight", false);
        g.focus_lost();
        g.frame(FRAME, 0);
        assert_eq!(g.state().phase, GamePhase::Paused);
        assert!(!g.controller.snapshot().right);
    }

    #[test]
    fn test_settings_jetpack_cost_flows_into_tuning() {
        let mut g = game();
        g.update_settings(Settings {
            jetpack_cost: 25.0,
            ..Settings::default()
        })
        .unwrap();
        assert_eq!(g.tuning().jetpack_ignition_cost, 25.0);
        let g2 = Game::new(ProfileStore::new(MemoryStore::new(), "x"), 1);
        assert_eq!(g2.tuning().jetpack_ignition_cost, 10.0);
    }
}
