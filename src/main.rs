//! Sky Hopper entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::{JsFuture, spawn_local};
    use web_sys::{
        CanvasRenderingContext2d, DeviceOrientationEvent, HtmlCanvasElement, KeyboardEvent,
        PointerEvent,
    };

    use sky_hopper::consts::*;
    use sky_hopper::leaderboard::{
        FetchTransport, ScoreSubmission, flush_pending, submit_global_score,
    };
    use sky_hopper::persistence::{GUEST_PROFILE, LocalStorageStore, ProfileStore};
    use sky_hopper::platform::motion::{OrientationSample, Permission, SensorSupport};
    use sky_hopper::sim::{GamePhase, PickupKind, PlatformKind};
    use sky_hopper::{ControlScheme, Game, now_ms};

    /// Used when the canvas has no `data-api` attribute
    const DEFAULT_API_BASE: &str = "/api";

    /// Browser-side wrapper around the game
    struct Host {
        game: Game<LocalStorageStore>,
        canvas: HtmlCanvasElement,
        ctx: CanvasRenderingContext2d,
        last_time: f64,
        api_base: String,
        sensor: SensorSupport,
        permission_requested: bool,
    }

    impl Host {
        fn update(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                ((time - self.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            self.last_time = time;

            for event in self.game.frame(dt, now_ms()) {
                log::debug!("{event:?}");
            }
            if let Some(submission) = self.game.take_submission() {
                submit_in_background(&self.api_base, self.game.store().profile(), submission);
            }
        }

        /// Canvas-space pointer position in logical view units
        fn to_view(&self, event: &PointerEvent) -> Vec2 {
            let rect = self.canvas.get_bounding_client_rect();
            let sx = VIEW_WIDTH as f64 / rect.width().max(1.0);
            let sy = VIEW_HEIGHT as f64 / rect.height().max(1.0);
            Vec2::new(
                ((event.client_x() as f64 - rect.left()) * sx) as f32,
                ((event.client_y() as f64 - rect.top()) * sy) as f32,
            )
        }

        /// Flat rectangles only
        fn render(&self) {
            let ctx = &self.ctx;
            let state = self.game.state();
            let camera = &state.camera;

            ctx.set_fill_style_str("#14162b");
            ctx.fill_rect(0.0, 0.0, VIEW_WIDTH as f64, VIEW_HEIGHT as f64);

            for p in &state.platforms {
                if p.broken || !camera.is_relevant(p.top(), p.bottom(), 0.0) {
                    continue;
                }
                let color = match p.kind {
                    PlatformKind::Static => "#5fcf80",
                    PlatformKind::Moving => "#5fa8cf",
                    PlatformKind::Breakable => "#c9a25f",
                    PlatformKind::Spring => "#cf5fc4",
                    PlatformKind::Hazard => "#e04848",
                };
                let selected = state.editing && self.game.editor().selected == Some(p.id);
                ctx.set_fill_style_str(if selected { "#ffffff" } else { color });
                fill_world_rect(ctx, camera.world_to_screen(p.pos), p.size * camera.zoom);
            }

            for pickup in &state.pickups {
                ctx.set_fill_style_str(match pickup.kind {
                    PickupKind::Coin => "#f2d94e",
                    PickupKind::Fuel => "#4ef2e1",
                });
                fill_world_rect(
                    ctx,
                    camera.world_to_screen(pickup.pos),
                    Vec2::splat(PICKUP_SIZE * camera.zoom),
                );
            }

            let player = &state.player;
            ctx.set_fill_style_str(if player.invulnerable() {
                "#ffb3b3"
            } else if player.jetpack_active {
                "#ff9a3c"
            } else {
                "#f0f0f0"
            });
            fill_world_rect(ctx, camera.world_to_screen(player.pos), player.size() * camera.zoom);

            self.render_hud();
        }

        fn render_hud(&self) {
            let ctx = &self.ctx;
            let state = self.game.state();
            ctx.set_fill_style_str("#ffffff");
            ctx.set_font("16px monospace");

            let line = if state.editing {
                let editor = self.game.editor();
                format!("EDITOR  tool {:?}  kind {:?}", editor.tool, editor.add_kind)
            } else {
                format!(
                    "{}  {:.0}m  fuel {:.0}  lives {}",
                    state.score, state.altitude, state.player.fuel, state.lives
                )
            };
            let _ = ctx.fill_text(&line, 10.0, 24.0);

            let prompt = match state.phase {
                GamePhase::NotPlaying if !state.editing => Some("Enter / tap to start"),
                GamePhase::Paused => Some("Paused - Esc to resume"),
                GamePhase::GameOver => Some("Game over - Enter to retry"),
                _ => None,
            };
            if let Some(prompt) = prompt {
                let _ = ctx.fill_text(prompt, 10.0, VIEW_HEIGHT as f64 / 2.0);
            }
            if self.game.settings().show_fps {
                let _ = ctx.fill_text(&format!("{:.1}s", state.time_ms / 1000.0), 10.0, 44.0);
            }
        }
    }

    fn fill_world_rect(ctx: &CanvasRenderingContext2d, screen: Vec2, size: Vec2) {
        ctx.fill_rect(screen.x as f64, screen.y as f64, size.x as f64, size.y as f64);
    }

    fn submit_in_background(api_base: &str, profile: &str, submission: ScoreSubmission) {
        let api_base = api_base.to_string();
        let profile = profile.to_string();
        spawn_local(async move {
            let store = match LocalStorageStore::new() {
                Ok(backend) => ProfileStore::new(backend, profile),
                Err(e) => {
                    log::warn!("Leaderboard storage unavailable: {e}");
                    return;
                }
            };
            let transport = FetchTransport::new(api_base);
            let outcome = submit_global_score(&store, &transport, submission).await;
            log::info!("Score submission: {outcome:?}");
        });
    }

    /// Probe for the orientation API and the iOS-style permission gate
    fn sensor_support(window: &web_sys::Window) -> SensorSupport {
        let ctor = js_sys::Reflect::get(window, &JsValue::from_str("DeviceOrientationEvent"))
            .ok()
            .filter(|c| !c.is_undefined());
        match ctor {
            None => SensorSupport::Unavailable,
            Some(ctor) => {
                let gated = js_sys::Reflect::get(&ctor, &JsValue::from_str("requestPermission"))
                    .map(|f| f.is_function())
                    .unwrap_or(false);
                if gated {
                    SensorSupport::NeedsPermission
                } else {
                    SensorSupport::Available
                }
            }
        }
    }

    /// `DeviceOrientationEvent.requestPermission()`; must run inside a user gesture
    async fn request_motion_permission() -> Result<bool, String> {
        let js = |e: JsValue| format!("{e:?}");
        let window = web_sys::window().ok_or_else(|| "no window".to_string())?;
        let ctor = js_sys::Reflect::get(&window, &JsValue::from_str("DeviceOrientationEvent"))
            .map_err(js)?;
        let request: js_sys::Function =
            js_sys::Reflect::get(&ctor, &JsValue::from_str("requestPermission"))
                .map_err(js)?
                .dyn_into()
                .map_err(|_| "requestPermission is not a function".to_string())?;
        let promise: js_sys::Promise = request
            .call0(&ctor)
            .map_err(js)?
            .dyn_into()
            .map_err(|_| "requestPermission did not return a promise".to_string())?;
        let answer = JsFuture::from(promise).await.map_err(js)?;
        Ok(answer.as_string().as_deref() == Some("granted"))
    }

    fn maybe_request_permission(game: &Rc<RefCell<Host>>) {
        {
            let mut h = game.borrow_mut();
            let wants_tilt = h.game.settings().control_scheme == ControlScheme::Tilt;
            if !wants_tilt
                || h.permission_requested
                || h.sensor != SensorSupport::NeedsPermission
                || h.game.motion().permission() != Permission::Prompt
            {
                return;
            }
            h.permission_requested = true;
        }
        let game = game.clone();
        spawn_local(async move {
            let result = request_motion_permission().await;
            game.borrow_mut().game.motion_permission_result(result);
        });
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Sky Hopper starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;
        canvas.set_width(VIEW_WIDTH as u32);
        canvas.set_height(VIEW_HEIGHT as u32);
        // Keep touch drags from scrolling the page
        canvas.style().set_property("touch-action", "none")?;
        let api_base = canvas
            .get_attribute("data-api")
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into()?;

        let backend = LocalStorageStore::new().map_err(|e| JsValue::from_str(&e.to_string()))?;
        let store = ProfileStore::new(backend, GUEST_PROFILE);

        let seed = js_sys::Date::now() as u64;
        let mut game = Game::new(store, seed);
        let sensor = sensor_support(&window);
        game.init_motion(sensor);
        if game.has_resume() && game.continue_saved() {
            log::info!("Resumed saved run");
        }
        log::info!("Game initialized with seed: {seed}");

        let host = Rc::new(RefCell::new(Host {
            game,
            canvas: canvas.clone(),
            ctx,
            last_time: 0.0,
            api_base: api_base.clone(),
            sensor,
            permission_requested: false,
        }));

        setup_input_handlers(&canvas, host.clone())?;
        setup_auto_pause(host.clone())?;

        // Retry anything queued while offline
        {
            let profile = host.borrow().game.store().profile().to_string();
            spawn_local(async move {
                if let Ok(backend) = LocalStorageStore::new() {
                    let store = ProfileStore::new(backend, profile);
                    let sent = flush_pending(&store, &FetchTransport::new(api_base)).await;
                    if sent > 0 {
                        log::info!("Flushed {sent} queued scores");
                    }
                }
            });
        }

        // Start game loop
        request_animation_frame(host);

        log::info!("Sky Hopper running!");
        Ok(())
    }

    fn setup_input_handlers(
        canvas: &HtmlCanvasElement,
        game: Rc<RefCell<Host>>,
    ) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;

        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = event.key();
                if matches!(key.as_str(), " " | "ArrowUp" | "ArrowDown" | "ArrowLeft" | "ArrowRight") {
                    event.prevent_default();
                }
                game.borrow_mut().game.key_down(&key, event.repeat());
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                game.borrow_mut().game.key_up(&event.key());
            });
            window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Pointer (mouse and touch): jetpack in play, editing in the editor.
        // Touch scheme claims left-half presses for the virtual joystick.
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                event.prevent_default();
                maybe_request_permission(&game);
                let mut h = game.borrow_mut();
                let pos = h.to_view(&event);
                let idle = matches!(
                    h.game.state().phase,
                    GamePhase::NotPlaying | GamePhase::GameOver
                );
                if idle && !h.game.state().editing {
                    h.game.select();
                    return;
                }
                if h.game.joystick_start(event.pointer_id(), pos) {
                    return;
                }
                if let Some(action) = h.game.pointer_down(pos, event.shift_key()) {
                    log::debug!("Editor: {action:?}");
                }
            });
            canvas.add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let mut h = game.borrow_mut();
                let pos = h.to_view(&event);
                if !h.game.joystick_move(event.pointer_id(), pos) {
                    h.game.pointer_move(pos);
                }
            });
            canvas.add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        for name in ["pointerup", "pointercancel", "pointerleave"] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                let mut h = game.borrow_mut();
                if !h.game.joystick_end(event.pointer_id()) {
                    h.game.pointer_up();
                }
            });
            canvas.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        // Device orientation
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: DeviceOrientationEvent| {
                game.borrow_mut().game.orientation_sample(OrientationSample {
                    alpha: event.alpha(),
                    beta: event.beta(),
                    gamma: event.gamma(),
                    absolute: event.absolute(),
                });
            });
            window.add_event_listener_with_callback(
                "deviceorientation",
                closure.as_ref().unchecked_ref(),
            )?;
            closure.forget();
        }
        Ok(())
    }

    fn request_animation_frame(game: Rc<RefCell<Host>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Host>>, time: f64) {
        {
            let mut h = game.borrow_mut();
            h.update(time);
            h.render();
        }

        request_animation_frame(game);
    }

    fn setup_auto_pause(game: Rc<RefCell<Host>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    game.borrow_mut().game.focus_lost();
                }
            });
            document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            )?;
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().game.focus_lost();
            });
            window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    if let Err(e) = wasm_game::run().await {
        log::error!("Startup failed: {e:?}");
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Sky Hopper (native) starting...");
    log::info!("Native mode runs a headless autopilot; serve the wasm build to play");
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless demo: one autopiloted run against in-memory storage
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use sky_hopper::leaderboard::{OfflineTransport, submit_global_score};
    use sky_hopper::persistence::{MemoryStore, ProfileStore};
    use sky_hopper::sim::{GameEvent, GamePhase, PlatformKind};
    use sky_hopper::{Game, now_ms};

    const FRAME: f32 = 1.0 / 60.0;
    const MAX_FRAMES: u32 = 60 * 120;

    /// Steer under the nearest safe platform above and keep jumping
    fn autopilot(game: &mut Game<MemoryStore>, frame: u32) {
        let state = game.state();
        let me = state.player.center();
        let target = state
            .platforms
            .iter()
            .filter(|p| p.kind != PlatformKind::Hazard && p.collidable() && p.top() < state.player.feet())
            .min_by(|a, b| b.top().total_cmp(&a.top()))
            .map(|p| p.pos.x + p.size.x / 2.0);
        let axis = target.map(|x| ((x - me.x) / 40.0).clamp(-1.0, 1.0));
        game.set_joystick(axis);

        if frame % 20 == 0 {
            game.key_down(" ", false);
        } else if frame % 20 == 1 {
            game.key_up(" ");
        }
    }

    pub fn run() {
        let seed = now_ms() as u64;
        let mut game = Game::new(ProfileStore::in_memory(), seed);
        game.set_player_name("Autopilot");
        if let Err(e) = game.with_pets(|pets, store| pets.adopt(store, "Hopper", now_ms())) {
            log::warn!("No pet for this run: {e}");
        }

        game.select();
        let mut frame = 0;
        while frame < MAX_FRAMES {
            autopilot(&mut game, frame);
            for event in game.frame(FRAME, now_ms()) {
                match event {
                    GameEvent::HyperJump { combo } => log::info!("Hyper jump x{combo}"),
                    GameEvent::Damaged { lives_left } => log::info!("Hit! {lives_left} lives left"),
                    other => log::debug!("{other:?}"),
                }
            }
            if game.state().phase == GamePhase::GameOver {
                break;
            }
            frame += 1;
        }

        match game.last_summary() {
            Some(summary) => println!(
                "Run over after {:.1}s: score {} altitude {:.0}m coins {} max combo {}",
                summary.elapsed_secs,
                summary.score,
                summary.altitude,
                summary.coins_collected,
                summary.max_combo
            ),
            None => println!(
                "Still alive after {MAX_FRAMES} frames: score {} altitude {:.0}m",
                game.state().score,
                game.state().altitude
            ),
        }

        if let Some(submission) = game.take_submission() {
            let outcome =
                pollster::block_on(submit_global_score(game.store(), &OfflineTransport, submission));
            println!(
                "Leaderboard: local rank {:?}, offline {}",
                outcome.rank, outcome.offline
            );
        }
    }
}
