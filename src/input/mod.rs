//! Per-frame input aggregation
//!
//! `InputController` collects raw events (keys, pointer, joystick, tilt) as
//! they arrive and produces one `Input` snapshot per simulation step. While
//! the editor is open, pointer events are routed to it instead.

use glam::Vec2;
use std::collections::HashSet;

use crate::finite_or_zero;
use crate::sim::{Editor, EditorAction, EditorTool, GameState};

/// Snapshot consumed by `sim::tick`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Input {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Jetpack thrust requested (key or pointer held)
    pub jetpack: bool,
    /// Jump pressed since the last step
    pub jump_intent: bool,
    /// Simulation time (ms) of the latest jump press
    pub jump_pressed_time: Option<f64>,
    /// Analog steering from joystick or tilt, in [-1, 1]
    pub tilt_x: f32,
    pub menu_select: bool,
    pub menu_back: bool,
    pub pause: bool,
}

impl Input {
    /// Effective steering in [-1, 1]. Held keys win over analog input.
    pub fn horizontal_axis(&self) -> f32 {
        if self.left || self.right {
            return self.right as i8 as f32 - self.left as i8 as f32;
        }
        finite_or_zero(self.tilt_x).clamp(-1.0, 1.0)
    }
}

/// Logical meaning of a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Left,
    Right,
    Jump,
    Down,
    Jetpack,
    Pause,
    Select,
    ToggleEditor,
    Calibrate,
    // Editor only
    Tool(EditorTool),
    SaveLevel,
    CycleKind,
    ScrollUp,
    ScrollDown,
}

/// Map a normalized key name to an action for the current mode
pub fn map_key(key: &str, editing: bool) -> Option<KeyAction> {
    if editing {
        let action = match key {
            "1" => Some(KeyAction::Tool(EditorTool::Move)),
            "2" => Some(KeyAction::Tool(EditorTool::Add)),
            "3" => Some(KeyAction::Tool(EditorTool::Delete)),
            "s" => Some(KeyAction::SaveLevel),
            "k" => Some(KeyAction::CycleKind),
            "ArrowUp" | "w" => Some(KeyAction::ScrollUp),
            "ArrowDown" => Some(KeyAction::ScrollDown),
            "e" | "Escape" => Some(KeyAction::ToggleEditor),
            _ => None,
        };
        return action;
    }
    match key {
        "ArrowLeft" | "a" => Some(KeyAction::Left),
        "ArrowRight" | "d" => Some(KeyAction::Right),
        "ArrowUp" | "w" | " " => Some(KeyAction::Jump),
        "ArrowDown" | "s" => Some(KeyAction::Down),
        "Shift" | "j" => Some(KeyAction::Jetpack),
        "Escape" | "p" => Some(KeyAction::Pause),
        "Enter" => Some(KeyAction::Select),
        "e" => Some(KeyAction::ToggleEditor),
        "c" => Some(KeyAction::Calibrate),
        _ => None,
    }
}

/// Requests the controller can't satisfy on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputCommand {
    ToggleEditor,
    SaveLevel,
    Calibrate,
}

/// Editor scroll per key press (world px)
const EDITOR_SCROLL_STEP: f32 = 60.0;

/// Collects input events between simulation steps
#[derive(Debug, Default)]
pub struct InputController {
    held_left: bool,
    held_right: bool,
    held_up: bool,
    held_down: bool,
    key_jetpack: bool,
    pointer_jetpack: bool,
    /// Keys currently down, for repeat filtering
    down_keys: HashSet<String>,
    jump_pressed_time: Option<f64>,
    joystick: Option<f32>,
    tilt: f32,
    // One-shot edges, cleared by `end_frame`
    jump_edge: bool,
    select_edge: bool,
    back_edge: bool,
    pause_edge: bool,
}

impl InputController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key pressed. `time_ms` is the simulation clock at the press.
    pub fn key_down(
        &mut self,
        key: &str,
        repeat: bool,
        time_ms: f64,
        state: &mut GameState,
        editor: &mut Editor,
    ) -> Option<InputCommand> {
        // Only the first down of a physical press counts
        if repeat || !self.down_keys.insert(key.to_string()) {
            return None;
        }

        match map_key(key, state.editing)? {
            KeyAction::Left => self.held_left = true,
            KeyAction::Right => self.held_right = true,
            KeyAction::Down => self.held_down = true,
            KeyAction::Jump => {
                self.held_up = true;
                self.jump_edge = true;
                self.jump_pressed_time = Some(time_ms);
            }
            KeyAction::Jetpack => self.key_jetpack = true,
            KeyAction::Pause => {
                self.pause_edge = true;
                self.back_edge = true;
            }
            KeyAction::Select => self.select_edge = true,
            KeyAction::ToggleEditor => return Some(InputCommand::ToggleEditor),
            KeyAction::Calibrate => return Some(InputCommand::Calibrate),
            KeyAction::Tool(tool) => {
                editor.tool = tool;
                log::debug!("Editor tool: {tool:?}");
            }
            KeyAction::SaveLevel => return Some(InputCommand::SaveLevel),
            KeyAction::CycleKind => editor.cycle_add_kind(),
            KeyAction::ScrollUp => editor.scroll(state, -EDITOR_SCROLL_STEP),
            KeyAction::ScrollDown => editor.scroll(state, EDITOR_SCROLL_STEP),
        }
        None
    }

    /// Key released. Held state clears regardless of mode.
    pub fn key_up(&mut self, key: &str) {
        self.down_keys.remove(key);
        match map_key(key, false) {
            Some(KeyAction::Left) => self.held_left = false,
            Some(KeyAction::Right) => self.held_right = false,
            Some(KeyAction::Jump) => self.held_up = false,
            Some(KeyAction::Down) => self.held_down = false,
            Some(KeyAction::Jetpack) => self.key_jetpack = false,
            _ => {}
        }
    }

    /// Pointer/touch pressed at a screen position
    pub fn pointer_down(
        &mut self,
        screen: Vec2,
        add_modifier: bool,
        state: &mut GameState,
        editor: &mut Editor,
    ) -> Option<EditorAction> {
        if state.editing {
            let world = state.camera.screen_to_world(screen);
            return Some(editor.pointer_down(state, world, add_modifier));
        }
        self.pointer_jetpack = true;
        None
    }

    /// Pointer moved; drags in the editor. Returns whether a platform moved.
    pub fn pointer_move(&mut self, screen: Vec2, state: &mut GameState, editor: &mut Editor) -> bool {
        if !state.editing || !editor.is_dragging() {
            return false;
        }
        let world = state.camera.screen_to_world(screen);
        editor.pointer_move(state, world)
    }

    pub fn pointer_up(&mut self, editor: &mut Editor) {
        editor.pointer_up();
        self.pointer_jetpack = false;
    }

    /// On-screen joystick deflection; `None` when released
    pub fn set_joystick(&mut self, axis: Option<f32>) {
        self.joystick = axis.map(|a| finite_or_zero(a).clamp(-1.0, 1.0));
    }

    /// Smoothed tilt from the motion manager
    pub fn set_tilt(&mut self, tilt: f32) {
        self.tilt = finite_or_zero(tilt).clamp(-1.0, 1.0);
    }

    /// Inject menu edges from UI buttons
    pub fn press_select(&mut self) {
        self.select_edge = true;
    }

    pub fn press_pause(&mut self) {
        self.pause_edge = true;
    }

    /// Forget everything held (window lost focus)
    pub fn release_all(&mut self) {
        self.held_left = false;
        self.held_right = false;
        self.held_up = false;
        self.held_down = false;
        self.key_jetpack = false;
        self.pointer_jetpack = false;
        self.joystick = None;
        self.down_keys.clear();
    }

    /// The input for the next simulation step
    pub fn snapshot(&self) -> Input {
        Input {
            left: self.held_left,
            right: self.held_right,
            up: self.held_up,
            down: self.held_down,
            jetpack: self.key_jetpack || self.pointer_jetpack,
            jump_intent: self.jump_edge,
            jump_pressed_time: self.jump_pressed_time,
            tilt_x: self.joystick.unwrap_or(self.tilt),
            menu_select: self.select_edge,
            menu_back: self.back_edge,
            pause: self.pause_edge,
        }
    }

    /// Clear one-shot inputs after a step consumed them
    pub fn end_frame(&mut self) {
        self.jump_edge = false;
        self.select_edge = false;
        self.back_edge = false;
        self.pause_edge = false;
    }

    /// Drop a stale jump press (new run)
    pub fn reset_jump(&mut self) {
        self.jump_pressed_time = None;
        self.jump_edge = false;
    }
}
