//! Level editor
//!
//! Click to select and drag platforms, add new ones, or delete them. The
//! editor edits `GameState::platforms` in place while `editing` is set; the
//! simulation tick leaves the world alone in that mode.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{GameMode, GamePhase, GameState, Platform, PlatformKind};

/// Active editor tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EditorTool {
    #[default]
    Move,
    Add,
    Delete,
}

/// In-progress drag
#[derive(Debug, Clone, Copy, PartialEq)]
struct Drag {
    platform_id: u32,
    /// Pointer position minus platform corner at grab time
    grab_offset: Vec2,
}

/// What a pointer press did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    Added(u32),
    Deleted(u32),
    Grabbed(u32),
    Deselected,
}

/// Editor interaction state
#[derive(Debug, Clone, Default)]
pub struct Editor {
    pub tool: EditorTool,
    /// Kind used for newly added platforms
    pub add_kind: PlatformKind,
    pub selected: Option<u32>,
    drag: Option<Drag>,
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the editor. Not allowed mid-run; pause first.
    pub fn enter(&mut self, state: &mut GameState) -> bool {
        if state.phase == GamePhase::Playing {
            return false;
        }
        state.editing = true;
        state.mode = GameMode::Custom;
        state.pickups.clear();
        self.selected = None;
        self.drag = None;
        log::info!("Editor opened ({} platforms)", state.platforms.len());
        true
    }

    pub fn exit(&mut self, state: &mut GameState) {
        state.editing = false;
        self.selected = None;
        self.drag = None;
        log::info!("Editor closed");
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Next kind for the Add tool
    pub fn cycle_add_kind(&mut self) {
        self.add_kind = match self.add_kind {
            PlatformKind::Static => PlatformKind::Moving,
            PlatformKind::Moving => PlatformKind::Breakable,
            PlatformKind::Breakable => PlatformKind::Spring,
            PlatformKind::Spring => PlatformKind::Hazard,
            PlatformKind::Hazard => PlatformKind::Static,
        };
    }

    /// Pointer pressed at a world position
    pub fn pointer_down(
        &mut self,
        state: &mut GameState,
        world: Vec2,
        add_modifier: bool,
    ) -> EditorAction {
        if add_modifier || self.tool == EditorTool::Add {
            let id = state.next_entity_id();
            let mut platform = Platform::new(id, world, self.add_kind);
            platform.pos = world - platform.size * 0.5;
            platform.initial_x = platform.pos.x;
            state.platforms.push(platform);
            self.selected = Some(id);
            self.drag = None;
            return EditorAction::Added(id);
        }

        // Topmost (most recently added) platform under the pointer
        let hit = state
            .platforms
            .iter()
            .rev()
            .find(|p| p.contains_point(world))
            .map(|p| (p.id, p.pos));

        match (self.tool, hit) {
            (EditorTool::Delete, Some((id, _))) => {
                state.platforms.retain(|p| p.id != id);
                if self.selected == Some(id) {
                    self.selected = None;
                }
                self.drag = None;
                EditorAction::Deleted(id)
            }
            (_, Some((id, pos))) => {
                self.selected = Some(id);
                self.drag = Some(Drag {
                    platform_id: id,
                    grab_offset: world - pos,
                });
                EditorAction::Grabbed(id)
            }
            (_, None) => {
                self.selected = None;
                self.drag = None;
                EditorAction::Deselected
            }
        }
    }

    /// Pointer moved; drags the grabbed platform. Returns whether anything moved.
    pub fn pointer_move(&mut self, state: &mut GameState, world: Vec2) -> bool {
        let Some(drag) = self.drag else {
            return false;
        };
        match state.platforms.iter_mut().find(|p| p.id == drag.platform_id) {
            Some(platform) => {
                platform.pos = world - drag.grab_offset;
                platform.initial_x = platform.pos.x;
                true
            }
            None => {
                // Platform vanished under us
                self.drag = None;
                false
            }
        }
    }

    pub fn pointer_up(&mut self) {
        self.drag = None;
    }

    /// Scroll the editor view vertically
    pub fn scroll(&self, state: &mut GameState, dy: f32) {
        state.camera.y += dy;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn editing_state() -> (GameState, Editor) {
        let mut state = GameState::new(1);
        let mut editor = Editor::new();
        assert!(editor.enter(&mut state));
        (state, editor)
    }

    #[test]
    fn test_cannot_enter_mid_run() {
        let mut state = GameState::new(1);
        state.phase = GamePhase::Playing;
        assert!(!Editor::new().enter(&mut state));
        assert!(!state.editing);
    }

    #[test]
    fn test_add_with_modifier() {
        let (mut state, mut editor) = editing_state();
        let before = state.platforms.len();
        let action = editor.pointer_down(&mut state, Vec2::new(200.0, 100.0), true);
        let EditorAction::Added(id) = action else {
            panic!("expected add, got {action:?}");
        };
        assert_eq!(state.platforms.len(), before + 1);
        let p = state.platform(id).unwrap();
        assert!(p.contains_point(Vec2::new(200.0, 100.0)));
        assert_eq!(editor.selected, Some(id));
    }

    #[test]
    fn test_drag_keeps_grab_offset_and_initial_x() {
        let (mut state, mut editor) = editing_state();
        let id = state.next_entity_id();
        state
            .platforms
            .push(Platform::new(id, Vec2::new(100.0, 100.0), PlatformKind::Moving));

        // Grab 10px into the platform
        let action = editor.pointer_down(&mut state, Vec2::new(110.0, 105.0), false);
        assert_eq!(action, EditorAction::Grabbed(id));
        assert!(editor.pointer_move(&mut state, Vec2::new(210.0, 55.0)));
        let p = state.platform(id).unwrap();
        assert_eq!(p.pos, Vec2::new(200.0, 50.0));
        assert_eq!(p.initial_x, 200.0);

        editor.pointer_up();
        assert!(!editor.pointer_move(&mut state, Vec2::new(0.0, 0.0)));
    }

    #[test]
    fn test_delete_tool_removes_hit() {
        let (mut state, mut editor) = editing_state();
        let id = state.next_entity_id();
        state
            .platforms
            .push(Platform::new(id, Vec2::new(100.0, 100.0), PlatformKind::Static));
        editor.tool = EditorTool::Delete;
        let action = editor.pointer_down(&mut state, Vec2::new(105.0, 105.0), false);
        assert_eq!(action, EditorAction::Deleted(id));
        assert!(state.platform(id).is_none());
    }

    #[test]
    fn test_click_empty_space_clears_selection() {
        let (mut state, mut editor) = editing_state();
        editor.selected = Some(99);
        let action = editor.pointer_down(&mut state, Vec2::new(5.0, -3000.0), false);
        assert_eq!(action, EditorAction::Deselected);
        assert_eq!(editor.selected, None);
    }

    #[test]
    fn test_double_delete_is_harmless() {
        let (mut state, mut editor) = editing_state();
        let id = state.next_entity_id();
        state
            .platforms
            .push(Platform::new(id, Vec2::new(100.0, 100.0), PlatformKind::Static));
        editor.tool = EditorTool::Delete;
        editor.pointer_down(&mut state, Vec2::new(105.0, 105.0), false);
        let count = state.platforms.len();
        let again = editor.pointer_down(&mut state, Vec2::new(105.0, 105.0), false);
        assert_eq!(again, EditorAction::Deselected);
        assert_eq!(state.platforms.len(), count);
    }
}
