//! Context menu shown on right-click over the video surface
//!
//! The controller is a two-state machine. A right-click always closes any
//! open menu and reopens it at the new pointer position within the same
//! update, so two menus never coexist.

use crate::engine::{PlaybackControl, PlaybackHandle};
use crate::types::Position;
use crate::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Playback speeds offered by the menu
pub const SPEED_OPTIONS: [f64; 4] = [0.5, 1.0, 1.5, 2.0];

/// Visibility of the context menu
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ContextMenuState {
    #[default]
    Hidden,
    Visible { position: Position },
}

impl ContextMenuState {
    pub fn is_visible(&self) -> bool {
        matches!(self, ContextMenuState::Visible { .. })
    }

    pub fn position(&self) -> Option<Position> {
        match self {
            ContextMenuState::Visible { position } => Some(*position),
            ContextMenuState::Hidden => None,
        }
    }
}

/// Right-click on the playback surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContextMenuEvent {
    position: Position,
    default_prevented: bool,
}

impl ContextMenuEvent {
    /// Event at page coordinates `(page_x, page_y)`
    pub fn new(page_x: f64, page_y: f64) -> Self {
        Self {
            position: Position::new(page_x, page_y),
            default_prevented: false,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Suppress the platform's own context menu
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Outcome of a controller update
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "transition", rename_all = "snake_case")]
pub enum MenuTransition {
    Opened { at: Position },
    /// An open menu was closed and opened again at a new position
    Reopened { from: Position, to: Position },
    Hidden,
    Unchanged,
}

/// Owns the context menu state for one player
#[derive(Debug, Default)]
pub struct ContextMenuController {
    state: ContextMenuState,
}

impl ContextMenuController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ContextMenuState {
        self.state
    }

    pub fn is_visible(&self) -> bool {
        self.state.is_visible()
    }

    /// Handle a right-click on the surface
    pub fn on_context_menu(&mut self, event: &mut ContextMenuEvent) -> MenuTransition {
        event.prevent_default();

        let previous = std::mem::replace(&mut self.state, ContextMenuState::Hidden);
        let to = event.position();
        self.state = ContextMenuState::Visible { position: to };

        let transition = match previous.position() {
            Some(from) => MenuTransition::Reopened { from, to },
            None => MenuTransition::Opened { at: to },
        };
        debug!(?transition, "Context menu");
        transition
    }

    /// Hide the menu; hiding an already hidden menu is allowed
    pub fn hide(&mut self) -> MenuTransition {
        let was_visible = self.state.is_visible();
        self.state = ContextMenuState::Hidden;
        if was_visible {
            debug!("Context menu hidden");
            MenuTransition::Hidden
        } else {
            MenuTransition::Unchanged
        }
    }
}

/// Command offered by the context menu
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "value", rename_all = "snake_case")]
pub enum MenuAction {
    ToggleLoop,
    TogglePip,
    ToggleMute,
    SetSpeed(f64),
}

impl MenuAction {
    /// Run the command against an engine
    pub fn apply(&self, control: &mut dyn PlaybackControl) {
        match *self {
            MenuAction::ToggleLoop => {
                let looping = control.looping();
                control.set_looping(!looping);
            }
            MenuAction::TogglePip => {
                let pip = control.pip();
                control.set_pip(!pip);
            }
            MenuAction::ToggleMute => {
                let muted = control.muted();
                control.set_muted(!muted);
            }
            MenuAction::SetSpeed(speed) => control.set_speed(speed),
        }
    }

    pub fn label(&self) -> String {
        match self {
            MenuAction::ToggleLoop => "Loop".to_string(),
            MenuAction::TogglePip => "Picture in picture".to_string(),
            MenuAction::ToggleMute => "Mute".to_string(),
            MenuAction::SetSpeed(speed) if *speed == 1.0 => "Normal speed".to_string(),
            MenuAction::SetSpeed(speed) => format!("{}x speed", speed),
        }
    }
}

/// One row of the rendered menu
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuItem {
    pub action: MenuAction,
    pub label: String,
    pub checked: bool,
}

/// Rendered context menu, read from the live engine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContextMenuView {
    pub position: Position,
    pub items: Vec<MenuItem>,
}

impl ContextMenuView {
    /// Build the menu at `position` from the engine behind `handle`
    pub fn build(position: Position, handle: &PlaybackHandle) -> Result<Self> {
        let items = handle.read(|control| {
            let mut items = vec![
                item(MenuAction::ToggleLoop, control.looping()),
                item(MenuAction::TogglePip, control.pip()),
                item(MenuAction::ToggleMute, control.muted()),
            ];
            let current = control.speed();
            items.extend(
                SPEED_OPTIONS
                    .iter()
                    .map(|s| item(MenuAction::SetSpeed(*s), (current - s).abs() < f64::EPSILON)),
            );
            items
        })?;

        Ok(Self { position, items })
    }
}

fn item(action: MenuAction, checked: bool) -> MenuItem {
    MenuItem {
        action,
        label: action.label(),
        checked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SimulatedEngine;
    use crate::engine::EngineFactory;
    use crate::options::PlaybackOptions;
    use crate::source::PlaybackSource;

    fn mounted_handle() -> (PlaybackHandle, SimulatedEngine) {
        let probe = SimulatedEngine::new();
        let source = PlaybackSource::resolve("https://v/a.mp4", "", &crate::cdn::NoCdn);
        let engine = probe.create(&source, &PlaybackOptions::default()).unwrap();
        let handle = PlaybackHandle::new();
        handle.populate(engine).unwrap();
        (handle, probe)
    }

    #[test]
    fn test_right_click_opens() {
        let mut menu = ContextMenuController::new();
        let mut event = ContextMenuEvent::new(120.0, 40.0);

        let transition = menu.on_context_menu(&mut event);

        assert!(event.is_default_prevented());
        assert_eq!(transition, MenuTransition::Opened { at: Position::new(120.0, 40.0) });
        assert_eq!(menu.state().position(), Some(Position::new(120.0, 40.0)));
    }

    #[test]
    fn test_right_click_while_open_moves_menu() {
        let mut menu = ContextMenuController::new();
        menu.on_context_menu(&mut ContextMenuEvent::new(1.0, 2.0));

        let transition = menu.on_context_menu(&mut ContextMenuEvent::new(3.0, 4.0));

        assert_eq!(
            transition,
            MenuTransition::Reopened {
                from: Position::new(1.0, 2.0),
                to: Position::new(3.0, 4.0)
            }
        );
        assert_eq!(menu.state(), ContextMenuState::Visible { position: Position::new(3.0, 4.0) });
    }

    #[test]
    fn test_hide_is_idempotent() {
        let mut menu = ContextMenuController::new();
        assert_eq!(menu.hide(), MenuTransition::Unchanged);
        assert_eq!(menu.state(), ContextMenuState::Hidden);

        menu.on_context_menu(&mut ContextMenuEvent::new(0.0, 0.0));
        assert_eq!(menu.hide(), MenuTransition::Hidden);
        assert_eq!(menu.hide(), MenuTransition::Unchanged);
        assert!(!menu.is_visible());
    }

    #[test]
    fn test_menu_view_reflects_engine() {
        let (handle, _probe) = mounted_handle();
        handle.with(|c| {
            c.set_looping(true);
            c.set_speed(1.5);
        })
        .unwrap();

        let view = ContextMenuView::build(Position::new(5.0, 5.0), &handle).unwrap();

        assert_eq!(view.items.len(), 3 + SPEED_OPTIONS.len());
        assert!(view.items[0].checked);
        assert!(!view.items[1].checked);
        let checked_speeds: Vec<_> = view
            .items
            .iter()
            .filter(|i| matches!(i.action, MenuAction::SetSpeed(_)) && i.checked)
            .map(|i| i.label.clone())
            .collect();
        assert_eq!(checked_speeds, vec!["1.5x speed".to_string()]);
    }

    #[test]
    fn test_actions_toggle_engine_state() {
        let (handle, probe) = mounted_handle();

        handle.with(|c| MenuAction::ToggleMute.apply(c)).unwrap();
        handle.with(|c| MenuAction::TogglePip.apply(c)).unwrap();
        handle.with(|c| MenuAction::SetSpeed(2.0).apply(c)).unwrap();

        assert!(probe.muted());
        assert!(probe.pip());
        assert_eq!(probe.speed(), 2.0);

        handle.with(|c| MenuAction::ToggleMute.apply(c)).unwrap();
        assert!(!probe.muted());
    }

    #[test]
    fn test_menu_view_requires_engine() {
        let handle = PlaybackHandle::new();
        assert!(ContextMenuView::build(Position::default(), &handle).is_err());
    }

    #[test]
    fn test_menu_action_wire_format() {
        let json = serde_json::to_value(MenuAction::SetSpeed(1.5)).unwrap();
        assert_eq!(json, serde_json::json!({ "action": "set_speed", "value": 1.5 }));

        let action: MenuAction = serde_json::from_str(r#"{ "action": "toggle_loop" }"#).unwrap();
        assert_eq!(action, MenuAction::ToggleLoop);
    }
}
