//! Overlay modules for the TUI.
//!
//! Overlays are modal UI components that temporarily take over keyboard input.
//! Each overlay owns its state, key handler, and render function.

pub mod auth_dialog;
pub mod render_utils;

pub use auth_dialog::{AuthOverlayState, Focus};
use crossterm::event::KeyEvent;
use ratatui::Frame;
use ratatui::layout::Rect;

use crate::effects::UiEffect;

/// Transition returned by overlay key handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayTransition {
    Stay,
    Close,
}

/// Update returned by overlay key handlers.
#[derive(Debug, PartialEq, Eq)]
pub struct OverlayUpdate {
    pub transition: OverlayTransition,
    pub effects: Vec<UiEffect>,
}

impl OverlayUpdate {
    fn new(transition: OverlayTransition) -> Self {
        Self {
            transition,
            effects: Vec::new(),
        }
    }

    pub fn stay() -> Self {
        Self::new(OverlayTransition::Stay)
    }

    pub fn close() -> Self {
        Self::new(OverlayTransition::Close)
    }

    #[must_use]
    pub fn with_ui_effects(mut self, effects: Vec<UiEffect>) -> Self {
        self.effects = effects;
        self
    }
}

#[derive(Debug)]
pub enum Overlay {
    Auth(AuthOverlayState),
}

impl Overlay {
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        match self {
            Overlay::Auth(dialog) => dialog.render(frame, area),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> OverlayUpdate {
        match self {
            Overlay::Auth(dialog) => dialog.handle_key(key),
        }
    }

    pub fn as_auth_mut(&mut self) -> Option<&mut AuthOverlayState> {
        match self {
            Overlay::Auth(dialog) => Some(dialog),
        }
    }
}

/// Routes a key to the active overlay, if any, and applies its transition.
///
/// Returns `None` when no overlay is open so the caller can handle the key.
pub fn handle_overlay_key(overlay: &mut Option<Overlay>, key: KeyEvent) -> Option<Vec<UiEffect>> {
    let update = overlay.as_mut()?.handle_key(key);
    if update.transition == OverlayTransition::Close {
        *overlay = None;
    }
    Some(update.effects)
}
