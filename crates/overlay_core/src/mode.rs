use shared::{
    domain::{DisplayMode, ElementId},
    protocol::OverlayRequest,
};
use tracing::{debug, info};

use crate::effect::{Effect, Effects};

/// The element under the pointer, as reported by the canvas mouse-over hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverTarget {
    pub id: ElementId,
}

impl HoverTarget {
    pub fn new(id: impl Into<ElementId>) -> Self {
        Self { id: id.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyActive,
}

/// Owns the single active display mode. At most one mode is active; starting a
/// different mode supersedes the current one without an explicit stop.
#[derive(Debug, Default)]
pub struct ModeController {
    current: Option<DisplayMode>,
}

impl ModeController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&DisplayMode> {
        self.current.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    pub fn start_display(&mut self, mode: DisplayMode, effects: &mut Effects) -> StartOutcome {
        if self.current.as_ref() == Some(&mode) {
            debug!(%mode, "overlay: already in display mode");
            return StartOutcome::AlreadyActive;
        }

        if let Some(previous) = self.current.replace(mode.clone()) {
            debug!(%previous, %mode, "overlay: display mode superseded");
        }
        info!(%mode, "overlay: display mode started");
        effects.push(Effect::Flash(format!("Starting display mode: {mode}")));
        effects.push(Effect::Send(OverlayRequest::DisplayStart { mode }));
        StartOutcome::Started
    }

    /// Mirrors the hovered element to the peer; `None` means the pointer left its target.
    pub fn update_display(&mut self, target: Option<&HoverTarget>, effects: &mut Effects) -> bool {
        if self.current.is_none() {
            return false;
        }

        let id = target.map(|t| t.id.clone()).unwrap_or_default();
        effects.push(Effect::Send(OverlayRequest::DisplayUpdate { id }));
        true
    }

    pub fn stop_display(&mut self, effects: &mut Effects) -> bool {
        let Some(mode) = self.current.take() else {
            return false;
        };

        info!(%mode, "overlay: display mode stopped");
        effects.push(Effect::Flash("Canceling display mode".to_string()));
        effects.push(Effect::Send(OverlayRequest::DisplayStop));
        true
    }

    pub fn on_deactivate(&mut self, effects: &mut Effects) -> bool {
        self.stop_display(effects)
    }
}

#[cfg(test)]
#[path = "tests/mode_tests.rs"]
mod tests;
