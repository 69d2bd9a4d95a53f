use shared::protocol::{Highlights, OverlayRequest};

use crate::{
    dialog::DialogView,
    dispatcher::ActionSet,
    effect::{Effect, Effects},
};

/// Collaborators the overlay drives: the peer transport, the dialog presenter,
/// the flash banner, the details panel, and the canvas highlighter.
pub trait OverlayHost {
    fn send(&mut self, request: OverlayRequest);
    fn present(&mut self, dialog: &DialogView);
    fn flash(&mut self, message: &str);
    fn expose_actions(&mut self, actions: ActionSet);
    fn show_highlights(&mut self, highlights: &Highlights);
}

pub fn apply_effects<H: OverlayHost + ?Sized>(host: &mut H, effects: Effects) {
    for effect in effects {
        match effect {
            Effect::Send(request) => host.send(request),
            Effect::Flash(message) => host.flash(&message),
            Effect::Present(dialog) => host.present(&dialog),
            Effect::ExposeActions(actions) => host.expose_actions(actions),
            Effect::ShowHighlights(highlights) => host.show_highlights(&highlights),
        }
    }
}

/// Host that records every effect in order.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub effects: Effects,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<&OverlayRequest> {
        self.effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::Send(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    pub fn presented(&self) -> Vec<&DialogView> {
        self.effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::Present(dialog) => Some(dialog),
                _ => None,
            })
            .collect()
    }

    pub fn last_exposed(&self) -> Option<ActionSet> {
        self.effects.iter().rev().find_map(|effect| match effect {
            Effect::ExposeActions(actions) => Some(*actions),
            _ => None,
        })
    }

    pub fn clear(&mut self) {
        self.effects.clear();
    }
}

impl OverlayHost for RecordingHost {
    fn send(&mut self, request: OverlayRequest) {
        self.effects.push(Effect::Send(request));
    }

    fn present(&mut self, dialog: &DialogView) {
        self.effects.push(Effect::Present(dialog.clone()));
    }

    fn flash(&mut self, message: &str) {
        self.effects.push(Effect::Flash(message.to_string()));
    }

    fn expose_actions(&mut self, actions: ActionSet) {
        self.effects.push(Effect::ExposeActions(actions));
    }

    fn show_highlights(&mut self, highlights: &Highlights) {
        self.effects.push(Effect::ShowHighlights(highlights.clone()));
    }
}
