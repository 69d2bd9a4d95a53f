//! The topology overlay: binds keys, detail buttons, and canvas hooks to the mode
//! controller, the dialog sequencer, and the dispatcher.

use shared::{domain::DisplayMode, protocol::OverlayEvent};
use tracing::{debug, info, warn};

use crate::{
    dialog::{list_dialog_view, simple_dialog_view, ActionKind, ChainInput, DialogSequencer},
    dispatcher::{ActionDispatcher, DetailButton, Route},
    effect::{Effect, Effects},
    host::{apply_effects, OverlayHost},
    mode::{HoverTarget, ModeController},
    selection::SelectionContext,
};

pub const OVERLAY_ID: &str = "ui-ref-overlay";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    StopDisplay,
    StartDisplay(&'static str),
    ListDialog,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    pub key: char,
    pub action: KeyAction,
    pub tooltip: &'static str,
}

/// In toolbar order.
pub const KEY_BINDINGS: [KeyBinding; 4] = [
    KeyBinding {
        key: '0',
        action: KeyAction::StopDisplay,
        tooltip: "Cancel Display Mode",
    },
    KeyBinding {
        key: 'V',
        action: KeyAction::StartDisplay(DisplayMode::MOUSE),
        tooltip: "Start Mouse Mode",
    },
    KeyBinding {
        key: 'F',
        action: KeyAction::StartDisplay(DisplayMode::LINK),
        tooltip: "Start Link Mode",
    },
    KeyBinding {
        key: 'G',
        action: KeyAction::ListDialog,
        tooltip: "Uses the G key",
    },
];

pub fn binding_for(key: char) -> Option<&'static KeyBinding> {
    let key = key.to_ascii_uppercase();
    KEY_BINDINGS.iter().find(|binding| binding.key == key)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpenDialog {
    Simple { devices: usize },
    List,
}

pub struct TopoOverlay<H: OverlayHost> {
    host: H,
    active: bool,
    mode: ModeController,
    chain: DialogSequencer,
    dispatcher: ActionDispatcher,
    selection: SelectionContext,
    dialog: Option<OpenDialog>,
}

impl<H: OverlayHost> TopoOverlay<H> {
    pub fn new(host: H) -> Self {
        Self::with_sequencer(host, DialogSequencer::default())
    }

    pub fn with_sequencer(host: H, chain: DialogSequencer) -> Self {
        Self {
            host,
            active: false,
            mode: ModeController::new(),
            chain,
            dispatcher: ActionDispatcher::new(),
            selection: SelectionContext::empty(),
            dialog: None,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn mode(&self) -> &ModeController {
        &self.mode
    }

    pub fn chain(&self) -> &DialogSequencer {
        &self.chain
    }

    pub fn selection(&self) -> &SelectionContext {
        &self.selection
    }

    pub fn has_open_dialog(&self) -> bool {
        self.dialog.is_some() || self.chain.is_presenting()
    }

    pub fn activate(&mut self) {
        if self.active {
            return;
        }
        self.active = true;
        info!(overlay = OVERLAY_ID, "overlay: activated");

        let mut effects = Effects::new();
        self.dispatcher.on_selection(&self.selection, &mut effects);
        self.flush(effects);
    }

    /// Leaves no display mode active and no chain in progress.
    pub fn deactivate(&mut self) {
        if !self.active {
            return;
        }

        let mut effects = Effects::new();
        self.mode.on_deactivate(&mut effects);
        self.chain.reset();
        self.dialog = None;
        self.active = false;
        self.flush(effects);
        info!(overlay = OVERLAY_ID, "overlay: deactivated");
    }

    /// Returns whether the key press was consumed.
    pub fn key_pressed(&mut self, key: Key) -> bool {
        if !self.active {
            return false;
        }

        let binding = match key {
            Key::Escape => return self.escape(),
            Key::Char(c) => match binding_for(c) {
                Some(binding) => binding,
                None => return false,
            },
        };

        let mut effects = Effects::new();
        match binding.action {
            KeyAction::StopDisplay => {
                self.mode.stop_display(&mut effects);
            }
            KeyAction::StartDisplay(mode) => {
                self.mode.start_display(DisplayMode::new(mode), &mut effects);
            }
            KeyAction::ListDialog => self.open_list_dialog(&mut effects),
        }
        self.flush(effects);
        true
    }

    /// Escape dismisses an open dialog first, otherwise stops the display mode.
    pub fn escape(&mut self) -> bool {
        if !self.active {
            return false;
        }

        let mut effects = Effects::new();
        let consumed = if self.chain.is_presenting() {
            self.chain.handle(ChainInput::Cancel, &mut effects)
        } else if let Some(dialog) = self.dialog.take() {
            debug!(?dialog, "overlay: dialog dismissed");
            true
        } else {
            self.mode.stop_display(&mut effects)
        };
        self.flush(effects);
        consumed
    }

    pub fn button_pressed(&mut self, button: DetailButton) -> bool {
        if !self.active {
            return false;
        }
        let Some(route) = self.dispatcher.dispatch(button, &self.selection) else {
            return false;
        };

        let mut effects = Effects::new();
        match route {
            Route::SimpleDialog(selection) => self.open_simple_dialog(&selection, &mut effects),
            Route::ChainDialog(selection) => {
                self.dialog = None;
                self.chain.handle(ChainInput::Trigger(selection), &mut effects);
            }
        }
        self.flush(effects);
        true
    }

    pub fn selection_changed(&mut self, selection: SelectionContext) {
        self.selection = selection;
        if !self.active {
            return;
        }

        let mut effects = Effects::new();
        self.dispatcher.on_selection(&self.selection, &mut effects);
        self.flush(effects);
    }

    pub fn mouse_over(&mut self, target: HoverTarget) {
        self.update_display(Some(&target));
    }

    pub fn mouse_out(&mut self) {
        self.update_display(None);
    }

    fn update_display(&mut self, target: Option<&HoverTarget>) {
        if !self.active {
            return;
        }
        let mut effects = Effects::new();
        self.mode.update_display(target, &mut effects);
        self.flush(effects);
    }

    /// A dialog button was pressed. Returns whether a dialog owned it.
    pub fn dialog_action(&mut self, kind: ActionKind) -> bool {
        if !self.active {
            return false;
        }

        let mut effects = Effects::new();
        let handled = if self.chain.is_presenting() {
            let input = match kind {
                ActionKind::Confirm => ChainInput::Advance,
                ActionKind::Cancel => ChainInput::Cancel,
            };
            self.chain.handle(input, &mut effects)
        } else if let Some(dialog) = self.dialog.take() {
            match (dialog, kind) {
                (OpenDialog::Simple { devices }, ActionKind::Confirm) => {
                    info!(devices, "overlay: simple dialog confirmed");
                    effects.push(Effect::Flash(format!("Processed {devices} device(s)")));
                }
                (dialog, kind) => debug!(?dialog, ?kind, "overlay: dialog closed"),
            }
            true
        } else {
            false
        };
        self.flush(effects);
        handled
    }

    pub fn set_choice(&mut self, field: &str, value: Option<String>) -> bool {
        self.chain_input(ChainInput::SetChoice {
            field: field.to_string(),
            value,
        })
    }

    pub fn set_flag(&mut self, field: &str, value: bool) -> bool {
        self.chain_input(ChainInput::SetFlag {
            field: field.to_string(),
            value,
        })
    }

    fn chain_input(&mut self, input: ChainInput) -> bool {
        if !self.active {
            return false;
        }
        let mut effects = Effects::new();
        let handled = self.chain.handle(input, &mut effects);
        self.flush(effects);
        handled
    }

    /// Inbound peer events are only handled while the overlay is active.
    pub fn handle_event(&mut self, event: OverlayEvent) {
        if !self.active {
            debug!("overlay: inactive, dropping peer event");
            return;
        }

        let mut effects = Effects::new();
        match event {
            OverlayEvent::DevicePorts { id, seq, ports } => {
                if self.chain.handle(ChainInput::Response { id, seq, ports }, &mut effects)
                    && self.chain.is_presenting()
                {
                    self.dialog = None;
                }
            }
            OverlayEvent::DevicePortsFailed { id, seq, error } => {
                warn!(
                    %id,
                    seq,
                    code = ?error.code,
                    message = %error.message,
                    "overlay: peer could not list ports"
                );
                self.chain.handle(
                    ChainInput::Failed {
                        id,
                        seq,
                        message: error.message,
                    },
                    &mut effects,
                );
            }
            OverlayEvent::Highlights(highlights) => {
                effects.push(Effect::ShowHighlights(highlights));
            }
            OverlayEvent::Error(error) => {
                warn!(code = ?error.code, message = %error.message, "overlay: peer reported error");
                effects.push(Effect::Flash(error.message));
            }
        }
        self.flush(effects);
    }

    fn open_simple_dialog(&mut self, selection: &SelectionContext, effects: &mut Effects) {
        self.dismiss_chain_step(effects);
        debug!(selected = selection.len(), "overlay: simple dialog opened");
        self.dialog = Some(OpenDialog::Simple {
            devices: selection.len(),
        });
        effects.push(Effect::Present(simple_dialog_view(selection)));
    }

    fn open_list_dialog(&mut self, effects: &mut Effects) {
        self.dismiss_chain_step(effects);
        self.dialog = Some(OpenDialog::List);
        effects.push(Effect::Present(list_dialog_view()));
    }

    // One dialog is visible at a time; a presented chain step gives way.
    fn dismiss_chain_step(&mut self, effects: &mut Effects) {
        if self.chain.is_presenting() {
            self.chain.handle(ChainInput::Cancel, effects);
        }
    }

    fn flush(&mut self, effects: Effects) {
        apply_effects(&mut self.host, effects);
    }
}

#[cfg(test)]
#[path = "tests/overlay_tests.rs"]
mod tests;
