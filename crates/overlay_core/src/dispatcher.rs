use std::fmt;

use tracing::debug;

use crate::{
    effect::{Effect, Effects},
    selection::{Cardinality, SelectionContext},
};

/// Buttons the overlay contributes to the details panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetailButton {
    SimpleDialog,
    ChainDialog,
}

impl DetailButton {
    pub fn id(self) -> &'static str {
        match self {
            Self::SimpleDialog => "simpleDialog",
            Self::ChainDialog => "chainDialog",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "simpleDialog" => Some(Self::SimpleDialog),
            "chainDialog" => Some(Self::ChainDialog),
            _ => None,
        }
    }
}

impl fmt::Display for DetailButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionSet {
    pub simple_dialog: bool,
    pub chain_dialog: bool,
}

impl ActionSet {
    pub fn for_cardinality(cardinality: Cardinality) -> Self {
        match cardinality {
            Cardinality::Empty => Self::default(),
            Cardinality::Single => Self {
                simple_dialog: true,
                chain_dialog: true,
            },
            Cardinality::Multi => Self {
                simple_dialog: true,
                chain_dialog: false,
            },
        }
    }

    pub fn contains(&self, button: DetailButton) -> bool {
        match button {
            DetailButton::SimpleDialog => self.simple_dialog,
            DetailButton::ChainDialog => self.chain_dialog,
        }
    }

    pub fn buttons(&self) -> Vec<DetailButton> {
        [DetailButton::SimpleDialog, DetailButton::ChainDialog]
            .into_iter()
            .filter(|button| self.contains(*button))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    SimpleDialog(SelectionContext),
    ChainDialog(SelectionContext),
}

/// Tracks which selection-dependent actions are exposed to the host.
#[derive(Debug, Default)]
pub struct ActionDispatcher {
    exposed: ActionSet,
}

impl ActionDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn exposed(&self) -> ActionSet {
        self.exposed
    }

    /// The host resets detail buttons on every cardinality transition, so the
    /// available set is re-asserted every time, even when it did not change.
    pub fn on_selection(&mut self, selection: &SelectionContext, effects: &mut Effects) {
        self.exposed = ActionSet::for_cardinality(selection.cardinality());
        debug!(
            selected = selection.len(),
            simple = self.exposed.simple_dialog,
            chain = self.exposed.chain_dialog,
            "dispatcher: exposing actions"
        );
        effects.push(Effect::ExposeActions(self.exposed));
    }

    pub fn dispatch(&self, button: DetailButton, selection: &SelectionContext) -> Option<Route> {
        if !ActionSet::for_cardinality(selection.cardinality()).contains(button) {
            debug!(%button, selected = selection.len(), "dispatcher: action unavailable");
            return None;
        }

        Some(match button {
            DetailButton::SimpleDialog => Route::SimpleDialog(selection.clone()),
            DetailButton::ChainDialog => Route::ChainDialog(selection.clone()),
        })
    }
}

#[cfg(test)]
#[path = "tests/dispatcher_tests.rs"]
mod tests;
