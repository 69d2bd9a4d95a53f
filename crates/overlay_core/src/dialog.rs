//! Chains of dependent dialogs.
//!
//! A chain is described by a [`ChainBlueprint`]: an ordered list of steps, each with
//! the fields its controls write into the shared [`ChainContext`]. Progress through a
//! chain is an explicit [`ChainState`] value driven by [`transition`], a pure function
//! of `(state, input)` that yields the next state and the effects to apply.
//!
//! Requests for remote data are correlated by a monotonically increasing sequence
//! number. Only the most recently sent request can advance a chain; replies to older
//! requests are discarded when they arrive. Replies arrive in request order, so one
//! that carries no sequence number answers the oldest unanswered request for its
//! subject.

use std::collections::VecDeque;

use shared::{
    domain::{ElementId, PortSummary},
    protocol::{ChainSnapshot, FieldValue, OverlayRequest},
};
use tracing::{debug, info};

use crate::{
    effect::{Effect, Effects},
    selection::SelectionContext,
};

pub const DEVICE_FIELD: &str = "device";
pub const PORT_FIELD: &str = "port";
pub const FOO_FIELD: &str = "foo";
pub const BAR_FIELD: &str = "bar";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Confirm,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogAction {
    pub kind: ActionKind,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Control {
    Choice {
        field: String,
        options: Vec<String>,
        selected: Option<String>,
    },
    Checkbox {
        field: String,
        label: String,
        checked: bool,
    },
}

/// Presentation-neutral description of one dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DialogView {
    pub title: String,
    pub lines: Vec<String>,
    pub controls: Vec<Control>,
    pub actions: Vec<DialogAction>,
}

impl DialogView {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn line(mut self, text: impl Into<String>) -> Self {
        self.lines.push(text.into());
        self
    }

    pub fn control(mut self, control: Control) -> Self {
        self.controls.push(control);
        self
    }

    pub fn cancel(mut self) -> Self {
        self.actions.push(DialogAction {
            kind: ActionKind::Cancel,
            label: "Cancel".to_string(),
        });
        self
    }

    pub fn ok(self) -> Self {
        self.ok_labeled("OK")
    }

    pub fn ok_labeled(mut self, label: impl Into<String>) -> Self {
        self.actions.push(DialogAction {
            kind: ActionKind::Confirm,
            label: label.into(),
        });
        self
    }

    pub fn action(&self, kind: ActionKind) -> Option<&DialogAction> {
        self.actions.iter().find(|action| action.kind == kind)
    }
}

/// Single-step dialog over a non-empty selection.
pub fn simple_dialog_view(selection: &SelectionContext) -> DialogView {
    selection
        .ids()
        .iter()
        .fold(
            DialogView::new("Process Devices").line("Do something to these devices?"),
            |view, id| view.line(id.to_string()),
        )
        .cancel()
        .ok()
}

pub fn list_dialog_view() -> DialogView {
    DialogView::new("A list of stuff")
        .line("(Selectable list to show here...)")
        .ok_labeled("Gotcha")
}

/// How the data for the following step is obtained when a step advances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Local,
    FetchPorts,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSpec {
    /// Shows the chain subject; written once when the chain starts.
    Subject { field: String },
    /// One option per item returned by the fetch that preceded this step.
    Choice { field: String },
    Flag { field: String, label: String },
}

impl FieldSpec {
    fn field(&self) -> &str {
        match self {
            Self::Subject { field } | Self::Choice { field } | Self::Flag { field, .. } => field,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepBlueprint {
    pub title: String,
    pub prompt: String,
    pub fields: Vec<FieldSpec>,
    pub advance: Advance,
    pub advance_label: Option<String>,
}

/// Steps of a chain. Advancing the last step applies the chain, whatever its
/// [`Advance`] says.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainBlueprint {
    pub subject_field: String,
    pub steps: Vec<StepBlueprint>,
}

impl ChainBlueprint {
    /// Confirm a device, fetch its ports, then pick a port and two option flags.
    pub fn device_port() -> Self {
        Self {
            subject_field: DEVICE_FIELD.to_string(),
            steps: vec![
                StepBlueprint {
                    title: "Process Device".to_string(),
                    prompt: "Fetch the ports of this device?".to_string(),
                    fields: vec![FieldSpec::Subject {
                        field: DEVICE_FIELD.to_string(),
                    }],
                    advance: Advance::FetchPorts,
                    advance_label: None,
                },
                StepBlueprint {
                    title: "Select Port".to_string(),
                    prompt: "Choose a port and options:".to_string(),
                    fields: vec![
                        FieldSpec::Choice {
                            field: PORT_FIELD.to_string(),
                        },
                        FieldSpec::Flag {
                            field: FOO_FIELD.to_string(),
                            label: "FOO".to_string(),
                        },
                        FieldSpec::Flag {
                            field: BAR_FIELD.to_string(),
                            label: "BAR".to_string(),
                        },
                    ],
                    advance: Advance::Local,
                    advance_label: Some("Apply".to_string()),
                },
            ],
        }
    }

    fn step(&self, index: usize) -> Option<&StepBlueprint> {
        self.steps.get(index)
    }

    fn is_last(&self, index: usize) -> bool {
        index + 1 >= self.steps.len()
    }
}

/// Mutable state carried across the steps of one chain invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainContext {
    fields: ChainSnapshot,
}

impl ChainContext {
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(FieldValue::as_text)
    }

    pub fn flag(&self, field: &str) -> Option<bool> {
        self.get(field).and_then(FieldValue::as_flag)
    }

    pub fn set(&mut self, field: impl Into<String>, value: FieldValue) {
        self.fields.insert(field.into(), value);
    }

    pub fn snapshot(&self) -> ChainSnapshot {
        self.fields.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub subject: ElementId,
    pub seq: u64,
}

impl PendingRequest {
    fn matches(&self, id: &ElementId, seq: Option<u64>) -> bool {
        seq == Some(self.seq) && (id.is_empty() || *id == self.subject)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ChainState {
    #[default]
    Idle,
    /// Transient: evaluated as soon as it is entered.
    AwaitingGate { selection: SelectionContext },
    StepPresented {
        step: usize,
        context: ChainContext,
        options: Vec<String>,
    },
    /// Suspended until the reply to `pending` arrives. There is no timeout; a new
    /// trigger supersedes the chain and the late reply is discarded.
    AwaitingRemoteData {
        next_step: usize,
        context: ChainContext,
        pending: PendingRequest,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainInput {
    Trigger(SelectionContext),
    SetChoice {
        field: String,
        value: Option<String>,
    },
    SetFlag {
        field: String,
        value: bool,
    },
    Advance,
    Cancel,
    Response {
        id: ElementId,
        seq: Option<u64>,
        ports: Vec<PortSummary>,
    },
    /// The peer answered the request with an error.
    Failed {
        id: ElementId,
        seq: Option<u64>,
        message: String,
    },
}

#[derive(Debug)]
pub struct Transition {
    pub state: ChainState,
    pub effects: Effects,
    /// Request sent by this transition.
    pub sent: Option<PendingRequest>,
    /// Whether the input had any effect on the chain.
    pub handled: bool,
}

impl Transition {
    fn unchanged(state: ChainState) -> Self {
        Self {
            state,
            effects: Effects::new(),
            sent: None,
            handled: false,
        }
    }

    fn to(state: ChainState, effects: Effects) -> Self {
        Self {
            state,
            effects,
            sent: None,
            handled: true,
        }
    }
}

pub fn transition(
    blueprint: &ChainBlueprint,
    state: ChainState,
    last_seq: u64,
    input: ChainInput,
) -> Transition {
    match (state, input) {
        (_, ChainInput::Trigger(selection)) => {
            evaluate_gate(blueprint, ChainState::AwaitingGate { selection })
        }
        (state @ ChainState::AwaitingGate { .. }, _) => evaluate_gate(blueprint, state),

        (
            ChainState::StepPresented {
                step,
                mut context,
                options,
            },
            ChainInput::SetChoice { field, value },
        ) => {
            let accepted = step_field(blueprint, step, &field)
                .is_some_and(|spec| matches!(spec, FieldSpec::Choice { .. }))
                && value.as_ref().map_or(true, |v| options.contains(v));
            if accepted {
                context.set(field, FieldValue::Text(value));
            }
            let state = ChainState::StepPresented {
                step,
                context,
                options,
            };
            if accepted {
                Transition::to(state, Effects::new())
            } else {
                Transition::unchanged(state)
            }
        }
        (
            ChainState::StepPresented {
                step,
                mut context,
                options,
            },
            ChainInput::SetFlag { field, value },
        ) => {
            let accepted = step_field(blueprint, step, &field)
                .is_some_and(|spec| matches!(spec, FieldSpec::Flag { .. }));
            if accepted {
                context.set(field, FieldValue::Flag(value));
            }
            let state = ChainState::StepPresented {
                step,
                context,
                options,
            };
            if accepted {
                Transition::to(state, Effects::new())
            } else {
                Transition::unchanged(state)
            }
        }
        (ChainState::StepPresented { step, context, .. }, ChainInput::Advance) => {
            advance(blueprint, step, context, last_seq)
        }
        (ChainState::StepPresented { step, .. }, ChainInput::Cancel) => {
            debug!(step, "chain: cancelled");
            Transition::to(ChainState::Idle, Effects::new())
        }
        (
            ChainState::AwaitingRemoteData {
                next_step,
                context,
                pending,
            },
            ChainInput::Response { id, seq, ports },
        ) => {
            if !pending.matches(&id, seq) {
                debug!(
                    %id,
                    seq,
                    pending_seq = pending.seq,
                    "chain: discarding stale response"
                );
                return Transition::unchanged(ChainState::AwaitingRemoteData {
                    next_step,
                    context,
                    pending,
                });
            }

            let options = ports
                .into_iter()
                .filter(|port| !port.id.is_empty())
                .map(|port| port.id.0)
                .collect();
            present(blueprint, next_step, context, options)
        }
        (
            ChainState::AwaitingRemoteData {
                next_step,
                context,
                pending,
            },
            ChainInput::Failed { id, seq, message },
        ) => {
            if !pending.matches(&id, seq) {
                debug!(%id, seq, pending_seq = pending.seq, "chain: discarding stale failure");
                return Transition::unchanged(ChainState::AwaitingRemoteData {
                    next_step,
                    context,
                    pending,
                });
            }

            info!(%id, seq, %message, "chain: remote data unavailable, abandoning");
            Transition::to(ChainState::Idle, vec![Effect::Flash(message)])
        }
        (state, ChainInput::Response { id, seq, .. } | ChainInput::Failed { id, seq, .. }) => {
            debug!(%id, seq, "chain: discarding reply with no pending request");
            Transition::unchanged(state)
        }
        (state, _) => Transition::unchanged(state),
    }
}

fn step_field<'a>(blueprint: &'a ChainBlueprint, step: usize, field: &str) -> Option<&'a FieldSpec> {
    blueprint
        .step(step)?
        .fields
        .iter()
        .find(|spec| spec.field() == field)
}

fn evaluate_gate(blueprint: &ChainBlueprint, state: ChainState) -> Transition {
    let selection = match state {
        ChainState::AwaitingGate { selection } => selection,
        other => return Transition::unchanged(other),
    };
    let Some(subject) = selection.single() else {
        debug!(selected = selection.len(), "chain: gate requires exactly one subject");
        return Transition::to(ChainState::Idle, Effects::new());
    };

    let mut context = ChainContext::default();
    context.set(
        blueprint.subject_field.clone(),
        FieldValue::text(subject.as_str()),
    );
    present(blueprint, 0, context, Vec::new())
}

fn advance(
    blueprint: &ChainBlueprint,
    step: usize,
    context: ChainContext,
    last_seq: u64,
) -> Transition {
    if blueprint.is_last(step) {
        let snapshot = context.snapshot();
        info!(fields = snapshot.len(), "chain: applying");
        return Transition::to(
            ChainState::Idle,
            vec![Effect::Send(OverlayRequest::DevicePortApply(snapshot))],
        );
    }

    let next_step = step + 1;
    match blueprint.step(step).map(|s| s.advance) {
        Some(Advance::FetchPorts) => {
            let subject = ElementId::new(context.text(&blueprint.subject_field).unwrap_or_default());
            let seq = last_seq + 1;
            debug!(%subject, seq, "chain: requesting remote data");
            let request = OverlayRequest::DevicePortsRequest {
                id: subject.clone(),
                seq,
            };
            let pending = PendingRequest { subject, seq };
            Transition {
                sent: Some(pending.clone()),
                state: ChainState::AwaitingRemoteData {
                    next_step,
                    context,
                    pending,
                },
                effects: vec![Effect::Send(request)],
                handled: true,
            }
        }
        _ => present(blueprint, next_step, context, Vec::new()),
    }
}

/// Presents `step`, resetting the fields its controls own to their defaults.
fn present(
    blueprint: &ChainBlueprint,
    step: usize,
    mut context: ChainContext,
    options: Vec<String>,
) -> Transition {
    let Some(spec) = blueprint.step(step) else {
        return Transition::to(ChainState::Idle, Effects::new());
    };

    let mut view = DialogView::new(spec.title.clone()).line(spec.prompt.clone());
    for field in &spec.fields {
        match field {
            FieldSpec::Subject { field } => {
                let subject = context.text(field).unwrap_or_default().to_string();
                view = view.line(subject);
            }
            FieldSpec::Choice { field } => {
                context.set(field.clone(), FieldValue::Text(None));
                view = view.control(Control::Choice {
                    field: field.clone(),
                    options: options.clone(),
                    selected: None,
                });
            }
            FieldSpec::Flag { field, label } => {
                context.set(field.clone(), FieldValue::Flag(false));
                view = view.control(Control::Checkbox {
                    field: field.clone(),
                    label: label.clone(),
                    checked: false,
                });
            }
        }
    }
    let view = match &spec.advance_label {
        Some(label) => view.cancel().ok_labeled(label.clone()),
        None => view.cancel().ok(),
    };

    Transition::to(
        ChainState::StepPresented {
            step,
            context,
            options,
        },
        vec![Effect::Present(view)],
    )
}

/// Unanswered requests remembered for replies that carry no sequence number.
const MAX_OUTSTANDING: usize = 32;

/// Owns one chain's state across invocations, plus the request sequence counter.
#[derive(Debug)]
pub struct DialogSequencer {
    blueprint: ChainBlueprint,
    state: ChainState,
    last_seq: u64,
    outstanding: VecDeque<PendingRequest>,
}

impl DialogSequencer {
    pub fn new(blueprint: ChainBlueprint) -> Self {
        Self {
            blueprint,
            state: ChainState::Idle,
            last_seq: 0,
            outstanding: VecDeque::new(),
        }
    }

    pub fn state(&self) -> &ChainState {
        &self.state
    }

    pub fn last_seq(&self) -> u64 {
        self.last_seq
    }

    pub fn is_presenting(&self) -> bool {
        matches!(self.state, ChainState::StepPresented { .. })
    }

    pub fn context(&self) -> Option<&ChainContext> {
        match &self.state {
            ChainState::StepPresented { context, .. }
            | ChainState::AwaitingRemoteData { context, .. } => Some(context),
            ChainState::Idle | ChainState::AwaitingGate { .. } => None,
        }
    }

    /// Feeds one input through [`transition`]; returns whether it was handled.
    pub fn handle(&mut self, input: ChainInput, effects: &mut Effects) -> bool {
        let input = self.correlate(input);
        let state = std::mem::take(&mut self.state);
        let step = transition(&self.blueprint, state, self.last_seq, input);
        self.state = step.state;
        if let Some(sent) = step.sent {
            self.last_seq = sent.seq;
            if self.outstanding.len() == MAX_OUTSTANDING {
                self.outstanding.pop_front();
            }
            self.outstanding.push_back(sent);
        }
        effects.extend(step.effects);
        step.handled
    }

    /// Charges a reply to the request it answers and gives it that request's
    /// sequence number.
    fn correlate(&mut self, input: ChainInput) -> ChainInput {
        match input {
            ChainInput::Response { id, seq, ports } => {
                let seq = self.answer(&id, seq);
                ChainInput::Response { id, seq, ports }
            }
            ChainInput::Failed { id, seq, message } => {
                let seq = self.answer(&id, seq);
                ChainInput::Failed { id, seq, message }
            }
            other => other,
        }
    }

    fn answer(&mut self, id: &ElementId, seq: Option<u64>) -> Option<u64> {
        let index = match seq {
            Some(seq) => self.outstanding.iter().position(|r| r.seq == seq),
            None => self.outstanding.iter().position(|r| r.subject == *id),
        };
        match index.and_then(|i| self.outstanding.remove(i)) {
            Some(request) => Some(request.seq),
            None => seq,
        }
    }

    /// Drops any chain in progress. The sequence counter and the unanswered
    /// requests are kept so replies sent before the reset can never match a
    /// later request.
    pub fn reset(&mut self) {
        self.state = ChainState::Idle;
    }
}

impl Default for DialogSequencer {
    fn default() -> Self {
        Self::new(ChainBlueprint::device_port())
    }
}

#[cfg(test)]
#[path = "tests/dialog_tests.rs"]
mod tests;
