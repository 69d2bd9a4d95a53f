//! Interaction core of the topology overlay: an exclusive display mode mirrored to a
//! remote peer, a sequencer for chains of dependent dialogs, and the selection-gated
//! dispatcher that decides which of them a key or button press may reach.

pub mod dialog;
pub mod dispatcher;
pub mod effect;
pub mod error;
pub mod host;
pub mod mode;
pub mod overlay;
pub mod selection;
pub mod transport;

pub use dialog::{
    ActionKind, ChainBlueprint, ChainContext, ChainInput, ChainState, DialogSequencer,
    DialogView, PendingRequest,
};
pub use dispatcher::{ActionDispatcher, ActionSet, DetailButton};
pub use effect::Effect;
pub use error::TransportError;
pub use host::{OverlayHost, RecordingHost};
pub use mode::{HoverTarget, ModeController, StartOutcome};
pub use overlay::{Key, TopoOverlay};
pub use selection::{Cardinality, SelectionContext};
pub use transport::PeerLink;
