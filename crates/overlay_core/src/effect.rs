use shared::protocol::{Highlights, OverlayRequest};

use crate::{dialog::DialogView, dispatcher::ActionSet};

/// Side effects produced by the interaction core, applied to an [`OverlayHost`](crate::host::OverlayHost).
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Send(OverlayRequest),
    Flash(String),
    Present(DialogView),
    ExposeActions(ActionSet),
    ShowHighlights(Highlights),
}

pub type Effects = Vec<Effect>;
