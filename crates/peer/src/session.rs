use std::{collections::BTreeMap, sync::Arc};

use shared::{
    domain::{DisplayMode, ElementId},
    error::ApiError,
    protocol::{
        BadgeStatus, ChainSnapshot, DeviceHighlight, FieldValue, Highlights, LinkHighlight,
        NodeBadge, OverlayEvent, OverlayRequest,
    },
};
use tracing::{debug, info, warn};

use crate::topology::{Element, Link, Topology};

const CRITICAL_EGRESS_LINKS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PeerMode {
    #[default]
    Idle,
    Mouse,
    Link,
}

impl PeerMode {
    fn from_display_mode(mode: &DisplayMode) -> Self {
        match mode.as_str() {
            DisplayMode::MOUSE => Self::Mouse,
            DisplayMode::LINK => Self::Link,
            _ => Self::Idle,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ElementOfNote {
    Device(ElementId),
    Host(ElementId),
}

/// Peer-side state of one overlay connection.
pub struct OverlaySession {
    topology: Arc<Topology>,
    mode: PeerMode,
    element_of_note: Option<ElementOfNote>,
    link_set: Vec<Link>,
    link_index: usize,
}

impl OverlaySession {
    pub fn new(topology: Arc<Topology>) -> Self {
        Self {
            topology,
            mode: PeerMode::Idle,
            element_of_note: None,
            link_set: Vec::new(),
            link_index: 0,
        }
    }

    pub fn mode(&self) -> PeerMode {
        self.mode
    }

    /// Link mode cycles its highlight on a timer.
    pub fn wants_ticks(&self) -> bool {
        self.mode == PeerMode::Link
    }

    pub fn process(&mut self, request: OverlayRequest) -> Vec<OverlayEvent> {
        let mut events = Vec::new();
        match request {
            OverlayRequest::DisplayStart { mode } => {
                debug!(%mode, "peer: start display");
                self.clear_state();
                events.push(clear_highlights());

                self.mode = PeerMode::from_display_mode(&mode);
                match self.mode {
                    PeerMode::Mouse => events.extend(self.mouse_data()),
                    PeerMode::Link => {
                        self.link_set = self.topology.active_links().to_vec();
                        self.link_index = 0;
                        debug!(links = self.link_set.len(), "peer: initialized link set");
                        events.push(self.link_data());
                    }
                    PeerMode::Idle => {}
                }
            }
            OverlayRequest::DisplayUpdate { id } => {
                debug!(%id, "peer: update display");
                if id.is_empty() {
                    events.push(clear_highlights());
                } else {
                    self.element_of_note = self.resolve(&id);
                    match self.mode {
                        PeerMode::Mouse => events.extend(self.mouse_data()),
                        PeerMode::Link => events.push(self.link_data()),
                        PeerMode::Idle => {}
                    }
                }
            }
            OverlayRequest::DisplayStop => {
                debug!("peer: stop display");
                self.clear_state();
                events.push(clear_highlights());
            }
            OverlayRequest::DevicePortsRequest { id, seq } => {
                debug!(%id, seq, "peer: ports requested");
                match self.topology.ports_for(&id) {
                    Ok(ports) => {
                        debug!(%id, ports = ports.len(), "peer: sending port data");
                        events.push(OverlayEvent::DevicePorts {
                            id,
                            seq: Some(seq),
                            ports,
                        });
                    }
                    Err(err) => {
                        warn!(%id, %err, "peer: unable to process port request");
                        events.push(OverlayEvent::DevicePortsFailed {
                            id,
                            seq: Some(seq),
                            error: ApiError::from(err),
                        });
                    }
                }
            }
            OverlayRequest::DevicePortApply(snapshot) => log_apply(&snapshot),
        }
        events
    }

    /// Next periodic update, if the current mode has one.
    pub fn tick(&mut self) -> Option<OverlayEvent> {
        self.wants_ticks().then(|| self.link_data())
    }

    fn clear_state(&mut self) {
        self.mode = PeerMode::Idle;
        self.element_of_note = None;
        self.link_set.clear();
        self.link_index = 0;
    }

    fn resolve(&self, id: &ElementId) -> Option<ElementOfNote> {
        match self.topology.resolve(id) {
            Some(Element::Host(host)) => Some(ElementOfNote::Host(host.id.clone())),
            Some(Element::Device(device)) => Some(ElementOfNote::Device(device.id.clone())),
            None => {
                warn!(%id, "peer: unable to resolve element");
                None
            }
        }
    }

    /// Egress links of the hovered device plus a badge counting them. Hosts get nothing.
    fn mouse_data(&self) -> Option<OverlayEvent> {
        let Some(ElementOfNote::Device(device)) = &self.element_of_note else {
            return None;
        };

        let links = self.topology.egress_links(device);
        let mut bi_links = BTreeMap::new();
        for link in &links {
            bi_links.entry(link.bi_link_id()).or_insert_with_key(|id| LinkHighlight {
                id: id.clone(),
                important: true,
                label: Some("Yo!".to_string()),
            });
        }

        Some(OverlayEvent::Highlights(Highlights {
            devices: vec![DeviceHighlight {
                id: device.clone(),
                badge: Some(egress_badge(links.len())),
            }],
            links: bi_links.into_values().collect(),
        }))
    }

    fn link_data(&mut self) -> OverlayEvent {
        let Some(current) = self.link_set.get(self.link_index) else {
            return clear_highlights();
        };
        let current_id = current.bi_link_id();
        let label = self.link_index.to_string();
        debug!(index = self.link_index, "peer: sending link data");

        let mut bi_links = BTreeMap::new();
        for link in &self.link_set {
            bi_links.entry(link.bi_link_id()).or_insert_with_key(|id| LinkHighlight {
                id: id.clone(),
                important: false,
                label: None,
            });
        }
        if let Some(highlight) = bi_links.get_mut(&current_id) {
            highlight.important = true;
            highlight.label = Some(label);
        }

        self.link_index = (self.link_index + 1) % self.link_set.len();
        OverlayEvent::Highlights(Highlights {
            devices: Vec::new(),
            links: bi_links.into_values().collect(),
        })
    }
}

fn clear_highlights() -> OverlayEvent {
    OverlayEvent::Highlights(Highlights::default())
}

pub fn egress_badge(count: usize) -> NodeBadge {
    let (status, noun) = if count > CRITICAL_EGRESS_LINKS {
        (BadgeStatus::Error, "(critical)")
    } else {
        (BadgeStatus::Warn, "(problematic)")
    };
    NodeBadge {
        status,
        count,
        message: format!("Egress links: {count} {noun}"),
    }
}

fn log_apply(snapshot: &ChainSnapshot) {
    let text = |field: &str| {
        snapshot
            .get(field)
            .and_then(FieldValue::as_text)
            .unwrap_or_default()
            .to_string()
    };
    let flag = |field: &str| {
        snapshot
            .get(field)
            .and_then(FieldValue::as_flag)
            .unwrap_or(false)
    };
    info!(
        device = %text("device"),
        port = %text("port"),
        foo = flag("foo"),
        bar = flag("bar"),
        "peer: fake port operation requested"
    );
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
