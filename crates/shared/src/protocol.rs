use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    domain::{DisplayMode, ElementId, PortSummary},
    error::ApiError,
};

/// A single value written into a chain context by a dialog control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Text(Option<String>),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(Some(value.into()))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => value.as_deref(),
            Self::Flag(_) => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(value) => Some(*value),
            Self::Text(_) => None,
        }
    }
}

/// Accumulated key/value state of one dialog chain, sent verbatim when the chain applies.
pub type ChainSnapshot = BTreeMap<String, FieldValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum OverlayRequest {
    DisplayStart {
        mode: DisplayMode,
    },
    /// An empty id means the pointer left its target.
    DisplayUpdate {
        #[serde(default)]
        id: ElementId,
    },
    DisplayStop,
    DevicePortsRequest {
        id: ElementId,
        seq: u64,
    },
    DevicePortApply(ChainSnapshot),
}

impl OverlayRequest {
    pub fn name(&self) -> &'static str {
        match self {
            Self::DisplayStart { .. } => "display_start",
            Self::DisplayUpdate { .. } => "display_update",
            Self::DisplayStop => "display_stop",
            Self::DevicePortsRequest { .. } => "device_ports_request",
            Self::DevicePortApply(_) => "device_port_apply",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeStatus {
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeBadge {
    pub status: BadgeStatus,
    pub count: usize,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceHighlight {
    pub id: ElementId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<NodeBadge>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkHighlight {
    pub id: ElementId,
    #[serde(default)]
    pub important: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Canvas decorations pushed by the peer. An empty value clears all highlights.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlights {
    #[serde(default)]
    pub devices: Vec<DeviceHighlight>,
    #[serde(default)]
    pub links: Vec<LinkHighlight>,
}

impl Highlights {
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty() && self.links.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum OverlayEvent {
    DevicePorts {
        #[serde(default)]
        id: ElementId,
        #[serde(default)]
        seq: Option<u64>,
        #[serde(default, alias = "items")]
        ports: Vec<PortSummary>,
    },
    /// The peer could not answer a `device_ports_request`.
    DevicePortsFailed {
        #[serde(default)]
        id: ElementId,
        #[serde(default)]
        seq: Option<u64>,
        error: ApiError,
    },
    Highlights(Highlights),
    Error(ApiError),
}
