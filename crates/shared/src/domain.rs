use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

// Topology element identifiers (devices, hosts, links) as rendered on the canvas.
id_newtype!(ElementId);
id_newtype!(PortId);

// An exclusive interactive mode mirrored to the peer while it is active. The
// identifier is opaque; the peer decides what it means.
id_newtype!(DisplayMode);

impl DisplayMode {
    pub const MOUSE: &'static str = "mouse";
    pub const LINK: &'static str = "link";

    pub fn mouse() -> Self {
        Self::new(Self::MOUSE)
    }

    pub fn link() -> Self {
        Self::new(Self::LINK)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSummary {
    #[serde(default)]
    pub id: PortId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl PortSummary {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: PortId::new(id),
            speed: None,
            kind: None,
        }
    }
}
