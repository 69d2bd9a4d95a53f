use std::{fmt, fs, path::Path};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use shared::{
    domain::{ElementId, PortId, PortSummary},
    error::{ApiError, ErrorCode},
};
use thiserror::Error;

pub const LOCAL_PORT: u64 = 0xffff_fffe;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TopologyError {
    #[error("unknown device {0}")]
    UnknownDevice(ElementId),
    #[error("{0} is a host and has no ports to list")]
    NotADevice(ElementId),
}

impl From<TopologyError> for ApiError {
    fn from(err: TopologyError) -> Self {
        let code = match err {
            TopologyError::UnknownDevice(_) => ErrorCode::NotFound,
            TopologyError::NotADevice(_) => ErrorCode::Validation,
        };
        ApiError::new(code, err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub number: u64,
    #[serde(default)]
    pub logical: bool,
    #[serde(default)]
    pub speed: u64,
    #[serde(default = "default_port_kind")]
    pub kind: String,
}

fn default_port_kind() -> String {
    "COPPER".to_string()
}

impl Port {
    pub fn physical(number: u64, speed: u64) -> Self {
        Self {
            number,
            logical: false,
            speed,
            kind: default_port_kind(),
        }
    }

    pub fn local() -> Self {
        Self {
            number: LOCAL_PORT,
            logical: true,
            speed: 0,
            kind: default_port_kind(),
        }
    }

    fn summary(&self) -> PortSummary {
        PortSummary {
            id: PortId::new(self.number.to_string()),
            speed: Some(self.speed),
            kind: Some(self.kind.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: ElementId,
    #[serde(default)]
    pub ports: Vec<Port>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectPoint {
    pub element: ElementId,
    pub port: u64,
}

impl ConnectPoint {
    pub fn new(element: &str, port: u64) -> Self {
        Self {
            element: ElementId::new(element),
            port,
        }
    }
}

impl fmt::Display for ConnectPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.element, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    pub id: ElementId,
    pub location: ConnectPoint,
}

/// A directed, active infrastructure link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub src: ConnectPoint,
    pub dst: ConnectPoint,
}

impl Link {
    pub fn new(src: ConnectPoint, dst: ConnectPoint) -> Self {
        Self { src, dst }
    }

    /// Identifier shared by both directions of a link.
    pub fn bi_link_id(&self) -> ElementId {
        let (a, b) = if self.src <= self.dst {
            (&self.src, &self.dst)
        } else {
            (&self.dst, &self.src)
        };
        ElementId::new(format!("{a}-{b}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Element<'a> {
    Device(&'a Device),
    Host(&'a Host),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    #[serde(default)]
    pub devices: Vec<Device>,
    #[serde(default)]
    pub hosts: Vec<Host>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl Topology {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read topology file '{}'", path.display()))?;
        toml::from_str(&raw)
            .with_context(|| format!("failed to parse topology file '{}'", path.display()))
    }

    /// Five switches in a ring with a chord from the first, and one host per switch.
    pub fn demo() -> Self {
        let switch = |n: u64| format!("of:{n:016x}");
        let devices = (1..=5)
            .map(|n| Device {
                id: ElementId::new(switch(n)),
                ports: (1..=6)
                    .map(|p| Port::physical(p, 10_000))
                    .chain(std::iter::once(Port::local()))
                    .collect(),
            })
            .collect();

        let hosts = (1..=5)
            .map(|n| Host {
                id: ElementId::new(format!("00:00:00:00:00:{n:02x}/None")),
                location: ConnectPoint::new(&switch(n), 6),
            })
            .collect();

        let mut links = Vec::new();
        let mut connect = |a: u64, pa: u64, b: u64, pb: u64| {
            let src = ConnectPoint::new(&switch(a), pa);
            let dst = ConnectPoint::new(&switch(b), pb);
            links.push(Link::new(src.clone(), dst.clone()));
            links.push(Link::new(dst, src));
        };
        connect(1, 1, 2, 1);
        connect(2, 2, 3, 1);
        connect(3, 2, 4, 1);
        connect(4, 2, 5, 1);
        connect(5, 2, 1, 2);
        connect(1, 3, 3, 3);
        connect(1, 4, 4, 3);
        connect(1, 5, 5, 3);

        Self {
            devices,
            hosts,
            links,
        }
    }

    pub fn device(&self, id: &ElementId) -> Option<&Device> {
        self.devices.iter().find(|device| device.id == *id)
    }

    pub fn host(&self, id: &ElementId) -> Option<&Host> {
        self.hosts.iter().find(|host| host.id == *id)
    }

    /// Hosts take precedence over devices when resolving an id.
    pub fn resolve(&self, id: &ElementId) -> Option<Element<'_>> {
        self.host(id)
            .map(Element::Host)
            .or_else(|| self.device(id).map(Element::Device))
    }

    pub fn ports_for(&self, id: &ElementId) -> Result<Vec<PortSummary>, TopologyError> {
        let Some(device) = self.device(id) else {
            return Err(match self.host(id) {
                Some(_) => TopologyError::NotADevice(id.clone()),
                None => TopologyError::UnknownDevice(id.clone()),
            });
        };
        Ok(device
            .ports
            .iter()
            .filter(|port| !port.logical)
            .map(Port::summary)
            .collect())
    }

    pub fn egress_links(&self, device: &ElementId) -> Vec<&Link> {
        self.links
            .iter()
            .filter(|link| link.src.element == *device)
            .collect()
    }

    pub fn active_links(&self) -> &[Link] {
        &self.links
    }
}

#[cfg(test)]
#[path = "tests/topology_tests.rs"]
mod tests;
