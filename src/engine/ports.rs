//! Container port mappings.
//!
//! A mapping associates a port exposed inside the container with the host
//! interfaces and ports it is published on. Container ports use the engine's
//! `PORT/PROTOCOL` notation, for example `80/tcp`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use bollard::models::{PortBinding, PortMap};

use crate::error::ConfigError;

/// Transport protocol of a container port.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Protocol {
    /// TCP, the engine default.
    #[default]
    Tcp,
    /// UDP.
    Udp,
    /// SCTP.
    Sctp,
}

impl Protocol {
    /// Lowercase protocol name used by the engine.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::Udp => "udp",
            Self::Sctp => "sctp",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "tcp" => Ok(Self::Tcp),
            "udp" => Ok(Self::Udp),
            "sctp" => Ok(Self::Sctp),
            _ => Err(ConfigError::InvalidValue {
                field: String::from("protocol"),
                reason: format!("unsupported protocol '{value}'"),
            }),
        }
    }
}

/// A port inside the container together with its protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContainerPort {
    port: u16,
    protocol: Protocol,
}

impl ContainerPort {
    /// Create a container port with an explicit protocol.
    #[must_use]
    pub const fn new(port: u16, protocol: Protocol) -> Self {
        Self { port, protocol }
    }

    /// Create a TCP container port.
    #[must_use]
    pub const fn tcp(port: u16) -> Self {
        Self::new(port, Protocol::Tcp)
    }

    /// Create a UDP container port.
    #[must_use]
    pub const fn udp(port: u16) -> Self {
        Self::new(port, Protocol::Udp)
    }

    /// Port number.
    #[must_use]
    pub const fn port(self) -> u16 {
        self.port
    }

    /// Transport protocol.
    #[must_use]
    pub const fn protocol(self) -> Protocol {
        self.protocol
    }
}

impl fmt::Display for ContainerPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.port, self.protocol)
    }
}

impl FromStr for ContainerPort {
    type Err = ConfigError;

    /// Parse `PORT` or `PORT/PROTOCOL`; a bare port is TCP.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (raw_port, protocol) = match value.trim().split_once('/') {
            Some((port, protocol)) => (port, protocol.parse::<Protocol>()?),
            None => (value.trim(), Protocol::Tcp),
        };
        let port = raw_port.parse().map_err(|_| ConfigError::InvalidValue {
            field: String::from("port"),
            reason: format!("'{value}' is not a valid container port"),
        })?;

        Ok(Self::new(port, protocol))
    }
}

/// Where a container port is published on the host.
///
/// An absent host IP binds every interface; an absent host port lets the
/// engine pick an ephemeral one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostBinding {
    host_ip: Option<String>,
    host_port: Option<u16>,
}

impl HostBinding {
    /// Publish on the given host port on all interfaces.
    #[must_use]
    pub const fn port(host_port: u16) -> Self {
        Self {
            host_ip: None,
            host_port: Some(host_port),
        }
    }

    /// Let the engine choose the host port.
    #[must_use]
    pub const fn ephemeral() -> Self {
        Self {
            host_ip: None,
            host_port: None,
        }
    }

    /// Restrict the binding to a single host interface.
    #[must_use]
    pub fn on_ip(mut self, host_ip: impl Into<String>) -> Self {
        self.host_ip = Some(host_ip.into());
        self
    }

    /// Host interface, if restricted.
    #[must_use]
    pub fn host_ip(&self) -> Option<&str> {
        self.host_ip.as_deref()
    }

    /// Host port, if fixed.
    #[must_use]
    pub const fn host_port(&self) -> Option<u16> {
        self.host_port
    }

    fn to_port_binding(&self) -> PortBinding {
        PortBinding {
            host_ip: self.host_ip.clone(),
            host_port: self.host_port.map(|port| port.to_string()),
        }
    }
}

/// Container ports and the host bindings they are published on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortMappings(BTreeMap<ContainerPort, Vec<HostBinding>>);

impl PortMappings {
    /// Create an empty mapping.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Add a host binding for a container port.
    ///
    /// A container port may be published on several host bindings.
    pub fn insert(&mut self, container_port: ContainerPort, binding: HostBinding) {
        self.0.entry(container_port).or_default().push(binding);
    }

    /// Builder-style variant of [`Self::insert`].
    #[must_use]
    pub fn bind(mut self, container_port: ContainerPort, binding: HostBinding) -> Self {
        self.insert(container_port, binding);
        self
    }

    /// Host bindings for a container port.
    #[must_use]
    pub fn get(&self, container_port: ContainerPort) -> Option<&[HostBinding]> {
        self.0.get(&container_port).map(Vec::as_slice)
    }

    /// Number of distinct container ports.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no ports are mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over container ports and their bindings in port order.
    pub fn iter(&self) -> impl Iterator<Item = (ContainerPort, &[HostBinding])> {
        self.0
            .iter()
            .map(|(port, bindings)| (*port, bindings.as_slice()))
    }

    /// Convert into the engine's host-config port binding map.
    #[must_use]
    pub fn to_port_map(&self) -> PortMap {
        self.0
            .iter()
            .map(|(port, bindings)| {
                let engine_bindings: Vec<PortBinding> =
                    bindings.iter().map(HostBinding::to_port_binding).collect();
                (port.to_string(), Some(engine_bindings))
            })
            .collect()
    }
}

impl FromIterator<(ContainerPort, HostBinding)> for PortMappings {
    fn from_iter<T: IntoIterator<Item = (ContainerPort, HostBinding)>>(iter: T) -> Self {
        let mut mappings = Self::new();
        for (port, binding) in iter {
            mappings.insert(port, binding);
        }
        mappings
    }
}
