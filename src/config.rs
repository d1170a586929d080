//! Host-provided configuration: interfaces and routes (spec §3, §6).
//!
//! Interfaces and routes are static, configured once at startup and
//! immutable thereafter. The host hands them to `Router::new`; this module
//! validates them up front instead of discovering a broken reference
//! mid-dispatch.

use crate::error::RouterError;
use crate::types::{Ipv4Address, MacAddress};

/// A named endpoint with a MAC and an IPv4 address (spec §3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    pub name: String,
    pub mac: MacAddress,
    pub ip: Ipv4Address,
}

impl Interface {
    pub fn new(name: impl Into<String>, mac: MacAddress, ip: Ipv4Address) -> Self {
        Self {
            name: name.into(),
            mac,
            ip,
        }
    }
}

/// A routing-table entry: destination, gateway, and outgoing interface
/// (spec §3). `netmask` is accepted from the host but unused — lookup is
/// exact-match on destination, not longest-prefix match (spec §1, §9).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub destination: Ipv4Address,
    pub gateway: Ipv4Address,
    pub netmask: Ipv4Address,
    pub interface: String,
}

impl Route {
    pub fn new(
        destination: Ipv4Address,
        gateway: Ipv4Address,
        netmask: Ipv4Address,
        interface: impl Into<String>,
    ) -> Self {
        Self {
            destination,
            gateway,
            netmask,
            interface: interface.into(),
        }
    }
}

/// The host's static startup configuration: an ordered list of interfaces
/// and an ordered list of routes (spec §6).
#[derive(Debug, Clone, Default)]
pub struct RouterConfig {
    pub interfaces: Vec<Interface>,
    pub routes: Vec<Route>,
}

impl RouterConfig {
    pub fn new(interfaces: Vec<Interface>, routes: Vec<Route>) -> Self {
        Self { interfaces, routes }
    }

    /// Rejects duplicate interface names and routes naming an interface
    /// that was never configured.
    pub(crate) fn validate(&self) -> Result<(), RouterError> {
        for (i, a) in self.interfaces.iter().enumerate() {
            for b in &self.interfaces[i + 1..] {
                if a.name == b.name {
                    return Err(RouterError::InvalidConfig(format!(
                        "duplicate interface name: {}",
                        a.name
                    )));
                }
            }
        }

        for route in &self.routes {
            if !self.interfaces.iter().any(|i| i.name == route.interface) {
                return Err(RouterError::InvalidConfig(format!(
                    "route names unconfigured interface: {}",
                    route.interface
                )));
            }
        }

        Ok(())
    }

    pub fn interface(&self, name: &str) -> Option<&Interface> {
        self.interfaces.iter().find(|i| i.name == name)
    }

    pub fn interface_by_ip(&self, ip: Ipv4Address) -> Option<&Interface> {
        self.interfaces.iter().find(|i| i.ip == ip)
    }

    /// Exact-match lookup on destination; the first configured route is the
    /// default when nothing matches (spec §3, §4.4, §9).
    pub fn route_for(&self, destination: Ipv4Address) -> Option<&Route> {
        self.routes
            .iter()
            .find(|r| r.destination == destination)
            .or_else(|| self.routes.first())
    }
}
