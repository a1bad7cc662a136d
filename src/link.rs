//! Links (network interfaces) and uplink lookup.

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::address::AddressConfig;
use crate::network::Network;
use crate::service::ServiceKind;
use crate::uplink::{Uplink, UplinkLease};

/// Server addresses a link learned from its own DHCP lease.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaseInfo {
    pub dns: Vec<Ipv4Addr>,
    pub ntp: Vec<Ipv4Addr>,
    pub sip: Vec<Ipv4Addr>,
    pub pop3: Vec<Ipv4Addr>,
    pub smtp: Vec<Ipv4Addr>,
    pub lpr: Vec<Ipv4Addr>,
}

impl UplinkLease for LeaseInfo {
    fn dns(&self) -> Vec<Ipv4Addr> {
        self.dns.clone()
    }

    fn servers(&self, kind: ServiceKind) -> Vec<Ipv4Addr> {
        match kind {
            ServiceKind::Dns => self.dns.clone(),
            ServiceKind::Ntp => self.ntp.clone(),
            ServiceKind::Sip => self.sip.clone(),
            ServiceKind::Pop3 => self.pop3.clone(),
            ServiceKind::Smtp => self.smtp.clone(),
            ServiceKind::Lpr => self.lpr.clone(),
        }
    }
}

/// A network interface.
#[derive(Debug, Clone, Default)]
pub struct Link {
    pub name: String,
    /// `None` when the link is not managed.
    pub network: Option<Network>,
    /// Addresses assigned from a shared address pool.
    pub pool_addresses: Vec<AddressConfig>,
    /// The lease the link currently holds as a DHCP client.
    pub dhcp_lease: Option<LeaseInfo>,
}

impl Link {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Returns this link viewed as an uplink, or `None` if it is not managed.
    pub fn as_uplink(&self) -> Option<Uplink<'_>> {
        let network = self.network.as_ref()?;
        Some(Uplink {
            name: &self.name,
            network,
            lease: self.dhcp_lease.as_ref().map(|lease| lease as &dyn UplinkLease),
        })
    }
}

/// Locates the uplink of a link.
///
/// Which link qualifies as uplink is a policy of the caller.
pub trait UplinkFinder {
    fn find_uplink(&self, link: &Link) -> Option<&Link>;
}

/// All known links, with an optional uplink chosen by name.
#[derive(Debug, Clone, Default)]
pub struct Links {
    links: Vec<Link>,
    uplink: Option<String>,
}

impl Links {
    pub fn new(links: Vec<Link>, uplink: Option<String>) -> Self {
        Self { links, uplink }
    }

    pub fn get(&self, name: &str) -> Option<&Link> {
        self.links.iter().find(|link| link.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Link> {
        self.links.iter()
    }
}

impl UplinkFinder for Links {
    fn find_uplink(&self, link: &Link) -> Option<&Link> {
        let name = self.uplink.as_deref()?;
        if name == link.name {
            return None;
        }
        self.get(name)
    }
}
