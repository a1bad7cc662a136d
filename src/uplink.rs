//! Server addresses learned from the uplink.
//!
//! A link without explicitly configured servers passes on those of its
//! uplink: first the ones configured on the uplink itself, then the ones the
//! uplink received in its own DHCP lease.

use std::net::{IpAddr, Ipv4Addr};

use tracing::debug;

use crate::address::{ServerAddresses, parse_dns_server};
use crate::network::Network;
use crate::service::ServiceKind;

/// Server addresses carried by a DHCP client lease.
pub trait UplinkLease {
    fn dns(&self) -> Vec<Ipv4Addr>;
    fn servers(&self, kind: ServiceKind) -> Vec<Ipv4Addr>;
}

/// A managed link serving as uplink.
#[derive(Clone, Copy)]
pub struct Uplink<'a> {
    pub name: &'a str,
    pub network: &'a Network,
    pub lease: Option<&'a dyn UplinkLease>,
}

impl std::fmt::Debug for Uplink<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Uplink")
            .field("name", &self.name)
            .field("has_lease", &self.lease.is_some())
            .finish()
    }
}

/// Collects the uplink's servers of `kind`. Never fails; may be empty.
pub fn resolve(uplink: &Uplink<'_>, kind: ServiceKind) -> ServerAddresses {
    debug!("Copying {} from link {}", kind, uplink.name);

    let mut addresses = ServerAddresses::new();
    let configured = &uplink.network.servers[kind];

    match kind {
        ServiceKind::Dns => {
            for word in configured {
                match parse_dns_server(word) {
                    Ok(IpAddr::V4(address)) => {
                        addresses.push_if_usable(address);
                    }
                    Ok(IpAddr::V6(_)) => {}
                    Err(error) => debug!("Skipping DNS server of {}: {}", uplink.name, error),
                }
            }
        }
        _ => {
            for word in configured {
                match word.parse::<Ipv4Addr>() {
                    Ok(address) => {
                        addresses.push_if_usable(address);
                    }
                    Err(_) => debug!("Skipping non-IPv4 {} entry '{}'", kind, word),
                }
            }
        }
    }

    if uplink.network.dhcp_use(kind)
        && let Some(lease) = uplink.lease
    {
        let learned = match kind {
            ServiceKind::Dns => lease.dns(),
            _ => lease.servers(kind),
        };
        addresses.extend_usable(learned);
    }

    addresses
}
