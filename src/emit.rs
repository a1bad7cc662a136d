//! Chooses the server addresses advertised for each service kind.
//!
//! Precedence per kind:
//!
//! 1. Servers configured explicitly for this DHCP server.
//! 2. Nothing, if emitting the kind is disabled.
//! 3. Servers of the uplink (its own configuration, then its DHCP lease).
//! 4. For DNS only, when there is no managed uplink: the resolver file.

use std::net::Ipv4Addr;

use tracing::{debug, warn};

use crate::config::Environment;
use crate::error::Result;
use crate::link::{Link, UplinkFinder};
use crate::network::Network;
use crate::resolv::servers_from_resolv_conf;
use crate::server::DhcpServer;
use crate::service::ServiceKind;
use crate::uplink;

fn push_servers(
    server: &mut dyn DhcpServer,
    kind: ServiceKind,
    addresses: &[Ipv4Addr],
) -> Result<()> {
    match kind {
        ServiceKind::Dns => server.set_dns(addresses),
        _ => server.set_servers(kind, addresses),
    }
}

/// Pushes the servers of every kind in [`ServiceKind::ALL`] into `server`.
///
/// Failures are logged per kind and never abort the remaining kinds.
pub fn emit_servers(
    link: &Link,
    network: &Network,
    uplinks: &dyn UplinkFinder,
    server: &mut dyn DhcpServer,
    environment: &Environment,
) {
    let settings = &network.dhcp_server;
    let mut found: Option<Option<&Link>> = None;

    for kind in ServiceKind::ALL {
        let configured = &settings.servers[kind];

        let result = if !configured.is_empty() {
            push_servers(server, kind, configured)
        } else if !settings.emit[kind] {
            continue;
        } else {
            let uplink = *found.get_or_insert_with(|| uplinks.find_uplink(link));

            let addresses = match uplink.and_then(Link::as_uplink) {
                Some(uplink) => uplink::resolve(&uplink, kind),
                None if kind == ServiceKind::Dns => {
                    servers_from_resolv_conf(&environment.resolv_conf)
                }
                None => {
                    debug!(
                        "Not emitting {} on link {}, couldn't find suitable uplink.",
                        kind, link.name
                    );
                    continue;
                }
            };

            if addresses.is_empty() {
                continue;
            }
            push_servers(server, kind, addresses.as_slice())
        };

        if let Err(error) = result {
            warn!(
                "{}: Failed to set {} for DHCP server, ignoring: {}",
                link.name, kind, error
            );
        }
    }
}
