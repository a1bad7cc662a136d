use std::net::Ipv4Addr;

use serde::Serialize;
use tracing::{debug, error, info};

use crate::address::AddressConfig;
use crate::config::Environment;
use crate::emit::emit_servers;
use crate::error::{Error, Result};
use crate::lease::StaticLease;
use crate::link::{Link, UplinkFinder};
use crate::options::SendOption;
use crate::service::ServiceKind;
use crate::timezone::host_timezone;

const USEC_PER_SEC: u64 = 1_000_000;

/// Address pool of a DHCP server, derived from one interface address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolConfig {
    pub address: Ipv4Addr,
    pub prefix_len: u8,
    /// Offset of the first assignable address within the subnet; 0 picks
    /// the server default.
    pub offset: u32,
    /// Number of assignable addresses; 0 uses the rest of the subnet.
    pub size: u32,
}

/// A DHCPv4 server instance that accepts configuration.
///
/// Implemented by the protocol engine. Methods that store keyed values
/// return [`Error::AlreadyExists`] when the key is already present.
pub trait DhcpServer {
    fn configure_pool(&mut self, pool: &PoolConfig) -> Result<()>;
    fn set_max_lease_time(&mut self, seconds: u32) -> Result<()>;
    fn set_default_lease_time(&mut self, seconds: u32) -> Result<()>;
    fn set_servers(&mut self, kind: ServiceKind, addresses: &[Ipv4Addr]) -> Result<()>;
    fn set_dns(&mut self, addresses: &[Ipv4Addr]) -> Result<()>;
    fn set_emit_router(&mut self, enabled: bool) -> Result<()>;
    fn set_timezone(&mut self, timezone: &str) -> Result<()>;
    fn add_option(&mut self, option: &SendOption) -> Result<()>;
    fn add_vendor_option(&mut self, option: &SendOption) -> Result<()>;
    fn add_static_lease(&mut self, lease: &StaticLease) -> Result<()>;
    fn is_running(&self) -> bool;
    fn start(&mut self) -> Result<()>;
}

/// Returns the address whose subnet becomes the server's pool.
///
/// The first static IPv4 address of the link wins; otherwise the first IPv4
/// address the link obtained from an address pool.
pub fn find_server_address(link: &Link) -> Option<AddressConfig> {
    let configured = link
        .network
        .iter()
        .flat_map(|network| network.addresses.iter())
        .find(|address| address.ipv4().is_some_and(|ip| !ip.is_unspecified()));

    configured
        .or_else(|| {
            link.pool_addresses
                .iter()
                .find(|address| address.ipv4().is_some())
        })
        .copied()
}

/// Converts microseconds to whole seconds, rounding up.
fn usec_to_secs(usec: u64) -> u32 {
    u32::try_from(usec.div_ceil(USEC_PER_SEC)).unwrap_or(u32::MAX)
}

/// Logs a failed step that aborts the configuration of `link`.
fn fatal(link: &Link, what: &str, error: Error) -> Error {
    error!("{}: {}: {}", link.name, what, error);
    error
}

/// Applies the configuration of `link` to its DHCP server and starts it.
///
/// Failures to emit an individual service kind are logged and ignored. Any
/// other failure aborts the pass and is returned.
pub fn configure(
    link: &Link,
    uplinks: &dyn UplinkFinder,
    server: &mut dyn DhcpServer,
    environment: &Environment,
) -> Result<()> {
    let network = link
        .network
        .as_ref()
        .ok_or_else(|| Error::InvalidConfig(format!("link {} is not managed", link.name)))?;
    let settings = &network.dhcp_server;

    let address = find_server_address(link).ok_or_else(|| {
        fatal(
            link,
            "Failed to find suitable address for DHCPv4 server instance",
            Error::NoServerAddress(link.name.clone()),
        )
    })?;
    let pool = PoolConfig {
        address: address.ipv4().ok_or_else(|| Error::NoServerAddress(link.name.clone()))?,
        prefix_len: address.prefix_len,
        offset: settings.pool_offset,
        size: settings.pool_size,
    };
    server
        .configure_pool(&pool)
        .map_err(|e| fatal(link, "Failed to configure address pool", e))?;

    if settings.max_lease_time_usec > 0 {
        server
            .set_max_lease_time(usec_to_secs(settings.max_lease_time_usec))
            .map_err(|e| fatal(link, "Failed to set maximum lease time", e))?;
    }
    if settings.default_lease_time_usec > 0 {
        server
            .set_default_lease_time(usec_to_secs(settings.default_lease_time_usec))
            .map_err(|e| fatal(link, "Failed to set default lease time", e))?;
    }

    emit_servers(link, network, uplinks, server, environment);

    server
        .set_emit_router(settings.emit_router)
        .map_err(|e| fatal(link, "Failed to set router emission", e))?;

    if settings.emit_timezone {
        let timezone = match &settings.timezone {
            Some(timezone) => timezone.clone(),
            None => host_timezone(&environment.localtime)
                .map_err(|e| fatal(link, "Failed to determine timezone", e))?,
        };
        server
            .set_timezone(&timezone)
            .map_err(|e| fatal(link, "Failed to set timezone", e))?;
    }

    for option in settings.send_options.iter() {
        match server.add_option(option) {
            Ok(()) | Err(Error::AlreadyExists(_)) => {}
            Err(e) => return Err(fatal(link, "Failed to set DHCPv4 option", e)),
        }
    }
    for option in settings.send_vendor_options.iter() {
        match server.add_vendor_option(option) {
            Ok(()) | Err(Error::AlreadyExists(_)) => {}
            Err(e) => return Err(fatal(link, "Failed to set DHCPv4 vendor option", e)),
        }
    }
    for lease in settings.static_leases.iter() {
        match server.add_static_lease(lease) {
            Ok(()) | Err(Error::AlreadyExists(_)) => {}
            Err(e) => return Err(fatal(link, "Failed to set DHCPv4 static lease", e)),
        }
    }

    if server.is_running() {
        debug!("{}: DHCPv4 server already running", link.name);
    } else {
        server
            .start()
            .map_err(|e| fatal(link, "Could not start DHCPv4 server instance", e))?;
        info!("{}: DHCPv4 server started on {}", link.name, address);
    }

    Ok(())
}
