//! In-memory DHCP server object.
//!
//! [`ServerState`] accepts the configuration pushed by
//! [`configure`](crate::configure) and keeps it for inspection. It performs
//! the same validation a protocol engine would before handing out leases.

use std::net::Ipv4Addr;

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::lease::{StaticLease, StaticLeases};
use crate::options::{SendOption, SendOptions};
use crate::server::{DhcpServer, PoolConfig};
use crate::service::{ServiceKind, ServiceTable};
use crate::timezone::is_valid_timezone;

/// First and last assignable address of a configured pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolRange {
    pub start: Ipv4Addr,
    pub end: Ipv4Addr,
}

impl PoolRange {
    /// Computes the assignable range of `pool`.
    ///
    /// The network and broadcast addresses are never assigned. An offset of
    /// 0 starts right after the network address; a size of 0 extends the
    /// range to the last host address.
    pub fn from_pool(pool: &PoolConfig) -> Result<Self> {
        if pool.prefix_len > 30 {
            return Err(Error::Rejected(format!(
                "prefix length {} leaves no room for a pool",
                pool.prefix_len
            )));
        }

        let host_bits = 32 - u32::from(pool.prefix_len);
        let subnet_size = 1u64 << host_bits;
        let netmask = u32::MAX.checked_shl(host_bits).unwrap_or(0);
        let network = u32::from(pool.address) & netmask;

        let offset = u64::from(pool.offset.max(1));
        let last_host = subnet_size - 2;
        if offset > last_host {
            return Err(Error::Rejected(format!(
                "pool offset {} exceeds /{} subnet",
                pool.offset, pool.prefix_len
            )));
        }

        let size = match pool.size {
            0 => last_host - offset + 1,
            size => u64::from(size),
        };
        if offset + size - 1 > last_host {
            return Err(Error::Rejected(format!(
                "pool of {} addresses at offset {} exceeds /{} subnet",
                size, offset, pool.prefix_len
            )));
        }

        // Both bounds are below the broadcast address, so they fit in u32.
        let start = network + offset as u32;
        let end = start + (size - 1) as u32;
        Ok(Self {
            start: Ipv4Addr::from(start),
            end: Ipv4Addr::from(end),
        })
    }

    pub fn contains(&self, address: Ipv4Addr) -> bool {
        (self.start..=self.end).contains(&address)
    }

    pub fn len(&self) -> u32 {
        u32::from(self.end) - u32::from(self.start) + 1
    }
}

/// Configuration held by a DHCP server instance.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ServerState {
    pub pool: Option<PoolConfig>,
    pub range: Option<PoolRange>,
    pub max_lease_time: Option<u32>,
    pub default_lease_time: Option<u32>,
    pub servers: ServiceTable<Vec<Ipv4Addr>>,
    pub emit_router: bool,
    pub timezone: Option<String>,
    pub options: SendOptions,
    pub vendor_options: SendOptions,
    pub static_leases: StaticLeases,
    pub running: bool,
}

impl ServerState {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_lease_time(seconds: u32, what: &str) -> Result<()> {
        if seconds == 0 {
            return Err(Error::Rejected(format!("{} lease time must be positive", what)));
        }
        Ok(())
    }
}

impl DhcpServer for ServerState {
    fn configure_pool(&mut self, pool: &PoolConfig) -> Result<()> {
        if self.pool.as_ref() == Some(pool) {
            return Ok(());
        }
        if self.running {
            return Err(Error::Rejected(
                "cannot change the address pool of a running server".to_string(),
            ));
        }

        let range = PoolRange::from_pool(pool)?;
        debug!("Address pool {} - {} ({} addresses)", range.start, range.end, range.len());
        self.pool = Some(*pool);
        self.range = Some(range);
        Ok(())
    }

    fn set_max_lease_time(&mut self, seconds: u32) -> Result<()> {
        Self::check_lease_time(seconds, "maximum")?;
        if let Some(default) = self.default_lease_time
            && default > seconds
        {
            return Err(Error::Rejected(format!(
                "maximum lease time {}s is below default lease time {}s",
                seconds, default
            )));
        }
        self.max_lease_time = Some(seconds);
        Ok(())
    }

    fn set_default_lease_time(&mut self, seconds: u32) -> Result<()> {
        Self::check_lease_time(seconds, "default")?;
        if let Some(max) = self.max_lease_time
            && seconds > max
        {
            return Err(Error::Rejected(format!(
                "default lease time {}s exceeds maximum lease time {}s",
                seconds, max
            )));
        }
        self.default_lease_time = Some(seconds);
        Ok(())
    }

    fn set_servers(&mut self, kind: ServiceKind, addresses: &[Ipv4Addr]) -> Result<()> {
        self.servers[kind] = addresses.to_vec();
        Ok(())
    }

    fn set_dns(&mut self, addresses: &[Ipv4Addr]) -> Result<()> {
        self.set_servers(ServiceKind::Dns, addresses)
    }

    fn set_emit_router(&mut self, enabled: bool) -> Result<()> {
        self.emit_router = enabled;
        Ok(())
    }

    fn set_timezone(&mut self, timezone: &str) -> Result<()> {
        if !is_valid_timezone(timezone) {
            return Err(Error::Rejected(format!("invalid timezone '{}'", timezone)));
        }
        self.timezone = Some(timezone.to_string());
        Ok(())
    }

    fn add_option(&mut self, option: &SendOption) -> Result<()> {
        if self.options.get(option.code).is_some() {
            return Err(Error::AlreadyExists(format!("option {}", option.code)));
        }
        self.options.insert(option.clone());
        Ok(())
    }

    fn add_vendor_option(&mut self, option: &SendOption) -> Result<()> {
        if self.vendor_options.get(option.code).is_some() {
            return Err(Error::AlreadyExists(format!("vendor option {}", option.code)));
        }
        self.vendor_options.insert(option.clone());
        Ok(())
    }

    fn add_static_lease(&mut self, lease: &StaticLease) -> Result<()> {
        if self.static_leases.get(&lease.client_id).is_some() {
            return Err(Error::AlreadyExists(format!(
                "static lease for client {}",
                lease.client_id
            )));
        }
        self.static_leases.insert(lease.clone());
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn start(&mut self) -> Result<()> {
        if self.pool.is_none() {
            return Err(Error::Rejected("no address pool configured".to_string()));
        }
        self.running = true;
        Ok(())
    }
}
