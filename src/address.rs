//! Filtering and accumulation of advertised server addresses.

use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use serde::Serialize;
use tracing::trace;

use crate::error::{Error, Result};

/// Returns true if `addr` may be advertised to clients.
///
/// The unspecified address and the whole loopback range are never handed out.
pub fn is_usable(addr: Ipv4Addr) -> bool {
    !addr.is_unspecified() && !addr.is_loopback()
}

/// Ordered list of server addresses gathered from one or more sources.
///
/// Duplicates are kept; every entry has passed [`is_usable`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ServerAddresses(Vec<Ipv4Addr>);

impl ServerAddresses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `candidate` if it is usable. Returns whether it was kept.
    pub fn push_if_usable(&mut self, candidate: Ipv4Addr) -> bool {
        if !is_usable(candidate) {
            trace!("Dropping unusable server address {}", candidate);
            return false;
        }
        self.0.push(candidate);
        true
    }

    /// Appends every usable address from `candidates`, preserving order.
    pub fn extend_usable<I>(&mut self, candidates: I)
    where
        I: IntoIterator<Item = Ipv4Addr>,
    {
        for candidate in candidates {
            self.push_if_usable(candidate);
        }
    }

    pub fn as_slice(&self) -> &[Ipv4Addr] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<Ipv4Addr> {
        self.0
    }
}

impl FromIterator<Ipv4Addr> for ServerAddresses {
    fn from_iter<I: IntoIterator<Item = Ipv4Addr>>(iter: I) -> Self {
        let mut addresses = Self::new();
        addresses.extend_usable(iter);
        addresses
    }
}

/// Parses one DNS server word as written in a resolver or network file.
///
/// Besides a bare address, `address%ifname` and `address#server-name` are
/// accepted; the suffixes are stripped.
pub fn parse_dns_server(word: &str) -> Result<IpAddr> {
    let address = word.split_once('#').map_or(word, |(address, _)| address);
    let address = address.split_once('%').map_or(address, |(address, _)| address);
    address
        .parse()
        .map_err(|_| Error::InvalidAddress(word.to_string()))
}

/// An address assigned to an interface, with its prefix length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AddressConfig {
    pub address: IpAddr,
    pub prefix_len: u8,
}

impl AddressConfig {
    pub fn ipv4(&self) -> Option<Ipv4Addr> {
        match self.address {
            IpAddr::V4(address) => Some(address),
            IpAddr::V6(_) => None,
        }
    }
}

impl FromStr for AddressConfig {
    type Err = Error;

    /// Parses `address/prefix`. A bare address gets the host prefix length.
    fn from_str(value: &str) -> Result<Self> {
        let invalid = || Error::InvalidAddress(value.to_string());
        let (address, prefix_len) = match value.split_once('/') {
            Some((address, prefix)) => (address, Some(prefix)),
            None => (value, None),
        };

        let address: IpAddr = address.parse().map_err(|_| invalid())?;
        let max_prefix = if address.is_ipv4() { 32 } else { 128 };
        let prefix_len = match prefix_len {
            Some(prefix) => prefix.parse::<u8>().map_err(|_| invalid())?,
            None => max_prefix,
        };
        if prefix_len > max_prefix {
            return Err(invalid());
        }

        Ok(Self {
            address,
            prefix_len,
        })
    }
}

impl std::fmt::Display for AddressConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix_len)
    }
}
