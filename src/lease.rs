//! Static DHCP lease bindings.
//!
//! A static lease pins one client to one IPv4 address. It is configured as a
//! `"<hardware-address> <ipv4-address>"` pair and keyed by the DHCP client
//! identifier derived from the hardware address:
//!
//! ```text
//! aa:bb:cc:dd:ee:ff 192.168.1.50   ->   01:aa:bb:cc:dd:ee:ff => 192.168.1.50
//! ```
//!
//! The client identifier is the hardware type byte (1, Ethernet) followed by
//! the six address bytes, which is what most clients send in Option 61.

use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use tracing::warn;

use crate::error::{Error, Result};

/// Hardware type for Ethernet (RFC 1700).
pub const HTYPE_ETHERNET: u8 = 1;

/// Length of an Ethernet hardware address.
pub const ETHER_ADDR_LEN: usize = 6;

/// Encodes bytes as a colon-separated lowercase hex string.
fn encode_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect::<Vec<_>>()
        .join(":")
}

/// A 48-bit Ethernet hardware address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HwAddr(pub [u8; ETHER_ADDR_LEN]);

impl HwAddr {
    /// Parses `groups` as hex groups each holding `bytes_per_group` bytes.
    fn from_groups<'a>(
        groups: impl Iterator<Item = &'a str>,
        bytes_per_group: usize,
    ) -> Option<[u8; ETHER_ADDR_LEN]> {
        let max_digits = bytes_per_group * 2;
        let mut octets = [0u8; ETHER_ADDR_LEN];
        let mut filled = 0;

        for group in groups {
            if group.is_empty()
                || group.len() > max_digits
                || filled + bytes_per_group > ETHER_ADDR_LEN
            {
                return None;
            }
            let value = u32::from_str_radix(group, 16).ok()?;
            let bytes = value.to_be_bytes();
            octets[filled..filled + bytes_per_group].copy_from_slice(&bytes[4 - bytes_per_group..]);
            filled += bytes_per_group;
        }

        (filled == ETHER_ADDR_LEN).then_some(octets)
    }
}

impl FromStr for HwAddr {
    type Err = Error;

    /// Accepts `aa:bb:cc:dd:ee:ff`, `aa-bb-cc-dd-ee-ff` and `aabb.ccdd.eeff`.
    fn from_str(value: &str) -> Result<Self> {
        if value.chars().any(|c| !(c.is_ascii_hexdigit() || matches!(c, ':' | '-' | '.'))) {
            return Err(Error::InvalidHardwareAddress(value.to_string()));
        }

        let octets = if value.contains(':') {
            Self::from_groups(value.split(':'), 1)
        } else if value.contains('-') {
            Self::from_groups(value.split('-'), 1)
        } else if value.contains('.') {
            Self::from_groups(value.split('.'), 2)
        } else {
            None
        };

        octets
            .map(Self)
            .ok_or_else(|| Error::InvalidHardwareAddress(value.to_string()))
    }
}

impl std::fmt::Display for HwAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", encode_hex(&self.0))
    }
}

/// A DHCP client identifier (Option 61). Compared byte-wise.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientId(Vec<u8>);

impl ClientId {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<HwAddr> for ClientId {
    fn from(hw: HwAddr) -> Self {
        let mut id = Vec::with_capacity(ETHER_ADDR_LEN + 1);
        id.push(HTYPE_ETHERNET);
        id.extend_from_slice(&hw.0);
        Self(id)
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", encode_hex(&self.0))
    }
}

impl Serialize for ClientId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A client identifier pinned to a fixed address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaticLease {
    pub client_id: ClientId,
    pub address: Ipv4Addr,
}

impl StaticLease {
    pub fn new(client_id: ClientId, address: Ipv4Addr) -> Self {
        Self { client_id, address }
    }
}

impl FromStr for StaticLease {
    type Err = Error;

    /// Parses a `"<hardware-address> <ipv4-address>"` pair.
    fn from_str(value: &str) -> Result<Self> {
        let mut words = value.split_whitespace();

        let hw = words
            .next()
            .ok_or_else(|| Error::InvalidHardwareAddress(value.to_string()))?
            .parse::<HwAddr>()?;

        let address_word = words
            .next()
            .ok_or_else(|| Error::InvalidAddress(value.to_string()))?;
        let address = address_word
            .parse::<Ipv4Addr>()
            .map_err(|_| Error::InvalidAddress(address_word.to_string()))?;

        if let Some(extra) = words.next() {
            warn!(
                "Trailing garbage '{}' in static lease '{}', ignoring",
                extra, value
            );
        }

        Ok(Self::new(ClientId::from(hw), address))
    }
}

/// Ordered collection of static leases keyed by client identifier.
///
/// At most one lease exists per client identifier. Redefining a client
/// replaces its address and keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StaticLeases(Vec<StaticLease>);

impl StaticLeases {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one static lease configuration value.
    ///
    /// An empty value discards every binding. A malformed value is logged
    /// and leaves the registry untouched.
    pub fn parse_and_register(&mut self, value: &str) {
        if value.trim().is_empty() {
            self.clear();
            return;
        }

        match value.parse::<StaticLease>() {
            Ok(lease) => {
                self.insert(lease);
            }
            Err(Error::InvalidHardwareAddress(_)) => {
                warn!("Invalid hardware address, ignoring assignment: {}", value);
            }
            Err(error) => {
                warn!("Invalid IP address, ignoring assignment: {}: {}", value, error);
            }
        }
    }

    /// Inserts `lease`, returning the lease it replaced.
    pub fn insert(&mut self, lease: StaticLease) -> Option<StaticLease> {
        match self
            .0
            .iter_mut()
            .find(|existing| existing.client_id == lease.client_id)
        {
            Some(existing) => Some(std::mem::replace(existing, lease)),
            None => {
                self.0.push(lease);
                None
            }
        }
    }

    pub fn get(&self, client_id: &ClientId) -> Option<&StaticLease> {
        self.0.iter().find(|lease| lease.client_id == *client_id)
    }

    pub fn remove(&mut self, client_id: &ClientId) -> Option<StaticLease> {
        let position = self.0.iter().position(|lease| lease.client_id == *client_id)?;
        Some(self.0.remove(position))
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &StaticLease> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_client_id(mac: &[u8; 6]) -> ClientId {
        ClientId::from(HwAddr(*mac))
    }

    #[test]
    fn test_hw_addr_formats() {
        let expected = HwAddr([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
        assert_eq!("aa:bb:cc:dd:ee:ff".parse::<HwAddr>().unwrap(), expected);
        assert_eq!("AA:BB:CC:DD:EE:FF".parse::<HwAddr>().unwrap(), expected);
        assert_eq!("aa-bb-cc-dd-ee-ff".parse::<HwAddr>().unwrap(), expected);
        assert_eq!("aabb.ccdd.eeff".parse::<HwAddr>().unwrap(), expected);
        assert_eq!(
            "0:1:2:a:b:c".parse::<HwAddr>().unwrap(),
            HwAddr([0, 1, 2, 0xa, 0xb, 0xc])
        );
    }

    #[test]
    fn test_hw_addr_rejects_malformed() {
        for bad in [
            "",
            "aa:bb:cc:dd:ee",
            "aa:bb:cc:dd:ee:ff:00",
            "aa:bb:cc:dd:ee:fff",
            "aa:bb:cc:dd::ff",
            "aabbccddeeff",
            "aa:bb-cc:dd:ee:ff",
            "gg:bb:cc:dd:ee:ff",
            "+a:bb:cc:dd:ee:ff",
        ] {
            assert!(bad.parse::<HwAddr>().is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_client_id_synthesis() {
        let id = make_client_id(&[0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
        assert_eq!(id.as_bytes(), &[1, 0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
        assert_eq!(id.to_string(), "01:aa:bb:cc:dd:ee:ff");
    }

    #[test]
    fn test_parse_static_lease() {
        let lease: StaticLease = "aa:bb:cc:dd:ee:ff   10.0.0.5".parse().unwrap();
        assert_eq!(lease.address, Ipv4Addr::new(10, 0, 0, 5));
        assert_eq!(
            lease.client_id,
            make_client_id(&[0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff])
        );

        assert!(matches!(
            "zz:bb:cc:dd:ee:ff 10.0.0.5".parse::<StaticLease>(),
            Err(Error::InvalidHardwareAddress(_))
        ));
        assert!(matches!(
            "aa:bb:cc:dd:ee:ff".parse::<StaticLease>(),
            Err(Error::InvalidAddress(_))
        ));
        assert!(matches!(
            "aa:bb:cc:dd:ee:ff 10.0.0".parse::<StaticLease>(),
            Err(Error::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_redefinition_overwrites() {
        let mut leases = StaticLeases::new();
        leases.parse_and_register("AA:BB:CC:DD:EE:FF 10.0.0.5");
        leases.parse_and_register("AA:BB:CC:DD:EE:FF 10.0.0.9");

        assert_eq!(leases.len(), 1);
        let id = make_client_id(&[0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
        assert_eq!(leases.get(&id).unwrap().address, Ipv4Addr::new(10, 0, 0, 9));
    }

    #[test]
    fn test_redefinition_keeps_position() {
        let mut leases = StaticLeases::new();
        leases.parse_and_register("00:00:00:00:00:01 10.0.0.1");
        leases.parse_and_register("00:00:00:00:00:02 10.0.0.2");
        leases.parse_and_register("00:00:00:00:00:01 10.0.0.3");

        let addresses: Vec<Ipv4Addr> = leases.iter().map(|lease| lease.address).collect();
        assert_eq!(
            addresses,
            vec![Ipv4Addr::new(10, 0, 0, 3), Ipv4Addr::new(10, 0, 0, 2)]
        );
    }

    #[test]
    fn test_empty_value_resets() {
        let mut leases = StaticLeases::new();
        leases.parse_and_register("00:00:00:00:00:01 10.0.0.1");
        leases.parse_and_register("00:00:00:00:00:02 10.0.0.2");
        assert_eq!(leases.len(), 2);

        leases.parse_and_register("");
        assert!(leases.is_empty());
    }

    #[test]
    fn test_malformed_value_is_noop() {
        let mut leases = StaticLeases::new();
        leases.parse_and_register("00:00:00:00:00:01 10.0.0.1");
        let before = leases.clone();

        leases.parse_and_register("not-a-mac 10.0.0.2");
        leases.parse_and_register("00:00:00:00:00:02");
        leases.parse_and_register("00:00:00:00:00:02 fe80::1");

        assert_eq!(leases, before);
    }

    #[test]
    fn test_remove() {
        let mut leases = StaticLeases::new();
        leases.parse_and_register("00:00:00:00:00:01 10.0.0.1");
        let id = make_client_id(&[0, 0, 0, 0, 0, 1]);

        assert!(leases.remove(&id).is_some());
        assert!(leases.remove(&id).is_none());
        assert!(leases.is_empty());
    }
}
