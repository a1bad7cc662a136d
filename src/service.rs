//! Auxiliary service kinds a DHCPv4 server can advertise.
//!
//! Each kind maps to one server-list option of RFC 2132 / RFC 3361. The
//! server configuration pass walks them in [`ServiceKind::ALL`] order.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// A service whose server addresses are handed out to DHCP clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(usize)]
pub enum ServiceKind {
    /// Domain name servers (Option 6).
    Dns = 0,
    /// Network time servers (Option 42).
    Ntp = 1,
    /// SIP servers (Option 120).
    Sip = 2,
    /// POP3 servers (Option 70).
    Pop3 = 3,
    /// SMTP servers (Option 69).
    Smtp = 4,
    /// LPR servers (Option 9).
    Lpr = 5,
}

impl ServiceKind {
    /// Every kind, in configuration order.
    pub const ALL: [ServiceKind; 6] = [
        Self::Dns,
        Self::Ntp,
        Self::Sip,
        Self::Pop3,
        Self::Smtp,
        Self::Lpr,
    ];

    /// Returns the DHCP option code carrying this kind's server list.
    pub fn option_code(self) -> u8 {
        match self {
            Self::Dns => 6,
            Self::Ntp => 42,
            Self::Sip => 120,
            Self::Pop3 => 70,
            Self::Smtp => 69,
            Self::Lpr => 9,
        }
    }
}

impl std::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dns => write!(f, "DNS servers"),
            Self::Ntp => write!(f, "NTP servers"),
            Self::Sip => write!(f, "SIP servers"),
            Self::Pop3 => write!(f, "POP3 servers"),
            Self::Smtp => write!(f, "SMTP servers"),
            Self::Lpr => write!(f, "LPR servers"),
        }
    }
}

/// Fixed-size table holding one value per [`ServiceKind`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceTable<T>([T; 6]);

impl<T> ServiceTable<T> {
    pub fn new(values: [T; 6]) -> Self {
        Self(values)
    }

    /// Iterates `(kind, value)` pairs in [`ServiceKind::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (ServiceKind, &T)> {
        ServiceKind::ALL.into_iter().zip(self.0.iter())
    }
}

impl<T> Index<ServiceKind> for ServiceTable<T> {
    type Output = T;

    fn index(&self, kind: ServiceKind) -> &T {
        &self.0[kind as usize]
    }
}

impl<T> IndexMut<ServiceKind> for ServiceTable<T> {
    fn index_mut(&mut self, kind: ServiceKind) -> &mut T {
        &mut self.0[kind as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_order_matches_discriminants() {
        for (index, kind) in ServiceKind::ALL.iter().enumerate() {
            assert_eq!(*kind as usize, index);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(ServiceKind::Dns.to_string(), "DNS servers");
        assert_eq!(ServiceKind::Pop3.to_string(), "POP3 servers");
    }

    #[test]
    fn test_table_indexing() {
        let mut table: ServiceTable<u32> = ServiceTable::default();
        table[ServiceKind::Sip] = 7;
        assert_eq!(table[ServiceKind::Sip], 7);
        assert_eq!(table[ServiceKind::Dns], 0);

        let kinds: Vec<ServiceKind> = table.iter().map(|(kind, _)| kind).collect();
        assert_eq!(kinds, ServiceKind::ALL.to_vec());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&ServiceKind::Smtp).unwrap();
        assert_eq!(json, "\"smtp\"");
    }
}
