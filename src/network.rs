//! Parsed per-link network configuration.
//!
//! [`Network::from_config`] turns a [`NetworkConfig`] into the typed form the
//! configuration pass works on. It is re-run from scratch whenever a link's
//! configuration is applied, so nothing here outlives a reload.

use std::net::Ipv4Addr;

use serde::Serialize;
use tracing::warn;

use crate::address::AddressConfig;
use crate::config::NetworkConfig;
use crate::error::{Error, Result};
use crate::lease::StaticLeases;
use crate::options::SendOptions;
use crate::service::{ServiceKind, ServiceTable};

/// Parses a space-separated list of IPv4 server addresses.
///
/// Words that are not IPv4 addresses are logged and skipped. No further
/// filtering is applied: explicitly configured servers are emitted verbatim.
pub fn parse_server_list(key: &str, value: &str) -> Vec<Ipv4Addr> {
    value
        .split_whitespace()
        .filter_map(|word| match word.parse::<Ipv4Addr>() {
            Ok(address) => Some(address),
            Err(_) => {
                warn!("Failed to parse {}= address '{}', ignoring", key, word);
                None
            }
        })
        .collect()
}

/// Settings of the DHCP server running on a link.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DhcpServerSettings {
    pub pool_offset: u32,
    pub pool_size: u32,
    pub max_lease_time_usec: u64,
    pub default_lease_time_usec: u64,
    /// Whether each kind is advertised when no servers are configured.
    pub emit: ServiceTable<bool>,
    /// Servers configured explicitly for this server.
    pub servers: ServiceTable<Vec<Ipv4Addr>>,
    pub emit_router: bool,
    pub emit_timezone: bool,
    pub timezone: Option<String>,
    pub send_options: SendOptions,
    pub send_vendor_options: SendOptions,
    pub static_leases: StaticLeases,
}

/// Typed network configuration of one link.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Network {
    /// Statically configured addresses, in configuration order.
    pub addresses: Vec<AddressConfig>,
    /// The link's own servers, as written (`DNS=`, `NTP=`, ...).
    pub servers: ServiceTable<Vec<String>>,
    pub dhcp_use_dns: bool,
    pub dhcp_use_ntp: bool,
    pub dhcp_use_sip: bool,
    pub dhcp_server: DhcpServerSettings,
}

impl Network {
    pub fn from_config(config: &NetworkConfig) -> Result<Self> {
        let addresses = config
            .addresses
            .iter()
            .map(|address| {
                address
                    .parse::<AddressConfig>()
                    .map_err(|_| Error::InvalidConfig(format!("invalid address '{}'", address)))
            })
            .collect::<Result<Vec<_>>>()?;

        let server = &config.dhcp_server;
        if let Some(timezone) = &server.timezone
            && !crate::timezone::is_valid_timezone(timezone)
        {
            return Err(Error::InvalidConfig(format!("invalid timezone '{}'", timezone)));
        }

        let mut send_options = SendOptions::new();
        for value in &server.send_options {
            send_options.parse_and_insert("SendOption", value);
        }

        let mut send_vendor_options = SendOptions::new();
        for value in &server.send_vendor_options {
            send_vendor_options.parse_and_insert("SendVendorOption", value);
        }

        let mut static_leases = StaticLeases::new();
        for value in &server.static_leases {
            static_leases.parse_and_register(value);
        }

        let dhcp_server = DhcpServerSettings {
            pool_offset: server.pool_offset,
            pool_size: server.pool_size,
            max_lease_time_usec: server.max_lease_time_usec,
            default_lease_time_usec: server.default_lease_time_usec,
            emit: ServiceTable::new([
                server.emit_dns,
                server.emit_ntp,
                server.emit_sip,
                true,
                true,
                true,
            ]),
            servers: ServiceTable::new([
                parse_server_list("DNS", &server.dns),
                parse_server_list("NTP", &server.ntp),
                parse_server_list("SIP", &server.sip),
                parse_server_list("POP3Servers", &server.pop3),
                parse_server_list("SMTPServers", &server.smtp),
                parse_server_list("LPRServers", &server.lpr),
            ]),
            emit_router: server.emit_router,
            emit_timezone: server.emit_timezone,
            timezone: server.timezone.clone(),
            send_options,
            send_vendor_options,
            static_leases,
        };

        Ok(Self {
            addresses,
            servers: ServiceTable::new([
                config.dns.clone(),
                config.ntp.clone(),
                config.sip.clone(),
                config.pop3.clone(),
                config.smtp.clone(),
                config.lpr.clone(),
            ]),
            dhcp_use_dns: config.dhcp.use_dns,
            dhcp_use_ntp: config.dhcp.use_ntp,
            dhcp_use_sip: config.dhcp.use_sip,
            dhcp_server,
        })
    }

    /// Whether servers of `kind` from this link's DHCP lease are passed on.
    pub fn dhcp_use(&self, kind: ServiceKind) -> bool {
        match kind {
            ServiceKind::Dns => self.dhcp_use_dns,
            ServiceKind::Ntp => self.dhcp_use_ntp,
            ServiceKind::Sip => self.dhcp_use_sip,
            ServiceKind::Pop3 | ServiceKind::Smtp | ServiceKind::Lpr => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DhcpServerConfig;

    #[test]
    fn test_parse_server_list() {
        assert_eq!(
            parse_server_list("DNS", "8.8.8.8  bogus 127.0.0.1 ::1 1.1.1.1"),
            vec![
                Ipv4Addr::new(8, 8, 8, 8),
                Ipv4Addr::new(127, 0, 0, 1),
                Ipv4Addr::new(1, 1, 1, 1),
            ]
        );
        assert!(parse_server_list("DNS", "").is_empty());
    }

    #[test]
    fn test_from_config() {
        let config = NetworkConfig {
            addresses: vec!["192.168.1.1/24".to_string(), "fd00::1/64".to_string()],
            ntp: vec!["10.0.0.123".to_string()],
            dhcp_server: DhcpServerConfig {
                emit_sip: false,
                dns: "9.9.9.9".to_string(),
                static_leases: vec![
                    "00:00:00:00:00:01 192.168.1.10".to_string(),
                    "".to_string(),
                    "00:00:00:00:00:02 192.168.1.20".to_string(),
                ],
                send_options: vec!["200:uint8:1".to_string()],
                ..Default::default()
            },
            ..Default::default()
        };

        let network = Network::from_config(&config).unwrap();
        assert_eq!(network.addresses.len(), 2);
        assert_eq!(network.servers[ServiceKind::Ntp], vec!["10.0.0.123"]);
        assert_eq!(
            network.dhcp_server.servers[ServiceKind::Dns],
            vec![Ipv4Addr::new(9, 9, 9, 9)]
        );
        assert!(network.dhcp_server.emit[ServiceKind::Dns]);
        assert!(!network.dhcp_server.emit[ServiceKind::Sip]);
        assert!(network.dhcp_server.emit[ServiceKind::Lpr]);
        assert_eq!(network.dhcp_server.static_leases.len(), 1);
        assert_eq!(network.dhcp_server.send_options.len(), 1);
    }

    #[test]
    fn test_from_config_rejects_bad_address() {
        let config = NetworkConfig {
            addresses: vec!["192.168.1.300/24".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            Network::from_config(&config),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_from_config_rejects_bad_timezone() {
        let config = NetworkConfig {
            dhcp_server: DhcpServerConfig {
                timezone: Some("../etc/passwd".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(Network::from_config(&config).is_err());
    }

    #[test]
    fn test_dhcp_use() {
        let network = Network {
            dhcp_use_ntp: false,
            ..Default::default()
        };
        assert!(!network.dhcp_use(ServiceKind::Ntp));
        assert!(network.dhcp_use(ServiceKind::Pop3));
    }
}
