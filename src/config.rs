use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::address::AddressConfig;
use crate::error::{Error, Result};
use crate::link::{LeaseInfo, Link, Links};
use crate::network::Network;

/// Resolver file written by the local stub resolver with the uplink's servers.
pub const DEFAULT_RESOLV_CONF: &str = "/run/systemd/resolve/resolv.conf";

/// Symlink naming the host's timezone.
pub const DEFAULT_LOCALTIME: &str = "/etc/localtime";

/// Host resources consulted during a configuration pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub resolv_conf: PathBuf,
    pub localtime: PathBuf,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            resolv_conf: PathBuf::from(DEFAULT_RESOLV_CONF),
            localtime: PathBuf::from(DEFAULT_LOCALTIME),
        }
    }
}

/// `[DHCPv4]` client settings of a link: which lease data it passes on.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DhcpClientConfig {
    pub use_dns: bool,
    pub use_ntp: bool,
    pub use_sip: bool,
}

impl Default for DhcpClientConfig {
    fn default() -> Self {
        Self {
            use_dns: true,
            use_ntp: true,
            use_sip: true,
        }
    }
}

/// `[DHCPServer]` settings exactly as written in the configuration file.
///
/// Server lists are space-separated IPv4 addresses. Every entry of
/// `static_leases`, `send_options` and `send_vendor_options` is one
/// assignment; an empty entry resets the list built so far.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DhcpServerConfig {
    pub pool_offset: u32,
    pub pool_size: u32,
    pub max_lease_time_usec: u64,
    pub default_lease_time_usec: u64,
    pub emit_dns: bool,
    pub dns: String,
    pub emit_ntp: bool,
    pub ntp: String,
    pub emit_sip: bool,
    pub sip: String,
    pub pop3: String,
    pub smtp: String,
    pub lpr: String,
    pub emit_router: bool,
    pub emit_timezone: bool,
    pub timezone: Option<String>,
    pub send_options: Vec<String>,
    pub send_vendor_options: Vec<String>,
    pub static_leases: Vec<String>,
}

impl Default for DhcpServerConfig {
    fn default() -> Self {
        Self {
            pool_offset: 0,
            pool_size: 0,
            max_lease_time_usec: 0,
            default_lease_time_usec: 0,
            emit_dns: true,
            dns: String::new(),
            emit_ntp: true,
            ntp: String::new(),
            emit_sip: true,
            sip: String::new(),
            pop3: String::new(),
            smtp: String::new(),
            lpr: String::new(),
            emit_router: true,
            emit_timezone: true,
            timezone: None,
            send_options: Vec::new(),
            send_vendor_options: Vec::new(),
            static_leases: Vec::new(),
        }
    }
}

/// Network configuration of one link as written in the configuration file.
///
/// `dns`, `ntp`, `sip`, `pop3`, `smtp` and `lpr` are the link's own servers,
/// consulted when another link uses this one as its uplink.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub addresses: Vec<String>,
    pub dns: Vec<String>,
    pub ntp: Vec<String>,
    pub sip: Vec<String>,
    pub pop3: Vec<String>,
    pub smtp: Vec<String>,
    pub lpr: Vec<String>,
    pub dhcp: DhcpClientConfig,
    pub dhcp_server: DhcpServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkConfig {
    pub name: String,
    /// Absent for links that are not managed.
    #[serde(default)]
    pub network: Option<NetworkConfig>,
    /// Addresses handed to the link from a shared address pool.
    #[serde(default)]
    pub pool_addresses: Vec<String>,
    /// The lease the link currently holds as a DHCP client.
    #[serde(default)]
    pub dhcp_lease: Option<LeaseInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Link whose DHCP server is configured.
    pub interface: String,
    /// Link designated as uplink, if any.
    #[serde(default)]
    pub uplink: Option<String>,
    pub links: Vec<LinkConfig>,
    #[serde(default)]
    pub environment: Environment,
}

impl Default for Config {
    fn default() -> Self {
        let lan = NetworkConfig {
            addresses: vec!["192.168.1.1/24".to_string()],
            dhcp_server: DhcpServerConfig {
                pool_offset: 100,
                pool_size: 100,
                max_lease_time_usec: 86_400_000_000,
                default_lease_time_usec: 3_600_000_000,
                ..Default::default()
            },
            ..Default::default()
        };

        Self {
            interface: "lan0".to_string(),
            uplink: Some("wan0".to_string()),
            links: vec![
                LinkConfig {
                    name: "lan0".to_string(),
                    network: Some(lan),
                    pool_addresses: Vec::new(),
                    dhcp_lease: None,
                },
                LinkConfig {
                    name: "wan0".to_string(),
                    network: Some(NetworkConfig::default()),
                    pool_addresses: Vec::new(),
                    dhcp_lease: None,
                },
            ],
            environment: Environment::default(),
        }
    }
}

impl Config {
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            Self::load(path)
        } else {
            let config = Config::default();
            config.save(path)?;
            Ok(config)
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for link in &self.links {
            if link.name.is_empty() {
                return Err(Error::InvalidConfig("link name must not be empty".to_string()));
            }
            if !names.insert(link.name.as_str()) {
                return Err(Error::InvalidConfig(format!(
                    "link {} is defined more than once",
                    link.name
                )));
            }
        }

        let interface = self
            .links
            .iter()
            .find(|link| link.name == self.interface)
            .ok_or_else(|| {
                Error::InvalidConfig(format!("interface {} is not a known link", self.interface))
            })?;

        if interface.network.is_none() {
            return Err(Error::InvalidConfig(format!(
                "interface {} has no network configuration",
                self.interface
            )));
        }

        if let Some(uplink) = &self.uplink {
            if *uplink == self.interface {
                return Err(Error::InvalidConfig(
                    "uplink must differ from interface".to_string(),
                ));
            }
            if !names.contains(uplink.as_str()) {
                return Err(Error::InvalidConfig(format!(
                    "uplink {} is not a known link",
                    uplink
                )));
            }
        }

        Ok(())
    }

    /// Builds the link model, parsing every network configuration afresh.
    pub fn links(&self) -> Result<Links> {
        let links = self
            .links
            .iter()
            .map(|link| -> Result<Link> {
                let network = link.network.as_ref().map(Network::from_config).transpose()?;
                let pool_addresses = link
                    .pool_addresses
                    .iter()
                    .map(|address| address.parse::<AddressConfig>())
                    .collect::<Result<Vec<_>>>()?;

                Ok(Link {
                    name: link.name.clone(),
                    network,
                    pool_addresses,
                    dhcp_lease: link.dhcp_lease.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Links::new(links, self.uplink.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert!(config.links().is_ok());
    }

    #[test]
    fn test_unknown_interface() {
        let config = Config {
            interface: "eth9".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_uplink_must_differ_from_interface() {
        let config = Config {
            uplink: Some("lan0".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_uplink() {
        let config = Config {
            uplink: Some("wan9".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_duplicate_link_names() {
        let mut config = Config::default();
        let duplicate = config.links[1].clone();
        config.links.push(duplicate);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unmanaged_interface() {
        let mut config = Config::default();
        config.links[0].network = None;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_minimal_json_uses_defaults() {
        let json = r#"{
            "interface": "lan0",
            "links": [{ "name": "lan0", "network": { "addresses": ["10.0.0.1/8"] } }]
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.environment, Environment::default());

        let network = config.links[0].network.as_ref().unwrap();
        assert!(network.dhcp_server.emit_dns);
        assert!(network.dhcp.use_ntp);
    }

    #[test]
    fn test_bad_pool_address_is_rejected() {
        let mut config = Config::default();
        config.links[1].pool_addresses = vec!["not-an-address".to_string()];
        assert!(config.links().is_err());
    }
}
