//! # dhcpsetup
//!
//! Configures the DHCPv4 server running on a network link: its address
//! pool, lease times, advertised servers, custom options and static leases.
//!
//! ## Features
//!
//! - Pool derived from the link's first static IPv4 address (or a pool-assigned one)
//! - DNS, NTP, SIP, POP3, SMTP and LPR servers, taken from explicit settings,
//!   the uplink's configuration and lease, or the host resolver file
//! - Loopback and unspecified addresses are never passed on from an uplink
//! - Custom options (`code:type:value`) and vendor-specific sub-options
//! - Static MAC-to-IP bindings, one per client
//! - Timezone option from configuration or the host's `/etc/localtime`
//!
//! ## Quick Start
//!
//! ```no_run
//! use dhcpsetup::{Config, ServerState, configure};
//!
//! fn main() -> dhcpsetup::Result<()> {
//!     let config = Config::load_or_create("config.json")?;
//!     let links = config.links()?;
//!     let link = links.get(&config.interface).expect("validated interface");
//!
//!     let mut server = ServerState::new();
//!     configure(link, &links, &mut server, &config.environment)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`Config`] - Link and DHCP server settings (JSON)
//! - [`Network`] - Typed per-link configuration built from [`Config`]
//! - [`Links`] - All links, implementing [`UplinkFinder`]
//! - [`DhcpServer`] - Contract of the server instance being configured
//! - [`configure`] - Applies a link's settings to a [`DhcpServer`]
//! - [`ServerState`] - In-memory [`DhcpServer`]

pub mod address;
pub mod config;
pub mod emit;
pub mod error;
pub mod lease;
pub mod link;
pub mod network;
pub mod options;
pub mod resolv;
pub mod server;
pub mod service;
pub mod state;
pub mod timezone;
pub mod uplink;

pub use address::{AddressConfig, ServerAddresses};
pub use config::{Config, Environment};
pub use error::{Error, Result};
pub use lease::{ClientId, HwAddr, StaticLease, StaticLeases};
pub use link::{LeaseInfo, Link, Links, UplinkFinder};
pub use network::Network;
pub use options::{SendOption, SendOptions};
pub use server::{DhcpServer, PoolConfig, configure};
pub use service::ServiceKind;
pub use state::ServerState;
