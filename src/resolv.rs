//! DNS servers from a resolver file.
//!
//! When no managed uplink exists, DNS servers are taken from the
//! `nameserver` lines of a resolv.conf(5) style file.

use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind};
use std::net::IpAddr;
use std::path::Path;

use tracing::{debug, warn};

use crate::address::{ServerAddresses, parse_dns_server};

/// Reads the usable IPv4 nameservers listed in `path`.
///
/// A missing file yields an empty list. A file that cannot be read is
/// logged and also yields an empty list.
pub fn servers_from_resolv_conf(path: &Path) -> ServerAddresses {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(error) if error.kind() == ErrorKind::NotFound => {
            debug!("{} does not exist, no DNS servers to pass on", path.display());
            return ServerAddresses::new();
        }
        Err(error) => {
            warn!("Failed to open {}: {}", path.display(), error);
            return ServerAddresses::new();
        }
    };

    let mut addresses = ServerAddresses::new();
    for line in BufReader::new(file).split(b'\n') {
        let line = match line {
            Ok(line) => line,
            Err(error) => {
                warn!("Failed to read {}: {}", path.display(), error);
                return ServerAddresses::new();
            }
        };

        let line = String::from_utf8_lossy(&line);
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        let mut words = line.split_whitespace();
        if words.next() != Some("nameserver") {
            continue;
        }

        for word in words {
            match parse_dns_server(word) {
                Ok(IpAddr::V4(address)) => {
                    addresses.push_if_usable(address);
                }
                Ok(IpAddr::V6(_)) => {}
                Err(error) => {
                    warn!("Failed to parse DNS server address '{}', ignoring: {}", word, error)
                }
            }
        }
    }

    addresses
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::net::Ipv4Addr;

    fn resolv_conf(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_loopback_is_filtered() {
        let file = resolv_conf("nameserver 8.8.8.8\nnameserver 127.0.0.1\n");
        assert_eq!(
            servers_from_resolv_conf(file.path()).into_vec(),
            vec![Ipv4Addr::new(8, 8, 8, 8)]
        );
    }

    #[test]
    fn test_comments_and_other_directives() {
        let file = resolv_conf(
            "# generated\n\
             ; legacy comment\n\
             \n\
             search example.net\n\
             options edns0\n\
             nameservers 9.9.9.9\n\
             \t nameserver 1.1.1.1 \n\
             # nameserver 4.4.4.4\n\
             nameserver 2606:4700::1111\n\
             nameserver not-an-ip 1.0.0.1%eth0\n",
        );
        assert_eq!(
            servers_from_resolv_conf(file.path()).into_vec(),
            vec![Ipv4Addr::new(1, 1, 1, 1), Ipv4Addr::new(1, 0, 0, 1)]
        );
    }

    #[test]
    fn test_non_utf8_comment_keeps_nameservers() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"# G\xe9n\xe9r\xe9 par NetworkManager\nnameserver 8.8.8.8\n")
            .unwrap();
        assert_eq!(
            servers_from_resolv_conf(file.path()).into_vec(),
            vec![Ipv4Addr::new(8, 8, 8, 8)]
        );
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resolv.conf");
        assert!(servers_from_resolv_conf(&path).is_empty());
    }

    #[test]
    fn test_directory_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        assert!(servers_from_resolv_conf(dir.path()).is_empty());
    }
}
