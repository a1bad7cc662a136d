//! Error types for DHCP server configuration.
//!
//! All fallible operations in this crate return [`Result<T>`], which uses
//! the [`Error`] enum for error variants.

/// Errors that can occur while building or applying a server configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File system I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error (configuration files).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration.
    ///
    /// Returned by [`Config::validate`](crate::Config::validate) and by
    /// [`Network::from_config`](crate::Network::from_config) for values
    /// that cannot be skipped.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A hardware (MAC) address string could not be parsed.
    #[error("Invalid hardware address: {0}")]
    InvalidHardwareAddress(String),

    /// An IP address string could not be parsed.
    #[error("Invalid IP address: {0}")]
    InvalidAddress(String),

    /// A custom DHCP option definition could not be parsed.
    #[error("Invalid DHCP option: {0}")]
    InvalidOption(String),

    /// The interface has no address the server can use for its pool.
    #[error("No suitable address for DHCPv4 server on {0}")]
    NoServerAddress(String),

    /// The server already holds a value under the same key.
    ///
    /// Expected when an unchanged configuration is applied a second time.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// The server refused a value.
    #[error("Rejected by server: {0}")]
    Rejected(String),

    /// The host timezone could not be determined.
    #[error("Failed to determine timezone: {0}")]
    Timezone(String),
}

impl Error {
    /// Returns the negative errno value classifying this error.
    pub fn errno(&self) -> i32 {
        const EIO: i32 = 5;
        const ENXIO: i32 = 6;
        const EEXIST: i32 = 17;
        const EINVAL: i32 = 22;

        match self {
            Self::Io(error) => -error.raw_os_error().unwrap_or(EIO),
            Self::NoServerAddress(_) => -ENXIO,
            Self::AlreadyExists(_) => -EEXIST,
            Self::Json(_)
            | Self::InvalidConfig(_)
            | Self::InvalidHardwareAddress(_)
            | Self::InvalidAddress(_)
            | Self::InvalidOption(_)
            | Self::Rejected(_)
            | Self::Timezone(_) => -EINVAL,
        }
    }
}

/// A specialized Result type for configuration operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errno_classes() {
        assert_eq!(Error::AlreadyExists("x".to_string()).errno(), -17);
        assert_eq!(Error::NoServerAddress("eth0".to_string()).errno(), -6);
        assert_eq!(Error::Rejected("x".to_string()).errno(), -22);

        let io = Error::Io(std::io::Error::from_raw_os_error(13));
        assert_eq!(io.errno(), -13);
    }
}
