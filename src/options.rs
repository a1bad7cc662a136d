//! Custom DHCP options sent by the server.
//!
//! Administrators may attach arbitrary options to every reply, either as
//! top-level options or as sub-options of the Vendor-Specific Information
//! option (Option 43). Each is written as `code:type:value`:
//!
//! ```text
//! 114:string:https://portal.example.net
//! 42:ipv4address:192.168.1.1
//! 213:uint16:8080
//! ```
//!
//! # References
//!
//! - RFC 2132 §8.4: Vendor Specific Information

use std::net::Ipv4Addr;
use std::str::FromStr;

use serde::Serialize;
use tracing::warn;

use crate::error::{Error, Result};

/// Payload types accepted in a `code:type:value` definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionDataType {
    Uint8,
    Uint16,
    Uint32,
    Ipv4Address,
    String,
}

impl FromStr for OptionDataType {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "uint8" => Ok(Self::Uint8),
            "uint16" => Ok(Self::Uint16),
            "uint32" => Ok(Self::Uint32),
            "ipv4address" => Ok(Self::Ipv4Address),
            "string" => Ok(Self::String),
            other => Err(Error::InvalidOption(format!("unknown data type '{}'", other))),
        }
    }
}

impl OptionDataType {
    /// Encodes `value` as the big-endian option payload for this type.
    fn encode(self, value: &str) -> Result<Vec<u8>> {
        let invalid = |what: &str| Error::InvalidOption(format!("invalid {} '{}'", what, value));
        match self {
            Self::Uint8 => Ok(vec![value.parse::<u8>().map_err(|_| invalid("uint8"))?]),
            Self::Uint16 => Ok(value
                .parse::<u16>()
                .map_err(|_| invalid("uint16"))?
                .to_be_bytes()
                .to_vec()),
            Self::Uint32 => Ok(value
                .parse::<u32>()
                .map_err(|_| invalid("uint32"))?
                .to_be_bytes()
                .to_vec()),
            Self::Ipv4Address => Ok(value
                .parse::<Ipv4Addr>()
                .map_err(|_| invalid("IPv4 address"))?
                .octets()
                .to_vec()),
            Self::String => {
                if value.is_empty() || value.len() > 255 {
                    return Err(invalid("string"));
                }
                Ok(value.as_bytes().to_vec())
            }
        }
    }
}

/// An administrator-defined option with its encoded payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendOption {
    pub code: u8,
    pub data: Vec<u8>,
}

impl FromStr for SendOption {
    type Err = Error;

    /// Parses a `code:type:value` definition.
    ///
    /// Codes 0 (Pad) and 255 (End) are reserved and rejected.
    fn from_str(definition: &str) -> Result<Self> {
        let mut parts = definition.trim().splitn(3, ':');
        let (Some(code), Some(data_type), Some(value)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(Error::InvalidOption(format!(
                "expected code:type:value, got '{}'",
                definition
            )));
        };

        let code: u8 = code
            .parse()
            .map_err(|_| Error::InvalidOption(format!("invalid option code '{}'", code)))?;
        if code == 0 || code == 255 {
            return Err(Error::InvalidOption(format!(
                "option code {} is reserved",
                code
            )));
        }

        let data = data_type.parse::<OptionDataType>()?.encode(value)?;
        Ok(Self { code, data })
    }
}

/// Ordered set of [`SendOption`]s keyed by option code.
///
/// Redefining a code replaces the earlier payload in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SendOptions(Vec<SendOption>);

impl SendOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one configuration value.
    ///
    /// An empty value clears every option. A malformed definition is logged
    /// and ignored, leaving the set unchanged.
    pub fn parse_and_insert(&mut self, key: &str, value: &str) {
        if value.trim().is_empty() {
            self.0.clear();
            return;
        }

        match value.parse::<SendOption>() {
            Ok(option) => self.insert(option),
            Err(error) => warn!("Failed to parse {}= '{}', ignoring: {}", key, value, error),
        }
    }

    pub fn insert(&mut self, option: SendOption) {
        match self.0.iter_mut().find(|existing| existing.code == option.code) {
            Some(existing) => *existing = option,
            None => self.0.push(option),
        }
    }

    pub fn get(&self, code: u8) -> Option<&SendOption> {
        self.0.iter().find(|option| option.code == code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SendOption> {
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

    #[test]
    fn test_parse_typed_values() {
        let option: SendOption = "213:uint16:8080".parse().unwrap();
        assert_eq!(option.code, 213);
        assert_eq!(option.data, vec![0x1f, 0x90]);

        let option: SendOption = "42:ipv4address:192.168.1.1".parse().unwrap();
        assert_eq!(option.data, vec![192, 168, 1, 1]);

        let option: SendOption = "200:uint32:1".parse().unwrap();
        assert_eq!(option.data, vec![0, 0, 0, 1]);

        let option: SendOption = "114:string:http://a:b".parse().unwrap();
        assert_eq!(option.data, b"http://a:b".to_vec());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("".parse::<SendOption>().is_err());
        assert!("12:string".parse::<SendOption>().is_err());
        assert!("0:uint8:1".parse::<SendOption>().is_err());
        assert!("255:uint8:1".parse::<SendOption>().is_err());
        assert!("256:uint8:1".parse::<SendOption>().is_err());
        assert!("12:uint8:300".parse::<SendOption>().is_err());
        assert!("12:bogus:1".parse::<SendOption>().is_err());
        assert!("12:ipv4address:::1".parse::<SendOption>().is_err());
    }

    #[test]
    fn test_redefinition_replaces_in_place() {
        let mut options = SendOptions::new();
        options.parse_and_insert("SendOption", "200:uint8:1");
        options.parse_and_insert("SendOption", "201:uint8:2");
        options.parse_and_insert("SendOption", "200:uint8:3");

        let codes: Vec<u8> = options.iter().map(|option| option.code).collect();
        assert_eq!(codes, vec![200, 201]);
        assert_eq!(options.get(200).unwrap().data, vec![3]);
    }

    #[test]
    fn test_malformed_is_ignored_and_empty_clears() {
        let mut options = SendOptions::new();
        options.parse_and_insert("SendOption", "200:uint8:1");
        options.parse_and_insert("SendOption", "not-an-option");
        assert_eq!(options.len(), 1);

        options.parse_and_insert("SendOption", "");
        assert!(options.is_empty());
    }
}
