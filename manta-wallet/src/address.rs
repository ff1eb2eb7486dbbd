//! Manta Session Address Parser
//!
//! A merchant advertises a session as a URL of the form
//!
//! ```text
//! manta://<host>[:<port>]/<session_id>
//! ```
//!
//! The port defaults to [`DEFAULT_PORT`] (the plain MQTT port) when omitted.
//!
//! # Examples
//!
//! ```rust
//! use manta_wallet::address::MantaAddress;
//!
//! let address: MantaAddress = "manta://broker.example.com:8883/abc123".parse()?;
//! assert_eq!(address.host, "broker.example.com");
//! assert_eq!(address.port, 8883);
//! assert_eq!(address.session_id, "abc123");
//! # Ok::<(), manta_wallet::MantaError>(())
//! ```

use crate::{MantaError, Result};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Broker port used when the URL does not carry one.
pub const DEFAULT_PORT: u16 = 1883;

/// URL scheme of a Manta session address.
pub const MANTA_SCHEME: &str = "manta";

const ADDRESS_PATTERN: &str = r"^manta://([\w.-]+)(?::(\d+))?/(.+)$";

fn address_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(ADDRESS_PATTERN).expect("address pattern is a valid regex"))
}

/// A parsed `manta://` session address.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MantaAddress {
    /// Broker host name or IP address.
    pub host: String,
    /// Broker port.
    pub port: u16,
    /// Merchant session identifier, used in every topic name.
    pub session_id: String,
}

impl MantaAddress {
    /// Parse a `manta://` URL.
    ///
    /// # Errors
    ///
    /// Returns [`MantaError::InvalidAddress`] when the scheme is not `manta`,
    /// the host or session segment is missing, or the port does not fit in
    /// 16 bits.
    pub fn parse(url: &str) -> Result<Self> {
        let url = url.trim();
        let captures = address_regex()
            .captures(url)
            .ok_or_else(|| MantaError::InvalidAddress(url.to_string()))?;

        let host = captures
            .get(1)
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| MantaError::InvalidAddress(url.to_string()))?;

        let port = match captures.get(2) {
            Some(port) => port.as_str().parse::<u16>().map_err(|_| {
                MantaError::InvalidAddress(format!("{}: port out of range", url))
            })?,
            None => DEFAULT_PORT,
        };

        // The session id is the last non-empty path segment
        let session_id = captures
            .get(3)
            .and_then(|path| path.as_str().rsplit('/').find(|segment| !segment.is_empty()))
            .map(str::to_string)
            .ok_or_else(|| {
                MantaError::InvalidAddress(format!("{}: missing session id", url))
            })?;

        Ok(Self {
            host,
            port,
            session_id,
        })
    }
}

impl FromStr for MantaAddress {
    type Err = MantaError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for MantaAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.port == DEFAULT_PORT {
            write!(f, "{}://{}/{}", MANTA_SCHEME, self.host, self.session_id)
        } else {
            write!(
                f,
                "{}://{}:{}/{}",
                MANTA_SCHEME, self.host, self.port, self.session_id
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_without_port_uses_default() {
        let address = MantaAddress::parse("manta://broker.example.com/abc123").unwrap();
        assert_eq!(address.host, "broker.example.com");
        assert_eq!(address.port, 1883);
        assert_eq!(address.session_id, "abc123");
    }

    #[test]
    fn test_parse_with_port() {
        let address = MantaAddress::parse("manta://broker.example.com:8883/abc123").unwrap();
        assert_eq!(address.host, "broker.example.com");
        assert_eq!(address.port, 8883);
        assert_eq!(address.session_id, "abc123");
    }

    #[test]
    fn test_parse_ip_and_hyphenated_hosts() {
        let address = MantaAddress::parse("manta://127.0.0.1:1884/s1").unwrap();
        assert_eq!(address.host, "127.0.0.1");
        assert_eq!(address.port, 1884);

        let address = MantaAddress::parse("manta://my-broker.local/s2").unwrap();
        assert_eq!(address.host, "my-broker.local");
    }

    #[test]
    fn test_session_is_last_path_segment() {
        let address = MantaAddress::parse("manta://localhost/merchant/JqhCQ64gTYi02xu4GhBzZg").unwrap();
        assert_eq!(address.session_id, "JqhCQ64gTYi02xu4GhBzZg");

        let address = MantaAddress::parse("manta://localhost/abc/").unwrap();
        assert_eq!(address.session_id, "abc");
    }

    #[test]
    fn test_malformed_urls_are_rejected() {
        for url in [
            "broker.example.com/abc123",
            "mqtt://broker.example.com/abc123",
            "manta://broker.example.com",
            "manta://broker.example.com/",
            "manta://broker.example.com//",
            "manta:///abc123",
            "manta://broker.example.com:99999/abc123",
            "manta://broker.example.com:port/abc123",
            "",
        ] {
            let result = MantaAddress::parse(url);
            assert!(
                matches!(result, Err(MantaError::InvalidAddress(_))),
                "expected {:?} to be rejected, got {:?}",
                url,
                result
            );
        }
    }

    #[test]
    fn test_display_round_trips() {
        for url in [
            "manta://broker.example.com/abc123",
            "manta://broker.example.com:8883/abc123",
        ] {
            let address: MantaAddress = url.parse().unwrap();
            assert_eq!(address.to_string(), url);
        }
    }

    proptest! {
        #[test]
        fn prop_parse_recovers_components(
            host in "[a-z0-9]([a-z0-9.-]{0,20}[a-z0-9])?",
            port in proptest::option::of(1u16..=u16::MAX),
            session in "[A-Za-z0-9_-]{1,24}",
        ) {
            let url = match port {
                Some(port) => format!("manta://{}:{}/{}", host, port, session),
                None => format!("manta://{}/{}", host, session),
            };
            let address = MantaAddress::parse(&url).unwrap();
            prop_assert_eq!(address.host, host);
            prop_assert_eq!(address.port, port.unwrap_or(DEFAULT_PORT));
            prop_assert_eq!(address.session_id, session);
        }
    }
}
