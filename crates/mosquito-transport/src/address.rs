use std::fmt;
use std::str::FromStr;

use crate::error::TransportError;

/// Address of the Mosquito access point.
pub const DEFAULT_HOST: &str = "192.168.4.1";

/// Port the Mosquito firmware listens on.
pub const DEFAULT_PORT: u16 = 80;

/// Host/port pair identifying a Mosquito on the network.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceAddress {
    pub host: String,
    pub port: u16,
}

impl DeviceAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl Default for DeviceAddress {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

impl FromStr for DeviceAddress {
    type Err = TransportError;

    /// Parses `host:port`, `[v6]:port`, or a bare host (default port).
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let invalid = |reason| TransportError::InvalidAddress {
            input: input.to_string(),
            reason,
        };

        if trimmed.is_empty() {
            return Err(invalid("empty address"));
        }

        if let Some(rest) = trimmed.strip_prefix('[') {
            let (host, tail) = rest
                .split_once(']')
                .ok_or_else(|| invalid("unterminated '[' in IPv6 address"))?;
            let port = match tail.strip_prefix(':') {
                Some(port) => port.parse().map_err(|_| invalid("invalid port"))?,
                None if tail.is_empty() => DEFAULT_PORT,
                None => return Err(invalid("unexpected characters after ']'")),
            };
            return Ok(Self::new(host, port));
        }

        match trimmed.rsplit_once(':') {
            Some((host, _)) if host.contains(':') => {
                Err(invalid("IPv6 addresses must be wrapped in brackets"))
            }
            Some((host, port)) => {
                if host.is_empty() {
                    return Err(invalid("missing host"));
                }
                let port = port.parse().map_err(|_| invalid("invalid port"))?;
                Ok(Self::new(host, port))
            }
            None => Ok(Self::new(trimmed, DEFAULT_PORT)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_access_point() {
        let address = DeviceAddress::default();
        assert_eq!(address.to_string(), "192.168.4.1:80");
    }

    #[test]
    fn parse_host_and_port() {
        let address: DeviceAddress = "10.0.0.7:8080".parse().unwrap();
        assert_eq!(address, DeviceAddress::new("10.0.0.7", 8080));
    }

    #[test]
    fn parse_bare_host_uses_default_port() {
        let address: DeviceAddress = "mosquito.local".parse().unwrap();
        assert_eq!(address.port, DEFAULT_PORT);
        assert_eq!(address.host, "mosquito.local");
    }

    #[test]
    fn parse_bracketed_ipv6() {
        let address: DeviceAddress = "[::1]:9000".parse().unwrap();
        assert_eq!(address, DeviceAddress::new("::1", 9000));
        assert_eq!(address.to_string(), "[::1]:9000");
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!("".parse::<DeviceAddress>().is_err());
        assert!(":80".parse::<DeviceAddress>().is_err());
        assert!("host:notaport".parse::<DeviceAddress>().is_err());
        assert!("::1:80".parse::<DeviceAddress>().is_err());
        assert!("[::1".parse::<DeviceAddress>().is_err());
    }
}
