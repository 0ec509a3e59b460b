use std::time::Duration;

use mosquito_transport::DeviceAddress;

/// Timeout applied to connecting, sending and waiting for replies unless
/// overridden.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(4);

/// Connection and timing configuration for a [`crate::Mosquito`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Where the device listens.
    pub address: DeviceAddress,
    /// Bound on establishing the TCP connection.
    pub connect_timeout: Duration,
    /// Bound on writing one request.
    pub send_timeout: Duration,
    /// Bound on waiting for the reply to a round-trip.
    pub reply_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            address: DeviceAddress::default(),
            connect_timeout: DEFAULT_TIMEOUT,
            send_timeout: DEFAULT_TIMEOUT,
            reply_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn new(address: DeviceAddress) -> Self {
        Self {
            address,
            ..Self::default()
        }
    }

    /// Apply one timeout to connecting, sending and replies.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self.send_timeout = timeout;
        self.reply_timeout = timeout;
        self
    }

    pub fn with_reply_timeout(mut self, timeout: Duration) -> Self {
        self.reply_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_access_point() {
        let config = ClientConfig::default();
        assert_eq!(config.address.to_string(), "192.168.4.1:80");
        assert_eq!(config.reply_timeout, Duration::from_secs(4));
    }

    #[test]
    fn with_timeout_sets_all_bounds() {
        let config = ClientConfig::default().with_timeout(Duration::from_millis(250));
        assert_eq!(config.connect_timeout, Duration::from_millis(250));
        assert_eq!(config.send_timeout, Duration::from_millis(250));
        assert_eq!(config.reply_timeout, Duration::from_millis(250));

        let config = config.with_reply_timeout(Duration::from_secs(1));
        assert_eq!(config.reply_timeout, Duration::from_secs(1));
        assert_eq!(config.send_timeout, Duration::from_millis(250));
    }
}
