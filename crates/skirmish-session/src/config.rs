//! Session configuration.

use std::time::Duration;

/// Per-connection settings, shared by every session a server spawns.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Close the connection if nothing arrives for this long.
    ///
    /// Default: `None`, wait forever.
    pub idle_timeout: Option<Duration>,

    /// The `ProtocolError` reason sent for any traffic other than a
    /// player-number request before the handshake completes.
    pub handshake_required_reason: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout: None,
            handshake_required_reason: "need a player number first".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_config_default_has_no_timeout() {
        let config = SessionConfig::default();
        assert!(config.idle_timeout.is_none());
        assert_eq!(config.handshake_required_reason, "need a player number first");
    }
}
