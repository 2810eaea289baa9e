//! Core types and structures for edex-shell
//!
//! This crate provides the constants, endpoint descriptors, theme model and
//! backend reply parsing shared by the terminal core and the application.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub mod theme;

pub use theme::{Theme, ThemeColors, ThemeTerminal};

// ============================================================================
// Constants
// ============================================================================

/// Number of terminal tabs the dashboard offers
pub const MAX_SLOTS: usize = 5;

/// Host the backend terminal server listens on by default
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Port of the main shell when the backend does not hand out another one
pub const DEFAULT_PORT: u16 = 3000;

/// Path of the terminal WebSocket endpoint on the backend
pub const WEBTERMINAL_PATH: &str = "/webterminal";

/// Prefix of a successful `SpawnTTY` reply ("SUCCESS: 3002")
pub const SPAWN_SUCCESS_PREFIX: &str = "SUCCESS";

/// Prefix of a failed `SpawnTTY` reply
pub const SPAWN_ERROR_PREFIX: &str = "ERROR";

/// Mount point key of the terminal container for a slot
pub fn mount_key(index: usize) -> String {
    format!("terminal{}", index)
}

/// Key of the tab label element for a slot
pub fn tab_key(index: usize) -> String {
    format!("shell_tab{}", index)
}

// ============================================================================
// Endpoint
// ============================================================================

/// Host/port pair of a remote shell transport
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// WebSocket URL of the terminal stream
    pub fn url(&self) -> String {
        format!("ws://{}:{}{}", self.host, self.port, WEBTERMINAL_PATH)
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

// ============================================================================
// Backend replies
// ============================================================================

/// Failure reported (or implied) by a `SpawnTTY` reply
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpawnError {
    #[error("backend refused to spawn a shell: {0}")]
    Refused(String),

    #[error("malformed spawn reply: {0:?}")]
    Malformed(String),
}

/// Parsed reply of the backend shell allocation call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnReply {
    pub port: u16,
}

impl SpawnReply {
    /// Parse a sentinel-prefixed reply.
    ///
    /// `"SUCCESS: 3002"` yields port 3002, anything starting with `"ERROR"`
    /// is a refusal carrying the rest of the message.
    pub fn parse(raw: &str) -> Result<Self, SpawnError> {
        let raw = raw.trim();

        if let Some(rest) = raw.strip_prefix(SPAWN_ERROR_PREFIX) {
            let message = rest.trim_start_matches(':').trim();
            return Err(SpawnError::Refused(message.to_string()));
        }

        let rest = raw
            .strip_prefix(SPAWN_SUCCESS_PREFIX)
            .ok_or_else(|| SpawnError::Malformed(raw.to_string()))?;

        rest.trim_start_matches(':')
            .trim()
            .parse::<u16>()
            .map(|port| Self { port })
            .map_err(|_| SpawnError::Malformed(raw.to_string()))
    }

    /// Render the reply the way the backend does
    pub fn to_wire(&self) -> String {
        format!("{}: {}", SPAWN_SUCCESS_PREFIX, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_endpoint_url() {
        assert_eq!(Endpoint::default().url(), "ws://127.0.0.1:3000/webterminal");
        assert_eq!(Endpoint::new("10.0.0.2", 3004).to_string(), "10.0.0.2:3004");
    }

    #[test]
    fn test_spawn_reply_success() {
        assert_eq!(SpawnReply::parse("SUCCESS: 3002"), Ok(SpawnReply { port: 3002 }));
        assert_eq!(SpawnReply::parse("SUCCESS:3005\n"), Ok(SpawnReply { port: 3005 }));
        assert_eq!(SpawnReply { port: 3003 }.to_wire(), "SUCCESS: 3003");
    }

    #[test]
    fn test_spawn_reply_errors() {
        assert_eq!(
            SpawnReply::parse("ERROR: max tty count reached"),
            Err(SpawnError::Refused("max tty count reached".to_string()))
        );
        assert!(matches!(SpawnReply::parse("3002"), Err(SpawnError::Malformed(_))));
        assert!(matches!(SpawnReply::parse("SUCCESS: nope"), Err(SpawnError::Malformed(_))));
    }

    #[test]
    fn test_keys() {
        assert_eq!(mount_key(3), "terminal3");
        assert_eq!(tab_key(0), "shell_tab0");
    }
}
