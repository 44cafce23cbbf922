//! Hot Reload Message Protocol
//!
//! JSON messages sent over the WebSocket to browser clients.
//!
//! # Message Types
//!
//! - `reload`: reload the page
//! - `connected`: handshake acknowledgement, carries the server version

use serde::{Deserialize, Serialize};

/// Hot reload message sent over WebSocket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HotReloadMessage {
    /// Full page reload
    Reload {
        /// What triggered the reload (e.g. `changed docs/a.md`)
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    /// Connection established
    Connected {
        /// Server version for compatibility check
        version: String,
    },
}

impl HotReloadMessage {
    /// Create a reload message with reason
    pub fn reload_with_reason(reason: impl Into<String>) -> Self {
        Self::Reload {
            reason: Some(reason.into()),
        }
    }

    /// Create a connected message
    pub fn connected() -> Self {
        Self::Connected {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"reload"}"#.to_string())
    }

    /// Parse from JSON string
    pub fn from_json(s: &str) -> Option<Self> {
        serde_json::from_str(s).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reload_message() {
        let msg = HotReloadMessage::reload_with_reason("changed docs/a.md");
        assert_eq!(
            msg.to_json(),
            r#"{"type":"reload","reason":"changed docs/a.md"}"#
        );
    }

    #[test]
    fn test_reload_without_reason() {
        let msg = HotReloadMessage::Reload { reason: None };
        assert_eq!(msg.to_json(), r#"{"type":"reload"}"#);
        assert_eq!(HotReloadMessage::from_json(r#"{"type":"reload"}"#), Some(msg));
    }

    #[test]
    fn test_connected_message() {
        let json = HotReloadMessage::connected().to_json();
        assert!(json.starts_with(r#"{"type":"connected","version":"#));
        assert!(matches!(
            HotReloadMessage::from_json(&json),
            Some(HotReloadMessage::Connected { .. })
        ));
    }

    #[test]
    fn test_unknown_type_rejected() {
        assert!(HotReloadMessage::from_json(r#"{"type":"patch"}"#).is_none());
    }
}
