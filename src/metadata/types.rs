//! Identity and channel metadata types

use serde::{Deserialize, Serialize};

/// Resolved user metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    /// User ID (e.g., U09JDBT2MCM)
    pub id: String,

    /// Username/handle (e.g., "john.doe")
    pub name: Option<String>,

    /// User object re-serialized from the directory client's typed model.
    /// Fields the client library does not model are not present; `Null`
    /// when the identity was built without one.
    pub raw: serde_json::Value,
}

impl Identity {
    pub fn new(id: impl Into<String>, name: Option<String>) -> Self {
        Self {
            id: id.into(),
            name,
            raw: serde_json::Value::Null,
        }
    }

    pub fn with_raw(mut self, raw: serde_json::Value) -> Self {
        self.raw = raw;
        self
    }

    /// Name if known and non-empty
    pub fn known_name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }
}

/// Terminal state of a user lookup, including the negative entry
#[derive(Debug, Clone, PartialEq)]
pub enum UserEntry {
    Resolved(Identity),
    NotFound,
}

impl UserEntry {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            UserEntry::Resolved(identity) => Some(identity),
            UserEntry::NotFound => None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.identity().and_then(Identity::known_name)
    }
}

/// Channel metadata information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelInfo {
    /// Channel ID (e.g., C09NU1KFXHT)
    pub id: String,

    /// Channel name without # (absent for DMs)
    pub name: Option<String>,

    /// One-to-one conversation
    pub is_direct_message: bool,
}

impl ChannelInfo {
    /// Label used in alert lines: `#name`, or `DM` for nameless conversations
    pub fn label(&self) -> String {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => format!("#{}", name),
            _ => "DM".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_label() {
        let channel = ChannelInfo {
            id: "C123".to_string(),
            name: Some("engineering".to_string()),
            is_direct_message: false,
        };

        assert_eq!(channel.label(), "#engineering");
    }

    #[test]
    fn test_nameless_channel_label() {
        let channel = ChannelInfo {
            id: "D123".to_string(),
            name: None,
            is_direct_message: true,
        };

        assert_eq!(channel.label(), "DM");
    }

    #[test]
    fn test_identity_raw() {
        let bare = Identity::new("U123", None);
        assert!(bare.raw.is_null());

        let full = bare.with_raw(serde_json::json!({ "id": "U123", "name": "john.doe" }));
        assert_eq!(full.raw["name"], "john.doe");
        assert_eq!(full.known_name(), None);
    }

    #[test]
    fn test_user_entry_name() {
        let entry = UserEntry::Resolved(Identity::new("U123", Some("john.doe".to_string())));
        assert_eq!(entry.name(), Some("john.doe"));

        let blank = UserEntry::Resolved(Identity::new("U124", Some(String::new())));
        assert_eq!(blank.name(), None);

        assert_eq!(UserEntry::NotFound.name(), None);
        assert!(UserEntry::NotFound.identity().is_none());
    }
}
