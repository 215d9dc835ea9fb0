use serde::Deserialize;

/// Event type of a chat message in the RTM stream
pub const MESSAGE_EVENT: &str = "message";

/// A `message` event from the RTM stream
///
/// Only the fields the notifier needs; everything else in the frame is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub ts: Option<String>,
}

impl MessageEvent {
    /// Message text, if present and non-empty
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref().filter(|t| !t.is_empty())
    }
}

/// Raw event type of a decoded frame, if any
pub fn event_type(frame: &serde_json::Value) -> Option<&str> {
    frame.get("type").and_then(serde_json::Value::as_str)
}
