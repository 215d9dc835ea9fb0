//! Interest policy for incoming messages

use crate::config::WatchConfig;
use crate::metadata::{ChannelInfo, UserEntry};

/// Channel-wide notification keywords
pub const BROADCAST_KEYWORDS: [&str; 2] = ["!channel", "!here"];

/// Who we are and which channel keyword is worth a bell
#[derive(Debug, Clone)]
pub struct AlertPolicy {
    /// Identifier of the token owner
    pub self_id: String,
    pub watch: WatchConfig,
}

impl AlertPolicy {
    pub fn new(self_id: impl Into<String>) -> Self {
        Self {
            self_id: self_id.into(),
            watch: WatchConfig::default(),
        }
    }

    pub fn with_watch(mut self, watch: WatchConfig) -> Self {
        self.watch = watch;
        self
    }
}

/// First condition that made a message alert-worthy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertReason {
    DirectMessage,
    WatchedKeyword,
    SelfTagged,
    SenderNameMentioned,
    Broadcast,
}

impl AlertReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertReason::DirectMessage => "direct_message",
            AlertReason::WatchedKeyword => "watched_keyword",
            AlertReason::SelfTagged => "self_tagged",
            AlertReason::SenderNameMentioned => "sender_name_mentioned",
            AlertReason::Broadcast => "broadcast",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertDecision {
    pub alert: bool,
    /// Rendered alert line, empty unless `alert`
    pub text: String,
    pub reason: Option<AlertReason>,
}

impl AlertDecision {
    fn silent() -> Self {
        Self {
            alert: false,
            text: String::new(),
            reason: None,
        }
    }
}

/// One message as seen by the classifier
#[derive(Debug, Clone, Copy)]
pub struct Incoming<'a> {
    pub text: &'a str,
    pub sender_id: Option<&'a str>,
    pub sender: Option<&'a UserEntry>,
    pub channel: &'a ChannelInfo,
}

/// Decide whether a message alerts and render the alert line.
///
/// `user_names` is the `(id, name)` table of every user resolved so far; each
/// raw occurrence of those identifiers in the text is replaced by the name.
pub fn classify(
    policy: &AlertPolicy,
    message: Incoming<'_>,
    user_names: &[(String, String)],
) -> AlertDecision {
    if message.text.is_empty() {
        return AlertDecision::silent();
    }

    let Some(reason) = match_reason(policy, &message) else {
        return AlertDecision::silent();
    };

    let sender = message
        .sender
        .and_then(UserEntry::name)
        .or(message.sender_id)
        .unwrap_or("unknown");

    let text = format!(
        "🚨 {} @ {}: {}",
        sender,
        message.channel.label(),
        rewrite_mentions(message.text, user_names)
    );

    AlertDecision {
        alert: true,
        text,
        reason: Some(reason),
    }
}

fn match_reason(policy: &AlertPolicy, message: &Incoming<'_>) -> Option<AlertReason> {
    let text = message.text;
    let channel = message.channel;

    if channel.is_direct_message {
        return Some(AlertReason::DirectMessage);
    }

    if !policy.watch.keyword.is_empty()
        && channel.name.as_deref() == Some(policy.watch.channel.as_str())
        && text.contains(policy.watch.keyword.as_str())
    {
        return Some(AlertReason::WatchedKeyword);
    }

    if !policy.self_id.is_empty() && text.contains(policy.self_id.as_str()) {
        return Some(AlertReason::SelfTagged);
    }

    // Checks the sender's own name, not the token owner's.
    let sender_named = message
        .sender
        .and_then(UserEntry::name)
        .is_some_and(|name| text.to_lowercase().contains(&name.to_lowercase()));
    if sender_named {
        return Some(AlertReason::SenderNameMentioned);
    }

    if BROADCAST_KEYWORDS.iter().any(|k| text.contains(k)) {
        return Some(AlertReason::Broadcast);
    }

    None
}

/// Replace raw identifier occurrences with names (substring match, not token aware)
///
/// Longer identifiers are replaced first so `U10` is never rewritten through
/// `U1`; ties are broken lexically, which keeps the output independent of the
/// table's order.
pub fn rewrite_mentions(text: &str, user_names: &[(String, String)]) -> String {
    let mut ordered: Vec<&(String, String)> =
        user_names.iter().filter(|(id, _)| !id.is_empty()).collect();
    ordered.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    ordered
        .into_iter()
        .fold(text.to_string(), |acc, (id, name)| acc.replace(id.as_str(), name))
}
