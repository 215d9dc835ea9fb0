use crate::alert::{AlertDecision, AlertPolicy, AlertSink, Incoming, classify};
use crate::error::{Result, SlackNotifError};
use crate::logging::Timer;
use crate::metadata::{DirectoryClient, IdentityCache};
use crate::slack::stream::{MessageStream, StreamEvent};
use crate::slack::types::{MESSAGE_EVENT, MessageEvent, event_type};
use std::sync::Arc;

/// How the stream ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOutcome {
    Closed,
    Errored(String),
}

/// Dispatch counters
#[derive(Debug, Default, Clone)]
pub struct DispatchStats {
    pub frames: u64,
    pub messages: u64,
    pub alerts: u64,
}

/// Run loop: one frame at a time, in arrival order
pub struct StreamDispatcher<D, K> {
    cache: Arc<IdentityCache<D>>,
    policy: AlertPolicy,
    sink: K,
    stats: DispatchStats,
}

impl<D: DirectoryClient, K: AlertSink> StreamDispatcher<D, K> {
    pub fn new(cache: Arc<IdentityCache<D>>, policy: AlertPolicy, sink: K) -> Self {
        Self {
            cache,
            policy,
            sink,
            stats: DispatchStats::default(),
        }
    }

    pub fn stats(&self) -> &DispatchStats {
        &self.stats
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Process frames until the stream closes or fails.
    ///
    /// Stream termination is reported as a [`StreamOutcome`]; directory
    /// failures and malformed frames abort the run with an error.
    pub async fn run<S: MessageStream>(&mut self, stream: &mut S) -> Result<StreamOutcome> {
        tracing::info!(self_id = %self.policy.self_id, "Watching for messages");

        let outcome = loop {
            match stream.next_event().await {
                StreamEvent::Frame(frame) => {
                    self.stats.frames += 1;
                    self.handle_frame(&frame).await?;
                }
                StreamEvent::Closed => {
                    tracing::info!("WebSocket connection closed");
                    break StreamOutcome::Closed;
                }
                StreamEvent::Errored(cause) => {
                    tracing::error!(error = %cause, "WebSocket error");
                    break StreamOutcome::Errored(cause);
                }
            }
        };

        tracing::info!(
            frames = self.stats.frames,
            messages = self.stats.messages,
            alerts = self.stats.alerts,
            "Stream finished"
        );

        Ok(outcome)
    }

    /// Handle one raw frame. Returns the decision for classified messages.
    pub async fn handle_frame(&mut self, frame: &str) -> Result<Option<AlertDecision>> {
        let _timer = Timer::new("handle_frame");

        let value: serde_json::Value = serde_json::from_str(frame)
            .map_err(|e| SlackNotifError::MalformedFrame(e.to_string()))?;

        if event_type(&value) != Some(MESSAGE_EVENT) {
            tracing::trace!(event_type = ?event_type(&value), "Ignoring non-message event");
            return Ok(None);
        }

        let event: MessageEvent = serde_json::from_value(value)
            .map_err(|e| SlackNotifError::MalformedFrame(e.to_string()))?;
        self.stats.messages += 1;

        // Resolution happens before the text check so names are cached for
        // later renderings even when this message has nothing to show.
        let sender = match event.user.as_deref() {
            Some(user_id) => Some(self.cache.resolve_user(user_id).await?),
            None => None,
        };

        let channel_id = event.channel.as_deref().ok_or_else(|| {
            SlackNotifError::MalformedFrame("message event without channel".to_string())
        })?;
        let channel = self.cache.resolve_channel(channel_id).await?;

        let Some(text) = event.text() else {
            tracing::debug!(
                channel_id = %channel_id,
                subtype = ?event.subtype,
                "Skipping message without text"
            );
            return Ok(None);
        };

        let decision = classify(
            &self.policy,
            Incoming {
                text,
                sender_id: event.user.as_deref(),
                sender: sender.as_ref(),
                channel: &channel,
            },
            &self.cache.user_names(),
        );

        if decision.alert {
            self.stats.alerts += 1;
            tracing::debug!(
                channel_id = %channel_id,
                channel = %channel.label(),
                user_id = ?event.user,
                reason = decision.reason.map(|r| r.as_str()).unwrap_or_default(),
                ts = ?event.ts,
                "Alert raised"
            );

            self.sink.write_line(&decision.text).await?;
            self.sink.ring_bell().await?;
        }

        Ok(Some(decision))
    }
}
