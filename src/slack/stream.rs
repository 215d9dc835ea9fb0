//! RTM websocket stream

use crate::config::SlackConfig;
use crate::error::{Result, SlackNotifError};
use futures::StreamExt;
use std::future::Future;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{HeaderValue, header};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// What an open stream yields next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// One raw frame, usually a JSON event
    Frame(String),
    /// The remote end closed the connection
    Closed,
    /// The transport failed
    Errored(String),
}

/// An opened, authenticated source of raw event frames
pub trait MessageStream {
    fn next_event(&mut self) -> impl Future<Output = StreamEvent>;
}

/// Slack RTM websocket session
pub struct RtmStream {
    ws: WsStream,
}

impl RtmStream {
    /// Connect to the url returned by `rtm.connect`
    pub async fn connect(url: &str, config: &SlackConfig) -> Result<Self> {
        let mut request = url
            .into_client_request()
            .map_err(|e| SlackNotifError::SlackApi(format!("Invalid RTM url: {}", e)))?;

        let headers = request.headers_mut();
        headers.insert(
            header::AUTHORIZATION,
            header_value(&format!("Bearer {}", config.api_token))?,
        );
        headers.insert(header::COOKIE, header_value(&config.cookie)?);

        tracing::debug!("Connecting to RTM websocket");

        let (ws, _response) = connect_async(request)
            .await
            .map_err(|e| SlackNotifError::SlackApi(format!("WebSocket connection failed: {}", e)))?;

        tracing::info!("WebSocket connection opened");
        Ok(Self { ws })
    }
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| SlackNotifError::Config(format!("Invalid header value: {}", e)))
}

impl MessageStream for RtmStream {
    async fn next_event(&mut self) -> StreamEvent {
        loop {
            match self.ws.next().await {
                Some(Ok(Message::Text(text))) => {
                    tracing::trace!(len = text.len(), "Received text frame");
                    return StreamEvent::Frame(text.to_string());
                }
                Some(Ok(Message::Binary(data))) => {
                    tracing::trace!(len = data.len(), "Received binary frame");
                    return StreamEvent::Frame(String::from_utf8_lossy(&data).into_owned());
                }
                // Pongs are queued by tungstenite and flushed on the next read
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                Some(Ok(Message::Frame(_))) => continue,
                Some(Ok(Message::Close(frame))) => {
                    tracing::debug!(frame = ?frame, "Server closed connection");
                    return StreamEvent::Closed;
                }
                Some(Err(e)) => return StreamEvent::Errored(e.to_string()),
                None => return StreamEvent::Closed,
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod scripted {
    use super::*;
    use std::collections::VecDeque;

    /// Replays a fixed sequence of events, then reports `Closed`
    #[derive(Debug, Default)]
    pub(crate) struct ScriptedStream {
        events: VecDeque<StreamEvent>,
    }

    impl ScriptedStream {
        pub(crate) fn frames(frames: &[&str]) -> Self {
            Self {
                events: frames
                    .iter()
                    .map(|f| StreamEvent::Frame(f.to_string()))
                    .collect(),
            }
        }

        pub(crate) fn then(mut self, event: StreamEvent) -> Self {
            self.events.push_back(event);
            self
        }

        pub(crate) fn remaining(&self) -> usize {
            self.events.len()
        }
    }

    impl MessageStream for ScriptedStream {
        async fn next_event(&mut self) -> StreamEvent {
            self.events.pop_front().unwrap_or(StreamEvent::Closed)
        }
    }
}
