mod bootstrap;
mod client;
mod events;
mod stream;
mod types;

pub use bootstrap::owner_policy;
pub use client::SlackClient;
pub use events::{DispatchStats, StreamDispatcher, StreamOutcome};
pub use stream::{MessageStream, RtmStream, StreamEvent};
pub use types::{MESSAGE_EVENT, MessageEvent};
