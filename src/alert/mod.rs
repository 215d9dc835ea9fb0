//! Message classification and alert output

mod classifier;
mod sink;

pub use classifier::{
    AlertDecision, AlertPolicy, AlertReason, BROADCAST_KEYWORDS, Incoming, classify,
    rewrite_mentions,
};
pub use sink::{AlertSink, ConsoleSink};

#[cfg(test)]
pub(crate) use sink::recording::RecordingSink;
