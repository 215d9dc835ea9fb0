//! Identity metadata for users and channels
//!
//! This module provides the lazy-loading identity cache that maps opaque
//! Slack identifiers to names.
//!
//! Key features:
//! - Lazy-loading: Only fetches metadata the first time an identifier is seen
//! - Negative caching: Unknown users are looked up once
//! - No eviction: Entries live for the process lifetime
//! - Fail loudly: Directory failures are errors, never silent fallbacks

mod cache;
mod directory;
mod types;

pub use cache::{CacheStats, IdentityCache};
pub use directory::{DirectoryClient, UserLookup};
pub use types::{ChannelInfo, Identity, UserEntry};

#[cfg(test)]
pub(crate) use directory::fake::FakeDirectory;
