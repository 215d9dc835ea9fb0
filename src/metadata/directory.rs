//! Directory lookup capability consumed by the identity cache

use crate::error::Result;
use crate::metadata::types::{ChannelInfo, Identity};
use std::future::Future;

/// Outcome of a single user lookup
#[derive(Debug, Clone, PartialEq)]
pub enum UserLookup {
    Found(Identity),
    /// The directory definitively does not know this user
    NotFound,
}

/// Fetches one user or one channel from the remote workspace.
///
/// Any error returned is a directory failure and is treated as fatal by
/// callers. "User not found" is not an error, it is [`UserLookup::NotFound`].
pub trait DirectoryClient {
    fn fetch_user(&self, user_id: &str) -> impl Future<Output = Result<UserLookup>>;

    fn fetch_channel(&self, channel_id: &str) -> impl Future<Output = Result<ChannelInfo>>;
}
