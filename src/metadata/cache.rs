//! Identity cache for lazy-loading user and channel information

use crate::error::Result;
use crate::metadata::directory::{DirectoryClient, UserLookup};
use crate::metadata::types::{ChannelInfo, UserEntry};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{OnceCell, RwLock};

/// Cache statistics for monitoring
#[derive(Debug, Default, Clone)]
pub struct CacheStats {
    pub channel_hits: u64,
    pub channel_misses: u64,
    pub user_hits: u64,
    pub user_misses: u64,
    pub api_calls: u64,
    pub api_errors: u64,
}

/// Identity cache with lazy-loading from the workspace directory
///
/// Entries are created the first time an identifier shows up in a message and
/// live for the rest of the process. Each key holds a cell that is empty while
/// a lookup is pending, so concurrent misses for the same identifier share one
/// fetch. Failed lookups leave the cell empty and are retried by the next
/// caller; "user not found" fills the cell with a negative entry.
pub struct IdentityCache<D> {
    directory: D,

    /// User cache (lazy-populated, includes negative entries)
    users: DashMap<String, Arc<OnceCell<UserEntry>>>,

    /// Channel cache (lazy-populated)
    channels: DashMap<String, Arc<OnceCell<ChannelInfo>>>,

    stats: RwLock<CacheStats>,
}

impl<D: DirectoryClient> IdentityCache<D> {
    pub fn new(directory: D) -> Self {
        tracing::debug!("Creating identity cache with lazy-loading");

        Self {
            directory,
            users: DashMap::new(),
            channels: DashMap::new(),
            stats: RwLock::new(CacheStats::default()),
        }
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    /// Resolve a user, fetching it at most once per identifier.
    ///
    /// Directory failures are returned as errors and are not cached.
    pub async fn resolve_user(&self, user_id: &str) -> Result<UserEntry> {
        let cell = Arc::clone(&self.users.entry(user_id.to_string()).or_default());

        if let Some(entry) = cell.get() {
            self.stats.write().await.user_hits += 1;
            tracing::trace!(user_id = %user_id, "User cache hit");
            return Ok(entry.clone());
        }

        self.stats.write().await.user_misses += 1;
        tracing::debug!(user_id = %user_id, "User cache miss, fetching from directory");

        let entry = cell.get_or_try_init(|| self.fetch_user(user_id)).await?;
        Ok(entry.clone())
    }

    /// Resolve a channel, fetching it at most once per identifier.
    pub async fn resolve_channel(&self, channel_id: &str) -> Result<ChannelInfo> {
        let cell = Arc::clone(&self.channels.entry(channel_id.to_string()).or_default());

        if let Some(info) = cell.get() {
            self.stats.write().await.channel_hits += 1;
            tracing::trace!(
                channel_id = %channel_id,
                channel = %info.label(),
                "Channel cache hit"
            );
            return Ok(info.clone());
        }

        self.stats.write().await.channel_misses += 1;
        tracing::debug!(
            channel_id = %channel_id,
            "Channel cache miss, fetching from directory"
        );

        let info = cell
            .get_or_try_init(|| self.fetch_channel(channel_id))
            .await?;
        Ok(info.clone())
    }

    /// Cached user entry, without fetching
    pub fn cached_user(&self, user_id: &str) -> Option<UserEntry> {
        self.users
            .get(user_id)
            .and_then(|cell| cell.get().cloned())
    }

    /// Cached channel entry, without fetching
    pub fn cached_channel(&self, channel_id: &str) -> Option<ChannelInfo> {
        self.channels
            .get(channel_id)
            .and_then(|cell| cell.get().cloned())
    }

    /// Snapshot of `(id, name)` for every resolved user with a known name,
    /// sorted by id
    pub fn user_names(&self) -> Vec<(String, String)> {
        let mut names: Vec<(String, String)> = self
            .users
            .iter()
            .filter_map(|item| {
                let name = item.value().get()?.name()?.to_string();
                Some((item.key().clone(), name))
            })
            .collect();
        names.sort();
        names
    }

    async fn fetch_user(&self, user_id: &str) -> Result<UserEntry> {
        self.stats.write().await.api_calls += 1;

        match self.directory.fetch_user(user_id).await {
            Ok(UserLookup::Found(identity)) => {
                tracing::info!(
                    user_id = %user_id,
                    user = identity.name.as_deref().unwrap_or_default(),
                    "Fetched and cached user info"
                );
                Ok(UserEntry::Resolved(identity))
            }
            Ok(UserLookup::NotFound) => {
                tracing::warn!(user_id = %user_id, "User not found, caching negative entry");
                Ok(UserEntry::NotFound)
            }
            Err(e) => {
                self.stats.write().await.api_errors += 1;
                Err(e)
            }
        }
    }

    async fn fetch_channel(&self, channel_id: &str) -> Result<ChannelInfo> {
        self.stats.write().await.api_calls += 1;

        match self.directory.fetch_channel(channel_id).await {
            Ok(info) => {
                tracing::info!(
                    channel_id = %channel_id,
                    channel = %info.label(),
                    "Fetched and cached channel info"
                );
                Ok(info)
            }
            Err(e) => {
                self.stats.write().await.api_errors += 1;
                Err(e)
            }
        }
    }

    pub async fn get_stats(&self) -> CacheStats {
        self.stats.read().await.clone()
    }

    /// Number of terminal entries as `(channels, users)`
    pub fn cache_sizes(&self) -> (usize, usize) {
        let channels = self
            .channels
            .iter()
            .filter(|item| item.value().initialized())
            .count();
        let users = self
            .users
            .iter()
            .filter(|item| item.value().initialized())
            .count();
        (channels, users)
    }

    /// Log cache statistics
    pub async fn log_stats(&self) {
        let stats = self.get_stats().await;
        let (channel_count, user_count) = self.cache_sizes();

        tracing::info!(
            channels_cached = channel_count,
            users_cached = user_count,
            channel_hits = stats.channel_hits,
            channel_misses = stats.channel_misses,
            user_hits = stats.user_hits,
            user_misses = stats.user_misses,
            api_calls = stats.api_calls,
            api_errors = stats.api_errors,
            "Identity cache statistics"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SlackNotifError;
    use crate::metadata::directory::fake::FakeDirectory;

    fn cache() -> IdentityCache<FakeDirectory> {
        IdentityCache::new(
            FakeDirectory::new()
                .with_user("U1", "alice")
                .with_user("U2", "bob")
                .with_channel("C1", Some("general"), false)
                .with_channel("D1", None, true),
        )
    }

    #[test]
    fn test_cache_sizes() {
        let cache = cache();
        assert_eq!(cache.cache_sizes(), (0, 0));
    }

    #[tokio::test]
    async fn test_user_fetched_once() {
        let cache = cache();

        let first = cache.resolve_user("U1").await.unwrap();
        let second = cache.resolve_user("U1").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.name(), Some("alice"));
        assert_eq!(cache.directory().user_calls(), 1);

        let stats = cache.get_stats().await;
        assert_eq!(stats.user_misses, 1);
        assert_eq!(stats.user_hits, 1);
        assert_eq!(stats.api_calls, 1);
    }

    #[tokio::test]
    async fn test_not_found_is_cached() {
        let cache = cache();

        for _ in 0..3 {
            let entry = cache.resolve_user("U404").await.unwrap();
            assert_eq!(entry, UserEntry::NotFound);
        }

        assert_eq!(cache.directory().user_calls(), 1);
        assert_eq!(cache.cached_user("U404"), Some(UserEntry::NotFound));
        assert_eq!(cache.cache_sizes(), (0, 1));
    }

    #[tokio::test]
    async fn test_user_failure_not_cached() {
        let cache = IdentityCache::new(FakeDirectory::new().with_user("U1", "alice").failing("U1"));

        let err = cache.resolve_user("U1").await.unwrap_err();
        assert!(matches!(err, SlackNotifError::Directory { ref id, .. } if id == "U1"));
        assert_eq!(cache.cached_user("U1"), None);
        assert_eq!(cache.get_stats().await.api_errors, 1);

        cache.directory().recover("U1");
        let entry = cache.resolve_user("U1").await.unwrap();
        assert_eq!(entry.name(), Some("alice"));
        assert_eq!(cache.directory().user_calls(), 2);
    }

    #[tokio::test]
    async fn test_channel_fetched_once() {
        let cache = cache();

        let first = cache.resolve_channel("C1").await.unwrap();
        let second = cache.resolve_channel("C1").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.label(), "#general");
        assert_eq!(cache.directory().channel_calls(), 1);
    }

    #[tokio::test]
    async fn test_channel_failure_is_error() {
        let cache = cache();

        let err = cache.resolve_channel("C404").await.unwrap_err();
        assert!(matches!(err, SlackNotifError::Directory { .. }));
        assert_eq!(cache.cached_channel("C404"), None);

        assert!(cache.resolve_channel("C404").await.is_err());
        assert_eq!(cache.directory().channel_calls(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_misses_share_one_fetch() {
        let cache = cache();

        let (a, b, c) = tokio::join!(
            cache.resolve_user("U2"),
            cache.resolve_user("U2"),
            cache.resolve_user("U2"),
        );

        assert_eq!(a.unwrap().name(), Some("bob"));
        assert_eq!(b.unwrap().name(), Some("bob"));
        assert_eq!(c.unwrap().name(), Some("bob"));
        assert_eq!(cache.directory().user_calls(), 1);
    }

    #[tokio::test]
    async fn test_user_names_only_resolved() {
        let cache = cache();

        cache.resolve_user("U1").await.unwrap();
        cache.resolve_user("U404").await.unwrap();

        let names = cache.user_names();
        assert_eq!(names, vec![("U1".to_string(), "alice".to_string())]);
    }

    #[tokio::test]
    async fn test_user_names_sorted_by_id() {
        let cache = IdentityCache::new(
            FakeDirectory::new()
                .with_user("U1", "me")
                .with_user("U10", "ten")
                .with_user("U2", "bob"),
        );

        for id in ["U2", "U10", "U1"] {
            cache.resolve_user(id).await.unwrap();
        }

        let ids: Vec<String> = cache.user_names().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["U1", "U10", "U2"]);
    }
}
