use crate::alert::AlertPolicy;
use crate::config::WatchConfig;
use crate::error::Result;
use crate::metadata::{DirectoryClient, IdentityCache};

/// Resolve the token owner through the cache and build the alert policy.
///
/// Runs before the stream opens so the owner's name is available to the first
/// rendered alert. A directory failure is fatal; an unknown owner is not.
pub async fn owner_policy<D: DirectoryClient>(
    cache: &IdentityCache<D>,
    owner_id: &str,
    watch: WatchConfig,
) -> Result<AlertPolicy> {
    let owner = cache.resolve_user(owner_id).await?;

    tracing::info!(
        user_id = %owner_id,
        user = owner.name().unwrap_or("unknown"),
        "Token owner resolved"
    );

    Ok(AlertPolicy::new(owner_id).with_watch(watch))
}
