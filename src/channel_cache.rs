use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

use crate::outlier::ChannelSample;

/// Short-lived cache of channel samples keyed by channel id.
///
/// Building a sample costs two provider calls per channel, so repeated
/// searches that hit the same channels reuse the previous sample until it
/// expires. A zero TTL disables caching.
pub struct ChannelSampleCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, (Instant, ChannelSample)>>,
}

impl ChannelSampleCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    pub async fn get(&self, channel_id: &str) -> Option<ChannelSample> {
        if !self.is_enabled() {
            return None;
        }
        let entries = self.entries.read().await;
        match entries.get(channel_id) {
            Some((stored_at, sample)) if stored_at.elapsed() < self.ttl => {
                debug!("Channel sample cache hit for {}", channel_id);
                Some(sample.clone())
            }
            _ => None,
        }
    }

    pub async fn insert(&self, channel_id: &str, sample: ChannelSample) {
        if !self.is_enabled() {
            return;
        }
        let mut entries = self.entries.write().await;
        // Drop expired entries while holding the lock anyway.
        let ttl = self.ttl;
        entries.retain(|_, (stored_at, _)| stored_at.elapsed() < ttl);
        entries.insert(channel_id.to_string(), (Instant::now(), sample));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hit_within_ttl() {
        let cache = ChannelSampleCache::new(Duration::from_secs(60));
        cache.insert("UC1", ChannelSample::new(vec![1, 2, 3])).await;
        assert_eq!(cache.get("UC1").await, Some(ChannelSample::new(vec![1, 2, 3])));
        assert_eq!(cache.get("UC2").await, None);
    }

    #[tokio::test]
    async fn test_expired_entry_misses() {
        let cache = ChannelSampleCache::new(Duration::from_millis(10));
        cache.insert("UC1", ChannelSample::new(vec![5])).await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(cache.get("UC1").await, None);
    }

    #[tokio::test]
    async fn test_disabled_cache_stores_nothing() {
        let cache = ChannelSampleCache::disabled();
        cache.insert("UC1", ChannelSample::new(vec![5])).await;
        assert_eq!(cache.get("UC1").await, None);
    }

    #[tokio::test]
    async fn test_insert_evicts_expired_entries() {
        let cache = ChannelSampleCache::new(Duration::from_millis(10));
        cache.insert("UC1", ChannelSample::new(vec![5])).await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        cache.insert("UC2", ChannelSample::new(vec![7])).await;
        let entries = cache.entries.read().await;
        assert!(!entries.contains_key("UC1"));
        assert!(entries.contains_key("UC2"));
    }
}
