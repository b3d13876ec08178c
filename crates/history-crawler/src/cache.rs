//! Per `group:user` text cache filled as a by-product of crawling.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use portrayal_core::{GroupId, RawMessage, UserId};
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone)]
struct CachedText {
    timestamp: i64,
    text: String,
}

#[derive(Debug)]
struct CachedTexts {
    texts: Vec<CachedText>,
    seen_ids: HashSet<i64>,
    updated_at: Instant,
}

type CacheKey = (GroupId, UserId);

/// Texts per user in a group, expiring `ttl` after the entry was last written.
#[derive(Debug, Clone)]
pub struct UserTextCache {
    ttl: Duration,
    entries: Arc<RwLock<HashMap<CacheKey, CachedTexts>>>,
}

impl UserTextCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The user's cached texts in chronological order, or `None` when absent or expired.
    /// Expired entries are dropped.
    pub async fn get(&self, group: &GroupId, user: &UserId) -> Option<Vec<String>> {
        let key = (group.clone(), user.clone());
        let mut entries = self.entries.write().await;
        let cached = entries.get(&key)?;
        if cached.updated_at.elapsed() > self.ttl {
            debug!(group = %group, user = %user, "User cache entry expired");
            entries.remove(&key);
            return None;
        }
        let mut texts = cached.texts.clone();
        texts.sort_by_key(|t| t.timestamp);
        Some(texts.into_iter().map(|t| t.text).collect())
    }

    /// Number of live cached texts for a user.
    pub async fn count(&self, group: &GroupId, user: &UserId) -> usize {
        let entries = self.entries.read().await;
        entries
            .get(&(group.clone(), user.clone()))
            .filter(|c| c.updated_at.elapsed() <= self.ttl)
            .map(|c| c.texts.len())
            .unwrap_or(0)
    }

    /// Partitions messages by author and appends every non-empty text to its author's entry,
    /// refreshing that entry's timestamp. Messages already cached (by id) are skipped.
    ///
    /// Expired entries of every user are swept first.
    pub async fn collect(&self, group: &GroupId, messages: &[RawMessage]) {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, cached| cached.updated_at.elapsed() <= self.ttl);
        if entries.len() < before {
            debug!(swept = before - entries.len(), "Expired user cache entries removed");
        }
        for message in messages {
            let text = message.text();
            if text.is_empty() {
                continue;
            }
            let key = (group.clone(), message.author_id.clone());
            let cached = entries.entry(key).or_insert_with(|| CachedTexts {
                texts: Vec::new(),
                seen_ids: HashSet::new(),
                updated_at: now,
            });
            if let Some(id) = message.id {
                if !cached.seen_ids.insert(id) {
                    continue;
                }
            }
            cached.texts.push(CachedText {
                timestamp: message.timestamp,
                text,
            });
            cached.updated_at = now;
        }
    }

    pub async fn remove_group(&self, group: &GroupId) {
        self.entries.write().await.retain(|(g, _), _| g != group);
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(id: Option<i64>, author: &str, ts: i64, text: &str) -> RawMessage {
        RawMessage {
            id,
            sequence_number: None,
            author_id: UserId::from(author),
            author_display_name: author.to_string(),
            timestamp: ts,
            text_segments: vec![text.to_string()],
        }
    }

    #[tokio::test]
    async fn test_collect_partitions_by_author() {
        let cache = UserTextCache::new(Duration::from_secs(60));
        let group = GroupId::from("g");
        cache
            .collect(
                &group,
                &[
                    message(Some(3), "a", 30, "a-late"),
                    message(Some(2), "b", 20, "b-only"),
                    message(Some(1), "a", 10, "a-early"),
                    message(Some(4), "b", 40, "   "),
                ],
            )
            .await;

        assert_eq!(
            cache.get(&group, &UserId::from("a")).await,
            Some(vec!["a-early".to_string(), "a-late".to_string()])
        );
        assert_eq!(cache.count(&group, &UserId::from("b")).await, 1);
        assert_eq!(cache.get(&group, &UserId::from("c")).await, None);
    }

    #[tokio::test]
    async fn test_collect_skips_cached_ids_but_keeps_idless() {
        let cache = UserTextCache::new(Duration::from_secs(60));
        let group = GroupId::from("g");
        let page = [message(Some(1), "a", 1, "x"), message(None, "a", 2, "y")];
        cache.collect(&group, &page).await;
        cache.collect(&group, &page).await;
        assert_eq!(cache.count(&group, &UserId::from("a")).await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire_after_ttl() {
        let cache = UserTextCache::new(Duration::from_secs(60));
        let group = GroupId::from("g");
        let user = UserId::from("a");
        cache.collect(&group, &[message(Some(1), "a", 1, "x")]).await;

        tokio::time::advance(Duration::from_secs(30)).await;
        assert!(cache.get(&group, &user).await.is_some());

        tokio::time::advance(Duration::from_secs(31)).await;
        assert_eq!(cache.count(&group, &user).await, 0);
        assert!(cache.get(&group, &user).await.is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_refreshes_ttl() {
        let cache = UserTextCache::new(Duration::from_secs(60));
        let group = GroupId::from("g");
        let user = UserId::from("a");
        cache.collect(&group, &[message(Some(1), "a", 1, "x")]).await;
        tokio::time::advance(Duration::from_secs(50)).await;
        cache.collect(&group, &[message(Some(2), "a", 2, "y")]).await;
        tokio::time::advance(Duration::from_secs(50)).await;
        assert_eq!(cache.get(&group, &user).await.map(|t| t.len()), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_collect_sweeps_expired_entries_of_other_users() {
        let cache = UserTextCache::new(Duration::from_secs(60));
        let group = GroupId::from("g");
        cache.collect(&group, &[message(Some(1), "a", 1, "x")]).await;
        cache.collect(&GroupId::from("g2"), &[message(Some(1), "c", 1, "x")]).await;

        tokio::time::advance(Duration::from_secs(61)).await;
        cache.collect(&group, &[message(Some(2), "b", 2, "y")]).await;

        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.count(&group, &UserId::from("b")).await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_restarts_empty_on_write() {
        let cache = UserTextCache::new(Duration::from_secs(60));
        let group = GroupId::from("g");
        let user = UserId::from("a");
        cache.collect(&group, &[message(Some(1), "a", 1, "x")]).await;

        tokio::time::advance(Duration::from_secs(61)).await;
        cache.collect(&group, &[message(Some(1), "a", 1, "x")]).await;

        assert_eq!(cache.get(&group, &user).await, Some(vec!["x".to_string()]));
    }

    #[tokio::test]
    async fn test_remove_group_keeps_other_groups() {
        let cache = UserTextCache::new(Duration::from_secs(60));
        cache.collect(&GroupId::from("g1"), &[message(Some(1), "a", 1, "x")]).await;
        cache.collect(&GroupId::from("g2"), &[message(Some(1), "a", 1, "x")]).await;
        cache.remove_group(&GroupId::from("g1")).await;
        assert_eq!(cache.len().await, 1);
        cache.clear().await;
        assert!(cache.is_empty().await);
    }
}
