//! History crawler: one backward crawl loop shared by both collect strategies.
//!
//! The remote API only pages backwards by recency, so every author's messages are fetched
//! and the target's are filtered locally.

use std::collections::HashSet;
use std::sync::Arc;

use portrayal_core::{GroupId, PageFetcher, QueryResult, RawMessage, UserId};
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

use crate::cache::UserTextCache;
use crate::config::CrawlerSettings;
use crate::cursor::{ScanCursorStore, ScanLease};
use crate::extract::{extract_entries, sort_chronologically};
use crate::strategy::CollectStrategy;

/// Why a crawl loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopReason {
    /// All `max_rounds` rounds ran.
    RoundsExhausted,
    /// The remote side returned no messages.
    EmptyPage,
    /// The page request failed; partial results are kept.
    FetchFailed,
    /// No message on the page carried a usable pagination key.
    NoPaginationKey,
    /// The page did not move the cursor further back.
    CursorStalled,
    /// Every message on the page was already in the buffer.
    NoNewMessages,
    /// The buffer outgrew 1.5 × max_rounds × page_size.
    BufferLimit,
    /// The target already has enough cached texts.
    Satisfied,
    /// The caller's deadline passed; partial results are kept.
    DeadlineReached,
}

/// Buffer produced by one crawl loop.
#[derive(Debug)]
struct ScanOutcome {
    buffer: Vec<RawMessage>,
    rounds: usize,
    stop: StopReason,
}

/// Fills the user cache from every merged page and stops once `target` has `wanted` texts.
struct CacheFill<'a> {
    cache: &'a UserTextCache,
    target: &'a UserId,
    wanted: usize,
}

/// Crawls group history through a [`PageFetcher`], keeping per-group cursors and, with
/// [`CollectStrategy::UserCache`], per-user text caches. Under that strategy cursors expire
/// with the same TTL as cached texts, so expired texts can be fetched again.
pub struct HistoryCrawler {
    fetcher: Arc<dyn PageFetcher>,
    settings: CrawlerSettings,
    cursors: ScanCursorStore,
    cache: UserTextCache,
}

impl HistoryCrawler {
    pub fn new(fetcher: Arc<dyn PageFetcher>, settings: CrawlerSettings) -> Self {
        let cache = UserTextCache::new(settings.cache_ttl);
        let cursors = match settings.strategy {
            CollectStrategy::ContextWindow => ScanCursorStore::new(),
            CollectStrategy::UserCache => ScanCursorStore::with_ttl(settings.cache_ttl),
        };
        Self {
            fetcher,
            settings,
            cursors,
            cache,
        }
    }

    pub fn settings(&self) -> &CrawlerSettings {
        &self.settings
    }

    pub fn strategy(&self) -> CollectStrategy {
        self.settings.strategy
    }

    pub fn cursors(&self) -> &ScanCursorStore {
        &self.cursors
    }

    pub fn cache(&self) -> &UserTextCache {
        &self.cache
    }

    /// Collects the texts `target` wrote in `group`, scanning at most `max_rounds` pages.
    ///
    /// Never fails: fetch errors and paging anomalies end the scan early and whatever was
    /// merged so far is used. `max_rounds` is expected to be clamped by the caller.
    pub async fn get_user_texts(
        &self,
        group: &GroupId,
        target: &UserId,
        max_rounds: usize,
    ) -> QueryResult {
        self.run_query(group, target, max_rounds, None).await
    }

    /// Like [`HistoryCrawler::get_user_texts`], but stops paging at `deadline` and builds the
    /// result from what was merged by then.
    pub async fn get_user_texts_until(
        &self,
        group: &GroupId,
        target: &UserId,
        max_rounds: usize,
        deadline: Instant,
    ) -> QueryResult {
        self.run_query(group, target, max_rounds, Some(deadline)).await
    }

    /// Drops every cursor and cached text.
    pub async fn clear(&self) {
        self.cursors.clear().await;
        self.cache.clear().await;
    }

    /// Drops one group's cursor and cached texts so the next query restarts from the newest
    /// message.
    pub async fn reset_group(&self, group: &GroupId) {
        self.cursors.remove(group).await;
        self.cache.remove_group(group).await;
    }

    #[instrument(skip(self), fields(strategy = %self.settings.strategy))]
    async fn run_query(
        &self,
        group: &GroupId,
        target: &UserId,
        max_rounds: usize,
        deadline: Option<Instant>,
    ) -> QueryResult {
        match self.settings.strategy {
            CollectStrategy::ContextWindow => {
                self.query_with_context(group, target, max_rounds, deadline)
                    .await
            }
            CollectStrategy::UserCache => {
                self.query_with_user_cache(group, target, max_rounds, deadline)
                    .await
            }
        }
    }

    async fn query_with_context(
        &self,
        group: &GroupId,
        target: &UserId,
        max_rounds: usize,
        deadline: Option<Instant>,
    ) -> QueryResult {
        let mut lease = self.cursors.lease(group).await;
        let ScanOutcome {
            mut buffer,
            rounds,
            stop,
        } = self
            .scan(group, &mut lease, max_rounds, None, deadline)
            .await;
        drop(lease);

        if buffer.is_empty() {
            info!(group = %group, target = %target, rounds, ?stop, "Scan found no messages");
            return QueryResult::empty(0);
        }

        sort_chronologically(&mut buffer);
        let entries = extract_entries(
            &buffer,
            target,
            self.settings.context_window_size,
            self.settings.max_msg_count,
        );

        info!(
            group = %group,
            target = %target,
            rounds,
            ?stop,
            scanned = buffer.len(),
            entries = entries.len(),
            "Context extraction finished"
        );
        QueryResult {
            entries,
            scanned_message_count: buffer.len(),
            served_from_cache: false,
        }
    }

    async fn query_with_user_cache(
        &self,
        group: &GroupId,
        target: &UserId,
        max_rounds: usize,
        deadline: Option<Instant>,
    ) -> QueryResult {
        let wanted = self.settings.max_msg_count;

        if let Some(cached) = self.cache.get(group, target).await {
            if cached.len() >= wanted {
                info!(
                    group = %group,
                    target = %target,
                    cached = cached.len(),
                    "Served from user cache"
                );
                return QueryResult {
                    entries: cached.into_iter().take(wanted).collect(),
                    scanned_message_count: 0,
                    served_from_cache: true,
                };
            }
        }

        let fill = CacheFill {
            cache: &self.cache,
            target,
            wanted,
        };
        let mut lease = self.cursors.lease(group).await;
        let ScanOutcome {
            buffer,
            rounds,
            stop,
        } = self
            .scan(group, &mut lease, max_rounds, Some(fill), deadline)
            .await;
        drop(lease);

        let entries: Vec<String> = self
            .cache
            .get(group, target)
            .await
            .unwrap_or_default()
            .into_iter()
            .take(wanted)
            .collect();

        info!(
            group = %group,
            target = %target,
            rounds,
            ?stop,
            scanned = buffer.len(),
            entries = entries.len(),
            "User cache crawl finished"
        );
        QueryResult {
            entries,
            scanned_message_count: buffer.len(),
            served_from_cache: false,
        }
    }

    /// The crawl loop. Pages strictly sequentially backwards from the leased cursor.
    async fn scan(
        &self,
        group: &GroupId,
        lease: &mut ScanLease,
        max_rounds: usize,
        fill: Option<CacheFill<'_>>,
        deadline: Option<Instant>,
    ) -> ScanOutcome {
        let page_size = self.settings.page_size;
        let buffer_limit = max_rounds.saturating_mul(page_size).saturating_mul(3) / 2;

        let mut buffer: Vec<RawMessage> = Vec::new();
        let mut seen_ids: HashSet<i64> = HashSet::new();
        let mut cursor = lease.position();
        let mut rounds = 0;

        let stop = 'rounds: {
            for round in 0..max_rounds {
                if round > 0 && !self.settings.round_delay.is_zero() {
                    tokio::time::sleep(self.settings.round_delay).await;
                }
                if deadline.is_some_and(|d| Instant::now() >= d) {
                    warn!(group = %group, round, cursor, "Deadline reached; stopping scan");
                    break 'rounds StopReason::DeadlineReached;
                }
                rounds = round + 1;

                let fetch = self.fetcher.fetch_page(group, cursor, page_size);
                let fetched = match deadline {
                    Some(d) => match tokio::time::timeout_at(d, fetch).await {
                        Ok(fetched) => fetched,
                        Err(_) => {
                            warn!(
                                group = %group,
                                round,
                                cursor,
                                "Deadline reached during fetch; stopping scan"
                            );
                            break 'rounds StopReason::DeadlineReached;
                        }
                    },
                    None => fetch.await,
                };
                let page = match fetched {
                    Ok(page) => page,
                    Err(e) => {
                        warn!(
                            group = %group,
                            round,
                            cursor,
                            error = %e,
                            "Page fetch failed; stopping scan"
                        );
                        break 'rounds StopReason::FetchFailed;
                    }
                };
                if page.is_empty() {
                    debug!(group = %group, round, cursor, "Empty page; history exhausted");
                    break 'rounds StopReason::EmptyPage;
                }

                let page_len = page.len();
                let merged_from = buffer.len();
                let mut min_key: Option<i64> = None;
                for message in page {
                    if let Some(key) = message.pagination_key().filter(|k| *k > 0) {
                        min_key = Some(min_key.map_or(key, |m| m.min(key)));
                    }
                    if let Some(id) = message.id {
                        if !seen_ids.insert(id) {
                            continue;
                        }
                    }
                    buffer.push(message);
                }
                let added = buffer.len() - merged_from;
                debug!(group = %group, round, cursor, page_len, added, ?min_key, "Page merged");
                if let Some(fill) = &fill {
                    fill.cache.collect(group, &buffer[merged_from..]).await;
                }

                let Some(min_key) = min_key else {
                    warn!(group = %group, round, "Page has no pagination key; stopping scan");
                    break 'rounds StopReason::NoPaginationKey;
                };
                if round > 0 && min_key == cursor {
                    warn!(group = %group, round, cursor, "Cursor did not advance; stopping scan");
                    break 'rounds StopReason::CursorStalled;
                }
                if round > 0 && added == 0 {
                    warn!(group = %group, round, cursor, "Page had no new messages; stopping scan");
                    break 'rounds StopReason::NoNewMessages;
                }
                if !lease.advance(min_key) {
                    warn!(
                        group = %group,
                        round,
                        cursor,
                        min_key,
                        "Page is newer than cursor; stopping scan"
                    );
                    break 'rounds StopReason::CursorStalled;
                }
                cursor = min_key;

                if let Some(fill) = &fill {
                    if fill.cache.count(group, fill.target).await >= fill.wanted {
                        break 'rounds StopReason::Satisfied;
                    }
                }

                if buffer.len() > buffer_limit {
                    warn!(
                        group = %group,
                        round,
                        buffered = buffer.len(),
                        buffer_limit,
                        "Buffer limit reached; stopping scan"
                    );
                    break 'rounds StopReason::BufferLimit;
                }
            }
            StopReason::RoundsExhausted
        };

        ScanOutcome {
            buffer,
            rounds,
            stop,
        }
    }
}
