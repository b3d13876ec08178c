//! Shared test utilities for history-crawler integration tests.
//!
//! Provides two `PageFetcher` mocks that record every `before_sequence` they are called with:
//! - `PagedHistory`: a well-behaved remote over a fixed message list
//! - `ScriptedFetcher`: returns pre-scripted pages / errors in order, then empty pages

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use history_crawler::{CollectStrategy, CrawlerSettings};
use portrayal_core::{FetchError, GroupId, PageFetcher, RawMessage, UserId};

pub const TARGET: &str = "10001";

/// Message with `id == seq` and `timestamp == seq`.
pub fn msg(seq: i64, author: &str, text: &str) -> RawMessage {
    RawMessage {
        id: Some(seq),
        sequence_number: Some(seq),
        author_id: UserId::from(author),
        author_display_name: format!("{}-name", author),
        timestamp: seq,
        text_segments: vec![text.to_string()],
    }
}

pub fn group() -> GroupId {
    GroupId::from("123456")
}

pub fn target() -> UserId {
    UserId::from(TARGET)
}

pub fn settings(page_size: usize, context_window_size: usize) -> CrawlerSettings {
    CrawlerSettings {
        page_size,
        max_msg_count: 100,
        context_window_size,
        cache_ttl: Duration::from_secs(600),
        round_delay: Duration::ZERO,
        strategy: CollectStrategy::ContextWindow,
    }
}

/// Remote with a fixed history; pages newest-first strictly older than the cursor.
pub struct PagedHistory {
    messages: Vec<RawMessage>,
    calls: Mutex<Vec<i64>>,
}

impl PagedHistory {
    pub fn new(mut messages: Vec<RawMessage>) -> Arc<Self> {
        messages.sort_by_key(|m| m.pagination_key());
        Arc::new(Self {
            messages,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<i64> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for PagedHistory {
    async fn fetch_page(
        &self,
        _group: &GroupId,
        before_sequence: i64,
        page_size: usize,
    ) -> Result<Vec<RawMessage>, FetchError> {
        self.calls.lock().unwrap().push(before_sequence);
        let older: Vec<RawMessage> = self
            .messages
            .iter()
            .filter(|m| {
                before_sequence == 0 || m.pagination_key().unwrap_or(0) < before_sequence
            })
            .cloned()
            .collect();
        let skip = older.len().saturating_sub(page_size);
        Ok(older.into_iter().skip(skip).rev().collect())
    }
}

/// Remote that replays a script of pages and errors, then returns empty pages.
pub struct ScriptedFetcher {
    script: Mutex<VecDeque<Result<Vec<RawMessage>, FetchError>>>,
    calls: Mutex<Vec<i64>>,
}

impl ScriptedFetcher {
    pub fn new(script: Vec<Result<Vec<RawMessage>, FetchError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn pages(pages: Vec<Vec<RawMessage>>) -> Arc<Self> {
        Self::new(pages.into_iter().map(Ok).collect())
    }

    pub fn calls(&self) -> Vec<i64> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch_page(
        &self,
        _group: &GroupId,
        before_sequence: i64,
        _page_size: usize,
    ) -> Result<Vec<RawMessage>, FetchError> {
        self.calls.lock().unwrap().push(before_sequence);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}
