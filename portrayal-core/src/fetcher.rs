//! Remote collaborator traits: history paging and member profile lookup.
//!
//! Both are transport-agnostic; `onebot` implements them over the OneBot HTTP API.

use async_trait::async_trait;

use crate::error::{FetchError, ProfileError};
use crate::types::{GroupId, RawMessage, UserId, UserProfile};

/// Fetches one page of group history older than a cursor.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Returns up to `page_size` messages older than `before_sequence` (0 = newest).
    ///
    /// No ordering is guaranteed and the page may overlap earlier pages. `page_size` is a hint.
    async fn fetch_page(
        &self,
        group: &GroupId,
        before_sequence: i64,
        page_size: usize,
    ) -> Result<Vec<RawMessage>, FetchError>;
}

/// Looks up a member's display name and gender within a group.
#[async_trait]
pub trait ProfileLookup: Send + Sync {
    async fn get_profile(&self, group: &GroupId, user: &UserId)
        -> Result<UserProfile, ProfileError>;
}
