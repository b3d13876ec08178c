//! [`PageFetcher`] over `get_group_msg_history`.

use async_trait::async_trait;
use portrayal_core::{FetchError, GroupId, PageFetcher, RawMessage};
use serde_json::json;
use tracing::debug;

use crate::client::{id_param, OneBotClient};
use crate::wire::HistoryData;

pub const GET_GROUP_MSG_HISTORY: &str = "get_group_msg_history";

/// Stateless adapter: one HTTP action per page.
#[derive(Debug, Clone)]
pub struct OneBotPageFetcher {
    client: OneBotClient,
}

impl OneBotPageFetcher {
    pub fn new(client: OneBotClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for OneBotPageFetcher {
    async fn fetch_page(
        &self,
        group: &GroupId,
        before_sequence: i64,
        page_size: usize,
    ) -> Result<Vec<RawMessage>, FetchError> {
        let params = json!({
            "group_id": id_param(group.as_str()),
            "message_seq": before_sequence,
            "count": page_size,
            "reverseOrder": true,
        });
        let data: HistoryData = self
            .client
            .call_action(GET_GROUP_MSG_HISTORY, &params)
            .await?;

        let page = data.into_raw_messages();
        debug!(
            group = %group,
            before_sequence,
            returned = page.len(),
            "History page fetched"
        );
        Ok(page)
    }
}
