//! [`ProfileLookup`] over `get_group_member_info`.

use async_trait::async_trait;
use portrayal_core::{
    FetchError, Gender, GroupId, ProfileError, ProfileLookup, RawMessage, UserId, UserProfile,
};
use serde_json::json;

use crate::client::{id_param, OneBotClient};
use crate::wire::{first_non_blank, MemberInfo};

pub const GET_GROUP_MEMBER_INFO: &str = "get_group_member_info";

#[derive(Debug, Clone)]
pub struct OneBotProfileLookup {
    client: OneBotClient,
}

impl OneBotProfileLookup {
    pub fn new(client: OneBotClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ProfileLookup for OneBotProfileLookup {
    async fn get_profile(
        &self,
        group: &GroupId,
        user: &UserId,
    ) -> Result<UserProfile, ProfileError> {
        let params = json!({
            "group_id": id_param(group.as_str()),
            "user_id": id_param(user.as_str()),
        });
        let info: MemberInfo = self
            .client
            .call_action(GET_GROUP_MEMBER_INFO, &params)
            .await
            .map_err(|e| match e {
                FetchError::Remote { .. } => ProfileError::NotFound(format!("{}: {}", user, e)),
                other => ProfileError::Lookup(other.to_string()),
            })?;

        let nickname = first_non_blank(&[info.card.as_deref(), info.nickname.as_deref()])
            .unwrap_or_else(|| RawMessage::placeholder_name(user));

        Ok(UserProfile {
            user_id: user.clone(),
            nickname,
            gender: Gender::from_marker(info.sex.as_deref()),
        })
    }
}
