//! HTTP-level tests for the OneBot adapter against a mockito server.
//!
//! Covers request shape of `get_group_msg_history` / `get_group_member_info`, decoding of
//! the envelope, and the mapping of HTTP / retcode failures to errors.

use mockito::Matcher;
use onebot::{
    OneBotClient, OneBotConfig, OneBotPageFetcher, OneBotProfileLookup, GET_GROUP_MEMBER_INFO,
    GET_GROUP_MSG_HISTORY,
};
use portrayal_core::{FetchError, Gender, GroupId, PageFetcher, ProfileError, ProfileLookup, UserId};
use serde_json::json;

fn client_for(server: &mockito::Server) -> OneBotClient {
    OneBotClient::new(&OneBotConfig::with_api_url(server.url())).unwrap()
}

#[tokio::test]
async fn test_fetch_page_sends_cursor_and_decodes_messages() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", format!("/{}", GET_GROUP_MSG_HISTORY).as_str())
        .match_body(Matcher::PartialJson(json!({
            "group_id": 123456,
            "message_seq": 500,
            "count": 2,
            "reverseOrder": true
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "status": "ok",
                "retcode": 0,
                "data": {"messages": [
                    {
                        "message_id": 498, "message_seq": 498, "time": 1700000001,
                        "sender": {"user_id": 1, "card": "Ann", "nickname": "ann"},
                        "message": [{"type": "text", "data": {"text": "first"}}]
                    },
                    {
                        "message_id": 499, "time": 1700000002,
                        "sender": {"user_id": 2, "nickname": "ben"},
                        "message": [{"type": "face", "data": {"id": "1"}}]
                    }
                ]}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let fetcher = OneBotPageFetcher::new(client_for(&server));
    let page = fetcher
        .fetch_page(&GroupId::from("123456"), 500, 2)
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].author_display_name, "Ann");
    assert_eq!(page[0].text(), "first");
    assert_eq!(page[1].pagination_key(), Some(499));
    assert!(!page[1].has_text());
}

#[tokio::test]
async fn test_fetch_page_skips_record_without_sender_id() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", format!("/{}", GET_GROUP_MSG_HISTORY).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "status": "ok",
                "retcode": 0,
                "data": {"messages": [
                    {
                        "message_id": 10, "message_seq": 10, "time": 1,
                        "sender": {"user_id": 1, "nickname": "ann"},
                        "message": [{"type": "text", "data": {"text": "kept"}}]
                    },
                    {"message_id": 11, "time": 2, "sender": {}, "message": []}
                ]}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let fetcher = OneBotPageFetcher::new(client_for(&server));
    let page = fetcher
        .fetch_page(&GroupId::from("1"), 0, 100)
        .await
        .unwrap();

    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, Some(10));
    assert_eq!(page[0].text(), "kept");
}

#[tokio::test]
async fn test_fetch_page_maps_retcode_to_remote_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", format!("/{}", GET_GROUP_MSG_HISTORY).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status":"failed","retcode":1200,"data":null,"wording":"not in group"}"#)
        .create_async()
        .await;

    let fetcher = OneBotPageFetcher::new(client_for(&server));
    let err = fetcher
        .fetch_page(&GroupId::from("1"), 0, 100)
        .await
        .unwrap_err();

    match err {
        FetchError::Remote { retcode, message } => {
            assert_eq!(retcode, 1200);
            assert_eq!(message, "not in group");
        }
        other => panic!("Expected Remote error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_page_maps_http_failure_to_status_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", format!("/{}", GET_GROUP_MSG_HISTORY).as_str())
        .with_status(502)
        .with_body("bad gateway")
        .create_async()
        .await;

    let fetcher = OneBotPageFetcher::new(client_for(&server));
    let err = fetcher
        .fetch_page(&GroupId::from("1"), 0, 100)
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Status(_)));
}

#[tokio::test]
async fn test_fetch_page_rejects_malformed_body() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", format!("/{}", GET_GROUP_MSG_HISTORY).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("not json")
        .create_async()
        .await;

    let fetcher = OneBotPageFetcher::new(client_for(&server));
    let err = fetcher
        .fetch_page(&GroupId::from("1"), 0, 100)
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Decode(_)));
}

#[tokio::test]
async fn test_get_profile_reads_card_and_sex() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", format!("/{}", GET_GROUP_MEMBER_INFO).as_str())
        .match_body(Matcher::PartialJson(json!({"group_id": 77, "user_id": 10001})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "status": "ok",
                "retcode": 0,
                "data": {"user_id": 10001, "card": "  ", "nickname": "Momo", "sex": "female"}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let lookup = OneBotProfileLookup::new(client_for(&server));
    let profile = lookup
        .get_profile(&GroupId::from("77"), &UserId::from("10001"))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(profile.nickname, "Momo");
    assert_eq!(profile.gender, Gender::Female);
    assert_eq!(profile.pronoun(), "she");
}

#[tokio::test]
async fn test_get_profile_unknown_member() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", format!("/{}", GET_GROUP_MEMBER_INFO).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"status":"failed","retcode":100,"data":null,"message":"member not found"}"#)
        .create_async()
        .await;

    let lookup = OneBotProfileLookup::new(client_for(&server));
    let err = lookup
        .get_profile(&GroupId::from("77"), &UserId::from("5"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProfileError::NotFound(_)));
}
