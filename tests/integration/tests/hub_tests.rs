//! WebSocket gateway integration tests
//!
//! Hubs started from one cluster share the in-process bus, so a frame
//! handled by one hub reaches clients connected to any of them.

use std::time::Duration;

use chat_cache::RecentMessages;
use chat_core::ChannelRepository;
use integration_tests::{eventually, snowflake, TestCluster, WsClient, ALICE, BAD_TOKEN, BOB, CAROL};
use serde_json::json;
use tokio_tungstenite::tungstenite;

const QUIET: Duration = Duration::from_millis(300);

#[tokio::test]
async fn test_upgrade_requires_valid_token() {
    let cluster = TestCluster::new();
    let hub = cluster.start_gateway().await.unwrap();

    let err = WsClient::connect(&hub.ws_url(BAD_TOKEN)).await.err().unwrap();
    match err.downcast_ref::<tungstenite::Error>() {
        Some(tungstenite::Error::Http(response)) => assert_eq!(response.status(), 401),
        other => panic!("expected HTTP 401, got {other:?}"),
    }

    let err = WsClient::connect(&format!("ws://{}/ws", hub.addr)).await;
    assert!(err.is_err());
    assert_eq!(hub.connection_count(), 0);
}

#[tokio::test]
async fn test_connected_frame_and_ping() {
    let cluster = TestCluster::new();
    let hub = cluster.start_gateway().await.unwrap();

    let mut client = WsClient::connect(&hub.ws_url(ALICE.token)).await.unwrap();
    let hello = client.next_frame().await.unwrap();
    assert_eq!(hello["type"], "connected");
    assert_eq!(hello["payload"]["user_id"], ALICE.id_str());
    assert!(hello["payload"]["session_id"].is_string());

    client.send("ping", json!({})).await.unwrap();
    client.expect("pong").await.unwrap();
    assert_eq!(hub.connection_count(), 1);

    client.close().await.unwrap();
    assert!(eventually(|| hub.connection_count() == 0).await);
}

#[tokio::test]
async fn test_bad_frames_answer_with_error() {
    let cluster = TestCluster::new();
    let hub = cluster.start_gateway().await.unwrap();
    let mut client = hub.connect(&ALICE).await.unwrap();

    client.send_raw("{not json".to_string()).await.unwrap();
    let error = client.expect("error").await.unwrap();
    assert!(error["payload"]["message"].is_string());

    client.send("teleport", json!({})).await.unwrap();
    client.expect("error").await.unwrap();

    // The connection survives
    client.send("ping", json!({})).await.unwrap();
    client.expect("pong").await.unwrap();
}

#[tokio::test]
async fn test_message_crosses_hubs_exactly_once() {
    let cluster = TestCluster::new();
    let api = cluster.start_api().await.unwrap();
    let hub_a = cluster.start_gateway().await.unwrap();
    let hub_b = cluster.start_gateway().await.unwrap();

    let channel_id = api.create_channel(&ALICE, "general").await.unwrap();
    api.join(&channel_id, &BOB).await.unwrap();

    let mut alice = hub_a.connect(&ALICE).await.unwrap();
    let mut bob = hub_b.connect(&BOB).await.unwrap();

    alice
        .send(
            "message",
            json!({ "channel_id": channel_id, "content": "hello from A" }),
        )
        .await
        .unwrap();

    let received = bob.expect("new_message").await.unwrap();
    assert_eq!(received["payload"]["content"], "hello from A");
    assert_eq!(received["payload"]["sender_user_id"], ALICE.id_str());
    assert_eq!(received["payload"]["sender"]["username"], "alice");
    bob.expect_silence(QUIET).await.unwrap();

    // The sender sees its own message once, through the bus
    let echoed = alice.expect("new_message").await.unwrap();
    assert_eq!(echoed["payload"]["id"], received["payload"]["id"]);
    alice.expect_silence(QUIET).await.unwrap();

    // And it was stored once
    let (_, page) = api
        .get(&format!("/api/v1/channels/{channel_id}/messages"), &BOB)
        .await
        .unwrap();
    assert_eq!(page["data"].as_array().unwrap().len(), 1);

    // And cached once, by the hub that published it
    let cached = cluster
        .recent
        .recent_messages(snowflake(&channel_id).unwrap(), 10)
        .await
        .unwrap();
    assert_eq!(cached.len(), 1);
    assert_eq!(cached[0]["id"], received["payload"]["id"]);
}

#[tokio::test]
async fn test_non_member_frame_is_refused() {
    let cluster = TestCluster::new();
    let api = cluster.start_api().await.unwrap();
    let hub = cluster.start_gateway().await.unwrap();
    let channel_id = api.create_channel(&ALICE, "general").await.unwrap();

    let mut alice = hub.connect(&ALICE).await.unwrap();
    let mut carol = hub.connect(&CAROL).await.unwrap();

    carol
        .send(
            "message",
            json!({ "channel_id": channel_id, "content": "let me in" }),
        )
        .await
        .unwrap();

    let error = carol.expect("error").await.unwrap();
    assert_eq!(error["payload"]["code"], "NOT_CHANNEL_MEMBER");
    alice.expect_silence(QUIET).await.unwrap();
}

#[tokio::test]
async fn test_http_events_reach_ws_clients() {
    let cluster = TestCluster::new();
    let api = cluster.start_api().await.unwrap();
    let hub = cluster.start_gateway().await.unwrap();
    let channel_id = api.create_channel(&ALICE, "general").await.unwrap();

    let mut alice = hub.connect(&ALICE).await.unwrap();
    let mut bob = hub.connect(&BOB).await.unwrap();

    // Joining over HTTP subscribes Bob's live session
    api.join(&channel_id, &BOB).await.unwrap();
    let joined = alice.expect("user_joined").await.unwrap();
    assert_eq!(joined["payload"]["user_id"], BOB.id_str());
    bob.expect("user_joined").await.unwrap();

    let message_id = api
        .send_message(&channel_id, &ALICE, "posted over HTTP")
        .await
        .unwrap();
    let received = bob.expect("new_message").await.unwrap();
    assert_eq!(received["payload"]["id"], message_id);
    alice.expect("new_message").await.unwrap();

    let (status, _) = api
        .put(
            &format!("/api/v1/channels/{channel_id}/messages/{message_id}/reactions/tada"),
            &BOB,
        )
        .await
        .unwrap();
    assert_eq!(status, 200);
    let reaction = alice.expect("reaction_added").await.unwrap();
    assert_eq!(reaction["payload"]["reaction_type"], "tada");
    assert_eq!(reaction["payload"]["user_id"], BOB.id_str());
    bob.expect("reaction_added").await.unwrap();

    // Leaving unsubscribes after the announcement
    let (status, _) = api
        .delete(&format!("/api/v1/channels/{channel_id}/members/@me"), &BOB)
        .await
        .unwrap();
    assert_eq!(status, 204);
    alice.expect("user_left").await.unwrap();
    bob.expect("user_left").await.unwrap();

    api.send_message(&channel_id, &ALICE, "Bob is gone")
        .await
        .unwrap();
    alice.expect("new_message").await.unwrap();
    bob.expect_silence(QUIET).await.unwrap();
}

#[tokio::test]
async fn test_typing_is_relayed_not_stored() {
    let cluster = TestCluster::new();
    let api = cluster.start_api().await.unwrap();
    let hub_a = cluster.start_gateway().await.unwrap();
    let hub_b = cluster.start_gateway().await.unwrap();
    let channel_id = api.create_channel(&ALICE, "general").await.unwrap();
    api.join(&channel_id, &BOB).await.unwrap();

    let mut alice = hub_a.connect(&ALICE).await.unwrap();
    let mut bob = hub_b.connect(&BOB).await.unwrap();

    alice
        .send("typing_start", json!({ "channel_id": channel_id }))
        .await
        .unwrap();
    let typing = bob.next_frame().await.unwrap();
    assert_eq!(typing["type"], "typing_start");
    assert_eq!(typing["payload"]["user_id"], ALICE.id_str());

    alice
        .send("typing_stop", json!({ "channel_id": channel_id }))
        .await
        .unwrap();
    let typing = bob.next_frame().await.unwrap();
    assert_eq!(typing["type"], "typing_stop");

    let channel = cluster
        .channels
        .find_by_id(snowflake(&channel_id).unwrap())
        .await
        .unwrap()
        .unwrap();
    assert!(channel.messages().is_empty());
}

#[tokio::test]
async fn test_reaction_frames() {
    let cluster = TestCluster::new();
    let api = cluster.start_api().await.unwrap();
    let hub = cluster.start_gateway().await.unwrap();
    let channel_id = api.create_channel(&ALICE, "general").await.unwrap();
    api.join(&channel_id, &BOB).await.unwrap();
    let message_id = api.send_message(&channel_id, &ALICE, "vote").await.unwrap();

    let mut alice = hub.connect(&ALICE).await.unwrap();
    let mut bob = hub.connect(&BOB).await.unwrap();
    let reaction = json!({
        "channel_id": channel_id,
        "message_id": message_id,
        "reaction_type": "thumbsup",
    });

    bob.send("add_reaction", reaction.clone()).await.unwrap();
    alice.expect("reaction_added").await.unwrap();
    bob.expect("reaction_added").await.unwrap();

    bob.send("add_reaction", reaction.clone()).await.unwrap();
    let error = bob.expect("error").await.unwrap();
    assert_eq!(error["payload"]["code"], "REACTION_ALREADY_EXISTS");
    alice.expect_silence(QUIET).await.unwrap();

    bob.send("remove_reaction", reaction).await.unwrap();
    let removed = alice.expect("reaction_removed").await.unwrap();
    assert_eq!(removed["payload"]["user_id"], BOB.id_str());
}
