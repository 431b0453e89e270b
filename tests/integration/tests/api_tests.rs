//! REST API integration tests
//!
//! Each test starts its own API server over fresh in-memory storage.

use chat_cache::RecentMessages;
use integration_tests::{
    snowflake, TestApi, TestCluster, ALICE, BAD_TOKEN, BOB, CAROL, GHOST, INTEGRATION,
};
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

async fn api() -> (TestCluster, TestApi) {
    let cluster = TestCluster::new();
    let api = cluster.start_api().await.expect("Failed to start API server");
    (cluster, api)
}

fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap_or_default()
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_endpoints() {
    let (_cluster, api) = api().await;

    let response = api
        .request(Method::GET, "/health", None, None)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");

    // No pool, in-process bus: ready
    let response = api
        .request(Method::GET, "/health/ready", None, None)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["checks"]["bus"], "healthy");
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let (_cluster, api) = api().await;

    let response = api
        .request(Method::GET, "/api/v1/users/@me/channels", Some(&ALICE), None)
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_missing_or_bad_token_is_unauthorized() {
    let (_cluster, api) = api().await;

    let response = api
        .request(Method::GET, "/api/v1/users/@me/channels", None, None)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = api
        .client
        .get(format!("{}/api/v1/users/@me/channels", api.base_url()))
        .bearer_auth(BAD_TOKEN)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(error_code(&body), "AUTHENTICATION_FAILED");
}

// ============================================================================
// Channels
// ============================================================================

#[tokio::test]
async fn test_create_join_and_list_channels() {
    let (_cluster, api) = api().await;

    let (status, channel) = api
        .post(
            "/api/v1/channels",
            &ALICE,
            json!({ "name": "general", "topic": "Anything goes" }),
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(channel["name"], "general");
    assert_eq!(channel["topic"], "Anything goes");
    assert_eq!(channel["creator_id"], ALICE.id_str());
    assert_eq!(channel["version"], 1);
    let channel_id = channel["id"].as_str().unwrap().to_string();

    api.join(&channel_id, &BOB).await.unwrap();

    let (status, joined) = api
        .get(&format!("/api/v1/channels/{channel_id}"), &BOB)
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(joined["version"], 2);
    assert_eq!(joined["members"].as_array().unwrap().len(), 2);

    let (status, mine) = api.get("/api/v1/users/@me/channels", &BOB).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().unwrap().len(), 1);

    let (_, none) = api.get("/api/v1/users/@me/channels", &CAROL).await.unwrap();
    assert!(none.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_channel_validation_and_lookup_errors() {
    let (_cluster, api) = api().await;

    let (status, body) = api
        .post("/api/v1/channels", &ALICE, json!({ "name": "   " }))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["code"].is_string());

    let (status, body) = api.get("/api/v1/channels/424242", &ALICE).await.unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "UNKNOWN_CHANNEL");

    let (status, _) = api.get("/api/v1/channels/not-an-id", &ALICE).await.unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_membership_rules() {
    let (_cluster, api) = api().await;
    let channel_id = api.create_channel(&ALICE, "general").await.unwrap();

    // Non-members cannot read
    let (status, body) = api
        .get(&format!("/api/v1/channels/{channel_id}"), &BOB)
        .await
        .unwrap();
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "NOT_CHANNEL_MEMBER");

    api.join(&channel_id, &BOB).await.unwrap();

    // Joining twice conflicts
    let (status, body) = api
        .post(&format!("/api/v1/channels/{channel_id}/members"), &BOB, json!({}))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "ALREADY_MEMBER");

    // The creator cannot leave
    let (status, _) = api
        .delete(&format!("/api/v1/channels/{channel_id}/members/@me"), &ALICE)
        .await
        .unwrap();
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = api
        .delete(&format!("/api/v1/channels/{channel_id}/members/@me"), &BOB)
        .await
        .unwrap();
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = api
        .get(&format!("/api/v1/channels/{channel_id}"), &BOB)
        .await
        .unwrap();
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_topic_and_archive_are_creator_only() {
    let (_cluster, api) = api().await;
    let channel_id = api.create_channel(&ALICE, "general").await.unwrap();
    api.join(&channel_id, &BOB).await.unwrap();
    let topic = format!("/api/v1/channels/{channel_id}/topic");

    let (status, body) = api
        .patch(&topic, &BOB, json!({ "topic": "Hijacked" }))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "NOT_CHANNEL_CREATOR");

    let (status, channel) = api
        .patch(&topic, &ALICE, json!({ "topic": "Release planning" }))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(channel["topic"], "Release planning");

    let archive = format!("/api/v1/channels/{channel_id}/archive");
    let (status, _) = api.post(&archive, &BOB, json!({})).await.unwrap();
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = api.post(&archive, &ALICE, json!({})).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "archived": true, "changed": true }));

    let (_, body) = api.post(&archive, &ALICE, json!({})).await.unwrap();
    assert_eq!(body, json!({ "archived": true, "changed": false }));

    // Archived channels still take messages
    api.send_message(&channel_id, &BOB, "still here").await.unwrap();

    let (status, body) = api.delete(&archive, &ALICE).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["archived"], false);
}

#[tokio::test]
async fn test_mark_read() {
    let (_cluster, api) = api().await;
    let channel_id = api.create_channel(&ALICE, "general").await.unwrap();
    let read = format!("/api/v1/channels/{channel_id}/read");

    let (status, marker) = api.post(&read, &ALICE, json!({})).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(marker["channel_id"], channel_id);
    let latest = marker["last_read"].as_str().unwrap().to_string();

    // An older timestamp does not move the marker back
    let (status, marker) = api
        .post(&read, &ALICE, json!({ "at": "2020-01-01T00:00:00Z" }))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(marker["last_read"], latest);

    let (status, body) = api.post(&read, &BOB, json!({})).await.unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "UNKNOWN_MEMBER");
}

// ============================================================================
// Messages
// ============================================================================

#[tokio::test]
async fn test_post_and_page_messages() {
    let (_cluster, api) = api().await;
    let channel_id = api.create_channel(&ALICE, "general").await.unwrap();

    let mut ids = Vec::new();
    for i in 0..5 {
        ids.push(
            api.send_message(&channel_id, &ALICE, &format!("message {i}"))
                .await
                .unwrap(),
        );
    }

    let messages = format!("/api/v1/channels/{channel_id}/messages");
    let (status, page) = api
        .get(&format!("{messages}?limit=2"), &ALICE)
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    let data = page["data"].as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["id"], ids[3]);
    assert_eq!(data[1]["id"], ids[4]);
    assert_eq!(page["pagination"]["has_more"], true);
    let cursor = page["pagination"]["before"].as_str().unwrap().to_string();
    assert_eq!(cursor, ids[3]);

    let (_, older) = api
        .get(&format!("{messages}?limit=10&before={cursor}"), &ALICE)
        .await
        .unwrap();
    let data = older["data"].as_array().unwrap();
    assert_eq!(data.len(), 3);
    assert_eq!(data[0]["content"], "message 0");
    assert_eq!(older["pagination"]["has_more"], false);
    assert!(older["pagination"].get("before").is_none());
}

#[tokio::test]
async fn test_messages_are_enriched_with_sender() {
    let (_cluster, api) = api().await;
    let channel_id = api.create_channel(&ALICE, "general").await.unwrap();

    let (status, message) = api
        .post(
            &format!("/api/v1/channels/{channel_id}/messages"),
            &ALICE,
            json!({ "content": "**hello** <@1002> https://example.com" }),
        )
        .await
        .unwrap();

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(message["sender_user_id"], ALICE.id_str());
    assert_eq!(message["sender"]["username"], "alice");
    assert_eq!(message["sender"]["display_name"], "Alice Liddell");
    assert_eq!(message["channel_id"], channel_id);
}

#[tokio::test]
async fn test_unknown_sender_degrades_to_ids() {
    let (_cluster, api) = api().await;
    let channel_id = api.create_channel(&ALICE, "general").await.unwrap();
    api.join(&channel_id, &GHOST).await.unwrap();

    let (status, message) = api
        .post(
            &format!("/api/v1/channels/{channel_id}/messages"),
            &GHOST,
            json!({ "content": "boo" }),
        )
        .await
        .unwrap();

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(message["sender_user_id"], GHOST.id_str());
    assert!(message.get("sender").map_or(true, Value::is_null));
}

#[tokio::test]
async fn test_message_rules() {
    let (_cluster, api) = api().await;
    let channel_id = api.create_channel(&ALICE, "general").await.unwrap();
    let other_id = api.create_channel(&ALICE, "random").await.unwrap();
    let messages = format!("/api/v1/channels/{channel_id}/messages");

    let (status, body) = api
        .post(&messages, &BOB, json!({ "content": "let me in" }))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "NOT_CHANNEL_MEMBER");

    let (status, _) = api
        .post(&messages, &ALICE, json!({ "content": "" }))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // A parent from another channel is unknown here
    let foreign = api.send_message(&other_id, &ALICE, "elsewhere").await.unwrap();
    let (status, body) = api
        .post(
            &messages,
            &ALICE,
            json!({ "content": "reply", "parent_message_id": foreign }),
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "UNKNOWN_PARENT_MESSAGE");

    let parent = api.send_message(&channel_id, &ALICE, "root").await.unwrap();
    let (status, reply) = api
        .post(
            &messages,
            &ALICE,
            json!({ "content": "reply", "parent_message_id": parent }),
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(reply["parent_message_id"], parent);
}

#[tokio::test]
async fn test_notifications() {
    let (cluster, api) = api().await;
    let channel_id = api.create_channel(&ALICE, "builds").await.unwrap();
    let notifications = format!("/api/v1/channels/{channel_id}/notifications");

    let (status, message) = api
        .post(
            &notifications,
            &ALICE,
            json!({ "integration_id": INTEGRATION.to_string(), "content": "build #12 passed" }),
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(message["integration_id"], INTEGRATION.to_string());
    assert_eq!(message["integration"]["service_name"], "ci-bot");
    assert!(message.get("sender_user_id").map_or(true, Value::is_null));

    // Any authenticated caller may speak for the integration, member or not
    let (status, message) = api
        .post(
            &notifications,
            &BOB,
            json!({ "integration_id": INTEGRATION.to_string(), "content": "deploy done" }),
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(message["integration_id"], INTEGRATION.to_string());

    let (status, body) = api
        .post(
            &notifications,
            &ALICE,
            json!({ "integration_id": "31337", "content": "who am I" }),
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "UNKNOWN_INTEGRATION");

    cluster.integrations.revoke(INTEGRATION);
    let (status, body) = api
        .post(
            &notifications,
            &ALICE,
            json!({ "integration_id": INTEGRATION.to_string(), "content": "build #13" }),
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "INTEGRATION_REVOKED");
}

#[tokio::test]
async fn test_http_posts_fill_the_recent_cache() {
    let (cluster, api) = api().await;
    let channel_id = api.create_channel(&ALICE, "builds").await.unwrap();
    let channel = snowflake(&channel_id).unwrap();

    let first = api.send_message(&channel_id, &ALICE, "first").await.unwrap();
    let (status, _) = api
        .post(
            &format!("/api/v1/channels/{channel_id}/notifications"),
            &ALICE,
            json!({ "integration_id": INTEGRATION.to_string(), "content": "build passed" }),
        )
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CREATED);

    let cached = cluster.recent.recent_messages(channel, 10).await.unwrap();
    assert_eq!(cached.len(), 2);
    assert_eq!(cached[0]["content"], "build passed");
    assert_eq!(cached[1]["id"], first);

    let recent = format!("/api/v1/channels/{channel_id}/messages/recent");
    let (status, body) = api.get(&format!("{recent}?limit=2"), &ALICE).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let data = body.as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["id"], first);
    assert_eq!(data[1]["content"], "build passed");

    // More than the cache holds comes from storage, same order
    let (status, body) = api.get(&format!("{recent}?limit=5"), &ALICE).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    let data = body.as_array().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data[0]["id"], first);

    let (status, body) = api.get(&recent, &BOB).await.unwrap();
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "NOT_CHANNEL_MEMBER");
}

// ============================================================================
// Reactions
// ============================================================================

#[tokio::test]
async fn test_reaction_cycle() {
    let (_cluster, api) = api().await;
    let channel_id = api.create_channel(&ALICE, "general").await.unwrap();
    api.join(&channel_id, &BOB).await.unwrap();
    let message_id = api.send_message(&channel_id, &ALICE, "ship it").await.unwrap();
    let reaction = format!("/api/v1/channels/{channel_id}/messages/{message_id}/reactions/thumbsup");

    let (status, body) = api.put(&reaction, &BOB).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], BOB.id_str());
    assert_eq!(body["reaction_type"], "thumbsup");

    let (status, body) = api.put(&reaction, &BOB).await.unwrap();
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "REACTION_ALREADY_EXISTS");

    let (_, page) = api
        .get(&format!("/api/v1/channels/{channel_id}/messages"), &ALICE)
        .await
        .unwrap();
    assert_eq!(page["data"][0]["reactions"].as_array().unwrap().len(), 1);

    let (status, _) = api.delete(&reaction, &BOB).await.unwrap();
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = api.delete(&reaction, &BOB).await.unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "UNKNOWN_REACTION");

    let (status, _) = api.put(&reaction, &CAROL).await.unwrap();
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// ============================================================================
// Invites
// ============================================================================

#[tokio::test]
async fn test_invite_flow() {
    let (_cluster, api) = api().await;
    let channel_id = api.create_channel(&ALICE, "general").await.unwrap();
    let invites = format!("/api/v1/channels/{channel_id}/invites");

    let (status, invite) = api
        .post(&invites, &ALICE, json!({ "max_uses": 1 }))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(invite["uses"], 0);
    assert_eq!(invite["max_uses"], 1);
    let code = invite["code"].as_str().unwrap().to_string();

    // Outsiders cannot list invites
    let (status, _) = api.get(&invites, &BOB).await.unwrap();
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, channel) = api
        .post(&format!("/api/v1/invites/{code}"), &BOB, json!({}))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(channel["id"], channel_id);

    // Single use: exhausted now
    let (status, body) = api
        .post(&format!("/api/v1/invites/{code}"), &CAROL, json!({}))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "INVITE_EXHAUSTED");

    let (status, listed) = api.get(&invites, &BOB).await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed[0]["uses"], 1);
}

#[tokio::test]
async fn test_invite_deactivation() {
    let (_cluster, api) = api().await;
    let channel_id = api.create_channel(&ALICE, "general").await.unwrap();

    // No body: defaults apply
    let response = api
        .request(
            Method::POST,
            &format!("/api/v1/channels/{channel_id}/invites"),
            Some(&ALICE),
            None,
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let invite: Value = response.json().await.unwrap();
    let code = invite["code"].as_str().unwrap().to_string();
    assert!(invite["expires_at"].is_string());

    let (status, _) = api
        .delete(&format!("/api/v1/invites/{code}"), &BOB)
        .await
        .unwrap();
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = api
        .delete(&format!("/api/v1/invites/{code}"), &ALICE)
        .await
        .unwrap();
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = api
        .post(&format!("/api/v1/invites/{code}"), &BOB, json!({}))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "INVITE_INACTIVE");

    let (status, body) = api
        .post("/api/v1/invites/nosuchcode", &BOB, json!({}))
        .await
        .unwrap();
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "UNKNOWN_INVITE");
}
