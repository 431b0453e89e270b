//! End-to-end channel scenarios at the service layer
//!
//! Versions, emitted events and the optimistic save rule, checked against
//! the shared in-memory repositories.

use chat_core::{AggregateRoot, ChannelRepository, DomainError, EventPayload, MessageContent};
use chat_service::{ChannelService, CreateChannelRequest, ServiceError};
use integration_tests::{TestCluster, ALICE, BOB};

fn general() -> CreateChannelRequest {
    CreateChannelRequest {
        name: "general".to_string(),
        topic: None,
    }
}

fn domain(err: ServiceError) -> DomainError {
    match err {
        ServiceError::Domain(e) => e,
        other => panic!("expected a domain error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_create_join_post() {
    let cluster = TestCluster::new();
    let ctx = cluster.service_context().unwrap();
    let service = ChannelService::new(&ctx);

    let channel = service.create_channel(ALICE.id, general()).await.unwrap();
    assert_eq!(channel.version(), 1);

    let channel = service.join_channel(channel.id(), BOB.id).await.unwrap();
    assert_eq!(channel.version(), 2);

    let message = service
        .post_message(channel.id(), ALICE.id, "hello", None)
        .await
        .unwrap();

    let stored = cluster.channels.find_by_id(channel.id()).await.unwrap().unwrap();
    assert_eq!(stored.version(), 3);
    assert_eq!(stored.messages().len(), 1);
    assert!(stored.pending_events().is_empty());

    assert_eq!(
        cluster.events.names(),
        vec!["ChannelCreated", "UserJoinedChannel", "MessageSent"]
    );
    let sent = cluster.events.events().pop().unwrap();
    assert_eq!(sent.aggregate_version, 3);
    match sent.payload {
        EventPayload::MessageSent {
            message_id,
            sender_user_id,
            integration_id,
            ..
        } => {
            assert_eq!(message_id, message.id);
            assert_eq!(sender_user_id, Some(ALICE.id));
            assert_eq!(integration_id, None);
        }
        other => panic!("expected MessageSent, got {other:?}"),
    }
}

#[tokio::test]
async fn test_duplicate_reaction_keeps_version() {
    let cluster = TestCluster::new();
    let ctx = cluster.service_context().unwrap();
    let service = ChannelService::new(&ctx);

    let channel = service.create_channel(ALICE.id, general()).await.unwrap();
    service.join_channel(channel.id(), BOB.id).await.unwrap();
    let message = service
        .post_message(channel.id(), ALICE.id, "hello", None)
        .await
        .unwrap();

    let reaction = service
        .add_reaction(channel.id(), message.id, BOB.id, "heart")
        .await
        .unwrap();
    assert_eq!(reaction.user_id, BOB.id);
    let stored = cluster.channels.find_by_id(channel.id()).await.unwrap().unwrap();
    assert_eq!(stored.version(), 4);

    let err = service
        .add_reaction(channel.id(), message.id, BOB.id, "heart")
        .await
        .unwrap_err();
    assert!(matches!(domain(err), DomainError::ReactionAlreadyExists));

    let stored = cluster.channels.find_by_id(channel.id()).await.unwrap().unwrap();
    assert_eq!(stored.version(), 4);
    assert_eq!(stored.message(message.id).unwrap().reactions.len(), 1);
    assert_eq!(
        cluster.events.names().last().copied(),
        Some("ReactionAdded")
    );
}

#[tokio::test]
async fn test_reply_to_message_of_another_channel() {
    let cluster = TestCluster::new();
    let ctx = cluster.service_context().unwrap();
    let service = ChannelService::new(&ctx);

    let home = service.create_channel(ALICE.id, general()).await.unwrap();
    let random = service
        .create_channel(
            ALICE.id,
            CreateChannelRequest {
                name: "random".to_string(),
                topic: None,
            },
        )
        .await
        .unwrap();
    let elsewhere = service
        .post_message(random.id(), ALICE.id, "over here", None)
        .await
        .unwrap();
    let events_before = cluster.events.events().len();

    let err = service
        .post_message(home.id(), ALICE.id, "reply", Some(elsewhere.id))
        .await
        .unwrap_err();
    assert!(matches!(domain(err), DomainError::ParentMessageNotFound(_)));

    let stored = cluster.channels.find_by_id(home.id()).await.unwrap().unwrap();
    assert_eq!(stored.version(), 1);
    assert!(stored.messages().is_empty());
    assert_eq!(cluster.events.events().len(), events_before);
}

#[tokio::test]
async fn test_concurrent_saves_one_wins() {
    let cluster = TestCluster::new();
    let ctx = cluster.service_context().unwrap();
    let service = ChannelService::new(&ctx);
    let channel = service.create_channel(ALICE.id, general()).await.unwrap();
    service.join_channel(channel.id(), BOB.id).await.unwrap();

    let repo = cluster.channels.clone();
    let mut first = repo.find_by_id(channel.id()).await.unwrap().unwrap();
    let mut second = repo.find_by_id(channel.id()).await.unwrap().unwrap();
    let base = first.version();

    let ids = ctx.snowflake_generator();
    first
        .post_message(ids, ALICE.id, MessageContent::from_text("first").unwrap(), None)
        .unwrap();
    second
        .post_message(ids, BOB.id, MessageContent::from_text("second").unwrap(), None)
        .unwrap();

    let (a, b) = tokio::join!(repo.save(&first), repo.save(&second));
    let outcomes = [a, b];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    let loser = outcomes.into_iter().find_map(Result::err).unwrap();
    assert!(matches!(loser, DomainError::VersionConflict { .. }));

    let stored = repo.find_by_id(channel.id()).await.unwrap().unwrap();
    assert_eq!(stored.version(), base + 1);
    assert_eq!(stored.messages().len(), 1);
}

#[tokio::test]
async fn test_concurrent_posts_never_lose_a_message_silently() {
    let cluster = TestCluster::new();
    let ctx = cluster.service_context().unwrap();
    let service = ChannelService::new(&ctx);
    let channel = service.create_channel(ALICE.id, general()).await.unwrap();
    service.join_channel(channel.id(), BOB.id).await.unwrap();

    let (a, b) = tokio::join!(
        service.post_message(channel.id(), ALICE.id, "from alice", None),
        service.post_message(channel.id(), BOB.id, "from bob", None),
    );

    // Either both landed in turn or the loser was told about the conflict
    let succeeded = [&a, &b].iter().filter(|r| r.is_ok()).count();
    for result in [a, b] {
        if let Err(err) = result {
            assert!(matches!(domain(err), DomainError::VersionConflict { .. }));
        }
    }

    let stored = cluster.channels.find_by_id(channel.id()).await.unwrap().unwrap();
    assert_eq!(stored.messages().len(), succeeded);
    assert_eq!(stored.version(), 2 + succeeded as i64);
}
