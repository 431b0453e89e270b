use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use chat_core::entities::{AggregateRoot, Channel, ChannelInvite};
use chat_core::traits::{ChannelRepository, RepoResult};
use chat_core::value_objects::Snowflake;

use super::{check_version, MemoryInviteRepository};

/// Channel storage in a map keyed by id
///
/// Holds the invite store it shares with `save_with_invite`, so that an
/// accepted invite and the new membership land together.
#[derive(Debug, Default)]
pub struct MemoryChannelRepository {
    channels: RwLock<HashMap<Snowflake, Channel>>,
    invites: Arc<MemoryInviteRepository>,
}

impl MemoryChannelRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_invites(invites: Arc<MemoryInviteRepository>) -> Self {
        Self {
            channels: RwLock::default(),
            invites,
        }
    }

    /// Invite store written by `save_with_invite`
    pub fn invites(&self) -> Arc<MemoryInviteRepository> {
        Arc::clone(&self.invites)
    }

    /// Number of stored channels
    pub fn len(&self) -> usize {
        self.channels.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.read().is_empty()
    }
}

#[async_trait]
impl ChannelRepository for MemoryChannelRepository {
    async fn save(&self, channel: &Channel) -> RepoResult<()> {
        let mut channels = self.channels.write();
        check_version(channels.get(&channel.id()), channel)?;

        let mut stored = channel.clone();
        stored.take_events();
        channels.insert(channel.id(), stored);
        Ok(())
    }

    async fn save_with_invite(&self, channel: &Channel, invite: &ChannelInvite) -> RepoResult<()> {
        let mut channels = self.channels.write();
        check_version(channels.get(&channel.id()), channel)?;
        self.invites.store(invite)?;

        let mut stored = channel.clone();
        stored.take_events();
        channels.insert(channel.id(), stored);
        Ok(())
    }

    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Channel>> {
        Ok(self.channels.read().get(&id).cloned())
    }

    async fn find_by_member(&self, user_id: Snowflake) -> RepoResult<Vec<Channel>> {
        let mut found: Vec<Channel> = self
            .channels
            .read()
            .values()
            .filter(|c| c.is_member(user_id))
            .cloned()
            .collect();
        found.sort_by_key(|c| (c.created_at(), c.id()));
        Ok(found)
    }

    async fn channel_ids_for_member(&self, user_id: Snowflake) -> RepoResult<Vec<Snowflake>> {
        Ok(self
            .channels
            .read()
            .values()
            .filter(|c| c.is_member(user_id))
            .map(AggregateRoot::id)
            .collect())
    }

    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        self.channels.write().remove(&id);
        Ok(())
    }
}
