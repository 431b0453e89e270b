use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use chat_core::entities::{AggregateRoot, ChannelInvite};
use chat_core::error::DomainError;
use chat_core::traits::{InviteRepository, RepoResult};
use chat_core::value_objects::Snowflake;

use super::check_version;

/// Invite storage with the same code uniqueness as the database
#[derive(Debug, Default)]
pub struct MemoryInviteRepository {
    invites: RwLock<HashMap<Snowflake, ChannelInvite>>,
}

impl MemoryInviteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Versioned write; nothing is stored on error
    pub(super) fn store(&self, invite: &ChannelInvite) -> RepoResult<()> {
        let mut invites = self.invites.write();
        let stored = invites.get(&invite.id());
        check_version(stored, invite)?;

        if stored.is_none() && invites.values().any(|i| i.code() == invite.code()) {
            return Err(DomainError::InviteCodeExists);
        }

        let mut copy = invite.clone();
        copy.take_events();
        invites.insert(invite.id(), copy);
        Ok(())
    }
}

#[async_trait]
impl InviteRepository for MemoryInviteRepository {
    async fn save(&self, invite: &ChannelInvite) -> RepoResult<()> {
        self.store(invite)
    }

    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<ChannelInvite>> {
        Ok(self.invites.read().get(&id).cloned())
    }

    async fn find_by_code(&self, code: &str) -> RepoResult<Option<ChannelInvite>> {
        Ok(self
            .invites
            .read()
            .values()
            .find(|i| i.code() == code)
            .cloned())
    }

    async fn find_by_channel(&self, channel_id: Snowflake) -> RepoResult<Vec<ChannelInvite>> {
        let mut found: Vec<ChannelInvite> = self
            .invites
            .read()
            .values()
            .filter(|i| i.channel_id() == channel_id)
            .cloned()
            .collect();
        found.sort_by_key(|i| std::cmp::Reverse((i.created_at(), i.id())));
        Ok(found)
    }

    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        self.invites.write().remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_core::SnowflakeGenerator;

    #[tokio::test]
    async fn test_invite_use_is_versioned() {
        let repo = MemoryInviteRepository::new();
        let ids = SnowflakeGenerator::new(1);
        let invite =
            ChannelInvite::new(&ids, Snowflake::new(10), Snowflake::new(1), Some(1), None).unwrap();
        repo.save(&invite).await.unwrap();

        let mut a = repo.find_by_code(invite.code()).await.unwrap().unwrap();
        let mut b = a.clone();
        a.use_invite(Snowflake::new(2)).unwrap();
        b.use_invite(Snowflake::new(3)).unwrap();

        repo.save(&a).await.unwrap();
        assert!(repo.save(&b).await.unwrap_err().is_retryable());

        let stored = repo.find_by_id(invite.id()).await.unwrap().unwrap();
        assert_eq!(stored.uses(), 1);
        assert!(!stored.is_active());
    }

    #[tokio::test]
    async fn test_find_by_channel() {
        let repo = MemoryInviteRepository::new();
        let ids = SnowflakeGenerator::new(1);
        for _ in 0..3 {
            let invite =
                ChannelInvite::new(&ids, Snowflake::new(10), Snowflake::new(1), None, None).unwrap();
            repo.save(&invite).await.unwrap();
        }

        assert_eq!(repo.find_by_channel(Snowflake::new(10)).await.unwrap().len(), 3);
        assert!(repo.find_by_channel(Snowflake::new(11)).await.unwrap().is_empty());
    }
}
