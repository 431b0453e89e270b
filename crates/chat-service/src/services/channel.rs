//! Channel service
//!
//! Every command follows the same path: load the channel, let the aggregate
//! validate and mutate, save with the version check, then publish the
//! buffered events. A failed command never reaches `save`, so stored state
//! is untouched.

use chat_core::{AggregateRoot, Channel, DomainError, Message, MessageContent, Reaction, Snowflake};
use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};
use validator::Validate;

use crate::dto::CreateChannelRequest;

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Channel service
pub struct ChannelService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ChannelService<'a> {
    /// Create a new ChannelService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Get a channel the caller is a member of
    #[instrument(skip(self))]
    pub async fn get_channel(&self, channel_id: Snowflake, user_id: Snowflake) -> ServiceResult<Channel> {
        let channel = self.load(channel_id).await?;
        ensure_member(&channel, user_id)?;
        Ok(channel)
    }

    /// Channels the user belongs to, oldest first
    #[instrument(skip(self))]
    pub async fn list_channels(&self, user_id: Snowflake) -> ServiceResult<Vec<Channel>> {
        Ok(self.ctx.channel_repo().find_by_member(user_id).await?)
    }

    /// Ids of the channels the user belongs to
    #[instrument(skip(self))]
    pub async fn channel_ids_for_member(&self, user_id: Snowflake) -> ServiceResult<Vec<Snowflake>> {
        Ok(self.ctx.channel_repo().channel_ids_for_member(user_id).await?)
    }

    /// Fail unless `user_id` is a current member of the channel
    #[instrument(skip(self))]
    pub async fn require_member(&self, channel_id: Snowflake, user_id: Snowflake) -> ServiceResult<()> {
        let channel = self.load(channel_id).await?;
        ensure_member(&channel, user_id)
    }

    /// Up to `limit` messages older than `before`, oldest first, plus
    /// whether older messages remain
    #[instrument(skip(self))]
    pub async fn messages(
        &self,
        channel_id: Snowflake,
        user_id: Snowflake,
        before: Option<Snowflake>,
        limit: usize,
    ) -> ServiceResult<(Vec<Message>, bool)> {
        let channel = self.get_channel(channel_id, user_id).await?;

        let page = channel.messages_before(before, limit.saturating_add(1));
        let has_more = page.len() > limit;
        let skip = usize::from(has_more);
        Ok((page[skip..].iter().map(|m| (*m).clone()).collect(), has_more))
    }

    // =========================================================================
    // Channel lifecycle
    // =========================================================================

    /// Create a channel owned by `user_id`
    #[instrument(skip(self, request), fields(user_id = %user_id))]
    pub async fn create_channel(
        &self,
        user_id: Snowflake,
        request: CreateChannelRequest,
    ) -> ServiceResult<Channel> {
        request.validate()?;

        let mut channel = Channel::with_topic(
            self.ctx.snowflake_generator(),
            &request.name,
            user_id,
            request.topic.as_deref().unwrap_or_default(),
        )?;
        self.commit(&mut channel).await?;

        info!(channel_id = %channel.id(), name = channel.name(), "Channel created");
        Ok(channel)
    }

    #[instrument(skip(self))]
    pub async fn join_channel(&self, channel_id: Snowflake, user_id: Snowflake) -> ServiceResult<Channel> {
        let mut channel = self.load(channel_id).await?;
        channel.add_member(user_id)?;
        self.commit(&mut channel).await?;

        info!(channel_id = %channel_id, user_id = %user_id, "User joined channel");
        Ok(channel)
    }

    #[instrument(skip(self))]
    pub async fn leave_channel(&self, channel_id: Snowflake, user_id: Snowflake) -> ServiceResult<()> {
        let mut channel = self.load(channel_id).await?;
        channel.leave(user_id)?;
        self.commit(&mut channel).await?;

        info!(channel_id = %channel_id, user_id = %user_id, "User left channel");
        Ok(())
    }

    #[instrument(skip(self, topic))]
    pub async fn set_topic(
        &self,
        channel_id: Snowflake,
        user_id: Snowflake,
        topic: &str,
    ) -> ServiceResult<Channel> {
        let mut channel = self.load(channel_id).await?;
        channel.set_topic(user_id, topic)?;
        self.commit(&mut channel).await?;
        Ok(channel)
    }

    /// Archive the channel; `false` when it already was archived
    #[instrument(skip(self))]
    pub async fn archive_channel(&self, channel_id: Snowflake, user_id: Snowflake) -> ServiceResult<bool> {
        let mut channel = self.load(channel_id).await?;
        let changed = channel.archive(user_id)?;
        if changed {
            self.commit(&mut channel).await?;
            info!(channel_id = %channel_id, "Channel archived");
        }
        Ok(changed)
    }

    /// Unarchive the channel; `false` when it was not archived
    #[instrument(skip(self))]
    pub async fn unarchive_channel(&self, channel_id: Snowflake, user_id: Snowflake) -> ServiceResult<bool> {
        let mut channel = self.load(channel_id).await?;
        let changed = channel.unarchive(user_id)?;
        if changed {
            self.commit(&mut channel).await?;
            info!(channel_id = %channel_id, "Channel unarchived");
        }
        Ok(changed)
    }

    /// Move the caller's read marker to `at` (default now). Returns the
    /// marker after the call; markers never move backwards.
    #[instrument(skip(self))]
    pub async fn mark_read(
        &self,
        channel_id: Snowflake,
        user_id: Snowflake,
        at: Option<DateTime<Utc>>,
    ) -> ServiceResult<DateTime<Utc>> {
        let mut channel = self.load(channel_id).await?;
        let before = channel.version();
        channel.mark_read(user_id, at.unwrap_or_else(Utc::now))?;

        if channel.version() != before {
            self.commit(&mut channel).await?;
        }

        channel
            .member(user_id)
            .map(|m| m.last_read)
            .ok_or_else(|| DomainError::MemberNotFound(user_id).into())
    }

    // =========================================================================
    // Messages
    // =========================================================================

    /// Post a message, optionally replying to `parent_id`
    #[instrument(skip(self, content))]
    pub async fn post_message(
        &self,
        channel_id: Snowflake,
        sender_id: Snowflake,
        content: &str,
        parent_id: Option<Snowflake>,
    ) -> ServiceResult<Message> {
        let content = MessageContent::from_text(content)?;
        let mut channel = self.load(channel_id).await?;
        let message = channel.post_message(self.ctx.snowflake_generator(), sender_id, content, parent_id)?;
        self.commit(&mut channel).await?;

        debug!(message_id = %message.id, "Message posted");
        Ok(message)
    }

    /// Post on behalf of an integration. Unknown integrations are not found,
    /// revoked ones are refused.
    #[instrument(skip(self, content))]
    pub async fn post_notification(
        &self,
        channel_id: Snowflake,
        integration_id: Snowflake,
        content: &str,
    ) -> ServiceResult<Message> {
        let content = MessageContent::from_text(content)?;
        let integration = self
            .ctx
            .call("integrations", self.ctx.integrations().get_integration(integration_id))
            .await?;
        if integration.is_revoked {
            return Err(DomainError::IntegrationRevoked(integration_id).into());
        }

        let mut channel = self.load(channel_id).await?;
        let message = channel.post_notification(self.ctx.snowflake_generator(), integration_id, content)?;
        self.commit(&mut channel).await?;

        info!(
            message_id = %message.id,
            service = %integration.service_name,
            "Notification posted"
        );
        Ok(message)
    }

    // =========================================================================
    // Reactions
    // =========================================================================

    #[instrument(skip(self))]
    pub async fn add_reaction(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        user_id: Snowflake,
        reaction_type: &str,
    ) -> ServiceResult<Reaction> {
        let mut channel = self.load(channel_id).await?;
        let reaction =
            channel.add_reaction(self.ctx.snowflake_generator(), message_id, user_id, reaction_type)?;
        self.commit(&mut channel).await?;
        Ok(reaction)
    }

    #[instrument(skip(self))]
    pub async fn remove_reaction(
        &self,
        channel_id: Snowflake,
        message_id: Snowflake,
        user_id: Snowflake,
        reaction_type: &str,
    ) -> ServiceResult<Reaction> {
        let mut channel = self.load(channel_id).await?;
        let reaction = channel.remove_reaction(message_id, user_id, reaction_type)?;
        self.commit(&mut channel).await?;
        Ok(reaction)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn load(&self, channel_id: Snowflake) -> ServiceResult<Channel> {
        self.ctx
            .channel_repo()
            .find_by_id(channel_id)
            .await?
            .ok_or_else(|| DomainError::ChannelNotFound(channel_id).into())
    }

    /// Save, then publish whatever the aggregate buffered
    async fn commit(&self, channel: &mut Channel) -> ServiceResult<()> {
        self.ctx.channel_repo().save(channel).await?;
        let events = channel.take_events();
        self.ctx.publish_events(events).await;
        Ok(())
    }
}

fn ensure_member(channel: &Channel, user_id: Snowflake) -> ServiceResult<()> {
    if channel.is_member(user_id) {
        Ok(())
    } else {
        Err(DomainError::NotChannelMember(user_id).into())
    }
}
