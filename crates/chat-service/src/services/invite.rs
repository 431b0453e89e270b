//! Invite service
//!
//! Invites are their own aggregate. Accepting one touches two aggregates,
//! written with a single `save_with_invite`: either the use is counted and
//! the user joined, or neither.

use chat_core::{AggregateRoot, Channel, ChannelInvite, DomainError, Snowflake};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::dto::CreateInviteRequest;

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Fresh codes tried before giving up on a collision
const MAX_CODE_ATTEMPTS: usize = 3;

/// Invite service
pub struct InviteService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> InviteService<'a> {
    /// Create a new InviteService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create an invite; any member may invite
    #[instrument(skip(self, request))]
    pub async fn create_invite(
        &self,
        channel_id: Snowflake,
        user_id: Snowflake,
        request: CreateInviteRequest,
    ) -> ServiceResult<ChannelInvite> {
        request.validate()?;
        let channel = self.load_channel(channel_id).await?;
        if !channel.is_member(user_id) {
            return Err(DomainError::NotChannelMember(user_id).into());
        }

        let mut attempt = 1;
        let mut invite = loop {
            let invite = ChannelInvite::new(
                self.ctx.snowflake_generator(),
                channel_id,
                user_id,
                request.max_uses(),
                request.ttl(),
            )?;

            match self.ctx.invite_repo().save(&invite).await {
                Ok(()) => break invite,
                Err(DomainError::InviteCodeExists) if attempt < MAX_CODE_ATTEMPTS => {
                    warn!(attempt, "invite code collision, retrying");
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        };

        self.ctx.publish_events(invite.take_events()).await;
        info!(invite_id = %invite.id(), code = invite.code(), "Invite created");
        Ok(invite)
    }

    /// Invites of a channel, newest first; members only
    #[instrument(skip(self))]
    pub async fn list_invites(
        &self,
        channel_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<Vec<ChannelInvite>> {
        let channel = self.load_channel(channel_id).await?;
        if !channel.is_member(user_id) {
            return Err(DomainError::NotChannelMember(user_id).into());
        }
        Ok(self.ctx.invite_repo().find_by_channel(channel_id).await?)
    }

    /// Accept an invite and join its channel
    #[instrument(skip(self))]
    pub async fn accept_invite(&self, code: &str, user_id: Snowflake) -> ServiceResult<Channel> {
        let mut invite = self.load_invite(code).await?;
        let mut channel = self.load_channel(invite.channel_id()).await?;

        // Checked up front so members do not burn a use
        if channel.is_member(user_id) {
            return Err(DomainError::AlreadyMember.into());
        }

        invite.use_invite(user_id)?;
        channel.add_member(user_id)?;
        self.ctx
            .channel_repo()
            .save_with_invite(&channel, &invite)
            .await?;

        let mut events = invite.take_events();
        events.extend(channel.take_events());
        self.ctx.publish_events(events).await;

        info!(
            channel_id = %channel.id(),
            user_id = %user_id,
            uses = invite.uses(),
            "Invite accepted"
        );
        Ok(channel)
    }

    /// Deactivate an invite; `false` when it already was inactive
    #[instrument(skip(self))]
    pub async fn deactivate_invite(&self, code: &str, user_id: Snowflake) -> ServiceResult<bool> {
        let mut invite = self.load_invite(code).await?;
        let channel = self.load_channel(invite.channel_id()).await?;

        let changed = invite.deactivate(user_id, channel.creator_id())?;
        if changed {
            self.ctx.invite_repo().save(&invite).await?;
            self.ctx.publish_events(invite.take_events()).await;
        }
        Ok(changed)
    }

    async fn load_invite(&self, code: &str) -> ServiceResult<ChannelInvite> {
        self.ctx
            .invite_repo()
            .find_by_code(code)
            .await?
            .ok_or_else(|| DomainError::InviteNotFound(code.to_string()).into())
    }

    async fn load_channel(&self, channel_id: Snowflake) -> ServiceResult<Channel> {
        self.ctx
            .channel_repo()
            .find_by_id(channel_id)
            .await?
            .ok_or_else(|| DomainError::ChannelNotFound(channel_id).into())
    }
}
