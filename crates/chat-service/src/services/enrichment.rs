//! Identity enrichment for outbound payloads
//!
//! Lookups run under the context timeout. A failed or slow lookup degrades
//! the payload to ids only and logs a warning; it never fails the command
//! that produced the payload.

use std::collections::HashMap;

use chat_core::{Message, MessageAuthor, Reaction, Snowflake};
use tracing::warn;

use crate::dto::{
    IntegrationSummary, MembershipEventResponse, MessageResponse, ReactionEventResponse, UserSummary,
};

use super::context::ServiceContext;

pub struct Enricher<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> Enricher<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Display data for one user, `None` on lookup failure
    pub async fn user(&self, user_id: Snowflake) -> Option<UserSummary> {
        match self
            .ctx
            .call("identity", self.ctx.identity().get_user_by_id(user_id))
            .await
        {
            Ok(profile) => Some(UserSummary::from(&profile)),
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "identity lookup failed, sending ids only");
                None
            }
        }
    }

    async fn integration(&self, integration_id: Snowflake) -> Option<IntegrationSummary> {
        match self
            .ctx
            .call("integrations", self.ctx.integrations().get_integration(integration_id))
            .await
        {
            Ok(integration) => Some(IntegrationSummary::from(&integration)),
            Err(e) => {
                warn!(
                    integration_id = %integration_id,
                    error = %e,
                    "integration lookup failed, sending ids only"
                );
                None
            }
        }
    }

    /// A message with its author attached
    pub async fn message(&self, message: &Message) -> MessageResponse {
        let mut response = MessageResponse::from(message);
        match message.author {
            MessageAuthor::User(id) => response.sender = self.user(id).await,
            MessageAuthor::Integration(id) => response.integration = self.integration(id).await,
        }
        response
    }

    /// A page of messages; authors are resolved with one batch lookup
    pub async fn messages(&self, messages: &[Message]) -> Vec<MessageResponse> {
        let mut sender_ids: Vec<Snowflake> = messages.iter().filter_map(Message::sender_id).collect();
        sender_ids.sort_unstable();
        sender_ids.dedup();

        let users: HashMap<Snowflake, UserSummary> = if sender_ids.is_empty() {
            HashMap::new()
        } else {
            match self
                .ctx
                .call("identity", self.ctx.identity().get_users(&sender_ids))
                .await
            {
                Ok(profiles) => profiles.iter().map(|p| (p.id, UserSummary::from(p))).collect(),
                Err(e) => {
                    warn!(count = sender_ids.len(), error = %e, "identity batch lookup failed, sending ids only");
                    HashMap::new()
                }
            }
        };

        let mut integrations: HashMap<Snowflake, Option<IntegrationSummary>> = HashMap::new();
        for id in messages.iter().filter_map(Message::integration_id) {
            if !integrations.contains_key(&id) {
                let summary = self.integration(id).await;
                integrations.insert(id, summary);
            }
        }

        messages
            .iter()
            .map(|message| {
                let mut response = MessageResponse::from(message);
                match message.author {
                    MessageAuthor::User(id) => response.sender = users.get(&id).cloned(),
                    MessageAuthor::Integration(id) => {
                        response.integration = integrations.get(&id).cloned().flatten();
                    }
                }
                response
            })
            .collect()
    }

    /// Payload for `reaction_added` / `reaction_removed`
    pub async fn reaction(&self, channel_id: Snowflake, reaction: &Reaction) -> ReactionEventResponse {
        ReactionEventResponse {
            channel_id,
            message_id: reaction.message_id,
            user_id: reaction.user_id,
            reaction_type: reaction.reaction_type.clone(),
            user: self.user(reaction.user_id).await,
        }
    }

    /// Payload for `user_joined` / `user_left`
    pub async fn membership(&self, channel_id: Snowflake, user_id: Snowflake) -> MembershipEventResponse {
        MembershipEventResponse {
            channel_id,
            user_id,
            user: self.user(user_id).await,
        }
    }
}
