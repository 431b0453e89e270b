//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs.
//! Enrichment fields stay empty here; see `services::enrichment`.

use chat_core::traits::{Integration, UserProfile};
use chat_core::{AggregateRoot, Channel, ChannelInvite, Member, Message, Reaction};

use super::responses::{
    ChannelResponse, IntegrationSummary, InviteResponse, MemberResponse, MessageResponse,
    ReactionResponse, UserSummary,
};

// ============================================================================
// Channel Mappers
// ============================================================================

impl From<&Member> for MemberResponse {
    fn from(member: &Member) -> Self {
        Self {
            user_id: member.user_id,
            role: member.role,
            joined_at: member.joined_at,
            last_read: member.last_read,
        }
    }
}

impl From<&Channel> for ChannelResponse {
    fn from(channel: &Channel) -> Self {
        Self {
            id: channel.id(),
            name: channel.name().to_string(),
            topic: channel.topic().to_string(),
            creator_id: channel.creator_id(),
            created_at: channel.created_at(),
            last_message_at: channel.last_message_at(),
            archived: channel.is_archived(),
            version: channel.version(),
            members: channel.members().iter().map(MemberResponse::from).collect(),
        }
    }
}

// ============================================================================
// Message Mappers
// ============================================================================

impl From<&Reaction> for ReactionResponse {
    fn from(reaction: &Reaction) -> Self {
        Self {
            id: reaction.id,
            message_id: reaction.message_id,
            user_id: reaction.user_id,
            reaction_type: reaction.reaction_type.clone(),
            created_at: reaction.created_at,
        }
    }
}

impl From<&Message> for MessageResponse {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id,
            channel_id: message.channel_id,
            sender_user_id: message.sender_id(),
            integration_id: message.integration_id(),
            content: message.content.text().to_string(),
            mentions: message.content.mentions().to_vec(),
            links: message.content.links().to_vec(),
            formatted: message.content.is_formatted(),
            parent_message_id: message.parent_id,
            created_at: message.created_at,
            reactions: message.reactions.iter().map(ReactionResponse::from).collect(),
            sender: None,
            integration: None,
        }
    }
}

// ============================================================================
// Identity Mappers
// ============================================================================

impl From<&UserProfile> for UserSummary {
    fn from(profile: &UserProfile) -> Self {
        Self {
            id: profile.id,
            username: profile.username.clone(),
            display_name: profile.display_name(),
        }
    }
}

impl From<&Integration> for IntegrationSummary {
    fn from(integration: &Integration) -> Self {
        Self {
            id: integration.id,
            service_name: integration.service_name.clone(),
        }
    }
}

// ============================================================================
// Invite Mappers
// ============================================================================

impl From<&ChannelInvite> for InviteResponse {
    fn from(invite: &ChannelInvite) -> Self {
        Self {
            id: invite.id(),
            code: invite.code().to_string(),
            channel_id: invite.channel_id(),
            creator_id: invite.creator_id(),
            expires_at: invite.expires_at(),
            max_uses: invite.max_uses(),
            uses: invite.uses(),
            active: invite.is_active(),
            created_at: invite.created_at(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_core::{MessageContent, Snowflake, SnowflakeGenerator};

    #[test]
    fn test_channel_response() {
        let ids = SnowflakeGenerator::new(1);
        let channel = Channel::new(&ids, "general", Snowflake::new(7)).unwrap();

        let response = ChannelResponse::from(&channel);
        assert_eq!(response.name, "general");
        assert_eq!(response.version, 1);
        assert_eq!(response.members.len(), 1);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["creator_id"], "7");
        assert_eq!(json["members"][0]["role"], "owner");
        assert!(json.get("last_message_at").is_none());
    }

    #[test]
    fn test_message_response() {
        let ids = SnowflakeGenerator::new(1);
        let author = Snowflake::new(7);
        let mut channel = Channel::new(&ids, "general", author).unwrap();
        let message = channel
            .post_message(
                &ids,
                author,
                MessageContent::from_text("read https://example.com <@8>").unwrap(),
                None,
            )
            .unwrap();

        let json = serde_json::to_value(MessageResponse::from(&message)).unwrap();
        assert_eq!(json["sender_user_id"], "7");
        assert_eq!(json["links"][0], "https://example.com");
        assert_eq!(json["mentions"][0], "8");
        assert!(json.get("integration_id").is_none());
        assert!(json.get("sender").is_none());
    }
}
