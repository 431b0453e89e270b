//! Channel aggregate - members, messages and reactions of one channel
//!
//! The channel is the consistency boundary for everything posted in it.
//! Every successful mutation bumps `version` by exactly one and buffers a
//! [`DomainEvent`] stamped with the new version. Failed calls leave the
//! channel untouched.

use chrono::{DateTime, Utc};

use super::{AggregateRoot, Member, MemberRole, Message, MessageAuthor, Reaction};
use crate::error::DomainError;
use crate::events::{AggregateType, DomainEvent, EventPayload};
use crate::value_objects::{MessageContent, Snowflake, SnowflakeGenerator};

/// Channel aggregate
#[derive(Debug, Clone)]
pub struct Channel {
    id: Snowflake,
    name: String,
    topic: String,
    creator_id: Snowflake,
    created_at: DateTime<Utc>,
    members: Vec<Member>,
    messages: Vec<Message>,
    last_message_at: Option<DateTime<Utc>>,
    archived: bool,
    version: i64,
    events: Vec<DomainEvent>,
}

/// Stored state of a channel, used to rebuild the aggregate
#[derive(Debug, Clone)]
pub struct ChannelParts {
    pub id: Snowflake,
    pub name: String,
    pub topic: String,
    pub creator_id: Snowflake,
    pub created_at: DateTime<Utc>,
    pub members: Vec<Member>,
    pub messages: Vec<Message>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub archived: bool,
    pub version: i64,
}

impl Channel {
    pub const MAX_NAME_LENGTH: usize = 100;
    pub const MAX_TOPIC_LENGTH: usize = 1024;
    pub const MAX_REACTION_TYPE_LENGTH: usize = 64;

    /// Create a channel with `creator_id` joined as owner
    pub fn new(
        ids: &SnowflakeGenerator,
        name: &str,
        creator_id: Snowflake,
    ) -> Result<Self, DomainError> {
        Self::with_topic(ids, name, creator_id, "")
    }

    /// Create a channel with an initial topic
    ///
    /// Still a single change: the channel starts at version 1 with one
    /// `ChannelCreated` event carrying the topic.
    pub fn with_topic(
        ids: &SnowflakeGenerator,
        name: &str,
        creator_id: Snowflake,
        topic: &str,
    ) -> Result<Self, DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::EmptyChannelName);
        }
        if name.chars().count() > Self::MAX_NAME_LENGTH {
            return Err(DomainError::ValidationError(format!(
                "channel name must be at most {} characters",
                Self::MAX_NAME_LENGTH
            )));
        }

        let topic = Self::checked_topic(topic)?;

        let owner = Member::new(creator_id, MemberRole::Owner);
        let mut channel = Self {
            id: ids.generate(),
            name: name.to_string(),
            topic: topic.to_string(),
            creator_id,
            created_at: owner.joined_at,
            members: vec![owner],
            messages: Vec::new(),
            last_message_at: None,
            archived: false,
            version: 0,
            events: Vec::new(),
        };
        channel.record(EventPayload::ChannelCreated {
            name: channel.name.clone(),
            topic: channel.topic.clone(),
            creator_id,
        });
        Ok(channel)
    }

    /// Rebuild a channel from storage; no events are buffered
    pub fn from_parts(parts: ChannelParts) -> Self {
        Self {
            id: parts.id,
            name: parts.name,
            topic: parts.topic,
            creator_id: parts.creator_id,
            created_at: parts.created_at,
            members: parts.members,
            messages: parts.messages,
            last_message_at: parts.last_message_at,
            archived: parts.archived,
            version: parts.version,
            events: Vec::new(),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn creator_id(&self) -> Snowflake {
        self.creator_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last_message_at(&self) -> Option<DateTime<Utc>> {
        self.last_message_at
    }

    #[inline]
    pub fn is_archived(&self) -> bool {
        self.archived
    }

    pub fn member(&self, user_id: Snowflake) -> Option<&Member> {
        self.members.iter().find(|m| m.user_id == user_id)
    }

    #[inline]
    pub fn is_member(&self, user_id: Snowflake) -> bool {
        self.member(user_id).is_some()
    }

    #[inline]
    pub fn is_creator(&self, user_id: Snowflake) -> bool {
        self.creator_id == user_id
    }

    pub fn message(&self, message_id: Snowflake) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == message_id)
    }

    /// Up to `limit` messages with an id below `before`, in id order
    ///
    /// Insertion order can differ from id order when several workers post
    /// to one channel, so the page is sorted here.
    pub fn messages_before(&self, before: Option<Snowflake>, limit: usize) -> Vec<&Message> {
        let mut page: Vec<&Message> = self
            .messages
            .iter()
            .filter(|m| before.map_or(true, |cursor| m.id < cursor))
            .collect();
        page.sort_unstable_by_key(|m| m.id);
        let start = page.len().saturating_sub(limit);
        page.split_off(start)
    }

    /// Archived channels still accept posts and reactions; only membership
    /// matters here.
    #[inline]
    pub fn can_user_post_message(&self, user_id: Snowflake) -> bool {
        self.is_member(user_id)
    }

    // =========================================================================
    // Membership
    // =========================================================================

    /// Join as a regular member
    pub fn add_member(&mut self, user_id: Snowflake) -> Result<(), DomainError> {
        if self.is_member(user_id) {
            return Err(DomainError::AlreadyMember);
        }

        self.members.push(Member::new(user_id, MemberRole::Member));
        self.record(EventPayload::UserJoinedChannel { user_id });
        Ok(())
    }

    /// Leave the channel; the creator has to stay
    pub fn leave(&mut self, user_id: Snowflake) -> Result<(), DomainError> {
        let index = self
            .members
            .iter()
            .position(|m| m.user_id == user_id)
            .ok_or(DomainError::MemberNotFound(user_id))?;
        if self.is_creator(user_id) {
            return Err(DomainError::CannotLeaveOwnedChannel);
        }

        self.members.remove(index);
        self.record(EventPayload::UserLeftChannel { user_id });
        Ok(())
    }

    /// Move the member's read marker to `at`
    pub fn mark_read(&mut self, user_id: Snowflake, at: DateTime<Utc>) -> Result<(), DomainError> {
        let member = self
            .members
            .iter_mut()
            .find(|m| m.user_id == user_id)
            .ok_or(DomainError::MemberNotFound(user_id))?;

        if member.mark_read(at) {
            self.version += 1;
        }
        Ok(())
    }

    // =========================================================================
    // Creator-only settings
    // =========================================================================

    pub fn set_topic(&mut self, user_id: Snowflake, topic: &str) -> Result<(), DomainError> {
        self.ensure_creator(user_id)?;
        let topic = Self::checked_topic(topic)?;

        self.topic = topic.to_string();
        self.record(EventPayload::ChannelTopicChanged {
            changed_by: user_id,
            topic: self.topic.clone(),
        });
        Ok(())
    }

    /// Archive the channel. Returns `false` when it already was archived.
    pub fn archive(&mut self, user_id: Snowflake) -> Result<bool, DomainError> {
        self.ensure_creator(user_id)?;
        if self.archived {
            return Ok(false);
        }

        self.archived = true;
        self.record(EventPayload::ChannelArchived {
            archived_by: user_id,
        });
        Ok(true)
    }

    /// Unarchive the channel. Returns `false` when it was not archived.
    pub fn unarchive(&mut self, user_id: Snowflake) -> Result<bool, DomainError> {
        self.ensure_creator(user_id)?;
        if !self.archived {
            return Ok(false);
        }

        self.archived = false;
        self.record(EventPayload::ChannelUnarchived {
            unarchived_by: user_id,
        });
        Ok(true)
    }

    // =========================================================================
    // Messages
    // =========================================================================

    /// Post a message as a member, optionally replying to `parent_id`
    pub fn post_message(
        &mut self,
        ids: &SnowflakeGenerator,
        sender_id: Snowflake,
        content: MessageContent,
        parent_id: Option<Snowflake>,
    ) -> Result<Message, DomainError> {
        if !self.can_user_post_message(sender_id) {
            return Err(DomainError::NotChannelMember(sender_id));
        }
        self.append_message(ids, MessageAuthor::User(sender_id), content, parent_id)
    }

    /// Post a message on behalf of an integration; membership is not required
    pub fn post_notification(
        &mut self,
        ids: &SnowflakeGenerator,
        integration_id: Snowflake,
        content: MessageContent,
    ) -> Result<Message, DomainError> {
        self.append_message(ids, MessageAuthor::Integration(integration_id), content, None)
    }

    fn append_message(
        &mut self,
        ids: &SnowflakeGenerator,
        author: MessageAuthor,
        content: MessageContent,
        parent_id: Option<Snowflake>,
    ) -> Result<Message, DomainError> {
        if let Some(parent) = parent_id {
            if self.message(parent).is_none() {
                return Err(DomainError::ParentMessageNotFound(parent));
            }
        }

        let message = Message::new(ids.generate(), self.id, author, content, parent_id);
        self.last_message_at = Some(message.created_at);
        self.messages.push(message.clone());
        self.record(EventPayload::MessageSent {
            message_id: message.id,
            sender_user_id: message.sender_id(),
            integration_id: message.integration_id(),
            content: message.content.text().to_string(),
            parent_message_id: message.parent_id,
            mentions: message.content.mentions().to_vec(),
            links: message.content.links().to_vec(),
        });
        Ok(message)
    }

    // =========================================================================
    // Reactions
    // =========================================================================

    pub fn add_reaction(
        &mut self,
        ids: &SnowflakeGenerator,
        message_id: Snowflake,
        user_id: Snowflake,
        reaction_type: &str,
    ) -> Result<Reaction, DomainError> {
        let reaction_type = reaction_type.trim();
        if reaction_type.is_empty() || reaction_type.chars().count() > Self::MAX_REACTION_TYPE_LENGTH
        {
            return Err(DomainError::ValidationError(format!(
                "reaction type must be 1 to {} characters",
                Self::MAX_REACTION_TYPE_LENGTH
            )));
        }
        if !self.is_member(user_id) {
            return Err(DomainError::NotChannelMember(user_id));
        }
        let message = self
            .messages
            .iter_mut()
            .find(|m| m.id == message_id)
            .ok_or(DomainError::MessageNotFound(message_id))?;
        if message.find_reaction(user_id, reaction_type).is_some() {
            return Err(DomainError::ReactionAlreadyExists);
        }

        let reaction = Reaction::new(ids.generate(), message_id, user_id, reaction_type);
        message.reactions.push(reaction.clone());
        self.record(EventPayload::ReactionAdded {
            message_id,
            reaction_id: reaction.id,
            user_id,
            reaction_type: reaction.reaction_type.clone(),
        });
        Ok(reaction)
    }

    /// Remove a reaction; order of the remaining reactions is not kept
    pub fn remove_reaction(
        &mut self,
        message_id: Snowflake,
        user_id: Snowflake,
        reaction_type: &str,
    ) -> Result<Reaction, DomainError> {
        let reaction_type = reaction_type.trim();
        let message = self
            .messages
            .iter_mut()
            .find(|m| m.id == message_id)
            .ok_or(DomainError::MessageNotFound(message_id))?;
        let index = message.find_reaction(user_id, reaction_type).ok_or_else(|| {
            DomainError::ReactionNotFound {
                message_id,
                user_id,
                reaction_type: reaction_type.to_string(),
            }
        })?;

        let removed = message.reactions.swap_remove(index);
        self.record(EventPayload::ReactionRemoved {
            message_id,
            user_id,
            reaction_type: removed.reaction_type.clone(),
        });
        Ok(removed)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn checked_topic(topic: &str) -> Result<&str, DomainError> {
        let topic = topic.trim();
        if topic.chars().count() > Self::MAX_TOPIC_LENGTH {
            return Err(DomainError::ValidationError(format!(
                "topic must be at most {} characters",
                Self::MAX_TOPIC_LENGTH
            )));
        }
        Ok(topic)
    }

    fn ensure_creator(&self, user_id: Snowflake) -> Result<(), DomainError> {
        if self.is_creator(user_id) {
            Ok(())
        } else {
            Err(DomainError::NotChannelCreator)
        }
    }

    fn record(&mut self, payload: EventPayload) {
        self.version += 1;
        self.events.push(DomainEvent::new(
            Self::AGGREGATE_TYPE,
            self.id,
            self.version,
            payload,
        ));
    }
}

impl AggregateRoot for Channel {
    const AGGREGATE_TYPE: AggregateType = AggregateType::Channel;

    fn id(&self) -> Snowflake {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn pending_events(&self) -> &[DomainEvent] {
        &self.events
    }

    fn take_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }
}
