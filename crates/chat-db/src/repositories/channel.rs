//! PostgreSQL implementation of ChannelRepository

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, instrument};

use chat_core::entities::{AggregateRoot, Channel, ChannelInvite, Message, Reaction};
use chat_core::traits::{ChannelRepository, RepoResult};
use chat_core::value_objects::Snowflake;

use crate::mappers::{channel_from_rows, ChannelRow, MessageInsert};
use crate::models::{ChannelMemberModel, ChannelModel, MessageModel, ReactionModel};

use super::error::{map_db_error, map_unique_violation, version_conflict};
use super::invite::write_invite;

/// PostgreSQL implementation of ChannelRepository
///
/// A channel is stored across `channels`, `channel_members`, `messages` and
/// `reactions`; `save` rewrites the children in the same transaction as the
/// version check.
#[derive(Clone)]
pub struct PgChannelRepository {
    pool: PgPool,
}

impl PgChannelRepository {
    /// Create a new PgChannelRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load(&self, model: ChannelModel) -> RepoResult<Channel> {
        let members = sqlx::query_as::<_, ChannelMemberModel>(
            r"
            SELECT channel_id, user_id, role, joined_at, last_read
            FROM channel_members
            WHERE channel_id = $1
            ORDER BY joined_at, user_id
            ",
        )
        .bind(model.id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        let messages = sqlx::query_as::<_, MessageModel>(
            r"
            SELECT id, channel_id, sender_user_id, integration_id, content, mentions, links,
                   formatted, parent_id, created_at
            FROM messages
            WHERE channel_id = $1
            ORDER BY id
            ",
        )
        .bind(model.id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?
        .into_iter()
        .map(Message::try_from)
        .collect::<Result<Vec<_>, _>>()?;

        let reaction_rows = sqlx::query_as::<_, ReactionModel>(
            r"
            SELECT id, channel_id, message_id, user_id, reaction_type, created_at
            FROM reactions
            WHERE channel_id = $1
            ORDER BY created_at, id
            ",
        )
        .bind(model.id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        let mut reactions: HashMap<Snowflake, Vec<Reaction>> = HashMap::new();
        for row in reaction_rows {
            let reaction = Reaction::from(row);
            reactions.entry(reaction.message_id).or_default().push(reaction);
        }

        Ok(channel_from_rows(model, members, messages, reactions))
    }

    async fn write_channel(
        tx: &mut Transaction<'_, Postgres>,
        channel: &Channel,
    ) -> RepoResult<()> {
        Self::write_root(tx, channel).await?;
        Self::write_members(tx, channel).await?;
        Self::write_messages(tx, channel).await?;
        Self::write_reactions(tx, channel).await
    }

    /// Version check and channel row write
    async fn write_root(
        tx: &mut Transaction<'_, Postgres>,
        channel: &Channel,
    ) -> RepoResult<()> {
        let row = ChannelRow::new(channel);
        let conflict = || version_conflict(Channel::AGGREGATE_TYPE, channel.id(), row.version);

        let stored: Option<i64> =
            sqlx::query_scalar("SELECT version FROM channels WHERE id = $1 FOR UPDATE")
                .bind(row.id)
                .fetch_optional(&mut **tx)
                .await
                .map_err(map_db_error)?;

        match stored {
            None => {
                if row.version != 1 {
                    return Err(conflict());
                }

                sqlx::query(
                    r"
                    INSERT INTO channels (id, name, topic, creator_id, created_at,
                                          last_message_at, archived, version)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                    ",
                )
                .bind(row.id)
                .bind(row.name)
                .bind(row.topic)
                .bind(row.creator_id)
                .bind(channel.created_at())
                .bind(channel.last_message_at())
                .bind(row.archived)
                .bind(row.version)
                .execute(&mut **tx)
                .await
                // A concurrent first save of the same id
                .map_err(|e| map_unique_violation(e, |_| conflict()))?;
            }
            Some(current) if current == row.version - 1 => {
                let result = sqlx::query(
                    r"
                    UPDATE channels
                    SET name = $3, topic = $4, last_message_at = $5, archived = $6, version = $7
                    WHERE id = $1 AND version = $2
                    ",
                )
                .bind(row.id)
                .bind(current)
                .bind(row.name)
                .bind(row.topic)
                .bind(channel.last_message_at())
                .bind(row.archived)
                .bind(row.version)
                .execute(&mut **tx)
                .await
                .map_err(map_db_error)?;

                if result.rows_affected() != 1 {
                    return Err(conflict());
                }
            }
            Some(_) => return Err(conflict()),
        }

        Ok(())
    }

    async fn write_members(
        tx: &mut Transaction<'_, Postgres>,
        channel: &Channel,
    ) -> RepoResult<()> {
        let channel_id = channel.id().into_inner();
        let user_ids: Vec<i64> = channel
            .members()
            .iter()
            .map(|m| m.user_id.into_inner())
            .collect();

        sqlx::query("DELETE FROM channel_members WHERE channel_id = $1 AND NOT (user_id = ANY($2))")
            .bind(channel_id)
            .bind(&user_ids)
            .execute(&mut **tx)
            .await
            .map_err(map_db_error)?;

        for member in channel.members() {
            sqlx::query(
                r"
                INSERT INTO channel_members (channel_id, user_id, role, joined_at, last_read)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (channel_id, user_id)
                DO UPDATE SET role = EXCLUDED.role, last_read = EXCLUDED.last_read
                ",
            )
            .bind(channel_id)
            .bind(member.user_id.into_inner())
            .bind(member.role.as_str())
            .bind(member.joined_at)
            .bind(member.last_read)
            .execute(&mut **tx)
            .await
            .map_err(map_db_error)?;
        }

        Ok(())
    }

    /// Messages are append-only; only ids not yet stored are inserted
    async fn write_messages(
        tx: &mut Transaction<'_, Postgres>,
        channel: &Channel,
    ) -> RepoResult<()> {
        let channel_id = channel.id().into_inner();

        let stored: HashSet<i64> =
            sqlx::query_scalar::<_, i64>("SELECT id FROM messages WHERE channel_id = $1")
                .bind(channel_id)
                .fetch_all(&mut **tx)
                .await
                .map_err(map_db_error)?
                .into_iter()
                .collect();

        for message in channel.messages() {
            if stored.contains(&message.id.into_inner()) {
                continue;
            }

            let insert = MessageInsert::new(message);
            sqlx::query(
                r"
                INSERT INTO messages (id, channel_id, sender_user_id, integration_id, content,
                                      mentions, links, formatted, parent_id, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                ",
            )
            .bind(insert.id)
            .bind(insert.channel_id)
            .bind(insert.sender_user_id)
            .bind(insert.integration_id)
            .bind(insert.content)
            .bind(&insert.mentions)
            .bind(insert.links)
            .bind(insert.formatted)
            .bind(insert.parent_id)
            .bind(message.created_at)
            .execute(&mut **tx)
            .await
            .map_err(map_db_error)?;
        }

        Ok(())
    }

    async fn write_reactions(
        tx: &mut Transaction<'_, Postgres>,
        channel: &Channel,
    ) -> RepoResult<()> {
        let channel_id = channel.id().into_inner();
        let current: Vec<&Reaction> = channel
            .messages()
            .iter()
            .flat_map(|m| m.reactions.iter())
            .collect();
        let current_ids: Vec<i64> = current.iter().map(|r| r.id.into_inner()).collect();

        sqlx::query("DELETE FROM reactions WHERE channel_id = $1 AND NOT (id = ANY($2))")
            .bind(channel_id)
            .bind(&current_ids)
            .execute(&mut **tx)
            .await
            .map_err(map_db_error)?;

        for reaction in current {
            sqlx::query(
                r"
                INSERT INTO reactions (id, channel_id, message_id, user_id, reaction_type, created_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (id) DO NOTHING
                ",
            )
            .bind(reaction.id.into_inner())
            .bind(channel_id)
            .bind(reaction.message_id.into_inner())
            .bind(reaction.user_id.into_inner())
            .bind(&reaction.reaction_type)
            .bind(reaction.created_at)
            .execute(&mut **tx)
            .await
            .map_err(map_db_error)?;
        }

        Ok(())
    }
}

#[async_trait]
impl ChannelRepository for PgChannelRepository {
    #[instrument(skip(self, channel), fields(channel_id = %channel.id(), version = channel.version()))]
    async fn save(&self, channel: &Channel) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        Self::write_channel(&mut tx, channel).await?;

        tx.commit().await.map_err(map_db_error)?;
        debug!("channel saved");
        Ok(())
    }

    #[instrument(
        skip(self, channel, invite),
        fields(channel_id = %channel.id(), invite_id = %invite.id())
    )]
    async fn save_with_invite(&self, channel: &Channel, invite: &ChannelInvite) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        write_invite(&mut tx, invite).await?;
        Self::write_channel(&mut tx, channel).await?;

        tx.commit().await.map_err(map_db_error)?;
        debug!("channel and invite saved");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Channel>> {
        let model = sqlx::query_as::<_, ChannelModel>(
            r"
            SELECT id, name, topic, creator_id, created_at, last_message_at, archived, version
            FROM channels
            WHERE id = $1
            ",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        match model {
            Some(model) => Ok(Some(self.load(model).await?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    async fn find_by_member(&self, user_id: Snowflake) -> RepoResult<Vec<Channel>> {
        let models = sqlx::query_as::<_, ChannelModel>(
            r"
            SELECT c.id, c.name, c.topic, c.creator_id, c.created_at, c.last_message_at,
                   c.archived, c.version
            FROM channels c
            JOIN channel_members m ON m.channel_id = c.id
            WHERE m.user_id = $1
            ORDER BY c.created_at, c.id
            ",
        )
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        let mut channels = Vec::with_capacity(models.len());
        for model in models {
            channels.push(self.load(model).await?);
        }
        Ok(channels)
    }

    #[instrument(skip(self))]
    async fn channel_ids_for_member(&self, user_id: Snowflake) -> RepoResult<Vec<Snowflake>> {
        let ids: Vec<i64> =
            sqlx::query_scalar("SELECT channel_id FROM channel_members WHERE user_id = $1")
                .bind(user_id.into_inner())
                .fetch_all(&self.pool)
                .await
                .map_err(map_db_error)?;

        Ok(ids.into_iter().map(Snowflake::new).collect())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        // Children go with the row (ON DELETE CASCADE)
        sqlx::query("DELETE FROM channels WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(())
    }
}
