//! PostgreSQL implementation of InviteRepository

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;

use chat_core::entities::{AggregateRoot, ChannelInvite};
use chat_core::error::DomainError;
use chat_core::traits::{InviteRepository, RepoResult};
use chat_core::value_objects::Snowflake;

use crate::models::InviteModel;

use super::error::{map_db_error, map_unique_violation, version_conflict};

const INVITE_COLUMNS: &str =
    "id, channel_id, creator_id, code, expires_at, max_uses, uses, active, created_at, version";

/// PostgreSQL implementation of InviteRepository
#[derive(Clone)]
pub struct PgInviteRepository {
    pool: PgPool,
}

impl PgInviteRepository {
    /// Create a new PgInviteRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Version check and row write inside `tx`
pub(super) async fn write_invite(
    tx: &mut Transaction<'_, Postgres>,
    invite: &ChannelInvite,
) -> RepoResult<()> {
    let id = invite.id().into_inner();
    let version = invite.version();
    let conflict = || version_conflict(ChannelInvite::AGGREGATE_TYPE, invite.id(), version);

    let stored: Option<i64> =
        sqlx::query_scalar("SELECT version FROM channel_invites WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(map_db_error)?;

    match stored {
        None => {
            if version != 1 {
                return Err(conflict());
            }

            sqlx::query(
                r"
                INSERT INTO channel_invites (id, channel_id, creator_id, code, expires_at,
                                             max_uses, uses, active, created_at, version)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                ",
            )
            .bind(id)
            .bind(invite.channel_id().into_inner())
            .bind(invite.creator_id().into_inner())
            .bind(invite.code())
            .bind(invite.expires_at())
            .bind(invite.max_uses())
            .bind(invite.uses())
            .bind(invite.is_active())
            .bind(invite.created_at())
            .bind(version)
            .execute(&mut **tx)
            .await
            .map_err(|e| {
                map_unique_violation(e, |constraint| match constraint {
                    Some("channel_invites_code_key") => DomainError::InviteCodeExists,
                    _ => conflict(),
                })
            })?;
        }
        Some(current) if current == version - 1 => {
            let result = sqlx::query(
                r"
                UPDATE channel_invites
                SET uses = $3, active = $4, version = $5
                WHERE id = $1 AND version = $2
                ",
            )
            .bind(id)
            .bind(current)
            .bind(invite.uses())
            .bind(invite.is_active())
            .bind(version)
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

#[async_trait]
impl InviteRepository for PgInviteRepository {
    #[instrument(skip(self, invite), fields(invite_id = %invite.id(), version = invite.version()))]
    async fn save(&self, invite: &ChannelInvite) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;
        write_invite(&mut tx, invite).await?;
        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<ChannelInvite>> {
        let result = sqlx::query_as::<_, InviteModel>(&format!(
            "SELECT {INVITE_COLUMNS} FROM channel_invites WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(ChannelInvite::from))
    }

    #[instrument(skip(self))]
    async fn find_by_code(&self, code: &str) -> RepoResult<Option<ChannelInvite>> {
        let result = sqlx::query_as::<_, InviteModel>(&format!(
            "SELECT {INVITE_COLUMNS} FROM channel_invites WHERE code = $1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(ChannelInvite::from))
    }

    #[instrument(skip(self))]
    async fn find_by_channel(&self, channel_id: Snowflake) -> RepoResult<Vec<ChannelInvite>> {
        let results = sqlx::query_as::<_, InviteModel>(&format!(
            "SELECT {INVITE_COLUMNS} FROM channel_invites WHERE channel_id = $1 \
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(channel_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(ChannelInvite::from).collect())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        sqlx::query("DELETE FROM channel_invites WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(())
    }
}
