//! Invite aggregate <-> model mapper

use chat_core::entities::{ChannelInvite, InviteParts};
use chat_core::value_objects::Snowflake;

use crate::models::InviteModel;

/// Convert InviteModel to ChannelInvite aggregate
impl From<InviteModel> for ChannelInvite {
    fn from(model: InviteModel) -> Self {
        ChannelInvite::from_parts(InviteParts {
            id: Snowflake::new(model.id),
            channel_id: Snowflake::new(model.channel_id),
            creator_id: Snowflake::new(model.creator_id),
            code: model.code,
            expires_at: model.expires_at,
            max_uses: model.max_uses,
            uses: model.uses,
            active: model.active,
            created_at: model.created_at,
            version: model.version,
        })
    }
}
