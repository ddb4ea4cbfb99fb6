use pulse_core::entities::messages;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use super::dtos::MessageDto;
use crate::AppError;

/// Full history load for one conversation, ascending by creation time.
/// Creation time is the only ordering a conversation has; delivery order
/// between concurrent senders is deliberately unspecified.
pub struct ListConversationMessagesUseCase;

impl ListConversationMessagesUseCase {
    pub async fn execute(
        db: &DatabaseConnection,
        conversation_id: &str,
    ) -> Result<Vec<MessageDto>, AppError> {
        let messages = messages::Entity::find()
            .filter(messages::Column::ConversationId.eq(conversation_id))
            .order_by_asc(messages::Column::CreatedAt)
            .all(db)
            .await?;

        Ok(messages.into_iter().map(MessageDto::from).collect())
    }
}

/// Most recent message of a conversation, if any.
pub struct LatestMessageUseCase;

impl LatestMessageUseCase {
    pub async fn execute(
        db: &DatabaseConnection,
        conversation_id: &str,
    ) -> Result<Option<messages::Model>, AppError> {
        let latest = messages::Entity::find()
            .filter(messages::Column::ConversationId.eq(conversation_id))
            .order_by_desc(messages::Column::CreatedAt)
            .one(db)
            .await?;

        Ok(latest)
    }
}

/// Number of messages addressed to `recipient_id` in the conversation that
/// have not been marked read.
pub struct CountUnreadUseCase;

impl CountUnreadUseCase {
    pub async fn execute(
        db: &DatabaseConnection,
        conversation_id: &str,
        recipient_id: Uuid,
    ) -> Result<u64, AppError> {
        let count = messages::Entity::find()
            .filter(messages::Column::ConversationId.eq(conversation_id))
            .filter(messages::Column::ToUserId.eq(recipient_id))
            .filter(messages::Column::ReadAt.is_null())
            .count(db)
            .await?;

        Ok(count)
    }
}
