use chrono::Utc;
use pulse_core::conversation::conversation_key;
use pulse_core::entities::messages;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use uuid::Uuid;

use crate::AppError;

/// Persist a new message. The conversation id is always recomputed from
/// the participant pair; `delivered_at`/`read_at` start unset and are only
/// ever stamped by the recipient's connection.
pub struct CreateMessageUseCase;

impl CreateMessageUseCase {
    pub async fn execute(
        db: &DatabaseConnection,
        from_user_id: Uuid,
        to_user_id: Uuid,
        text: String,
    ) -> Result<messages::Model, AppError> {
        let new_msg = messages::ActiveModel {
            message_id: Set(Uuid::new_v4()),
            conversation_id: Set(conversation_key(from_user_id, to_user_id)),
            from_user_id: Set(from_user_id),
            to_user_id: Set(to_user_id),
            text: Set(text),
            created_at: Set(Utc::now().into()),
            delivered_at: Set(None),
            read_at: Set(None),
            edited: Set(false),
            deleted_for_all: Set(false),
        };

        let inserted = new_msg.insert(db).await?;
        Ok(inserted)
    }
}
