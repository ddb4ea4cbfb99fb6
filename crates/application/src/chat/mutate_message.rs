use pulse_core::entities::messages;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use crate::AppError;

/// Placeholder text substituted for deleted-for-all message content.
pub const TOMBSTONE_TEXT: &str = "This message was deleted";

/// Replace a message's text. Refused once the message has been deleted for
/// all participants, so the policy holds for every caller of the gateway,
/// not just the event router.
pub struct EditMessageUseCase;

impl EditMessageUseCase {
    pub async fn execute(
        db: &DatabaseConnection,
        message_id: Uuid,
        new_text: String,
    ) -> Result<messages::Model, AppError> {
        let msg = messages::Entity::find_by_id(message_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("message {}", message_id)))?;

        if !msg.is_mutable() {
            return Err(AppError::Validation(
                "message was deleted for all participants".to_string(),
            ));
        }

        let mut active: messages::ActiveModel = msg.into();
        active.text = Set(new_text);
        active.edited = Set(true);
        Ok(active.update(db).await?)
    }
}

/// Tombstone a message for both participants. Idempotent; the original
/// text is gone for good.
pub struct DeleteForAllUseCase;

impl DeleteForAllUseCase {
    pub async fn execute(
        db: &DatabaseConnection,
        message_id: Uuid,
    ) -> Result<messages::Model, AppError> {
        let msg = messages::Entity::find_by_id(message_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("message {}", message_id)))?;

        if msg.deleted_for_all {
            return Ok(msg);
        }

        let mut active: messages::ActiveModel = msg.into();
        active.deleted_for_all = Set(true);
        active.text = Set(TOMBSTONE_TEXT.to_string());
        Ok(active.update(db).await?)
    }
}
