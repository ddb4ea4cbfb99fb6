use pulse_core::entities::messages;
use sea_orm::{DatabaseConnection, EntityTrait};
use uuid::Uuid;

use crate::AppError;

pub struct GetMessageUseCase;

impl GetMessageUseCase {
    pub async fn execute(
        db: &DatabaseConnection,
        message_id: Uuid,
    ) -> Result<messages::Model, AppError> {
        messages::Entity::find_by_id(message_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("message {}", message_id)))
    }
}
