use chrono::Utc;
use pulse_core::entities::messages;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use crate::AppError;

// `delivered_at` and `read_at` are written at most once; repeating either
// call returns the stored record unchanged. Callers are responsible for
// checking that the requester is the recipient before invoking these.

pub struct MarkDeliveredUseCase;

impl MarkDeliveredUseCase {
    pub async fn execute(
        db: &DatabaseConnection,
        message_id: Uuid,
    ) -> Result<messages::Model, AppError> {
        let msg = messages::Entity::find_by_id(message_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("message {}", message_id)))?;

        if msg.delivered_at.is_some() {
            tracing::debug!(%message_id, "delivered_at already set, skipping write");
            return Ok(msg);
        }

        let mut active: messages::ActiveModel = msg.into();
        active.delivered_at = Set(Some(Utc::now().into()));
        Ok(active.update(db).await?)
    }
}

pub struct MarkReadUseCase;

impl MarkReadUseCase {
    pub async fn execute(
        db: &DatabaseConnection,
        message_id: Uuid,
    ) -> Result<messages::Model, AppError> {
        let msg = messages::Entity::find_by_id(message_id)
            .one(db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("message {}", message_id)))?;

        if msg.read_at.is_some() {
            tracing::debug!(%message_id, "read_at already set, skipping write");
            return Ok(msg);
        }

        let mut active: messages::ActiveModel = msg.into();
        active.read_at = Set(Some(Utc::now().into()));
        Ok(active.update(db).await?)
    }
}
