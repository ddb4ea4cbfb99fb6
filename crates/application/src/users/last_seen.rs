use chrono::Utc;
use pulse_core::entities::users;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use crate::AppError;

/// Stamp the user's `last_seen_at`. Called on connect and on authoritative
/// disconnect; an unknown user id is a silent no-op since presence must
/// keep working even when the user row is managed elsewhere.
pub struct UpdateLastSeenUseCase;

impl UpdateLastSeenUseCase {
    pub async fn execute(db: &DatabaseConnection, user_id: Uuid) -> Result<(), AppError> {
        let user = users::Entity::find_by_id(user_id).one(db).await?;

        if let Some(user) = user {
            let now = Utc::now();
            let mut active: users::ActiveModel = user.into();
            active.last_seen_at = Set(Some(now.into()));
            active.updated_at = Set(now.into());
            active.update(db).await?;
        }

        Ok(())
    }
}
