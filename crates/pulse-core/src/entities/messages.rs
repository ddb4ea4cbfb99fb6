use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "messages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub message_id: Uuid,
    #[sea_orm(indexed)]
    pub conversation_id: String,
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub text: String,
    pub created_at: DateTimeWithTimeZone,
    pub delivered_at: Option<DateTimeWithTimeZone>,
    pub read_at: Option<DateTimeWithTimeZone>,
    pub edited: bool,
    pub deleted_for_all: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::FromUserId",
        to = "super::users::Column::UserId"
    )]
    Sender,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::ToUserId",
        to = "super::users::Column::UserId"
    )]
    Recipient,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sender.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Only the sender may edit or delete-for-all.
    pub fn is_sender(&self, user_id: Uuid) -> bool {
        self.from_user_id == user_id
    }

    /// Only the recipient may mark delivered or read.
    pub fn is_recipient(&self, user_id: Uuid) -> bool {
        self.to_user_id == user_id
    }

    /// A message deleted for all participants accepts no further mutation.
    pub fn is_mutable(&self) -> bool {
        !self.deleted_for_all
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample(from: Uuid, to: Uuid) -> Model {
        Model {
            message_id: Uuid::new_v4(),
            conversation_id: "a_b".to_string(),
            from_user_id: from,
            to_user_id: to,
            text: "hi".to_string(),
            created_at: Utc::now().into(),
            delivered_at: None,
            read_at: None,
            edited: false,
            deleted_for_all: false,
        }
    }

    #[test]
    fn participant_roles() {
        let from = Uuid::new_v4();
        let to = Uuid::new_v4();
        let msg = sample(from, to);

        assert!(msg.is_sender(from));
        assert!(!msg.is_sender(to));
        assert!(msg.is_recipient(to));
        assert!(!msg.is_recipient(from));
        assert!(!msg.is_recipient(Uuid::new_v4()));
    }

    #[test]
    fn deleted_message_is_not_mutable() {
        let mut msg = sample(Uuid::new_v4(), Uuid::new_v4());
        assert!(msg.is_mutable());
        msg.deleted_for_all = true;
        assert!(!msg.is_mutable());
    }
}
