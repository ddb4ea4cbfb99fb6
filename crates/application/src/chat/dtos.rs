use pulse_core::entities::messages;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Wire and REST representation of a stored message. Timestamps are unix
/// seconds to match the client interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub message_id: Uuid,
    pub conversation_id: String,
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub text: String,
    pub created_at: i64,
    pub delivered_at: Option<i64>,
    pub read_at: Option<i64>,
    pub edited: bool,
    pub deleted_for_all: bool,
}

impl From<messages::Model> for MessageDto {
    fn from(msg: messages::Model) -> Self {
        Self {
            message_id: msg.message_id,
            conversation_id: msg.conversation_id,
            from_user_id: msg.from_user_id,
            to_user_id: msg.to_user_id,
            text: msg.text,
            created_at: msg.created_at.timestamp(),
            delivered_at: msg.delivered_at.map(|t| t.timestamp()),
            read_at: msg.read_at.map(|t| t.timestamp()),
            edited: msg.edited,
            deleted_for_all: msg.deleted_for_all,
        }
    }
}

/// Per-conversation view for list screens: the newest message plus the
/// caller's unread count.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummaryDto {
    pub last_message: Option<MessageDto>,
    pub unread_count: u64,
}
