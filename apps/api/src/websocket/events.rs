use std::collections::HashMap;

use application::chat::dtos::MessageDto;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Events a client emits over its connection. Frames arrive as
/// `{"event": ..., "data": ...}` in JSON text or MessagePack binary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientEvent {
    #[serde(rename = "message:send", rename_all = "camelCase")]
    MessageSend {
        to_user_id: Uuid,
        text: String,
        /// Client-minted correlation token; echoed back unmodified in
        /// `message:new`, never persisted.
        #[serde(default)]
        client_id: Option<String>,
    },
    #[serde(rename = "message:read", rename_all = "camelCase")]
    MessageRead { message_id: Uuid },
    #[serde(rename = "message:delivered", rename_all = "camelCase")]
    MessageDelivered { message_id: Uuid },
    #[serde(rename = "message:edit", rename_all = "camelCase")]
    MessageEdit {
        message_id: Uuid,
        new_text: String,
        to_user_id: Uuid,
    },
    #[serde(rename = "message:deleteForMe", rename_all = "camelCase")]
    MessageDeleteForMe { message_id: Uuid, to_user_id: Uuid },
    #[serde(rename = "message:deleteForAll", rename_all = "camelCase")]
    MessageDeleteForAll { message_id: Uuid, to_user_id: Uuid },
    #[serde(rename = "typing:start", rename_all = "camelCase")]
    TypingStart {
        to_user_id: Uuid,
        #[serde(default)]
        from_user_id: Option<Uuid>,
    },
    #[serde(rename = "typing:stop", rename_all = "camelCase")]
    TypingStop {
        to_user_id: Uuid,
        #[serde(default)]
        from_user_id: Option<Uuid>,
    },
    #[serde(rename = "presence:getStatus", rename_all = "camelCase")]
    PresenceGetStatus { user_ids: Vec<Uuid> },
}

/// Events the server emits to clients, as JSON text frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// Authoritative record of a sent message, to both the sender (for
    /// reconciling its optimistic copy via `clientId`) and the recipient.
    #[serde(rename = "message:new", rename_all = "camelCase")]
    MessageNew {
        #[serde(flatten)]
        message: MessageDto,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        client_id: Option<String>,
    },
    #[serde(rename = "message:read", rename_all = "camelCase")]
    MessageRead { message_id: Uuid },
    #[serde(rename = "message:delivered", rename_all = "camelCase")]
    MessageDelivered { message_id: Uuid },
    #[serde(rename = "message:edit", rename_all = "camelCase")]
    MessageEdit { message_id: Uuid, new_text: String },
    #[serde(rename = "message:deleteForMe", rename_all = "camelCase")]
    MessageDeleteForMe { message_id: Uuid },
    #[serde(rename = "message:deleteForAll", rename_all = "camelCase")]
    MessageDeleteForAll { message_id: Uuid },
    #[serde(rename = "typing:start", rename_all = "camelCase")]
    TypingStart { from_user_id: Uuid },
    #[serde(rename = "typing:stop", rename_all = "camelCase")]
    TypingStop { from_user_id: Uuid },
    #[serde(rename = "presence:status")]
    PresenceStatus(HashMap<Uuid, bool>),
    #[serde(rename = "user:online", rename_all = "camelCase")]
    UserOnline { user_id: Uuid },
    #[serde(rename = "user:offline", rename_all = "camelCase")]
    UserOffline { user_id: Uuid },
    #[serde(rename = "users:onlineList", rename_all = "camelCase")]
    OnlineList { user_ids: Vec<Uuid> },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn client_event_names_and_fields() {
        let to = Uuid::new_v4();
        let event = ClientEvent::MessageSend {
            to_user_id: to,
            text: "hi".to_string(),
            client_id: Some("c1".to_string()),
        };

        let json: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "message:send");
        assert_eq!(json["data"]["toUserId"], to.to_string());
        assert_eq!(json["data"]["clientId"], "c1");
    }

    #[test]
    fn client_id_is_optional_on_the_wire() {
        let json = format!(
            r#"{{"event":"message:send","data":{{"toUserId":"{}","text":"hi"}}}}"#,
            Uuid::new_v4()
        );
        let event: ClientEvent = serde_json::from_str(&json).unwrap();
        assert!(matches!(
            event,
            ClientEvent::MessageSend { client_id: None, .. }
        ));
    }

    #[test]
    fn message_new_flattens_the_record() {
        let dto = MessageDto {
            message_id: Uuid::new_v4(),
            conversation_id: "a_b".to_string(),
            from_user_id: Uuid::new_v4(),
            to_user_id: Uuid::new_v4(),
            text: "hi".to_string(),
            created_at: Utc::now().timestamp(),
            delivered_at: None,
            read_at: None,
            edited: false,
            deleted_for_all: false,
        };
        let event = ServerEvent::MessageNew {
            message: dto.clone(),
            client_id: Some("c1".to_string()),
        };

        let json: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "message:new");
        assert_eq!(json["data"]["messageId"], dto.message_id.to_string());
        assert_eq!(json["data"]["text"], "hi");
        assert_eq!(json["data"]["clientId"], "c1");
    }

    #[test]
    fn presence_status_payload_is_a_plain_map() {
        let user = Uuid::new_v4();
        let mut statuses = HashMap::new();
        statuses.insert(user, true);

        let json: serde_json::Value =
            serde_json::to_value(ServerEvent::PresenceStatus(statuses)).unwrap();
        assert_eq!(json["event"], "presence:status");
        assert_eq!(json["data"][user.to_string()], true);
    }

    #[test]
    fn messagepack_frames_roundtrip() {
        let event = ClientEvent::MessageRead {
            message_id: Uuid::new_v4(),
        };

        let bytes = rmp_serde::to_vec_named(&event).unwrap();
        let parsed: ClientEvent = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(parsed, event);
    }
}
