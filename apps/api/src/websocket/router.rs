use std::collections::HashMap;
use std::sync::Arc;

use sea_orm::DatabaseConnection;
use uuid::Uuid;

use application::chat::dtos::MessageDto;
use application::chat::get_message::GetMessageUseCase;
use application::chat::mutate_message::{DeleteForAllUseCase, EditMessageUseCase};
use application::chat::send_message::CreateMessageUseCase;
use application::chat::update_status::{MarkDeliveredUseCase, MarkReadUseCase};

use super::events::{ClientEvent, ServerEvent};
use super::presence::{ConnectionHandle, PresenceTable};

/// Routes inbound events from an authenticated connection: validates the
/// requester against the persisted record's participant fields, persists
/// side effects, and fans outbound events out via the presence table.
///
/// Every failure is handled here, logged and dropped with no outbound
/// emission. Nothing an event does can take down its connection, let
/// alone the process.
pub struct EventRouter {
    db: Arc<DatabaseConnection>,
    presence: Arc<PresenceTable>,
}

impl EventRouter {
    pub fn new(db: impl Into<Arc<DatabaseConnection>>, presence: Arc<PresenceTable>) -> Self {
        Self {
            db: db.into(),
            presence,
        }
    }

    pub async fn dispatch(&self, user_id: Uuid, conn: &ConnectionHandle, event: ClientEvent) {
        match event {
            ClientEvent::MessageSend {
                to_user_id,
                text,
                client_id,
            } => self.on_send(user_id, conn, to_user_id, text, client_id).await,
            ClientEvent::MessageRead { message_id } => self.on_read(user_id, message_id).await,
            ClientEvent::MessageDelivered { message_id } => {
                self.on_delivered(user_id, message_id).await
            }
            ClientEvent::MessageEdit {
                message_id,
                new_text,
                ..
            } => self.on_edit(user_id, conn, message_id, new_text).await,
            ClientEvent::MessageDeleteForMe {
                message_id,
                to_user_id,
            } => self.on_delete_for_me(message_id, to_user_id).await,
            ClientEvent::MessageDeleteForAll { message_id, .. } => {
                self.on_delete_for_all(user_id, conn, message_id).await
            }
            ClientEvent::TypingStart {
                to_user_id,
                from_user_id,
            } => {
                self.forward_typing(to_user_id, from_user_id.unwrap_or(user_id), true)
                    .await
            }
            ClientEvent::TypingStop {
                to_user_id,
                from_user_id,
            } => {
                self.forward_typing(to_user_id, from_user_id.unwrap_or(user_id), false)
                    .await
            }
            ClientEvent::PresenceGetStatus { user_ids } => {
                self.on_presence_status(conn, user_ids).await
            }
        }
    }

    /// Persist and fan out a new message: echo to the sender (so it can
    /// reconcile its optimistic copy via `clientId`) and to the recipient
    /// if online. An offline recipient gets nothing pushed; history is
    /// fetched over REST.
    async fn on_send(
        &self,
        user_id: Uuid,
        conn: &ConnectionHandle,
        to_user_id: Uuid,
        text: String,
        client_id: Option<String>,
    ) {
        if text.is_empty() {
            return;
        }

        let message =
            match CreateMessageUseCase::execute(&self.db, user_id, to_user_id, text).await {
                Ok(message) => message,
                Err(e) => {
                    tracing::error!(%user_id, %to_user_id, "failed to persist message: {}", e);
                    return;
                }
            };

        let payload = ServerEvent::MessageNew {
            message: MessageDto::from(message),
            client_id,
        };

        conn.send(payload.clone());
        if let Some(recipient) = self.presence.lookup(to_user_id).await {
            recipient.send(payload);
        }
    }

    async fn on_read(&self, user_id: Uuid, message_id: Uuid) {
        let msg = match GetMessageUseCase::execute(&self.db, message_id).await {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!(%message_id, "message:read dropped: {}", e);
                return;
            }
        };

        if !msg.is_recipient(user_id) {
            tracing::warn!(%user_id, %message_id, "message:read from non-recipient ignored");
            return;
        }

        let already_read = msg.read_at.is_some();
        if let Err(e) = MarkReadUseCase::execute(&self.db, message_id).await {
            tracing::error!(%message_id, "failed to mark read: {}", e);
            return;
        }
        if already_read {
            // Idempotent repeat: state is unchanged, the sender was
            // already notified.
            return;
        }

        if let Some(sender) = self.presence.lookup(msg.from_user_id).await {
            sender.send(ServerEvent::MessageRead { message_id });
        }
    }

    async fn on_delivered(&self, user_id: Uuid, message_id: Uuid) {
        let msg = match GetMessageUseCase::execute(&self.db, message_id).await {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!(%message_id, "message:delivered dropped: {}", e);
                return;
            }
        };

        if !msg.is_recipient(user_id) {
            tracing::warn!(%user_id, %message_id, "message:delivered from non-recipient ignored");
            return;
        }

        if msg.delivered_at.is_some() {
            return;
        }
        if let Err(e) = MarkDeliveredUseCase::execute(&self.db, message_id).await {
            tracing::error!(%message_id, "failed to mark delivered: {}", e);
            return;
        }

        if let Some(sender) = self.presence.lookup(msg.from_user_id).await {
            sender.send(ServerEvent::MessageDelivered { message_id });
        }
    }

    /// Recipient fan-out re-derives the other participant from the stored
    /// record, never from the client's claim.
    async fn on_edit(
        &self,
        user_id: Uuid,
        conn: &ConnectionHandle,
        message_id: Uuid,
        new_text: String,
    ) {
        let msg = match GetMessageUseCase::execute(&self.db, message_id).await {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!(%message_id, "message:edit dropped: {}", e);
                return;
            }
        };

        if !msg.is_sender(user_id) {
            tracing::warn!(%user_id, %message_id, "message:edit from non-sender ignored");
            return;
        }
        if !msg.is_mutable() {
            tracing::warn!(%message_id, "message:edit after deleteForAll ignored");
            return;
        }

        if let Err(e) = EditMessageUseCase::execute(&self.db, message_id, new_text.clone()).await {
            tracing::error!(%message_id, "failed to edit message: {}", e);
            return;
        }

        let payload = ServerEvent::MessageEdit {
            message_id,
            new_text,
        };
        conn.send(payload.clone());
        if let Some(recipient) = self.presence.lookup(msg.to_user_id).await {
            recipient.send(payload);
        }
    }

    /// Local-only semantics: nothing is persisted and the sender's own
    /// copy is the client's concern. Only the recipient hears about it.
    async fn on_delete_for_me(&self, message_id: Uuid, to_user_id: Uuid) {
        if let Some(recipient) = self.presence.lookup(to_user_id).await {
            recipient.send(ServerEvent::MessageDeleteForMe { message_id });
        }
    }

    async fn on_delete_for_all(&self, user_id: Uuid, conn: &ConnectionHandle, message_id: Uuid) {
        let msg = match GetMessageUseCase::execute(&self.db, message_id).await {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!(%message_id, "message:deleteForAll dropped: {}", e);
                return;
            }
        };

        if !msg.is_sender(user_id) {
            tracing::warn!(%user_id, %message_id, "message:deleteForAll from non-sender ignored");
            return;
        }

        if let Err(e) = DeleteForAllUseCase::execute(&self.db, message_id).await {
            tracing::error!(%message_id, "failed to delete message: {}", e);
            return;
        }

        let payload = ServerEvent::MessageDeleteForAll { message_id };
        conn.send(payload.clone());
        if let Some(recipient) = self.presence.lookup(msg.to_user_id).await {
            recipient.send(payload);
        }
    }

    /// Ephemeral: forwarded verbatim to the recipient if online, never
    /// echoed back, nothing persisted.
    async fn forward_typing(&self, to_user_id: Uuid, from_user_id: Uuid, started: bool) {
        if let Some(recipient) = self.presence.lookup(to_user_id).await {
            let event = if started {
                ServerEvent::TypingStart { from_user_id }
            } else {
                ServerEvent::TypingStop { from_user_id }
            };
            recipient.send(event);
        }
    }

    async fn on_presence_status(&self, conn: &ConnectionHandle, user_ids: Vec<Uuid>) {
        let mut statuses = HashMap::new();
        for user_id in user_ids {
            statuses.insert(user_id, self.presence.is_online(user_id).await);
        }
        conn.send(ServerEvent::PresenceStatus(statuses));
    }
}
