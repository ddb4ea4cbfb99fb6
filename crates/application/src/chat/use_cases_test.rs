#[cfg(test)]
mod tests {
    use crate::chat::dtos::MessageDto;
    use crate::chat::get_message::GetMessageUseCase;
    use crate::chat::mutate_message::{DeleteForAllUseCase, EditMessageUseCase, TOMBSTONE_TEXT};
    use crate::chat::update_status::{MarkDeliveredUseCase, MarkReadUseCase};
    use crate::AppError;
    use chrono::Utc;
    use pulse_core::entities::messages;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use uuid::Uuid;

    fn stored_message() -> messages::Model {
        let from = Uuid::new_v4();
        let to = Uuid::new_v4();
        messages::Model {
            message_id: Uuid::new_v4(),
            conversation_id: pulse_core::conversation::conversation_key(from, to),
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

    #[tokio::test]
    async fn get_message_maps_missing_id_to_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<messages::Model>::new()])
            .into_connection();

        let result = GetMessageUseCase::execute(&db, Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn mark_read_stamps_unread_message() {
        let msg = stored_message();
        let mut updated = msg.clone();
        updated.read_at = Some(Utc::now().into());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![msg.clone()]])
            .append_query_results([vec![updated.clone()]])
            .into_connection();

        let result = MarkReadUseCase::execute(&db, msg.message_id).await.unwrap();
        assert!(result.read_at.is_some());
    }

    #[tokio::test]
    async fn mark_read_is_idempotent() {
        let mut msg = stored_message();
        msg.read_at = Some(Utc::now().into());

        // Only the lookup is appended: a second write would exhaust the
        // mock and fail the test.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![msg.clone()]])
            .into_connection();

        let result = MarkReadUseCase::execute(&db, msg.message_id).await.unwrap();
        assert_eq!(result.read_at, msg.read_at);
    }

    #[tokio::test]
    async fn mark_delivered_is_idempotent() {
        let mut msg = stored_message();
        msg.delivered_at = Some(Utc::now().into());

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![msg.clone()]])
            .into_connection();

        let result = MarkDeliveredUseCase::execute(&db, msg.message_id)
            .await
            .unwrap();
        assert_eq!(result.delivered_at, msg.delivered_at);
    }

    #[tokio::test]
    async fn edit_is_refused_after_delete_for_all() {
        let mut msg = stored_message();
        msg.deleted_for_all = true;
        msg.text = TOMBSTONE_TEXT.to_string();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![msg.clone()]])
            .into_connection();

        let result = EditMessageUseCase::execute(&db, msg.message_id, "rewritten".into()).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn delete_for_all_writes_tombstone() {
        let msg = stored_message();
        let mut deleted = msg.clone();
        deleted.deleted_for_all = true;
        deleted.text = TOMBSTONE_TEXT.to_string();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![msg.clone()]])
            .append_query_results([vec![deleted.clone()]])
            .into_connection();

        let result = DeleteForAllUseCase::execute(&db, msg.message_id)
            .await
            .unwrap();
        assert!(result.deleted_for_all);
        assert_eq!(result.text, TOMBSTONE_TEXT);
    }

    #[test]
    fn dto_carries_unix_timestamps() {
        let mut msg = stored_message();
        msg.read_at = Some(msg.created_at);

        let created = msg.created_at.timestamp();
        let dto = MessageDto::from(msg);
        assert_eq!(dto.created_at, created);
        assert_eq!(dto.read_at, Some(created));
        assert_eq!(dto.delivered_at, None);
    }
}
