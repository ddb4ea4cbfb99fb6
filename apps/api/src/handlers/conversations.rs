use actix_web::{get, web, HttpResponse, Responder};
use application::chat::dtos::ConversationSummaryDto;
use application::chat::list_messages::{
    CountUnreadUseCase, LatestMessageUseCase, ListConversationMessagesUseCase,
};
use pulse_core::conversation::conversation_key;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::extractors::AuthUser;
use crate::handlers::error_handler::HttpAppError;
use application::auth::tokens;
use application::chat::dtos::MessageDto;

/// Full history for the conversation between the caller and the other
/// participant, ascending by creation time. The one synchronous read path
/// into the message store from outside the realtime protocol.
#[get("/conversations/{other_user_id}/messages")]
pub async fn get_conversation_messages(
    db: web::Data<DatabaseConnection>,
    auth: AuthUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, HttpAppError> {
    let user_id = tokens::claims_user_id(&auth.0)?;
    let other_user_id = path.into_inner();
    let conversation_id = conversation_key(user_id, other_user_id);

    let messages = ListConversationMessagesUseCase::execute(db.get_ref(), &conversation_id).await?;

    Ok(HttpResponse::Ok().json(messages))
}

/// Newest message plus the caller's unread count for one conversation,
/// for list screens.
#[get("/conversations/{other_user_id}/summary")]
pub async fn get_conversation_summary(
    db: web::Data<DatabaseConnection>,
    auth: AuthUser,
    path: web::Path<Uuid>,
) -> Result<impl Responder, HttpAppError> {
    let user_id = tokens::claims_user_id(&auth.0)?;
    let other_user_id = path.into_inner();
    let conversation_id = conversation_key(user_id, other_user_id);

    let last_message = LatestMessageUseCase::execute(db.get_ref(), &conversation_id).await?;
    let unread_count = CountUnreadUseCase::execute(db.get_ref(), &conversation_id, user_id).await?;

    Ok(HttpResponse::Ok().json(ConversationSummaryDto {
        last_message: last_message.map(MessageDto::from),
        unread_count,
    }))
}
