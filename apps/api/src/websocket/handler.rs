use actix_web::{get, web, HttpRequest, HttpResponse};
use actix_ws::Message;
use futures::StreamExt;
use sea_orm::DatabaseConnection;
use tokio::sync::mpsc;
use uuid::Uuid;

use application::auth::tokens;
use application::users::last_seen::UpdateLastSeenUseCase;

use super::events::{ClientEvent, ServerEvent};
use super::presence::{ConnectionHandle, Outbound, PresenceTable};
use super::router::EventRouter;
use crate::config::Config;

/// Pull the token from the `token` query parameter, falling back to a
/// bearer Authorization header. Browsers cannot set headers on a
/// websocket upgrade, so the query parameter is the primary channel.
fn bearer_token(req: &HttpRequest) -> Option<String> {
    for pair in req.query_string().split('&') {
        if let Some(token) = pair.strip_prefix("token=") {
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }

    req.headers()
        .get(actix_web::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

fn parse_client_event(payload: &[u8], binary: bool) -> Result<ClientEvent, String> {
    if binary {
        rmp_serde::from_slice(payload).map_err(|e| e.to_string())
    } else {
        serde_json::from_slice(payload).map_err(|e| e.to_string())
    }
}

/// Upgrade endpoint. The token is verified before the upgrade completes;
/// a bad token gets a plain 401 and no websocket.
#[get("/ws/")]
pub async fn websocket_handler(
    req: HttpRequest,
    stream: web::Payload,
    db: web::Data<DatabaseConnection>,
    config: web::Data<Config>,
    presence: web::Data<PresenceTable>,
) -> actix_web::Result<HttpResponse> {
    let user_id = match bearer_token(&req)
        .ok_or_else(|| "missing token".to_string())
        .and_then(|token| {
            tokens::verify_token(&config.jwt_secret, &token).map_err(|e| e.to_string())
        })
        .and_then(|claims| tokens::claims_user_id(&claims).map_err(|e| e.to_string()))
    {
        Ok(user_id) => user_id,
        Err(reason) => {
            tracing::warn!("websocket upgrade rejected: {}", reason);
            return Ok(HttpResponse::Unauthorized().finish());
        }
    };

    let (response, session, msg_stream) = actix_ws::handle(&req, stream)?;

    actix_web::rt::spawn(run_connection(
        user_id,
        session,
        msg_stream,
        db.into_inner(),
        presence.into_inner(),
    ));

    Ok(response)
}

async fn run_connection(
    user_id: Uuid,
    session: actix_ws::Session,
    mut msg_stream: actix_ws::MessageStream,
    db: std::sync::Arc<DatabaseConnection>,
    presence: std::sync::Arc<PresenceTable>,
) {
    let conn_id = Uuid::new_v4();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = ConnectionHandle::new(conn_id, tx);

    // A second login from the same user replaces the first; the evicted
    // session is told to close itself.
    if let Some(evicted) = presence.register(user_id, handle.clone()).await {
        tracing::debug!(%user_id, "evicting prior connection");
        evicted.close();
    }

    tracing::info!(%user_id, %conn_id, "websocket connected");

    if let Err(e) = UpdateLastSeenUseCase::execute(&db, user_id).await {
        tracing::error!(%user_id, "failed to update last seen: {}", e);
    }

    presence
        .broadcast(ServerEvent::UserOnline { user_id })
        .await;
    handle.send(ServerEvent::OnlineList {
        user_ids: presence.list_online().await,
    });

    // Writer task: the only place that serializes and writes outbound
    // frames. Ends when every sender is gone or a Close frame arrives.
    let mut write_session = session.clone();
    actix_web::rt::spawn(async move {
        while let Some(frame) = rx.recv().await {
            match frame {
                Outbound::Event(event) => {
                    let text = match serde_json::to_string(&event) {
                        Ok(text) => text,
                        Err(e) => {
                            tracing::error!("failed to serialize outbound event: {}", e);
                            continue;
                        }
                    };
                    if write_session.text(text).await.is_err() {
                        break;
                    }
                }
                Outbound::Close => {
                    let _ = write_session.close(None).await;
                    break;
                }
            }
        }
    });

    let router = EventRouter::new(db.clone(), presence.clone());
    let mut ping_session = session.clone();

    while let Some(Ok(msg)) = msg_stream.next().await {
        match msg {
            Message::Text(text) => match parse_client_event(text.as_bytes(), false) {
                Ok(event) => router.dispatch(user_id, &handle, event).await,
                Err(reason) => tracing::debug!(%user_id, "unparseable text frame: {}", reason),
            },
            Message::Binary(bin) => match parse_client_event(&bin, true) {
                Ok(event) => router.dispatch(user_id, &handle, event).await,
                Err(reason) => tracing::debug!(%user_id, "unparseable binary frame: {}", reason),
            },
            Message::Ping(bytes) => {
                if ping_session.pong(&bytes).await.is_err() {
                    break;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    // Dropping our handle lets the writer drain and exit once the
    // presence entry is gone too.
    drop(handle);

    if presence.deregister(user_id, conn_id).await {
        if let Err(e) = UpdateLastSeenUseCase::execute(&db, user_id).await {
            tracing::error!(%user_id, "failed to update last seen: {}", e);
        }
        presence
            .broadcast(ServerEvent::UserOffline { user_id })
            .await;
        tracing::info!(%user_id, %conn_id, "websocket disconnected");
    } else {
        // This connection was already replaced; the newer session owns
        // the presence entry and the offline broadcast is not ours.
        tracing::debug!(%user_id, %conn_id, "stale connection closed");
    }
}
