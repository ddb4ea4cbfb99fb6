use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod config;
pub mod extractors;
pub mod handlers;
mod middleware;
mod websocket;

use config::Config;
use handlers::{conversations, health};
use middleware::auth::AuthMiddleware;
use websocket::handler::websocket_handler;
use websocket::presence::PresenceTable;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,api=debug,actix_web=info".into());

    let is_json = std::env::var("LOG_FORMAT").unwrap_or_default() == "json";

    if is_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_file(false)
                    .with_line_number(false)
                    .compact(),
            )
            .init();
    }

    let config = Config::from_env()?;
    let config_data = web::Data::new(config.clone());
    tracing::info!("Starting pulse API server...");

    let db = web::Data::new(infrastructure::database::init_database(&config.database_url).await?);

    // The presence table is built once and handed to every connection;
    // nothing else in the process holds ambient presence state.
    let presence = web::Data::new(PresenceTable::new());

    let server_addr = format!("{}:{}", config.server_host, config.server_port);
    tracing::info!("Server listening on {}", server_addr);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(TracingLogger::default())
            .wrap(AuthMiddleware)
            .app_data(db.clone())
            .app_data(config_data.clone())
            .app_data(presence.clone())
            // Health (unauthenticated)
            .service(health::health_check)
            // REST history/summary reads
            .service(conversations::get_conversation_messages)
            .service(conversations::get_conversation_summary)
            // WebSocket
            .service(websocket_handler)
    })
    .bind(&server_addr)?
    .run()
    .await?;

    Ok(())
}
