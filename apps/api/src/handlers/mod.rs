pub mod conversations;
pub mod error_handler;
pub mod health;
