pub mod auth;
pub mod chat;
pub mod error;
pub mod users;

pub use error::{AppError, AppResult};
