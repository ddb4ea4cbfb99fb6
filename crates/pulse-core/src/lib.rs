pub mod conversation;
pub mod entities;
