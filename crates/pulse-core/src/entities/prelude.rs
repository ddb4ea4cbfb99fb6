pub use super::messages::Entity as Messages;
pub use super::users::Entity as Users;
