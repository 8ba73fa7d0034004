pub use super::follows::Entity as Follows;
pub use super::microposts::Entity as Microposts;
pub use super::tokens::Entity as Tokens;
pub use super::users::Entity as Users;
