pub mod prelude;

pub mod follows;
pub mod microposts;
pub mod tokens;
pub mod users;
