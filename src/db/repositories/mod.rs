pub mod follow;
pub mod micropost;
pub mod token;
pub mod user;
