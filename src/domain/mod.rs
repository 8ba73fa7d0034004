//! Pure domain logic: authorization predicates and field validation.
//!
//! Nothing in this module touches the store; everything takes the already
//! resolved requester as an explicit argument.

pub mod guard;
pub mod validate;
