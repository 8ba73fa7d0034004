use sea_orm::entity::prelude::*;

/// Directed follow edge: `follower_id` follows `followee_id`.
///
/// Uniqueness of the ordered pair is enforced by a composite index
/// created in the initial migration.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "follows")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub follower_id: i32,

    pub followee_id: i32,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
