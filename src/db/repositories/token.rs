use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set, TransactionTrait,
};
use subtle::ConstantTimeEq;

use crate::constants::TOKEN_BYTES;
use crate::entities::{tokens, users};

use super::user::Account;

pub struct TokenRepository {
    conn: DatabaseConnection,
}

impl TokenRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Issue a fresh token for an account, invalidating any existing ones.
    ///
    /// The delete and the insert run in one transaction so two concurrent
    /// logins for the same account can never leave two live tokens, and a
    /// racing reader never observes the account with zero tokens committed
    /// mid-rotation.
    pub async fn issue(&self, user_id: i32) -> Result<String> {
        let token = generate_token();
        let now = chrono::Utc::now().to_rfc3339();

        let token_for_insert = token.clone();
        self.conn
            .transaction::<_, (), sea_orm::DbErr>(move |txn| {
                Box::pin(async move {
                    tokens::Entity::delete_many()
                        .filter(tokens::Column::UserId.eq(user_id))
                        .exec(txn)
                        .await?;

                    tokens::ActiveModel {
                        token: Set(token_for_insert),
                        user_id: Set(user_id),
                        created_at: Set(now),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;

                    Ok(())
                })
            })
            .await
            .context("Token rotation transaction failed")?;

        Ok(token)
    }

    /// Resolve a presented token to its account.
    ///
    /// Exact-match lookup on the indexed column, then a constant-time
    /// re-comparison of the stored value against the presented one so the
    /// comparison itself leaks nothing.
    pub async fn resolve(&self, presented: &str) -> Result<Option<Account>> {
        let row = tokens::Entity::find()
            .filter(tokens::Column::Token.eq(presented))
            .one(&self.conn)
            .await
            .context("Failed to query token")?;

        let Some(row) = row else {
            return Ok(None);
        };

        if row.token.as_bytes().ct_eq(presented.as_bytes()).unwrap_u8() != 1 {
            return Ok(None);
        }

        let user = users::Entity::find_by_id(row.user_id)
            .one(&self.conn)
            .await
            .context("Failed to query token owner")?;

        Ok(user.map(Account::from))
    }

    /// Delete all tokens for an account. Revoking with none live is a no-op.
    pub async fn revoke_all(&self, user_id: i32) -> Result<()> {
        tokens::Entity::delete_many()
            .filter(tokens::Column::UserId.eq(user_id))
            .exec(&self.conn)
            .await
            .context("Failed to revoke tokens")?;

        Ok(())
    }

    /// Number of live tokens for an account. The rotation invariant keeps
    /// this at zero or one.
    pub async fn live_count(&self, user_id: i32) -> Result<u64> {
        let count = tokens::Entity::find()
            .filter(tokens::Column::UserId.eq(user_id))
            .count(&self.conn)
            .await
            .context("Failed to count tokens")?;

        Ok(count)
    }
}

/// Generate a random bearer token (64-char hex string, 32 bytes of entropy)
#[must_use]
pub fn generate_token() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let mut bytes = [0u8; TOKEN_BYTES];
    rng.fill(&mut bytes[..]);

    bytes.iter().fold(
        String::with_capacity(TOKEN_BYTES * 2),
        |mut acc, b| {
            use std::fmt::Write;
            let _ = write!(acc, "{b:02x}");
            acc
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_64_hex_chars() {
        let token = generate_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn tokens_are_unique() {
        assert_ne!(generate_token(), generate_token());
    }
}
