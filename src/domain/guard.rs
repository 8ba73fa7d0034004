//! Authorization predicates.
//!
//! Account deletion and post deletion carry different policies: accounts may
//! only be removed by an admin, posts only by their author. Callers map a
//! `false` to `Forbidden`, never `NotFound`, so "exists but not yours" stays
//! distinguishable from "does not exist".

use crate::db::repositories::user::Account;

pub fn is_self(requester: &Account, owner_id: i32) -> bool {
    requester.id == owner_id
}

pub fn is_admin(requester: &Account) -> bool {
    requester.is_admin
}

/// Account fields may be changed by the owner or an admin.
pub fn can_mutate_account(requester: &Account, target_id: i32) -> bool {
    is_self(requester, target_id) || is_admin(requester)
}

/// Accounts are deleted by admins only; owners cannot remove their own.
pub fn can_delete_account(requester: &Account) -> bool {
    is_admin(requester)
}

/// Posts are deleted by their author only; admin status does not apply here.
pub fn can_delete_post(requester: &Account, author_id: i32) -> bool {
    is_self(requester, author_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(id: i32, is_admin: bool) -> Account {
        Account {
            id,
            name: format!("user{id}"),
            email: format!("user{id}@example.com"),
            is_admin,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn owner_can_mutate_own_account() {
        let user = account(1, false);
        assert!(can_mutate_account(&user, 1));
        assert!(!can_mutate_account(&user, 2));
    }

    #[test]
    fn admin_can_mutate_any_account() {
        let admin = account(1, true);
        assert!(can_mutate_account(&admin, 2));
    }

    #[test]
    fn only_admin_deletes_accounts() {
        let user = account(1, false);
        let admin = account(2, true);
        assert!(!can_delete_account(&user));
        assert!(can_delete_account(&admin));
    }

    #[test]
    fn only_author_deletes_posts() {
        let author = account(1, false);
        let admin = account(2, true);
        assert!(can_delete_post(&author, 1));
        assert!(!can_delete_post(&admin, 1));
    }
}
