//! # User Repository
//!
//! Lookup and registration of users.
//!
//! Balances are read here but never written: every balance change goes
//! through [`LedgerRepository::record_transaction`](super::ledger::LedgerRepository::record_transaction).

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use coinshop_core::{Coins, User, UserId};

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Gets a user by username.
    ///
    /// ## Returns
    /// * `Ok(User)` - The user row
    /// * `Err(DbError::NotFound)` - No user with that name
    pub async fn get_user(&self, username: &str) -> DbResult<User> {
        self.find_user(username)
            .await?
            .ok_or_else(|| DbError::not_found("User", username))
    }

    /// Looks a user up, returning `None` if absent.
    pub async fn find_user(&self, username: &str) -> DbResult<Option<User>> {
        debug!(username = %username, "Looking up user");

        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, balance, created_at
            FROM users
            WHERE username = ?1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Registers a new user with a starting balance.
    ///
    /// The insert itself is the uniqueness check: two concurrent
    /// registrations of the same name cannot both succeed.
    ///
    /// ## Returns
    /// * `Ok(UserId)` - The new row id
    /// * `Err(DbError::UniqueViolation)` - Username already taken
    pub async fn save_user(
        &self,
        username: &str,
        password_hash: &str,
        starting_balance: Coins,
    ) -> DbResult<UserId> {
        debug!(username = %username, balance = starting_balance.amount(), "Registering user");

        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, balance, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(starting_balance)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("username", username),
            other => other,
        })?;

        Ok(result.last_insert_rowid())
    }

    /// Counts registered users.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
