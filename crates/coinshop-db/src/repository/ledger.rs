//! # Ledger Repository
//!
//! The only place where balances change.
//!
//! ## Recording a Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                   record_transaction (one sqlx transaction)             │
//! │                                                                         │
//! │  BEGIN                                                                 │
//! │   │                                                                     │
//! │   ├─ 1. receiver present?                                              │
//! │   │     UPDATE users SET balance = balance + :amount                   │
//! │   │      WHERE username = :receiver                                    │
//! │   │     0 rows → NotFound(receiver)                                    │
//! │   │                                                                     │
//! │   ├─ 2. UPDATE users SET balance = balance - :amount                   │
//! │   │      WHERE username = :sender AND balance >= :amount               │
//! │   │     0 rows → NotFound(sender) or InsufficientFunds                 │
//! │   │                                                                     │
//! │   ├─ 3. INSERT INTO transactions (...) → id                            │
//! │   │                                                                     │
//! │  COMMIT  ← all three or none; any early return drops = ROLLBACK        │
//! │                                                                         │
//! │  The first statement is always a write, so SQLite takes the write      │
//! │  lock up front. Concurrent writers wait on the busy timeout instead    │
//! │  of failing on a stale read snapshot.                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use coinshop_core::{AccountInfo, CoinHistory, Coins, NewTransaction, Transaction, TransactionId};

/// Repository for the append-only transaction ledger.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    /// Atomically applies a coin movement and appends it to the ledger.
    ///
    /// ## Errors
    /// * `DbError::NotFound { entity: "User", id }` - receiver or sender has
    ///   no row; `id` names which one
    /// * `DbError::InsufficientFunds` - sender balance below the amount
    ///
    /// On any error nothing is written.
    pub async fn record_transaction(&self, new_tx: &NewTransaction) -> DbResult<TransactionId> {
        let sender = new_tx.sender();
        let amount = new_tx.amount();

        debug!(
            sender = %sender,
            receiver = ?new_tx.receiver(),
            item = ?new_tx.item(),
            amount = amount.amount(),
            "Recording transaction"
        );

        let mut tx = self.pool.begin().await?;

        if let Some(receiver) = new_tx.receiver() {
            let credited = sqlx::query(
                r#"
                UPDATE users
                SET balance = balance + ?1
                WHERE username = ?2
                "#,
            )
            .bind(amount)
            .bind(receiver)
            .execute(&mut *tx)
            .await?;

            if credited.rows_affected() == 0 {
                return Err(DbError::not_found("User", receiver));
            }
        }

        let debited = sqlx::query(
            r#"
            UPDATE users
            SET balance = balance - ?1
            WHERE username = ?2 AND balance >= ?1
            "#,
        )
        .bind(amount)
        .bind(sender)
        .execute(&mut *tx)
        .await?;

        if debited.rows_affected() == 0 {
            let available: Option<Coins> =
                sqlx::query_scalar("SELECT balance FROM users WHERE username = ?1")
                    .bind(sender)
                    .fetch_optional(&mut *tx)
                    .await?;

            return Err(match available {
                None => DbError::not_found("User", sender),
                Some(available) => DbError::InsufficientFunds {
                    username: sender.to_string(),
                    available,
                    requested: amount,
                },
            });
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO transactions (sender, receiver, amount, item, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(sender)
        .bind(new_tx.receiver())
        .bind(amount)
        .bind(new_tx.item())
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        let id = inserted.last_insert_rowid();

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        debug!(id = id, "Transaction committed");
        Ok(id)
    }

    /// All transactions the user sent or received, oldest first.
    ///
    /// ## Returns
    /// * `Ok(vec![])` - Known user without any transactions
    /// * `Err(DbError::NotFound)` - Unknown user
    pub async fn get_transactions_for(&self, username: &str) -> DbResult<Vec<Transaction>> {
        debug!(username = %username, "Fetching transactions");

        self.ensure_user_exists(username).await?;

        let transactions = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, sender, receiver, item, amount, created_at
            FROM transactions
            WHERE sender = ?1 OR receiver = ?1
            ORDER BY id
            "#,
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }

    /// Names of items the user bought, one per purchase, oldest first.
    pub async fn get_purchased_items(&self, username: &str) -> DbResult<Vec<String>> {
        debug!(username = %username, "Fetching purchased items");

        self.ensure_user_exists(username).await?;

        let items: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT item
            FROM transactions
            WHERE sender = ?1 AND item IS NOT NULL
            ORDER BY id
            "#,
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Balance, inventory and history of one user, read from a single
    /// snapshot.
    ///
    /// ## Consistency
    /// ```text
    /// BEGIN
    ///  ├─ SELECT balance      ─┐
    ///  ├─ SELECT items         ├─ same WAL snapshot
    ///  └─ SELECT transactions ─┘
    /// COMMIT
    /// ```
    /// A transfer committing concurrently is either visible in all three
    /// parts or in none, so `balance` always matches the history.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Unknown user
    pub async fn account_snapshot(&self, username: &str) -> DbResult<AccountInfo> {
        debug!(username = %username, "Reading account snapshot");

        let mut tx = self.pool.begin().await?;

        let balance = sqlx::query_scalar::<_, Coins>("SELECT balance FROM users WHERE username = ?1")
            .bind(username)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("User", username))?;

        let inventory: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT item
            FROM transactions
            WHERE sender = ?1 AND item IS NOT NULL
            ORDER BY id
            "#,
        )
        .bind(username)
        .fetch_all(&mut *tx)
        .await?;

        let transactions = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT id, sender, receiver, item, amount, created_at
            FROM transactions
            WHERE sender = ?1 OR receiver = ?1
            ORDER BY id
            "#,
        )
        .bind(username)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(AccountInfo {
            balance,
            inventory,
            history: CoinHistory::partition(username, transactions),
        })
    }

    /// Sum of every user's balance.
    pub async fn total_balance(&self) -> DbResult<Coins> {
        let total: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(balance), 0) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(Coins::new(total))
    }

    /// Number of recorded transactions.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn ensure_user_exists(&self, username: &str) -> DbResult<()> {
        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE username = ?1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        match exists {
            Some(_) => Ok(()),
            None => Err(DbError::not_found("User", username)),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use coinshop_core::TransactionKind;

    async fn setup() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.users().save_user("alice", "h", Coins::new(1000)).await.unwrap();
        db.users().save_user("bob", "h", Coins::new(1000)).await.unwrap();
        db
    }

    async fn balance(db: &Database, username: &str) -> Coins {
        db.users().get_user(username).await.unwrap().balance
    }

    #[tokio::test]
    async fn test_purchase_debits_sender() {
        let db = setup().await;
        let ledger = db.ledger();

        let id = ledger
            .record_transaction(&NewTransaction::purchase("alice", "cup", Coins::new(20)))
            .await
            .unwrap();

        assert!(id > 0);
        assert_eq!(balance(&db, "alice").await, Coins::new(980));

        let txs = ledger.get_transactions_for("alice").await.unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].kind(), TransactionKind::Purchase);
        assert_eq!(txs[0].item.as_deref(), Some("cup"));
        assert_eq!(txs[0].receiver, None);
    }

    #[tokio::test]
    async fn test_transfer_moves_coins() {
        let db = setup().await;

        db.ledger()
            .record_transaction(&NewTransaction::transfer("alice", "bob", Coins::new(500)))
            .await
            .unwrap();

        assert_eq!(balance(&db, "alice").await, Coins::new(500));
        assert_eq!(balance(&db, "bob").await, Coins::new(1500));
        assert_eq!(db.ledger().total_balance().await.unwrap(), Coins::new(2000));
    }

    #[tokio::test]
    async fn test_exact_balance_transfer_allowed() {
        let db = setup().await;

        db.ledger()
            .record_transaction(&NewTransaction::transfer("alice", "bob", Coins::new(1000)))
            .await
            .unwrap();

        assert_eq!(balance(&db, "alice").await, Coins::zero());
    }

    #[tokio::test]
    async fn test_insufficient_funds_leaves_no_trace() {
        let db = setup().await;
        let ledger = db.ledger();

        let err = ledger
            .record_transaction(&NewTransaction::transfer("alice", "bob", Coins::new(1001)))
            .await
            .unwrap_err();

        match err {
            DbError::InsufficientFunds {
                username,
                available,
                requested,
            } => {
                assert_eq!(username, "alice");
                assert_eq!(available, Coins::new(1000));
                assert_eq!(requested, Coins::new(1001));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // The receiver credit ran first and must have been rolled back
        assert_eq!(balance(&db, "alice").await, Coins::new(1000));
        assert_eq!(balance(&db, "bob").await, Coins::new(1000));
        assert_eq!(ledger.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_receiver() {
        let db = setup().await;

        let err = db
            .ledger()
            .record_transaction(&NewTransaction::transfer("alice", "ghost", Coins::new(5000)))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::NotFound { ref id, .. } if id == "ghost"));
        assert_eq!(balance(&db, "alice").await, Coins::new(1000));
    }

    #[tokio::test]
    async fn test_unknown_sender() {
        let db = setup().await;

        let err = db
            .ledger()
            .record_transaction(&NewTransaction::transfer("ghost", "bob", Coins::new(1)))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::NotFound { ref id, .. } if id == "ghost"));
        assert_eq!(balance(&db, "bob").await, Coins::new(1000));
        assert_eq!(db.ledger().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_history_order_and_membership() {
        let db = setup().await;
        let ledger = db.ledger();

        ledger
            .record_transaction(&NewTransaction::purchase("alice", "cup", Coins::new(20)))
            .await
            .unwrap();
        ledger
            .record_transaction(&NewTransaction::transfer("bob", "alice", Coins::new(30)))
            .await
            .unwrap();
        ledger
            .record_transaction(&NewTransaction::purchase("bob", "pen", Coins::new(10)))
            .await
            .unwrap();
        ledger
            .record_transaction(&NewTransaction::transfer("alice", "bob", Coins::new(100)))
            .await
            .unwrap();

        let alice = ledger.get_transactions_for("alice").await.unwrap();
        assert_eq!(alice.len(), 3);
        assert!(alice.windows(2).all(|w| w[0].id < w[1].id));
        assert!(alice.iter().all(|tx| tx.involves("alice")));

        let bob = ledger.get_transactions_for("bob").await.unwrap();
        assert_eq!(bob.len(), 3);
    }

    #[tokio::test]
    async fn test_empty_history_for_known_user() {
        let db = setup().await;

        assert!(db.ledger().get_transactions_for("bob").await.unwrap().is_empty());
        assert!(db.ledger().get_purchased_items("bob").await.unwrap().is_empty());

        let err = db.ledger().get_transactions_for("ghost").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_purchased_items_keep_duplicates() {
        let db = setup().await;
        let ledger = db.ledger();

        for item in ["cup", "pen", "cup"] {
            ledger
                .record_transaction(&NewTransaction::purchase("alice", item, Coins::new(10)))
                .await
                .unwrap();
        }
        ledger
            .record_transaction(&NewTransaction::transfer("alice", "bob", Coins::new(1)))
            .await
            .unwrap();

        let items = ledger.get_purchased_items("alice").await.unwrap();
        assert_eq!(items, vec!["cup", "pen", "cup"]);
        assert!(ledger.get_purchased_items("bob").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_account_snapshot() {
        let db = setup().await;
        let ledger = db.ledger();

        ledger
            .record_transaction(&NewTransaction::purchase("alice", "cup", Coins::new(20)))
            .await
            .unwrap();
        ledger
            .record_transaction(&NewTransaction::transfer("bob", "alice", Coins::new(30)))
            .await
            .unwrap();
        ledger
            .record_transaction(&NewTransaction::transfer("alice", "bob", Coins::new(100)))
            .await
            .unwrap();

        let info = ledger.account_snapshot("alice").await.unwrap();
        assert_eq!(info.balance, Coins::new(910));
        assert_eq!(info.inventory, vec!["cup"]);
        assert_eq!(info.history.sent.len(), 2);
        assert_eq!(info.history.received.len(), 1);
        assert_eq!(
            Coins::new(1000) - info.history.total_sent() + info.history.total_received(),
            info.balance
        );

        let err = ledger.account_snapshot("ghost").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { ref id, .. } if id == "ghost"));
    }

    #[tokio::test]
    async fn test_foreign_key_backstop() {
        let db = setup().await;

        let err = sqlx::query(
            "INSERT INTO transactions (sender, receiver, amount, item, created_at) VALUES ('ghost', NULL, 5, 'cup', ?1)",
        )
        .bind(Utc::now())
        .execute(db.pool())
        .await
        .map_err(DbError::from)
        .unwrap_err();

        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
        assert_eq!(db.ledger().count().await.unwrap(), 0);
    }
}
