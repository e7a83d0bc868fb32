//! Transaction engine.
//!
//! Applies the shop's rules in front of the ledger store:
//!
//! ```text
//! purchase(buyer, item)                 transfer(sender, receiver, amount)
//!      │                                     │
//!      ├─ price = catalog.price_of(item)     ├─ amount > 0
//!      │                                     ├─ sender != receiver
//!      │                                     ├─ receiver name well-formed
//!      ▼                                     ▼
//!  NewTransaction::purchase            NewTransaction::transfer
//!      │                                     │
//!      └──────────────┬──────────────────────┘
//!                     ▼
//!        ledger.record_transaction   (receiver → sender → funds, atomic)
//! ```
//!
//! Every read is derived from the ledger; nothing here caches balances.
//! `account_info` reads all three parts inside one read transaction.

use std::sync::Arc;

use tracing::{info, warn};

use coinshop_core::validation::{validate_transfer_amount, validate_username};
use coinshop_core::{
    AccountInfo, Catalog, CoinHistory, Coins, CoreError, NewTransaction, TransactionId,
};
use coinshop_db::{Database, DbError};

use crate::error::ServiceError;

/// Purchases, transfers and account views over the ledger.
#[derive(Debug, Clone)]
pub struct TransactionService {
    db: Database,
    catalog: Arc<Catalog>,
}

impl TransactionService {
    pub fn new(db: Database, catalog: Arc<Catalog>) -> Self {
        TransactionService { db, catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Buys one `item` at its catalog price.
    pub async fn purchase(&self, buyer: &str, item: &str) -> Result<TransactionId, ServiceError> {
        let price = self.catalog.price_of(item).map_err(|e| {
            warn!(buyer = %buyer, item = %item, "Purchase of unknown item");
            ServiceError::from(e)
        })?;

        let new_tx = NewTransaction::purchase(buyer, item, price);
        let id = self.record(&new_tx).await?;

        info!(id = id, buyer = %buyer, item = %item, price = price.amount(), "Purchase completed");
        Ok(id)
    }

    /// Moves `amount` coins from `sender` to `receiver`.
    ///
    /// ## Errors
    /// - `InvalidOperation` - non-positive amount, self-transfer, unknown receiver
    /// - `InsufficientFunds` - sender balance below `amount`
    /// - `UserNotFound` - sender has no account
    pub async fn transfer(
        &self,
        sender: &str,
        receiver: &str,
        amount: Coins,
    ) -> Result<TransactionId, ServiceError> {
        validate_transfer_amount(amount).map_err(CoreError::from)?;

        if sender == receiver {
            return Err(CoreError::invalid_operation("cannot transfer coins to yourself").into());
        }

        validate_username(receiver).map_err(CoreError::from)?;

        let new_tx = NewTransaction::transfer(sender, receiver, amount);
        let id = match self.record(&new_tx).await {
            Ok(id) => id,
            Err(DbError::NotFound { id, .. }) if id == receiver => {
                warn!(sender = %sender, receiver = %receiver, "Transfer to unknown recipient");
                return Err(ServiceError::InvalidOperation("unknown recipient".to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        info!(
            id = id,
            sender = %sender,
            receiver = %receiver,
            amount = amount.amount(),
            "Transfer completed"
        );
        Ok(id)
    }

    /// Current balance.
    pub async fn balance(&self, username: &str) -> Result<Coins, ServiceError> {
        Ok(self.db.users().get_user(username).await?.balance)
    }

    /// Purchased items, one entry per purchase, oldest first.
    pub async fn inventory(&self, username: &str) -> Result<Vec<String>, ServiceError> {
        Ok(self.db.ledger().get_purchased_items(username).await?)
    }

    /// The user's transactions split into sent and received.
    pub async fn history(&self, username: &str) -> Result<CoinHistory, ServiceError> {
        let transactions = self.db.ledger().get_transactions_for(username).await?;
        Ok(CoinHistory::partition(username, transactions))
    }

    /// Balance, inventory and history read from one ledger snapshot, so the
    /// balance always agrees with the history it is shown next to.
    pub async fn account_info(&self, username: &str) -> Result<AccountInfo, ServiceError> {
        Ok(self.db.ledger().account_snapshot(username).await?)
    }

    async fn record(&self, new_tx: &NewTransaction) -> Result<TransactionId, DbError> {
        self.db.ledger().record_transaction(new_tx).await.map_err(|e| {
            if let DbError::InsufficientFunds {
                available,
                requested,
                ..
            } = &e
            {
                warn!(
                    sender = %new_tx.sender(),
                    available = available.amount(),
                    requested = requested.amount(),
                    "Rejected for insufficient funds"
                );
            }
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coinshop_db::DbConfig;

    async fn engine() -> TransactionService {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        for name in ["alice", "bob"] {
            db.users().save_user(name, "h", Coins::new(1000)).await.unwrap();
        }
        TransactionService::new(db, Arc::new(Catalog::default()))
    }

    #[tokio::test]
    async fn test_purchase_uses_catalog_price() {
        let engine = engine().await;

        engine.purchase("alice", "cup").await.unwrap();
        engine.purchase("alice", "cup").await.unwrap();

        assert_eq!(engine.balance("alice").await.unwrap(), Coins::new(960));
        assert_eq!(engine.inventory("alice").await.unwrap(), vec!["cup", "cup"]);
    }

    #[tokio::test]
    async fn test_purchase_unknown_item() {
        let engine = engine().await;

        let err = engine.purchase("alice", "yacht").await.unwrap_err();
        assert!(matches!(err, ServiceError::UnknownItem(ref item) if item == "yacht"));
        assert_eq!(engine.balance("alice").await.unwrap(), Coins::new(1000));
    }

    #[tokio::test]
    async fn test_purchase_exact_balance() {
        let engine = engine().await;
        engine.transfer("alice", "bob", Coins::new(500)).await.unwrap();

        engine.purchase("alice", "pink-hoody").await.unwrap();
        assert_eq!(engine.balance("alice").await.unwrap(), Coins::zero());

        let err = engine.purchase("alice", "pen").await.unwrap_err();
        assert!(matches!(err, ServiceError::InsufficientFunds { .. }));
    }

    #[tokio::test]
    async fn test_transfer_rejections() {
        let engine = engine().await;

        for amount in [0, -5] {
            let err = engine.transfer("alice", "bob", Coins::new(amount)).await.unwrap_err();
            assert!(matches!(err, ServiceError::InvalidOperation(_)));
        }

        let err = engine.transfer("alice", "alice", Coins::new(10)).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidOperation(_)));

        assert_eq!(engine.balance("alice").await.unwrap(), Coins::new(1000));
        assert!(engine.history("alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_recipient_checked_before_funds() {
        let engine = engine().await;

        let err = engine.transfer("alice", "ghost", Coins::new(5000)).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidOperation(ref m) if m == "unknown recipient"));
    }

    #[tokio::test]
    async fn test_missing_sender() {
        let engine = engine().await;

        let err = engine.transfer("ghost", "bob", Coins::new(1)).await.unwrap_err();
        assert!(matches!(err, ServiceError::UserNotFound(ref u) if u == "ghost"));

        let err = engine.account_info("ghost").await.unwrap_err();
        assert!(matches!(err, ServiceError::UserNotFound(_)));
    }

    #[tokio::test]
    async fn test_account_info() {
        let engine = engine().await;

        engine.purchase("alice", "book").await.unwrap();
        engine.transfer("bob", "alice", Coins::new(25)).await.unwrap();
        engine.transfer("alice", "bob", Coins::new(100)).await.unwrap();

        let info = engine.account_info("alice").await.unwrap();
        assert_eq!(info.balance, Coins::new(875));
        assert_eq!(info.inventory, vec!["book"]);
        assert_eq!(info.history.sent.len(), 2);
        assert_eq!(info.history.received.len(), 1);
        assert_eq!(info.history.received[0].sender, "bob");
        assert_eq!(info.history.total_sent(), Coins::new(150));
    }
}
