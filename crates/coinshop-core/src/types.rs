//! # Domain Types
//!
//! Core domain types of the coin ledger.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────────┐   ┌─────────────────┐   │
//! │  │      User       │   │    Transaction      │   │  CoinHistory    │   │
//! │  │  ─────────────  │   │  ─────────────────  │   │  ─────────────  │   │
//! │  │  id             │   │  id (insert order)  │   │  sent           │   │
//! │  │  username       │◄──│  sender             │   │  received       │   │
//! │  │  password_hash  │◄──│  receiver?          │   └─────────────────┘   │
//! │  │  balance        │   │  item?              │                         │
//! │  └─────────────────┘   │  amount             │   ┌─────────────────┐   │
//! │                        └─────────────────────┘   │  AccountInfo    │   │
//! │                                                  │  balance        │   │
//! │  receiver = None  → purchase (coins leave)       │  inventory      │   │
//! │  item     = None  → peer transfer                │  history        │   │
//! │                                                  └─────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::coins::Coins;

/// Database identifier of a user row.
pub type UserId = i64;

/// Database identifier of a transaction row. Monotonic in insertion order.
pub type TransactionId = i64;

// =============================================================================
// User
// =============================================================================

/// A registered user and their current balance.
#[derive(Clone)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: UserId,

    /// Unique, immutable login name.
    pub username: String,

    /// Argon2 PHC string. Opaque to the ledger.
    pub password_hash: String,

    /// Current balance, never negative.
    pub balance: Coins,

    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"<redacted>")
            .field("balance", &self.balance)
            .field("created_at", &self.created_at)
            .finish()
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// An immutable ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Transaction {
    pub id: TransactionId,
    pub sender: String,
    /// `None` for catalog purchases.
    pub receiver: Option<String>,
    /// `None` for peer transfers.
    pub item: Option<String>,
    pub amount: Coins,
    pub created_at: DateTime<Utc>,
}

/// What a transaction represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Coins spent on a catalog item.
    Purchase,
    /// Coins moved to another user.
    Transfer,
}

impl Transaction {
    /// Returns whether this is a purchase or a transfer.
    pub fn kind(&self) -> TransactionKind {
        if self.receiver.is_some() {
            TransactionKind::Transfer
        } else {
            TransactionKind::Purchase
        }
    }

    /// Checks whether `username` took part in this transaction.
    pub fn involves(&self, username: &str) -> bool {
        self.sender == username || self.receiver.as_deref() == Some(username)
    }
}

// =============================================================================
// New Transaction
// =============================================================================

/// A coin movement that has been validated by the engine and is ready for the
/// ledger store.
///
/// The constructors are the only way to build one, so a purchase can never
/// carry a receiver and a transfer can never carry an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    sender: String,
    receiver: Option<String>,
    item: Option<String>,
    amount: Coins,
}

impl NewTransaction {
    /// A catalog purchase. `price` must come from the catalog.
    pub fn purchase(buyer: impl Into<String>, item: impl Into<String>, price: Coins) -> Self {
        NewTransaction {
            sender: buyer.into(),
            receiver: None,
            item: Some(item.into()),
            amount: price,
        }
    }

    /// A peer transfer.
    pub fn transfer(sender: impl Into<String>, receiver: impl Into<String>, amount: Coins) -> Self {
        NewTransaction {
            sender: sender.into(),
            receiver: Some(receiver.into()),
            item: None,
            amount,
        }
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn receiver(&self) -> Option<&str> {
        self.receiver.as_deref()
    }

    pub fn item(&self) -> Option<&str> {
        self.item.as_deref()
    }

    pub fn amount(&self) -> Coins {
        self.amount
    }

    pub fn kind(&self) -> TransactionKind {
        if self.receiver.is_some() {
            TransactionKind::Transfer
        } else {
            TransactionKind::Purchase
        }
    }
}

// =============================================================================
// Coin History
// =============================================================================

/// A user's transactions split by direction.
///
/// Purchases land in `sent`: the coins left the user's account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinHistory {
    pub sent: Vec<Transaction>,
    pub received: Vec<Transaction>,
}

impl CoinHistory {
    /// Partitions `transactions` from the point of view of `username`.
    ///
    /// Input order is preserved within each side. Transactions the user did
    /// not take part in are ignored.
    pub fn partition(username: &str, transactions: Vec<Transaction>) -> Self {
        let mut history = CoinHistory::default();
        for tx in transactions {
            if tx.receiver.as_deref() == Some(username) {
                history.received.push(tx);
            } else if tx.sender == username {
                history.sent.push(tx);
            }
        }
        history
    }

    /// Total coins that left the account.
    pub fn total_sent(&self) -> Coins {
        self.sent.iter().map(|tx| tx.amount).sum()
    }

    /// Total coins that arrived from other users.
    pub fn total_received(&self) -> Coins {
        self.received.iter().map(|tx| tx.amount).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sent.is_empty() && self.received.is_empty()
    }
}

// =============================================================================
// Account Info
// =============================================================================

/// Everything a user can see about their own account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub balance: Coins,
    /// Purchased item names, one entry per purchase, oldest first.
    pub inventory: Vec<String>,
    pub history: CoinHistory,
}

// =============================================================================
// Unit Tests
// =============================================================================
