//! # Repository Module
//!
//! Ledger store repositories.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Layout                                    │
//! │                                                                         │
//! │  TransactionService / IdentityService                                  │
//! │       │                                                                 │
//! │       │  db.ledger().record_transaction(&tx)                           │
//! │       ▼                                                                 │
//! │  UserRepository                  LedgerRepository                      │
//! │  ├── get_user                    ├── record_transaction  (writes)      │
//! │  ├── find_user                   ├── get_transactions_for              │
//! │  ├── save_user                   ├── get_purchased_items               │
//! │  └── count                       └── total_balance                     │
//! │       │                                 │                               │
//! │       └──────────────┬──────────────────┘                               │
//! │                      ▼                                                  │
//! │               SQLite Database                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`UserRepository`](user::UserRepository) - Lookup and registration
//! - [`LedgerRepository`](ledger::LedgerRepository) - Atomic coin movements and history

pub mod ledger;
pub mod user;
