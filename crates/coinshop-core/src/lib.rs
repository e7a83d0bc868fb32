//! # coinshop-core: Pure Business Logic for the Coin Shop
//!
//! This crate holds the rules of the coin economy as pure functions and
//! plain types. Nothing in here touches a database or the network.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Coin Shop Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              API Surface (HTTP adapter, external)               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │     shop-service: ShopService / TransactionService / Identity   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ coinshop-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   coins   │  │  catalog  │  │ validation│  │   │
//! │  │   │   User    │  │   Coins   │  │  Catalog  │  │   rules   │  │   │
//! │  │   │Transaction│  │           │  │ price_of  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 coinshop-db (Ledger Store)                      │   │
//! │  │        SQLite users + transactions, atomic coin movements        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (User, Transaction, CoinHistory, ...)
//! - [`coins`] - Integer coin amounts
//! - [`catalog`] - Immutable item → price table
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Example Usage
//!
//! ```rust
//! use coinshop_core::{Catalog, Coins};
//!
//! let catalog = Catalog::default();
//! assert_eq!(catalog.price_of("cup").unwrap(), Coins::new(20));
//! assert!(catalog.price_of("yacht").is_err());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod coins;
pub mod error;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use catalog::Catalog;
pub use coins::Coins;
pub use error::{CoreError, CoreResult, ValidationError};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Coins granted to a user when their account is first provisioned.
pub const DEFAULT_STARTING_BALANCE: Coins = Coins::new(1000);

/// Maximum username length accepted at login.
pub const MAX_USERNAME_LEN: usize = 64;

/// Maximum password length accepted at login. Checked before hashing.
pub const MAX_PASSWORD_LEN: usize = 128;
