//! # Coins Module
//!
//! Provides the `Coins` type for every balance and transaction amount.
//!
//! ## Why a Newtype?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Coins are whole, indivisible units. There is no "half a coin".        │
//! │                                                                         │
//! │    balance: i64        ← any i64 can sneak in (ids, counts, ...)       │
//! │    balance: Coins      ← only amounts flow through coin arithmetic     │
//! │                                                                         │
//! │  Whether a debit fits is decided by the ledger's conditional UPDATE,   │
//! │  not by arithmetic on a value read earlier.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use coinshop_core::Coins;
//!
//! let start = Coins::new(1000);
//! let sent: Coins = [Coins::new(20), Coins::new(500)].into_iter().sum();
//! assert_eq!(start - sent, Coins::new(480));
//! assert_eq!(Coins::new(480).to_string(), "480 coins");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};

// =============================================================================
// Coins Type
// =============================================================================

/// An amount of coins.
///
/// Stored as `i64` so it maps straight onto an SQLite `INTEGER` column.
/// Balances are never negative; amounts moved by a transaction are always
/// strictly positive. Both rules are enforced by the ledger, this type only
/// carries the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[serde(transparent)]
pub struct Coins(i64);

impl Coins {
    /// Creates a coin amount.
    #[inline]
    pub const fn new(amount: i64) -> Self {
        Coins(amount)
    }

    /// Zero coins.
    #[inline]
    pub const fn zero() -> Self {
        Coins(0)
    }

    /// Returns the raw amount.
    #[inline]
    pub const fn amount(&self) -> i64 {
        self.0
    }

    /// Checks if the amount is strictly positive.
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the amount is negative.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} coins", self.0)
    }
}

impl From<i64> for Coins {
    fn from(amount: i64) -> Self {
        Coins(amount)
    }
}

impl From<Coins> for i64 {
    fn from(coins: Coins) -> Self {
        coins.0
    }
}

impl Add for Coins {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Coins(self.0 + other.0)
    }
}

impl AddAssign for Coins {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Coins {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Coins(self.0 - other.0)
    }
}

impl Sum for Coins {
    fn sum<I: Iterator<Item = Coins>>(iter: I) -> Self {
        iter.fold(Coins::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
