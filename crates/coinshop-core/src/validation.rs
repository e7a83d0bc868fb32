//! # Validation Module
//!
//! Input validation for the coin shop.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: API Surface (external)                                       │
//! │  └── JSON shape, required fields                                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Engine / Identity (Rust)                                     │
//! │  └── THIS MODULE: usernames, passwords, amounts, item names            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── UNIQUE (username)                                                 │
//! │  ├── CHECK (balance >= 0), CHECK (amount > 0)                          │
//! │  └── Foreign keys on sender / receiver                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::coins::Coins;
use crate::error::ValidationError;
use crate::{MAX_PASSWORD_LEN, MAX_USERNAME_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a username.
///
/// ## Rules
/// - Must not be empty
/// - At most [`MAX_USERNAME_LEN`] characters
/// - Letters, digits, `-`, `_` and `.` only (no whitespace)
///
/// ## Example
/// ```rust
/// use coinshop_core::validation::validate_username;
///
/// assert!(validate_username("alice").is_ok());
/// assert!(validate_username("").is_err());
/// assert!(validate_username("al ice").is_err());
/// ```
pub fn validate_username(username: &str) -> ValidationResult<()> {
    if username.is_empty() {
        return Err(ValidationError::Required {
            field: "username".to_string(),
        });
    }

    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(ValidationError::TooLong {
            field: "username".to_string(),
            max: MAX_USERNAME_LEN,
        });
    }

    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')
    {
        return Err(ValidationError::InvalidFormat {
            field: "username".to_string(),
            reason: "must contain only letters, numbers, '-', '_' and '.'".to_string(),
        });
    }

    Ok(())
}

/// Validates a plaintext password before hashing or verification.
///
/// ## Rules
/// - Must not be empty
/// - At most [`MAX_PASSWORD_LEN`] characters
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }

    if password.chars().count() > MAX_PASSWORD_LEN {
        return Err(ValidationError::TooLong {
            field: "password".to_string(),
            max: MAX_PASSWORD_LEN,
        });
    }

    Ok(())
}

/// Validates a catalog item name.
///
/// ## Rules
/// - Must not be empty
/// - Lowercase letters, digits and `-` only (e.g. `pink-hoody`)
pub fn validate_item_name(item: &str) -> ValidationResult<()> {
    if item.is_empty() {
        return Err(ValidationError::Required {
            field: "item".to_string(),
        });
    }

    if !item
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(ValidationError::InvalidFormat {
            field: "item".to_string(),
            reason: "must contain only lowercase letters, digits and '-'".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a transfer amount.
///
/// ## Rules
/// - Must be positive (> 0)
///
/// ## Example
/// ```rust
/// use coinshop_core::{validation::validate_transfer_amount, Coins};
///
/// assert!(validate_transfer_amount(Coins::new(100)).is_ok());
/// assert!(validate_transfer_amount(Coins::zero()).is_err());
/// assert!(validate_transfer_amount(Coins::new(-5)).is_err());
/// ```
pub fn validate_transfer_amount(amount: Coins) -> ValidationResult<()> {
    if !amount.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "amount".to_string(),
        });
    }

    Ok(())
}

/// Validates the balance granted to new accounts.
pub fn validate_starting_balance(balance: Coins) -> ValidationResult<()> {
    if balance.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "starting balance".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("alice").is_ok());
        assert!(validate_username("bob_99").is_ok());
        assert!(validate_username("first.last-2").is_ok());

        assert!(validate_username("").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username("semi;colon").is_err());
        assert!(validate_username(&"a".repeat(MAX_USERNAME_LEN + 1)).is_err());
        assert!(validate_username(&"a".repeat(MAX_USERNAME_LEN)).is_ok());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("hunter2").is_ok());
        assert!(validate_password("").is_err());
        assert!(validate_password(&"p".repeat(MAX_PASSWORD_LEN + 1)).is_err());
    }

    #[test]
    fn test_validate_item_name() {
        assert!(validate_item_name("pink-hoody").is_ok());
        assert!(validate_item_name("t-shirt").is_ok());
        assert!(validate_item_name("").is_err());
        assert!(validate_item_name("Cup").is_err());
        assert!(validate_item_name("cup ").is_err());
    }

    #[test]
    fn test_validate_transfer_amount() {
        assert!(validate_transfer_amount(Coins::new(1)).is_ok());
        assert!(validate_transfer_amount(Coins::zero()).is_err());
        assert!(validate_transfer_amount(Coins::new(-100)).is_err());
    }

    #[test]
    fn test_validate_starting_balance() {
        assert!(validate_starting_balance(Coins::zero()).is_ok());
        assert!(validate_starting_balance(Coins::new(1000)).is_ok());
        assert!(validate_starting_balance(Coins::new(-1)).is_err());
    }
}
