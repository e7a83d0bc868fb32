//! # Coin Shop Service
//!
//! Transaction engine and identity for the coin shop.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Shop Service                                    │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  ShopService (boundary)                                          │  │
//! │  │  • authenticate   • purchase   • transfer   • account_info       │  │
//! │  └───────────┬──────────────────────────────────────┬───────────────┘  │
//! │              │ resolve_caller / login               │                  │
//! │  ┌───────────▼────────────┐            ┌────────────▼───────────────┐  │
//! │  │  IdentityService       │            │  TransactionService        │  │
//! │  │  • argon2 passwords    │            │  • Catalog prices          │  │
//! │  │  • HS256 JWT           │            │  • transfer rules          │  │
//! │  │  • auto-registration   │            │  • history / inventory     │  │
//! │  └───────────┬────────────┘            └────────────┬───────────────┘  │
//! │              └──────────────────┬───────────────────┘                  │
//! │                                 ▼                                       │
//! │                    coinshop-db (SQLite ledger)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! See [`config`]. Environment variables use the `COINSHOP__` prefix:
//! - `COINSHOP__DATABASE__PATH` - SQLite file (default: `coinshop.db`)
//! - `COINSHOP__AUTH__JWT_SECRET` - Secret for JWT signing
//! - `COINSHOP__AUTH__TOKEN_TTL_SECS` - Token lifetime (default: 3600)
//! - `COINSHOP__AUTH__STARTING_BALANCE` - Coins for new users (default: 1000)
//! - `COINSHOP__AUTH__AUTO_REGISTER` - Register on first login (default: true)
//! - `COINSHOP__LOG__ENV` - `local`, `dev` or `prod`

pub mod auth;
pub mod config;
pub mod error;
pub mod services;
pub mod telemetry;

// Re-exports
pub use config::ShopConfig;
pub use error::{ErrorResponse, ServiceError};
pub use services::identity_service::{IdentityProvider, IdentityService, RegistrationPolicy};
pub use services::shop_service::{AuthResponse, InfoResponse, ShopService};
pub use services::transaction_service::TransactionService;
