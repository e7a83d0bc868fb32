//! Service implementations.
//!
//! - [`identity_service`] - Login, registration policy, token resolution
//! - [`transaction_service`] - Purchases, transfers and account views
//! - [`shop_service`] - The boundary the API Surface calls, plus its DTOs

pub mod identity_service;
pub mod shop_service;
pub mod transaction_service;
