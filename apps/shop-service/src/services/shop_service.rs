//! Shop boundary.
//!
//! The four operations the API Surface exposes, taking raw bearer tokens and
//! returning serde-ready DTOs:
//!
//! ```text
//! ┌──────────────────────────┬───────────────────────────────────────────┐
//! │ POST /api/auth           │ authenticate(username, password)          │
//! │ GET  /api/buy/{item}     │ purchase(token, item)                     │
//! │ POST /api/sendCoin       │ transfer(token, to_user, amount)          │
//! │ GET  /api/info           │ account_info(token)                       │
//! └──────────────────────────┴───────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use coinshop_core::{AccountInfo, Coins, TransactionKind};
use coinshop_db::Database;

use crate::auth::JwtManager;
use crate::config::{ConfigError, ShopConfig};
use crate::error::ServiceError;
use crate::services::identity_service::{IdentityProvider, IdentityService, RegistrationPolicy};
use crate::services::transaction_service::TransactionService;

// =============================================================================
// DTOs
// =============================================================================

/// `POST /api/auth` body.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthResponse {
    pub token: String,
}

/// `POST /api/sendCoin` body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendCoinRequest {
    pub to_user: String,
    pub amount: i64,
}

/// `GET /api/info` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoResponse {
    pub coins: i64,
    pub inventory: Vec<String>,
    pub coin_history: CoinHistoryResponse,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoinHistoryResponse {
    pub received: Vec<ReceivedEntry>,
    /// Peer transfers only; purchases show up in `inventory`.
    pub sent: Vec<SentEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedEntry {
    pub from_user: String,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentEntry {
    pub to_user: String,
    pub amount: i64,
}

impl From<AccountInfo> for InfoResponse {
    fn from(info: AccountInfo) -> Self {
        let received = info
            .history
            .received
            .into_iter()
            .map(|tx| ReceivedEntry {
                from_user: tx.sender,
                amount: tx.amount.amount(),
            })
            .collect();

        let sent = info
            .history
            .sent
            .into_iter()
            .filter(|tx| tx.kind() == TransactionKind::Transfer)
            .filter_map(|tx| {
                let amount = tx.amount.amount();
                tx.receiver.map(|to_user| SentEntry { to_user, amount })
            })
            .collect();

        InfoResponse {
            coins: info.balance.amount(),
            inventory: info.inventory,
            coin_history: CoinHistoryResponse { received, sent },
        }
    }
}

// =============================================================================
// Service
// =============================================================================

/// Entry point for the API Surface.
///
/// Generic over the identity seam so tests and alternative deployments can
/// swap how callers are authenticated.
pub struct ShopService<I = IdentityService> {
    identity: Arc<I>,
    engine: TransactionService,
}

impl ShopService<IdentityService> {
    /// Wires identity and engine from configuration over an open database.
    pub fn from_config(db: Database, config: &ShopConfig) -> Result<Self, ConfigError> {
        let catalog = Arc::new(config.build_catalog()?);
        let jwt = JwtManager::new(&config.auth.jwt_secret, config.auth.token_ttl_secs);
        let policy = RegistrationPolicy {
            auto_register: config.auth.auto_register,
            starting_balance: config.starting_balance(),
        };

        Ok(ShopService::new(
            Arc::new(IdentityService::new(db.clone(), jwt, policy)),
            TransactionService::new(db, catalog),
        ))
    }
}

impl<I: IdentityProvider> ShopService<I> {
    pub fn new(identity: Arc<I>, engine: TransactionService) -> Self {
        ShopService { identity, engine }
    }

    pub fn engine(&self) -> &TransactionService {
        &self.engine
    }

    pub fn identity(&self) -> &I {
        &self.identity
    }

    /// Logs in, registering unknown users when the policy allows.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<AuthResponse, ServiceError> {
        let issued = self.identity.login(username, password).await?;
        Ok(AuthResponse {
            token: issued.token,
        })
    }

    pub async fn purchase(&self, token: &str, item: &str) -> Result<(), ServiceError> {
        let caller = self.identity.resolve_caller(token)?;
        debug!(caller = %caller, item = %item, "Purchase request");

        self.engine.purchase(&caller, item).await?;
        Ok(())
    }

    pub async fn transfer(&self, token: &str, to_user: &str, amount: i64) -> Result<(), ServiceError> {
        let caller = self.identity.resolve_caller(token)?;
        debug!(caller = %caller, to_user = %to_user, amount = amount, "Transfer request");

        self.engine.transfer(&caller, to_user, Coins::new(amount)).await?;
        Ok(())
    }

    pub async fn account_info(&self, token: &str) -> Result<InfoResponse, ServiceError> {
        let caller = self.identity.resolve_caller(token)?;
        debug!(caller = %caller, "Info request");

        Ok(self.engine.account_info(&caller).await?.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use coinshop_core::{CoinHistory, Transaction};

    fn tx(id: i64, sender: &str, receiver: Option<&str>, item: Option<&str>, amount: i64) -> Transaction {
        Transaction {
            id,
            sender: sender.to_string(),
            receiver: receiver.map(str::to_string),
            item: item.map(str::to_string),
            amount: Coins::new(amount),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_info_response_shape() {
        let info = AccountInfo {
            balance: Coins::new(480),
            inventory: vec!["cup".to_string()],
            history: CoinHistory::partition(
                "alice",
                vec![
                    tx(1, "alice", None, Some("cup"), 20),
                    tx(2, "alice", Some("bob"), None, 500),
                    tx(3, "carol", Some("alice"), None, 7),
                ],
            ),
        };

        let json = serde_json::to_value(InfoResponse::from(info)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "coins": 480,
                "inventory": ["cup"],
                "coinHistory": {
                    "received": [{ "fromUser": "carol", "amount": 7 }],
                    "sent": [{ "toUser": "bob", "amount": 500 }]
                }
            })
        );
    }

    #[tokio::test]
    async fn test_from_config_wires_catalog_and_policy() {
        use std::io::Write;

        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(
            b"[auth]\nstarting_balance = 250\nauto_register = false\n\n[catalog]\nsticker = 5\nmug = 25\n",
        )
        .unwrap();
        let config = ShopConfig::load_from(Some(file.path())).unwrap();

        let db = Database::new(coinshop_db::DbConfig::in_memory()).await.unwrap();
        let shop: ShopService = ShopService::from_config(db, &config).unwrap();

        let items: Vec<(&str, Coins)> = shop.engine().catalog().items().collect();
        assert_eq!(items, vec![("mug", Coins::new(25)), ("sticker", Coins::new(5))]);
        assert_eq!(
            shop.identity().policy(),
            RegistrationPolicy {
                auto_register: false,
                starting_balance: Coins::new(250),
            }
        );
    }

    #[test]
    fn test_send_coin_request_is_camel_case() {
        let req: SendCoinRequest = serde_json::from_str(r#"{"toUser":"bob","amount":100}"#).unwrap();
        assert_eq!(req.to_user, "bob");
        assert_eq!(req.amount, 100);
    }
}
