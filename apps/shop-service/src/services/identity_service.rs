//! Identity service.
//!
//! Turns credentials into tokens and tokens back into usernames.
//!
//! ## Login Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  login(username, password)                                              │
//! │       │                                                                 │
//! │       ├── format check failed ───────────────► InvalidOperation        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  find_user(username)                                                   │
//! │       │                                                                 │
//! │       ├── found ── argon2 verify ── ok ──────► token                   │
//! │       │                  └──────── mismatch ─► InvalidCredentials      │
//! │       │                                                                 │
//! │       └── absent                                                        │
//! │             ├── auto_register = false ───────► InvalidCredentials      │
//! │             └── auto_register = true                                    │
//! │                   hash + save_user(starting balance)                    │
//! │                     ├── inserted ────────────► token                   │
//! │                     └── UNIQUE lost race ────► verify against winner   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Argon2 is CPU-bound, so hashing and verification run on the blocking
//! thread pool.

use async_trait::async_trait;
use tracing::{info, warn};

use coinshop_core::validation::{validate_password, validate_username};
use coinshop_core::{Coins, CoreError, User, DEFAULT_STARTING_BALANCE};
use coinshop_db::{Database, DbError};

use crate::auth::{self, IssuedToken, JwtManager};
use crate::error::ServiceError;

/// The seam between the boundary and whatever authenticates callers.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchanges credentials for a token.
    async fn login(&self, username: &str, password: &str) -> Result<IssuedToken, ServiceError>;

    /// Returns the username a token was issued to.
    ///
    /// Fails with [`ServiceError::Unauthorized`] for forged, malformed or
    /// expired tokens.
    fn resolve_caller(&self, token: &str) -> Result<String, ServiceError>;
}

/// What happens when an unknown username logs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationPolicy {
    pub auto_register: bool,
    pub starting_balance: Coins,
}

impl Default for RegistrationPolicy {
    fn default() -> Self {
        RegistrationPolicy {
            auto_register: true,
            starting_balance: DEFAULT_STARTING_BALANCE,
        }
    }
}

/// Password + JWT identity backed by the ledger's user table.
pub struct IdentityService {
    db: Database,
    jwt: JwtManager,
    policy: RegistrationPolicy,
}

impl IdentityService {
    pub fn new(db: Database, jwt: JwtManager, policy: RegistrationPolicy) -> Self {
        IdentityService { db, jwt, policy }
    }

    pub fn policy(&self) -> RegistrationPolicy {
        self.policy
    }

    /// Checks `plaintext` against the stored hash. Unknown users never match.
    pub async fn verify_password(&self, username: &str, plaintext: &str) -> Result<bool, ServiceError> {
        match self.db.users().find_user(username).await? {
            Some(user) => verify_blocking(plaintext, user.password_hash).await,
            None => Ok(false),
        }
    }

    async fn login_existing(&self, user: User, password: &str) -> Result<IssuedToken, ServiceError> {
        if !verify_blocking(password, user.password_hash.clone()).await? {
            warn!(username = %user.username, "Invalid password");
            return Err(ServiceError::InvalidCredentials);
        }

        let issued = self.jwt.issue(&user.username, user.id)?;
        info!(username = %user.username, "User logged in");
        Ok(issued)
    }

    async fn register(&self, username: &str, password: &str) -> Result<IssuedToken, ServiceError> {
        let owned = password.to_string();
        let hash = tokio::task::spawn_blocking(move || auth::hash_password(&owned))
            .await
            .map_err(|e| ServiceError::Internal(format!("Password hashing task failed: {}", e)))??;

        match self
            .db
            .users()
            .save_user(username, &hash, self.policy.starting_balance)
            .await
        {
            Ok(id) => {
                info!(
                    username = %username,
                    balance = self.policy.starting_balance.amount(),
                    "Registered new user"
                );
                self.jwt.issue(username, id)
            }
            Err(DbError::UniqueViolation { .. }) => {
                // Someone registered the same name between our lookup and insert
                warn!(username = %username, "Concurrent registration, verifying against existing user");
                let user = self.db.users().get_user(username).await?;
                self.login_existing(user, password).await
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl IdentityProvider for IdentityService {
    async fn login(&self, username: &str, password: &str) -> Result<IssuedToken, ServiceError> {
        validate_username(username).map_err(CoreError::from)?;
        validate_password(password).map_err(CoreError::from)?;

        match self.db.users().find_user(username).await? {
            Some(user) => self.login_existing(user, password).await,
            None if self.policy.auto_register => self.register(username, password).await,
            None => {
                warn!(username = %username, "Login for unknown user with registration disabled");
                Err(ServiceError::InvalidCredentials)
            }
        }
    }

    fn resolve_caller(&self, token: &str) -> Result<String, ServiceError> {
        Ok(self.jwt.validate(token)?.sub)
    }
}

async fn verify_blocking(password: &str, hash: String) -> Result<bool, ServiceError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || auth::verify_password(&password, &hash))
        .await
        .map_err(|e| ServiceError::Internal(format!("Password verification task failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use coinshop_db::DbConfig;

    async fn service(policy: RegistrationPolicy) -> IdentityService {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        IdentityService::new(db, JwtManager::new("test-secret", 3600), policy)
    }

    #[tokio::test]
    async fn test_first_login_registers() {
        let identity = service(RegistrationPolicy::default()).await;

        let issued = identity.login("alice", "pw").await.unwrap();
        assert_eq!(identity.resolve_caller(&issued.token).unwrap(), "alice");

        let alice = identity.db.users().get_user("alice").await.unwrap();
        assert_eq!(alice.balance, Coins::new(1000));
        assert_ne!(alice.password_hash, "pw");
    }

    #[tokio::test]
    async fn test_second_login_does_not_reregister() {
        let identity = service(RegistrationPolicy::default()).await;

        identity.login("alice", "pw").await.unwrap();
        identity.login("alice", "pw").await.unwrap();

        assert_eq!(identity.db.users().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let identity = service(RegistrationPolicy::default()).await;
        identity.login("alice", "pw").await.unwrap();

        let err = identity.login("alice", "nope").await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidCredentials));
        assert_eq!(identity.db.users().count().await.unwrap(), 1);

        assert!(identity.verify_password("alice", "pw").await.unwrap());
        assert!(!identity.verify_password("alice", "nope").await.unwrap());
        assert!(!identity.verify_password("ghost", "pw").await.unwrap());
    }

    #[tokio::test]
    async fn test_registration_disabled() {
        let identity = service(RegistrationPolicy {
            auto_register: false,
            starting_balance: Coins::new(1000),
        })
        .await;

        let err = identity.login("alice", "pw").await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidCredentials));
        assert_eq!(identity.db.users().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_custom_starting_balance() {
        let identity = service(RegistrationPolicy {
            auto_register: true,
            starting_balance: Coins::new(42),
        })
        .await;

        identity.login("carol", "pw").await.unwrap();
        let carol = identity.db.users().get_user("carol").await.unwrap();
        assert_eq!(carol.balance, Coins::new(42));
    }

    #[tokio::test]
    async fn test_malformed_credentials() {
        let identity = service(RegistrationPolicy::default()).await;

        assert!(matches!(
            identity.login("", "pw").await,
            Err(ServiceError::InvalidOperation(_))
        ));
        assert!(matches!(
            identity.login("alice", "").await,
            Err(ServiceError::InvalidOperation(_))
        ));
        assert_eq!(identity.db.users().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_resolve_rejects_bad_tokens() {
        let identity = service(RegistrationPolicy::default()).await;
        assert!(matches!(
            identity.resolve_caller("garbage"),
            Err(ServiceError::Unauthorized)
        ));

        let foreign = JwtManager::new("other-secret", 3600).issue("alice", 1).unwrap();
        assert!(matches!(
            identity.resolve_caller(&foreign.token),
            Err(ServiceError::Unauthorized)
        ));
    }
}
