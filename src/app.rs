//! Wiring from [`Config`] to the shared pieces every worker needs.

use std::sync::Arc;

use actix_web::web;

use crate::auth::token::ttl_from_secs;
use crate::auth::{AuthService, PasswordHasher, TokenIssuer, TokenVerifier};
use crate::config::Config;
use crate::error::AppError;
use crate::store::{MemoryUserStore, PgUserStore, UserStore};

/// State shared by all workers: the workflow as app data and the verifier
/// handed to every `RequireRole`.
#[derive(Clone)]
pub struct AuthState {
    pub service: web::Data<AuthService>,
    pub verifier: Arc<TokenVerifier>,
}

impl AuthState {
    /// Builds issuer, verifier and workflow over `store`.
    ///
    /// Fails on an empty secret, an out-of-range TTL or bcrypt cost; all are fatal at startup.
    pub fn new(config: &Config, store: Arc<dyn UserStore>) -> Result<Self, AppError> {
        let hasher = PasswordHasher::new(config.bcrypt_cost)?;
        let issuer = TokenIssuer::new(&config.jwt_secret, ttl_from_secs(config.token_ttl_secs)?)?;
        let verifier = Arc::new(TokenVerifier::new(&config.jwt_secret)?);

        let service = AuthService::new(store, hasher, issuer)
            .with_activation_enforced(config.enforce_activation);

        Ok(Self {
            service: web::Data::new(service),
            verifier,
        })
    }
}

/// Picks the store named by the config: Postgres when `DATABASE_URL` is set,
/// otherwise an empty in-memory store.
pub async fn connect_store(config: &Config) -> Result<Arc<dyn UserStore>, AppError> {
    match &config.database_url {
        Some(url) => {
            let store = PgUserStore::connect(url).await?;
            log::info!("using Postgres user store");
            Ok(Arc::new(store))
        }
        None => {
            log::warn!("DATABASE_URL not set, using in-memory user store");
            Ok(Arc::new(MemoryUserStore::new()))
        }
    }
}
