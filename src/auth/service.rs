//! Registration, login and account administration.
//!
//! [`AuthService`] orchestrates the user store, the password hasher and the token
//! issuer. Handlers call it; it never touches HTTP types.
//!
//! Username uniqueness is checked before hashing and enforced again by the store on
//! insert, so a concurrent duplicate still ends in `DuplicateUsername`. The
//! first-user-becomes-admin rule reads the store's record count and then inserts as two
//! separate calls: two registrations racing into an empty store can both become admin.
//! Deployments that accept concurrent registrations should seed the first admin
//! out of band.

use std::sync::Arc;

use chrono::Duration;
use tokio::sync::OnceCell;

use crate::auth::password::PasswordHasher;
use crate::auth::token::TokenIssuer;
use crate::error::AppError;
use crate::models::{NewUser, Role, User, UserUpdate};
use crate::store::UserStore;

pub struct AuthService {
    store: Arc<dyn UserStore>,
    hasher: PasswordHasher,
    issuer: TokenIssuer,
    enforce_activation: bool,
    /// Hash checked against when the username is unknown, so a miss costs one bcrypt
    /// round like a hit does.
    decoy_hash: OnceCell<String>,
}

const DECOY_PASSWORD: &str = "rolegate-decoy-password";

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>, hasher: PasswordHasher, issuer: TokenIssuer) -> Self {
        Self {
            store,
            hasher,
            issuer,
            enforce_activation: true,
            decoy_hash: OnceCell::new(),
        }
    }

    /// Whether `login` refuses deactivated accounts. On by default.
    pub fn with_activation_enforced(mut self, enforce: bool) -> Self {
        self.enforce_activation = enforce;
        self
    }

    pub fn token_ttl(&self) -> Duration {
        self.issuer.ttl()
    }

    /// Registers a new account. The first account in an empty store is an admin,
    /// every later one a regular user.
    pub async fn register(&self, username: &str, password: &str) -> Result<User, AppError> {
        self.create_account(username, password, None).await
    }

    /// Registers a new admin account. Callers must already hold the admin role.
    pub async fn register_admin(&self, username: &str, password: &str) -> Result<User, AppError> {
        self.create_account(username, password, Some(Role::Admin))
            .await
    }

    async fn create_account(
        &self,
        username: &str,
        password: &str,
        forced_role: Option<Role>,
    ) -> Result<User, AppError> {
        if self.store.find_by_username(username).await?.is_some() {
            return Err(AppError::DuplicateUsername(username.to_string()));
        }

        let password_hash = self.hasher.hash_blocking(password.to_string()).await?;

        let role = match forced_role {
            Some(role) => role,
            None => {
                if self.store.count().await? == 0 {
                    log::info!("bootstrapping first account '{}' as admin", username);
                    Role::Admin
                } else {
                    Role::User
                }
            }
        };

        let user = self
            .store
            .insert(NewUser {
                username: username.to_string(),
                password_hash,
                role,
                active: true,
            })
            .await?;

        log::info!("registered '{}' with role {}", user.username, user.role);
        Ok(user)
    }

    /// Checks credentials and returns a signed token.
    ///
    /// Fails with `NotFound` for an unknown username, `InvalidCredentials` for a wrong
    /// password and, when activation is enforced, `AccountDeactivated` for an inactive
    /// account with a correct password.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, AppError> {
        let user = match self.store.find_by_username(username).await? {
            Some(user) => user,
            None => {
                self.verify_decoy(password).await?;
                return Err(AppError::NotFound(format!("User '{}' not found", username)));
            }
        };

        let matches = self
            .hasher
            .verify_blocking(password.to_string(), user.password_hash.clone())
            .await?;
        if !matches {
            log::warn!("failed login for '{}'", username);
            return Err(AppError::InvalidCredentials);
        }

        if self.enforce_activation && !user.active {
            log::warn!("login refused for deactivated account '{}'", username);
            return Err(AppError::AccountDeactivated(username.to_string()));
        }

        self.issuer.issue(&user)
    }

    async fn verify_decoy(&self, password: &str) -> Result<(), AppError> {
        let decoy = self
            .decoy_hash
            .get_or_try_init(|| self.hasher.hash_blocking(DECOY_PASSWORD.to_string()))
            .await?;
        self.hasher
            .verify_blocking(password.to_string(), decoy.clone())
            .await?;
        Ok(())
    }

    /// Marks the account active. Activating an active account is a no-op.
    pub async fn activate(&self, username: &str) -> Result<(), AppError> {
        self.store
            .update_fields(username, UserUpdate::active(true))
            .await?;
        log::info!("activated '{}'", username);
        Ok(())
    }

    /// Marks the account inactive. Deactivating an inactive account is a no-op.
    pub async fn deactivate(&self, username: &str) -> Result<(), AppError> {
        self.store
            .update_fields(username, UserUpdate::active(false))
            .await?;
        log::info!("deactivated '{}'", username);
        Ok(())
    }

    /// Grants the admin role.
    pub async fn promote(&self, username: &str) -> Result<(), AppError> {
        self.store
            .update_fields(username, UserUpdate::role(Role::Admin))
            .await?;
        log::info!("promoted '{}' to admin", username);
        Ok(())
    }

    /// Fetches the account behind `username`.
    pub async fn find_user(&self, username: &str) -> Result<User, AppError> {
        self.store
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User '{}' not found", username)))
    }
}
