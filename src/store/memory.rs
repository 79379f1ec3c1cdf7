use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, UserStore};
use crate::models::{NewUser, User, UserUpdate};

/// In-process user store keyed by username.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn insert(&self, new_user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.contains_key(&new_user.username) {
            return Err(StoreError::Conflict(new_user.username));
        }

        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username,
            password_hash: new_user.password_hash,
            role: new_user.role,
            active: new_user.active,
            created_at: Utc::now(),
        };
        users.insert(user.username.clone(), user.clone());
        Ok(user)
    }

    async fn update_fields(&self, username: &str, update: UserUpdate) -> Result<(), StoreError> {
        if update.is_empty() {
            if self.users.read().await.contains_key(username) {
                return Ok(());
            }
            return Err(StoreError::NotFound(username.to_string()));
        }

        let mut users = self.users.write().await;
        match users.get_mut(username) {
            Some(user) => {
                update.apply(user);
                Ok(())
            }
            None => Err(StoreError::NotFound(username.to_string())),
        }
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.users.read().await.len() as u64)
    }
}
