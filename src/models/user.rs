use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Represents the role granted to an account.
/// Corresponds to the `user_role` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access, including account administration.
    Admin,
    /// Regular account.
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses the exact lowercase role names. `"Admin"` is rejected.
impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// A user record as held by the user store.
///
/// `password_hash` is never serialized; use [`UserView`] for responses.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    /// Store-assigned identifier, immutable after creation.
    pub id: Uuid,
    /// Unique login name.
    pub username: String,
    /// bcrypt hash of the password.
    pub password_hash: String,
    pub role: Role,
    /// Login is refused while this is `false`.
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Record handed to the store on registration.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub active: bool,
}

/// Field set for partial updates. `None` leaves the column untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub role: Option<Role>,
    pub active: Option<bool>,
}

impl UserUpdate {
    pub fn role(role: Role) -> Self {
        Self {
            role: Some(role),
            ..Self::default()
        }
    }

    pub fn active(active: bool) -> Self {
        Self {
            active: Some(active),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.role.is_none() && self.active.is_none()
    }

    /// Applies the set fields to `user` in place.
    pub fn apply(&self, user: &mut User) {
        if let Some(role) = self.role {
            user.role = role;
        }
        if let Some(active) = self.active {
            user.active = active;
        }
    }
}

/// Public projection of a [`User`], safe to return from handlers.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct UserView {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
            active: user.active,
            created_at: user.created_at,
        }
    }
}
