pub mod extractors;
pub mod middleware;
pub mod password;
pub mod service;
pub mod token;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::Validate;

// Re-export necessary items
pub use extractors::AuthenticatedUser;
pub use middleware::{bearer_token, RequireRole};
pub use password::PasswordHasher;
pub use service::AuthService;
pub use token::{Claims, TokenIssuer, TokenVerifier};

lazy_static! {
    // Regex for username validation: alphanumeric, underscores, hyphens
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// Represents the payload for a user login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 32))]
    pub username: String,
    #[validate(length(min = 6, max = 72))]
    pub password: String,
}

/// Represents the payload for a new account registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Desired username for the new account.
    /// Must be between 3 and 32 characters, alphanumeric, and can include underscores or hyphens.
    #[validate(
        length(min = 3, max = 32),
        regex(
            path = "USERNAME_REGEX",
            message = "Username must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub username: String,
    /// Password for the new account.
    /// Must be between 6 and 72 characters long.
    #[validate(length(min = 6, max = 72))]
    pub password: String,
}

/// Response structure after a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// The signed bearer token.
    pub token: String,
    /// Seconds until the token expires.
    pub expires_in: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_login_request_validation() {
        let valid_login = LoginRequest {
            username: "alice".to_string(),
            password: "password123".to_string(),
        };
        assert!(valid_login.validate().is_ok());

        let empty_username = LoginRequest {
            username: "".to_string(),
            password: "password123".to_string(),
        };
        assert!(empty_username.validate().is_err());

        let short_password_login = LoginRequest {
            username: "alice".to_string(),
            password: "123".to_string(),
        };
        assert!(short_password_login.validate().is_err());
    }

    #[test]
    fn test_register_request_validation() {
        let valid_register = RegisterRequest {
            username: "test_user-123".to_string(),
            password: "password123".to_string(),
        };
        assert!(valid_register.validate().is_ok());

        let invalid_username_register = RegisterRequest {
            username: "test user!".to_string(), // Contains space and exclamation
            password: "password123".to_string(),
        };
        assert!(invalid_username_register.validate().is_err());

        let short_username_register = RegisterRequest {
            username: "tu".to_string(),
            password: "password123".to_string(),
        };
        assert!(short_username_register.validate().is_err());

        let long_username_register = RegisterRequest {
            username: "a".repeat(33),
            password: "password123".to_string(),
        };
        assert!(long_username_register.validate().is_err());

        let long_password_register = RegisterRequest {
            username: "test_user".to_string(),
            password: "a".repeat(73),
        };
        assert!(long_password_register.validate().is_err());
    }
}
