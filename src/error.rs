//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the service.
//! It carries the full authentication and authorization taxonomy, from a missing
//! `Authorization` header to a user-store failure, so every layer reports failures
//! with the same type.
//!
//! `AppError` implements `actix_web::error::ResponseError` to turn failures into
//! HTTP responses with JSON bodies. Token failures all render the same message so a
//! caller never learns why verification failed. Server-side failures render a generic
//! message; the detail goes to the log.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::json;
use validator::ValidationErrors;

use crate::store::StoreError;

/// Represents all possible errors that can occur within the service.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The request carried no usable credentials (HTTP 401).
    /// Missing `Authorization` header, wrong scheme or a malformed header value.
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),
    /// The bearer token failed signature, algorithm, expiry or claim-shape checks (HTTP 401).
    /// The payload is the internal cause and is only ever logged.
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    /// The token is valid but its role does not satisfy the route (HTTP 403).
    #[error("Forbidden: {0}")]
    Forbidden(String),
    /// Registration attempted with a username that already exists (HTTP 409).
    #[error("Username already exists: {0}")]
    DuplicateUsername(String),
    /// Password did not match the stored hash (HTTP 401).
    #[error("Invalid credentials")]
    InvalidCredentials,
    /// No user record for the given username (HTTP 404).
    #[error("Not Found: {0}")]
    NotFound(String),
    /// Credentials were correct but the account is deactivated (HTTP 403).
    #[error("Account deactivated: {0}")]
    AccountDeactivated(String),
    /// The user store failed (HTTP 500).
    #[error("Store Error: {0}")]
    Store(String),
    /// bcrypt could not produce a hash (HTTP 500).
    #[error("Hashing Error: {0}")]
    Hashing(String),
    /// A stored password hash is not a valid bcrypt string (HTTP 500).
    #[error("Malformed password hash: {0}")]
    MalformedHash(String),
    /// A token could not be signed (HTTP 500).
    #[error("Signing Error: {0}")]
    Signing(String),
    /// Process configuration is missing or invalid. Fatal at startup.
    #[error("Configuration Error: {0}")]
    Config(String),
    /// Request payload failed validation (HTTP 422 Unprocessable Entity).
    #[error("Validation Error: {0}")]
    Validation(String),
    /// Any other unexpected server-side failure (HTTP 500).
    #[error("Internal Server Error: {0}")]
    Internal(String),
}

impl AppError {
    /// Message safe to show to the caller.
    fn public_message(&self) -> String {
        match self {
            AppError::Unauthenticated(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Validation(msg) => msg.clone(),
            AppError::InvalidToken(_) => "Invalid token".into(),
            AppError::DuplicateUsername(username) => {
                format!("Username '{}' already exists", username)
            }
            AppError::InvalidCredentials => "Invalid credentials".into(),
            AppError::AccountDeactivated(_) => "Account is deactivated".into(),
            AppError::Store(_)
            | AppError::Hashing(_)
            | AppError::MalformedHash(_)
            | AppError::Signing(_)
            | AppError::Config(_)
            | AppError::Internal(_) => "Internal server error".into(),
        }
    }
}

/// Converts `AppError` variants into `HttpResponse` objects.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated(_)
            | AppError::InvalidToken(_)
            | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) | AppError::AccountDeactivated(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DuplicateUsername(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Store(_)
            | AppError::Hashing(_)
            | AppError::MalformedHash(_)
            | AppError::Signing(_)
            | AppError::Config(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("{}", self);
        } else {
            log::debug!("request rejected: {}", self);
        }
        HttpResponse::build(status).json(json!({
            "error": self.public_message()
        }))
    }
}

/// Converts `StoreError` into `AppError`.
///
/// `StoreError::NotFound` keeps its meaning; a uniqueness conflict surfaces as
/// `DuplicateUsername`. Everything else is an opaque store failure.
impl From<StoreError> for AppError {
    fn from(error: StoreError) -> AppError {
        match error {
            StoreError::NotFound(username) => {
                AppError::NotFound(format!("User '{}' not found", username))
            }
            StoreError::Conflict(username) => AppError::DuplicateUsername(username),
            StoreError::Backend(msg) => AppError::Store(msg),
        }
    }
}

/// Converts `validator::ValidationErrors` into `AppError::Validation`.
impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::Validation(error.to_string())
    }
}

/// Converts `bcrypt::BcryptError` into `AppError`.
///
/// A hash that bcrypt cannot parse is reported as `MalformedHash`; anything else
/// is a hashing failure.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        match error {
            bcrypt::BcryptError::InvalidHash(_)
            | bcrypt::BcryptError::InvalidPrefix(_)
            | bcrypt::BcryptError::InvalidCost(_)
            | bcrypt::BcryptError::InvalidBase64(_) => AppError::MalformedHash(error.to_string()),
            _ => AppError::Hashing(error.to_string()),
        }
    }
}
