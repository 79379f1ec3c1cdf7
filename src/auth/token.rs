use crate::error::AppError;
use crate::models::{Role, User};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The only algorithm tokens are signed and accepted with.
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// Default lifetime of an issued token.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 60 * 60;

/// Longest lifetime a token may be issued with: one year.
pub const MAX_TOKEN_TTL_SECS: i64 = 365 * 24 * 60 * 60;

/// Converts a TTL in seconds, rejecting values outside `1..=MAX_TOKEN_TTL_SECS`.
pub fn ttl_from_secs(secs: i64) -> Result<Duration, AppError> {
    if !(1..=MAX_TOKEN_TTL_SECS).contains(&secs) {
        return Err(AppError::Config(format!(
            "token TTL must be between 1 and {} seconds, got {}",
            MAX_TOKEN_TTL_SECS, secs
        )));
    }
    Ok(Duration::seconds(secs))
}

/// Represents the claims encoded within a JWT (JSON Web Token).
///
/// Every field is required when decoding; a token missing any of them, or
/// carrying a role outside [`Role`], is rejected.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject of the token, the user's unique identifier.
    pub sub: Uuid,
    pub username: String,
    pub role: Role,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

impl Claims {
    /// Builds the claim set for `user`, valid for `ttl` from `now`.
    ///
    /// Fails with `AppError::Signing` if the expiry falls outside the representable range.
    pub fn for_user(user: &User, now: DateTime<Utc>, ttl: Duration) -> Result<Self, AppError> {
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AppError::Signing("token expiry out of range".into()))?;
        Ok(Self {
            sub: user.id,
            username: user.username.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        })
    }
}

fn require_secret(secret: &str) -> Result<&[u8], AppError> {
    if secret.is_empty() {
        return Err(AppError::Signing("JWT secret must not be empty".into()));
    }
    Ok(secret.as_bytes())
}

/// Mints signed, time-bounded tokens.
///
/// Holds the signing key for the lifetime of the process.
#[derive(Clone)]
pub struct TokenIssuer {
    key: EncodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    /// Returns `AppError::Signing` for an empty secret and `AppError::Config` for a
    /// `ttl` that is not positive or exceeds [`MAX_TOKEN_TTL_SECS`].
    pub fn new(secret: &str, ttl: Duration) -> Result<Self, AppError> {
        let secret = require_secret(secret)?;
        if ttl <= Duration::zero() || ttl > Duration::seconds(MAX_TOKEN_TTL_SECS) {
            return Err(AppError::Config(format!(
                "token TTL must be between 1 and {} seconds",
                MAX_TOKEN_TTL_SECS
            )));
        }
        Ok(Self {
            key: EncodingKey::from_secret(secret),
            ttl,
        })
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a token for `user`, expiring `ttl` from now.
    pub fn issue(&self, user: &User) -> Result<String, AppError> {
        self.sign(&Claims::for_user(user, Utc::now(), self.ttl)?)
    }

    /// Signs an arbitrary claim set.
    pub fn sign(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::new(TOKEN_ALGORITHM), claims, &self.key)
            .map_err(|e| AppError::Signing(format!("Failed to generate token: {}", e)))
    }
}

/// Verifies tokens minted by a [`TokenIssuer`] sharing the same secret.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Returns `AppError::Signing` for an empty secret.
    pub fn new(secret: &str) -> Result<Self, AppError> {
        let secret = require_secret(secret)?;

        // `Validation::new` restricts the accepted algorithms to exactly this one.
        let mut validation = Validation::new(TOKEN_ALGORITHM);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            key: DecodingKey::from_secret(secret),
            validation,
        })
    }

    /// Verifies signature, algorithm and expiry, then decodes the claims.
    ///
    /// Every failure is `AppError::InvalidToken`; the payload names the cause for
    /// logging only.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AppError::InvalidToken(format!("{:?}", e.kind())))
    }
}
