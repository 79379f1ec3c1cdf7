use crate::error::AppError;
use bcrypt::{hash, verify};

/// Lowest work factor bcrypt accepts.
pub const MIN_COST: u32 = 4;
/// Highest work factor bcrypt accepts.
pub const MAX_COST: u32 = 31;
/// bcrypt only reads this many bytes of input; longer passwords are refused
/// rather than silently truncated.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Salted bcrypt hashing at a fixed work factor.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl PasswordHasher {
    /// Returns `AppError::Config` if `cost` is outside bcrypt's 4..=31 range.
    pub fn new(cost: u32) -> Result<Self, AppError> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(AppError::Config(format!(
                "bcrypt cost must be between {} and {}, got {}",
                MIN_COST,
                MAX_COST,
                cost
            )));
        }
        Ok(Self { cost })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hashes `password` with a fresh random salt.
    ///
    /// Passwords longer than [`MAX_PASSWORD_BYTES`] are `AppError::Validation`.
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(AppError::Validation(format!(
                "password must be at most {} bytes",
                MAX_PASSWORD_BYTES
            )));
        }
        hash(password, self.cost)
            .map_err(|e| AppError::Hashing(format!("Failed to hash password: {}", e)))
    }

    /// Checks `password` against a stored hash.
    ///
    /// A mismatch is `Ok(false)`. A stored value that is not a bcrypt hash is
    /// `AppError::MalformedHash`. A password longer than [`MAX_PASSWORD_BYTES`]
    /// can never have been hashed and is a mismatch.
    pub fn verify(&self, password: &str, hashed_password: &str) -> Result<bool, AppError> {
        if password.len() > MAX_PASSWORD_BYTES {
            return Ok(false);
        }
        verify(password, hashed_password).map_err(AppError::from)
    }

    /// [`hash`](Self::hash) on the blocking thread pool.
    pub async fn hash_blocking(&self, password: String) -> Result<String, AppError> {
        let hasher = *self;
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
    }

    /// [`verify`](Self::verify) on the blocking thread pool.
    pub async fn verify_blocking(
        &self,
        password: String,
        hashed_password: String,
    ) -> Result<bool, AppError> {
        let hasher = *self;
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hashed_password))
            .await
            .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))?
    }
}
