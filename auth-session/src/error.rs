use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Bad email/password pair or a disabled account. Deliberately a single
    /// variant so the client cannot distinguish the cases.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Access token failed signature, expiry, or schema checks.
    #[error("Invalid token")]
    InvalidToken,

    /// Refresh token failed verification: no active row, invalidated row, or
    /// hash mismatch. One variant for all three, by design.
    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    /// The refresh token backing this session has been invalidated.
    #[error("Session invalidated")]
    SessionInvalidated,

    #[error("User not found")]
    UserNotFound,

    #[error("Refresh token not found")]
    RefreshTokenNotFound,

    #[error("Email already in use")]
    EmailAlreadyInUse,

    #[error("Password hashing error")]
    Hashing,

    #[error("Token signing error: {0}")]
    Signing(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type Result<T> = std::result::Result<T, AuthError>;
