//! Session and credential lifecycle for Lexilog
//!
//! This crate owns the only subsystem of the API with real invariants:
//! short-lived signed access tokens, long-lived rotating refresh tokens,
//! password hashing, and the login/refresh/re-authenticate flows that
//! compose them.
//!
//! - [`password`] — one-way adaptive hashing (Argon2id) with constant-time
//!   verification
//! - [`tokens`] — HS256-signed access and refresh claims with independent
//!   verification configurations
//! - [`refresh`] — the refresh-token state machine: generate, atomic
//!   rotation, hash-backed verification
//! - [`service`] — the session orchestrator composing the above
//! - [`repository`] — storage traits, implemented over Postgres by the
//!   server crate and over memory by [`memory`] for tests and development

pub mod config;
pub mod error;
pub mod memory;
pub mod models;
pub mod password;
pub mod refresh;
pub mod repository;
pub mod service;
pub mod tokens;

pub use config::TokenConfig;
pub use error::{AuthError, Result};
pub use models::*;
pub use password::PasswordHasher;
pub use refresh::RefreshTokenService;
pub use repository::{RefreshTokenRepository, UserRepository};
pub use service::{is_valid_email, LoginRequest, Registration, SessionService, SessionTokens};
pub use tokens::TokenIssuer;
