//! Database access layer for Lexilog
//!
//! Wraps the sqlx Postgres pool with the tuning the server expects and
//! exposes a health check used by the `/health` endpoint. All queries issued
//! through this pool are parameterized; no user input is ever interpolated
//! into SQL text.

pub mod connection;
pub mod error;

pub use connection::DatabasePool;
pub use error::{DatabaseError, DatabaseResult};
