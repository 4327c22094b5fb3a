//! HTTP request handlers, one module per resource.

pub mod health;
pub mod logs;
pub mod session;
pub mod users;
