use serde::{Deserialize, Serialize};

/// Token issuing configuration.
///
/// The signing secret is injected here at construction and never read from
/// ambient global state. The same secret signs both access and refresh
/// tokens; the two claim schemas are verified independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    pub jwt_secret: String,
    pub access_token_ttl_secs: i64,
    pub refresh_token_ttl_days: i64,
}

impl TokenConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            ..Self::default()
        }
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "development-secret".to_string(),
            // 1 hour
            access_token_ttl_secs: 3600,
            // 1 year
            refresh_token_ttl_days: 365,
        }
    }
}
