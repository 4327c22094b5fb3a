use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User role. Closed set, checked at compile time wherever it is matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "role", rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
    Disabled,
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

/// Study language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "language")]
pub enum Language {
    #[serde(rename = "CN")]
    #[sqlx(rename = "CN")]
    Chinese,
    #[serde(rename = "JA")]
    #[sqlx(rename = "JA")]
    Japanese,
    #[serde(rename = "KR")]
    #[sqlx(rename = "KR")]
    Korean,
    #[serde(rename = "ZH")]
    #[sqlx(rename = "ZH")]
    Mandarin,
    #[serde(rename = "DE")]
    #[sqlx(rename = "DE")]
    German,
}

/// Per-user preferences, stored as an opaque JSONB blob.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub languages: Vec<Language>,
    #[serde(default)]
    pub public_profile: bool,
}

/// User account.
///
/// The password hash never leaves the server: it is skipped on
/// serialization, so user snapshots embedded in tokens and API responses
/// carry an empty hash.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub display_name: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Role,
    #[sqlx(json)]
    pub preferences: Preferences,
}

impl User {
    /// Point-in-time copy safe to embed in a token or response body.
    pub fn snapshot(&self) -> User {
        let mut user = self.clone();
        user.password_hash = String::new();
        user
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_disabled(&self) -> bool {
        self.role == Role::Disabled
    }
}

/// Fields required to insert a user row.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub role: Role,
    pub preferences: Preferences,
}

/// A persisted refresh token.
///
/// `token_hash` is a one-way hash of the signed token; the plaintext is
/// delivered to the client exactly once and never stored. At most one row
/// per `(user_id, device_id)` pair has `invalidated_at = NULL`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RefreshToken {
    pub id: i64,
    pub user_id: i64,
    pub device_id: String,
    #[serde(skip_serializing)]
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub invalidated_at: Option<DateTime<Utc>>,
}

impl RefreshToken {
    pub fn is_active(&self) -> bool {
        self.invalidated_at.is_none()
    }
}

/// Discriminator embedded in every signed token so one claim schema can
/// never be parsed as the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenUse {
    Access,
    Refresh,
}

/// Claims carried by a short-lived access token.
///
/// The user snapshot is a point-in-time copy; later mutations are not
/// reflected until the token is refreshed. `refresh_token_id` is 0 when the
/// session has no refresh lineage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub user: User,
    pub refresh_token_id: i64,
    pub iat: i64,
    pub exp: i64,
    pub token_use: TokenUse,
}

/// Claims carried by a long-lived refresh token. The signature alone is
/// insufficient: the persisted, hashed row must exist, match, and be
/// non-invalidated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenClaims {
    pub user_id: i64,
    pub device_id: String,
    pub iat: i64,
    pub exp: i64,
    pub token_use: TokenUse,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"ADMIN\"");
        assert_eq!(
            serde_json::from_str::<Role>("\"DISABLED\"").unwrap(),
            Role::Disabled
        );
    }

    #[test]
    fn language_uses_wire_codes() {
        assert_eq!(serde_json::to_string(&Language::Japanese).unwrap(), "\"JA\"");
        assert_eq!(
            serde_json::from_str::<Language>("\"ZH\"").unwrap(),
            Language::Mandarin
        );
        assert!(serde_json::from_str::<Language>("\"XX\"").is_err());
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let user = User {
            id: 1,
            email: "a@example.com".to_string(),
            display_name: "a".to_string(),
            password_hash: "secret-hash".to_string(),
            role: Role::User,
            preferences: Preferences::default(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("password").is_none());
    }

    #[test]
    fn snapshot_strips_password_hash() {
        let user = User {
            id: 1,
            email: "a@example.com".to_string(),
            display_name: "a".to_string(),
            password_hash: "secret-hash".to_string(),
            role: Role::User,
            preferences: Preferences::default(),
        };

        assert!(user.snapshot().password_hash.is_empty());
        assert_eq!(user.snapshot().email, user.email);
    }
}
