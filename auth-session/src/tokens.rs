//! Signed token issuing and verification.
//!
//! Both token kinds are HS256-signed with the same process-wide secret but
//! carry distinct claim schemas verified under separate configurations. A
//! token signed under one schema is rejected by the decoder for the other:
//! the required fields differ and every token carries a `token_use`
//! discriminator that is checked explicitly, never inferred.

use crate::config::TokenConfig;
use crate::error::{AuthError, Result};
use crate::models::{AccessTokenClaims, RefreshTokenClaims, TokenUse, User};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

pub struct TokenIssuer {
    config: TokenConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_validation: Validation,
    refresh_validation: Validation,
}

impl TokenIssuer {
    pub fn new(config: TokenConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        // Separate verification configurations per claim schema.
        let access_validation = Validation::new(Algorithm::HS256);
        let refresh_validation = Validation::new(Algorithm::HS256);

        Self {
            config,
            encoding_key,
            decoding_key,
            access_validation,
            refresh_validation,
        }
    }

    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    /// Mint a short-lived access token embedding a point-in-time user
    /// snapshot with the password hash stripped. `refresh_token_id` is 0
    /// when the session has no refresh lineage.
    pub fn issue_access(&self, user: &User, refresh_token_id: i64) -> Result<String> {
        let now = Utc::now();
        let claims = AccessTokenClaims {
            user: user.snapshot(),
            refresh_token_id,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.config.access_token_ttl_secs)).timestamp(),
            token_use: TokenUse::Access,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Mint a long-lived refresh token for one `(user, device)` lineage.
    pub fn issue_refresh(&self, user_id: i64, device_id: &str) -> Result<String> {
        let now = Utc::now();
        let claims = RefreshTokenClaims {
            user_id,
            device_id: device_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::days(self.config.refresh_token_ttl_days)).timestamp(),
            token_use: TokenUse::Refresh,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Verify signature and expiry of an access token and return its claims.
    pub fn decode_access(&self, token: &str) -> Result<AccessTokenClaims> {
        let data = decode::<AccessTokenClaims>(token, &self.decoding_key, &self.access_validation)
            .map_err(|_| AuthError::InvalidToken)?;

        if data.claims.token_use != TokenUse::Access {
            return Err(AuthError::InvalidToken);
        }

        Ok(data.claims)
    }

    /// Verify signature and expiry of a refresh token and return its claims.
    /// The caller must still verify the claims against the persisted hash.
    pub fn decode_refresh(&self, token: &str) -> Result<RefreshTokenClaims> {
        let data = decode::<RefreshTokenClaims>(token, &self.decoding_key, &self.refresh_validation)
            .map_err(|_| AuthError::InvalidToken)?;

        if data.claims.token_use != TokenUse::Refresh {
            return Err(AuthError::InvalidToken);
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Preferences, Role};

    fn test_user() -> User {
        User {
            id: 7,
            email: "a@example.com".to_string(),
            display_name: "a".to_string(),
            password_hash: "argon2-hash".to_string(),
            role: Role::User,
            preferences: Preferences::default(),
        }
    }

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(TokenConfig::new("test-secret"))
    }

    #[test]
    fn access_token_round_trip_strips_password() {
        let issuer = issuer();
        let token = issuer.issue_access(&test_user(), 3).unwrap();
        let claims = issuer.decode_access(&token).unwrap();

        assert_eq!(claims.user.id, 7);
        assert_eq!(claims.refresh_token_id, 3);
        assert!(claims.user.password_hash.is_empty());
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn refresh_token_round_trip() {
        let issuer = issuer();
        let token = issuer.issue_refresh(7, "device-1").unwrap();
        let claims = issuer.decode_refresh(&token).unwrap();

        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.device_id, "device-1");
    }

    #[test]
    fn schema_confusion_is_rejected_both_ways() {
        let issuer = issuer();
        let access = issuer.issue_access(&test_user(), 0).unwrap();
        let refresh = issuer.issue_refresh(7, "device-1").unwrap();

        assert!(matches!(
            issuer.decode_refresh(&access),
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(
            issuer.decode_access(&refresh),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn expired_access_token_is_rejected() {
        let mut config = TokenConfig::new("test-secret");
        config.access_token_ttl_secs = -3600;
        let issuer = TokenIssuer::new(config);

        let token = issuer.issue_access(&test_user(), 0).unwrap();
        assert!(matches!(
            issuer.decode_access(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let token = issuer().issue_access(&test_user(), 0).unwrap();
        let other = TokenIssuer::new(TokenConfig::new("other-secret"));

        assert!(matches!(
            other.decode_access(&token),
            Err(AuthError::InvalidToken)
        ));
    }
}
