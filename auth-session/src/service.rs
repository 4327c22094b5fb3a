//! Session orchestration: the login, refresh, and re-authenticate flows.

use crate::error::{AuthError, Result};
use crate::models::{AccessTokenClaims, NewUser, Preferences, RefreshTokenClaims, Role, User};
use crate::password::PasswordHasher;
use crate::refresh::RefreshTokenService;
use crate::repository::UserRepository;
use crate::tokens::TokenIssuer;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Registration payload. The role is never client-supplied; every new
/// account starts as a regular user.
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub email: String,
    pub display_name: String,
    pub password: String,
    #[serde(default)]
    pub preferences: Preferences,
}

/// Login payload. `device_id` is an opaque client string identifying one
/// logical installation; it anchors the refresh-token lineage.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub device_id: String,
}

/// Token pair handed to a client. The refresh token is present only on the
/// flows that create or rotate a lineage.
#[derive(Debug, Clone, Serialize)]
pub struct SessionTokens {
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub user: User,
}

/// Minimal structural check; the mailbox is never probed.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.is_empty()
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain.contains('.')
        && !email.chars().any(char::is_whitespace)
        && !domain.contains('@')
}

pub struct SessionService {
    users: Arc<dyn UserRepository>,
    refresh: RefreshTokenService,
    hasher: PasswordHasher,
    issuer: Arc<TokenIssuer>,
}

impl SessionService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        refresh: RefreshTokenService,
        issuer: Arc<TokenIssuer>,
    ) -> Self {
        Self {
            users,
            refresh,
            hasher: PasswordHasher::new(),
            issuer,
        }
    }

    /// Register a new account. Duplicate emails and malformed fields are
    /// validation failures; a hashing failure is internal.
    pub async fn register(&self, registration: Registration) -> Result<User> {
        if !is_valid_email(&registration.email) {
            return Err(AuthError::Validation("invalid `email` supplied".into()));
        }
        if registration.display_name.trim().is_empty() {
            return Err(AuthError::Validation(
                "invalid `display_name` supplied".into(),
            ));
        }
        if registration.password.is_empty() {
            return Err(AuthError::Validation("invalid `password` supplied".into()));
        }

        if self
            .users
            .find_by_email(&registration.email)
            .await?
            .is_some()
        {
            return Err(AuthError::EmailAlreadyInUse);
        }

        let password_hash = self.hasher.hash(&registration.password)?;

        let user = self
            .users
            .create(NewUser {
                email: registration.email,
                display_name: registration.display_name,
                password_hash,
                role: Role::User,
                preferences: registration.preferences,
            })
            .await?;

        info!(user_id = user.id, "registered new user");

        Ok(user.snapshot())
    }

    /// Login with credentials. Starts a fresh refresh lineage for the device
    /// and returns the token pair.
    ///
    /// Unknown email, wrong password, and a disabled account are one uniform
    /// failure; nothing distinguishes them externally.
    pub async fn login(&self, request: &LoginRequest) -> Result<SessionTokens> {
        if request.device_id.trim().is_empty() {
            return Err(AuthError::Validation("invalid `device_id` supplied".into()));
        }

        let user = self
            .users
            .find_by_email(&request.email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !self.hasher.verify(&user.password_hash, &request.password)? {
            return Err(AuthError::InvalidCredentials);
        }
        if user.is_disabled() {
            return Err(AuthError::InvalidCredentials);
        }

        let (refresh_token, row) = self.refresh.generate(user.id, &request.device_id).await?;
        let token = self.issuer.issue_access(&user, row.id)?;

        info!(user_id = user.id, "login succeeded");

        Ok(SessionTokens {
            token,
            refresh_token: Some(refresh_token),
            user: user.snapshot(),
        })
    }

    /// Re-issue an access token for the holder of a still-valid one. The
    /// refresh-token state is left untouched, but a session whose backing
    /// refresh token has been invalidated is denied.
    pub async fn refresh_access(&self, claims: &AccessTokenClaims) -> Result<SessionTokens> {
        let user = self
            .users
            .find_by_id(claims.user.id)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if user.is_disabled() {
            return Err(AuthError::InvalidCredentials);
        }

        // Stale-session detection: deny once the backing lineage is gone.
        if claims.refresh_token_id != 0 {
            let row = match self.refresh.get(claims.refresh_token_id).await {
                Ok(row) => row,
                Err(AuthError::RefreshTokenNotFound) => {
                    return Err(AuthError::SessionInvalidated)
                }
                Err(e) => return Err(e),
            };
            if !row.is_active() {
                info!(user_id = user.id, "denied token refresh for invalidated session");
                return Err(AuthError::SessionInvalidated);
            }
        }

        let token = self.issuer.issue_access(&user, claims.refresh_token_id)?;

        Ok(SessionTokens {
            token,
            refresh_token: None,
            user: user.snapshot(),
        })
    }

    /// Exchange a refresh token for a fresh access token after the old
    /// access token expired. The refresh token is rotated: the presented one
    /// is invalidated and a new one returned in the same unit of work.
    pub async fn reauthenticate(
        &self,
        claims: &RefreshTokenClaims,
        presented: &str,
    ) -> Result<SessionTokens> {
        self.refresh.verify(claims, presented).await?;

        let user = self
            .users
            .find_by_id(claims.user_id)
            .await?
            .ok_or(AuthError::InvalidRefreshToken)?;

        if user.is_disabled() {
            return Err(AuthError::InvalidCredentials);
        }

        let (refresh_token, row) = self.refresh.generate(user.id, &claims.device_id).await?;
        let token = self.issuer.issue_access(&user, row.id)?;

        info!(user_id = user.id, "re-authenticated with refresh token");

        Ok(SessionTokens {
            token,
            refresh_token: Some(refresh_token),
            user: user.snapshot(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenConfig;
    use crate::memory::{InMemoryRefreshTokenRepository, InMemoryUserRepository};

    fn service() -> (SessionService, Arc<TokenIssuer>, Arc<InMemoryUserRepository>) {
        let issuer = Arc::new(TokenIssuer::new(TokenConfig::new("test-secret")));
        let users = Arc::new(InMemoryUserRepository::new());
        let refresh = RefreshTokenService::new(
            issuer.clone(),
            Arc::new(InMemoryRefreshTokenRepository::new()),
        );
        (
            SessionService::new(users.clone(), refresh, issuer.clone()),
            issuer,
            users,
        )
    }

    fn registration(email: &str) -> Registration {
        Registration {
            email: email.to_string(),
            display_name: "logger".to_string(),
            password: "password".to_string(),
            preferences: Preferences::default(),
        }
    }

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
            device_id: "6db435f352d7ea4a67807a3feb447bf7".to_string(),
        }
    }

    #[tokio::test]
    async fn register_then_login() {
        let (service, _, _) = service();

        let user = service.register(registration("a@x.com")).await.unwrap();
        assert_eq!(user.role, Role::User);
        assert!(user.password_hash.is_empty());

        let tokens = service.login(&login_request("a@x.com", "password")).await.unwrap();
        assert!(!tokens.token.is_empty());
        assert!(tokens.refresh_token.is_some());
        assert!(tokens.user.password_hash.is_empty());
    }

    #[tokio::test]
    async fn login_failures_are_uniform() {
        let (service, _, users) = service();
        service.register(registration("a@x.com")).await.unwrap();

        let wrong_password = service.login(&login_request("a@x.com", "nope")).await;
        let no_such_user = service.login(&login_request("b@x.com", "password")).await;

        assert!(matches!(wrong_password, Err(AuthError::InvalidCredentials)));
        assert!(matches!(no_such_user, Err(AuthError::InvalidCredentials)));

        // A disabled account fails the same way.
        let mut user = users.find_by_email("a@x.com").await.unwrap().unwrap();
        user.role = Role::Disabled;
        users.update(&user).await.unwrap();

        let disabled = service.login(&login_request("a@x.com", "password")).await;
        assert!(matches!(disabled, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let (service, _, _) = service();
        service.register(registration("a@x.com")).await.unwrap();

        assert!(matches!(
            service.register(registration("a@x.com")).await,
            Err(AuthError::EmailAlreadyInUse)
        ));
    }

    #[tokio::test]
    async fn refresh_reissues_without_touching_the_lineage() {
        let (service, issuer, _) = service();
        service.register(registration("a@x.com")).await.unwrap();
        let tokens = service.login(&login_request("a@x.com", "password")).await.unwrap();

        let claims = issuer.decode_access(&tokens.token).unwrap();
        let refreshed = service.refresh_access(&claims).await.unwrap();

        assert!(!refreshed.token.is_empty());
        assert!(refreshed.refresh_token.is_none());

        // The original refresh token still re-authenticates.
        let refresh_plain = tokens.refresh_token.unwrap();
        let refresh_claims = issuer.decode_refresh(&refresh_plain).unwrap();
        assert!(service
            .reauthenticate(&refresh_claims, &refresh_plain)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn refresh_is_denied_once_the_lineage_rotates() {
        let (service, issuer, _) = service();
        service.register(registration("a@x.com")).await.unwrap();

        let first = service.login(&login_request("a@x.com", "password")).await.unwrap();
        // Second login on the same device invalidates the first lineage.
        service.login(&login_request("a@x.com", "password")).await.unwrap();

        let stale_claims = issuer.decode_access(&first.token).unwrap();
        assert!(matches!(
            service.refresh_access(&stale_claims).await,
            Err(AuthError::SessionInvalidated)
        ));
    }

    #[tokio::test]
    async fn reauthenticate_rotates_the_refresh_token() {
        let (service, issuer, _) = service();
        service.register(registration("a@x.com")).await.unwrap();
        let tokens = service.login(&login_request("a@x.com", "password")).await.unwrap();

        let old_plain = tokens.refresh_token.unwrap();
        let old_claims = issuer.decode_refresh(&old_plain).unwrap();

        let renewed = service.reauthenticate(&old_claims, &old_plain).await.unwrap();
        assert!(renewed.refresh_token.is_some());

        // The presented token was invalidated by the rotation.
        assert!(matches!(
            service.reauthenticate(&old_claims, &old_plain).await,
            Err(AuthError::InvalidRefreshToken)
        ));

        // The newly issued one works.
        let new_plain = renewed.refresh_token.unwrap();
        let new_claims = issuer.decode_refresh(&new_plain).unwrap();
        assert!(service.reauthenticate(&new_claims, &new_plain).await.is_ok());
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last@sub.example.org"));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("register_test@invalid##"));
        assert!(!is_valid_email("no-at-sign.example.com"));
        assert!(!is_valid_email("a@"));
        assert!(!is_valid_email("@x.com"));
        assert!(!is_valid_email("a b@x.com"));
    }
}
