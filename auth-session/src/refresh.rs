//! Refresh token lifecycle: generate, rotate, verify.
//!
//! Each `(user, device)` pair moves through absent → active → invalidated;
//! invalidation is terminal for a row and a new active row supersedes it.
//! Only a one-way hash of the signed token is persisted, so a database
//! compromise cannot be replayed into live sessions.

use crate::error::{AuthError, Result};
use crate::models::{RefreshToken, RefreshTokenClaims};
use crate::repository::RefreshTokenRepository;
use crate::tokens::TokenIssuer;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use subtle::ConstantTimeEq;

pub struct RefreshTokenService {
    issuer: Arc<TokenIssuer>,
    repo: Arc<dyn RefreshTokenRepository>,
}

impl RefreshTokenService {
    pub fn new(issuer: Arc<TokenIssuer>, repo: Arc<dyn RefreshTokenRepository>) -> Self {
        Self { issuer, repo }
    }

    /// Issue a new signed refresh token for the pair and atomically rotate
    /// it into place: any previously active row is invalidated in the same
    /// unit of work that inserts the new one.
    ///
    /// The plaintext is returned to be delivered once over the response
    /// channel; only its hash is stored.
    pub async fn generate(&self, user_id: i64, device_id: &str) -> Result<(String, RefreshToken)> {
        let plaintext = self.issuer.issue_refresh(user_id, device_id)?;
        let token_hash = Self::hash_token(&plaintext);

        let row = self.repo.rotate(user_id, device_id, &token_hash).await?;

        Ok((plaintext, row))
    }

    /// Verify presented refresh-token plaintext against the persisted hash.
    ///
    /// No active row, an invalidated lineage, and a hash mismatch all
    /// collapse into the same `InvalidRefreshToken` error so the caller
    /// cannot distinguish them.
    pub async fn verify(
        &self,
        claims: &RefreshTokenClaims,
        presented: &str,
    ) -> Result<RefreshToken> {
        let row = self
            .repo
            .find_active(claims.user_id, &claims.device_id)
            .await?
            .ok_or(AuthError::InvalidRefreshToken)?;

        let presented_hash = Self::hash_token(presented);
        let matches: bool = presented_hash
            .as_bytes()
            .ct_eq(row.token_hash.as_bytes())
            .into();

        if !matches {
            return Err(AuthError::InvalidRefreshToken);
        }

        Ok(row)
    }

    pub async fn get(&self, id: i64) -> Result<RefreshToken> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(AuthError::RefreshTokenNotFound)
    }

    /// One-way hash of a signed token for storage.
    pub fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        BASE64.encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TokenConfig;
    use crate::memory::InMemoryRefreshTokenRepository;

    fn service() -> (RefreshTokenService, Arc<InMemoryRefreshTokenRepository>) {
        let issuer = Arc::new(TokenIssuer::new(TokenConfig::new("test-secret")));
        let repo = Arc::new(InMemoryRefreshTokenRepository::new());
        (RefreshTokenService::new(issuer, repo.clone()), repo)
    }

    #[tokio::test]
    async fn generate_leaves_exactly_one_active_row() {
        let (service, repo) = service();

        service.generate(1, "device-1").await.unwrap();
        assert_eq!(repo.active_count(1, "device-1"), 1);

        // A second generate for the same pair supersedes the first.
        service.generate(1, "device-1").await.unwrap();
        assert_eq!(repo.active_count(1, "device-1"), 1);
    }

    #[tokio::test]
    async fn rotation_invalidates_the_previous_row() {
        let (service, _repo) = service();

        let (_, first) = service.generate(1, "device-1").await.unwrap();
        let (_, second) = service.generate(1, "device-1").await.unwrap();

        let first = service.get(first.id).await.unwrap();
        let second = service.get(second.id).await.unwrap();

        assert!(first.invalidated_at.is_some());
        assert!(first.invalidated_at.unwrap() <= chrono::Utc::now());
        assert!(second.is_active());
    }

    #[tokio::test]
    async fn lineages_are_independent_per_device() {
        let (service, repo) = service();

        service.generate(1, "device-1").await.unwrap();
        service.generate(1, "device-2").await.unwrap();

        assert_eq!(repo.active_count(1, "device-1"), 1);
        assert_eq!(repo.active_count(1, "device-2"), 1);
    }

    #[tokio::test]
    async fn verify_accepts_the_current_token() {
        let (service, _repo) = service();
        let issuer = TokenIssuer::new(TokenConfig::new("test-secret"));

        let (plaintext, row) = service.generate(1, "device-1").await.unwrap();
        let claims = issuer.decode_refresh(&plaintext).unwrap();

        let verified = service.verify(&claims, &plaintext).await.unwrap();
        assert_eq!(verified.id, row.id);
    }

    #[tokio::test]
    async fn verify_failures_are_indistinguishable() {
        let (service, _repo) = service();
        let issuer = TokenIssuer::new(TokenConfig::new("test-secret"));

        // No row at all.
        let ghost = issuer.issue_refresh(9, "ghost").unwrap();
        let ghost_claims = issuer.decode_refresh(&ghost).unwrap();
        let no_row = service.verify(&ghost_claims, &ghost).await;

        // Superseded (invalidated) token.
        let (old_plaintext, _) = service.generate(1, "device-1").await.unwrap();
        let (new_plaintext, _) = service.generate(1, "device-1").await.unwrap();
        let old_claims = issuer.decode_refresh(&old_plaintext).unwrap();
        let invalidated = service.verify(&old_claims, &old_plaintext).await;

        // Right pair, wrong plaintext.
        let new_claims = issuer.decode_refresh(&new_plaintext).unwrap();
        let mismatch = service.verify(&new_claims, &old_plaintext).await;

        for outcome in [no_row, invalidated, mismatch] {
            assert!(matches!(outcome, Err(AuthError::InvalidRefreshToken)));
        }
    }

    #[test]
    fn hash_token_is_deterministic_and_one_way() {
        let a = RefreshTokenService::hash_token("signed-token");
        let b = RefreshTokenService::hash_token("signed-token");
        let c = RefreshTokenService::hash_token("other-token");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, "signed-token");
    }
}
