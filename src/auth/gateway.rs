use std::sync::Arc;

use anyhow::Context;
use tracing::{instrument, warn};

use super::{claims::Claims, jwt::JwtKeys, password::Passwords, AuthError};
use crate::users::{User, UserStore};

/// Bridges raw credentials to a verified identity.
///
/// Holds the user store and the signing keys it was constructed with;
/// nothing here is mutated after startup.
pub struct AuthGateway {
    store: Arc<dyn UserStore>,
    passwords: Passwords,
    keys: JwtKeys,
}

impl AuthGateway {
    pub fn new(store: Arc<dyn UserStore>, passwords: Passwords, keys: JwtKeys) -> Self {
        Self {
            store,
            passwords,
            keys,
        }
    }

    /// Hashes on the blocking pool so other requests keep making progress.
    pub async fn hash_password(&self, plain: &str) -> Result<String, AuthError> {
        let passwords = self.passwords.clone();
        let plain = plain.to_owned();
        let hash = tokio::task::spawn_blocking(move || passwords.hash(&plain))
            .await
            .context("hash task failed")??;
        Ok(hash)
    }

    pub async fn verify_password(&self, plain: &str, hash: &str) -> Result<bool, AuthError> {
        let passwords = self.passwords.clone();
        let (plain, hash) = (plain.to_owned(), hash.to_owned());
        let ok = tokio::task::spawn_blocking(move || passwords.verify(&plain, &hash))
            .await
            .context("verify task failed")??;
        Ok(ok)
    }

    /// Unknown usernames and wrong passwords both come back as
    /// `InvalidCredentials`; only the log line tells them apart.
    #[instrument(skip(self, plain))]
    pub async fn authenticate(&self, username: &str, plain: &str) -> Result<String, AuthError> {
        let Some(user) = self.store.find_by_username(username).await? else {
            warn!("login for unknown username");
            return Err(AuthError::InvalidCredentials);
        };
        if !self.verify_password(plain, &user.password_hash).await? {
            warn!(user_id = %user.id, "login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }
        self.issue_token(&user)
    }

    pub fn issue_token(&self, user: &User) -> Result<String, AuthError> {
        self.keys.sign(user)
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.keys.verify(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{HashConfig, JwtConfig},
        users::{MemoryUserStore, NewUser},
    };

    fn gateway() -> (Arc<MemoryUserStore>, AuthGateway) {
        let store = Arc::new(MemoryUserStore::new());
        let passwords = Passwords::new(&HashConfig {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap();
        let keys = JwtKeys::new(&JwtConfig {
            secret: "test".into(),
        });
        (store.clone(), AuthGateway::new(store, passwords, keys))
    }

    async fn register(store: &MemoryUserStore, gw: &AuthGateway, username: &str, pw: &str) -> User {
        let hash = gw.hash_password(pw).await.unwrap();
        store
            .create(NewUser {
                username: username.into(),
                email: format!("{username}@x.com"),
                password_hash: hash,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn authenticate_issues_verifiable_token() {
        let (store, gw) = gateway();
        let user = register(&store, &gw, "a", "p").await;
        let token = gw.authenticate("a", "p").await.unwrap();
        let claims = gw.verify_token(&token).unwrap();
        assert_eq!(claims.id, user.id);
        assert_eq!(claims.username, "a");
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_fail_identically() {
        let (store, gw) = gateway();
        register(&store, &gw, "a", "p").await;
        let wrong = gw.authenticate("a", "nope").await.unwrap_err();
        let missing = gw.authenticate("ghost", "p").await.unwrap_err();
        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert!(matches!(missing, AuthError::InvalidCredentials));
        assert_eq!(wrong.to_string(), missing.to_string());
    }

    #[tokio::test]
    async fn stored_hash_is_not_the_password() {
        let (store, gw) = gateway();
        let user = register(&store, &gw, "a", "plaintext").await;
        assert_ne!(user.password_hash, "plaintext");
        assert!(gw.verify_password("plaintext", &user.password_hash).await.unwrap());
    }
}
