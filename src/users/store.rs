use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use super::repo_types::{NewUser, PublicUser, User, UserChanges};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("username or email already exists")]
    DuplicateKey,
    #[error("user not found")]
    NotFound,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence for user records.
///
/// Every mutation is durable when the future resolves. Username and email
/// uniqueness is enforced by the implementation itself, so two concurrent
/// `create` calls with the same username yield one `Ok` and one
/// `StoreError::DuplicateKey`.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, new: NewUser) -> Result<User, StoreError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn list(&self) -> Result<Vec<PublicUser>, StoreError>;
    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<User, StoreError>;
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;
}
