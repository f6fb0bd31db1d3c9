use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use super::{
    repo_types::{NewUser, PublicUser, User, UserChanges},
    store::{StoreError, UserStore},
};

/// Process-local store. All checks and writes happen under one lock, which
/// gives the same atomic uniqueness the database constraints provide.
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<User>> {
        // No write path panics mid-update, so a poisoned lock still holds whole records.
        self.users.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn collides(users: &[User], skip: Option<Uuid>, username: Option<&str>, email: Option<&str>) -> bool {
    users.iter().filter(|u| Some(u.id) != skip).any(|u| {
        username.is_some_and(|n| n == u.username) || email.is_some_and(|e| e == u.email)
    })
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, new: NewUser) -> Result<User, StoreError> {
        let mut users = self.lock();
        if collides(&users, None, Some(&new.username), Some(&new.email)) {
            return Err(StoreError::DuplicateKey);
        }
        let user = User {
            id: Uuid::new_v4(),
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self.lock().iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.lock().iter().find(|u| u.id == id).cloned())
    }

    async fn list(&self) -> Result<Vec<PublicUser>, StoreError> {
        Ok(self.lock().iter().cloned().map(PublicUser::from).collect())
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<User, StoreError> {
        let mut users = self.lock();
        let idx = users
            .iter()
            .position(|u| u.id == id)
            .ok_or(StoreError::NotFound)?;
        if collides(
            &users,
            Some(id),
            changes.username.as_deref(),
            changes.email.as_deref(),
        ) {
            return Err(StoreError::DuplicateKey);
        }
        let user = &mut users[idx];
        if let Some(username) = changes.username {
            user.username = username;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(hash) = changes.password_hash {
            user.password_hash = hash;
        }
        Ok(user.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let mut users = self.lock();
        let idx = users
            .iter()
            .position(|u| u.id == id)
            .ok_or(StoreError::NotFound)?;
        users.remove(idx);
        Ok(())
    }
}
