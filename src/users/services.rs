use lazy_static::lazy_static;
use regex::Regex;
use tracing::info;
use uuid::Uuid;

use super::{
    dto::{CreateUserRequest, UpdateUserRequest},
    repo_types::{NewUser, User, UserChanges},
};
use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.is_empty())
}

fn clean_username(v: Option<String>) -> Option<String> {
    non_empty(v.map(|s| s.trim().to_string()))
}

fn clean_email(v: Option<String>) -> ApiResult<Option<String>> {
    match non_empty(v.map(|s| s.trim().to_lowercase())) {
        Some(email) if !is_valid_email(&email) => Err(ApiError::Validation("invalid email".into())),
        other => Ok(other),
    }
}

/// Ids that do not parse can never match a record.
pub(crate) fn parse_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound)
}

/// Validates, hashes and stores a new user. Shared by registration and
/// authenticated creation.
pub async fn create_user(state: &AppState, req: CreateUserRequest) -> ApiResult<User> {
    let username = clean_username(req.username);
    let email = clean_email(req.email)?;
    let password = non_empty(req.password);
    let (Some(username), Some(email), Some(password)) = (username, email, password) else {
        return Err(ApiError::Validation(
            "username, email and password are required".into(),
        ));
    };

    let password_hash = state.gateway.hash_password(&password).await?;
    let user = state
        .users
        .create(NewUser {
            username,
            email,
            password_hash,
        })
        .await?;
    info!(user_id = %user.id, username = %user.username, "user created");
    Ok(user)
}

pub async fn update_user(state: &AppState, id: Uuid, req: UpdateUserRequest) -> ApiResult<User> {
    let password_hash = match non_empty(req.password) {
        Some(p) => Some(state.gateway.hash_password(&p).await?),
        None => None,
    };
    let changes = UserChanges {
        username: clean_username(req.username),
        email: clean_email(req.email)?,
        password_hash,
    };
    let user = state.users.update(id, changes).await?;
    info!(user_id = %user.id, "user updated");
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape() {
        assert!(is_valid_email("a@x.com"));
        assert!(!is_valid_email("a@x"));
        assert!(!is_valid_email("a x@y.z"));
        assert!(!is_valid_email("@x.com"));
    }

    #[test]
    fn email_is_trimmed_and_lowercased() {
        let got = clean_email(Some("  A@X.Com ".into())).unwrap();
        assert_eq!(got.as_deref(), Some("a@x.com"));
        assert_eq!(clean_email(Some("   ".into())).unwrap(), None);
        assert!(clean_email(Some("nope".into())).is_err());
    }

    #[test]
    fn unparseable_id_is_not_found() {
        assert!(matches!(parse_id("123"), Err(ApiError::NotFound)));
        assert!(parse_id(&Uuid::new_v4().to_string()).is_ok());
    }

    #[tokio::test]
    async fn create_requires_every_field() {
        let state = AppState::fake();
        let err = create_user(
            &state,
            CreateUserRequest {
                username: Some("a".into()),
                email: Some("a@x.com".into()),
                password: Some(String::new()),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(state.users.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_with_only_email_keeps_the_rest() {
        let state = AppState::fake();
        let user = create_user(
            &state,
            CreateUserRequest {
                username: Some("a".into()),
                email: Some("a@x.com".into()),
                password: Some("p".into()),
            },
        )
        .await
        .unwrap();
        let updated = update_user(
            &state,
            user.id,
            UpdateUserRequest {
                email: Some("new@x.com".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.username, "a");
        assert_eq!(updated.email, "new@x.com");
        assert_eq!(updated.password_hash, user.password_hash);
    }

    #[tokio::test]
    async fn update_rehashes_new_password() {
        let state = AppState::fake();
        let user = create_user(
            &state,
            CreateUserRequest {
                username: Some("a".into()),
                email: Some("a@x.com".into()),
                password: Some("old".into()),
            },
        )
        .await
        .unwrap();
        let updated = update_user(
            &state,
            user.id,
            UpdateUserRequest {
                password: Some("new".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_ne!(updated.password_hash, "new");
        assert!(state.gateway.authenticate("a", "new").await.is_ok());
        assert!(state.gateway.authenticate("a", "old").await.is_err());
    }
}
