use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use time::{Duration, OffsetDateTime};
use tracing::debug;

use super::{claims::Claims, AuthError};
use crate::{config::JwtConfig, users::User};

/// Tokens are valid for one hour from issuance.
pub const TOKEN_TTL: Duration = Duration::hours(1);

#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            validation,
        }
    }

    pub fn sign(&self, user: &User) -> Result<String, AuthError> {
        self.sign_at(user, OffsetDateTime::now_utc())
    }

    /// Signs a token as if issued at `now`.
    pub fn sign_at(&self, user: &User, now: OffsetDateTime) -> Result<String, AuthError> {
        let exp = now + TOKEN_TTL;
        let claims = Claims {
            id: user.id,
            username: user.username.clone(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Internal(e.into()))?;
        debug!(user_id = %user.id, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken,
            }
        })?;
        debug!(user_id = %data.claims.id, "jwt verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn keys(secret: &str) -> JwtKeys {
        JwtKeys::new(&JwtConfig {
            secret: secret.into(),
        })
    }

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "a".into(),
            email: "a@x.com".into(),
            password_hash: String::new(),
        }
    }

    #[test]
    fn sign_and_verify_recovers_identity() {
        let keys = keys("dev-secret");
        let u = user();
        let claims = keys.verify(&keys.sign(&u).unwrap()).unwrap();
        assert_eq!(claims.id, u.id);
        assert_eq!(claims.username, "a");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn accepted_at_59_minutes() {
        let keys = keys("dev-secret");
        let issued = OffsetDateTime::now_utc() - Duration::minutes(59);
        let token = keys.sign_at(&user(), issued).unwrap();
        assert!(keys.verify(&token).is_ok());
    }

    #[test]
    fn rejected_as_expired_at_61_minutes() {
        let keys = keys("dev-secret");
        let issued = OffsetDateTime::now_utc() - Duration::minutes(61);
        let token = keys.sign_at(&user(), issued).unwrap();
        assert!(matches!(keys.verify(&token), Err(AuthError::ExpiredToken)));
    }

    #[test]
    fn wrong_secret_is_invalid_not_expired() {
        let token = keys("one").sign(&user()).unwrap();
        assert!(matches!(keys("two").verify(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn garbage_is_invalid() {
        let keys = keys("dev-secret");
        assert!(matches!(keys.verify("not.a.jwt"), Err(AuthError::InvalidToken)));
        assert!(matches!(keys.verify(""), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn tampered_payload_is_invalid() {
        let keys = keys("dev-secret");
        let token = keys.sign(&user()).unwrap();
        let mut parts: Vec<String> = token.split('.').map(String::from).collect();
        let forged = keys.sign(&user()).unwrap();
        parts[1] = forged.split('.').nth(1).unwrap().to_string();
        let spliced = parts.join(".");
        assert!(matches!(keys.verify(&spliced), Err(AuthError::InvalidToken)));
    }
}
