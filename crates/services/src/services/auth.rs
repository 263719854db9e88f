use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

const INVITE_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const INVITE_CODE_LEN: usize = 6;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("Failed to issue token: {0}")]
    TokenCreation(#[from] jsonwebtoken::errors::Error),
    #[error("Failed to process password")]
    PasswordHash,
    #[error("Incorrect email or password")]
    InvalidCredentials,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
pub struct AuthService {
    secret: String,
    token_ttl: Duration,
}

impl AuthService {
    pub fn new(secret: String, token_ttl_hours: i64) -> Self {
        Self {
            secret,
            token_ttl: Duration::hours(token_ttl_hours),
        }
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    pub fn sign_token(&self, user_id: Uuid, email: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + self.token_ttl).timestamp(),
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?)
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|_| AuthError::InvalidToken)
    }

    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|_| AuthError::PasswordHash)
    }

    pub fn verify_password(&self, password: &str, password_hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(password_hash).map_err(|_| AuthError::PasswordHash)?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

pub fn generate_invite_code() -> String {
    let mut rng = rand::thread_rng();
    (0..INVITE_CODE_LEN)
        .map(|_| INVITE_CODE_ALPHABET[rng.gen_range(0..INVITE_CODE_ALPHABET.len())] as char)
        .collect()
}

/// Random hex secret for signing tokens, generated once and persisted in
/// the config file.
pub fn generate_secret() -> String {
    let mut rng = rand::thread_rng();
    (0..32).map(|_| format!("{:02x}", rng.r#gen::<u8>())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        AuthService::new("test-secret".to_string(), 24)
    }

    #[test]
    fn token_roundtrip() {
        let auth = service();
        let user_id = Uuid::new_v4();

        let token = auth.sign_token(user_id, "alex@example.com").unwrap();
        let claims = auth.verify_token(&token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "alex@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let auth = service();
        let token = auth.sign_token(Uuid::new_v4(), "alex@example.com").unwrap();

        let other = AuthService::new("other-secret".to_string(), 24);
        assert!(matches!(
            other.verify_token(&token),
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(
            auth.verify_token("not-a-token"),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn password_hash_verifies_and_rejects() {
        let auth = service();
        let hash = auth.hash_password("hunter2").unwrap();
        assert_ne!(hash, "hunter2");
        assert!(auth.verify_password("hunter2", &hash).unwrap());
        assert!(!auth.verify_password("hunter3", &hash).unwrap());
    }

    #[test]
    fn invite_codes_are_six_uppercase_chars() {
        for _ in 0..32 {
            let code = generate_invite_code();
            assert_eq!(code.len(), 6);
            assert!(code.bytes().all(|b| INVITE_CODE_ALPHABET.contains(&b)));
        }
    }
}
