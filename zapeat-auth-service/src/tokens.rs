//! Signed tokens: short-lived OTP sessions and access tokens.

use argon2::password_hash::{rand_core::OsRng, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHash, Version};
use chrono::{TimeDelta, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AuthError;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    exp: usize,
    iat: usize,
    sub: String,
}

/// Issued when a code is sent. Carries a hash of the code, never the code.
/// The hash is keyed with the signing secret, so it cannot be brute-forced
/// from the token alone.
#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    exp: usize,
    iat: usize,
    mobile_number: String,
    code_hash: String,
}

pub struct TokenIssuer {
    secret: Vec<u8>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expires: TimeDelta,
    session_expires: TimeDelta,
}

impl TokenIssuer {
    pub fn new(secret_key: &str, access_token_expires: TimeDelta, session_expires: TimeDelta) -> Self {
        Self {
            secret: secret_key.as_bytes().to_vec(),
            encoding_key: EncodingKey::from_secret(secret_key.as_ref()),
            decoding_key: DecodingKey::from_secret(secret_key.as_ref()),
            access_token_expires,
            session_expires,
        }
    }

    fn code_hasher(&self) -> Result<Argon2<'_>, AuthError> {
        Argon2::new_with_secret(
            &self.secret,
            Algorithm::Argon2id,
            Version::V0x13,
            Params::default(),
        )
        .map_err(|e| AuthError::Hashing(e.to_string()))
    }

    pub fn access_token_expires(&self) -> TimeDelta {
        self.access_token_expires
    }

    pub fn session_expires(&self) -> TimeDelta {
        self.session_expires
    }

    pub fn issue_access_token(&self, user_id: &Uuid) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            exp: (now + self.access_token_expires).timestamp() as usize,
            iat: now.timestamp() as usize,
            sub: user_id.to_string(),
        };
        Ok(jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &self.encoding_key,
        )?)
    }

    pub fn verify_access_token(&self, token: &str) -> Result<Uuid, AuthError> {
        let token = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|_| AuthError::InvalidToken)?;
        token
            .claims
            .sub
            .parse()
            .map_err(|_| AuthError::InvalidToken)
    }

    pub fn issue_session_token(&self, mobile_number: &str, code: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let code_hash = self
            .code_hasher()?
            .hash_password(code.as_bytes(), &salt)
            .map_err(|e| AuthError::Hashing(e.to_string()))?
            .to_string();
        let now = Utc::now();
        let claims = SessionClaims {
            exp: (now + self.session_expires).timestamp() as usize,
            iat: now.timestamp() as usize,
            mobile_number: mobile_number.to_string(),
            code_hash,
        };
        Ok(jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &self.encoding_key,
        )?)
    }

    /// Every failure reads the same to the caller.
    pub fn verify_session_token(
        &self,
        token: &str,
        mobile_number: &str,
        code: &str,
    ) -> Result<(), AuthError> {
        let session =
            jsonwebtoken::decode::<SessionClaims>(token, &self.decoding_key, &Validation::default())
                .map_err(|_| AuthError::InvalidVerification)?
                .claims;
        if session.mobile_number != mobile_number {
            return Err(AuthError::InvalidVerification);
        }
        let hash =
            PasswordHash::new(&session.code_hash).map_err(|_| AuthError::InvalidVerification)?;
        self.code_hasher()?
            .verify_password(code.as_bytes(), &hash)
            .map_err(|_| AuthError::InvalidVerification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new("test-secret", TimeDelta::hours(8), TimeDelta::minutes(10))
    }

    #[test]
    fn access_token_carries_user_id() {
        let issuer = issuer();
        let user_id = Uuid::new_v4();
        let token = issuer.issue_access_token(&user_id).unwrap();
        assert_eq!(issuer.verify_access_token(&token).unwrap(), user_id);
    }

    #[test]
    fn tokens_from_another_key_are_rejected() {
        let other = TokenIssuer::new("other-secret", TimeDelta::hours(8), TimeDelta::minutes(10));
        let token = other.issue_access_token(&Uuid::new_v4()).unwrap();
        assert!(matches!(
            issuer().verify_access_token(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn expired_access_token_is_rejected() {
        let issuer = TokenIssuer::new("test-secret", TimeDelta::hours(-1), TimeDelta::minutes(10));
        let token = issuer.issue_access_token(&Uuid::new_v4()).unwrap();
        assert!(issuer.verify_access_token(&token).is_err());
    }

    #[test]
    fn session_token_verifies_matching_code() {
        let issuer = issuer();
        let token = issuer.issue_session_token("+919876543210", "123456").unwrap();
        assert!(issuer
            .verify_session_token(&token, "+919876543210", "123456")
            .is_ok());
    }

    #[test]
    fn session_token_does_not_contain_the_code() {
        let issuer = issuer();
        let token = issuer.issue_session_token("+919876543210", "482915").unwrap();
        let session = jsonwebtoken::decode::<SessionClaims>(
            &token,
            &issuer.decoding_key,
            &Validation::default(),
        )
        .unwrap()
        .claims;
        assert_ne!(session.code_hash, "482915");
        assert!(session.code_hash.starts_with("$argon2"));
    }

    fn code_hash_of(issuer: &TokenIssuer, token: &str) -> String {
        jsonwebtoken::decode::<SessionClaims>(token, &issuer.decoding_key, &Validation::default())
            .unwrap()
            .claims
            .code_hash
    }

    #[test]
    fn code_hash_cannot_be_checked_without_the_secret() {
        let issuer = issuer();
        let token = issuer.issue_session_token("+919876543210", "482915").unwrap();
        let code_hash = code_hash_of(&issuer, &token);
        let hash = PasswordHash::new(&code_hash).unwrap();

        // Guessing the right code offline is not enough.
        assert!(Argon2::default()
            .verify_password(b"482915", &hash)
            .is_err());
        let other = Argon2::new_with_secret(
            b"other-secret",
            Algorithm::Argon2id,
            Version::V0x13,
            Params::default(),
        )
        .unwrap();
        assert!(other.verify_password(b"482915", &hash).is_err());

        assert!(issuer
            .code_hasher()
            .unwrap()
            .verify_password(b"482915", &hash)
            .is_ok());
    }

    #[test]
    fn session_token_rejects_wrong_code_or_number() {
        let issuer = issuer();
        let token = issuer.issue_session_token("+919876543210", "123456").unwrap();
        assert!(matches!(
            issuer.verify_session_token(&token, "+919876543210", "654321"),
            Err(AuthError::InvalidVerification)
        ));
        assert!(matches!(
            issuer.verify_session_token(&token, "+919999999999", "123456"),
            Err(AuthError::InvalidVerification)
        ));
        assert!(matches!(
            issuer.verify_session_token("garbage", "+919876543210", "123456"),
            Err(AuthError::InvalidVerification)
        ));
    }

    #[test]
    fn expired_session_is_rejected() {
        let issuer = TokenIssuer::new("test-secret", TimeDelta::hours(8), TimeDelta::minutes(-5));
        let token = issuer.issue_session_token("+919876543210", "123456").unwrap();
        assert!(matches!(
            issuer.verify_session_token(&token, "+919876543210", "123456"),
            Err(AuthError::InvalidVerification)
        ));
    }

    #[test]
    fn access_token_is_not_a_session_token() {
        let issuer = issuer();
        let token = issuer.issue_access_token(&Uuid::new_v4()).unwrap();
        assert!(issuer
            .verify_session_token(&token, "+919876543210", "123456")
            .is_err());
    }
}
