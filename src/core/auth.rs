//! Bearer tokens for the authentication gate
//!
//! Tokens are stateless HS256 JWTs carrying the user's id and email. The
//! only invalidation mechanism is expiry: there is no session table and no
//! revocation list.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::core::id::RecordId;

/// Identity resolved from a verified token, attached to the request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: RecordId,
    pub email: String,
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub id: String,
    pub email: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Reasons a token cannot be issued or accepted.
///
/// The display strings are the reasons reported to clients by the gate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("jwt must be provided")]
    Missing,

    #[error("jwt expired")]
    Expired,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("jwt malformed")]
    Malformed,

    #[error("failed to sign token: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            _ => TokenError::Malformed,
        }
    }
}

/// Sign and verify capability with expiry
pub trait TokenSigner: Send + Sync {
    /// Mint a token for `user`
    fn sign(&self, user: &AuthenticatedUser) -> Result<String, TokenError>;

    /// Check signature and expiry, returning the embedded identity
    fn verify(&self, token: &str) -> Result<AuthenticatedUser, TokenError>;
}

/// HS256 signer with a shared secret
pub struct JwtSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl JwtSigner {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    /// Lifetime of issued tokens
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Mint a token as if issued at `issued_at`
    pub fn sign_at(
        &self,
        user: &AuthenticatedUser,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            id: user.id.to_string(),
            email: user.email.clone(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }
}

impl TokenSigner for JwtSigner {
    fn sign(&self, user: &AuthenticatedUser) -> Result<String, TokenError> {
        self.sign_at(user, Utc::now())
    }

    fn verify(&self, token: &str) -> Result<AuthenticatedUser, TokenError> {
        if token.is_empty() {
            return Err(TokenError::Missing);
        }

        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        let id = RecordId::parse(&data.claims.id).map_err(|_| TokenError::Malformed)?;

        Ok(AuthenticatedUser {
            id,
            email: data.claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> AuthenticatedUser {
        AuthenticatedUser {
            id: RecordId::new(),
            email: "ana@example.com".to_string(),
        }
    }

    fn signer() -> JwtSigner {
        JwtSigner::new("test-secret", Duration::seconds(3600))
    }

    #[test]
    fn test_sign_then_verify_recovers_identity() {
        let signer = signer();
        let user = user();

        let token = signer.sign(&user).unwrap();
        assert_eq!(signer.verify(&token).unwrap(), user);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let signer = signer();
        let token = signer
            .sign_at(&user(), Utc::now() - Duration::seconds(7200))
            .unwrap();

        assert_eq!(signer.verify(&token).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn test_foreign_secret_is_invalid_signature() {
        let token = JwtSigner::new("other-secret", Duration::seconds(3600))
            .sign(&user())
            .unwrap();

        assert_eq!(
            signer().verify(&token).unwrap_err(),
            TokenError::InvalidSignature
        );
    }

    #[test]
    fn test_garbage_is_malformed_and_empty_is_missing() {
        assert_eq!(signer().verify("not.a.jwt").unwrap_err(), TokenError::Malformed);
        assert_eq!(signer().verify("abc").unwrap_err(), TokenError::Malformed);
        assert_eq!(signer().verify("").unwrap_err(), TokenError::Missing);
    }

    #[test]
    fn test_reasons_match_client_messages() {
        assert_eq!(TokenError::Missing.to_string(), "jwt must be provided");
        assert_eq!(TokenError::Expired.to_string(), "jwt expired");
        assert_eq!(TokenError::InvalidSignature.to_string(), "invalid signature");
        assert_eq!(TokenError::Malformed.to_string(), "jwt malformed");
    }
}
