//! Credential verification and the bearer-token request gate.
//!
//! Passwords are hashed with Argon2id and stored as PHC strings so the
//! parameters and salt travel with the hash.  Successful logins receive
//! an HS256-signed JWT carrying the admin's id and username; the
//! server's auth middleware verifies the token with [`verify_token`]
//! and attaches an [`AdminIdentity`] to the request extensions.
//!
//! Every authentication failure collapses to a generic 401: callers
//! cannot distinguish a missing header from a bad signature or an
//! expired token.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::ApiError;

/// Minimum accepted password length (profile updates and seeding).
pub const MIN_PASSWORD_LENGTH: usize = 6;

// ── Password hashing ───────────────────────────────────────────────

/// Hash a plaintext password using Argon2id with a random salt.
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {e}"))?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored PHC-formatted hash.
///
/// Returns `Ok(true)` on a match, `Ok(false)` on a mismatch, and an
/// error only when the stored hash itself is malformed.
pub fn verify_password(password: &str, hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| anyhow::anyhow!("stored password hash is malformed: {e}"))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow::anyhow!("password verification failed: {e}")),
    }
}

// ── Tokens ─────────────────────────────────────────────────────────

/// JWT claims embedded in every issued token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Admin document id.
    pub sub: String,
    /// Admin username at issue time.
    pub username: String,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// The authenticated identity attached to protected requests.
#[derive(Debug, Clone)]
pub struct AdminIdentity {
    pub id: String,
    pub username: String,
}

/// Issue a signed bearer token for the given admin, valid for
/// `ttl_days` from now.
pub fn issue_token(
    admin_id: &str,
    username: &str,
    secret: &str,
    ttl_days: i64,
) -> anyhow::Result<String> {
    let now = chrono::Utc::now();
    let claims = Claims {
        sub: admin_id.to_string(),
        username: username.to_string(),
        iat: now.timestamp(),
        exp: (now + chrono::Duration::days(ttl_days)).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| anyhow::anyhow!("token signing failed: {e}"))
}

/// Verify a bearer token's signature and expiry, returning the decoded
/// identity.  Any failure yields a generic 401.
pub fn verify_token(token: &str, secret: &str) -> Result<AdminIdentity, ApiError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        debug!("token rejected: {e}");
        ApiError::unauthorized("Invalid or expired token.")
    })?;
    Ok(AdminIdentity {
        id: data.claims.sub,
        username: data.claims.username,
    })
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn extract_bearer(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct-horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct-horse", &hash).unwrap());
        assert!(!verify_password("wrong-horse", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same-password").unwrap();
        let b = hash_password("same-password").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_token_round_trip() {
        let token = issue_token("admin-1", "admin", "secret", 7).unwrap();
        let identity = verify_token(&token, "secret").unwrap();
        assert_eq!(identity.id, "admin-1");
        assert_eq!(identity.username, "admin");
    }

    #[test]
    fn test_token_wrong_secret_rejected() {
        let token = issue_token("admin-1", "admin", "secret", 7).unwrap();
        let err = verify_token(&token, "other-secret").unwrap_err();
        assert_eq!(err.to_string(), "Invalid or expired token.");
    }

    #[test]
    fn test_expired_token_rejected() {
        // A token that expired an hour ago, well past any decode leeway.
        let now = chrono::Utc::now().timestamp();
        let stale = Claims {
            sub: "admin-1".to_string(),
            username: "admin".to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let stale_token = encode(
            &Header::default(),
            &stale,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();

        assert!(verify_token(&stale_token, "secret").is_err());
    }

    #[test]
    fn test_extract_bearer() {
        assert_eq!(extract_bearer("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(extract_bearer("Basic abc"), None);
        assert_eq!(extract_bearer("Bearer "), None);
        assert_eq!(extract_bearer("bearer abc"), None);
    }
}
