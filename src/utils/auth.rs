//! Authentication utilities

use anyhow::Result;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use md5::{Digest, Md5};
use pbkdf2::pbkdf2_hmac;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};
use subtle::ConstantTimeEq;

const PBKDF2_ITERATIONS: u32 = 100_000;
const HASH_LENGTH: usize = 32;

/// User identity carried inside the jwt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: i64,
    pub username: String,
}

/// jsonwebtoken insists `sub` deserialize as a string, so the identity
/// rides in its own claim and `sub` carries the username.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub user: UserIdentity,
    pub exp: usize,
    #[serde(default)]
    pub token_type: String,
}

/// Derive the local credential for a Last.fm account
///
/// md5(username + api secret), lowercase hex. The same external account must
/// always map to the same credential or existing accounts lose the ability
/// to re-authenticate, so this function must never change.
pub fn derive_lastfm_password(username: &str, api_secret: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(username.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Hash a password using pbkdf2-sha256 with the given salt
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hash = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(
        password.as_bytes(),
        salt.as_bytes(),
        PBKDF2_ITERATIONS,
        &mut hash,
    );

    hex::encode(hash)
}

/// Verify a password against a hash using constant-time comparison
pub fn verify_password(password: &str, salt: &str, hash: &str) -> bool {
    let computed = hash_password(password, salt);
    computed.as_bytes().ct_eq(hash.as_bytes()).into()
}

/// Create jwt token with token type and ttl seconds
pub fn create_jwt(
    identity: UserIdentity,
    secret: &str,
    token_type: &str,
    expires_in: u64,
) -> Result<String> {
    let expiration = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() + expires_in;

    let claims = Claims {
        sub: identity.username.clone(),
        user: identity,
        exp: expiration as usize,
        token_type: token_type.to_string(),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Verify jwt token and optionally enforce token type
pub fn verify_jwt(token: &str, secret: &str, expected_type: Option<&str>) -> Result<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.sub = None;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;

    let claims = token_data.claims;
    if let Some(t) = expected_type {
        if !claims.token_type.is_empty() && claims.token_type != t {
            return Err(anyhow::anyhow!("Invalid token type"));
        }
    }

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_credential_is_stable() {
        let a = derive_lastfm_password("alice", "S");
        let b = derive_lastfm_password("alice", "S");
        assert_eq!(a, b);

        // md5("aliceS")
        assert_eq!(a, "bdbde63c26f6ff1d31f09e4cd1e75fb3");

        // different user or secret means a different credential
        assert_ne!(a, derive_lastfm_password("bob", "S"));
        assert_ne!(a, derive_lastfm_password("alice", "T"));
    }

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("secret", "server-id");
        assert!(verify_password("secret", "server-id", &hash));
        assert!(!verify_password("wrong", "server-id", &hash));
        assert!(!verify_password("secret", "other-salt", &hash));
    }

    #[test]
    fn test_jwt_roundtrip() {
        let identity = UserIdentity {
            id: 7,
            username: "alice".to_string(),
        };

        let token = create_jwt(identity, "server-id", "access", 3600).unwrap();
        let claims = verify_jwt(&token, "server-id", Some("access")).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.user.id, 7);
        assert_eq!(claims.user.username, "alice");

        // wrong expected type is rejected
        assert!(verify_jwt(&token, "server-id", Some("refresh")).is_err());
        // wrong secret is rejected
        assert!(verify_jwt(&token, "other", Some("access")).is_err());
    }
}
