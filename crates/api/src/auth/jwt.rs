//! Access- and refresh-token primitives.
//!
//! An access token is a short-lived HS256 JWT carrying [`Claims`]. A
//! refresh token is an opaque random string: the client holds the
//! plaintext, the `refresh_tokens` table holds only its SHA-256 digest,
//! so a database leak cannot be replayed against `/auth/refresh`.

use epm_core::types::DbId;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Payload of every access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// The user's database id.
    pub sub: DbId,
    /// Global role at issue time.
    pub role: String,
    /// Expiration, seconds since the Unix epoch.
    pub exp: i64,
    /// Issue time, seconds since the Unix epoch.
    pub iat: i64,
    /// Per-token UUID, so individual tokens can be audited.
    pub jti: String,
}

/// Signing secret and token lifetimes.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry_mins: i64,
    pub refresh_token_expiry_days: i64,
}

impl JwtConfig {
    /// Read the JWT settings from the environment.
    ///
    /// `JWT_SECRET` is required and must be non-empty; the process should
    /// not come up signing tokens with an empty key.
    /// `JWT_ACCESS_EXPIRY_MINS` defaults to 15 and
    /// `JWT_REFRESH_EXPIRY_DAYS` defaults to 7.
    ///
    /// # Panics
    ///
    /// Panics when `JWT_SECRET` is missing or a lifetime fails to parse.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        Self {
            secret,
            access_token_expiry_mins: env_i64("JWT_ACCESS_EXPIRY_MINS", 15),
            refresh_token_expiry_days: env_i64("JWT_REFRESH_EXPIRY_DAYS", 7),
        }
    }
}

fn env_i64(key: &str, default: i64) -> i64 {
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .unwrap_or_else(|_| panic!("{key} must be an integer")),
        Err(_) => default,
    }
}

/// Sign an access token for the given user.
pub fn generate_access_token(
    user_id: DbId,
    role: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let issued_at = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        role: role.to_string(),
        exp: issued_at + config.access_token_expiry_mins * 60,
        iat: issued_at,
        jti: Uuid::new_v4().to_string(),
    };

    // Header::default() is HS256.
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Check the signature and expiry of an access token and return its claims.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

/// Mint a refresh token, returning `(plaintext, sha256_hex)`.
///
/// The plaintext goes to the client and is never stored; persist only the
/// digest.
pub fn generate_refresh_token() -> (String, String) {
    let plaintext = Uuid::new_v4().to_string();
    let digest = hash_refresh_token(&plaintext);
    (plaintext, digest)
}

/// SHA-256 hex digest of a refresh token, for lookup against the stored
/// value.
pub fn hash_refresh_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signing_config(secret: &str) -> JwtConfig {
        JwtConfig {
            secret: secret.to_string(),
            access_token_expiry_mins: 30,
            refresh_token_expiry_days: 14,
        }
    }

    #[test]
    fn test_access_token_round_trips() {
        let config = signing_config("unit-test-signing-secret");
        let token = generate_access_token(7, "member", &config).unwrap();

        let claims = validate_token(&token, &config).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.role, "member");
        assert_eq!(claims.exp - claims.iat, 30 * 60);
        assert!(Uuid::parse_str(&claims.jti).is_ok());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let config = signing_config("unit-test-signing-secret");

        // Expired ten minutes ago, past the default validation leeway.
        let issued_at = chrono::Utc::now().timestamp() - 1200;
        let claims = Claims {
            sub: 7,
            role: "member".to_string(),
            exp: issued_at + 600,
            iat: issued_at,
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();

        assert!(validate_token(&token, &config).is_err());
    }

    #[test]
    fn test_token_from_another_secret_is_rejected() {
        let token =
            generate_access_token(7, "member", &signing_config("first-secret")).unwrap();
        let result = validate_token(&token, &signing_config("second-secret"));
        assert!(result.is_err());
    }

    #[test]
    fn test_refresh_digest_is_stable_hex() {
        let (plaintext, digest) = generate_refresh_token();
        assert_eq!(digest, hash_refresh_token(&plaintext));
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
