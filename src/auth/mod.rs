//! Credential verification for identity-provider access tokens.
//!
//! Tokens are minted by the managed auth platform; this module only
//! verifies them locally against the shared signing secret. Verification
//! is pure over (token, secret, clock) and never touches the database.

pub mod provider;

use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims embedded in a provider-issued access token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Provider user id
    pub sub: Uuid,
    pub email: String,
    #[serde(default)]
    pub role: String,
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug, PartialEq)]
pub enum AuthError {
    MissingToken,
    /// Signature, expiry, audience or parse failure. Deliberately a single
    /// variant: callers must not learn which check rejected the token.
    InvalidToken,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingToken => write!(f, "No bearer token provided"),
            AuthError::InvalidToken => write!(f, "Invalid or expired token"),
        }
    }
}

impl std::error::Error for AuthError {}

/// Extract the bearer token from an Authorization header value.
///
/// Accepts exactly `Bearer <token>` (scheme case-insensitive). Anything
/// else - missing header, wrong scheme, extra parts - yields `None`.
pub fn extract_bearer_token(auth_header: Option<&str>) -> Option<&str> {
    let header = auth_header?;
    let mut parts = header.split(' ');

    let scheme = parts.next()?;
    let token = parts.next()?;
    if parts.next().is_some() || token.is_empty() || !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    Some(token)
}

/// Verify a token's signature, expiry and audience, returning its claims.
///
/// Every failure collapses into `AuthError::InvalidToken`.
pub fn verify_token(token: &str, secret: &str, audience: &str) -> Result<Claims, AuthError> {
    if secret.is_empty() {
        // Startup validation should make this unreachable
        return Err(AuthError::InvalidToken);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let mut validation = Validation::default();
    validation.set_audience(&[audience]);

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|_| AuthError::InvalidToken)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-signing-secret";
    const AUDIENCE: &str = "authenticated";

    fn mint_token(secret: &str, exp_offset_secs: i64) -> (String, Uuid) {
        let user_id = Uuid::new_v4();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id,
            email: "student@school.example".to_string(),
            role: AUDIENCE.to_string(),
            aud: AUDIENCE.to_string(),
            exp: now + exp_offset_secs,
            iat: now,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();
        (token, user_id)
    }

    #[test]
    fn extracts_well_formed_bearer_header() {
        assert_eq!(extract_bearer_token(Some("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(extract_bearer_token(Some("bearer abc")), Some("abc"));
    }

    #[test]
    fn rejects_malformed_headers() {
        assert_eq!(extract_bearer_token(None), None);
        assert_eq!(extract_bearer_token(Some("")), None);
        assert_eq!(extract_bearer_token(Some("Bearer")), None);
        assert_eq!(extract_bearer_token(Some("Bearer ")), None);
        assert_eq!(extract_bearer_token(Some("Basic abc")), None);
        assert_eq!(extract_bearer_token(Some("Bearer one two")), None);
        // a doubled separator is three parts, not a padded token
        assert_eq!(extract_bearer_token(Some("Bearer  abc")), None);
    }

    #[test]
    fn verifies_valid_token() {
        let (token, user_id) = mint_token(SECRET, 3600);
        let claims = verify_token(&token, SECRET, AUDIENCE).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "student@school.example");
    }

    #[test]
    fn verification_is_idempotent() {
        let (token, user_id) = mint_token(SECRET, 3600);
        let first = verify_token(&token, SECRET, AUDIENCE).unwrap();
        let second = verify_token(&token, SECRET, AUDIENCE).unwrap();
        assert_eq!(first.sub, user_id);
        assert_eq!(first.sub, second.sub);
    }

    #[test]
    fn expired_token_is_rejected() {
        // Past the default validation leeway
        let (token, _) = mint_token(SECRET, -3600);
        assert_eq!(verify_token(&token, SECRET, AUDIENCE), Err(AuthError::InvalidToken));
    }

    #[test]
    fn wrong_signature_is_rejected() {
        let (token, _) = mint_token("some-other-secret", 3600);
        assert_eq!(verify_token(&token, SECRET, AUDIENCE), Err(AuthError::InvalidToken));
    }

    #[test]
    fn wrong_audience_is_rejected() {
        let (token, _) = mint_token(SECRET, 3600);
        assert_eq!(verify_token(&token, SECRET, "service_role"), Err(AuthError::InvalidToken));
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert_eq!(
            verify_token("not-a-jwt", SECRET, AUDIENCE),
            Err(AuthError::InvalidToken)
        );
    }
}
