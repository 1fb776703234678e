// src/auth.rs
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

const TOKEN_TTL_SECS: i64 = 60 * 60 * 24;

#[derive(Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: usize,
}

pub fn create_token(email: &str, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        sub: email.to_string(),
        exp: (Utc::now().timestamp() + TOKEN_TTL_SECS) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
}

// Returns the email carried by a valid token.
pub fn verify_token(token: &str, secret: &str) -> Option<String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map(|data| data.claims.sub)
    .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip_preserves_email() {
        let token = create_token("user@example.com", "test-secret").unwrap();
        let email = verify_token(&token, "test-secret");
        assert_eq!(email.as_deref(), Some("user@example.com"));
    }

    #[test]
    fn tampered_token_is_rejected() {
        let token = create_token("user@example.com", "test-secret").unwrap();
        let mut tampered = token.clone();
        tampered.push('x');
        assert!(verify_token(&tampered, "test-secret").is_none());
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = create_token("user@example.com", "other-secret").unwrap();
        assert!(verify_token(&token, "test-secret").is_none());
    }
}
