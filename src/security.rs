//! Password hashing and the bearer token lifecycle.
//!
//! Passwords go through argon2 with a random salt and are only ever compared
//! via the verify primitive. Tokens are stateless HS256 JWTs; validity is
//! decided purely by signature and claim checks at verification time.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use password_hash::rand_core::OsRng;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::utils::ApiError;

/// Token claims. All fields are required; a token missing any of them fails
/// decoding and is reported as invalid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| ApiError::internal("Failed to hash the password"))
}

/// Compare a candidate password against a stored hash. Mismatch and an
/// unparseable hash both come back as `false`, never as an error.
pub fn verify_password(stored_hash: &str, candidate: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(candidate.as_bytes(), &parsed_hash)
        .is_ok()
}

pub fn generate_token(secret: &str, user_id: &str, days_to_expire: i64) -> Result<String, ApiError> {
    if user_id.is_empty() {
        return Err(ApiError::bad_request(
            "A user id is required to generate a token.",
        ));
    }

    let now = time::OffsetDateTime::now_utc().unix_timestamp();
    let claims = Claims {
        iss: TOKEN_ISSUER.to_string(),
        sub: user_id.to_string(),
        iat: now,
        exp: now + days_to_expire * 24 * 60 * 60,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| ApiError::internal("Failed to generate the token"))
}

/// Verify a bearer token and return its claims.
///
/// Failure order is fixed: signature/shape, then issuer, then a future
/// issued-at, then expiry. A token issued in the future is invalid rather
/// than expired, even when its expiry has also passed.
pub fn verify_token(secret: &str, token: &str) -> Result<Claims, ApiError> {
    let mut validation = Validation::new(Algorithm::HS256);
    // exp and iat are checked manually below so the failure order stays fixed
    validation.validate_exp = false;
    validation.required_spec_claims.clear();
    validation.leeway = 0;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|_| ApiError::unauthorized(ERR_TOKEN_INVALID))?;

    let claims = token_data.claims;

    if claims.iss != TOKEN_ISSUER {
        return Err(ApiError::unauthorized(ERR_TOKEN_INVALID));
    }

    let now = time::OffsetDateTime::now_utc().unix_timestamp();

    if claims.iat > now {
        return Err(ApiError::unauthorized(ERR_TOKEN_INVALID));
    }

    if claims.exp < now {
        return Err(ApiError::unauthorized(ERR_TOKEN_EXPIRED));
    }

    Ok(claims)
}
