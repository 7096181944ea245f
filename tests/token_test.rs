use axum::http::StatusCode;
use budgeting_server::constants::TOKEN_ISSUER;
use budgeting_server::security::{Claims, generate_token, verify_token};
use jsonwebtoken::{EncodingKey, Header, encode};

const SECRET: &str = "test_secret_key_at_least_32_chars_long";

fn now() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}

fn sign(claims: &serde_json::Value) -> String {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .expect("sign test token")
}

#[test]
fn a_generated_token_round_trips() {
    let token = generate_token(SECRET, "user-1", 1).expect("token");
    let claims = verify_token(SECRET, &token).expect("claims");

    assert_eq!(claims.sub, "user-1");
    assert_eq!(claims.iss, TOKEN_ISSUER);
    assert_eq!(claims.exp, claims.iat + 24 * 60 * 60);
}

#[test]
fn generating_a_token_requires_a_user_id() {
    let err = generate_token(SECRET, "", 1).expect_err("empty user id");
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
    assert_eq!(err.message, "A user id is required to generate a token.");
}

#[test]
fn an_expired_token_is_reported_as_expired() {
    let token = generate_token(SECRET, "user-1", -1).expect("token");
    let err = verify_token(SECRET, &token).expect_err("expired");
    assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    assert_eq!(err.message, "Token has expired");
}

#[test]
fn a_token_signed_with_another_secret_is_invalid() {
    let token = generate_token("a_completely_different_signing_secret!", "user-1", 1)
        .expect("token");
    let err = verify_token(SECRET, &token).expect_err("wrong secret");
    assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    assert_eq!(err.message, "Invalid token");
}

#[test]
fn garbage_is_invalid() {
    let err = verify_token(SECRET, "not-a-token").expect_err("garbage");
    assert_eq!(err.message, "Invalid token");
}

#[test]
fn a_token_missing_the_subject_is_invalid() {
    let token = sign(&serde_json::json!({
        "iss": TOKEN_ISSUER,
        "iat": now(),
        "exp": now() + 3600,
    }));
    let err = verify_token(SECRET, &token).expect_err("missing sub");
    assert_eq!(err.message, "Invalid token");
}

#[test]
fn a_token_with_the_wrong_issuer_is_invalid() {
    let token = sign(&serde_json::json!({
        "iss": "SomeOtherApp",
        "sub": "user-1",
        "iat": now(),
        "exp": now() + 3600,
    }));
    let err = verify_token(SECRET, &token).expect_err("wrong issuer");
    assert_eq!(err.message, "Invalid token");
}

#[test]
fn a_token_issued_in_the_future_is_invalid_not_expired() {
    let token = sign(&serde_json::json!({
        "iss": TOKEN_ISSUER,
        "sub": "user-1",
        "iat": now() + 3600,
        "exp": now() + 7200,
    }));
    let err = verify_token(SECRET, &token).expect_err("future iat");
    assert_eq!(err.message, "Invalid token");

    // even when the expiry has also passed, a future iat is still invalid
    let token = sign(&serde_json::json!({
        "iss": TOKEN_ISSUER,
        "sub": "user-1",
        "iat": now() + 3600,
        "exp": now() - 3600,
    }));
    let err = verify_token(SECRET, &token).expect_err("future iat, past exp");
    assert_eq!(err.message, "Invalid token");
}

#[test]
fn claims_serialize_with_the_standard_names() {
    let claims = Claims {
        iss: TOKEN_ISSUER.to_string(),
        sub: "user-1".to_string(),
        iat: 1,
        exp: 2,
    };
    let value = serde_json::to_value(&claims).expect("serialize claims");
    assert_eq!(
        value,
        serde_json::json!({"iss": TOKEN_ISSUER, "sub": "user-1", "iat": 1, "exp": 2})
    );
}
