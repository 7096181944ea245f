use axum::http::StatusCode;
use budgeting_server::models::UpdateTransactionPayload;
use budgeting_server::validation::{
    validate_email, validate_partial_transaction, validate_password, validate_transaction,
};

#[test]
fn password_shorter_than_minimum_is_rejected() {
    let result = validate_password("seven77");
    let err = result.expect_err("7 characters should be too short");
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        err.message,
        "The password should be at least 8 characters long."
    );
}

#[test]
fn password_at_minimum_length_is_accepted() {
    assert!(validate_password("eight888").is_ok());
    assert!(validate_password("a much longer passphrase").is_ok());
}

#[test]
fn valid_emails_are_accepted() {
    for email in [
        "user@example.com",
        "first.last@example.com",
        "user+tag@sub.domain.co",
        "u_123@numbers1.example.org",
    ] {
        assert!(validate_email(email).is_ok(), "expected valid: {}", email);
    }
}

#[test]
fn invalid_emails_are_rejected_with_the_offending_value() {
    for email in [
        "plainaddress",
        "missing@tld",
        "two@@example.com",
        "@example.com",
        "user@",
        ".leading.dot@example.com",
        "double..dot@example.com",
        "user@-bad.com",
        "user@bad-.com",
        "spaces in@example.com",
    ] {
        let err = validate_email(email).expect_err(email);
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            err.message,
            format!("The given email is not valid: {}", email)
        );
    }
}

#[test]
fn transaction_with_valid_fields_passes() {
    assert!(validate_transaction("Lunch", 10.0, "2024-01-15").is_ok());
}

#[test]
fn transaction_checks_report_the_first_failure_in_order() {
    // name is checked before amount and date
    let err = validate_transaction("", f64::NAN, "not-a-date").expect_err("empty name");
    assert_eq!(
        err.message,
        "The transaction's name should be a valid non-empty string."
    );

    // amount is checked before date
    let err = validate_transaction("Lunch", f64::INFINITY, "not-a-date").expect_err("bad amount");
    assert_eq!(
        err.message,
        "The transaction's amount should be a valid number."
    );

    let err = validate_transaction("Lunch", 10.0, "not-a-date").expect_err("bad date");
    assert_eq!(
        err.message,
        "The transaction's date should be a valid calendar date."
    );
}

#[test]
fn partial_update_requires_at_least_one_field() {
    let err = validate_partial_transaction(&UpdateTransactionPayload::default())
        .expect_err("empty update");
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        err.message,
        "At least one transaction property must be provided."
    );
}

#[test]
fn partial_update_requires_category_and_type_together() {
    let category_only = UpdateTransactionPayload {
        category: Some("Food".to_string()),
        ..Default::default()
    };
    let err = validate_partial_transaction(&category_only).expect_err("category without type");
    assert_eq!(
        err.message,
        "The category and type properties must be given together."
    );

    let type_only = UpdateTransactionPayload {
        r#type: Some("expense".to_string()),
        ..Default::default()
    };
    let err = validate_partial_transaction(&type_only).expect_err("type without category");
    assert_eq!(
        err.message,
        "The category and type properties must be given together."
    );
}

#[test]
fn partial_update_rejects_an_unknown_type() {
    let payload = UpdateTransactionPayload {
        r#type: Some("savings".to_string()),
        category: Some("Food".to_string()),
        ..Default::default()
    };
    let err = validate_partial_transaction(&payload).expect_err("unknown type");
    assert_eq!(err.message, "The given type is not valid: savings");
}

#[test]
fn partial_update_rechecks_present_fields() {
    let empty_name = UpdateTransactionPayload {
        name: Some("   ".to_string()),
        ..Default::default()
    };
    let err = validate_partial_transaction(&empty_name).expect_err("blank name");
    assert_eq!(
        err.message,
        "The transaction's name should be a valid non-empty string."
    );

    let bad_date = UpdateTransactionPayload {
        date: Some("2024-13-99".to_string()),
        ..Default::default()
    };
    let err = validate_partial_transaction(&bad_date).expect_err("impossible date");
    assert_eq!(
        err.message,
        "The transaction's date should be a valid calendar date."
    );
}

#[test]
fn partial_update_accepts_valid_subsets() {
    let name_only = UpdateTransactionPayload {
        name: Some("Dinner".to_string()),
        ..Default::default()
    };
    assert!(validate_partial_transaction(&name_only).is_ok());

    let pair = UpdateTransactionPayload {
        r#type: Some("income".to_string()),
        category: Some("Salary".to_string()),
        amount: Some(1500.0),
        ..Default::default()
    };
    assert!(validate_partial_transaction(&pair).is_ok());
}
