//! Pure input validators. Each check either passes or names the first field
//! that failed; nothing here touches the database.

use crate::constants::*;
use crate::models::UpdateTransactionPayload;
use crate::utils::{ApiError, is_valid_date};

pub fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::bad_request(format!(
            "The password should be at least {} characters long.",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ApiError> {
    if !is_valid_email(email) {
        return Err(ApiError::bad_request(format!(
            "The given email is not valid: {}",
            email
        )));
    }
    Ok(())
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    // Exactly one '@': the domain may not contain another one.
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }

    let local_ok = local
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "!#$%&'*+/=?^_`{|}~.-".contains(c))
        && !local.starts_with('.')
        && !local.ends_with('.')
        && !local.contains("..");

    if !local_ok {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }

    labels.iter().all(|label| {
        !label.is_empty()
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
            && !label.starts_with('-')
            && !label.ends_with('-')
    })
}

fn validate_transaction_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::bad_request(
            "The transaction's name should be a valid non-empty string.",
        ));
    }
    Ok(())
}

fn validate_transaction_amount(amount: f64) -> Result<(), ApiError> {
    if !amount.is_finite() {
        return Err(ApiError::bad_request(
            "The transaction's amount should be a valid number.",
        ));
    }
    Ok(())
}

fn validate_transaction_date(date: &str) -> Result<(), ApiError> {
    if !is_valid_date(date) {
        return Err(ApiError::bad_request(
            "The transaction's date should be a valid calendar date.",
        ));
    }
    Ok(())
}

pub fn validate_category_type(category_type: &str) -> Result<(), ApiError> {
    if category_type != TYPE_INCOME && category_type != TYPE_EXPENSE {
        return Err(ApiError::bad_request(format!(
            "The given type is not valid: {}",
            category_type
        )));
    }
    Ok(())
}

/// Validate a full transaction body. Checks run name, then amount, then date;
/// the first failure wins.
pub fn validate_transaction(name: &str, amount: f64, date: &str) -> Result<(), ApiError> {
    validate_transaction_name(name)?;
    validate_transaction_amount(amount)?;
    validate_transaction_date(date)?;
    Ok(())
}

/// Validate a partial transaction update, where any subset of fields may be
/// present. At least one recognized field must be given, and `category` and
/// `type` only make sense as a pair since they jointly identify a category.
pub fn validate_partial_transaction(payload: &UpdateTransactionPayload) -> Result<(), ApiError> {
    let has_any = payload.name.is_some()
        || payload.amount.is_some()
        || payload.date.is_some()
        || payload.note.is_some()
        || payload.r#type.is_some()
        || payload.category.is_some();

    if !has_any {
        return Err(ApiError::bad_request(
            "At least one transaction property must be provided.",
        ));
    }

    if payload.r#type.is_some() != payload.category.is_some() {
        return Err(ApiError::bad_request(
            "The category and type properties must be given together.",
        ));
    }

    if let Some(ref name) = payload.name {
        validate_transaction_name(name)?;
    }

    if let Some(amount) = payload.amount {
        validate_transaction_amount(amount)?;
    }

    if let Some(ref date) = payload.date {
        validate_transaction_date(date)?;
    }

    if let Some(ref category_type) = payload.r#type {
        validate_category_type(category_type)?;
    }

    if let Some(ref category) = payload.category {
        if category.trim().is_empty() {
            return Err(ApiError::bad_request(
                "The transaction's category should be a valid non-empty string.",
            ));
        }
    }

    Ok(())
}
