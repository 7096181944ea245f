//! Builds a typed transaction filter out of loosely-typed query parameters.
//!
//! Checks run in a fixed order and the first violation wins, discarding any
//! partially-built filter. Range bounds are strict on both dates and amounts.

use libsql::Value;

use crate::constants::*;
use crate::models::TransactionFilterQuery;
use crate::utils::{ApiError, is_valid_date};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DateRange {
    pub after: Option<String>,
    pub before: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AmountFilter {
    /// An exact amount. Takes precedence over any range bounds in the input.
    Exact(f64),
    Range { min: Option<f64>, max: Option<f64> },
}

/// The normalized filter descriptor consumed by the transaction list query.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionFilter {
    pub user_id: String,
    pub date: Option<DateRange>,
    pub amount: Option<AmountFilter>,
    pub name: Option<String>,
    pub note: Option<String>,
    pub category_type: Option<String>,
    pub category: Option<String>,
}

// Query parameters arrive as strings; an absent or empty one is no filter.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn parse_amount(value: &str, field_name: &str) -> Result<f64, ApiError> {
    match value.parse::<f64>() {
        Ok(amount) if amount.is_finite() => Ok(amount),
        _ => Err(ApiError::bad_request(format!(
            "The given {} is not valid: {}",
            field_name, value
        ))),
    }
}

pub fn create_transaction_filter(
    user_id: Option<&str>,
    query: &TransactionFilterQuery,
) -> Result<TransactionFilter, ApiError> {
    // userId
    let user_id = match user_id.filter(|id| !id.is_empty()) {
        Some(id) => id.to_string(),
        None => {
            return Err(ApiError::bad_request(
                "The filter object needs to have a userId property.",
            ));
        }
    };

    // date
    let mut date = DateRange::default();

    if let Some(from_date) = present(&query.from_date) {
        if !is_valid_date(from_date) {
            return Err(ApiError::bad_request(format!(
                "The given fromDate is invalid: {}",
                from_date
            )));
        }
        date.after = Some(from_date.to_string());
    }

    if let Some(to_date) = present(&query.to_date) {
        if !is_valid_date(to_date) {
            return Err(ApiError::bad_request(format!(
                "The given toDate is invalid: {}",
                to_date
            )));
        }
        date.before = Some(to_date.to_string());
    }

    let date = (date.after.is_some() || date.before.is_some()).then_some(date);

    // amount: an exact amount wins outright over minAmount/maxAmount
    let amount = if let Some(exact) = present(&query.amount) {
        Some(AmountFilter::Exact(parse_amount(exact, "amount")?))
    } else if present(&query.min_amount).is_some() || present(&query.max_amount).is_some() {
        let min = match present(&query.min_amount) {
            Some(value) => Some(parse_amount(value, "minAmount")?),
            None => None,
        };
        let max = match present(&query.max_amount) {
            Some(value) => Some(parse_amount(value, "maxAmount")?),
            None => None,
        };
        Some(AmountFilter::Range { min, max })
    } else {
        None
    };

    // name, note: passed through verbatim
    let name = present(&query.name).map(str::to_string);
    let note = present(&query.note).map(str::to_string);

    // type
    let category_type = match present(&query.r#type) {
        Some(category_type) if category_type == TYPE_INCOME || category_type == TYPE_EXPENSE => {
            Some(category_type.to_string())
        }
        Some(category_type) => {
            return Err(ApiError::bad_request(format!(
                "The given type is not valid: {}",
                category_type
            )));
        }
        None => None,
    };

    // category
    let category = present(&query.category).map(str::to_string);

    Ok(TransactionFilter {
        user_id,
        date,
        amount,
        name,
        note,
        category_type,
        category,
    })
}

impl TransactionFilter {
    /// Render the filter as a WHERE clause over the transactions/categories
    /// join (`t` / `c` aliases) with positional parameters.
    pub fn to_sql(&self) -> (String, Vec<Value>) {
        let mut conditions = vec!["t.user_id = ?".to_string()];
        let mut params: Vec<Value> = vec![self.user_id.clone().into()];

        if let Some(ref date) = self.date {
            if let Some(ref after) = date.after {
                conditions.push("t.date > ?".to_string());
                params.push(after.clone().into());
            }
            if let Some(ref before) = date.before {
                conditions.push("t.date < ?".to_string());
                params.push(before.clone().into());
            }
        }

        match self.amount {
            Some(AmountFilter::Exact(amount)) => {
                conditions.push("t.amount = ?".to_string());
                params.push(amount.into());
            }
            Some(AmountFilter::Range { min, max }) => {
                if let Some(min) = min {
                    conditions.push("t.amount > ?".to_string());
                    params.push(min.into());
                }
                if let Some(max) = max {
                    conditions.push("t.amount < ?".to_string());
                    params.push(max.into());
                }
            }
            None => {}
        }

        if let Some(ref name) = self.name {
            conditions.push("t.name = ?".to_string());
            params.push(name.clone().into());
        }

        if let Some(ref note) = self.note {
            conditions.push("t.note = ?".to_string());
            params.push(note.clone().into());
        }

        if let Some(ref category_type) = self.category_type {
            conditions.push("c.type = ?".to_string());
            params.push(category_type.clone().into());
        }

        if let Some(ref category) = self.category {
            conditions.push("c.name = ?".to_string());
            params.push(category.clone().into());
        }

        (conditions.join(" AND "), params)
    }
}
