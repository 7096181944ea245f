use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct RegisterPayload {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginPayload {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditUserPayload {
    pub username: Option<String>,
    pub email: Option<String>,
    pub old_password: Option<String>,
    pub new_password: Option<String>,
}

/// `{ok, error, token}` half of the register/login contract. The token is
/// also echoed back through the `Authorization` response header.
#[derive(Serialize)]
pub struct TokenResponse {
    pub ok: bool,
    pub error: Option<String>,
    pub token: String,
}

impl TokenResponse {
    pub fn new(token: String) -> Self {
        Self {
            ok: true,
            error: None,
            token,
        }
    }
}

/// Bare `{ok, error}` envelope for operations with no payload.
#[derive(Serialize)]
pub struct StatusResponse {
    pub ok: bool,
    pub error: Option<String>,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self {
            ok: true,
            error: None,
        }
    }
}

#[derive(Deserialize)]
pub struct TransactionPayload {
    pub name: String,
    pub amount: f64,
    pub date: String,
    pub note: Option<String>,
    pub r#type: String,
    pub category: String,
}

#[derive(Deserialize, Default)]
pub struct UpdateTransactionPayload {
    pub name: Option<String>,
    pub amount: Option<f64>,
    pub date: Option<String>,
    pub note: Option<String>,
    pub r#type: Option<String>,
    pub category: Option<String>,
}

/// A transaction as returned to the caller, with its category resolved to
/// `{type, category}` instead of the internal category id.
#[derive(Serialize, Debug, Clone)]
pub struct Transaction {
    pub id: String,
    pub name: String,
    pub amount: f64,
    pub date: String,
    pub note: Option<String>,
    pub r#type: String,
    pub category: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddTransactionResponse {
    pub ok: bool,
    pub error: Option<String>,
    pub transaction_id: String,
}

#[derive(Serialize)]
pub struct GetTransactionResponse {
    pub ok: bool,
    pub error: Option<String>,
    pub transaction: Transaction,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTransactionsResponse {
    pub ok: bool,
    pub error: Option<String>,
    pub transactions: Vec<Transaction>,
    pub transaction_count: u32,
}

/// Raw transaction list query parameters, exactly as they arrive on the wire.
/// Amounts stay strings here; parsing them is the filter builder's job.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilterQuery {
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub amount: Option<String>,
    pub min_amount: Option<String>,
    pub max_amount: Option<String>,
    pub name: Option<String>,
    pub note: Option<String>,
    pub r#type: Option<String>,
    pub category: Option<String>,
}

#[derive(Deserialize)]
pub struct CategoryPayload {
    pub r#type: String,
    pub category: String,
}

/// Category names grouped by type, as the listing endpoint returns them.
#[derive(Serialize, Default, Debug, Clone)]
pub struct CategoryGroups {
    pub income: Vec<String>,
    pub expense: Vec<String>,
}

#[derive(Serialize)]
pub struct CategoriesResponse {
    pub ok: bool,
    pub error: Option<String>,
    pub categories: CategoryGroups,
}

impl CategoriesResponse {
    pub fn new(categories: CategoryGroups) -> Self {
        Self {
            ok: true,
            error: None,
            categories,
        }
    }
}
