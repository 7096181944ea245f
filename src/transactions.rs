use axum::{
    Json,
    extract::{Path, Query, State},
};
use libsql::Value;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::filters::create_transaction_filter;
use crate::models::{
    AddTransactionResponse, GetTransactionResponse, GetTransactionsResponse, StatusResponse,
    Transaction, TransactionFilterQuery, TransactionPayload, UpdateTransactionPayload,
};
use crate::utils::{ApiError, db_error, db_error_with_context};
use crate::validation::{validate_partial_transaction, validate_transaction};
use crate::{AppState, Db};

const SELECT_TRANSACTIONS: &str =
    "SELECT t.id, t.name, t.amount, t.date, t.note, c.type, c.name \
     FROM transactions t JOIN categories c ON c.id = t.category_id";

fn extract_transaction_from_row(row: libsql::Row) -> Result<Transaction, ApiError> {
    let id: String = row
        .get(0)
        .map_err(|_| db_error_with_context("invalid transaction data"))?;
    let name: String = row
        .get(1)
        .map_err(|_| db_error_with_context("invalid transaction data"))?;
    let amount: f64 = row
        .get(2)
        .map_err(|_| db_error_with_context("invalid transaction data"))?;
    let date: String = row
        .get(3)
        .map_err(|_| db_error_with_context("invalid transaction data"))?;
    let note = match row
        .get_value(4)
        .map_err(|_| db_error_with_context("invalid transaction data"))?
    {
        Value::Text(text) => Some(text),
        _ => None,
    };
    let category_type: String = row
        .get(5)
        .map_err(|_| db_error_with_context("invalid transaction data"))?;
    let category: String = row
        .get(6)
        .map_err(|_| db_error_with_context("invalid transaction data"))?;

    Ok(Transaction {
        id,
        name,
        amount,
        date,
        note,
        r#type: category_type,
        category,
    })
}

/// Resolve a `{type, name}` pair to a category id, with a caller-supplied
/// message for the missing case.
async fn resolve_category_id(
    db: &Db,
    category_type: &str,
    category_name: &str,
    missing_message: String,
) -> Result<String, ApiError> {
    let conn = db.read().await;
    let mut rows = conn
        .query(
            "SELECT id FROM categories WHERE type = ? AND name = ?",
            (category_type, category_name),
        )
        .await
        .map_err(|_| db_error_with_context("failed to look up category"))?;

    match rows.next().await.map_err(|_| db_error())? {
        Some(row) => row.get::<String>(0).map_err(|_| db_error()),
        None => Err(ApiError::not_found(missing_message)),
    }
}

pub async fn add_transaction(
    State(app_state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<TransactionPayload>,
) -> Result<Json<AddTransactionResponse>, ApiError> {
    validate_transaction(&payload.name, payload.amount, &payload.date)?;

    let category_id = resolve_category_id(
        &app_state.db,
        &payload.r#type,
        &payload.category,
        format!(
            "The \"{}\" category of \"{}\" was not found in the database.",
            payload.r#type, payload.category
        ),
    )
    .await?;

    let transaction_id = Uuid::new_v4().to_string();
    let note_value = match payload.note {
        Some(ref note) => Value::from(note.clone()),
        None => Value::Null,
    };

    let conn = app_state.db.write().await;
    conn.execute(
        "INSERT INTO transactions (id, user_id, category_id, name, amount, date, note) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
        (
            transaction_id.as_str(),
            user.user_id.as_str(),
            category_id.as_str(),
            payload.name.trim(),
            payload.amount,
            payload.date.trim(),
            note_value,
        ),
    )
    .await
    .map_err(|_| db_error_with_context("transaction creation failed"))?;

    Ok(Json(AddTransactionResponse {
        ok: true,
        error: None,
        transaction_id,
    }))
}

pub async fn get_transaction(
    State(app_state): State<AppState>,
    user: AuthUser,
    Path(transaction_id): Path<String>,
) -> Result<Json<GetTransactionResponse>, ApiError> {
    let conn = app_state.db.read().await;
    let mut rows = conn
        .query(
            &format!(
                "{} WHERE t.id = ? AND t.user_id = ?",
                SELECT_TRANSACTIONS
            ),
            (transaction_id.as_str(), user.user_id.as_str()),
        )
        .await
        .map_err(|_| db_error_with_context("failed to query transaction"))?;

    // A transaction owned by someone else looks exactly like a missing one.
    let row = rows.next().await.map_err(|_| db_error())?.ok_or_else(|| {
        ApiError::not_found(format!(
            "The transaction with the given id ({}) was not found.",
            transaction_id
        ))
    })?;

    let transaction = extract_transaction_from_row(row)?;

    Ok(Json(GetTransactionResponse {
        ok: true,
        error: None,
        transaction,
    }))
}

pub async fn get_transactions(
    State(app_state): State<AppState>,
    user: AuthUser,
    Query(query): Query<TransactionFilterQuery>,
) -> Result<Json<GetTransactionsResponse>, ApiError> {
    let filter = create_transaction_filter(Some(user.user_id.as_str()), &query)?;
    let (where_clause, params) = filter.to_sql();

    let conn = app_state.db.read().await;
    let mut rows = conn
        .query(
            &format!(
                "{} WHERE {} ORDER BY t.date DESC",
                SELECT_TRANSACTIONS, where_clause
            ),
            params,
        )
        .await
        .map_err(|_| db_error_with_context("failed to query transactions"))?;

    let mut transactions = Vec::new();
    while let Some(row) = rows.next().await.map_err(|_| db_error())? {
        transactions.push(extract_transaction_from_row(row)?);
    }

    let transaction_count = transactions.len() as u32;

    Ok(Json(GetTransactionsResponse {
        ok: true,
        error: None,
        transactions,
        transaction_count,
    }))
}

pub async fn edit_transaction(
    State(app_state): State<AppState>,
    user: AuthUser,
    Path(transaction_id): Path<String>,
    Json(payload): Json<UpdateTransactionPayload>,
) -> Result<Json<StatusResponse>, ApiError> {
    validate_partial_transaction(&payload)?;

    let mut assignments: Vec<&str> = Vec::new();
    let mut params: Vec<Value> = Vec::new();

    if let Some(ref name) = payload.name {
        assignments.push("name = ?");
        params.push(name.trim().to_string().into());
    }

    if let Some(amount) = payload.amount {
        assignments.push("amount = ?");
        params.push(amount.into());
    }

    if let Some(ref date) = payload.date {
        assignments.push("date = ?");
        params.push(date.trim().to_string().into());
    }

    if let Some(ref note) = payload.note {
        assignments.push("note = ?");
        params.push(note.clone().into());
    }

    // A {type, category} pair re-resolves to a category id; the validator
    // has already guaranteed the two come together.
    if let (Some(category_type), Some(category)) = (&payload.r#type, &payload.category) {
        let category_id = resolve_category_id(
            &app_state.db,
            category_type,
            category,
            format!(
                "The given {} category was not found: {}",
                category_type, category
            ),
        )
        .await?;

        assignments.push("category_id = ?");
        params.push(category_id.into());
    }

    params.push(transaction_id.clone().into());
    params.push(user.user_id.clone().into());

    let sql = format!(
        "UPDATE transactions SET {} WHERE id = ? AND user_id = ?",
        assignments.join(", ")
    );

    let conn = app_state.db.write().await;
    let affected_rows = conn
        .execute(&sql, params)
        .await
        .map_err(|_| db_error_with_context("failed to update transaction"))?;

    if affected_rows == 0 {
        return Err(ApiError::bad_request("The transaction was not modified."));
    }

    Ok(Json(StatusResponse::ok()))
}

pub async fn delete_transaction(
    State(app_state): State<AppState>,
    user: AuthUser,
    Path(transaction_id): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    let conn = app_state.db.write().await;
    let affected_rows = conn
        .execute(
            "DELETE FROM transactions WHERE id = ? AND user_id = ?",
            (transaction_id.as_str(), user.user_id.as_str()),
        )
        .await
        .map_err(|_| db_error_with_context("failed to delete transaction"))?;

    if affected_rows == 0 {
        return Err(ApiError::bad_request(format!(
            "The transaction with the id: {} was not deleted from the database",
            transaction_id
        )));
    }

    Ok(Json(StatusResponse::ok()))
}
