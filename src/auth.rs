use axum::{
    Json,
    extract::{FromRequestParts, State},
    http::{header, request::Parts},
};
use libsql::Value;
use uuid::Uuid;

use crate::constants::*;
use crate::database::{TransactionError, with_transaction};
use crate::models::{EditUserPayload, LoginPayload, RegisterPayload, StatusResponse, TokenResponse};
use crate::security::{generate_token, hash_password, verify_password, verify_token};
use crate::utils::{ApiError, db_error, db_error_with_context, validate_string_length};
use crate::validation::{validate_email, validate_password};
use crate::{AppState, Db};

/// The authenticated caller, extracted from the `Authorization` header.
///
/// Rejections follow a fixed ladder: missing header, then a missing bearer
/// segment, then whatever `verify_token` reports about the token itself.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized(ERR_AUTH_HEADER_MISSING))?;

        // "Bearer <token>": everything after the scheme is the token segment
        let mut segments = header_value.split_whitespace();
        let _scheme = segments.next();
        let token = segments
            .next()
            .ok_or_else(|| ApiError::unauthorized(ERR_BEARER_TOKEN_MISSING))?;

        let claims = verify_token(&state.config.token_secret, token)?;

        Ok(AuthUser {
            user_id: claims.sub,
        })
    }
}

async fn username_exists(db: &Db, username: &str, exclude_id: Option<&str>) -> Result<bool, ApiError> {
    let conn = db.read().await;
    let mut rows = match exclude_id {
        Some(id) => conn
            .query(
                "SELECT id FROM users WHERE username = ? AND id != ?",
                (username, id),
            )
            .await
            .map_err(|_| db_error_with_context("failed to check username"))?,
        None => conn
            .query("SELECT id FROM users WHERE username = ?", [username])
            .await
            .map_err(|_| db_error_with_context("failed to check username"))?,
    };

    Ok(rows.next().await.map_err(|_| db_error())?.is_some())
}

pub async fn register(
    State(app_state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<([(header::HeaderName, String); 1], Json<TokenResponse>), ApiError> {
    validate_string_length(&payload.username, "Username", MAX_USERNAME_LENGTH)?;

    // check that the username doesn't exist
    if username_exists(&app_state.db, &payload.username, None).await? {
        return Err(ApiError::conflict(
            "That username is already taken, please choose another one.",
        ));
    }

    validate_email(&payload.email)?;
    validate_password(&payload.password)?;

    let password_hash = hash_password(&payload.password)?;
    let user_id = Uuid::new_v4().to_string();

    {
        let conn = app_state.db.write().await;
        conn.execute(
            "INSERT INTO users (id, username, email, password_hash) VALUES (?, ?, ?, ?)",
            (
                user_id.as_str(),
                payload.username.as_str(),
                payload.email.as_str(),
                password_hash.as_str(),
            ),
        )
        .await
        .map_err(|_| db_error_with_context("user creation failed"))?;
    }

    let token = generate_token(&app_state.config.token_secret, &user_id, TOKEN_EXPIRY_DAYS)?;

    tracing::info!("registered user {}", payload.username);

    Ok((
        [(header::AUTHORIZATION, format!("Bearer {}", token))],
        Json(TokenResponse::new(token)),
    ))
}

pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<([(header::HeaderName, String); 1], Json<TokenResponse>), ApiError> {
    // An unknown username and a wrong password fail identically so the
    // endpoint cannot be used to enumerate accounts.
    let (user_id, password_hash) = {
        let conn = app_state.db.read().await;
        let mut rows = conn
            .query(
                "SELECT id, password_hash FROM users WHERE username = ?",
                [payload.username.as_str()],
            )
            .await
            .map_err(|_| db_error_with_context("failed to look up user"))?;

        let row = rows
            .next()
            .await
            .map_err(|_| db_error())?
            .ok_or_else(|| ApiError::unauthorized(ERR_INVALID_CREDENTIALS))?;

        let user_id: String = row.get(0).map_err(|_| db_error())?;
        let password_hash: String = row.get(1).map_err(|_| db_error())?;
        (user_id, password_hash)
    };

    if !verify_password(&password_hash, &payload.password) {
        return Err(ApiError::unauthorized(ERR_INVALID_CREDENTIALS));
    }

    let token = generate_token(&app_state.config.token_secret, &user_id, TOKEN_EXPIRY_DAYS)?;

    Ok((
        [(header::AUTHORIZATION, format!("Bearer {}", token))],
        Json(TokenResponse::new(token)),
    ))
}

pub async fn edit_user(
    State(app_state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<EditUserPayload>,
) -> Result<Json<StatusResponse>, ApiError> {
    let mut assignments: Vec<&str> = Vec::new();
    let mut params: Vec<Value> = Vec::new();

    if let Some(ref username) = payload.username {
        validate_string_length(username, "Username", MAX_USERNAME_LENGTH)?;

        // check that the new username is not being used
        if username_exists(&app_state.db, username, Some(&user.user_id)).await? {
            return Err(ApiError::conflict("That username is already taken."));
        }

        assignments.push("username = ?");
        params.push(username.clone().into());
    }

    if let Some(ref email) = payload.email {
        validate_email(email)?;
        assignments.push("email = ?");
        params.push(email.clone().into());
    }

    if payload.old_password.is_some() != payload.new_password.is_some() {
        return Err(ApiError::bad_request("One of the passwords is missing."));
    }

    if let (Some(old_password), Some(new_password)) =
        (&payload.old_password, &payload.new_password)
    {
        validate_password(new_password)?;

        let stored_hash = {
            let conn = app_state.db.read().await;
            let mut rows = conn
                .query(
                    "SELECT password_hash FROM users WHERE id = ?",
                    [user.user_id.as_str()],
                )
                .await
                .map_err(|_| db_error_with_context("failed to look up user"))?;

            let row = rows.next().await.map_err(|_| db_error())?.ok_or_else(|| {
                ApiError::not_found(format!(
                    "No user was found with the given id: {}",
                    user.user_id
                ))
            })?;

            row.get::<String>(0).map_err(|_| db_error())?
        };

        if !verify_password(&stored_hash, old_password) {
            return Err(ApiError::forbidden(
                "The given (existing) password is not correct.",
            ));
        }

        assignments.push("password_hash = ?");
        params.push(hash_password(new_password)?.into());
    }

    if assignments.is_empty() {
        return Err(ApiError::bad_request("The user data was not updated."));
    }

    params.push(user.user_id.clone().into());
    let sql = format!("UPDATE users SET {} WHERE id = ?", assignments.join(", "));

    let conn = app_state.db.write().await;
    let affected_rows = conn
        .execute(&sql, params)
        .await
        .map_err(|_| db_error_with_context("failed to update user"))?;

    if affected_rows == 0 {
        return Err(ApiError::bad_request("The user data was not updated."));
    }

    Ok(Json(StatusResponse::ok()))
}

enum DeleteUserError {
    Transaction(TransactionError),
    Db,
    Failed,
}

impl From<TransactionError> for DeleteUserError {
    fn from(e: TransactionError) -> Self {
        DeleteUserError::Transaction(e)
    }
}

impl From<DeleteUserError> for ApiError {
    fn from(e: DeleteUserError) -> Self {
        match e {
            DeleteUserError::Transaction(TransactionError::Begin) => {
                db_error_with_context("failed to begin transaction")
            }
            DeleteUserError::Transaction(TransactionError::Commit) => {
                db_error_with_context("failed to commit transaction")
            }
            DeleteUserError::Db => db_error_with_context("failed to delete the user"),
            DeleteUserError::Failed => {
                ApiError::bad_request("The operation to delete the user failed.")
            }
        }
    }
}

pub async fn delete_user(
    State(app_state): State<AppState>,
    user: AuthUser,
) -> Result<Json<StatusResponse>, ApiError> {
    {
        let conn = app_state.db.read().await;
        let mut rows = conn
            .query("SELECT id FROM users WHERE id = ?", [user.user_id.as_str()])
            .await
            .map_err(|_| db_error_with_context("failed to look up user"))?;

        if rows.next().await.map_err(|_| db_error())?.is_none() {
            return Err(ApiError::not_found(format!(
                "No user was found with the given id: {}",
                user.user_id
            )));
        }
    }

    // The user's transactions and category associations go with the account.
    with_transaction(&app_state.db, |conn| {
        let user_id = user.user_id.clone();
        Box::pin(async move {
            conn.execute(
                "DELETE FROM transactions WHERE user_id = ?",
                [user_id.as_str()],
            )
            .await
            .map_err(|_| DeleteUserError::Db)?;

            conn.execute(
                "DELETE FROM user_categories WHERE user_id = ?",
                [user_id.as_str()],
            )
            .await
            .map_err(|_| DeleteUserError::Db)?;

            let affected_rows = conn
                .execute("DELETE FROM users WHERE id = ?", [user_id.as_str()])
                .await
                .map_err(|_| DeleteUserError::Db)?;

            if affected_rows == 0 {
                return Err(DeleteUserError::Failed);
            }

            Ok(())
        })
    })
    .await
    .map_err(|e: DeleteUserError| -> ApiError { e.into() })?;

    Ok(Json(StatusResponse::ok()))
}
