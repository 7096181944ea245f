use axum::{Json, extract::State};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::constants::*;
use crate::database::{TransactionError, with_transaction};
use crate::models::{CategoriesResponse, CategoryGroups, CategoryPayload, StatusResponse};
use crate::utils::{ApiError, db_error, db_error_with_context, validate_string_length};
use crate::validation::validate_category_type;
use crate::{AppState, Db};

pub fn validate_category_name(name: &str) -> Result<(), ApiError> {
    validate_string_length(name, "Category name", MAX_CATEGORY_NAME_LENGTH)
}

async fn validate_user_exists(db: &Db, user_id: &str) -> Result<(), ApiError> {
    let conn = db.read().await;
    let mut rows = conn
        .query("SELECT id FROM users WHERE id = ?", [user_id])
        .await
        .map_err(|_| db_error_with_context("failed to look up user"))?;

    if rows.next().await.map_err(|_| db_error())?.is_none() {
        return Err(ApiError::not_found(
            "The given user was not found in the database.",
        ));
    }
    Ok(())
}

/// All categories associated to the user, their names grouped by type.
async fn load_category_groups(db: &Db, user_id: &str) -> Result<CategoryGroups, ApiError> {
    let conn = db.read().await;
    let mut rows = conn
        .query(
            "SELECT c.type, c.name FROM categories c \
             JOIN user_categories uc ON uc.category_id = c.id \
             WHERE uc.user_id = ? ORDER BY c.name ASC",
            [user_id],
        )
        .await
        .map_err(|_| db_error_with_context("failed to query categories"))?;

    let mut groups = CategoryGroups::default();
    while let Some(row) = rows.next().await.map_err(|_| db_error())? {
        let category_type: String = row
            .get(0)
            .map_err(|_| db_error_with_context("invalid category data"))?;
        let name: String = row
            .get(1)
            .map_err(|_| db_error_with_context("invalid category data"))?;

        match category_type.as_str() {
            TYPE_INCOME => groups.income.push(name),
            _ => groups.expense.push(name),
        }
    }

    Ok(groups)
}

pub async fn get_categories(
    State(app_state): State<AppState>,
    user: AuthUser,
) -> Result<Json<CategoriesResponse>, ApiError> {
    validate_user_exists(&app_state.db, &user.user_id).await?;

    let groups = load_category_groups(&app_state.db, &user.user_id).await?;

    Ok(Json(CategoriesResponse::new(groups)))
}

enum AddCategoryError {
    Transaction(TransactionError),
    DbCheck,
    DbInsert,
    DbAssociate,
}

impl From<TransactionError> for AddCategoryError {
    fn from(e: TransactionError) -> Self {
        AddCategoryError::Transaction(e)
    }
}

impl From<AddCategoryError> for ApiError {
    fn from(e: AddCategoryError) -> Self {
        match e {
            AddCategoryError::Transaction(TransactionError::Begin) => {
                db_error_with_context("failed to begin transaction")
            }
            AddCategoryError::Transaction(TransactionError::Commit) => {
                db_error_with_context("failed to commit transaction")
            }
            AddCategoryError::DbCheck => db_error_with_context("failed to check existing category"),
            AddCategoryError::DbInsert => db_error_with_context("category creation failed"),
            AddCategoryError::DbAssociate => {
                db_error_with_context("failed to associate the category")
            }
        }
    }
}

pub async fn add_category(
    State(app_state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CategoryPayload>,
) -> Result<Json<CategoriesResponse>, ApiError> {
    validate_category_type(&payload.r#type)?;
    validate_category_name(&payload.category)?;
    validate_user_exists(&app_state.db, &user.user_id).await?;

    let category_type = payload.r#type.clone();
    let category_name = payload.category.trim().to_string();

    // Find-or-create plus the association happen inside one transaction so
    // concurrent identical requests cannot create duplicate categories.
    with_transaction(&app_state.db, |conn| {
        let user_id = user.user_id.clone();
        let category_type = category_type.clone();
        let category_name = category_name.clone();
        Box::pin(async move {
            let mut existing_rows = conn
                .query(
                    "SELECT id FROM categories WHERE type = ? AND name = ?",
                    (category_type.as_str(), category_name.as_str()),
                )
                .await
                .map_err(|_| AddCategoryError::DbCheck)?;

            let category_id = match existing_rows
                .next()
                .await
                .map_err(|_| AddCategoryError::DbCheck)?
            {
                Some(row) => row.get::<String>(0).map_err(|_| AddCategoryError::DbCheck)?,
                None => {
                    let category_id = Uuid::new_v4().to_string();
                    conn.execute(
                        "INSERT INTO categories (id, type, name) VALUES (?, ?, ?)",
                        (
                            category_id.as_str(),
                            category_type.as_str(),
                            category_name.as_str(),
                        ),
                    )
                    .await
                    .map_err(|_| AddCategoryError::DbInsert)?;
                    category_id
                }
            };

            // Re-adding a category the user already has is a no-op
            conn.execute(
                "INSERT OR IGNORE INTO user_categories (user_id, category_id) VALUES (?, ?)",
                (user_id.as_str(), category_id.as_str()),
            )
            .await
            .map_err(|_| AddCategoryError::DbAssociate)?;

            Ok(())
        })
    })
    .await
    .map_err(|e: AddCategoryError| -> ApiError { e.into() })?;

    let groups = load_category_groups(&app_state.db, &user.user_id).await?;

    Ok(Json(CategoriesResponse::new(groups)))
}

pub async fn delete_category(
    State(app_state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CategoryPayload>,
) -> Result<Json<StatusResponse>, ApiError> {
    validate_category_type(&payload.r#type)?;
    validate_category_name(&payload.category)?;
    validate_user_exists(&app_state.db, &user.user_id).await?;

    let category_name = payload.category.trim().to_string();

    // The category row is shared across users; only the association is
    // removed. A missing row and a missing association fail differently.
    let category_id = {
        let conn = app_state.db.read().await;
        let mut rows = conn
            .query(
                "SELECT id FROM categories WHERE type = ? AND name = ?",
                (payload.r#type.as_str(), category_name.as_str()),
            )
            .await
            .map_err(|_| db_error_with_context("failed to look up category"))?;

        match rows.next().await.map_err(|_| db_error())? {
            Some(row) => row.get::<String>(0).map_err(|_| db_error())?,
            None => {
                return Err(ApiError::not_found(format!(
                    "The given {} category was not found: {}",
                    payload.r#type, category_name
                )));
            }
        }
    };

    let conn = app_state.db.write().await;
    let affected_rows = conn
        .execute(
            "DELETE FROM user_categories WHERE user_id = ? AND category_id = ?",
            (user.user_id.as_str(), category_id.as_str()),
        )
        .await
        .map_err(|_| db_error_with_context("failed to delete the category association"))?;

    if affected_rows == 0 {
        return Err(ApiError::not_found(format!(
            "The {} category {} is not associated with this user.",
            payload.r#type, category_name
        )));
    }

    Ok(Json(StatusResponse::ok()))
}
