pub mod auth;
pub mod categories;
pub mod config;
pub mod constants;
pub mod database;
pub mod filters;
pub mod models;
pub mod security;
pub mod transactions;
pub mod utils;
pub mod validation;

// Re-export types at crate root for convenient importing
pub use crate::database::{Db, TransactionError, with_transaction};

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::config::Config;

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    /// Shared application database
    pub db: Db,
    /// Runtime configuration (token secret, bind address, data path)
    pub config: Config,
}

/// Build the application router. Shared between the server binary and the
/// integration test harness.
pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/user/register", post(auth::register))
        .route("/user/login", post(auth::login))
        .route("/user/", put(auth::edit_user).delete(auth::delete_user))
        .route(
            "/category/",
            get(categories::get_categories)
                .post(categories::add_category)
                .delete(categories::delete_category),
        )
        .route(
            "/transaction/",
            get(transactions::get_transactions).post(transactions::add_transaction),
        )
        .route(
            "/transaction/{transaction_id}",
            get(transactions::get_transaction)
                .put(transactions::edit_transaction)
                .delete(transactions::delete_transaction),
        )
        .with_state(app_state)
}
