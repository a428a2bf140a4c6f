pub mod pages;
pub mod users;
pub mod webhooks;

use axum::{
    routing::{get, post},
    Router,
};

use crate::db::AppState;

/// Account and page endpoints.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/users", post(users::create_user))
        .route("/users/:id/credits", get(users::get_balance))
        .route("/pages", post(pages::create_page).get(pages::list_pages))
        .route("/pages/:token/:slug", get(pages::get_page))
}
