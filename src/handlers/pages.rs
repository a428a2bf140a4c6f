use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::queries::{self, PageCreation};
use crate::db::AppState;
use crate::error::{AppError, Result};
use crate::models::{CreatePage, Page};

#[derive(Debug, Deserialize)]
pub struct CreatePageRequest {
    /// Capability token identifying the owner.
    pub owner_token: String,
    pub title: String,
    pub slug: String,
    pub color: String,
    pub image: String,
    pub description: String,
}

#[derive(Serialize)]
pub struct CreatePageResponse {
    pub page: Page,
    /// Owner's balance after the debit.
    pub credits: i64,
}

/// Create a trackable page, debiting the owner's balance.
///
/// The slug check, the debit, and the insert share one transaction: a
/// rejected creation is never charged, and a charged creation always
/// produces a page.
pub async fn create_page(
    State(state): State<AppState>,
    Json(input): Json<CreatePageRequest>,
) -> Result<impl IntoResponse> {
    if input.title.trim().is_empty() {
        return Err(AppError::BadRequest("Title cannot be empty".into()));
    }
    if input.slug.trim().is_empty() {
        return Err(AppError::BadRequest("Slug cannot be empty".into()));
    }

    let mut conn = state.db.get()?;

    let owner = queries::find_user_by_public_token(&conn, &input.owner_token)?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let create = CreatePage {
        title: input.title,
        slug: input.slug,
        color: input.color,
        image: input.image,
        description: input.description,
    };

    match queries::create_page(&mut conn, &owner.id, &create, state.page_cost)? {
        PageCreation::Created { page, balance } => {
            tracing::info!(
                "Page created: id={}, owner={}, slug={}, balance={}",
                page.id,
                owner.id,
                page.slug,
                balance
            );
            Ok((
                StatusCode::CREATED,
                Json(CreatePageResponse {
                    page,
                    credits: balance,
                }),
            ))
        }
        PageCreation::SlugTaken => Err(AppError::Conflict("Page already exists".into())),
        PageCreation::InsufficientCredits { balance } => Err(AppError::InsufficientCredits {
            balance,
            required: state.page_cost,
        }),
    }
}

#[derive(Debug, Deserialize)]
pub struct ListPagesParams {
    pub owner_token: String,
}

/// List the pages created by the token's owner.
pub async fn list_pages(
    State(state): State<AppState>,
    Query(params): Query<ListPagesParams>,
) -> Result<impl IntoResponse> {
    let conn = state.db.get()?;

    let owner = queries::find_user_by_public_token(&conn, &params.owner_token)?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let pages = queries::list_pages_by_owner(&conn, &owner.id)?;
    Ok(Json(pages))
}

/// Public page fetch by owner token + slug, the address visitors land on.
pub async fn get_page(
    State(state): State<AppState>,
    Path((token, slug)): Path<(String, String)>,
) -> Result<impl IntoResponse> {
    let conn = state.db.get()?;

    let page = queries::get_page_by_token_and_slug(&conn, &token, &slug)?
        .ok_or_else(|| AppError::NotFound("Page not found".into()))?;

    Ok(Json(page))
}
