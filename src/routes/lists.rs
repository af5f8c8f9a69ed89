//! # 즐겨찾기 / 장바구니 라우트 핸들러
//!
//! 두 목록은 테이블만 다르고 동작이 같아서 `RecipeList`로 묶어 처리합니다.
//!
//! | 메서드 | 경로 | 설명 |
//! |--------|------|------|
//! | POST/DELETE | /api/recipes/{id}/favorite/ | 즐겨찾기 추가/제거 |
//! | POST/DELETE | /api/recipes/{id}/shopping_cart/ | 장바구니 추가/제거 |
//! | GET | /api/recipes/download_shopping_cart/ | 장바구니 재료 합계 PDF |

use crate::{
    db,
    db::lists::RecipeList,
    error::AppError,
    middleware::AuthUser,
    models::RecipeShort,
    routes::AppState,
    services::shopping_list,
};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

async fn add_to_list(
    state: &AppState,
    user_id: i64,
    recipe_id: i64,
    list: RecipeList,
) -> Result<(StatusCode, Json<RecipeShort>), AppError> {
    let recipe = db::get_recipe(&state.pool, recipe_id)
        .await?
        .ok_or(AppError::NotFound)?;

    db::lists::add(&state.pool, list, user_id, recipe.id).await?;

    tracing::debug!(user_id, recipe_id, list = list.label(), "Recipe added to list");
    Ok((
        StatusCode::CREATED,
        Json(RecipeShort::new(recipe, &state.media_url)),
    ))
}

async fn remove_from_list(
    state: &AppState,
    user_id: i64,
    recipe_id: i64,
    list: RecipeList,
) -> Result<StatusCode, AppError> {
    if db::get_recipe(&state.pool, recipe_id).await?.is_none() {
        return Err(AppError::NotFound);
    }

    if !db::lists::remove(&state.pool, list, user_id, recipe_id).await? {
        return Err(AppError::Conflict(format!(
            "Recipe is not in {}",
            list.label()
        )));
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_favorite(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<RecipeShort>), AppError> {
    add_to_list(&state, auth.user.id, id, RecipeList::Favorites).await
}

pub async fn remove_favorite(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    remove_from_list(&state, auth.user.id, id, RecipeList::Favorites).await
}

pub async fn add_to_cart(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<RecipeShort>), AppError> {
    add_to_list(&state, auth.user.id, id, RecipeList::ShoppingCart).await
}

pub async fn remove_from_cart(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    remove_from_list(&state, auth.user.id, id, RecipeList::ShoppingCart).await
}

/// `GET /api/recipes/download_shopping_cart/`
///
/// 장바구니가 비어 있어도 안내 문구가 들어간 PDF를 돌려줍니다.
pub async fn download_shopping_cart(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let items = db::lists::shopping_list(&state.pool, auth.user.id).await?;
    let lines = shopping_list::render_lines(&items);
    let bytes = shopping_list::render_pdf(&lines)?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (header::CONTENT_DISPOSITION, shopping_list::CONTENT_DISPOSITION),
        ],
        bytes,
    ))
}
