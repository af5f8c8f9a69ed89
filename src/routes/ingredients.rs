//! # 재료 API 라우트 핸들러
//!
//! - `GET /api/ingredients/?name=sa`: 이름 접두사 검색 (대소문자 무시, 페이지네이션 없음)
//! - `GET /api/ingredients/{id}/`
//! - `POST`, `PATCH`, `DELETE`: 관리자 전용

use crate::{
    db,
    error::{AppError, ValidationErrors},
    extract::{JsonBody, QueryParams},
    middleware::{require_admin, AuthUser},
    models::*,
    routes::AppState,
    validators,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

const DUPLICATE: &str = "An ingredient with this name and measurement unit already exists.";

pub async fn list_ingredients(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<IngredientQuery>,
) -> Result<Json<Vec<Ingredient>>, AppError> {
    let ingredients = db::list_ingredients(&state.pool, query.name.as_deref()).await?;
    Ok(Json(ingredients))
}

pub async fn get_ingredient(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Ingredient>, AppError> {
    let ingredient = db::get_ingredient(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(ingredient))
}

/// (이름, 단위) UNIQUE 위반을 검증 에러로 바꿉니다.
fn duplicate_to_validation(err: AppError) -> AppError {
    if err.is_unique_violation() {
        AppError::Validation(ValidationErrors::single("name", DUPLICATE))
    } else {
        err
    }
}

pub async fn create_ingredient(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(req): JsonBody<IngredientRequest>,
) -> Result<(StatusCode, Json<Ingredient>), AppError> {
    require_admin(&auth.user)?;

    let req = validators::validate_ingredient(&req).map_err(AppError::Validation)?;
    let ingredient = db::create_ingredient(&state.pool, &req)
        .await
        .map_err(duplicate_to_validation)?;
    Ok((StatusCode::CREATED, Json(ingredient)))
}

pub async fn update_ingredient(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    JsonBody(req): JsonBody<UpdateIngredientRequest>,
) -> Result<Json<Ingredient>, AppError> {
    require_admin(&auth.user)?;

    let req = validators::validate_ingredient_update(&req).map_err(AppError::Validation)?;
    let ingredient = db::update_ingredient(&state.pool, id, &req)
        .await
        .map_err(duplicate_to_validation)?
        .ok_or(AppError::NotFound)?;
    Ok(Json(ingredient))
}

/// 재료를 지우면 그 재료를 쓰던 레시피의 재료 줄도 함께 사라집니다.
pub async fn delete_ingredient(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    require_admin(&auth.user)?;

    if !db::delete_ingredient(&state.pool, id).await? {
        return Err(AppError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}
