//! # 레시피 라우트 핸들러
//!
//! ## 엔드포인트
//! - `GET    /api/recipes/`       → 목록 (필터: tags, author, is_favorited, is_in_shopping_cart)
//! - `POST   /api/recipes/`       → 생성 (로그인, 201)
//! - `GET    /api/recipes/{id}/`  → 단일 조회
//! - `PATCH  /api/recipes/{id}/`  → 수정 (작성자 또는 관리자)
//! - `DELETE /api/recipes/{id}/`  → 삭제 (작성자 또는 관리자, 204)
//!
//! ## 이미지 처리 순서
//! 이미지는 DB 트랜잭션보다 먼저 디스크에 씁니다. DB 쓰기가 실패하면 방금 쓴
//! 파일을 지우고, 수정이 성공하면 교체된 예전 파일을 지웁니다.

use crate::{
    db,
    db::lists::RecipeList,
    error::{AppError, ValidationErrors},
    extract::{JsonBody, MultiQuery},
    middleware::{require_owner_or_admin, AuthUser, Viewer},
    models::*,
    routes::{users::profile_for, AppState},
    services::images,
    validators,
};
use axum::{
    extract::{OriginalUri, Path, State},
    http::StatusCode,
    Json,
};

/// 레시피 한 건의 전체 응답 표현을 조립합니다.
///
/// 즐겨찾기/장바구니 여부는 조회하는 사람 기준이고, 익명이면 false입니다.
pub(crate) async fn recipe_read(
    state: &AppState,
    recipe: Recipe,
    viewer_id: Option<i64>,
) -> Result<RecipeRead, AppError> {
    let tags = db::get_recipe_tags(&state.pool, recipe.id).await?;
    let ingredients = db::get_recipe_ingredients(&state.pool, recipe.id).await?;
    let author = db::users::find_by_id(&state.pool, recipe.author_id)
        .await?
        .ok_or_else(|| {
            AppError::Internal(format!(
                "Author {} of recipe {} is missing",
                recipe.author_id, recipe.id
            ))
        })?;
    let author = profile_for(state, author, viewer_id).await?;

    let (is_favorited, is_in_shopping_cart) = match viewer_id {
        Some(user_id) => (
            db::lists::contains(&state.pool, RecipeList::Favorites, user_id, recipe.id).await?,
            db::lists::contains(&state.pool, RecipeList::ShoppingCart, user_id, recipe.id).await?,
        ),
        None => (false, false),
    };

    Ok(RecipeRead {
        id: recipe.id,
        tags,
        author,
        ingredients,
        is_favorited,
        is_in_shopping_cart,
        name: recipe.name,
        image: images::image_url(&state.media_url, &recipe.image),
        text: recipe.text,
        cooking_time: recipe.cooking_time,
    })
}

/// `GET /api/recipes/?tags=lunch&tags=dinner&author=3&is_favorited=1&page=2&limit=6`
///
/// `tags`가 여러 번 올 수 있어서 axum-extra `Query` 기반의 `MultiQuery`를 씁니다.
pub async fn list_recipes(
    State(state): State<AppState>,
    viewer: Viewer,
    OriginalUri(uri): OriginalUri,
    MultiQuery(query): MultiQuery<RecipeQuery>,
) -> Result<Json<Page<RecipeRead>>, AppError> {
    let filter = RecipeFilter::from_query(&query, viewer.user_id());
    let request = PageRequest::new(query.page_params(), state.page_size);

    let count = db::count_recipes(&state.pool, &filter).await?;
    request.check_in_range(count)?;

    let recipes = db::list_recipes(&state.pool, &filter, request.limit(), request.offset()).await?;
    let mut results = Vec::with_capacity(recipes.len());
    for recipe in recipes {
        results.push(recipe_read(&state, recipe, viewer.user_id()).await?);
    }

    Ok(Json(Page::new(results, count, request, uri.path(), uri.query())))
}

pub async fn get_recipe(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<i64>,
) -> Result<Json<RecipeRead>, AppError> {
    let recipe = db::get_recipe(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(recipe_read(&state, recipe, viewer.user_id()).await?))
}

/// `POST /api/recipes/` → 201 + 전체 표현
pub async fn create_recipe(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(req): JsonBody<RecipeWriteRequest>,
) -> Result<(StatusCode, Json<RecipeRead>), AppError> {
    let input = validators::validate_recipe(&req).map_err(AppError::Validation)?;
    let image = match req.image.as_deref().filter(|s| !s.is_empty()) {
        Some(data_url) => images::decode_data_url(data_url).map_err(AppError::Validation)?,
        None => {
            return Err(AppError::Validation(ValidationErrors::single(
                "image",
                "This field is required.",
            )))
        }
    };

    let image_path = images::save_image(&state.media_path, &image).await?;
    let recipe = match db::create_recipe(&state.pool, auth.user.id, &input, &image_path).await {
        Ok(recipe) => recipe,
        Err(e) => {
            images::remove_image(&state.media_path, &image_path).await;
            return Err(e);
        }
    };

    tracing::info!(recipe_id = recipe.id, author_id = auth.user.id, "Recipe created");
    let read = recipe_read(&state, recipe, Some(auth.user.id)).await?;
    Ok((StatusCode::CREATED, Json(read)))
}

/// `PATCH /api/recipes/{id}/`
///
/// 재료와 태그 목록은 통째로 교체됩니다. `image`를 생략하면 기존 이미지를 유지합니다.
pub async fn update_recipe(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    JsonBody(req): JsonBody<RecipeWriteRequest>,
) -> Result<Json<RecipeRead>, AppError> {
    let existing = db::get_recipe(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound)?;
    require_owner_or_admin(&auth.user, existing.author_id)?;

    let input = validators::validate_recipe(&req).map_err(AppError::Validation)?;
    let new_image = match req.image.as_deref().filter(|s| !s.is_empty()) {
        Some(data_url) => {
            let image = images::decode_data_url(data_url).map_err(AppError::Validation)?;
            Some(images::save_image(&state.media_path, &image).await?)
        }
        None => None,
    };

    let updated = db::update_recipe(&state.pool, id, &input, new_image.as_deref())
        .await
        .and_then(|recipe| recipe.ok_or(AppError::NotFound));
    let recipe = match updated {
        Ok(recipe) => recipe,
        Err(e) => {
            if let Some(path) = &new_image {
                images::remove_image(&state.media_path, path).await;
            }
            return Err(e);
        }
    };

    if new_image.is_some() {
        images::remove_image(&state.media_path, &existing.image).await;
    }

    let read = recipe_read(&state, recipe, Some(auth.user.id)).await?;
    Ok(Json(read))
}

/// `DELETE /api/recipes/{id}/` → 204
pub async fn delete_recipe(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let recipe = db::get_recipe(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound)?;
    require_owner_or_admin(&auth.user, recipe.author_id)?;

    if !db::delete_recipe(&state.pool, id).await? {
        return Err(AppError::NotFound);
    }
    images::remove_image(&state.media_path, &recipe.image).await;

    tracing::info!(recipe_id = id, user_id = auth.user.id, "Recipe deleted");
    Ok(StatusCode::NO_CONTENT)
}
