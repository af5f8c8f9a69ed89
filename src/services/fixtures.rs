//! # 시작 시 데이터 준비
//!
//! - 참조 데이터 불러오기: `FIXTURES_PATH` 디렉토리의 `ingredients.json`, `tags.json`
//! - 관리자 계정 보장: `ADMIN_EMAIL` / `ADMIN_USERNAME` / `ADMIN_PASSWORD`
//!
//! 둘 다 여러 번 실행해도 결과가 같습니다. 이미 있는 행은 건너뜁니다.

use crate::config::AdminBootstrap;
use crate::db;
use crate::error::AppError;
use crate::models::*;
use crate::services::passwords;
use crate::validators;
use serde::de::DeserializeOwned;
use sqlx::SqlitePool;
use std::path::Path;
use tokio::fs;

/// 불러오기 결과 (새로 추가된 행 수 / 검증 실패로 건너뛴 행 수)
#[derive(Debug, Default, PartialEq, Eq)]
pub struct FixtureReport {
    pub ingredients_added: usize,
    pub tags_added: usize,
    pub skipped: usize,
}

/// JSON 배열 파일을 읽습니다. 파일이 없으면 빈 목록입니다.
async fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, AppError> {
    if !fs::try_exists(path).await? {
        tracing::debug!(path = %path.display(), "Fixture file not found, skipping");
        return Ok(Vec::new());
    }
    let raw = fs::read_to_string(path).await?;
    serde_json::from_str(&raw)
        .map_err(|e| AppError::Internal(format!("Invalid fixture file {}: {}", path.display(), e)))
}

pub async fn load_fixtures(pool: &SqlitePool, dir: &Path) -> Result<FixtureReport, AppError> {
    let mut report = FixtureReport::default();

    let ingredients: Vec<IngredientRequest> = read_rows(&dir.join("ingredients.json")).await?;
    for row in &ingredients {
        match validators::validate_ingredient(row) {
            Ok(clean) => {
                if db::insert_ingredient_if_missing(pool, &clean).await? {
                    report.ingredients_added += 1;
                }
            }
            Err(errors) => {
                tracing::warn!(name = %row.name, %errors, "Skipping invalid ingredient fixture");
                report.skipped += 1;
            }
        }
    }

    let tags: Vec<CreateTagRequest> = read_rows(&dir.join("tags.json")).await?;
    for row in &tags {
        let tag = match validators::validate_new_tag(row) {
            Ok(tag) => tag,
            Err(errors) => {
                tracing::warn!(name = %row.name, %errors, "Skipping invalid tag fixture");
                report.skipped += 1;
                continue;
            }
        };
        let (name_taken, slug_taken) =
            db::find_tag_conflicts(pool, Some(tag.name.as_str()), Some(tag.slug.as_str()), None).await?;
        if name_taken || slug_taken {
            continue;
        }
        db::create_tag(pool, &tag.name, &tag.color, &tag.slug).await?;
        report.tags_added += 1;
    }

    tracing::info!(
        ingredients = report.ingredients_added,
        tags = report.tags_added,
        skipped = report.skipped,
        "Fixtures loaded"
    );
    Ok(report)
}

/// 관리자 계정이 있도록 보장합니다.
///
/// 같은 이메일의 계정이 있으면 관리자로 승격만 하고 비밀번호는 건드리지 않습니다.
pub async fn ensure_admin(pool: &SqlitePool, admin: &AdminBootstrap) -> Result<User, AppError> {
    if let Some(user) = db::users::find_by_email(pool, &admin.email).await? {
        if !user.is_admin() {
            db::users::set_role(pool, user.id, Role::Admin).await?;
            tracing::info!(email = %admin.email, "Promoted existing user to admin");
        }
        return db::users::find_by_id(pool, user.id)
            .await?
            .ok_or_else(|| AppError::Internal("Admin user disappeared".to_string()));
    }

    let password_hash = passwords::hash_password(&admin.password)?;
    let request = RegisterRequest {
        email: admin.email.clone(),
        username: admin.username.clone(),
        first_name: String::new(),
        last_name: String::new(),
        password: String::new(),
    };
    let user = db::users::create_user(pool, &request, &password_hash, Role::Admin).await?;
    tracing::info!(email = %admin.email, "Created admin user");
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{register, test_pool};

    #[tokio::test]
    async fn fixtures_load_once_and_skip_invalid_rows() {
        let pool = test_pool().await;
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("ingredients.json"),
            r#"[
                {"name": "Salt", "measurement_unit": "g"},
                {"name": "Salt", "measurement_unit": "g"},
                {"name": "Milk", "measurement_unit": "ml"},
                {"name": "", "measurement_unit": "g"}
            ]"#,
        )
        .unwrap();
        std::fs::write(
            dir.path().join("tags.json"),
            r##"[
                {"name": "Breakfast", "color": "#FFA500", "slug": "breakfast"},
                {"name": "Odd", "color": "#123456", "slug": "odd"}
            ]"##,
        )
        .unwrap();

        let report = load_fixtures(&pool, dir.path()).await.unwrap();
        assert_eq!(
            report,
            FixtureReport {
                ingredients_added: 2,
                tags_added: 1,
                skipped: 2,
            }
        );

        let again = load_fixtures(&pool, dir.path()).await.unwrap();
        assert_eq!(again.ingredients_added, 0);
        assert_eq!(again.tags_added, 0);

        let tags = db::list_tags(&pool).await.unwrap();
        assert_eq!(tags[0].color, "#ffa500");
    }

    #[tokio::test]
    async fn missing_fixture_files_are_fine() {
        let pool = test_pool().await;
        let dir = tempfile::tempdir().unwrap();
        let report = load_fixtures(&pool, dir.path()).await.unwrap();
        assert_eq!(report, FixtureReport::default());
    }

    #[tokio::test]
    async fn admin_is_created_or_promoted() {
        let pool = test_pool().await;
        let admin = AdminBootstrap {
            email: "chef@example.com".to_string(),
            username: "chef".to_string(),
            password: "s3cret-pass".to_string(),
        };

        let created = ensure_admin(&pool, &admin).await.unwrap();
        assert!(created.is_admin());
        assert!(passwords::verify_password("s3cret-pass", &created.password_hash).unwrap());

        let existing = register(&pool, "cook", Role::User).await;
        let promote = AdminBootstrap {
            email: existing.email.clone(),
            username: "ignored".to_string(),
            password: "whatever".to_string(),
        };
        let promoted = ensure_admin(&pool, &promote).await.unwrap();
        assert_eq!(promoted.id, existing.id);
        assert!(promoted.is_admin());
    }
}
