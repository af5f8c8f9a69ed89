//! # 레시피 이미지 저장 서비스
//!
//! 요청 본문의 `data:image/<ext>;base64,<payload>` 문자열을 디코딩해
//! `{MEDIA_PATH}/recipes/images/{uuidv7}.{ext}`에 저장합니다.
//!
//! DB에는 미디어 디렉토리 기준 상대 경로만 저장하고,
//! 응답에서는 `MEDIA_URL`을 앞에 붙여 전체 URL로 내보냅니다.

use crate::error::{AppError, ValidationErrors};
use base64::{engine::general_purpose::STANDARD, Engine};
use std::path::PathBuf;
use tokio::fs;

pub const IMAGE_DIR: &str = "recipes/images";

/// 디코딩된 이미지의 최대 크기 (10 MiB)
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

const ALLOWED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];

/// 디코딩된 이미지 (아직 디스크에 쓰지 않은 상태)
#[derive(Debug, PartialEq, Eq)]
pub struct DecodedImage {
    pub extension: String,
    pub bytes: Vec<u8>,
}

fn invalid(message: impl Into<String>) -> ValidationErrors {
    ValidationErrors::single("image", message)
}

/// data URL을 파싱하고 base64를 디코딩합니다.
///
/// 실패는 모두 `image` 필드의 검증 에러입니다.
pub fn decode_data_url(data_url: &str) -> Result<DecodedImage, ValidationErrors> {
    let rest = data_url
        .strip_prefix("data:image/")
        .ok_or_else(|| invalid("Image must be a data:image/<type>;base64 URL"))?;
    let (extension, payload) = rest
        .split_once(";base64,")
        .ok_or_else(|| invalid("Image must be base64 encoded"))?;

    let extension = extension.to_ascii_lowercase();
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(invalid(format!(
            "Unsupported image type '{}'. Allowed: {}",
            extension,
            ALLOWED_EXTENSIONS.join(", ")
        )));
    }

    // 디코딩 전에 대략적인 크기로 먼저 거릅니다 (base64는 4글자 → 3바이트).
    if payload.len() / 4 * 3 > MAX_IMAGE_BYTES + 3 {
        return Err(invalid("Image is larger than 10 MiB"));
    }

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|_| invalid("Image payload is not valid base64"))?;

    if bytes.is_empty() {
        return Err(invalid("Image is empty"));
    }
    if bytes.len() > MAX_IMAGE_BYTES {
        return Err(invalid("Image is larger than 10 MiB"));
    }

    Ok(DecodedImage { extension, bytes })
}

/// 이미지를 디스크에 저장하고 미디어 디렉토리 기준 상대 경로를 돌려줍니다.
pub async fn save_image(media_path: &str, image: &DecodedImage) -> Result<String, AppError> {
    let relative = format!(
        "{}/{}.{}",
        IMAGE_DIR,
        uuid::Uuid::now_v7(),
        image.extension
    );
    let full_path = PathBuf::from(media_path).join(&relative);

    if let Some(parent) = full_path.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(&full_path, &image.bytes).await?;

    tracing::debug!(path = %relative, size = image.bytes.len(), "Saved recipe image");
    Ok(relative)
}

/// 이미지 파일을 지웁니다. 실패해도 요청은 성공으로 처리하고 경고만 남깁니다.
pub async fn remove_image(media_path: &str, relative: &str) {
    if relative.is_empty() {
        return;
    }
    let full_path = PathBuf::from(media_path).join(relative);
    if let Err(e) = fs::remove_file(&full_path).await {
        tracing::warn!(path = %full_path.display(), error = %e, "Failed to remove recipe image");
    }
}

pub fn image_url(media_url: &str, relative: &str) -> String {
    format!("{}{}", media_url, relative)
}
