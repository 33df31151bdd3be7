//! # 레시피 이미지 서비스
//!
//! 업로드된 이미지의 검증, 저장 경로 생성, 디스크 쓰기/삭제를 담당합니다.
//!
//! 저장 경로 규칙: `uploads/recipe/<랜덤 UUID>.<원본 확장자>`
//! 원본 파일 이름은 확장자만 남기고 버립니다. 이름 충돌과
//! `../` 같은 경로 조작은 저장 경로에 반영되지 않습니다.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{ImageFormat, ImageReader};
use tokio::fs;

use crate::error::AppError;

/// 미디어 루트 기준 레시피 이미지 디렉토리
pub const RECIPE_IMAGE_DIR: &str = "uploads/recipe";

/// 허용하는 이미지 포맷
pub const ALLOWED_FORMATS: [ImageFormat; 4] = [
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::Gif,
    ImageFormat::WebP,
];

/// 고유 식별자와 원본 파일 이름으로 저장 경로를 만듭니다.
///
/// 식별자를 인자로 받으므로 테스트에서 고정값을 넣을 수 있습니다.
///
/// ```text
/// recipe_image_file_path("myimage.jpg", "test-uuid") → "uploads/recipe/test-uuid.jpg"
/// ```
pub fn recipe_image_file_path(filename: &str, unique_id: &str) -> String {
    match safe_extension(filename) {
        Some(ext) => format!("{RECIPE_IMAGE_DIR}/{unique_id}.{ext}"),
        None => format!("{RECIPE_IMAGE_DIR}/{unique_id}"),
    }
}

/// UUIDv4로 새 저장 경로를 만듭니다.
pub fn new_recipe_image_path(filename: &str) -> String {
    recipe_image_file_path(filename, &uuid::Uuid::new_v4().to_string())
}

/// 확장자는 ASCII 영숫자로만 이루어진 경우에만 (소문자로) 사용합니다.
fn safe_extension(filename: &str) -> Option<String> {
    let ext = Path::new(filename).extension()?.to_str()?;
    if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// 바이트가 허용된 포맷의 디코딩 가능한 이미지인지 확인합니다.
///
/// 확장자나 Content-Type은 믿지 않고, 매직 바이트로 포맷을 감지한 뒤 실제로 디코딩해 봅니다.
pub fn validate_image(data: &[u8]) -> Result<ImageFormat, String> {
    let invalid = "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";

    if data.is_empty() {
        return Err("The submitted file is empty.".to_string());
    }

    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|_| invalid.to_string())?;

    let format = reader.format().ok_or_else(|| invalid.to_string())?;
    if !ALLOWED_FORMATS.contains(&format) {
        return Err(format!(
            "Unsupported image format: {:?}. Allowed: JPEG, PNG, GIF, WebP",
            format
        ));
    }

    reader.decode().map_err(|_| invalid.to_string())?;
    Ok(format)
}

/// 이미지를 `media_root/relative_path`에 저장합니다. 부모 디렉토리는 자동 생성합니다.
pub async fn save_image(media_root: &str, relative_path: &str, data: &[u8]) -> Result<(), AppError> {
    let full_path = PathBuf::from(media_root).join(relative_path);

    if let Some(parent) = full_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    fs::write(&full_path, data).await?;
    Ok(())
}

/// 이미지 파일을 지웁니다. 이미 없거나 실패해도 에러로 취급하지 않습니다.
pub async fn remove_image(media_root: &str, relative_path: &str) {
    let full_path = PathBuf::from(media_root).join(relative_path);
    if let Err(e) = fs::remove_file(&full_path).await {
        tracing::debug!("Could not remove {}: {}", full_path.display(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbImage::new(4, 4);
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    #[test]
    fn image_path_uses_uuid_and_extension() {
        assert_eq!(
            recipe_image_file_path("myimage.jpg", "test-uuid"),
            "uploads/recipe/test-uuid.jpg"
        );
    }

    #[test]
    fn image_path_drops_directories_and_odd_extensions() {
        assert_eq!(
            recipe_image_file_path("../../etc/photo.PNG", "id"),
            "uploads/recipe/id.png"
        );
        assert_eq!(recipe_image_file_path("noext", "id"), "uploads/recipe/id");
        assert_eq!(recipe_image_file_path("a.j$g", "id"), "uploads/recipe/id");
    }

    #[test]
    fn generated_paths_are_unique() {
        assert_ne!(new_recipe_image_path("a.jpg"), new_recipe_image_path("a.jpg"));
    }

    #[test]
    fn png_is_accepted() {
        assert_eq!(validate_image(&png_bytes()), Ok(ImageFormat::Png));
    }

    #[test]
    fn text_is_rejected() {
        assert!(validate_image(b"notimage").is_err());
        assert!(validate_image(b"").is_err());
    }

    #[tokio::test]
    async fn save_and_remove_image() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_str().unwrap();
        let path = recipe_image_file_path("x.png", "saved");

        save_image(root, &path, &png_bytes()).await.unwrap();
        assert!(dir.path().join(&path).exists());

        remove_image(root, &path).await;
        assert!(!dir.path().join(&path).exists());
    }
}
