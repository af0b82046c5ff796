//! Upload API endpoints
//!
//! - POST /api/upload/carousel - multipart field `file`, images only
//!
//! The file is read chunk by chunk and rejected as soon as it grows past the
//! configured limit, so an oversized upload never reaches the filesystem.

use axum::{
    extract::{multipart::Field, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::post,
    Router,
};
use serde::Serialize;
use std::path::Path;
use tokio::fs;

use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::{ApiResponse, ApiResult};
use crate::config::UploadConfig;

const CAROUSEL_DIR: &str = "carousel";
/// Room for multipart boundaries and headers on top of the file itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;
const MAX_NAME_LEN: usize = 100;

const NO_FILE: &str = "Nenhum arquivo enviado";
const INVALID_TYPE: &str = "Tipo de arquivo inválido. Apenas imagens são permitidas";

/// Response for successful upload
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
    pub filename: String,
    pub size: u64,
    pub content_type: String,
}

/// Build the upload router; the body limit follows the configured file size
pub fn router(config: &UploadConfig) -> Router<AppState> {
    let body_limit = usize::try_from(config.max_file_size)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);
    Router::new()
        .route("/carousel", post(upload_carousel_image))
        .layer(DefaultBodyLimit::max(body_limit))
}

fn too_large(config: &UploadConfig) -> ApiError {
    ApiError::payload_too_large(format!(
        "Arquivo muito grande. Máximo {}",
        config.max_file_size_label()
    ))
}

fn multipart_error(config: &UploadConfig, e: axum::extract::multipart::MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        too_large(config)
    } else {
        ApiError::validation_error(format!("Falha ao ler o envio: {}", e.body_text()))
    }
}

/// POST /api/upload/carousel
async fn upload_carousel_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<UploadResponse> {
    let config = state.upload_config.as_ref();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(config, e))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let original_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        if original_name.is_empty() && content_type.is_empty() {
            // browsers send an empty part when no file was chosen
            break;
        }
        if !config.is_type_allowed(&content_type) {
            return Err(ApiError::validation_error(INVALID_TYPE));
        }

        let data = read_limited(field, config).await?;
        if data.is_empty() {
            break;
        }

        let filename = format!(
            "{}-{}",
            chrono::Utc::now().timestamp_millis(),
            sanitize_filename(&original_name, config.get_extension(&content_type))
        );
        let dir = config.path.join(CAROUSEL_DIR);
        ensure_upload_dir(&dir).await?;
        fs::write(dir.join(&filename), &data).await.map_err(|e| {
            tracing::error!("Failed to save upload {}: {}", filename, e);
            ApiError::internal_error("Falha ao salvar o arquivo")
        })?;

        tracing::info!("Stored carousel image {} ({} bytes)", filename, data.len());
        return Ok(ApiResponse::ok(UploadResponse {
            url: format!("/uploads/{}/{}", CAROUSEL_DIR, filename),
            filename,
            size: data.len() as u64,
            content_type,
        }));
    }

    Err(ApiError::validation_error(NO_FILE))
}

async fn read_limited(mut field: Field<'_>, config: &UploadConfig) -> Result<Vec<u8>, ApiError> {
    let mut data = Vec::new();
    while let Some(chunk) = field.chunk().await.map_err(|e| multipart_error(config, e))? {
        if (data.len() + chunk.len()) as u64 > config.max_file_size {
            return Err(too_large(config));
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

async fn ensure_upload_dir(path: &Path) -> Result<(), ApiError> {
    fs::create_dir_all(path).await.map_err(|e| {
        tracing::error!("Failed to create upload dir {}: {}", path.display(), e);
        ApiError::internal_error("Falha ao salvar o arquivo")
    })
}

/// Keep ASCII letters, digits, `.`, `-` and `_`; everything else becomes `_`.
/// Falls back to `imagem.<ext>` when nothing usable is left.
fn sanitize_filename(name: &str, fallback_ext: &str) -> String {
    // some clients send a full path
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.trim_matches('_').is_empty() {
        return format!("imagem.{}", fallback_ext);
    }
    if cleaned.len() <= MAX_NAME_LEN {
        return cleaned.to_string();
    }
    // keep the extension when truncating
    match cleaned.rsplit_once('.') {
        Some((stem, ext)) if ext.len() < 10 => {
            let keep = MAX_NAME_LEN.saturating_sub(ext.len() + 1);
            format!("{}.{}", &stem[..keep.min(stem.len())], ext)
        }
        _ => cleaned[..MAX_NAME_LEN].to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("banner.png", "png"), "banner.png");
        assert_eq!(sanitize_filename("Feira 2026 (final).JPG", "jpg"), "Feira_2026__final_.JPG");
        assert_eq!(sanitize_filename("../../etc/passwd", "png"), "passwd");
        assert_eq!(sanitize_filename("C:\\fotos\\gado.webp", "webp"), "gado.webp");
        assert_eq!(sanitize_filename(".hidden.gif", "gif"), "hidden.gif");
        assert_eq!(sanitize_filename("çãõ", "png"), "imagem.png");
        assert_eq!(sanitize_filename("", "bin"), "imagem.bin");
    }

    #[test]
    fn test_sanitize_truncates_but_keeps_extension() {
        let long = format!("{}.png", "a".repeat(300));
        let cleaned = sanitize_filename(&long, "png");
        assert_eq!(cleaned.len(), MAX_NAME_LEN);
        assert!(cleaned.ends_with(".png"));
    }
}
