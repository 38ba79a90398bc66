//! Image upload — POST /api/upload/images (multipart).
//!
//! Files land in the configured uploads directory under a unique name and
//! are returned as `/uploads/...` references, which both the static mount
//! and the dispatch attachment resolver understand.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::app::AppState;

type ApiError = (StatusCode, Json<Value>);

pub async fn upload_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let mut urls: Vec<String> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        warn!(error = %e, "malformed multipart body");
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "malformed multipart body" })),
        )
    })? {
        if field.name() != Some("images") {
            continue;
        }

        let ext = field
            .file_name()
            .map(extension_of)
            .unwrap_or_default();
        let filename = unique_filename(&ext);

        let bytes = field.bytes().await.map_err(|e| {
            warn!(error = %e, "failed reading upload field");
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "message": "failed reading upload" })),
            )
        })?;

        let dest = Path::new(&state.config.uploads.dir).join(&filename);
        tokio::fs::write(&dest, &bytes).await.map_err(|e| {
            warn!(path = %dest.display(), error = %e, "failed writing upload");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "failed storing upload" })),
            )
        })?;

        info!(file = %filename, bytes = bytes.len(), "image uploaded");
        urls.push(format!("/uploads/{filename}"));
    }

    if urls.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "No files uploaded" })),
        ));
    }
    Ok(Json(json!({ "urls": urls })))
}

/// `images-<millis>-<rand><ext>` — unique per upload, keeps the original
/// extension so the browser and Discord render previews.
fn unique_filename(ext: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let rand = &Uuid::new_v4().simple().to_string()[..8];
    format!("images-{millis}-{rand}{ext}")
}

/// Extension including the dot, sanitised to alphanumerics.
fn extension_of(original: &str) -> String {
    Path::new(original)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_kept_and_lowercased() {
        assert_eq!(extension_of("photo.PNG"), ".png");
        assert_eq!(extension_of("archive.tar.gz"), ".gz");
    }

    #[test]
    fn weird_extensions_are_dropped() {
        assert_eq!(extension_of("noext"), "");
        assert_eq!(extension_of("tricky.p/ng"), "");
    }

    #[test]
    fn filenames_are_unique() {
        let a = unique_filename(".png");
        let b = unique_filename(".png");
        assert_ne!(a, b);
        assert!(a.starts_with("images-"));
        assert!(a.ends_with(".png"));
    }
}
