//! Uploaded media files.

use actix_web::{HttpResponse, web};
use yatube_core::forms::ImageKind;
use yatube_core::ports::MediaError;

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /media/{path}
pub async fn serve(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let path = path.into_inner();
    let bytes = match state.media.read(&path).await {
        Ok(Some(bytes)) => bytes,
        Ok(None) | Err(MediaError::InvalidPath(_)) => {
            return Err(AppError::NotFound(format!("media file '{}'", path)));
        }
        Err(e) => return Err(AppError::Internal(e.to_string())),
    };

    let content_type = ImageKind::from_path(&path)
        .or_else(|| ImageKind::sniff(&bytes))
        .map(|kind| kind.content_type())
        .unwrap_or("application/octet-stream");
    Ok(HttpResponse::Ok().content_type(content_type).body(bytes))
}
