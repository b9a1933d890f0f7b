//! `multipart/form-data` decoding for the post form.

use actix_multipart::{Field, Multipart};
use futures::StreamExt;

use yatube_core::forms::{ImageUpload, PostForm};

use crate::middleware::error::{AppError, AppResult};

/// Largest accepted image upload.
const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
const MAX_TEXT_BYTES: usize = 64 * 1024;

/// Read `text`, `group` and `image` parts. Unknown parts are drained and
/// ignored; an image part without a file name counts as no upload.
pub async fn read_post_form(mut payload: Multipart) -> AppResult<(PostForm, Option<ImageUpload>)> {
    let mut form = PostForm::default();
    let mut image = None;

    while let Some(field) = payload.next().await {
        let mut field =
            field.map_err(|e| AppError::BadRequest(format!("Multipart error: {}", e)))?;
        let name = field.name().unwrap_or_default().to_string();

        match name.as_str() {
            "text" => form.text = read_text(&mut field).await?,
            "group" => form.group = Some(read_text(&mut field).await?),
            "image" => {
                let filename = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename())
                    .unwrap_or_default()
                    .to_string();
                let bytes = read_bytes(&mut field, MAX_IMAGE_BYTES).await?;
                if !filename.is_empty() && !bytes.is_empty() {
                    image = Some(ImageUpload::new(filename, bytes));
                }
            }
            _ => {
                read_bytes(&mut field, MAX_TEXT_BYTES).await?;
            }
        }
    }

    Ok((form, image))
}

async fn read_text(field: &mut Field) -> AppResult<String> {
    let bytes = read_bytes(field, MAX_TEXT_BYTES).await?;
    String::from_utf8(bytes)
        .map_err(|_| AppError::BadRequest("Form field is not valid UTF-8".to_string()))
}

async fn read_bytes(field: &mut Field, limit: usize) -> AppResult<Vec<u8>> {
    let mut data = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk.map_err(|e| AppError::BadRequest(format!("Upload read error: {}", e)))?;
        if data.len() + chunk.len() > limit {
            return Err(AppError::BadRequest(format!(
                "Form field exceeds {} bytes",
                limit
            )));
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}
