use crate::error::AppError;
use actix_multipart::Multipart;
use futures_util::StreamExt;

/// Raw upload extracted from a multipart body. Owned by the handler
/// invocation that received it and dropped once the upstream call is built.
pub struct ImageUpload {
    pub data: Vec<u8>,
    pub filename: String,
    pub mime_type: String,
}

/// Pull the `file` field out of a multipart payload. Other fields are
/// drained and ignored. Returns `None` when no `file` field was present.
pub async fn process_image_multipart(
    mut payload: Multipart,
) -> Result<Option<ImageUpload>, AppError> {
    let mut upload: Option<ImageUpload> = None;

    while let Some(item) = payload.next().await {
        let mut field = item?;
        let content_disposition = field.content_disposition().ok_or_else(|| {
            AppError::BadRequest("Content-Disposition header missing".to_string())
        })?;

        let field_name = content_disposition
            .get_name()
            .ok_or_else(|| AppError::BadRequest("Field name missing".to_string()))?;

        if field_name != "file" {
            // Drain so the stream can progress past the field
            while let Some(chunk) = field.next().await {
                let _ = chunk?;
            }
            continue;
        }

        let filename = content_disposition
            .get_filename()
            .unwrap_or("upload")
            .to_string();
        let mime_type = field
            .content_type()
            .map(|ct| ct.to_string())
            .unwrap_or_else(|| "image/jpeg".to_string());

        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            data.extend_from_slice(&chunk?);
        }

        upload = Some(ImageUpload {
            data,
            filename,
            mime_type,
        });
    }

    Ok(upload)
}
