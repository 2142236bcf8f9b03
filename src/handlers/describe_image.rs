use crate::clients::{OpenAIMessage, OpenAiClient, VisionClient};
use crate::error::AppError;
use crate::handlers::{enforce_cooldown, MISSING_FILE_MESSAGE};
use crate::models::MessageResponse;
use crate::services::composer::{compose_chat_message, compose_label_description};
use crate::services::rate_limiter::CooldownLimiter;
use crate::utils::encoding::encode_image_base64;
use crate::utils::multipart_utils::process_image_multipart;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use log::info;
use uuid::Uuid;

fn song_suggestion_prompt(description: &str) -> String {
    format!(
        "「{}」に合う歌詞の無い曲を3曲教えてください。json形式で曲名のみ返してください。",
        description
    )
}

/// POST /describe-image: label the uploaded image with Vision, then ask the
/// chat upstream for song suggestions matching the labels. The second call
/// depends on the first call's output.
pub async fn describe_image(
    payload: Multipart,
    limiter: web::Data<CooldownLimiter>,
    vision: web::Data<VisionClient>,
    chat: web::Data<OpenAiClient>,
) -> Result<HttpResponse, AppError> {
    let request_id = Uuid::new_v4();
    enforce_cooldown(&limiter)?;

    let upload = process_image_multipart(payload)
        .await?
        .filter(|u| !u.data.is_empty())
        .ok_or_else(|| AppError::BadRequest(MISSING_FILE_MESSAGE.to_string()))?;
    info!(
        "[{}] /describe-image: {} ({} bytes, {})",
        request_id,
        upload.filename,
        upload.data.len(),
        upload.mime_type
    );

    let image_base64 = encode_image_base64(&upload.data);
    let annotation = vision.annotate_image(&image_base64).await?;
    let description = compose_label_description(&annotation);
    info!("[{}] image description: {}", request_id, description);

    let response = chat
        .chat_completion(vec![OpenAIMessage::user(song_suggestion_prompt(
            &description,
        ))])
        .await?;
    let message = compose_chat_message(response)?;

    Ok(HttpResponse::Ok().json(MessageResponse { message }))
}
