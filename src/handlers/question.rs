use crate::clients::{OpenAIMessage, OpenAiClient};
use crate::error::AppError;
use crate::handlers::{enforce_cooldown, MISSING_QUERY_MESSAGE};
use crate::models::{MessageResponse, QuestionRequest};
use crate::services::composer::compose_chat_message;
use crate::services::rate_limiter::CooldownLimiter;
use actix_web::{web, HttpResponse};
use log::info;
use uuid::Uuid;

/// POST /question: relay the caller's text to the chat upstream verbatim,
/// with no instruction wrapping.
pub async fn question(
    payload: web::Json<QuestionRequest>,
    limiter: web::Data<CooldownLimiter>,
    chat: web::Data<OpenAiClient>,
) -> Result<HttpResponse, AppError> {
    let request_id = Uuid::new_v4();
    enforce_cooldown(&limiter)?;

    let query = payload.query.trim();
    if query.is_empty() {
        return Err(AppError::BadRequest(MISSING_QUERY_MESSAGE.to_string()));
    }
    info!("[{}] /question: {} chars", request_id, query.len());

    let response = chat
        .chat_completion(vec![OpenAIMessage::user(query)])
        .await?;
    let message = compose_chat_message(response)?;

    Ok(HttpResponse::Ok().json(MessageResponse { message }))
}
