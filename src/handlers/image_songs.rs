use crate::clients::{OpenAIMessage, OpenAiClient};
use crate::error::AppError;
use crate::handlers::{enforce_cooldown, MISSING_FILE_MESSAGE};
use crate::models::MessageResponse;
use crate::services::composer::compose_chat_message;
use crate::services::rate_limiter::CooldownLimiter;
use crate::utils::encoding::image_data_uri;
use crate::utils::multipart_utils::process_image_multipart;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use log::info;
use uuid::Uuid;

const IMAGE_SONGS_INSTRUCTION: &str = "この画像に合う歌詞の無い曲を1〜3曲提案してください。\
最低1曲は必ず提案してください。\
json形式で {\"song_list\": [...], \"reason\": ...} の形で返してください。";

/// POST /image-to-serch-songs: send the uploaded image straight to the chat
/// upstream with a song-suggestion instruction, no labeling step. The route
/// keeps its published spelling.
pub async fn image_to_search_songs(
    payload: Multipart,
    limiter: web::Data<CooldownLimiter>,
    chat: web::Data<OpenAiClient>,
) -> Result<HttpResponse, AppError> {
    let request_id = Uuid::new_v4();
    enforce_cooldown(&limiter)?;

    let upload = process_image_multipart(payload)
        .await?
        .filter(|u| !u.data.is_empty())
        .ok_or_else(|| AppError::BadRequest(MISSING_FILE_MESSAGE.to_string()))?;
    info!(
        "[{}] /image-to-serch-songs: {} ({} bytes, {})",
        request_id,
        upload.filename,
        upload.data.len(),
        upload.mime_type
    );

    let data_uri = image_data_uri(&upload.mime_type, &upload.data);
    let response = chat
        .chat_completion(vec![OpenAIMessage::user_with_image(
            IMAGE_SONGS_INSTRUCTION,
            data_uri,
        )])
        .await?;
    let message = compose_chat_message(response)?;

    Ok(HttpResponse::Ok().json(MessageResponse { message }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_settings;
    use actix_web::{test, App};
    use serde_json::Value;

    const BOUNDARY: &str = "----snaptune-test-boundary";

    fn multipart_request(bytes: &[u8], mime: &str) -> test::TestRequest {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; \
                 filename=\"photo.png\"\r\nContent-Type: {mime}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        test::TestRequest::post()
            .uri("/image-to-serch-songs")
            .insert_header((
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(body)
    }

    macro_rules! app_against {
        ($server:expr, $limiter:expr) => {{
            let settings = test_settings(&$server.url(), &$server.url());
            test::init_service(
                App::new()
                    .app_data(web::Data::new($limiter))
                    .app_data(web::Data::new(OpenAiClient::new(&settings).unwrap()))
                    .route(
                        "/image-to-serch-songs",
                        web::post().to(image_to_search_songs),
                    ),
            )
            .await
        }};
    }

    fn fresh_limiter() -> CooldownLimiter {
        CooldownLimiter::new(std::time::Duration::from_secs(10))
    }

    #[actix_web::test]
    async fn image_travels_as_data_uri_with_instruction_first() {
        let mut server = mockito::Server::new_async().await;
        let chat_mock = server
            .mock("POST", "/v1/chat/completions")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "messages": [{
                    "role": "user",
                    "content": [
                        {"type": "text", "text": IMAGE_SONGS_INSTRUCTION},
                        {"type": "image_url", "image_url": {"url": "data:image/png;base64,aW1n"}},
                    ],
                }]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"choices":[{"message":{"content":"{\"song_list\":[\"Song A\"],\"reason\":\"calm\"}"}}]}"#,
            )
            .create_async()
            .await;

        let app = app_against!(server, fresh_limiter());
        let resp =
            test::call_service(&app, multipart_request(b"img", "image/png").to_request()).await;
        assert_eq!(resp.status(), 200);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body["message"],
            "{\"song_list\":[\"Song A\"],\"reason\":\"calm\"}"
        );
        chat_mock.assert_async().await;
    }

    #[actix_web::test]
    async fn missing_file_is_a_400_with_no_upstream_calls() {
        let mut server = mockito::Server::new_async().await;
        let chat_mock = server
            .mock("POST", "/v1/chat/completions")
            .expect(0)
            .create_async()
            .await;

        let app = app_against!(server, fresh_limiter());
        let req = test::TestRequest::post()
            .uri("/image-to-serch-songs")
            .insert_header((
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(format!("--{BOUNDARY}--\r\n"))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], MISSING_FILE_MESSAGE);
        chat_mock.assert_async().await;
    }

    #[actix_web::test]
    async fn empty_file_field_is_a_400() {
        let server = mockito::Server::new_async().await;
        let app = app_against!(server, fresh_limiter());

        let resp = test::call_service(&app, multipart_request(b"", "image/png").to_request()).await;
        assert_eq!(resp.status(), 400);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], MISSING_FILE_MESSAGE);
    }
}
