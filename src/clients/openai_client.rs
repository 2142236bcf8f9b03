use crate::clients::{UpstreamError, UpstreamService};
use crate::config::AppSettings;
use crate::error::AppError;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

const SERVICE: UpstreamService = UpstreamService::OpenAi;

// OpenAI Chat Completion Request Structs
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OpenAIChatRequest {
    pub model: String,
    pub messages: Vec<OpenAIMessage>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OpenAIMessage {
    pub role: String,
    pub content: OpenAIContent,
}

/// Chat message content: a plain string, or an ordered list of text and
/// image parts for vision-capable models.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(untagged)]
pub enum OpenAIContent {
    Text(String),
    Parts(Vec<OpenAIContentPart>),
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OpenAIContentPart {
    Text { text: String },
    ImageUrl { image_url: OpenAIImageUrl },
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OpenAIImageUrl {
    pub url: String,
}

impl OpenAIMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: OpenAIContent::Text(text.into()),
        }
    }

    /// One user message carrying an instruction followed by an inline image
    /// (data URI), in that order.
    pub fn user_with_image(text: impl Into<String>, image_data_uri: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: OpenAIContent::Parts(vec![
                OpenAIContentPart::Text { text: text.into() },
                OpenAIContentPart::ImageUrl {
                    image_url: OpenAIImageUrl {
                        url: image_data_uri.into(),
                    },
                },
            ]),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatChoiceMessage {
    pub content: String,
}

pub struct OpenAiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(settings: &AppSettings) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.upstream.timeout_secs))
            .connect_timeout(Duration::from_secs(settings.upstream.connect_timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: settings.api_keys.openai_api_key.clone(),
            base_url: settings.upstream.openai_base_url.clone(),
            model: settings.upstream.chat_model.clone(),
        })
    }

    /// Issue one chat completion with the configured model. The caller
    /// builds the message list; this client never edits the prompt.
    pub async fn chat_completion(
        &self,
        messages: Vec<OpenAIMessage>,
    ) -> Result<ChatCompletionResponse, UpstreamError> {
        let url = format!(
            "{}/v1/chat/completions",
            self.base_url.trim_end_matches('/')
        );
        debug!("Chat completion request, model {}", self.model);

        let request = OpenAIChatRequest {
            model: self.model.clone(),
            messages,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| UpstreamError::from_reqwest(SERVICE, e))?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| UpstreamError::from_reqwest(SERVICE, e))?;

        if !status.is_success() {
            return Err(UpstreamError::Status {
                service: SERVICE,
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionResponse =
            serde_json::from_value(body.clone()).map_err(|_| UpstreamError::Shape {
                service: SERVICE,
                body: body.clone(),
            })?;

        // An empty choices array is reported here, while the raw body is
        // still at hand to serve as diagnostics.
        if parsed.choices.is_empty() {
            return Err(UpstreamError::Shape {
                service: SERVICE,
                body,
            });
        }

        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_settings;

    fn client_for(server: &mockito::ServerGuard) -> OpenAiClient {
        OpenAiClient::new(&test_settings(&server.url(), &server.url())).unwrap()
    }

    #[tokio::test]
    async fn chat_completion_sends_bearer_auth_and_model() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer test-openai-key")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "model": "gpt-4o-mini",
                "messages": [{"role": "user", "content": "2+2?"}],
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"content":"4"}}]}"#)
            .create_async()
            .await;

        let response = client_for(&server)
            .chat_completion(vec![OpenAIMessage::user("2+2?")])
            .await
            .unwrap();
        assert_eq!(response.choices[0].message.content, "4");
        mock.assert_async().await;
    }

    #[test]
    fn image_message_serializes_as_ordered_parts() {
        let message = OpenAIMessage::user_with_image("describe", "data:image/png;base64,YWJj");
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "role": "user",
                "content": [
                    {"type": "text", "text": "describe"},
                    {"type": "image_url", "image_url": {"url": "data:image/png;base64,YWJj"}},
                ],
            })
        );
    }

    #[tokio::test]
    async fn non_success_status_surfaces_status_and_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(429)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":{"message":"rate limited"}}"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .chat_completion(vec![OpenAIMessage::user("hi")])
            .await
            .unwrap_err();
        match err {
            UpstreamError::Status { status, body, .. } => {
                assert_eq!(status, 429);
                assert_eq!(body["error"]["message"], "rate limited");
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn empty_choices_is_a_shape_error_carrying_the_upstream_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"chatcmpl-7","choices":[]}"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .chat_completion(vec![OpenAIMessage::user("hi")])
            .await
            .unwrap_err();
        match err {
            UpstreamError::Shape { body, .. } => {
                assert_eq!(body["id"], "chatcmpl-7");
                assert_eq!(body["choices"], serde_json::json!([]));
            }
            other => panic!("expected shape error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn malformed_success_payload_is_a_shape_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{}}]}"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .chat_completion(vec![OpenAIMessage::user("hi")])
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamError::Shape { .. }));
    }
}
