use crate::clients::{invalid_response_message, AnnotateResult, ChatCompletionResponse, UpstreamService};
use crate::error::{AppError, AppResult};

/// Fallback used when the labeling upstream returned no label annotations.
/// A deliberate default, not an error.
pub const NO_DESCRIPTION_FALLBACK: &str = "No description available";

/// Join every label description into one comma-separated string.
pub fn compose_label_description(annotation: &AnnotateResult) -> String {
    let description = annotation
        .label_annotations
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|label| label.description.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    if description.is_empty() {
        NO_DESCRIPTION_FALLBACK.to_string()
    } else {
        description
    }
}

/// Extract `choices[0].message.content` verbatim. The content is handed to
/// the caller opaquely; it is often itself JSON text but is never reparsed
/// here. The client already rejects empty `choices` with the raw upstream
/// body attached, so the fallback arm here carries no details.
pub fn compose_chat_message(response: ChatCompletionResponse) -> AppResult<String> {
    match response.choices.into_iter().next() {
        Some(choice) => Ok(choice.message.content),
        None => Err(AppError::UpstreamShape {
            message: invalid_response_message(UpstreamService::OpenAi).to_string(),
            details: serde_json::Value::Null,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{ChatChoice, ChatChoiceMessage, LabelAnnotation};
    use pretty_assertions::assert_eq;

    fn annotation(descriptions: &[&str]) -> AnnotateResult {
        AnnotateResult {
            label_annotations: Some(
                descriptions
                    .iter()
                    .map(|d| LabelAnnotation {
                        description: d.to_string(),
                        score: None,
                    })
                    .collect(),
            ),
        }
    }

    #[test]
    fn labels_join_with_comma_and_space() {
        assert_eq!(
            compose_label_description(&annotation(&["cat", "sunset"])),
            "cat, sunset"
        );
    }

    #[test]
    fn single_label_has_no_separator() {
        assert_eq!(compose_label_description(&annotation(&["cat"])), "cat");
    }

    #[test]
    fn absent_annotations_fall_back_to_literal() {
        let result = AnnotateResult {
            label_annotations: None,
        };
        assert_eq!(compose_label_description(&result), NO_DESCRIPTION_FALLBACK);
    }

    #[test]
    fn empty_annotations_fall_back_to_literal() {
        assert_eq!(
            compose_label_description(&annotation(&[])),
            NO_DESCRIPTION_FALLBACK
        );
    }

    #[test]
    fn chat_content_passes_through_unparsed() {
        let response = ChatCompletionResponse {
            choices: vec![ChatChoice {
                message: ChatChoiceMessage {
                    content: "[\"Song A\"]".to_string(),
                },
            }],
        };
        assert_eq!(compose_chat_message(response).unwrap(), "[\"Song A\"]");
    }

    #[test]
    fn missing_first_choice_is_a_shape_error() {
        let response = ChatCompletionResponse { choices: vec![] };
        let err = compose_chat_message(response).unwrap_err();
        match err {
            AppError::UpstreamShape { details, .. } => assert!(details.is_null()),
            other => panic!("expected shape error, got {:?}", other),
        }
    }
}
