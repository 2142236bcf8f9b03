use crate::clients::{UpstreamError, UpstreamService};
use crate::config::AppSettings;
use crate::error::AppError;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

const SERVICE: UpstreamService = UpstreamService::Vision;

#[derive(Debug, Serialize)]
pub struct VisionAnnotateRequest {
    pub requests: Vec<AnnotateImageRequest>,
}

#[derive(Debug, Serialize)]
pub struct AnnotateImageRequest {
    pub image: VisionImage,
    pub features: Vec<VisionFeature>,
}

#[derive(Debug, Serialize)]
pub struct VisionImage {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct VisionFeature {
    #[serde(rename = "type")]
    pub feature_type: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VisionAnnotateResponse {
    #[serde(default)]
    pub responses: Vec<AnnotateResult>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AnnotateResult {
    #[serde(rename = "labelAnnotations", skip_serializing_if = "Option::is_none")]
    pub label_annotations: Option<Vec<LabelAnnotation>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LabelAnnotation {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Client for the Google Cloud Vision `images:annotate` endpoint. The API
/// key travels as a query parameter, which is how this Google API takes it.
pub struct VisionClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl VisionClient {
    pub fn new(settings: &AppSettings) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.upstream.timeout_secs))
            .connect_timeout(Duration::from_secs(settings.upstream.connect_timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: settings.api_keys.vision_api_key.clone(),
            base_url: settings.upstream.vision_base_url.clone(),
        })
    }

    /// Annotate one base64-encoded image with label and text detection and
    /// return the first (and only) annotation result. An empty `responses`
    /// array on a 2xx is a shape error, never silently defaulted.
    pub async fn annotate_image(&self, image_base64: &str) -> Result<AnnotateResult, UpstreamError> {
        let url = format!("{}/v1/images:annotate", self.base_url.trim_end_matches('/'));
        debug!("Vision annotate request, {} base64 bytes", image_base64.len());

        let request = VisionAnnotateRequest {
            requests: vec![AnnotateImageRequest {
                image: VisionImage {
                    content: image_base64.to_string(),
                },
                features: vec![
                    VisionFeature {
                        feature_type: "LABEL_DETECTION".to_string(),
                    },
                    VisionFeature {
                        feature_type: "TEXT_DETECTION".to_string(),
                    },
                ],
            }],
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
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
            info!("Vision API returned status {}", status);
            return Err(UpstreamError::Status {
                service: SERVICE,
                status: status.as_u16(),
                body,
            });
        }

        let parsed: VisionAnnotateResponse =
            serde_json::from_value(body.clone()).map_err(|_| UpstreamError::Shape {
                service: SERVICE,
                body: body.clone(),
            })?;

        parsed
            .responses
            .into_iter()
            .next()
            .ok_or(UpstreamError::Shape {
                service: SERVICE,
                body,
            })
    }
}
