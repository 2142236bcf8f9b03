use serde::{Deserialize, Serialize};

/// Success envelope shared by all three relay endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Body of POST /question. `query` defaults to empty so a missing field is
/// reported with our own 400 message instead of a deserialization error.
#[derive(Debug, Serialize, Deserialize)]
pub struct QuestionRequest {
    #[serde(default)]
    pub query: String,
}
