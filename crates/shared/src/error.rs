use serde::{Deserialize, Serialize};

/// Error body the backend attaches to non-success responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub detail: String,
}

impl ApiErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }

    /// Extracts `detail` from a raw response body, if it has that shape.
    pub fn parse_detail(body: &[u8]) -> Option<String> {
        serde_json::from_slice::<ApiErrorBody>(body)
            .ok()
            .map(|parsed| parsed.detail)
            .filter(|detail| !detail.trim().is_empty())
    }
}
