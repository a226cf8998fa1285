//! Response envelope shared by every Radio Calico endpoint
//!
//! The server serializes these, the client deserializes them.

use serde::{Deserialize, Serialize};

use crate::models::CoverSearchResult;

/// Uniform `{success, data, message, error, count}` wrapper
///
/// Absent fields are omitted from the JSON.
///
/// # Examples
///
/// ```
/// use calico_common::api::ApiResponse;
///
/// let response = ApiResponse::ok(vec![1, 2, 3]).with_count(3);
/// let json = serde_json::to_value(&response).unwrap();
/// assert_eq!(json["success"], true);
/// assert_eq!(json["count"], 3);
/// assert!(json.get("error").is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Successful response carrying `data`
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            count: None,
            error: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
}

impl ApiResponse<()> {
    /// Failure response (`success: false`)
    pub fn failure(message: impl Into<String>, error: Option<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
            count: None,
            error,
        }
    }
}

/// Cover endpoint response: the search result flattened next to `success`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverResponse {
    pub success: bool,
    #[serde(flatten)]
    pub result: CoverSearchResult,
}
