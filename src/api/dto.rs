use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Envelope shared by every endpoint the mobile client consumes.
///
/// Success: `{"success": true, "data": ...}`.
/// Failure: `{"success": false, "message": "..."}` (see `AppError`).
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }
}
