//! API Response types
//!
//! Standardized error envelope for the HTTP API. Success responses
//! return plain entity bodies; only errors use the envelope.

use serde::{Deserialize, Serialize};

/// 错误响应结构
///
/// ```json
/// {
///     "error": "conflict",
///     "message": "Order o1 is already completed"
/// }
/// ```
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// 错误类型 (validation_error | not_found | conflict | ...)
    pub error: String,
    /// Human-readable message
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
        }
    }
}
