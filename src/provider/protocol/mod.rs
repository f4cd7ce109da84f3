//! Provider wire formats
//!
//! Only the fields this tool sends or reads are modelled; unknown response fields are ignored.

pub mod anthropic;
pub mod gemini;
pub mod openai;

use serde::Deserialize;

/// Error body shared by all three APIs: `{"error": {"message": ...}}`
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
}
