//! OpenAPI schema types shared across endpoints.

use serde::Serialize;
use utoipa::ToSchema;

/// Error envelope returned by every failing endpoint.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "insufficient_funds")]
    pub code: String,
    /// Human-readable description of the failure.
    #[schema(example = "wallet balance is insufficient")]
    pub message: String,
    /// Optional structured details, typically naming the offending field.
    #[schema(value_type = Object)]
    pub details: Option<serde_json::Value>,
    /// Trace identifier for correlating with server logs.
    pub trace_id: Option<String>,
}
