use crate::models::{ContentId, SignalMap};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub upstream: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_status: Option<u16>,
}

/// Inline result of the bank-name field check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankNameCheck {
    pub normalized: String,
    pub valid: bool,
    pub error: Option<String>,
}

/// Outcome of the exchange creation sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeCreated {
    pub api: String,
    pub bank: String,
    pub credentials_set: bool,
    pub api_json: serde_json::Map<String, serde_json::Value>,
}

/// Bank listing row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankSummary {
    pub name: String,
    pub enabled_ratio: String,
    pub partially_enabled: bool,
}

/// Banked content as shown after an add
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddContentView {
    pub bank: String,
    pub content_id: ContentId,
    pub signals: SignalMap,
}
