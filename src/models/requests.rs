use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use validator::Validate;

/// Match lookup by URL
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryUrlRequest {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub bypass_enabled_ratio: bool,
}

/// Match lookup by raw hash
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryHashRequest {
    #[serde(default)]
    pub signal_type: String,
    #[serde(default)]
    pub signal_value: String,
    #[serde(default)]
    pub bypass_enabled_ratio: bool,
}

/// Bank content by URL
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddUrlRequest {
    #[validate(length(min = 1))]
    pub url: String,
    #[serde(default)]
    pub content_type: Option<String>,
}

/// Bank a raw hash
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddHashRequest {
    #[serde(default)]
    pub signal_type: String,
    #[serde(default)]
    pub signal_value: String,
}

/// How to pick the content removed from a bank
///
/// ```json
/// {"by": "url", "url": "https://...", "content_type": "photo"}
/// {"by": "hash", "signal_type": "pdq", "signal_value": "facd..."}
/// {"by": "id", "content_id": "42"}
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "by", rename_all = "lowercase")]
pub enum RemoveContentRequest {
    Url {
        url: String,
        #[serde(default)]
        content_type: Option<String>,
    },
    Hash {
        signal_type: String,
        signal_value: String,
    },
    Id {
        content_id: String,
    },
}

/// Bank-name field check, run when the field loses focus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankNameRequest {
    #[serde(default)]
    pub bank: String,
}

/// Raw value typed into a schema-driven form input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormInput {
    Flag(bool),
    Number(serde_json::Number),
    Text(String),
}

impl FormInput {
    pub fn as_text(&self) -> String {
        match self {
            FormInput::Flag(flag) => flag.to_string(),
            FormInput::Number(number) => number.to_string(),
            FormInput::Text(text) => text.clone(),
        }
    }

    /// Checkbox state; text values follow HTML form conventions
    pub fn as_flag(&self) -> bool {
        match self {
            FormInput::Flag(flag) => *flag,
            FormInput::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
            FormInput::Text(text) => {
                matches!(text.trim().to_lowercase().as_str(), "true" | "on" | "1" | "yes")
            }
        }
    }
}

/// Create an exchange from the schema-driven form
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateExchangeRequest {
    #[validate(length(min = 1))]
    pub api: String,
    #[serde(default)]
    pub bank: String,
    #[serde(default)]
    pub config: BTreeMap<String, FormInput>,
    #[serde(default)]
    pub credentials: BTreeMap<String, FormInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardQuery {
    #[serde(default)]
    pub time_span: Option<String>,
}
