use crate::models::{BankNameCheck, ContentType};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

static HEX_HASH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-fA-F0-9]+$").expect("hex hash pattern is valid"));

static BANK_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9_]+$").expect("bank name pattern is valid"));

/// Input problems caught before any upstream call is made
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please select a file")]
    MissingFile,

    #[error("Please select a content type")]
    MissingContentType,

    #[error("Unknown content type '{0}', expected photo or video")]
    UnknownContentType(String),

    #[error("Please enter a URL")]
    MissingUrl,

    #[error("Please select a signal type")]
    MissingSignalType,

    #[error("Please enter a hash value")]
    MissingHash,

    #[error("Please enter a valid hexadecimal hash value (only letters a-f and numbers 0-9)")]
    InvalidHash,

    #[error("Please enter a content ID")]
    MissingContentId,

    #[error("This field is required!")]
    MissingBankName,

    #[error("Bank name must be all uppercase and snake case (e.g. MY_BANK)")]
    InvalidBankName,

    #[error("Please select an exchange type")]
    MissingExchangeApi,

    #[error("Unknown time span '{0}', expected one of 24h, 1h, 7d")]
    UnknownTimeSpan(String),

    #[error("Upload is missing the `{0}` file")]
    MissingComparisonFile(&'static str),
}

/// True when `value` is a non-empty run of hex digits
#[inline]
pub fn is_hex_hash(value: &str) -> bool {
    HEX_HASH.is_match(value)
}

/// Trim a submitted hash and check it is hexadecimal
pub fn validate_hash(value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingHash);
    }
    if !is_hex_hash(trimmed) {
        return Err(ValidationError::InvalidHash);
    }
    Ok(trimmed.to_string())
}

pub fn validate_signal_type(signal_type: &str) -> Result<String, ValidationError> {
    let trimmed = signal_type.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingSignalType);
    }
    Ok(trimmed.to_string())
}

pub fn parse_content_type(raw: Option<&str>) -> Result<ContentType, ValidationError> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(ValidationError::MissingContentType);
    }
    raw.parse().map_err(ValidationError::UnknownContentType)
}

pub fn validate_url(url: &str) -> Result<String, ValidationError> {
    if url.trim().is_empty() {
        return Err(ValidationError::MissingUrl);
    }
    Ok(url.to_string())
}

/// Normalize a bank name the way the form field does on blur
pub fn normalize_bank_name(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Normalize and check a bank name, returning the value to submit
pub fn validate_bank_name(raw: &str) -> Result<String, ValidationError> {
    let normalized = normalize_bank_name(raw);
    if normalized.is_empty() {
        return Err(ValidationError::MissingBankName);
    }
    if !BANK_NAME.is_match(&normalized) {
        return Err(ValidationError::InvalidBankName);
    }
    Ok(normalized)
}

/// Inline feedback for the bank-name field
pub fn check_bank_name(raw: &str) -> BankNameCheck {
    let normalized = normalize_bank_name(raw);
    match validate_bank_name(&normalized) {
        Ok(_) => BankNameCheck {
            normalized,
            valid: true,
            error: None,
        },
        Err(e) => BankNameCheck {
            normalized,
            valid: false,
            error: Some(e.to_string()),
        },
    }
}
