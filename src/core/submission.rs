use crate::core::validation::{
    parse_content_type, validate_hash, validate_signal_type, validate_url, ValidationError,
};
use crate::models::ContentType;

/// A file received from the operator
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Content to hash, in exactly one of the supported forms
///
/// Used both for match queries and for adding content to a bank.
#[derive(Debug, Clone)]
pub enum ContentSubmission {
    File {
        content_type: ContentType,
        file: UploadedFile,
    },
    Url {
        url: String,
        content_type: ContentType,
    },
    Hash {
        signal_type: String,
        signal_value: String,
    },
}

impl ContentSubmission {
    /// Validate an uploaded file and its content type selector
    pub fn file(
        file: Option<UploadedFile>,
        content_type: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let file = match file {
            Some(file) if !file.bytes.is_empty() => file,
            _ => return Err(ValidationError::MissingFile),
        };
        let content_type = parse_content_type(content_type)?;
        Ok(ContentSubmission::File { content_type, file })
    }

    pub fn url(url: &str, content_type: Option<&str>) -> Result<Self, ValidationError> {
        let url = validate_url(url)?;
        let content_type = parse_content_type(content_type)?;
        Ok(ContentSubmission::Url { url, content_type })
    }

    pub fn hash(signal_type: &str, signal_value: &str) -> Result<Self, ValidationError> {
        let signal_type = validate_signal_type(signal_type)?;
        let signal_value = validate_hash(signal_value)?;
        Ok(ContentSubmission::Hash {
            signal_type,
            signal_value,
        })
    }

    /// Upstream lookup endpoint for this modality
    pub fn query_endpoint(&self) -> &'static str {
        match self {
            ContentSubmission::File { .. } => "/ui/query",
            ContentSubmission::Url { .. } => "/ui/query_url",
            ContentSubmission::Hash { .. } => "/ui/query_hash",
        }
    }

    pub fn modality(&self) -> &'static str {
        match self {
            ContentSubmission::File { .. } => "file",
            ContentSubmission::Url { .. } => "url",
            ContentSubmission::Hash { .. } => "hash",
        }
    }
}

/// A match lookup request, ready to send
#[derive(Debug, Clone)]
pub struct QuerySubmission {
    pub content: ContentSubmission,
    pub bypass_enabled_ratio: bool,
}

impl QuerySubmission {
    pub fn new(content: ContentSubmission, bypass_enabled_ratio: bool) -> Self {
        Self {
            content,
            bypass_enabled_ratio,
        }
    }

    pub fn endpoint(&self) -> &'static str {
        self.content.query_endpoint()
    }
}

/// Parse the `bypass_enabled_ratio` form flag
pub fn parse_bypass_flag(raw: Option<&str>) -> bool {
    raw.is_some_and(|value| matches!(value.trim().to_lowercase().as_str(), "true" | "on" | "1"))
}
