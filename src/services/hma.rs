use crate::core::{ContentSubmission, QuerySubmission, UploadedFile};
use crate::models::{
    AddContentResult, Bank, ContentId, CredentialStatus, DeleteContentResult, ExchangeSchema,
    FindContentQuery, FindContentResult, HashComparison, MatchResult, SignalMap, StatsCard,
    StatsResponse,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when talking to the HMA API
#[derive(Debug, Error)]
pub enum HmaError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("HTTP {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

impl HmaError {
    /// Upstream HTTP status, when the upstream answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            HmaError::ApiError { status, .. } => Some(*status),
            HmaError::NotFound(_) => Some(StatusCode::NOT_FOUND.as_u16()),
            _ => None,
        }
    }
}

/// Typed client for the hasher-matcher-actioner REST API
///
/// Covers the curation (`/c`), UI helper (`/ui`), hashing (`/h`),
/// matching (`/m`) and stats endpoints the console orchestrates.
#[derive(Debug, Clone)]
pub struct HmaClient {
    base_url: String,
    client: Client,
}

impl HmaClient {
    /// Create a client; `timeout` of `None` leaves requests unbounded
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, HmaError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            base_url: base_url.into(),
            client: builder.build()?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn bank_path(bank: &str) -> String {
        urlencoding::encode(bank).into_owned()
    }

    /// Pass 2xx responses through, turn everything else into an error
    async fn check(response: Response) -> Result<Response, HmaError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|json| json.get("message").and_then(Value::as_str).map(String::from))
            .or_else(|| status.canonical_reason().map(String::from))
            .unwrap_or_else(|| "Unknown error".to_string());

        tracing::error!("HMA returned {}: {}", status, body);

        if status == StatusCode::NOT_FOUND {
            return Err(HmaError::NotFound(message));
        }
        Err(HmaError::ApiError {
            status: status.as_u16(),
            message,
        })
    }

    async fn parse<T: DeserializeOwned>(response: Response, what: &str) -> Result<T, HmaError> {
        let response = Self::check(response).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| HmaError::InvalidResponse(format!("Failed to parse {}: {}", what, e)))
    }

    fn file_part(content_type: &str, file: &UploadedFile) -> (String, Part) {
        let part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
        (content_type.to_string(), part)
    }

    /// Liveness text from `/status`
    pub async fn status(&self) -> Result<String, HmaError> {
        let response = self.client.get(self.url("/status")).send().await?;
        let response = Self::check(response).await?;
        Ok(response.text().await?)
    }

    /// Run a match lookup through `/ui/query*`
    pub async fn query(&self, submission: &QuerySubmission) -> Result<MatchResult, HmaError> {
        let bypass = submission.bypass_enabled_ratio.to_string();
        let form = match &submission.content {
            ContentSubmission::File { content_type, file } => {
                let (name, part) = Self::file_part(content_type.as_str(), file);
                Form::new().part(name, part)
            }
            ContentSubmission::Url { url, content_type } => Form::new()
                .text("url", url.clone())
                .text("content_type", content_type.as_str()),
            ContentSubmission::Hash {
                signal_type,
                signal_value,
            } => Form::new()
                .text("signal_type", signal_type.clone())
                .text("signal_value", signal_value.clone()),
        }
        .text("bypass_enabled_ratio", bypass);

        let url = self.url(submission.endpoint());
        tracing::debug!("Querying matches via {}", url);

        let response = self.client.post(&url).multipart(form).send().await?;
        Self::parse(response, "match result").await
    }

    pub async fn get_bank(&self, bank: &str) -> Result<Bank, HmaError> {
        let url = self.url(&format!("/c/bank/{}", Self::bank_path(bank)));
        tracing::debug!("Fetching bank from: {}", url);

        let response = self.client.get(&url).send().await?;
        Self::parse(response, "bank").await
    }

    pub async fn list_banks(&self) -> Result<Vec<Bank>, HmaError> {
        let response = self.client.get(self.url("/c/banks")).send().await?;
        Self::parse(response, "bank list").await
    }

    /// Bank new content from a file, a URL or a raw hash
    pub async fn add_content(
        &self,
        bank: &str,
        content: &ContentSubmission,
    ) -> Result<AddContentResult, HmaError> {
        let bank_path = Self::bank_path(bank);
        let request = match content {
            ContentSubmission::File { content_type, file } => {
                let (name, part) = Self::file_part(content_type.as_str(), file);
                self.client
                    .post(self.url(&format!("/c/bank/{}/content", bank_path)))
                    .multipart(Form::new().part(name, part))
            }
            ContentSubmission::Url { url, content_type } => self
                .client
                .post(self.url(&format!("/c/bank/{}/content", bank_path)))
                .query(&[("url", url.as_str()), ("content_type", content_type.as_str())]),
            ContentSubmission::Hash {
                signal_type,
                signal_value,
            } => {
                let payload = SignalMap::from([(signal_type.clone(), signal_value.clone())]);
                self.client
                    .post(self.url(&format!("/c/bank/{}/signal", bank_path)))
                    .json(&payload)
            }
        };

        tracing::debug!("Adding {} content to bank {}", content.modality(), bank);
        let response = request.send().await?;
        Self::parse(response, "add content result").await
    }

    pub async fn find_content(
        &self,
        bank: &str,
        query: &FindContentQuery,
    ) -> Result<Vec<ContentId>, HmaError> {
        let url = self.url(&format!("/ui/bank/{}/content/find", Self::bank_path(bank)));
        let response = self.client.post(&url).json(query).send().await?;
        let found: FindContentResult = Self::parse(response, "find result").await?;
        Ok(found.content_ids)
    }

    pub async fn delete_content(
        &self,
        bank: &str,
        content_id: &ContentId,
    ) -> Result<DeleteContentResult, HmaError> {
        let url = self.url(&format!(
            "/c/bank/{}/content/{}",
            Self::bank_path(bank),
            urlencoding::encode(content_id.as_str())
        ));
        tracing::debug!("Deleting content: {}", url);

        let response = self.client.delete(&url).send().await?;
        Self::parse(response, "delete result").await
    }

    pub async fn exchange_apis(&self) -> Result<Vec<String>, HmaError> {
        let response = self.client.get(self.url("/c/exchanges/apis")).send().await?;
        Self::parse(response, "exchange api list").await
    }

    pub async fn exchange_schema(&self, api: &str) -> Result<ExchangeSchema, HmaError> {
        let url = self.url(&format!(
            "/c/exchanges/api/{}/schema",
            urlencoding::encode(api)
        ));
        let response = self.client.get(&url).send().await?;
        Self::parse(response, "exchange schema").await
    }

    pub async fn set_exchange_credentials(
        &self,
        api: &str,
        credential_json: &Map<String, Value>,
    ) -> Result<CredentialStatus, HmaError> {
        let url = self.url(&format!("/c/exchanges/api/{}", urlencoding::encode(api)));
        let payload = serde_json::json!({ "credential_json": credential_json });

        let response = self.client.post(&url).json(&payload).send().await?;
        Self::parse(response, "credential status").await
    }

    pub async fn create_exchange(
        &self,
        api: &str,
        bank: &str,
        api_json: &Map<String, Value>,
    ) -> Result<(), HmaError> {
        let payload = serde_json::json!({
            "api": api,
            "bank": bank,
            "api_json": api_json,
        });

        let response = self
            .client
            .post(self.url("/c/exchanges"))
            .json(&payload)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    pub async fn stats(&self, stat_name: &str, time_span: &str) -> Result<StatsCard, HmaError> {
        let response = self
            .client
            .get(self.url("/stats/"))
            .query(&[("stat_name", stat_name), ("time_span", time_span)])
            .send()
            .await?;
        let stats: StatsResponse = Self::parse(response, "stats").await?;
        Ok(stats.card)
    }

    /// Hash a photo with every configured signal type
    pub async fn hash_photo(&self, file: &UploadedFile) -> Result<SignalMap, HmaError> {
        let (name, part) = Self::file_part("photo", file);
        let response = self
            .client
            .post(self.url("/h/hash"))
            .multipart(Form::new().part(name, part))
            .send()
            .await?;
        Self::parse(response, "hashes").await
    }

    pub async fn compare(
        &self,
        pairs: &BTreeMap<String, [String; 2]>,
    ) -> Result<BTreeMap<String, HashComparison>, HmaError> {
        let response = self
            .client
            .post(self.url("/m/compare"))
            .json(pairs)
            .send()
            .await?;
        Self::parse(response, "comparison").await
    }
}
