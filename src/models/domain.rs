use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Signal type name (e.g. `pdq`) to hex hash value
pub type SignalMap = BTreeMap<String, String>;

/// Kind of media submitted for hashing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Photo,
    Video,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Photo => "photo",
            ContentType::Video => "video",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "photo" => Ok(ContentType::Photo),
            "video" => Ok(ContentType::Video),
            other => Err(other.to_string()),
        }
    }
}

/// Upstream scalars that arrive as either numbers or strings
#[derive(Deserialize)]
#[serde(untagged)]
enum ScalarText {
    Int(i64),
    Float(f64),
    Text(String),
}

impl ScalarText {
    fn into_string(self) -> String {
        match self {
            ScalarText::Int(i) => i.to_string(),
            ScalarText::Float(f) => f.to_string(),
            ScalarText::Text(s) => s,
        }
    }
}

fn scalar_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    ScalarText::deserialize(deserializer).map(ScalarText::into_string)
}

/// Banked content identifier
///
/// The upstream emits integers; the console treats ids as opaque text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ContentId(pub String);

impl ContentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for ContentId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        scalar_text(deserializer).map(ContentId)
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ContentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A single bank hit returned by a match query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchEntry {
    pub bank_name: String,
    pub content_id: ContentId,
    pub signal_type: String,
    #[serde(deserialize_with = "scalar_text")]
    pub distance: String,
    #[serde(default)]
    pub signal_value: Option<String>,
}

/// Upstream answer to `/ui/query*`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(default)]
    pub banks: Vec<String>,
    #[serde(default)]
    pub matches: Vec<MatchEntry>,
    #[serde(default)]
    pub hashes: SignalMap,
}

/// Bank configuration as served by `/c/bank/{name}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bank {
    pub name: String,
    pub matching_enabled_ratio: f64,
}

/// Enabled ratio for a bank, or `Unknown` when the lookup failed
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnabledRatio {
    Known(f64),
    Unknown,
}

impl EnabledRatio {
    /// Percentage with one decimal (`"50.0"`), or `"Unknown"`
    pub fn percent_text(&self) -> String {
        match self {
            EnabledRatio::Known(ratio) => format!("{:.1}", ratio * 100.0),
            EnabledRatio::Unknown => "Unknown".to_string(),
        }
    }

    /// True when matches from this bank may be dropped by the rollout coin flip
    pub fn is_partial(&self) -> bool {
        matches!(self, EnabledRatio::Known(ratio) if *ratio < 1.0)
    }
}

impl From<&Bank> for EnabledRatio {
    fn from(bank: &Bank) -> Self {
        EnabledRatio::Known(bank.matching_enabled_ratio)
    }
}

/// Result of banking new content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddContentResult {
    pub id: ContentId,
    #[serde(default)]
    pub signals: SignalMap,
}

/// Body of `/ui/bank/{bank}/content/find`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FindContentQuery {
    Url {
        url: String,
        content_type: ContentType,
    },
    Signal {
        signal_type: String,
        signal_value: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindContentResult {
    #[serde(default)]
    pub content_ids: Vec<ContentId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteContentResult {
    #[serde(default)]
    pub deleted: Option<u64>,
}

/// Server-provided description of an exchange type's config and credentials
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExchangeSchema {
    #[serde(default)]
    pub config_schema: Option<FieldSet>,
    #[serde(default)]
    pub credentials_schema: Option<FieldSet>,
}

impl ExchangeSchema {
    pub fn config_fields(&self) -> &[SchemaFieldSpec] {
        self.config_schema
            .as_ref()
            .map(|set| set.fields.as_slice())
            .unwrap_or_default()
    }

    pub fn credential_fields(&self) -> &[SchemaFieldSpec] {
        self.credentials_schema
            .as_ref()
            .map(|set| set.fields.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldSet {
    #[serde(default)]
    pub fields: Vec<SchemaFieldSpec>,
}

/// Raw field descriptor, exactly as the upstream sends it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaFieldSpec {
    pub name: String,
    #[serde(rename = "type", default)]
    pub field_type: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub choices: Option<Vec<Value>>,
    #[serde(default)]
    pub default: Option<Value>,
    #[serde(default)]
    pub help: Option<String>,
}

/// Answer to a credential update on `/c/exchanges/api/{api}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialStatus {
    #[serde(default)]
    pub supports_authentification: bool,
    #[serde(default)]
    pub has_set_authentification: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonDetail {
    #[serde(deserialize_with = "scalar_text")]
    pub distance: String,
}

/// Per signal type answer of `/m/compare`: `[is_match, {distance}]`
pub type HashComparison = (bool, ComparisonDetail);

/// Statistic card served by `/stats/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsCard {
    pub time_span: String,
    pub time_span_count: u64,
    #[serde(default)]
    pub graph_data: Vec<(i64, f64)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub card: StatsCard,
}
