use anyhow::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub mod encoding;

pub use encoding::{coerce_number, opaque_to_string, round2, serialize_rounded};

pub const DEFAULT_USE_CASE: &str = "General";
pub const DEFAULT_PERFORMANCE_PREFERENCE: f64 = 50.0;

/// Full request document: the user's constraints plus the raw part catalog.
#[derive(Debug, Serialize, Deserialize, Clone, Default, JsonSchema)]
pub struct RecommendRequest {
    #[serde(default)]
    pub request: BuildRequest,
    /// Raw part records, one JSON object per catalog entry. Kept untyped so a
    /// missing or `null` catalog can be told apart from a malformed one.
    #[serde(default)]
    #[schemars(with = "Option<Vec<serde_json::Value>>")]
    pub database: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BuildRequest {
    #[serde(default, deserialize_with = "encoding::deserialize_lenient")]
    #[schemars(with = "f64")]
    pub budget: f64,
    #[serde(default = "default_use_case")]
    pub use_case: String,
    /// 0-100 slider; low values lean towards value builds, high towards future-proof.
    #[serde(default, deserialize_with = "encoding::deserialize_lenient_opt")]
    #[schemars(with = "Option<f64>")]
    pub performance_preference: Option<f64>,
}

impl Default for BuildRequest {
    fn default() -> Self {
        Self {
            budget: 0.0,
            use_case: default_use_case(),
            performance_preference: None,
        }
    }
}

fn default_use_case() -> String {
    DEFAULT_USE_CASE.to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

#[derive(Debug, Serialize, Deserialize, Clone, JsonSchema)]
pub struct ErrorResponse {
    pub status: ResponseStatus,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Error,
            message: message.into(),
        }
    }
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}
