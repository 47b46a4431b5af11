//! Normalized claim artifacts written by the external normalization step

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Schema versions this crate knows how to read
pub const SUPPORTED_SCHEMA_VERSIONS: &[&str] = &["v1", "1", "1.0"];

/// Context attached to a claim
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClaimContext {
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub actor: Option<String>,
    #[serde(default)]
    pub timeframe: Option<String>,
}

/// A single normalized claim
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClaimArtifact {
    #[serde(default)]
    pub claim: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub authority: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub context: Option<ClaimContext>,
}

impl ClaimContext {
    fn from_object(object: &Map<String, Value>) -> Self {
        Self {
            domain: string_field(object, "domain"),
            actor: string_field(object, "actor"),
            timeframe: string_field(object, "timeframe"),
        }
    }
}

impl ClaimArtifact {
    /// Read an artifact field by field.
    ///
    /// A field of the wrong type reads as absent instead of rejecting the
    /// artifact; only non-object entries yield `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;

        Some(Self {
            claim: string_field(object, "claim"),
            role: string_field(object, "role"),
            authority: string_field(object, "authority"),
            confidence: object.get("confidence").and_then(number_of),
            context: object
                .get("context")
                .and_then(Value::as_object)
                .map(ClaimContext::from_object),
        })
    }
}

/// Claim bag stored on a knowledge item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedClaims {
    pub schema_version: String,
    pub artifacts: Vec<ClaimArtifact>,
}

impl NormalizedClaims {
    /// Read a claim bag from its stored JSON form.
    ///
    /// Returns `None` when the version is missing or unrecognized or there
    /// is no artifact list. Entries that are not objects are dropped.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let schema_version = schema_version_of(object.get("schema_version")?)?;

        if !SUPPORTED_SCHEMA_VERSIONS.contains(&schema_version.as_str()) {
            return None;
        }

        let artifacts: Vec<ClaimArtifact> = object
            .get("artifacts")?
            .as_array()?
            .iter()
            .filter_map(ClaimArtifact::from_value)
            .collect();

        Some(Self {
            schema_version,
            artifacts,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

fn schema_version_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_lowercase()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn string_field(object: &Map<String, Value>, key: &str) -> Option<String> {
    object.get(key).and_then(Value::as_str).map(String::from)
}

/// Numbers and numeric strings; anything else, including NaN, is absent
fn number_of(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}
