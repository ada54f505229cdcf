use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use serde_json::Value;

use crate::error::Result;

/// Sampling temperature sent with every completion request.
pub const TEMPERATURE: f64 = 0.2;

/// Body of `POST *`. Every field is lenient: wrong types collapse to empty strings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PolishRequest {
    #[serde(default, deserialize_with = "coerced_string")]
    pub text: String,
    #[serde(default, deserialize_with = "patient_or_default")]
    pub patient: PatientInfo,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub template: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PatientInfo {
    #[serde(default, deserialize_with = "string_or_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub id: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub date: String,
}

impl PolishRequest {
    /// An empty body reads as `{}`. Invalid JSON is an error; valid JSON that is not an
    /// object simply carries no fields.
    pub fn from_body(body: &[u8]) -> Result<Self> {
        if body.is_empty() {
            return Ok(Self::default());
        }

        let value: Value = serde_json::from_slice(body)?;
        if !value.is_object() {
            return Ok(Self::default());
        }

        Ok(serde_json::from_value(value)?)
    }

    /// The dictation with surrounding whitespace removed.
    pub fn trimmed_text(&self) -> &str {
        self.text.trim()
    }
}

/// Final output of a successful request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolishedReport {
    pub findings: String,
    pub impression: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Body of `POST {base}/v1/chat/completions`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
}

/// Renders any JSON value as text: strings verbatim, scalars by their JSON form, null as
/// empty, containers as compact JSON.
pub fn coerce_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn coerced_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_string(&value))
}

fn string_or_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        _ => Ok(String::new()),
    }
}

fn patient_or_default<'de, D>(deserializer: D) -> std::result::Result<PatientInfo, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => serde_json::from_value(value).map_err(D::Error::custom),
        _ => Ok(PatientInfo::default()),
    }
}
