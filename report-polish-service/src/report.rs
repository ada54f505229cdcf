//! Turning the model's free-form reply into a [`PolishedReport`].

use serde_json::{Map, Value};

use crate::models::{PolishedReport, coerce_string};

/// What the model sent back, after an attempt to read it as a JSON object.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelReply {
    Structured(Map<String, Value>),
    /// Anything that is not a JSON object, kept verbatim.
    Unstructured(String),
}

impl ModelReply {
    pub fn parse(content: &str) -> Self {
        match serde_json::from_str::<Value>(content) {
            Ok(Value::Object(fields)) => ModelReply::Structured(fields),
            _ => ModelReply::Unstructured(content.to_string()),
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, ModelReply::Structured(_))
    }
}

/// `choices[0].message.content`, or empty when the path is missing or not a string.
pub fn extract_content(response: &Value) -> String {
    response
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Builds the final report. `text` is the trimmed dictation and stands in for empty
/// findings, so findings is never empty when `text` is not.
pub fn normalize(reply: ModelReply, text: &str) -> PolishedReport {
    let (findings, impression) = match reply {
        ModelReply::Structured(fields) => (
            pick_field(&fields, "findings", "FINDINGS"),
            pick_field(&fields, "impression", "IMPRESSION"),
        ),
        ModelReply::Unstructured(raw) => (raw.trim().to_string(), String::new()),
    };

    PolishedReport {
        findings: if findings.is_empty() {
            text.to_string()
        } else {
            findings
        },
        impression,
    }
}

// Only the all-lowercase and all-uppercase spellings are recognised; "Findings" is not.
fn pick_field(fields: &Map<String, Value>, lower: &str, upper: &str) -> String {
    let read = |key: &str| fields.get(key).map(coerce_string).unwrap_or_default();

    let value = read(lower);
    let value = if value.is_empty() { read(upper) } else { value };
    value.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TEXT: &str = "umm tooth 14 looks ok";

    #[test]
    fn test_structured_reply() {
        let reply = ModelReply::parse(r#"{"findings":"Normal exam.","impression":"No caries."}"#);
        assert!(reply.is_structured());

        let report = normalize(reply, TEXT);
        assert_eq!(report.findings, "Normal exam.");
        assert_eq!(report.impression, "No caries.");
    }

    #[test]
    fn test_uppercase_keys() {
        let reply = ModelReply::parse(r#"{"FINDINGS":"  Mild effusion. ","IMPRESSION":" Effusion. "}"#);

        let report = normalize(reply, TEXT);
        assert_eq!(report.findings, "Mild effusion.");
        assert_eq!(report.impression, "Effusion.");
    }

    #[test]
    fn test_mixed_case_keys_are_not_recognised() {
        let reply = ModelReply::parse(r#"{"Findings":"Normal.","Impression":"Fine."}"#);

        let report = normalize(reply, TEXT);
        assert_eq!(report.findings, TEXT);
        assert_eq!(report.impression, "");
    }

    #[test]
    fn test_empty_lowercase_falls_through_to_uppercase() {
        let reply = ModelReply::parse(r#"{"findings":"","FINDINGS":"Upper."}"#);
        assert_eq!(normalize(reply, TEXT).findings, "Upper.");
    }

    #[test]
    fn test_non_string_values_are_coerced() {
        let reply = ModelReply::parse(r#"{"findings":14,"impression":true}"#);

        let report = normalize(reply, TEXT);
        assert_eq!(report.findings, "14");
        assert_eq!(report.impression, "true");
    }

    #[test]
    fn test_blank_structured_findings_fall_back_to_text() {
        let reply = ModelReply::parse(r#"{"findings":"   ","impression":"Stable."}"#);

        let report = normalize(reply, TEXT);
        assert_eq!(report.findings, TEXT);
        assert_eq!(report.impression, "Stable.");
    }

    #[test]
    fn test_prose_reply_is_degraded_not_rejected() {
        let reply = ModelReply::parse("  The tooth looks fine.\n");
        assert!(!reply.is_structured());

        let report = normalize(reply, TEXT);
        assert_eq!(report.findings, "The tooth looks fine.");
        assert_eq!(report.impression, "");
    }

    #[test]
    fn test_empty_reply_uses_input_text() {
        let report = normalize(ModelReply::parse(""), TEXT);
        assert_eq!(report.findings, TEXT);
        assert_eq!(report.impression, "");
    }

    #[test]
    fn test_non_object_json_is_unstructured() {
        assert_eq!(ModelReply::parse("42"), ModelReply::Unstructured("42".to_string()));
        assert!(!ModelReply::parse("[\"a\"]").is_structured());
        assert_eq!(normalize(ModelReply::parse("42"), TEXT).findings, "42");
    }

    #[test]
    fn test_fenced_json_is_treated_as_prose() {
        let content = "```json\n{\"findings\":\"a\"}\n```";
        let report = normalize(ModelReply::parse(content), TEXT);
        assert_eq!(report.findings, content);
    }

    #[test]
    fn test_extract_content() {
        let response = json!({
            "choices": [{ "message": { "role": "assistant", "content": "hello" } }]
        });
        assert_eq!(extract_content(&response), "hello");
    }

    #[test]
    fn test_extract_content_missing_paths() {
        assert_eq!(extract_content(&json!({})), "");
        assert_eq!(extract_content(&json!({ "choices": [] })), "");
        assert_eq!(
            extract_content(&json!({ "choices": [{ "message": { "content": null } }] })),
            ""
        );
    }
}
