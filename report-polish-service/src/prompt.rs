//! Prompt layout sent to the completion API.
//!
//! The system message is fixed. The user message is a deterministic function of the
//! request: instructions, the JSON shape to answer with, then template, patient line and
//! the raw dictation.

use crate::models::{ChatMessage, PolishRequest};

pub const SYSTEM_PROMPT: &str = "You are a radiology report editor. Return ONLY valid JSON with keys: findings, impression. Keep the same language as the input.";

const INSTRUCTIONS: &str = "Rewrite the raw dictation below into a clean, professional report. \
Remove filler words and false starts, fix grammar and punctuation, and keep every clinical detail. \
Do not invent findings that were not dictated.";

const SCHEMA_EXAMPLE: &str = r#"Respond with JSON like: {"findings": "...", "impression": "..."}"#;

/// Stands in for an empty template.
pub const NO_TEMPLATE: &str = "N/A";

/// Builds the user message. `text` is the already-trimmed dictation.
pub fn build_user_prompt(request: &PolishRequest, text: &str) -> String {
    let template = if request.template.is_empty() {
        NO_TEMPLATE
    } else {
        request.template.as_str()
    };
    let patient = &request.patient;

    [
        INSTRUCTIONS.to_string(),
        SCHEMA_EXAMPLE.to_string(),
        String::new(),
        format!("Template: {}", template),
        format!(
            "Patient: {} | ID: {} | Date: {}",
            patient.name, patient.id, patient.date
        ),
        String::new(),
        "Raw text:".to_string(),
        text.to_string(),
    ]
    .join("\n")
}

/// System + user pair, in the order the API expects.
pub fn build_messages(request: &PolishRequest, text: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(build_user_prompt(request, text)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PatientInfo;

    #[test]
    fn test_user_prompt_layout() {
        let request = PolishRequest {
            text: " umm tooth 14 looks ok ".to_string(),
            patient: PatientInfo {
                name: "Jane Roe".to_string(),
                id: "P-001".to_string(),
                date: "2024-05-01".to_string(),
            },
            template: "Dental panoramic".to_string(),
        };

        let prompt = build_user_prompt(&request, request.trimmed_text());
        let lines: Vec<&str> = prompt.lines().collect();

        assert_eq!(lines.len(), 8);
        assert_eq!(lines[0], INSTRUCTIONS);
        assert_eq!(lines[1], SCHEMA_EXAMPLE);
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "Template: Dental panoramic");
        assert_eq!(lines[4], "Patient: Jane Roe | ID: P-001 | Date: 2024-05-01");
        assert_eq!(lines[5], "");
        assert_eq!(lines[6], "Raw text:");
        assert_eq!(lines[7], "umm tooth 14 looks ok");
    }

    #[test]
    fn test_missing_metadata_uses_placeholders() {
        let request = PolishRequest {
            text: "lungs clear".to_string(),
            ..Default::default()
        };

        let prompt = build_user_prompt(&request, "lungs clear");

        assert!(prompt.contains("\nTemplate: N/A\n"));
        assert!(prompt.contains("\nPatient:  | ID:  | Date: \n"));
        assert!(prompt.ends_with("Raw text:\nlungs clear"));
    }

    #[test]
    fn test_messages_are_system_then_user() {
        let request = PolishRequest {
            text: "x".to_string(),
            ..Default::default()
        };

        let messages = build_messages(&request, "x");

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[0].content, SYSTEM_PROMPT);
        assert_eq!(messages[1].role, "user");
        assert!(messages[1].content.ends_with("Raw text:\nx"));
    }
}
