use serde::{Deserialize, Serialize};

// Inbound request body, `prompt` accepted for older clients
#[derive(Deserialize, Debug, Default)]
pub struct AskRequest {
    #[serde(default, alias = "prompt")]
    pub question: Option<String>,
}

impl AskRequest {
    /// Lenient parse: a body that is missing or not JSON simply has no question.
    pub fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct AskResponse {
    pub answer: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct WelcomeResponse {
    pub message: String,
}

// Gemini generateContent request format
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    /// Single-turn request carrying `text` as the only part.
    pub fn from_question(text: &str, generation_config: Option<GenerationConfig>) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(text.to_string()),
                }],
            }],
            generation_config,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

// Gemini generateContent response format, every level optional
#[derive(Deserialize, Debug, Default)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Deserialize, Debug, Default)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

impl GenerateContentResponse {
    /// `candidates[0].content.parts[0].text`, if every step of the path exists.
    pub fn answer_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ask_request_accepts_question_or_prompt() {
        let q = AskRequest::from_body(br#"{"question":"why?"}"#);
        assert_eq!(q.question.as_deref(), Some("why?"));

        let p = AskRequest::from_body(br#"{"prompt":"how?"}"#);
        assert_eq!(p.question.as_deref(), Some("how?"));
    }

    #[test]
    fn garbage_body_has_no_question() {
        assert!(AskRequest::from_body(b"").question.is_none());
        assert!(AskRequest::from_body(b"not json").question.is_none());
        assert!(AskRequest::from_body(br#"{"other":1}"#).question.is_none());
    }

    #[test]
    fn request_body_omits_generation_config_when_unset() {
        let body = serde_json::to_value(GenerateContentRequest::from_question("hi", None)).unwrap();
        assert_eq!(body, json!({"contents":[{"parts":[{"text":"hi"}]}]}));
    }

    #[test]
    fn request_body_uses_camel_case_generation_config() {
        let config = GenerationConfig {
            temperature: Some(0.5),
            max_output_tokens: Some(200),
        };
        let body =
            serde_json::to_value(GenerateContentRequest::from_question("hi", Some(config))).unwrap();
        assert_eq!(
            body["generationConfig"],
            json!({"temperature": 0.5, "maxOutputTokens": 200})
        );
    }

    #[test]
    fn answer_text_reads_first_part() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                {"content": {"parts": [{"text": "first"}, {"text": "second"}], "role": "model"}},
                {"content": {"parts": [{"text": "other candidate"}]}}
            ],
            "usageMetadata": {"totalTokenCount": 7}
        }))
        .unwrap();
        assert_eq!(response.answer_text(), Some("first"));
    }

    #[test]
    fn answer_text_none_when_path_missing() {
        let bodies = [
            json!({}),
            json!({"candidates": []}),
            json!({"candidates": [{}]}),
            json!({"candidates": [{"content": {}}]}),
            json!({"candidates": [{"content": {"parts": [{}]}}]}),
            json!({"promptFeedback": {"blockReason": "SAFETY"}}),
        ];
        for body in bodies {
            let response: GenerateContentResponse = serde_json::from_value(body.clone()).unwrap();
            assert_eq!(response.answer_text(), None, "body: {body}");
        }
    }
}
