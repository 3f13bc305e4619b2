//! Gemini `generateContent` client
//!
//! Blocking `ureq` client. The API key comes from the `API_KEY` environment
//! variable.

use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;
use serde_json::{Value, json};

use super::{AiAssist, ChatMessage, ChatRole, StepAnalysis};
use crate::config::EditorConfig;
use crate::domain::ImageData;
use crate::error::AssistError;

pub const API_KEY_ENV: &str = "API_KEY";
const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

const ANALYZE_PROMPT: &str = "Analyze this UI screenshot for a user guide.\n\
1. Title: Create a short, action-oriented title starting with a verb (e.g., 'Click the Submit Button').\n\
2. Description: Write a clear instruction explaining exactly what the user should do in this step and why. Keep it helpful for a manual.";

const CHAT_INSTRUCTION: &str = "You are a helpful assistant for writing software user guides. \
Give concise advice on wording, grammar and structure.";

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
}

#[derive(Debug, Default, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

impl GenerateResponse {
    /// Text of the first candidate, `None` when it has none
    fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        (!text.is_empty()).then_some(text)
    }
}

pub struct GeminiClient {
    agent: ureq::Agent,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Client for the configured model with the key from `API_KEY`
    pub fn from_env(config: &EditorConfig) -> Result<Self, AssistError> {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(AssistError::MissingApiKey)?;
        Ok(Self::new(
            api_key,
            config.assist_model.clone(),
            Duration::from_millis(config.assist_timeout_ms),
        ))
    }

    fn endpoint(&self) -> String {
        format!("{API_BASE}/{}:generateContent", self.model)
    }

    fn post(&self, body: &Value) -> anyhow::Result<GenerateResponse> {
        let response = self
            .agent
            .post(&self.endpoint())
            .set("x-goog-api-key", &self.api_key)
            .send_json(body)
            .with_context(|| format!("POST {}", self.endpoint()))?;
        response
            .into_json::<GenerateResponse>()
            .context("reading generateContent response")
    }

    fn generate(&self, body: &Value) -> Result<Option<String>, AssistError> {
        let response = self
            .post(body)
            .map_err(|err| AssistError::Request(format!("{err:#}")))?;
        Ok(response.text())
    }
}

fn image_part(image: &ImageData) -> Value {
    json!({
        "inlineData": {
            "mimeType": image.mime_type(),
            "data": image.to_base64(),
        }
    })
}

fn analysis_request(image: &ImageData) -> Value {
    json!({
        "contents": [{
            "parts": [image_part(image), { "text": ANALYZE_PROMPT }]
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": {
                "type": "OBJECT",
                "properties": {
                    "title": { "type": "STRING" },
                    "description": { "type": "STRING" }
                },
                "required": ["title", "description"]
            }
        }
    })
}

fn enhance_request(image: &ImageData, title: &str, draft: &str) -> Value {
    let prompt = format!(
        "Based on this screenshot and the current context, write a detailed and professional user guide description.\n\
         Current Title: \"{title}\"\n\
         Current Draft: \"{draft}\"\n\n\
         Task: Write a polished, easy-to-understand paragraph describing the action shown in the image. \
         Explain what is happening and any important details the user should notice. Keep it under 3 sentences."
    );
    json!({
        "contents": [{
            "parts": [image_part(image), { "text": prompt }]
        }]
    })
}

fn chat_request(message: &str, history: &[ChatMessage]) -> Value {
    let mut contents: Vec<Value> = history
        .iter()
        .map(|m| {
            let role = match m.role {
                ChatRole::User => "user",
                ChatRole::Model => "model",
            };
            json!({ "role": role, "parts": [{ "text": m.text }] })
        })
        .collect();
    contents.push(json!({ "role": "user", "parts": [{ "text": message }] }));
    json!({
        "systemInstruction": { "parts": [{ "text": CHAT_INSTRUCTION }] },
        "contents": contents,
    })
}

/// Empty text means the model had nothing to say
fn parse_analysis(text: Option<String>) -> Result<StepAnalysis, AssistError> {
    match text {
        None => Ok(StepAnalysis::placeholder()),
        Some(text) => serde_json::from_str(&text)
            .map_err(|err| AssistError::MalformedResponse(err.to_string())),
    }
}

impl AiAssist for GeminiClient {
    fn analyze(&self, image: &ImageData) -> Result<StepAnalysis, AssistError> {
        parse_analysis(self.generate(&analysis_request(image))?)
    }

    fn enhance(&self, image: &ImageData, title: &str, draft: &str) -> Result<String, AssistError> {
        Ok(self
            .generate(&enhance_request(image, title, draft))?
            .unwrap_or_else(|| draft.to_string()))
    }

    fn chat(&self, message: &str, history: &[ChatMessage]) -> Result<String, AssistError> {
        self.generate(&chat_request(message, history))?
            .ok_or_else(|| AssistError::MalformedResponse("empty chat reply".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image() -> ImageData {
        ImageData::from_rgba(&image::RgbaImage::new(2, 2)).unwrap()
    }

    #[test]
    fn test_response_text_joins_parts() {
        let response: GenerateResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{ "text": "Hello " }, { "text": "world" }] } }]
        }))
        .unwrap();
        assert_eq!(response.text().as_deref(), Some("Hello world"));

        let empty: GenerateResponse = serde_json::from_value(json!({ "candidates": [] })).unwrap();
        assert_eq!(empty.text(), None);
    }

    #[test]
    fn test_parse_analysis() {
        let text = r#"{"title":"Click Save","description":"Press the Save button."}"#;
        assert_eq!(
            parse_analysis(Some(text.to_string())).unwrap(),
            StepAnalysis::new("Click Save", "Press the Save button.")
        );
        assert_eq!(parse_analysis(None).unwrap(), StepAnalysis::placeholder());
        assert!(matches!(
            parse_analysis(Some("not json".to_string())),
            Err(AssistError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_analysis_request_shape() {
        let body = analysis_request(&image());
        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[1]["text"], ANALYZE_PROMPT);
        assert_eq!(
            body["generationConfig"]["responseSchema"]["required"],
            json!(["title", "description"])
        );
    }

    #[test]
    fn test_chat_request_appends_message() {
        let history = vec![ChatMessage::model("Hi!"), ChatMessage::user("Check this")];
        let body = chat_request("Thanks", &history);
        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["role"], "model");
        assert_eq!(contents[2]["parts"][0]["text"], "Thanks");
    }

    #[test]
    fn test_enhance_prompt_includes_context() {
        let body = enhance_request(&image(), "Open menu", "click it");
        let prompt = body["contents"][0]["parts"][1]["text"].as_str().unwrap();
        assert!(prompt.contains("Current Title: \"Open menu\""));
        assert!(prompt.contains("Current Draft: \"click it\""));
    }
}
