//! AI writing assist
//!
//! `AiAssist` is the blocking service seam. `Assistant` is what the rest of
//! the engine calls: it moves each request onto the blocking pool, bounds it
//! with a timeout and turns every failure into fixed fallback text, so a
//! missing key or a dead network never blocks editing.

pub mod gemini;

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;
use crate::domain::ImageData;
use crate::error::AssistError;

pub use gemini::GeminiClient;

/// Reply shown in the chat panel when a chat call fails
pub const CHAT_FALLBACK: &str = "Sorry, something went wrong. Please try again.";

/// Suggested title and description for a freshly captured step
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepAnalysis {
    pub title: String,
    pub description: String,
}

impl StepAnalysis {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    /// Used when analysis failed
    pub fn fallback() -> Self {
        Self::new(
            "Step Captured",
            "Could not automatically analyze image. Please add details manually.",
        )
    }

    /// Used when the service answered with nothing
    pub fn placeholder() -> Self {
        Self::new("New Step", "Add description here.")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

/// One turn of the writing-assistant conversation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
        }
    }
}

/// Blocking AI service
pub trait AiAssist: Send + Sync + 'static {
    /// Suggest a title and description for a screenshot
    fn analyze(&self, image: &ImageData) -> Result<StepAnalysis, AssistError>;

    /// Rewrite a step description from its screenshot and current text
    fn enhance(&self, image: &ImageData, title: &str, draft: &str) -> Result<String, AssistError>;

    /// Answer a writing question given the conversation so far
    fn chat(&self, message: &str, history: &[ChatMessage]) -> Result<String, AssistError>;
}

/// Timeout-bounded, never-failing front for an `AiAssist`
pub struct Assistant<A> {
    inner: Arc<A>,
    timeout: Duration,
}

impl<A> Clone for Assistant<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            timeout: self.timeout,
        }
    }
}

impl<A: AiAssist> Assistant<A> {
    pub fn new(assist: A, timeout: Duration) -> Self {
        Self {
            inner: Arc::new(assist),
            timeout,
        }
    }

    pub fn from_config(assist: A, config: &EditorConfig) -> Self {
        Self::new(assist, Duration::from_millis(config.assist_timeout_ms))
    }

    /// Analysis of `image`, or `StepAnalysis::fallback` on any failure
    pub async fn analyze(&self, image: ImageData) -> StepAnalysis {
        match self.run(move |assist| assist.analyze(&image)).await {
            Ok(analysis) => analysis,
            Err(err) => {
                log::error!("Step analysis failed: {err}");
                StepAnalysis::fallback()
            }
        }
    }

    /// Enhanced description, or `draft` unchanged on failure or empty answer
    pub async fn enhance(&self, image: ImageData, title: String, draft: String) -> String {
        let current = draft.clone();
        match self
            .run(move |assist| assist.enhance(&image, &title, &draft))
            .await
        {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => current,
            Err(err) => {
                log::error!("Description enhancement failed: {err}");
                current
            }
        }
    }

    /// Chat reply, or `CHAT_FALLBACK` on failure
    pub async fn chat(&self, message: String, history: Vec<ChatMessage>) -> String {
        match self.run(move |assist| assist.chat(&message, &history)).await {
            Ok(text) => text,
            Err(err) => {
                log::error!("Chat request failed: {err}");
                CHAT_FALLBACK.to_string()
            }
        }
    }

    async fn run<T, F>(&self, call: F) -> Result<T, AssistError>
    where
        T: Send + 'static,
        F: FnOnce(&A) -> Result<T, AssistError> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        let task = tokio::task::spawn_blocking(move || call(inner.as_ref()));
        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(AssistError::Request(format!(
                "assist task failed: {join_err}"
            ))),
            Err(_) => Err(AssistError::Timeout {
                timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Canned responses; `None` means the call fails
    struct FakeAssist {
        analysis: Option<StepAnalysis>,
        text: Option<String>,
        delay: Duration,
    }

    impl FakeAssist {
        fn failing() -> Self {
            Self {
                analysis: None,
                text: None,
                delay: Duration::ZERO,
            }
        }
    }

    impl AiAssist for FakeAssist {
        fn analyze(&self, _image: &ImageData) -> Result<StepAnalysis, AssistError> {
            std::thread::sleep(self.delay);
            self.analysis.clone().ok_or(AssistError::MissingApiKey)
        }

        fn enhance(&self, _image: &ImageData, _title: &str, _draft: &str) -> Result<String, AssistError> {
            self.text
                .clone()
                .ok_or_else(|| AssistError::Request("offline".to_string()))
        }

        fn chat(&self, message: &str, history: &[ChatMessage]) -> Result<String, AssistError> {
            self.text
                .as_ref()
                .map(|t| format!("{t} ({} prior, re: {message})", history.len()))
                .ok_or_else(|| AssistError::Request("offline".to_string()))
        }
    }

    fn image() -> ImageData {
        ImageData::from_rgba(&image::RgbaImage::new(2, 2)).unwrap()
    }

    #[tokio::test]
    async fn test_successful_calls_pass_through() {
        let assistant = Assistant::new(
            FakeAssist {
                analysis: Some(StepAnalysis::new("Click Save", "Saves the file.")),
                text: Some("Polished".to_string()),
                delay: Duration::ZERO,
            },
            Duration::from_secs(5),
        );
        assert_eq!(assistant.analyze(image()).await.title, "Click Save");
        assert_eq!(
            assistant.enhance(image(), "t".into(), "draft".into()).await,
            "Polished"
        );
        let reply = assistant
            .chat("hi".into(), vec![ChatMessage::model("Hello!")])
            .await;
        assert_eq!(reply, "Polished (1 prior, re: hi)");
    }

    #[tokio::test]
    async fn test_failures_use_fallbacks() {
        let assistant = Assistant::new(FakeAssist::failing(), Duration::from_secs(5));
        assert_eq!(assistant.analyze(image()).await, StepAnalysis::fallback());
        assert_eq!(
            assistant.enhance(image(), "t".into(), "my draft".into()).await,
            "my draft"
        );
        assert_eq!(assistant.chat("hi".into(), Vec::new()).await, CHAT_FALLBACK);
    }

    #[tokio::test]
    async fn test_empty_enhancement_keeps_draft() {
        let assistant = Assistant::new(
            FakeAssist {
                analysis: None,
                text: Some("  ".to_string()),
                delay: Duration::ZERO,
            },
            Duration::from_secs(5),
        );
        assert_eq!(
            assistant.enhance(image(), "t".into(), "keep me".into()).await,
            "keep me"
        );
    }

    #[tokio::test]
    async fn test_slow_analysis_times_out() {
        let assistant = Assistant::new(
            FakeAssist {
                analysis: Some(StepAnalysis::new("Too late", "")),
                text: None,
                delay: Duration::from_millis(300),
            },
            Duration::from_millis(20),
        );
        assert_eq!(assistant.analyze(image()).await, StepAnalysis::fallback());
    }
}
