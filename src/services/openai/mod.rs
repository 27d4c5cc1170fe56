//! OpenAI client for chart generation, prompt analysis, sample data and
//! audio transcription.

pub mod prompts;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use super::http_client;
use crate::config::OpenAiConfig;
use crate::schemas::{GenerateDataResponse, PromptAnalysis};

pub use prompts::{build_chart_prompt, chart_type_from_template, finalize_chart};

#[derive(Debug, Error)]
pub enum AiError {
    #[error("OpenAI is not configured")]
    NotConfigured,

    #[error("OpenAI request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OpenAI API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Empty response from OpenAI")]
    EmptyResponse,

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

/// A generated chart ready to be stored and returned.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedChart {
    pub chart_config: Value,
    pub jsx: String,
    pub description: String,
    pub svg: Option<String>,
}

#[async_trait]
pub trait ChartAi: Send + Sync {
    async fn generate_chart(&self, chart_type: &str, data: &Map<String, Value>) -> Result<GeneratedChart, AiError>;

    async fn analyze_prompt(&self, prompt: &str) -> Result<PromptAnalysis, AiError>;

    async fn generate_data(
        &self,
        description: &str,
        data_points: u32,
        chart_type: Option<&str>,
    ) -> Result<GenerateDataResponse, AiError>;

    async fn transcribe_audio(&self, audio: Vec<u8>, mime_type: Option<&str>) -> Result<String, AiError>;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    pub fn new(config: &OpenAiConfig) -> Result<Self, AiError> {
        Ok(Self { client: http_client(config.request_timeout_secs)?, config: config.clone() })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn api_key(&self) -> Result<&str, AiError> {
        match self.config.api_key.trim() {
            "" => Err(AiError::NotConfigured),
            key => Ok(key),
        }
    }

    /// Runs a JSON-mode chat completion and parses the message content.
    async fn complete_json(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<Value, AiError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: user },
            ],
            temperature,
            max_tokens,
            response_format: ResponseFormat { kind: "json_object" },
        };

        tracing::debug!("OpenAI chat completion: model={} max_tokens={}", self.config.model, max_tokens);
        let response = self
            .client
            .post(self.endpoint("chat/completions"))
            .bearer_auth(self.api_key()?)
            .json(&request)
            .send()
            .await?;
        let response: ChatResponse = read_json(response).await?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(AiError::EmptyResponse)?;

        serde_json::from_str(&content).map_err(|e| AiError::Parse(e.to_string()))
    }
}

#[async_trait]
impl ChartAi for OpenAiClient {
    async fn generate_chart(&self, chart_type: &str, data: &Map<String, Value>) -> Result<GeneratedChart, AiError> {
        let prompt = build_chart_prompt(chart_type, data);
        let result = self.complete_json(prompts::CHART_SYSTEM_PROMPT, &prompt, 0.2, 4000).await?;
        finalize_chart(result, data)
    }

    async fn analyze_prompt(&self, prompt: &str) -> Result<PromptAnalysis, AiError> {
        let user = format!("Analyze this prompt and generate chart data:\n\n{}", prompt);
        let result = self.complete_json(prompts::ANALYZE_SYSTEM_PROMPT, &user, 0.3, 2000).await?;
        serde_json::from_value(result).map_err(|e| AiError::Parse(e.to_string()))
    }

    async fn generate_data(
        &self,
        description: &str,
        data_points: u32,
        chart_type: Option<&str>,
    ) -> Result<GenerateDataResponse, AiError> {
        let system = prompts::build_data_prompt(data_points, chart_type);
        let result = self.complete_json(&system, description, 0.4, 1000).await?;
        serde_json::from_value(result).map_err(|e| AiError::Parse(e.to_string()))
    }

    async fn transcribe_audio(&self, audio: Vec<u8>, mime_type: Option<&str>) -> Result<String, AiError> {
        let mime = mime_type.map(|m| m.split(';').next().unwrap_or(m).trim()).unwrap_or("audio/m4a");
        let part = Part::bytes(audio).file_name(audio_file_name(mime)).mime_str(mime)?;
        let form = Form::new()
            .text("model", self.config.transcription_model.clone())
            .part("file", part);

        let response = self
            .client
            .post(self.endpoint("audio/transcriptions"))
            .bearer_auth(self.api_key()?)
            .multipart(form)
            .send()
            .await?;
        let transcription: TranscriptionResponse = read_json(response).await?;
        Ok(transcription.text.trim().to_string())
    }
}

/// Upload name for the transcription endpoint, which infers the format from
/// the extension.
pub fn audio_file_name(mime_type: &str) -> String {
    let extension = match mime_type.to_lowercase().as_str() {
        "audio/mpeg" | "audio/mp3" => "mp3",
        "audio/wav" | "audio/x-wav" | "audio/wave" => "wav",
        "audio/webm" | "video/webm" => "webm",
        "audio/ogg" => "ogg",
        "audio/flac" | "audio/x-flac" => "flac",
        "video/mp4" => "mp4",
        _ => "m4a",
    };
    format!("audio.{}", extension)
}

async fn read_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T, AiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
            .unwrap_or(body);
        return Err(AiError::Api { status: status.as_u16(), message });
    }
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| AiError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_file_names() {
        assert_eq!(audio_file_name("audio/mpeg"), "audio.mp3");
        assert_eq!(audio_file_name("audio/webm"), "audio.webm");
        assert_eq!(audio_file_name("audio/x-m4a"), "audio.m4a");
        assert_eq!(audio_file_name("application/octet-stream"), "audio.m4a");
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_network() {
        let client = OpenAiClient::new(&OpenAiConfig::default()).unwrap();
        let err = client.analyze_prompt("monthly sales").await.unwrap_err();
        assert!(matches!(err, AiError::NotConfigured));
    }
}
