use serde::{Deserialize, Serialize};

fn default_language() -> String {
    "auto".to_string()
}

fn default_data_points() -> u32 {
    6
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzePromptRequest {
    pub prompt: String,
    #[serde(default = "default_language")]
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSuggestion {
    pub chart_type: String,
    #[serde(default)]
    pub confidence: i64,
    #[serde(default)]
    pub reason: String,
}

/// Structured reading of a free-text chart request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptAnalysis {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub values: Vec<f64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub suggested_charts: Vec<ChartSuggestion>,
    #[serde(default)]
    pub data_interpretation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzePromptResponse {
    pub success: bool,
    #[serde(flatten)]
    pub analysis: PromptAnalysis,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscribeAudioRequest {
    pub audio_base64: String,
    #[serde(default)]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscribeAudioResponse {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateDataRequest {
    pub description: String,
    #[serde(default = "default_data_points")]
    pub data_points: u32,
    #[serde(default)]
    pub chart_type: Option<String>,
}

/// Sample dataset produced from a description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateDataResponse {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub title: String,
    pub suggested_type: String,
}
