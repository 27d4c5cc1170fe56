use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Row of `graphzy_charts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRecord {
    pub id: String,
    pub user_id: String,
    pub template_id: String,
    #[serde(default)]
    pub input_data: Value,
    #[serde(default)]
    pub result_visual: Option<String>,
    #[serde(default)]
    pub result_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Insert payload for `graphzy_charts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewChart {
    pub user_id: String,
    pub template_id: String,
    pub input_data: Value,
    pub result_visual: Option<String>,
    pub result_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartGenerateRequest {
    /// Accepted for client compatibility; the authenticated user always owns the chart.
    #[serde(default)]
    pub user_id: Option<String>,
    pub template_id: String,
    pub data: Map<String, Value>,
    #[serde(default)]
    pub chart_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartGenerateResponse {
    pub id: String,
    pub chart_config: Value,
    pub jsx: String,
    pub svg: Option<String>,
    pub description: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartResponse {
    pub id: String,
    pub template_id: String,
    pub input_data: Value,
    pub result_visual: Option<String>,
    pub result_code: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<ChartRecord> for ChartResponse {
    fn from(chart: ChartRecord) -> Self {
        Self {
            id: chart.id,
            template_id: chart.template_id,
            input_data: chart.input_data,
            result_visual: chart.result_visual,
            result_code: chart.result_code,
            created_at: chart.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartDeleteResponse {
    pub success: bool,
    pub message: String,
}
