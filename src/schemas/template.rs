use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::null_as_default;

/// Row of `graphzy_templates`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub chart_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_premium: bool,
    #[serde(default)]
    pub example_data: Option<Value>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

/// Upsert payload for `graphzy_templates`, keyed by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTemplate {
    pub name: String,
    pub description: Option<String>,
    pub chart_type: String,
    pub is_premium: bool,
    pub example_data: Option<Value>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateResponse {
    #[serde(flatten)]
    pub template: TemplateRecord,
    /// Premium template viewed by a caller without a Pro subscription.
    pub is_locked: bool,
}

impl TemplateResponse {
    pub fn for_viewer(template: TemplateRecord, viewer_is_pro: bool) -> Self {
        let is_locked = template.is_premium && !viewer_is_pro;
        Self { template, is_locked }
    }
}
