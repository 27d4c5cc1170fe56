//! Prompt text and response shaping for chart generation.

use serde_json::{json, Map, Value};

use super::{AiError, GeneratedChart};

pub const CHART_SYSTEM_PROMPT: &str =
    "You are a data visualization expert. Always respond with valid JSON only, no markdown formatting or extra text.";

pub const ANALYZE_SYSTEM_PROMPT: &str = r#"You are an expert data analyst and visualization specialist.
Your task is to analyze user prompts (in ANY language) and generate appropriate chart data.

IMPORTANT RULES:
1. Understand the user's intent, even if vague or creative
2. Generate realistic, meaningful data that matches the description
3. If the user mentions specific values or time periods, use them
4. If the user describes a trend (increasing, decreasing), reflect that in the data
5. Choose the most appropriate chart type based on the data nature
6. Respond in the SAME LANGUAGE as the user's prompt for title and description

You must respond with ONLY valid JSON in this exact format:
{
    "success": true,
    "labels": ["Label1", "Label2", ...],
    "values": [number1, number2, ...],
    "title": "Chart title in user's language",
    "description": "Brief description in user's language",
    "suggested_charts": [
        {"chart_type": "line", "confidence": 95, "reason": "Reason in user's language"},
        {"chart_type": "bar", "confidence": 70, "reason": "Reason in user's language"}
    ],
    "data_interpretation": "Explanation of how you interpreted the prompt"
}

Chart types available: line, bar, pie, doughnut, area, scatter, radar, stacked-bar, waterfall, funnel, sankey, gantt, heatmap, treemap, sunburst, candlestick, 3d, 3d-surface, 3d-bar"#;

fn special_instruction(chart_type: &str) -> Option<&'static str> {
    let text = match chart_type {
        "waterfall" => "Create a waterfall chart showing cumulative changes. Use a bar chart with stacked segments where each bar represents a change from the previous value. Show positive changes in one color and negative in another.",
        "funnel" => "Create a funnel chart showing conversion stages. Use a bar chart with decreasing widths, or a custom funnel visualization with stages labeled clearly.",
        "sankey" => "Create a Sankey diagram showing flow between nodes. Use a custom visualization with paths connecting source to target nodes. Include node labels and flow values.",
        "gantt" => "Create a Gantt chart showing project timeline. Use a bar chart with horizontal bars representing time periods. Include task names and date ranges.",
        "3d" => "Create a 3D visualization using Plotly.js. Include proper camera controls, lighting, and interactive rotation. Use Plotly's Scatter3d or Surface3d.",
        "3d-surface" => "Create a 3D surface plot using Plotly.js Surface3d. Show data as a 3D surface with color mapping.",
        "3d-bar" => "Create a 3D bar chart using Plotly.js. Show bars in 3D space with proper depth and perspective.",
        "heatmap" => "Create a heatmap showing intensity values. Use a 2D grid with color gradients representing values. Include axis labels and color scale.",
        "treemap" => "Create a treemap showing hierarchical data. Use nested rectangles sized by value. Include labels and color coding.",
        "sunburst" => "Create a sunburst chart showing hierarchical data in circular form. Use nested arcs with proper sizing and coloring.",
        "candlestick" => "Create a candlestick chart for financial data. Show open, high, low, close values with proper candlestick visualization.",
        _ => return None,
    };
    Some(text)
}

fn library_note(chart_type: &str) -> &'static str {
    match chart_type {
        "3d" | "3d-surface" | "3d-bar" => "Use Plotly.js for 3D rendering. Import Plot from 'react-plotly.js'.",
        "sankey" | "treemap" | "sunburst" => {
            "Use D3.js or a custom React component for this visualization. Include all necessary imports."
        }
        _ => "Use Chart.js with react-chartjs-2. Import from 'react-chartjs-2' and 'chart.js'.",
    }
}

/// User prompt asking for a `{chartConfig, jsx, description}` document.
pub fn build_chart_prompt(chart_type: &str, data: &Map<String, Value>) -> String {
    let kind = chart_type.to_lowercase();
    let instruction = special_instruction(&kind).map(|text| format!("\n{}\n", text)).unwrap_or_default();
    let data_json = serde_json::to_string_pretty(data).unwrap_or_else(|_| "{}".to_string());

    format!(
        r#"You are an expert data visualization designer specializing in Chart.js, Plotly.js, and D3.js.

Based on the provided data, generate a complete chart configuration for a {chart_type} chart.
{instruction}
{library_note}

DATA:
{data_json}

REQUIREMENTS:
1. Analyze the data structure and create appropriate labels and datasets
2. Use beautiful, modern colors (soft pastels: #8B5CF6, #06B6D4, #10B981, #F59E0B, #EF4444, #EC4899)
3. Include proper chart options for responsiveness and aesthetics
4. Generate clean, production-ready code
5. For 3D charts, include camera controls and interactive features
6. For advanced charts (Sankey, Treemap, Sunburst), use appropriate libraries

Return ONLY valid JSON in this exact format (no markdown, no extra text):
{{
    "chartConfig": {{
        "type": "{kind}",
        "data": {{
            "labels": [...],
            "datasets": [...]
        }},
        "options": {{...}}
    }},
    "jsx": "<complete React component with all necessary imports>",
    "description": "<brief description of what the chart shows>"
}}

IMPORTANT:
- The chartConfig must be a valid configuration object for the chosen library
- The jsx must be a complete, self-contained React functional component
- Include all necessary imports in the jsx (react-chartjs-2, plotly.js, d3, etc.)
- Use modern React patterns (hooks, functional components)
- Make the chart responsive and visually appealing
- For 3D charts, ensure proper Plotly.js setup with camera controls"#,
        chart_type = chart_type,
        instruction = instruction,
        library_note = library_note(&kind),
        data_json = data_json,
        kind = kind,
    )
}

pub fn build_data_prompt(data_points: u32, chart_type: Option<&str>) -> String {
    let chart_hint = chart_type.map(|t| format!("for a {} chart", t)).unwrap_or_default();
    format!(
        r#"Generate realistic chart data {chart_hint} based on the description.
Return ONLY valid JSON:
{{
    "labels": ["Label1", "Label2", ...],  // {data_points} labels
    "values": [num1, num2, ...],  // {data_points} numeric values
    "title": "Descriptive title",
    "suggested_type": "line|bar|pie|doughnut|area"
}}

Make the data realistic and match the description's intent."#,
        chart_hint = chart_hint,
        data_points = data_points,
    )
}

/// Maps a template's chart name onto the type the renderer understands.
pub fn chart_type_from_template(template_chart: &str) -> &'static str {
    match template_chart.trim().to_lowercase().as_str() {
        "line" | "area" => "line",
        "bar" | "stacked bar" | "stacked-bar" => "bar",
        "pie" => "pie",
        "donut" | "doughnut" => "doughnut",
        "radar" => "radar",
        "bubble" => "bubble",
        "scatter" => "scatter",
        "polar" | "polar area" => "polarArea",
        "waterfall" => "waterfall",
        "funnel" => "funnel",
        "sankey" => "sankey",
        "gantt" => "gantt",
        "heatmap" => "heatmap",
        "treemap" => "treemap",
        "sunburst" => "sunburst",
        "candlestick" => "candlestick",
        "3d" | "3d-surface" | "3d-bar" => "3d",
        _ => "bar",
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Shapes the model's JSON into a chart: guarantees an options object and
/// stamps the title into `options.title` (unless present) and `data.title`.
pub fn finalize_chart(result: Value, data: &Map<String, Value>) -> Result<GeneratedChart, AiError> {
    let mut result = match result {
        Value::Object(map) => map,
        other => return Err(AiError::Parse(format!("expected a JSON object, got {}", other))),
    };

    let description = non_empty_str(result.get("description")).unwrap_or_default().to_string();
    let title = non_empty_str(data.get("title"))
        .map(str::to_string)
        .or_else(|| Some(description.clone()).filter(|d| !d.is_empty()))
        .unwrap_or_else(|| "Chart".to_string());

    let mut config = match result.remove("chartConfig") {
        Some(Value::Object(config)) => config,
        None | Some(Value::Null) => Map::new(),
        Some(_) => return Err(AiError::Parse("chartConfig must be an object".to_string())),
    };

    let options = config.entry("options").or_insert_with(|| json!({}));
    if !options.is_object() {
        *options = json!({});
    }
    if let Some(options) = options.as_object_mut() {
        options
            .entry("title")
            .or_insert_with(|| json!({ "display": true, "text": title }));
    }

    if let Some(Value::Object(chart_data)) = config.get_mut("data") {
        chart_data.insert("title".to_string(), json!(title));
    }

    Ok(GeneratedChart {
        chart_config: Value::Object(config),
        jsx: non_empty_str(result.get("jsx")).unwrap_or_default().to_string(),
        description,
        svg: non_empty_str(result.get("svg")).map(str::to_string),
    })
}
