//! Built-in chart template catalog.
//!
//! Each template carries its sample data plus a `preview_dsl` document
//! (canvas, theme, data source, layers, scales, interactions) that clients
//! render as the template thumbnail.

use serde_json::{json, Value};

use crate::schemas::NewTemplate;

const DSL_VERSION: &str = "1.0.0";

/// Theme palette overrides; unset fields use the brand colors.
#[derive(Debug, Clone)]
pub struct ThemeColors<'a> {
    pub primary: &'a str,
    pub secondary: &'a str,
    pub accent: &'a str,
    pub background: &'a str,
    pub foreground: &'a str,
}

impl Default for ThemeColors<'_> {
    fn default() -> Self {
        Self {
            primary: "#165DFC",
            secondary: "#8EC6FF",
            accent: "#4A7DFD",
            background: "#0F172A",
            foreground: "#F8FAFC",
        }
    }
}

pub fn theme(colors: &ThemeColors<'_>) -> Value {
    json!({
        "palette": {
            "primary": colors.primary,
            "secondary": colors.secondary,
            "accent": colors.accent,
            "background": colors.background,
            "foreground": colors.foreground,
            "muted": "#94A3B8",
            "success": "#10B981",
            "warning": "#F59E0B",
            "error": "#EF4444"
        },
        "typography": {
            "fontFamily": "Geist, sans-serif",
            "fontSize": 16,
            "fontWeight": 500
        },
        "effects": {
            "gradient": {
                "type": "linear",
                "colors": [
                    {"color": colors.primary, "offset": 0},
                    {"color": colors.secondary, "offset": 1}
                ],
                "start": {"x": 0, "y": 0},
                "end": {"x": 1, "y": 1}
            },
            "shadow": {"blur": 24, "color": "#00000055", "offsetX": 0, "offsetY": 16},
            "opacity": 1,
            "blendMode": "normal"
        }
    })
}

pub fn canvas(width: u32, height: u32) -> Value {
    json!({
        "width": width,
        "height": height,
        "padding": {"top": 64, "right": 64, "bottom": 96, "left": 96},
        "background": "transparent"
    })
}

pub fn interactions() -> Value {
    json!({
        "tooltip": {"enabled": true, "position": "auto"},
        "zoom": {"enabled": false, "mode": "xy"},
        "pan": {"enabled": false, "mode": "xy"},
        "selection": {"enabled": false, "mode": "single"}
    })
}

pub fn scales(x_type: &str, x_padding: f64) -> Value {
    json!({
        "x": {"type": x_type, "nice": true, "padding": x_padding},
        "y": {"type": "linear", "nice": true}
    })
}

pub fn data_source(labels: &Value, datasets: &Value) -> Value {
    json!({
        "source": {"labels": labels, "datasets": datasets},
        "transforms": []
    })
}

pub fn grid_layer(direction: &str, opacity: f64) -> Value {
    json!({
        "type": "grid",
        "direction": direction,
        "color": "#1E293B",
        "width": 1,
        "opacity": opacity,
        "style": "solid"
    })
}

pub fn axis_layer(axis_type: &str, position: &str) -> Value {
    json!({
        "type": axis_type,
        "position": position,
        "showLabels": true,
        "showTicks": true,
        "showLine": true,
        "color": "#94A3B8",
        "fontSize": 14,
        "tickLength": 8
    })
}

fn series_field(dataset_index: usize) -> String {
    format!("datasets.{}.data", dataset_index)
}

/// Filled area with a vertical gradient through `colors`, stroked with the
/// second color (or the first when only one is given).
pub fn area_layer(dataset_index: usize, colors: &[&str], opacity: f64, smooth: bool) -> Value {
    let first = colors.first().copied().unwrap_or("#165DFC");
    let stroke = colors.get(1).copied().unwrap_or(first);
    let steps = colors.len().saturating_sub(1).max(1) as f64;
    let stops: Vec<Value> = colors
        .iter()
        .enumerate()
        .map(|(idx, color)| json!({"color": color, "offset": idx as f64 / steps}))
        .collect();

    json!({
        "type": "area",
        "xField": "labels",
        "yField": series_field(dataset_index),
        "color": first,
        "opacity": opacity,
        "smooth": smooth,
        "stroke": {"color": stroke, "width": 3},
        "effects": {
            "gradient": {
                "type": "linear",
                "colors": stops,
                "start": {"x": 0, "y": 0},
                "end": {"x": 0, "y": 1}
            },
            "shadow": {"blur": 20, "color": format!("{}44", first), "offsetX": 0, "offsetY": 18},
            "opacity": 0.95,
            "blendMode": "normal"
        }
    })
}

pub fn bar_layer(dataset_index: usize, colors: &[&str]) -> Value {
    json!({
        "type": "bars",
        "xField": "labels",
        "yField": series_field(dataset_index),
        "color": colors,
        "width": 0.72,
        "borderRadius": 14,
        "effects": {
            "shadow": {"blur": 14, "color": "#00000033", "offsetX": 0, "offsetY": 10},
            "opacity": 0.95
        }
    })
}

pub fn line_layer(dataset_index: usize, color: &str, smooth: bool) -> Value {
    json!({
        "type": "line",
        "xField": "labels",
        "yField": series_field(dataset_index),
        "color": color,
        "width": 4,
        "smooth": smooth,
        "showPoints": true,
        "effects": {
            "shadow": {"blur": 8, "color": format!("{}66", color), "offsetX": 0, "offsetY": 6},
            "opacity": 1
        }
    })
}

struct TemplateSpec<'a> {
    name: &'a str,
    description: &'a str,
    chart_type: &'a str,
    labels: Value,
    datasets: Value,
    colors: ThemeColors<'a>,
    layers: Vec<Value>,
    scales: Value,
}

impl TemplateSpec<'_> {
    fn into_template(self) -> NewTemplate {
        let preview_dsl = json!({
            "version": DSL_VERSION,
            "canvas": canvas(1200, 720),
            "theme": theme(&self.colors),
            "data": data_source(&self.labels, &self.datasets),
            "layers": self.layers,
            "scales": self.scales,
            "interactions": interactions()
        });

        NewTemplate {
            name: self.name.to_string(),
            description: Some(self.description.to_string()),
            chart_type: self.chart_type.to_string(),
            is_premium: false,
            example_data: Some(json!({
                "labels": self.labels,
                "datasets": self.datasets,
                "preview_dsl": preview_dsl
            })),
            thumbnail_url: None,
        }
    }
}

/// The catalog in seeding order.
pub fn build_templates() -> Vec<NewTemplate> {
    let aurora = TemplateSpec {
        name: "Aurora Growth",
        description: "Gradient-stacked area showing revenue pillars with neon glow.",
        chart_type: "area",
        labels: json!(["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep"]),
        datasets: json!([
            {"label": "Subscriptions", "data": [42, 56, 68, 74, 80, 92, 110, 124, 138]},
            {"label": "Services", "data": [24, 32, 41, 47, 53, 60, 72, 81, 95]}
        ]),
        colors: ThemeColors { background: "#020617", foreground: "#E2E8F0", ..Default::default() },
        layers: vec![
            grid_layer("both", 0.2),
            axis_layer("axis-x", "bottom"),
            axis_layer("axis-y", "left"),
            area_layer(0, &["#34D399", "#10B981", "#064E3B"], 0.75, true),
            area_layer(1, &["#60A5FA", "#3B82F6", "#1E3A8A"], 0.75, true),
        ],
        scales: scales("band", 0.1),
    };

    let midnight = TemplateSpec {
        name: "Midnight Velocity",
        description: "Rounded neon bars with ambient glow for KPIs.",
        chart_type: "bar",
        labels: json!(["Design", "Dev", "Ops", "Growth", "Success", "Finance"]),
        datasets: json!([{"label": "Velocity", "data": [82, 64, 58, 91, 74, 68]}]),
        colors: ThemeColors { primary: "#8B5CF6", secondary: "#F43F5E", background: "#020617", ..Default::default() },
        layers: vec![
            grid_layer("both", 0.35),
            axis_layer("axis-x", "bottom"),
            axis_layer("axis-y", "left"),
            bar_layer(0, &["#8B5CF6", "#6366F1", "#EC4899", "#F43F5E", "#F97316", "#22D3EE"]),
        ],
        scales: scales("band", 0.2),
    };

    let horizon = TemplateSpec {
        name: "Horizon Split",
        description: "Minimal retention trajectory with glowing line overlay.",
        chart_type: "line",
        labels: json!(["Q1", "Q2", "Q3", "Q4", "Q5", "Q6"]),
        datasets: json!([{"label": "Net Retention", "data": [104, 108, 111, 115, 119, 124]}]),
        colors: ThemeColors { primary: "#FBBF24", secondary: "#F97316", background: "#0F172A", ..Default::default() },
        layers: vec![
            grid_layer("both", 0.25),
            axis_layer("axis-x", "bottom"),
            axis_layer("axis-y", "left"),
            area_layer(0, &["#FDE68A88", "#F59E0B55", "#78350F33"], 0.35, true),
            line_layer(0, "#FBBF24", true),
        ],
        scales: scales("band", 0.05),
    };

    let stellar = TemplateSpec {
        name: "Stellar Contribution",
        description: "Contrasting cyan/pink bars for channel splits.",
        chart_type: "bar",
        labels: json!(["Product", "Marketing", "Sales", "Success", "Ops"]),
        datasets: json!([{"label": "Contribution", "data": [34, 27, 21, 11, 7]}]),
        colors: ThemeColors { primary: "#0EA5E9", secondary: "#F472B6", background: "#020617", ..Default::default() },
        layers: vec![
            grid_layer("horizontal", 0.15),
            axis_layer("axis-x", "bottom"),
            bar_layer(0, &["#0EA5E9", "#38BDF8", "#7DD3FC", "#CFFAFE", "#F0F9FF"]),
            line_layer(0, "#F472B6", false),
        ],
        scales: scales("band", 0.2),
    };

    [aurora, midnight, horizon, stellar].into_iter().map(TemplateSpec::into_template).collect()
}
