use crate::color::Color;
use crate::geometry::Rect;
use crate::ir::{DashStyle, VertexShape};
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const MINIMUM_WIDTH: f32 = 1.0;
pub const MAXIMUM_WIDTH: f32 = 10.0;
pub const MINIMUM_RADIUS: f32 = 0.1;
pub const MAXIMUM_RADIUS: f32 = 549.0;
pub const DEFAULT_FILTERED_ALPHA: u8 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleConfig {
    pub default_shape: VertexShape,
    pub default_radius: f32,
    pub default_edge_width: f32,
    pub default_dash_style: DashStyle,
    pub vertex_alpha: u8,
    pub edge_alpha: u8,
    /// Multiplier applied to widths, radii and font sizes.
    pub graph_scale: f32,
    pub max_label_length: Option<usize>,
    pub filtered_alpha: u8,
    pub honor_selection: bool,
    pub selected_edge_width: f32,
    pub show_arrows: bool,
    /// Arrowhead length as a multiple of the edge width.
    pub arrow_length_factor: f32,
    pub min_arrow_length: f32,
    pub self_loop_radius: f32,
    pub label_padding: f32,
    pub secondary_label_offset: f32,
    pub fast_text_metrics: bool,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            default_shape: VertexShape::Disk,
            default_radius: 3.0,
            default_edge_width: 1.0,
            default_dash_style: DashStyle::Solid,
            vertex_alpha: 255,
            edge_alpha: 255,
            graph_scale: 1.0,
            max_label_length: None,
            filtered_alpha: DEFAULT_FILTERED_ALPHA,
            honor_selection: true,
            selected_edge_width: 2.0,
            show_arrows: true,
            arrow_length_factor: 3.0,
            min_arrow_length: 6.0,
            self_loop_radius: 8.0,
            label_padding: 3.0,
            secondary_label_offset: 2.0,
            fast_text_metrics: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasConfig {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl CanvasConfig {
    pub fn drawable_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            margin: 6.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub theme: Theme,
    pub style: StyleConfig,
    pub canvas: CanvasConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<NumberOrString>,
    background: Option<String>,
    vertex_color: Option<String>,
    edge_color: Option<String>,
    selected_color: Option<String>,
    label_fill_color: Option<String>,
    label_text_color: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f32),
    String(String),
}

impl NumberOrString {
    fn as_f32(&self) -> Option<f32> {
        match self {
            NumberOrString::Number(val) => Some(*val),
            NumberOrString::String(val) => val.trim().trim_end_matches("px").parse::<f32>().ok(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct StyleConfigFile {
    default_shape: Option<String>,
    default_radius: Option<f32>,
    default_edge_width: Option<f32>,
    default_dash_style: Option<String>,
    vertex_alpha: Option<u8>,
    edge_alpha: Option<u8>,
    graph_scale: Option<f32>,
    max_label_length: Option<usize>,
    filtered_alpha: Option<u8>,
    honor_selection: Option<bool>,
    selected_edge_width: Option<f32>,
    show_arrows: Option<bool>,
    arrow_length_factor: Option<f32>,
    min_arrow_length: Option<f32>,
    self_loop_radius: Option<f32>,
    label_padding: Option<f32>,
    secondary_label_offset: Option<f32>,
    fast_text_metrics: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct CanvasConfigFile {
    width: Option<f32>,
    height: Option<f32>,
    margin: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    style: Option<StyleConfigFile>,
    canvas: Option<CanvasConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = serde_json::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        config.theme = Theme::from_name(theme_name)
            .ok_or_else(|| anyhow::anyhow!("unknown theme `{theme_name}`"))?;
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size.and_then(|v| v.as_f32()) {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = parse_color_var("background", &v)?;
        }
        if let Some(v) = vars.vertex_color {
            config.theme.vertex_color = parse_color_var("vertexColor", &v)?;
        }
        if let Some(v) = vars.edge_color {
            config.theme.edge_color = parse_color_var("edgeColor", &v)?;
        }
        if let Some(v) = vars.selected_color {
            config.theme.selected_color = parse_color_var("selectedColor", &v)?;
        }
        if let Some(v) = vars.label_fill_color {
            config.theme.label_fill_color = parse_color_var("labelFillColor", &v)?;
        }
        if let Some(v) = vars.label_text_color {
            config.theme.label_text_color = parse_color_var("labelTextColor", &v)?;
        }
    }

    if let Some(style) = parsed.style {
        if let Some(v) = style.default_shape {
            config.style.default_shape = VertexShape::from_token(&v)
                .ok_or_else(|| anyhow::anyhow!("unknown defaultShape `{v}`"))?;
        }
        if let Some(v) = style.default_radius {
            config.style.default_radius = v;
        }
        if let Some(v) = style.default_edge_width {
            config.style.default_edge_width = v;
        }
        if let Some(v) = style.default_dash_style {
            config.style.default_dash_style = DashStyle::from_token(&v)
                .ok_or_else(|| anyhow::anyhow!("unknown defaultDashStyle `{v}`"))?;
        }
        if let Some(v) = style.vertex_alpha {
            config.style.vertex_alpha = v;
        }
        if let Some(v) = style.edge_alpha {
            config.style.edge_alpha = v;
        }
        if let Some(v) = style.graph_scale {
            config.style.graph_scale = v;
        }
        if style.max_label_length.is_some() {
            config.style.max_label_length = style.max_label_length;
        }
        if let Some(v) = style.filtered_alpha {
            config.style.filtered_alpha = v;
        }
        if let Some(v) = style.honor_selection {
            config.style.honor_selection = v;
        }
        if let Some(v) = style.selected_edge_width {
            config.style.selected_edge_width = v;
        }
        if let Some(v) = style.show_arrows {
            config.style.show_arrows = v;
        }
        if let Some(v) = style.arrow_length_factor {
            config.style.arrow_length_factor = v;
        }
        if let Some(v) = style.min_arrow_length {
            config.style.min_arrow_length = v;
        }
        if let Some(v) = style.self_loop_radius {
            config.style.self_loop_radius = v;
        }
        if let Some(v) = style.label_padding {
            config.style.label_padding = v;
        }
        if let Some(v) = style.secondary_label_offset {
            config.style.secondary_label_offset = v;
        }
        if let Some(v) = style.fast_text_metrics {
            config.style.fast_text_metrics = v;
        }
    }

    if let Some(canvas) = parsed.canvas {
        if let Some(v) = canvas.width {
            config.canvas.width = v;
        }
        if let Some(v) = canvas.height {
            config.canvas.height = v;
        }
        if let Some(v) = canvas.margin {
            config.canvas.margin = v;
        }
    }

    if config.style.graph_scale <= 0.0 || !config.style.graph_scale.is_finite() {
        anyhow::bail!("graphScale must be positive, got {}", config.style.graph_scale);
    }

    Ok(config)
}

fn parse_color_var(name: &str, value: &str) -> anyhow::Result<Color> {
    Color::parse(value).ok_or_else(|| anyhow::anyhow!("invalid color for {name}: `{value}`"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_constants() {
        let config = Config::default();
        assert_eq!(config.style.default_shape, VertexShape::Disk);
        assert_eq!(config.style.default_radius, 3.0);
        assert_eq!(config.style.filtered_alpha, 10);
        assert!(config.style.max_label_length.is_none());
    }

    #[test]
    fn file_values_override_defaults() {
        let config = parse_config(
            r##"{
                "theme": "modern",
                "themeVariables": { "fontSize": "14px", "selectedColor": "#00FF00" },
                "style": { "defaultShape": "square", "graphScale": 2, "maxLabelLength": 8 },
                "canvas": { "width": 50, "height": 40, "margin": 5 }
            }"##,
        )
        .unwrap();
        assert_eq!(config.theme.font_family, Theme::modern().font_family);
        assert_eq!(config.theme.font_size, 14.0);
        assert_eq!(config.theme.selected_color, Color::rgb(0, 255, 0));
        assert_eq!(config.style.default_shape, VertexShape::Square);
        assert_eq!(config.style.graph_scale, 2.0);
        assert_eq!(config.style.max_label_length, Some(8));
        assert_eq!(config.canvas.drawable_rect(), Rect::new(0.0, 0.0, 50.0, 40.0));
        assert_eq!(config.canvas.margin, 5.0);
    }

    #[test]
    fn rejects_unknown_enum_and_bad_scale() {
        assert!(parse_config(r#"{ "style": { "defaultDashStyle": "wavy" } }"#).is_err());
        assert!(parse_config(r#"{ "style": { "graphScale": 0 } }"#).is_err());
        assert!(parse_config(r#"{ "theme": "neon" }"#).is_err());
    }
}
