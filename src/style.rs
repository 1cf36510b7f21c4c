use crate::color::Color;
use crate::config::{
    Config, MAXIMUM_RADIUS, MAXIMUM_WIDTH, MINIMUM_RADIUS, MINIMUM_WIDTH, StyleConfig,
};
use crate::error::{ElementRef, RenderError, Result};
use crate::ir::{
    DashStyle, DrawingPrecedence, Edge, LabelPosition, Vertex, VertexShape, Visibility,
};
use crate::surface::DashPattern;
use crate::theme::Theme;

const DASH: &[f32] = &[2.0, 2.0];
const DOT: &[f32] = &[0.5, 2.0];
const DASH_DOT: &[f32] = &[2.0, 2.0, 0.5, 2.0];
const DASH_DOT_DOT: &[f32] = &[2.0, 2.0, 0.5, 2.0, 0.5, 2.0];

/// Read access to the style-relevant parts of a graph element.
pub trait Styled {
    fn element(&self) -> ElementRef;
    fn visibility(&self) -> Visibility;
    fn is_selected(&self) -> bool;
    fn color_override(&self) -> Option<Color>;
    fn alpha_override(&self) -> Option<u8>;
}

impl Styled for Vertex {
    fn element(&self) -> ElementRef {
        ElementRef::Vertex(self.id)
    }
    fn visibility(&self) -> Visibility {
        self.visibility
    }
    fn is_selected(&self) -> bool {
        self.selected
    }
    fn color_override(&self) -> Option<Color> {
        self.style.color
    }
    fn alpha_override(&self) -> Option<u8> {
        self.style.alpha
    }
}

impl Styled for Edge {
    fn element(&self) -> ElementRef {
        ElementRef::Edge(self.id)
    }
    fn visibility(&self) -> Visibility {
        self.visibility
    }
    fn is_selected(&self) -> bool {
        self.selected
    }
    fn color_override(&self) -> Option<Color> {
        self.style.color
    }
    fn alpha_override(&self) -> Option<u8> {
        self.style.alpha
    }
}

#[derive(Debug, Clone, Default)]
pub struct StyleResolver {
    pub theme: Theme,
    pub style: StyleConfig,
}

impl StyleResolver {
    pub fn new(theme: Theme, style: StyleConfig) -> Self {
        Self { theme, style }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.theme.clone(), config.style.clone())
    }

    pub fn visibility<E: Styled>(&self, element: &E) -> Visibility {
        element.visibility()
    }

    pub fn draw_as_selected<E: Styled>(&self, element: &E) -> bool {
        self.style.honor_selection && element.is_selected()
    }

    pub fn vertex_color(&self, vertex: &Vertex, visibility: Visibility, selected: bool) -> Color {
        let default = self.theme.vertex_color.with_alpha(self.style.vertex_alpha);
        self.color(vertex, default, visibility, selected)
    }

    pub fn edge_color(&self, edge: &Edge, visibility: Visibility, selected: bool) -> Color {
        let default = self.theme.edge_color.with_alpha(self.style.edge_alpha);
        self.color(edge, default, visibility, selected)
    }

    /// Selected elements get the opaque selected color. Otherwise the override
    /// color (carrying the default's alpha) or the default, then filtered alpha
    /// or alpha override, in that order.
    pub fn color<E: Styled>(
        &self,
        element: &E,
        default: Color,
        visibility: Visibility,
        selected: bool,
    ) -> Color {
        if selected {
            return self.theme.selected_color.with_alpha(255);
        }
        let base = match element.color_override() {
            Some(color) => color.with_alpha(default.a),
            None => default,
        };
        if visibility == Visibility::Filtered {
            return base.with_alpha(self.style.filtered_alpha);
        }
        match element.alpha_override() {
            Some(alpha) => base.with_alpha(alpha),
            None => base,
        }
    }

    /// Label text follows the theme's text color at the element's alpha;
    /// selected elements keep the selected color.
    pub fn label_text_color(&self, element_color: Color, selected: bool) -> Color {
        if selected {
            return element_color;
        }
        self.theme.label_text_color.with_alpha(element_color.a)
    }

    pub fn width(&self, edge: &Edge, selected: bool) -> Result<f32> {
        if selected {
            return Ok(self.style.selected_edge_width * self.style.graph_scale);
        }
        let width = match edge.style.width {
            Some(width) => check_range(
                edge.element(),
                "width",
                width,
                MINIMUM_WIDTH,
                MAXIMUM_WIDTH,
            )?,
            None => self.style.default_edge_width,
        };
        Ok(width * self.style.graph_scale)
    }

    pub fn radius(&self, vertex: &Vertex) -> Result<f32> {
        let radius = match vertex.style.radius {
            Some(radius) => check_range(
                vertex.element(),
                "radius",
                radius,
                MINIMUM_RADIUS,
                MAXIMUM_RADIUS,
            )?,
            None => self.style.default_radius,
        };
        Ok(radius * self.style.graph_scale)
    }

    pub fn dash_pattern(&self, edge: &Edge, selected: bool) -> DashPattern {
        if selected {
            return DashPattern::Solid;
        }
        dash_pattern_for(edge.style.dash_style.unwrap_or(self.style.default_dash_style))
    }

    pub fn shape(&self, vertex: &Vertex) -> VertexShape {
        vertex.style.shape.unwrap_or(self.style.default_shape)
    }

    pub fn drawing_precedence(&self, vertex: &Vertex) -> DrawingPrecedence {
        vertex.style.drawing_precedence.unwrap_or_default()
    }

    pub fn label_position(&self, vertex: &Vertex) -> LabelPosition {
        vertex.style.label_position.unwrap_or_default()
    }

    pub fn font_size(&self) -> f32 {
        self.theme.font_size * self.style.graph_scale
    }

    pub fn truncate_label(&self, text: &str) -> String {
        truncate_label(text, self.style.max_label_length)
    }
}

pub fn dash_pattern_for(style: DashStyle) -> DashPattern {
    match style {
        DashStyle::Solid => DashPattern::Solid,
        DashStyle::Dash => DashPattern::Dashes(DASH),
        DashStyle::Dot => DashPattern::Dashes(DOT),
        DashStyle::DashDot => DashPattern::Dashes(DASH_DOT),
        DashStyle::DashDotDot => DashPattern::Dashes(DASH_DOT_DOT),
    }
}

/// Literal prefix truncation to `max_length` characters.
pub fn truncate_label(text: &str, max_length: Option<usize>) -> String {
    match max_length {
        Some(max) => text.chars().take(max).collect(),
        None => text.to_string(),
    }
}

fn check_range(element: ElementRef, what: &str, value: f32, min: f32, max: f32) -> Result<f32> {
    if value.is_finite() && (min..=max).contains(&value) {
        return Ok(value);
    }
    Err(RenderError::format(
        element,
        format!("{what} {value} is outside the valid range [{min}, {max}]"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::ir::{EdgeId, EdgeStyle, VertexId, VertexStyle};

    fn resolver() -> StyleResolver {
        StyleResolver::from_config(&Config::default())
    }

    fn vertex(style: VertexStyle) -> Vertex {
        Vertex::new(VertexId(7), Point::new(0.0, 0.0)).with_style(style)
    }

    fn edge(style: EdgeStyle) -> Edge {
        Edge::new(EdgeId(3), VertexId(1), VertexId(2), false).with_style(style)
    }

    #[test]
    fn selection_requires_honor_flag() {
        let mut r = resolver();
        let mut v = vertex(VertexStyle::default());
        v.selected = true;
        assert!(r.draw_as_selected(&v));
        r.style.honor_selection = false;
        assert!(!r.draw_as_selected(&v));
    }

    #[test]
    fn selected_color_is_opaque() {
        let mut r = resolver();
        r.theme.selected_color = Color::new(200, 0, 0, 40);
        let v = vertex(VertexStyle {
            alpha: Some(5),
            ..Default::default()
        });
        assert_eq!(r.vertex_color(&v, Visibility::Visible, true), Color::rgb(200, 0, 0));
    }

    #[test]
    fn override_color_takes_default_alpha() {
        let mut r = resolver();
        r.style.vertex_alpha = 100;
        let v = vertex(VertexStyle {
            color: Some(Color::new(1, 2, 3, 250)),
            ..Default::default()
        });
        assert_eq!(r.vertex_color(&v, Visibility::Visible, false), Color::new(1, 2, 3, 100));
    }

    #[test]
    fn filtered_alpha_beats_alpha_override() {
        let r = resolver();
        let v = vertex(VertexStyle {
            alpha: Some(200),
            ..Default::default()
        });
        assert_eq!(r.vertex_color(&v, Visibility::Filtered, false).a, 10);
        assert_eq!(r.vertex_color(&v, Visibility::Visible, false).a, 200);
    }

    #[test]
    fn width_is_scaled_and_range_checked() {
        let mut r = resolver();
        r.style.graph_scale = 2.0;
        assert_eq!(r.width(&edge(EdgeStyle::default()), false).unwrap(), 2.0);
        let wide = edge(EdgeStyle {
            width: Some(4.0),
            ..Default::default()
        });
        assert_eq!(r.width(&wide, false).unwrap(), 8.0);
        assert_eq!(r.width(&wide, true).unwrap(), 4.0);

        let bad = edge(EdgeStyle {
            width: Some(11.0),
            ..Default::default()
        });
        let err = r.width(&bad, false).unwrap_err();
        assert_eq!(err.element(), Some(ElementRef::Edge(EdgeId(3))));
        assert!(err.to_string().contains("edge 3"));
    }

    #[test]
    fn radius_out_of_range_names_vertex() {
        let r = resolver();
        let v = vertex(VertexStyle {
            radius: Some(600.0),
            ..Default::default()
        });
        let err = r.radius(&v).unwrap_err();
        assert!(err.is_format());
        assert!(err.to_string().contains("vertex 7"));
        assert!(r.radius(&vertex(VertexStyle::default())).unwrap() == 3.0);
    }

    #[test]
    fn selected_edges_are_solid() {
        let r = resolver();
        let dashed = edge(EdgeStyle {
            dash_style: Some(DashStyle::DashDot),
            ..Default::default()
        });
        assert_eq!(r.dash_pattern(&dashed, false), DashPattern::Dashes(DASH_DOT));
        assert_eq!(r.dash_pattern(&dashed, true), DashPattern::Solid);
    }

    #[test]
    fn label_text_color_keeps_element_alpha() {
        let mut r = resolver();
        r.theme.label_text_color = Color::rgb(9, 9, 9);
        let element = Color::new(1, 2, 3, 77);
        assert_eq!(r.label_text_color(element, false), Color::new(9, 9, 9, 77));
        assert_eq!(r.label_text_color(element, true), element);
    }

    #[test]
    fn truncate_label_is_prefix() {
        assert_eq!(truncate_label("abcdef", Some(3)), "abc");
        assert_eq!(truncate_label("abcdef", None), "abcdef");
        assert_eq!(truncate_label("ab", Some(3)), "ab");
    }
}
