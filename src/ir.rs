use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::geometry::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VertexId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub u32);

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Visibility {
    #[default]
    Visible,
    /// Drawn, but with the filtered alpha.
    Filtered,
    /// Not drawn and not cached.
    Hidden,
}

impl Visibility {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "visible" | "show" => Some(Self::Visible),
            "filtered" => Some(Self::Filtered),
            "hidden" | "hide" => Some(Self::Hidden),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VertexShape {
    Circle,
    Disk,
    Sphere,
    Square,
    SolidSquare,
    Diamond,
    SolidDiamond,
    Triangle,
    SolidTriangle,
}

impl VertexShape {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "circle" => Some(Self::Circle),
            "disk" => Some(Self::Disk),
            "sphere" => Some(Self::Sphere),
            "square" => Some(Self::Square),
            "solidsquare" | "solid-square" => Some(Self::SolidSquare),
            "diamond" => Some(Self::Diamond),
            "soliddiamond" | "solid-diamond" => Some(Self::SolidDiamond),
            "triangle" => Some(Self::Triangle),
            "solidtriangle" | "solid-triangle" => Some(Self::SolidTriangle),
            _ => None,
        }
    }

    pub fn is_filled(self) -> bool {
        matches!(
            self,
            Self::Disk | Self::Sphere | Self::SolidSquare | Self::SolidDiamond | Self::SolidTriangle
        )
    }
}

/// Which vertex representations may be attempted, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum DrawingPrecedence {
    Shape = 0,
    Image = 1,
    #[default]
    PrimaryLabel = 2,
}

impl DrawingPrecedence {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "shape" => Some(Self::Shape),
            "image" => Some(Self::Image),
            "primarylabel" | "primary-label" | "label" => Some(Self::PrimaryLabel),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LabelPosition {
    TopLeft,
    TopCenter,
    #[default]
    TopRight,
    MiddleLeft,
    MiddleCenter,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
    Nowhere,
}

impl LabelPosition {
    pub fn from_token(token: &str) -> Option<Self> {
        let normalized: String = token
            .chars()
            .filter(|ch| !matches!(ch, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "topleft" => Some(Self::TopLeft),
            "topcenter" => Some(Self::TopCenter),
            "topright" => Some(Self::TopRight),
            "middleleft" => Some(Self::MiddleLeft),
            "middlecenter" => Some(Self::MiddleCenter),
            "middleright" => Some(Self::MiddleRight),
            "bottomleft" => Some(Self::BottomLeft),
            "bottomcenter" => Some(Self::BottomCenter),
            "bottomright" => Some(Self::BottomRight),
            "nowhere" | "none" => Some(Self::Nowhere),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DashStyle {
    #[default]
    Solid,
    Dash,
    Dot,
    DashDot,
    DashDotDot,
}

impl DashStyle {
    pub fn from_token(token: &str) -> Option<Self> {
        let normalized: String = token
            .chars()
            .filter(|ch| !matches!(ch, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "solid" => Some(Self::Solid),
            "dash" => Some(Self::Dash),
            "dot" => Some(Self::Dot),
            "dashdot" => Some(Self::DashDot),
            "dashdotdot" => Some(Self::DashDotDot),
            _ => None,
        }
    }
}

/// Optional per-vertex style overrides. `None` means "use the default".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VertexStyle {
    pub shape: Option<VertexShape>,
    pub radius: Option<f32>,
    pub color: Option<Color>,
    pub alpha: Option<u8>,
    pub image: Option<String>,
    pub primary_label: Option<String>,
    pub primary_label_fill_color: Option<Color>,
    pub secondary_label: Option<String>,
    pub label_position: Option<LabelPosition>,
    pub drawing_precedence: Option<DrawingPrecedence>,
}

/// Optional per-edge style overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeStyle {
    pub color: Option<Color>,
    pub alpha: Option<u8>,
    pub width: Option<f32>,
    pub dash_style: Option<DashStyle>,
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub id: VertexId,
    /// Assigned by layout; may be corrected in place when drawn.
    pub position: Point,
    pub style: VertexStyle,
    pub visibility: Visibility,
    pub selected: bool,
}

impl Vertex {
    pub fn new(id: VertexId, position: Point) -> Self {
        Self {
            id,
            position,
            style: VertexStyle::default(),
            visibility: Visibility::Visible,
            selected: false,
        }
    }

    pub fn with_style(mut self, style: VertexStyle) -> Self {
        self.style = style;
        self
    }

    /// Returns `true` when the value changed and the vertex needs a redraw.
    pub fn set_selected(&mut self, selected: bool) -> bool {
        replace_if_changed(&mut self.selected, selected)
    }

    pub fn set_visibility(&mut self, visibility: Visibility) -> bool {
        replace_if_changed(&mut self.visibility, visibility)
    }

    pub fn set_style(&mut self, style: VertexStyle) -> bool {
        replace_if_changed(&mut self.style, style)
    }

    pub fn set_position(&mut self, position: Point) -> bool {
        replace_if_changed(&mut self.position, position)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: EdgeId,
    pub from: VertexId,
    pub to: VertexId,
    pub directed: bool,
    pub style: EdgeStyle,
    pub visibility: Visibility,
    pub selected: bool,
}

impl Edge {
    pub fn new(id: EdgeId, from: VertexId, to: VertexId, directed: bool) -> Self {
        Self {
            id,
            from,
            to,
            directed,
            style: EdgeStyle::default(),
            visibility: Visibility::Visible,
            selected: false,
        }
    }

    pub fn with_style(mut self, style: EdgeStyle) -> Self {
        self.style = style;
        self
    }

    pub fn is_self_loop(&self) -> bool {
        self.from == self.to
    }

    pub fn set_selected(&mut self, selected: bool) -> bool {
        replace_if_changed(&mut self.selected, selected)
    }

    pub fn set_visibility(&mut self, visibility: Visibility) -> bool {
        replace_if_changed(&mut self.visibility, visibility)
    }

    pub fn set_style(&mut self, style: EdgeStyle) -> bool {
        replace_if_changed(&mut self.style, style)
    }
}

fn replace_if_changed<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

#[derive(Debug, Clone, Default)]
pub struct Graph {
    pub vertices: BTreeMap<VertexId, Vertex>,
    pub edges: BTreeMap<EdgeId, Edge>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a vertex.
    pub fn add_vertex(&mut self, vertex: Vertex) -> Option<Vertex> {
        self.vertices.insert(vertex.id, vertex)
    }

    pub fn add_edge(&mut self, edge: Edge) -> Option<Edge> {
        self.edges.insert(edge.id, edge)
    }

    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(&id)
    }

    pub fn vertex_mut(&mut self, id: VertexId) -> Option<&mut Vertex> {
        self.vertices.get_mut(&id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> Option<&mut Edge> {
        self.edges.get_mut(&id)
    }

    /// Edges touching `vertex`, self-loops included once.
    pub fn incident_edges(&self, vertex: VertexId) -> impl Iterator<Item = &Edge> + '_ {
        self.edges
            .values()
            .filter(move |edge| edge.from == vertex || edge.to == vertex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setters_report_changes() {
        let mut v = Vertex::new(VertexId(1), Point::new(0.0, 0.0));
        assert!(v.set_selected(true));
        assert!(!v.set_selected(true));
        assert!(v.set_visibility(Visibility::Hidden));
        assert!(!v.set_style(VertexStyle::default()));
    }

    #[test]
    fn enum_tokens_are_lenient_about_case_and_separators() {
        assert_eq!(VertexShape::from_token("Solid-Square"), Some(VertexShape::SolidSquare));
        assert_eq!(DashStyle::from_token("dash_dot_dot"), Some(DashStyle::DashDotDot));
        assert_eq!(LabelPosition::from_token("Bottom Center"), Some(LabelPosition::BottomCenter));
        assert_eq!(DashStyle::from_token("wavy"), None);
    }

    #[test]
    fn precedence_orders_shape_image_label() {
        assert!(DrawingPrecedence::Shape < DrawingPrecedence::Image);
        assert!(DrawingPrecedence::Image < DrawingPrecedence::PrimaryLabel);
        assert_eq!(DrawingPrecedence::default(), DrawingPrecedence::PrimaryLabel);
    }

    #[test]
    fn incident_edges_include_self_loops() {
        let mut graph = Graph::new();
        graph.add_vertex(Vertex::new(VertexId(1), Point::new(0.0, 0.0)));
        graph.add_vertex(Vertex::new(VertexId(2), Point::new(10.0, 0.0)));
        graph.add_edge(Edge::new(EdgeId(1), VertexId(1), VertexId(2), false));
        graph.add_edge(Edge::new(EdgeId(2), VertexId(1), VertexId(1), true));
        graph.add_edge(Edge::new(EdgeId(3), VertexId(2), VertexId(2), true));
        let ids: Vec<EdgeId> = graph.incident_edges(VertexId(1)).map(|e| e.id).collect();
        assert_eq!(ids, vec![EdgeId(1), EdgeId(2)]);
    }
}
