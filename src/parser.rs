use crate::color::Color;
use crate::error::{ElementRef, RenderError, Result};
use crate::geometry::Point;
use crate::ir::{
    DashStyle, DrawingPrecedence, Edge, EdgeId, EdgeStyle, Graph, LabelPosition, Vertex, VertexId,
    VertexShape, VertexStyle, Visibility,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

#[derive(Debug, Deserialize)]
struct GraphDocument {
    #[serde(default)]
    vertices: Vec<VertexEntry>,
    #[serde(default)]
    edges: Vec<EdgeEntry>,
}

#[derive(Debug, Deserialize)]
struct VertexEntry {
    id: u32,
    x: f32,
    y: f32,
    #[serde(default)]
    metadata: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct EdgeEntry {
    id: u32,
    from: u32,
    to: u32,
    #[serde(default)]
    directed: bool,
    #[serde(default)]
    metadata: Map<String, Value>,
}

/// A parsed document. Elements whose metadata could not be converted are left
/// out of `graph` and reported in `errors`; edges touching a left-out vertex
/// are dropped with it.
#[derive(Debug)]
pub struct ParsedGraph {
    pub graph: Graph,
    pub errors: Vec<RenderError>,
}

impl ParsedGraph {
    pub fn first_error(&self) -> Option<&RenderError> {
        self.errors.first()
    }

    /// The graph, or the first metadata error if any element was left out.
    pub fn into_result(mut self) -> Result<Graph> {
        if self.errors.is_empty() {
            Ok(self.graph)
        } else {
            Err(self.errors.swap_remove(0))
        }
    }
}

/// Structural problems (syntax, duplicate ids, dangling edge endpoints) fail
/// the whole document with [`RenderError::Parse`]. Metadata values of the
/// wrong type or outside their domain are [`RenderError::Format`] and only
/// cost the element that carries them.
pub fn parse_graph(input: &str) -> Result<ParsedGraph> {
    let document: GraphDocument = match serde_json::from_str(input) {
        Ok(document) => document,
        Err(json_err) => json5::from_str(input).map_err(|json5_err| {
            RenderError::Parse(format!("{json_err} (as JSON5: {json5_err})"))
        })?,
    };

    let mut graph = Graph::new();
    let mut errors = Vec::new();
    let mut vertex_ids = BTreeSet::new();
    let mut skipped = BTreeSet::new();
    for entry in document.vertices {
        let id = VertexId(entry.id);
        if !entry.x.is_finite() || !entry.y.is_finite() {
            return Err(RenderError::Parse(format!("vertex {id} has a non-finite position")));
        }
        if !vertex_ids.insert(id) {
            return Err(RenderError::Parse(format!("duplicate vertex id {id}")));
        }
        let mut vertex = Vertex::new(id, Point::new(entry.x, entry.y));
        if let Err(err) = apply_vertex_metadata(&mut vertex, &entry.metadata) {
            tracing::warn!(error = %err, "leaving vertex out of the graph");
            errors.push(err);
            skipped.insert(id);
            continue;
        }
        graph.add_vertex(vertex);
    }

    let mut edge_ids = BTreeSet::new();
    for entry in document.edges {
        let id = EdgeId(entry.id);
        if !edge_ids.insert(id) {
            return Err(RenderError::Parse(format!("duplicate edge id {id}")));
        }
        let (from, to) = (VertexId(entry.from), VertexId(entry.to));
        let mut dropped = false;
        for endpoint in [from, to] {
            if skipped.contains(&endpoint) {
                dropped = true;
            } else if graph.vertex(endpoint).is_none() {
                return Err(RenderError::Parse(format!(
                    "edge {id} references unknown vertex {endpoint}"
                )));
            }
        }
        if dropped {
            tracing::debug!(edge = %id, "endpoint was left out, dropping edge");
            continue;
        }
        let mut edge = Edge::new(id, from, to, entry.directed);
        if let Err(err) = apply_edge_metadata(&mut edge, &entry.metadata) {
            tracing::warn!(error = %err, "leaving edge out of the graph");
            errors.push(err);
            continue;
        }
        graph.add_edge(edge);
    }
    Ok(ParsedGraph { graph, errors })
}

pub fn apply_vertex_metadata(vertex: &mut Vertex, metadata: &Map<String, Value>) -> Result<()> {
    let reader = MetadataReader {
        element: ElementRef::Vertex(vertex.id),
        metadata,
    };
    let mut style = VertexStyle::default();
    if let Some(visibility) = reader.token("visibility", Visibility::from_token)? {
        vertex.visibility = visibility;
    }
    if let Some(selected) = reader.boolean("isSelected")? {
        vertex.selected = selected;
    }
    style.color = reader.color("color")?;
    style.alpha = reader.alpha("alpha")?;
    style.shape = reader.token("shape", VertexShape::from_token)?;
    style.radius = reader.number("radius")?;
    style.image = reader.text("image")?;
    style.primary_label = reader.text("primaryLabel")?;
    style.primary_label_fill_color = reader.color("primaryLabelFillColor")?;
    style.secondary_label = reader.text("secondaryLabel")?;
    style.label_position = reader.token("labelPosition", LabelPosition::from_token)?;
    style.drawing_precedence = reader.token("drawingPrecedence", DrawingPrecedence::from_token)?;
    reader.log_unknown(VERTEX_KEYS);
    vertex.style = style;
    Ok(())
}

pub fn apply_edge_metadata(edge: &mut Edge, metadata: &Map<String, Value>) -> Result<()> {
    let reader = MetadataReader {
        element: ElementRef::Edge(edge.id),
        metadata,
    };
    let mut style = EdgeStyle::default();
    if let Some(visibility) = reader.token("visibility", Visibility::from_token)? {
        edge.visibility = visibility;
    }
    if let Some(selected) = reader.boolean("isSelected")? {
        edge.selected = selected;
    }
    style.color = reader.color("color")?;
    style.alpha = reader.alpha("alpha")?;
    style.width = reader.number("width")?;
    style.dash_style = reader.token("dashStyle", DashStyle::from_token)?;
    style.label = reader.text("label")?;
    reader.log_unknown(EDGE_KEYS);
    edge.style = style;
    Ok(())
}

const VERTEX_KEYS: &[&str] = &[
    "visibility",
    "isSelected",
    "color",
    "alpha",
    "shape",
    "radius",
    "image",
    "primaryLabel",
    "primaryLabelFillColor",
    "secondaryLabel",
    "labelPosition",
    "drawingPrecedence",
];

const EDGE_KEYS: &[&str] = &[
    "visibility",
    "isSelected",
    "color",
    "alpha",
    "width",
    "dashStyle",
    "label",
];

struct MetadataReader<'a> {
    element: ElementRef,
    metadata: &'a Map<String, Value>,
}

impl MetadataReader<'_> {
    fn get(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key).filter(|value| !value.is_null())
    }

    fn invalid(&self, key: &str, expected: &str, value: &Value) -> RenderError {
        RenderError::format(self.element, format!("`{key}` must be {expected}, got {value}"))
    }

    fn text(&self, key: &str) -> Result<Option<String>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(other) => Err(self.invalid(key, "a string", other)),
        }
    }

    fn boolean(&self, key: &str) -> Result<Option<bool>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(Value::String(s)) if s.eq_ignore_ascii_case("true") => Ok(Some(true)),
            Some(Value::String(s)) if s.eq_ignore_ascii_case("false") => Ok(Some(false)),
            Some(other) => Err(self.invalid(key, "a boolean", other)),
        }
    }

    fn number(&self, key: &str) -> Result<Option<f32>> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Number(n)) => n
                .as_f64()
                .map(|v| Some(v as f32))
                .ok_or_else(|| self.invalid(key, "a number", &Value::Number(n.clone()))),
            Some(Value::String(s)) => s
                .trim()
                .parse::<f32>()
                .map(Some)
                .map_err(|_| self.invalid(key, "a number", &Value::String(s.clone()))),
            Some(other) => Err(self.invalid(key, "a number", other)),
        }
    }

    fn alpha(&self, key: &str) -> Result<Option<u8>> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        // JSON5 reports every number as a float.
        match value.as_f64() {
            Some(alpha) if alpha.fract() == 0.0 && (0.0..=255.0).contains(&alpha) => {
                Ok(Some(alpha as u8))
            }
            _ => Err(self.invalid(key, "an integer in [0, 255]", value)),
        }
    }

    fn color(&self, key: &str) -> Result<Option<Color>> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        value
            .as_str()
            .and_then(Color::parse)
            .map(Some)
            .ok_or_else(|| self.invalid(key, "a color", value))
    }

    fn token<T>(&self, key: &str, parse: impl Fn(&str) -> Option<T>) -> Result<Option<T>> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        value
            .as_str()
            .and_then(parse)
            .map(Some)
            .ok_or_else(|| self.invalid(key, "a known value", value))
    }

    fn log_unknown(&self, known: &[&str]) {
        for key in self.metadata.keys() {
            if !known.contains(&key.as_str()) {
                tracing::debug!(element = %self.element, key, "ignoring unknown metadata key");
            }
        }
    }
}
