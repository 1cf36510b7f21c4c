use crate::edge::{EdgeGeometry, EdgeRecord};
use crate::geometry::Rect;
use crate::ir::{EdgeId, VertexId};
use crate::scene::GraphRenderer;
use crate::vertex::{VertexBoundary, VertexRecord};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneDump {
    pub canvas: Option<Rect>,
    pub margin: Option<f32>,
    pub vertices: Vec<VertexDump>,
    pub edges: Vec<EdgeDump>,
    pub layers: Vec<LayerDump>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VertexDump {
    pub id: VertexId,
    pub boundary: String,
    pub x: f32,
    pub y: f32,
    pub bounds: Rect,
    pub secondary_label: Option<Rect>,
    pub selected: bool,
    pub drawable: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDump {
    pub id: EdgeId,
    pub selected: bool,
    pub drawable: u64,
    pub geometry: EdgeGeometry,
}

#[derive(Debug, Serialize)]
pub struct LayerDump {
    pub name: &'static str,
    pub drawables: Vec<u64>,
}

impl SceneDump {
    pub fn from_scene(scene: &GraphRenderer) -> Self {
        let vertices = scene.cache().vertices().map(vertex_dump).collect();
        let edges = scene.cache().edges().map(edge_dump).collect();
        let layers = scene
            .layers()
            .map(|(layer, group)| LayerDump {
                name: layer.name(),
                drawables: group.iter().map(|drawable| drawable.id().get()).collect(),
            })
            .collect();

        SceneDump {
            canvas: scene.canvas().map(|canvas| canvas.rect()),
            margin: scene.canvas().map(|canvas| canvas.margin()),
            vertices,
            edges,
            layers,
        }
    }
}

fn vertex_dump(record: &VertexRecord) -> VertexDump {
    let boundary = match record.boundary() {
        VertexBoundary::Circle { .. } => "circle",
        VertexBoundary::Square { .. } => "square",
        VertexBoundary::Diamond { .. } => "diamond",
        VertexBoundary::Triangle { .. } => "triangle",
        VertexBoundary::Box(_) => "box",
    };
    let center = record.center();
    VertexDump {
        id: record.id(),
        boundary: boundary.to_string(),
        x: center.x,
        y: center.y,
        bounds: record.bounds(),
        secondary_label: record.secondary_label_bounds(),
        selected: record.drawn_selected(),
        drawable: record.drawable().id().get(),
    }
}

fn edge_dump(record: &EdgeRecord) -> EdgeDump {
    EdgeDump {
        id: record.id(),
        selected: record.drawn_selected(),
        drawable: record.drawable().id().get(),
        geometry: record.geometry().clone(),
    }
}

pub fn write_scene_dump(path: &Path, scene: &GraphRenderer) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    let dump = SceneDump::from_scene(scene);
    serde_json::to_writer_pretty(writer, &dump)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use crate::color::Color;
    use crate::geometry::Point;
    use crate::ir::{Edge, Graph, Vertex};

    #[test]
    fn dump_lists_records_and_layers() {
        let mut graph = Graph::new();
        graph.add_vertex(Vertex::new(VertexId(1), Point::new(10.0, 10.0)));
        graph.add_vertex(Vertex::new(VertexId(2), Point::new(60.0, 10.0)));
        graph.add_edge(Edge::new(EdgeId(5), VertexId(1), VertexId(2), true));
        let canvas = Canvas::new(Rect::new(0.0, 0.0, 100.0, 100.0), 2.0, Color::WHITE).unwrap();
        let mut scene = GraphRenderer::default();
        scene.draw_graph(&mut graph, &canvas).unwrap();

        let dump = SceneDump::from_scene(&scene);
        assert_eq!(dump.vertices.len(), 2);
        assert_eq!(dump.edges[0].id, EdgeId(5));
        assert_eq!(dump.layers.len(), 5);
        assert_eq!(dump.layers[2].name, "vertices");

        let json = serde_json::to_value(&dump).unwrap();
        assert_eq!(json["edges"][0]["geometry"]["kind"], "line");
        assert_eq!(json["vertices"][0]["boundary"], "circle");
    }
}
