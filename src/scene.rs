use std::collections::BTreeSet;
use std::rc::Rc;

use crate::cache::{DrawPass, RenderCache, TryDraw};
use crate::canvas::Canvas;
use crate::config::{Config, StyleConfig};
use crate::edge::EdgeRenderer;
use crate::error::{RenderError, Result};
use crate::geometry::{Point, Rect};
use crate::ir::{Edge, EdgeId, Graph, Vertex, VertexId};
use crate::style::StyleResolver;
use crate::surface::{Drawable, DrawingContext, ElementTag, Fill, Group};
use crate::theme::Theme;
use crate::vertex::VertexRenderer;

/// Compositing layers, bottom to top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    Background,
    UnselectedEdges,
    Vertices,
    SelectedEdges,
    Overlays,
}

impl Layer {
    pub const ORDER: [Layer; 5] = [
        Layer::Background,
        Layer::UnselectedEdges,
        Layer::Vertices,
        Layer::SelectedEdges,
        Layer::Overlays,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Layer::Background => "background",
            Layer::UnselectedEdges => "edges",
            Layer::Vertices => "vertices",
            Layer::SelectedEdges => "selected-edges",
            Layer::Overlays => "overlays",
        }
    }
}

/// Owns the drawn scene of one graph.
///
/// The cache is written only here; renderers see it through a shared
/// [`DrawPass`]. Overlays survive full redraws.
#[derive(Debug)]
pub struct GraphRenderer {
    style: StyleResolver,
    cache: RenderCache,
    background: Group,
    unselected_edges: Group,
    vertices: Group,
    selected_edges: Group,
    overlays: Group,
    vertex_renderer: VertexRenderer,
    edge_renderer: EdgeRenderer,
    canvas: Option<Canvas>,
    needs_redraw: bool,
}

impl Default for GraphRenderer {
    fn default() -> Self {
        Self::new(StyleResolver::default())
    }
}

impl GraphRenderer {
    pub fn new(style: StyleResolver) -> Self {
        Self {
            style,
            cache: RenderCache::new(),
            background: Group::new(),
            unselected_edges: Group::new(),
            vertices: Group::new(),
            selected_edges: Group::new(),
            overlays: Group::new(),
            vertex_renderer: VertexRenderer::new(),
            edge_renderer: EdgeRenderer::new(),
            canvas: None,
            needs_redraw: true,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(StyleResolver::from_config(config))
    }

    pub fn style(&self) -> &StyleResolver {
        &self.style
    }

    pub fn cache(&self) -> &RenderCache {
        &self.cache
    }

    /// Canvas of the most recent full draw.
    pub fn canvas(&self) -> Option<&Canvas> {
        self.canvas.as_ref()
    }

    /// Whether a style change since the last full draw invalidated the scene.
    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    /// Returns `true` when the theme changed and a full redraw is required.
    pub fn set_theme(&mut self, theme: Theme) -> bool {
        if self.style.theme == theme {
            return false;
        }
        self.style.theme = theme;
        self.needs_redraw = true;
        true
    }

    /// Returns `true` when the style changed and a full redraw is required.
    pub fn set_style(&mut self, style: StyleConfig) -> bool {
        if self.style.style == style {
            return false;
        }
        self.style.style = style;
        self.needs_redraw = true;
        true
    }

    pub fn group(&self, layer: Layer) -> &Group {
        match layer {
            Layer::Background => &self.background,
            Layer::UnselectedEdges => &self.unselected_edges,
            Layer::Vertices => &self.vertices,
            Layer::SelectedEdges => &self.selected_edges,
            Layer::Overlays => &self.overlays,
        }
    }

    /// Layers in compositing order.
    pub fn layers(&self) -> impl Iterator<Item = (Layer, &Group)> + '_ {
        Layer::ORDER.into_iter().map(|layer| (layer, self.group(layer)))
    }

    /// Every drawable in paint order.
    pub fn drawables(&self) -> impl Iterator<Item = &Rc<Drawable>> + '_ {
        self.layers().flat_map(|(_, group)| group.iter())
    }

    /// Clears the scene and draws every vertex, then every edge.
    ///
    /// An element whose overrides are out of range is skipped and the pass
    /// continues; the first such error is returned once the scene is complete.
    pub fn draw_graph(&mut self, graph: &mut Graph, canvas: &Canvas) -> Result<()> {
        self.cache.clear();
        self.background.clear();
        self.unselected_edges.clear();
        self.vertices.clear();
        self.selected_edges.clear();
        self.canvas = Some(canvas.clone());
        self.needs_redraw = false;

        let mut dc = DrawingContext::new();
        dc.draw_rect(canvas.rect(), Some(Fill::Solid(canvas.background())), None);
        self.background.add(Rc::new(dc.finish()));

        let mut first_error = None;
        let mut record_error = |err: RenderError| {
            tracing::warn!(error = %err, "skipping element");
            first_error.get_or_insert(err);
        };
        for vertex in graph.vertices.values_mut() {
            if let Err(err) = self.draw_vertex(vertex, canvas) {
                record_error(err);
            }
        }
        for edge in graph.edges.values() {
            if let Err(err) = self.draw_edge(edge, canvas) {
                record_error(err);
            }
        }

        tracing::info!(
            vertices = self.cache.vertex_count(),
            edges = self.cache.edge_count(),
            selected_edges = self.selected_edges.len(),
            "drew graph"
        );
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Replaces the record of one vertex. Incident edges keep their records;
    /// see [`GraphRenderer::redraw_vertex_with_edges`].
    pub fn redraw_vertex(&mut self, graph: &mut Graph, id: VertexId, canvas: &Canvas) -> Result<()> {
        self.forget_vertex(id);
        let vertex = graph.vertex_mut(id).ok_or_else(|| {
            RenderError::InvalidOperation(format!("vertex {id} is not part of the graph"))
        })?;
        self.draw_vertex(vertex, canvas)
    }

    /// Redraws a vertex and then every edge touching it, so moved vertices
    /// keep attached edges.
    pub fn redraw_vertex_with_edges(
        &mut self,
        graph: &mut Graph,
        id: VertexId,
        canvas: &Canvas,
    ) -> Result<()> {
        let mut result = self.redraw_vertex(graph, id, canvas);
        let incident: Vec<EdgeId> = graph.incident_edges(id).map(|edge| edge.id).collect();
        for edge_id in incident {
            let redrawn = self.redraw_edge(graph, edge_id, canvas);
            if result.is_ok() {
                result = redrawn;
            }
        }
        result
    }

    pub fn redraw_edge(&mut self, graph: &Graph, id: EdgeId, canvas: &Canvas) -> Result<()> {
        self.forget_edge(id);
        let edge = graph.edge(id).ok_or_else(|| {
            RenderError::InvalidOperation(format!("edge {id} is not part of the graph"))
        })?;
        self.draw_edge(edge, canvas)
    }

    /// Topmost drawn vertex containing `point`.
    pub fn try_get_vertex_from_point(&self, point: Point) -> Option<VertexId> {
        self.vertices
            .hit_point(point)
            .and_then(|drawable| vertex_tag(drawable))
    }

    /// Every drawn vertex whose outline intersects `rect`.
    pub fn get_vertices_from_rectangle(&self, rect: Rect) -> BTreeSet<VertexId> {
        self.vertices
            .hit_rect(&rect)
            .filter_map(|drawable| vertex_tag(drawable))
            .collect()
    }

    pub fn add_visual_on_top_of_graph(&mut self, overlay: Rc<Drawable>) -> Result<()> {
        if self.overlays.contains(overlay.id()) {
            return Err(RenderError::InvalidOperation(format!(
                "overlay {} is already on top of the graph",
                overlay.id().get()
            )));
        }
        self.overlays.add(overlay);
        Ok(())
    }

    /// Removing an overlay that is not present does nothing.
    pub fn remove_visual_from_top_of_graph(&mut self, overlay: &Drawable) {
        self.overlays.remove(overlay.id());
    }

    fn draw_vertex(&mut self, vertex: &mut Vertex, canvas: &Canvas) -> Result<()> {
        let pass = DrawPass {
            canvas,
            style: &self.style,
            cache: &self.cache,
        };
        if let Some(record) = self.vertex_renderer.try_draw(vertex, &pass)? {
            self.vertices.add(Rc::clone(record.drawable()));
            self.cache.insert_vertex(record);
        }
        Ok(())
    }

    fn draw_edge(&mut self, edge: &Edge, canvas: &Canvas) -> Result<()> {
        let pass = DrawPass {
            canvas,
            style: &self.style,
            cache: &self.cache,
        };
        if let Some(record) = self.edge_renderer.try_draw(edge, &pass)? {
            let group = if record.drawn_selected() {
                &mut self.selected_edges
            } else {
                &mut self.unselected_edges
            };
            group.add(Rc::clone(record.drawable()));
            self.cache.insert_edge(record);
        }
        Ok(())
    }

    fn forget_vertex(&mut self, id: VertexId) {
        if let Some(old) = self.cache.remove_vertex(id) {
            self.vertices.remove(old.drawable().id());
        }
    }

    fn forget_edge(&mut self, id: EdgeId) {
        if let Some(old) = self.cache.remove_edge(id) {
            let drawable = old.drawable().id();
            if !self.unselected_edges.remove(drawable) {
                self.selected_edges.remove(drawable);
            }
        }
    }
}

fn vertex_tag(drawable: &Drawable) -> Option<VertexId> {
    match drawable.tag() {
        Some(ElementTag::Vertex(id)) => Some(id),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::ir::{EdgeStyle, Visibility, VertexStyle};

    fn canvas() -> Canvas {
        Canvas::new(Rect::new(0.0, 0.0, 200.0, 200.0), 0.0, Color::WHITE).unwrap()
    }

    fn renderer() -> GraphRenderer {
        let mut config = Config::default();
        config.style.fast_text_metrics = true;
        GraphRenderer::from_config(&config)
    }

    fn sample() -> Graph {
        let mut graph = Graph::new();
        graph.add_vertex(Vertex::new(VertexId(1), Point::new(20.0, 20.0)));
        graph.add_vertex(Vertex::new(VertexId(2), Point::new(120.0, 20.0)));
        graph.add_vertex(Vertex::new(VertexId(3), Point::new(60.0, 150.0)));
        graph.add_edge(Edge::new(EdgeId(1), VertexId(1), VertexId(2), true));
        graph.add_edge(Edge::new(EdgeId(2), VertexId(2), VertexId(3), false));
        graph
    }

    #[test]
    fn full_draw_fills_cache_and_layers() {
        let mut r = renderer();
        let mut graph = sample();
        r.draw_graph(&mut graph, &canvas()).unwrap();
        assert_eq!(r.cache().vertex_count(), 3);
        assert_eq!(r.cache().edge_count(), 2);
        assert_eq!(r.group(Layer::Background).len(), 1);
        assert_eq!(r.group(Layer::Vertices).len(), 3);
        assert_eq!(r.group(Layer::UnselectedEdges).len(), 2);
        assert!(!r.needs_redraw());
    }

    #[test]
    fn selected_edge_goes_to_top_layer() {
        let mut r = renderer();
        let mut graph = sample();
        graph.edge_mut(EdgeId(2)).unwrap().selected = true;
        r.draw_graph(&mut graph, &canvas()).unwrap();
        let selected = r.cache().edge(EdgeId(2)).unwrap().drawable().id();
        assert!(r.group(Layer::SelectedEdges).contains(selected));
        let order: Vec<Layer> = r.layers().map(|(layer, _)| layer).collect();
        assert_eq!(order, Layer::ORDER.to_vec());
    }

    #[test]
    fn hidden_vertex_cascades_to_edges() {
        let mut r = renderer();
        let mut graph = sample();
        graph.vertex_mut(VertexId(2)).unwrap().visibility = Visibility::Hidden;
        r.draw_graph(&mut graph, &canvas()).unwrap();
        assert!(r.cache().vertex(VertexId(2)).is_none());
        assert_eq!(r.cache().edge_count(), 0);
        assert_eq!(r.try_get_vertex_from_point(Point::new(120.0, 20.0)), None);
    }

    #[test]
    fn format_error_skips_only_offender() {
        let mut r = renderer();
        let mut graph = sample();
        graph.vertex_mut(VertexId(3)).unwrap().style = VertexStyle {
            radius: Some(1000.0),
            ..Default::default()
        };
        graph.edge_mut(EdgeId(1)).unwrap().style = EdgeStyle {
            width: Some(20.0),
            ..Default::default()
        };
        let err = r.draw_graph(&mut graph, &canvas()).unwrap_err();
        assert!(err.to_string().contains("vertex 3"));
        assert!(r.cache().vertex(VertexId(1)).is_some());
        assert!(r.cache().vertex(VertexId(2)).is_some());
        assert!(r.cache().vertex(VertexId(3)).is_none());
        assert_eq!(r.cache().edge_count(), 0);
    }

    #[test]
    fn redraw_vertex_replaces_only_that_record() {
        let mut r = renderer();
        let mut graph = sample();
        let c = canvas();
        r.draw_graph(&mut graph, &c).unwrap();
        let before: Vec<_> = [1, 2, 3]
            .map(|id| r.cache().vertex(VertexId(id)).unwrap().drawable().id())
            .to_vec();
        graph.vertex_mut(VertexId(2)).unwrap().set_selected(true);
        r.redraw_vertex(&mut graph, VertexId(2), &c).unwrap();
        let after: Vec<_> = [1, 2, 3]
            .map(|id| r.cache().vertex(VertexId(id)).unwrap().drawable().id())
            .to_vec();
        assert_eq!(before[0], after[0]);
        assert_ne!(before[1], after[1]);
        assert_eq!(before[2], after[2]);
        assert_eq!(r.group(Layer::Vertices).len(), 3);
        assert!(!r.group(Layer::Vertices).contains(before[1]));
    }

    #[test]
    fn redraw_edge_moves_between_layers() {
        let mut r = renderer();
        let mut graph = sample();
        let c = canvas();
        r.draw_graph(&mut graph, &c).unwrap();
        graph.edge_mut(EdgeId(1)).unwrap().set_selected(true);
        r.redraw_edge(&graph, EdgeId(1), &c).unwrap();
        assert_eq!(r.group(Layer::UnselectedEdges).len(), 1);
        assert_eq!(r.group(Layer::SelectedEdges).len(), 1);
        assert_eq!(r.cache().edge_count(), 2);
    }

    #[test]
    fn redraw_of_unknown_id_is_invalid_operation() {
        let mut r = renderer();
        let mut graph = sample();
        let c = canvas();
        r.draw_graph(&mut graph, &c).unwrap();
        graph.vertices.remove(&VertexId(3));
        let err = r.redraw_vertex(&mut graph, VertexId(3), &c).unwrap_err();
        assert!(matches!(err, RenderError::InvalidOperation(_)));
        assert!(r.cache().vertex(VertexId(3)).is_none());
        assert!(matches!(
            r.redraw_edge(&graph, EdgeId(99), &c),
            Err(RenderError::InvalidOperation(_))
        ));
    }

    #[test]
    fn overlays_reject_duplicates() {
        let mut r = renderer();
        let overlay = Rc::new(DrawingContext::new().finish());
        r.add_visual_on_top_of_graph(Rc::clone(&overlay)).unwrap();
        assert!(matches!(
            r.add_visual_on_top_of_graph(Rc::clone(&overlay)),
            Err(RenderError::InvalidOperation(_))
        ));
        r.remove_visual_from_top_of_graph(&overlay);
        r.remove_visual_from_top_of_graph(&overlay);
        assert!(r.group(Layer::Overlays).is_empty());
    }

    #[test]
    fn hit_tests_before_any_draw_are_empty() {
        let r = renderer();
        assert_eq!(r.try_get_vertex_from_point(Point::new(0.0, 0.0)), None);
        assert!(r.get_vertices_from_rectangle(Rect::new(0.0, 0.0, 1e4, 1e4)).is_empty());
    }

    #[test]
    fn style_setters_report_dirty() {
        let mut r = renderer();
        let mut graph = sample();
        r.draw_graph(&mut graph, &canvas()).unwrap();
        let mut style = r.style().style.clone();
        assert!(!r.set_style(style.clone()));
        style.graph_scale = 2.0;
        assert!(r.set_style(style));
        assert!(r.needs_redraw());
        assert!(r.set_theme(Theme::modern()));
        assert!(!r.set_theme(Theme::modern()));
    }
}
