use std::collections::BTreeMap;

use crate::canvas::Canvas;
use crate::edge::EdgeRecord;
use crate::error::Result;
use crate::ir::{EdgeId, VertexId};
use crate::style::StyleResolver;
use crate::vertex::VertexRecord;

/// id → record maps for the last drawn scene.
///
/// A record for an id exists exactly when that element was drawn (visible or
/// filtered) by the most recent draw or redraw touching it.
#[derive(Debug, Default)]
pub struct RenderCache {
    vertices: BTreeMap<VertexId, VertexRecord>,
    edges: BTreeMap<EdgeId, EdgeRecord>,
}

impl RenderCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex(&self, id: VertexId) -> Option<&VertexRecord> {
        self.vertices.get(&id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&EdgeRecord> {
        self.edges.get(&id)
    }

    pub fn vertices(&self) -> impl Iterator<Item = &VertexRecord> + '_ {
        self.vertices.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &EdgeRecord> + '_ {
        self.edges.values()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.edges.is_empty()
    }

    // Mutation is crate-private: only the orchestrator writes records.

    pub(crate) fn insert_vertex(&mut self, record: VertexRecord) -> Option<VertexRecord> {
        self.vertices.insert(record.id(), record)
    }

    pub(crate) fn insert_edge(&mut self, record: EdgeRecord) -> Option<EdgeRecord> {
        self.edges.insert(record.id(), record)
    }

    pub(crate) fn remove_vertex(&mut self, id: VertexId) -> Option<VertexRecord> {
        self.vertices.remove(&id)
    }

    pub(crate) fn remove_edge(&mut self, id: EdgeId) -> Option<EdgeRecord> {
        self.edges.remove(&id)
    }

    pub(crate) fn clear(&mut self) {
        self.vertices.clear();
        self.edges.clear();
    }
}

/// Everything a renderer may read while drawing one element.
#[derive(Debug, Clone, Copy)]
pub struct DrawPass<'a> {
    pub canvas: &'a Canvas,
    pub style: &'a StyleResolver,
    pub cache: &'a RenderCache,
}

/// Common interface of the vertex and edge renderers. `Ok(None)` means the
/// element is not drawn (hidden, or an endpoint is missing).
pub trait TryDraw<E> {
    type Record;

    fn try_draw(&self, element: E, pass: &DrawPass<'_>) -> Result<Option<Self::Record>>;
}
