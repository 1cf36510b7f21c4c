pub mod cache;
pub mod canvas;
#[cfg(feature = "cli")]
pub mod cli;
pub mod color;
pub mod config;
pub mod edge;
pub mod error;
pub mod geometry;
pub mod ir;
pub mod parser;
pub mod render;
pub mod scene;
pub mod scene_dump;
pub mod style;
pub mod surface;
pub mod text_metrics;
pub mod theme;
pub mod vertex;

pub use canvas::Canvas;
#[cfg(feature = "cli")]
pub use cli::run;
pub use error::{RenderError, Result};
pub use ir::{Edge, EdgeId, Graph, Vertex, VertexId};
pub use scene::GraphRenderer;
