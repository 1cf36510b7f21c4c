use std::fmt;

use crate::ir::{EdgeId, VertexId};

/// The graph element an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementRef {
    Vertex(VertexId),
    Edge(EdgeId),
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementRef::Vertex(id) => write!(f, "vertex {}", id),
            ElementRef::Edge(id) => write!(f, "edge {}", id),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// A per-element override lies outside its valid domain.
    #[error("{element}: {message}")]
    Format { element: ElementRef, message: String },
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    #[error("invalid argument: {0}")]
    Argument(String),
    #[error("graph document error: {0}")]
    Parse(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RenderError {
    pub(crate) fn format(element: ElementRef, message: impl Into<String>) -> Self {
        RenderError::Format {
            element,
            message: message.into(),
        }
    }

    /// The element a FormatError names, if this is one.
    pub fn element(&self) -> Option<ElementRef> {
        match self {
            RenderError::Format { element, .. } => Some(*element),
            _ => None,
        }
    }

    pub fn is_format(&self) -> bool {
        matches!(self, RenderError::Format { .. })
    }
}

pub type Result<T, E = RenderError> = std::result::Result<T, E>;
