use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::color::Color;
use crate::geometry::{
    Point, Rect, circle_intersects_rect, point_in_polygon, polygon_intersects_rect,
};
use crate::ir::{EdgeId, VertexId};

static NEXT_DRAWABLE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DrawableId(u64);

impl DrawableId {
    fn next() -> Self {
        Self(NEXT_DRAWABLE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// Dash lengths are multiples of the stroke width.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DashPattern {
    #[default]
    Solid,
    Dashes(&'static [f32]),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
    pub dash: DashPattern,
}

impl Stroke {
    pub fn solid(color: Color, width: f32) -> Self {
        Self {
            color,
            width,
            dash: DashPattern::Solid,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fill {
    Solid(Color),
    /// Highlight at the center fading to `edge`.
    Radial { center: Color, edge: Color },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAnchor {
    Start,
    #[default]
    Middle,
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Line {
        from: Point,
        to: Point,
        stroke: Stroke,
    },
    Ellipse {
        center: Point,
        rx: f32,
        ry: f32,
        fill: Option<Fill>,
        stroke: Option<Stroke>,
    },
    Polygon {
        points: Vec<Point>,
        fill: Option<Fill>,
        stroke: Option<Stroke>,
    },
    Rect {
        rect: Rect,
        fill: Option<Fill>,
        stroke: Option<Stroke>,
    },
    /// `origin` is the baseline anchor point.
    Text {
        origin: Point,
        text: String,
        font_size: f32,
        color: Color,
        anchor: TextAnchor,
    },
    Image {
        rect: Rect,
        source: String,
        opacity: f32,
    },
    /// Children drawn in a frame rotated by `degrees` about `center`.
    Rotated {
        degrees: f32,
        center: Point,
        children: Vec<Primitive>,
    },
}

/// Exact outline used for point and rectangle hit-testing.
#[derive(Debug, Clone, PartialEq)]
pub enum HitShape {
    Circle { center: Point, radius: f32 },
    Polygon(Vec<Point>),
    Rect(Rect),
}

impl HitShape {
    pub fn contains(&self, p: Point) -> bool {
        match self {
            HitShape::Circle { center, radius } => center.distance(p) <= *radius,
            HitShape::Polygon(points) => point_in_polygon(p, points),
            HitShape::Rect(rect) => rect.contains(p),
        }
    }

    pub fn intersects(&self, rect: &Rect) -> bool {
        match self {
            HitShape::Circle { center, radius } => circle_intersects_rect(*center, *radius, rect),
            HitShape::Polygon(points) => polygon_intersects_rect(points, rect),
            HitShape::Rect(own) => own.intersects(rect),
        }
    }
}

/// Identity of the graph element a drawable was produced for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ElementTag {
    Vertex(VertexId),
    Edge(EdgeId),
}

/// A retained, immutable drawable object.
#[derive(Debug, PartialEq)]
pub struct Drawable {
    id: DrawableId,
    tag: Option<ElementTag>,
    primitives: Vec<Primitive>,
    hit: Option<HitShape>,
}

impl Drawable {
    pub fn new(primitives: Vec<Primitive>) -> Self {
        Self {
            id: DrawableId::next(),
            tag: None,
            primitives,
            hit: None,
        }
    }

    pub fn tagged(mut self, tag: ElementTag) -> Self {
        self.tag = Some(tag);
        self
    }

    pub fn with_hit_shape(mut self, hit: HitShape) -> Self {
        self.hit = Some(hit);
        self
    }

    pub fn id(&self) -> DrawableId {
        self.id
    }

    pub fn tag(&self) -> Option<ElementTag> {
        self.tag
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn hit_shape(&self) -> Option<&HitShape> {
        self.hit.as_ref()
    }
}

/// Accumulates primitives for one element before packaging them into a
/// [`Drawable`].
#[derive(Debug, Default)]
pub struct DrawingContext {
    primitives: Vec<Primitive>,
}

impl DrawingContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draw(&mut self, primitive: Primitive) {
        tracing::trace!(?primitive, "draw");
        self.primitives.push(primitive);
    }

    pub fn draw_line(&mut self, from: Point, to: Point, stroke: Stroke) {
        self.draw(Primitive::Line { from, to, stroke });
    }

    pub fn draw_ellipse(
        &mut self,
        center: Point,
        rx: f32,
        ry: f32,
        fill: Option<Fill>,
        stroke: Option<Stroke>,
    ) {
        self.draw(Primitive::Ellipse {
            center,
            rx,
            ry,
            fill,
            stroke,
        });
    }

    pub fn draw_polygon(&mut self, points: Vec<Point>, fill: Option<Fill>, stroke: Option<Stroke>) {
        self.draw(Primitive::Polygon {
            points,
            fill,
            stroke,
        });
    }

    pub fn draw_rect(&mut self, rect: Rect, fill: Option<Fill>, stroke: Option<Stroke>) {
        self.draw(Primitive::Rect { rect, fill, stroke });
    }

    pub fn draw_text(
        &mut self,
        origin: Point,
        text: impl Into<String>,
        font_size: f32,
        color: Color,
        anchor: TextAnchor,
    ) {
        self.draw(Primitive::Text {
            origin,
            text: text.into(),
            font_size,
            color,
            anchor,
        });
    }

    pub fn draw_image(&mut self, rect: Rect, source: impl Into<String>, opacity: f32) {
        self.draw(Primitive::Image {
            rect,
            source: source.into(),
            opacity,
        });
    }

    /// Draw `build`'s output in a frame rotated by `degrees` about `center`.
    /// The rotation is undone when `build` returns.
    pub fn with_rotation(
        &mut self,
        degrees: f32,
        center: Point,
        build: impl FnOnce(&mut DrawingContext),
    ) {
        let mut inner = DrawingContext::new();
        build(&mut inner);
        if inner.primitives.is_empty() {
            return;
        }
        self.draw(Primitive::Rotated {
            degrees,
            center,
            children: inner.primitives,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn finish(self) -> Drawable {
        Drawable::new(self.primitives)
    }
}

/// Ordered collection of shared drawables; later entries draw on top.
#[derive(Debug, Default)]
pub struct Group {
    children: Vec<Rc<Drawable>>,
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, drawable: Rc<Drawable>) {
        self.children.push(drawable);
    }

    /// Removes the drawable with `id`; returns whether it was present.
    pub fn remove(&mut self, id: DrawableId) -> bool {
        let before = self.children.len();
        self.children.retain(|child| child.id() != id);
        self.children.len() != before
    }

    pub fn contains(&self, id: DrawableId) -> bool {
        self.children.iter().any(|child| child.id() == id)
    }

    pub fn clear(&mut self) {
        self.children.clear();
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Rc<Drawable>> + '_ {
        self.children.iter()
    }

    /// Topmost drawable whose hit shape contains `p`.
    pub fn hit_point(&self, p: Point) -> Option<&Rc<Drawable>> {
        self.children
            .iter()
            .rev()
            .find(|child| child.hit_shape().is_some_and(|hit| hit.contains(p)))
    }

    pub fn hit_rect<'a>(&'a self, rect: &'a Rect) -> impl Iterator<Item = &'a Rc<Drawable>> + 'a {
        self.children
            .iter()
            .filter(move |child| child.hit_shape().is_some_and(|hit| hit.intersects(rect)))
    }
}
