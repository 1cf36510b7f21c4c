use std::f32::consts::SQRT_2;
use std::rc::Rc;

use crate::cache::{DrawPass, TryDraw};
use crate::canvas::Canvas;
use crate::color::Color;
use crate::error::Result;
use crate::geometry::{Point, Rect, RectSide, ray_ellipse_intersection, ray_polygon_intersection};
use crate::ir::{DrawingPrecedence, LabelPosition, Vertex, VertexId, VertexShape, Visibility};
use crate::style::StyleResolver;
use crate::surface::{
    Drawable, DrawingContext, ElementTag, Fill, HitShape, Stroke, TextAnchor,
};
use crate::text_metrics;

/// Circumradius of a triangle vertex relative to the resolved radius.
const TRIANGLE_RADIUS_FACTOR: f32 = 1.3;
const SQRT_3: f32 = 1.732_050_8;
const SPHERE_HIGHLIGHT: f32 = 0.6;
const OUTLINE_WIDTH: f32 = 1.0;
/// Baseline offset, as a fraction of the font size, that vertically centers a
/// single line of text on a point.
const TEXT_BASELINE_SHIFT: f32 = 0.35;

/// Outline of a drawn vertex.
#[derive(Debug, Clone, PartialEq)]
pub enum VertexBoundary {
    Circle { center: Point, radius: f32 },
    Square { center: Point, half: f32 },
    Diamond { center: Point, half_diagonal: f32 },
    Triangle { center: Point, points: [Point; 3] },
    /// Label boxes and images.
    Box(Rect),
}

impl VertexBoundary {
    fn for_shape(shape: VertexShape, center: Point, radius: f32) -> Self {
        match shape {
            VertexShape::Circle | VertexShape::Disk | VertexShape::Sphere => {
                VertexBoundary::Circle { center, radius }
            }
            VertexShape::Square | VertexShape::SolidSquare => VertexBoundary::Square {
                center,
                half: radius,
            },
            VertexShape::Diamond | VertexShape::SolidDiamond => VertexBoundary::Diamond {
                center,
                half_diagonal: radius * SQRT_2,
            },
            VertexShape::Triangle | VertexShape::SolidTriangle => {
                let r = radius * TRIANGLE_RADIUS_FACTOR;
                let half_base = r * SQRT_3 / 2.0;
                VertexBoundary::Triangle {
                    center,
                    points: [
                        Point::new(center.x, center.y - r),
                        Point::new(center.x + half_base, center.y + r / 2.0),
                        Point::new(center.x - half_base, center.y + r / 2.0),
                    ],
                }
            }
        }
    }

    /// Bounds of a shape of `radius` centered on `center`, without building it.
    /// Triangles and diamonds extend beyond the `radius` square.
    fn shape_bounds(shape: VertexShape, center: Point, radius: f32) -> Rect {
        match shape {
            VertexShape::Diamond | VertexShape::SolidDiamond => {
                let h = radius * SQRT_2;
                Rect::from_center(center, h, h)
            }
            VertexShape::Triangle | VertexShape::SolidTriangle => {
                let r = radius * TRIANGLE_RADIUS_FACTOR;
                let half_base = r * SQRT_3 / 2.0;
                Rect::new(center.x - half_base, center.y - r, half_base * 2.0, r * 1.5)
            }
            _ => Rect::from_center(center, radius, radius),
        }
    }

    pub fn center(&self) -> Point {
        match self {
            VertexBoundary::Circle { center, .. }
            | VertexBoundary::Square { center, .. }
            | VertexBoundary::Diamond { center, .. }
            | VertexBoundary::Triangle { center, .. } => *center,
            VertexBoundary::Box(rect) => rect.center(),
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            VertexBoundary::Circle { center, radius } => Rect::from_center(*center, *radius, *radius),
            VertexBoundary::Square { center, half } => Rect::from_center(*center, *half, *half),
            VertexBoundary::Diamond {
                center,
                half_diagonal,
            } => Rect::from_center(*center, *half_diagonal, *half_diagonal),
            VertexBoundary::Triangle { points, .. } => {
                Rect::bounding(points).unwrap_or_default()
            }
            VertexBoundary::Box(rect) => *rect,
        }
    }

    fn outline(&self) -> Option<Vec<Point>> {
        match self {
            VertexBoundary::Circle { .. } => None,
            VertexBoundary::Square { center, half } => {
                Some(Rect::from_center(*center, *half, *half).corners().to_vec())
            }
            VertexBoundary::Diamond {
                center,
                half_diagonal: h,
            } => Some(vec![
                Point::new(center.x, center.y - h),
                Point::new(center.x + h, center.y),
                Point::new(center.x, center.y + h),
                Point::new(center.x - h, center.y),
            ]),
            VertexBoundary::Triangle { points, .. } => Some(points.to_vec()),
            VertexBoundary::Box(rect) => Some(rect.corners().to_vec()),
        }
    }

    /// Where a ray from the center in `direction` leaves the outline.
    pub fn point_in_direction(&self, direction: Point) -> Point {
        let center = self.center();
        let Some(dir) = direction.normalized() else {
            return center;
        };
        if let VertexBoundary::Circle { radius, .. } = self {
            return ray_ellipse_intersection(center, dir, center, *radius, *radius)
                .unwrap_or(center + dir * *radius);
        }
        self.outline()
            .and_then(|poly| ray_polygon_intersection(center, dir, &poly))
            .unwrap_or(center)
    }

    /// Point on the outline along the line from the center toward `target`.
    pub fn point_toward(&self, target: Point) -> Point {
        self.point_in_direction(target - self.center())
    }

    pub fn hit_shape(&self) -> HitShape {
        match self {
            VertexBoundary::Circle { center, radius } => HitShape::Circle {
                center: *center,
                radius: *radius,
            },
            VertexBoundary::Box(rect) => HitShape::Rect(*rect),
            other => HitShape::Polygon(other.outline().unwrap_or_default()),
        }
    }
}

/// Cached result of drawing one vertex.
#[derive(Debug, Clone)]
pub struct VertexRecord {
    id: VertexId,
    drawable: Rc<Drawable>,
    selected: bool,
    boundary: VertexBoundary,
    label_bounds: Option<Rect>,
}

impl VertexRecord {
    pub fn id(&self) -> VertexId {
        self.id
    }

    pub fn drawable(&self) -> &Rc<Drawable> {
        &self.drawable
    }

    pub fn drawn_selected(&self) -> bool {
        self.selected
    }

    pub fn boundary(&self) -> &VertexBoundary {
        &self.boundary
    }

    pub fn center(&self) -> Point {
        self.boundary.center()
    }

    /// Bounds of the vertex representation, excluding its secondary label.
    pub fn bounds(&self) -> Rect {
        self.boundary.bounds()
    }

    pub fn secondary_label_bounds(&self) -> Option<Rect> {
        self.label_bounds
    }

    /// Where an edge to `other` should end on this vertex.
    pub fn edge_endpoint(&self, other: &VertexRecord) -> Point {
        self.boundary.point_toward(other.center())
    }

    /// Anchor of a self-loop drawn toward `side` of the drawable rectangle.
    pub fn self_loop_anchor(&self, side: RectSide) -> Point {
        self.boundary.point_in_direction(side.direction())
    }
}

enum Representation {
    LabelBox { text: String, size: (f32, f32) },
    Image { source: String, size: (f32, f32) },
    Shape { shape: VertexShape, radius: f32 },
}

impl Representation {
    fn bounds_at(&self, center: Point) -> Rect {
        match self {
            Representation::LabelBox { size, .. } | Representation::Image { size, .. } => {
                Rect::from_center(center, size.0 / 2.0, size.1 / 2.0)
            }
            Representation::Shape { shape, radius } => {
                VertexBoundary::shape_bounds(*shape, center, *radius)
            }
        }
    }

    fn boundary_at(&self, center: Point) -> VertexBoundary {
        match self {
            Representation::Shape { shape, radius } => {
                VertexBoundary::for_shape(*shape, center, *radius)
            }
            other => VertexBoundary::Box(other.bounds_at(center)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VertexRenderer;

impl VertexRenderer {
    pub fn new() -> Self {
        Self
    }

    fn choose_representation(&self, vertex: &Vertex, style: &StyleResolver) -> Result<Representation> {
        // Validated up front so a bad radius is reported whatever is drawn.
        let radius = style.radius(vertex)?;
        let precedence = style.drawing_precedence(vertex);
        let font_size = style.font_size();

        if precedence >= DrawingPrecedence::Image
            && let Some(label) = vertex.style.primary_label.as_deref()
        {
            let text = style.truncate_label(label);
            let width = text_metrics::text_width(
                &text,
                font_size,
                &style.theme.font_family,
                style.style.fast_text_metrics,
            );
            let height = text_metrics::line_height(font_size);
            let pad = style.style.label_padding * style.style.graph_scale;
            return Ok(Representation::LabelBox {
                text,
                size: (width + pad * 2.0, height + pad * 2.0),
            });
        }

        if precedence >= DrawingPrecedence::Image
            && let Some(source) = vertex.style.image.as_deref()
        {
            match image::image_dimensions(source) {
                Ok((w, h)) => {
                    return Ok(Representation::Image {
                        source: source.to_string(),
                        size: (w as f32, h as f32),
                    });
                }
                Err(err) => {
                    tracing::warn!(
                        vertex = %vertex.id,
                        source,
                        error = %err,
                        "image could not be read, drawing shape instead"
                    );
                }
            }
        }

        Ok(Representation::Shape {
            shape: style.shape(vertex),
            radius,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_label_box(
        &self,
        dc: &mut DrawingContext,
        vertex: &Vertex,
        text: &str,
        rect: Rect,
        color: Color,
        selected: bool,
        style: &StyleResolver,
    ) {
        let fill = vertex
            .style
            .primary_label_fill_color
            .unwrap_or(style.theme.label_fill_color)
            .with_alpha(color.a);
        let stroke = Stroke::solid(color, OUTLINE_WIDTH * style.style.graph_scale);
        dc.draw_rect(rect, Some(Fill::Solid(fill)), Some(stroke));
        let font_size = style.font_size();
        let center = rect.center();
        dc.draw_text(
            Point::new(center.x, center.y + font_size * TEXT_BASELINE_SHIFT),
            text,
            font_size,
            style.label_text_color(color, selected),
            TextAnchor::Middle,
        );
    }

    fn draw_image(
        &self,
        dc: &mut DrawingContext,
        source: &str,
        rect: Rect,
        color: Color,
        canvas: &Canvas,
        style: &StyleResolver,
    ) {
        dc.draw_image(rect, source, 1.0);
        if color.is_opaque() {
            dc.draw_rect(
                rect,
                None,
                Some(Stroke::solid(color, OUTLINE_WIDTH * style.style.graph_scale)),
            );
        } else {
            // Blend the image toward the background by the missing opacity.
            let veil = canvas.background().with_alpha(255 - color.a);
            dc.draw_rect(rect, Some(Fill::Solid(veil)), None);
        }
    }

    fn draw_shape(
        &self,
        dc: &mut DrawingContext,
        shape: VertexShape,
        boundary: &VertexBoundary,
        color: Color,
        style: &StyleResolver,
    ) {
        let fill = if shape == VertexShape::Sphere {
            Some(Fill::Radial {
                center: lighten(color, SPHERE_HIGHLIGHT),
                edge: color,
            })
        } else if shape.is_filled() {
            Some(Fill::Solid(color))
        } else {
            None
        };
        let stroke = if shape.is_filled() {
            None
        } else {
            Some(Stroke::solid(color, OUTLINE_WIDTH * style.style.graph_scale))
        };
        match boundary {
            VertexBoundary::Circle { center, radius } => {
                dc.draw_ellipse(*center, *radius, *radius, fill, stroke)
            }
            VertexBoundary::Square { center, half } => {
                dc.draw_rect(Rect::from_center(*center, *half, *half), fill, stroke)
            }
            other => {
                let points = other.outline().unwrap_or_default();
                dc.draw_polygon(points, fill, stroke)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_secondary_label(
        &self,
        dc: &mut DrawingContext,
        vertex: &Vertex,
        bounds: Rect,
        color: Color,
        selected: bool,
        canvas: &Canvas,
        style: &StyleResolver,
    ) -> Option<Rect> {
        let raw = vertex.style.secondary_label.as_deref()?;
        let position = style.label_position(vertex);
        if position == LabelPosition::Nowhere || raw.is_empty() {
            return None;
        }
        let text = style.truncate_label(raw);
        let font_size = style.font_size();
        let width = text_metrics::text_width(
            &text,
            font_size,
            &style.theme.font_family,
            style.style.fast_text_metrics,
        );
        let height = text_metrics::line_height(font_size);
        let offset = style.style.secondary_label_offset * style.style.graph_scale;
        let rect = keep_top_right_inside(
            place_secondary_label(bounds, (width, height), position, offset),
            canvas.rect(),
        );
        dc.draw_text(
            Point::new(rect.x, rect.y + height / 2.0 + font_size * TEXT_BASELINE_SHIFT),
            text,
            font_size,
            style.label_text_color(color, selected),
            TextAnchor::Start,
        );
        Some(rect)
    }
}

impl<'v> TryDraw<&'v mut Vertex> for VertexRenderer {
    type Record = VertexRecord;

    fn try_draw(&self, vertex: &'v mut Vertex, pass: &DrawPass<'_>) -> Result<Option<VertexRecord>> {
        let style = pass.style;
        let visibility = style.visibility(vertex);
        if visibility == Visibility::Hidden {
            return Ok(None);
        }
        let selected = style.draw_as_selected(vertex);
        let representation = self.choose_representation(vertex, style)?;

        let bounds = representation.bounds_at(vertex.position);
        let (dx, dy) = clamp_offset(bounds, pass.canvas.usable_rect());
        if dx != 0.0 || dy != 0.0 {
            tracing::debug!(vertex = %vertex.id, dx, dy, "moving vertex inside drawable area");
            vertex.position = vertex.position.offset(dx, dy);
        }
        let boundary = representation.boundary_at(vertex.position);
        let color = style.vertex_color(vertex, visibility, selected);

        let mut dc = DrawingContext::new();
        match &representation {
            Representation::LabelBox { text, .. } => {
                self.draw_label_box(&mut dc, vertex, text, boundary.bounds(), color, selected, style)
            }
            Representation::Image { source, .. } => {
                self.draw_image(&mut dc, source, boundary.bounds(), color, pass.canvas, style)
            }
            Representation::Shape { shape, .. } => {
                self.draw_shape(&mut dc, *shape, &boundary, color, style)
            }
        }
        let label_bounds = self.draw_secondary_label(
            &mut dc,
            vertex,
            boundary.bounds(),
            color,
            selected,
            pass.canvas,
            style,
        );

        let drawable = dc
            .finish()
            .tagged(ElementTag::Vertex(vertex.id))
            .with_hit_shape(boundary.hit_shape());
        Ok(Some(VertexRecord {
            id: vertex.id,
            drawable: Rc::new(drawable),
            selected,
            boundary,
            label_bounds,
        }))
    }
}

/// Translation that moves `bounds` inside `area`. When `bounds` is larger than
/// `area` it is aligned with the left/top edge.
fn clamp_offset(bounds: Rect, area: Rect) -> (f32, f32) {
    // Rounding slack so an already clamped vertex is not nudged again.
    const SLACK: f32 = 1e-3;
    fn axis(lo: f32, hi: f32, min: f32, max: f32) -> f32 {
        if lo < min - SLACK {
            min - lo
        } else if hi > max + SLACK {
            (max - hi).max(min - lo)
        } else {
            0.0
        }
    }
    (
        axis(bounds.left(), bounds.right(), area.left(), area.right()),
        axis(bounds.top(), bounds.bottom(), area.top(), area.bottom()),
    )
}

fn place_secondary_label(bounds: Rect, size: (f32, f32), position: LabelPosition, offset: f32) -> Rect {
    let (w, h) = size;
    let center = bounds.center();
    let x = match position {
        LabelPosition::TopLeft | LabelPosition::MiddleLeft | LabelPosition::BottomLeft => {
            bounds.left() - offset - w
        }
        LabelPosition::TopCenter
        | LabelPosition::MiddleCenter
        | LabelPosition::BottomCenter
        | LabelPosition::Nowhere => center.x - w / 2.0,
        LabelPosition::TopRight | LabelPosition::MiddleRight | LabelPosition::BottomRight => {
            bounds.right() + offset
        }
    };
    let y = match position {
        LabelPosition::TopLeft | LabelPosition::TopCenter | LabelPosition::TopRight => {
            bounds.top() - offset - h
        }
        LabelPosition::MiddleLeft
        | LabelPosition::MiddleCenter
        | LabelPosition::MiddleRight
        | LabelPosition::Nowhere => center.y - h / 2.0,
        LabelPosition::BottomLeft | LabelPosition::BottomCenter | LabelPosition::BottomRight => {
            bounds.bottom() + offset
        }
    };
    Rect::new(x, y, w, h)
}

/// Shift a label inward so it does not overflow the top or right edge of
/// `area`. Bottom and left overflow are left alone.
fn keep_top_right_inside(label: Rect, area: Rect) -> Rect {
    let dy = (area.top() - label.top()).max(0.0);
    let dx = (label.right() - area.right()).max(0.0);
    label.translate(-dx, dy)
}

fn lighten(color: Color, amount: f32) -> Color {
    let mix = |c: u8| (c as f32 + (255.0 - c as f32) * amount).round() as u8;
    Color::new(mix(color.r), mix(color.g), mix(color.b), color.a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::RenderCache;
    use crate::config::Config;
    use crate::ir::VertexStyle;
    use crate::surface::Primitive;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    fn setup(rect: Rect, margin: f32) -> (Canvas, StyleResolver, RenderCache) {
        let mut config = Config::default();
        config.style.fast_text_metrics = true;
        (
            Canvas::new(rect, margin, Color::WHITE).unwrap(),
            StyleResolver::from_config(&config),
            RenderCache::new(),
        )
    }

    fn draw(vertex: &mut Vertex, canvas: &Canvas, style: &StyleResolver) -> Option<VertexRecord> {
        let cache = RenderCache::new();
        let pass = DrawPass {
            canvas,
            style,
            cache: &cache,
        };
        VertexRenderer.try_draw(vertex, &pass).unwrap()
    }

    #[test]
    fn hidden_vertex_is_not_drawn() {
        let (canvas, style, _) = setup(Rect::new(0.0, 0.0, 100.0, 100.0), 0.0);
        let mut v = Vertex::new(VertexId(1), Point::new(50.0, 50.0));
        v.visibility = Visibility::Hidden;
        assert!(draw(&mut v, &canvas, &style).is_none());
    }

    #[test]
    fn vertex_is_moved_inside_margin() {
        let (canvas, style, _) = setup(Rect::new(0.0, 0.0, 50.0, 50.0), 5.0);
        let mut v = Vertex::new(VertexId(1), Point::new(2.0, 2.0));
        let record = draw(&mut v, &canvas, &style).unwrap();
        assert_eq!(v.position, Point::new(8.0, 8.0));
        assert!(canvas.usable_rect().contains_rect(&record.bounds()));
        assert_eq!(record.center(), v.position);
    }

    #[test]
    fn oversized_vertex_aligns_top_left() {
        assert_eq!(
            clamp_offset(Rect::new(0.0, 0.0, 100.0, 100.0), Rect::new(5.0, 5.0, 40.0, 40.0)),
            (5.0, 5.0)
        );
        assert_eq!(
            clamp_offset(Rect::new(20.0, 20.0, 100.0, 100.0), Rect::new(5.0, 5.0, 40.0, 40.0)),
            (-15.0, -15.0)
        );
    }

    #[test]
    fn circle_endpoint_lies_on_perimeter_toward_other() {
        let a = VertexBoundary::Circle {
            center: Point::new(0.0, 0.0),
            radius: 3.0,
        };
        let p = a.point_toward(Point::new(100.0, 0.0));
        assert!(approx(p.x, 3.0) && approx(p.y, 0.0));
    }

    #[test]
    fn square_endpoint_hits_side() {
        let b = VertexBoundary::Square {
            center: Point::new(0.0, 0.0),
            half: 4.0,
        };
        let p = b.point_toward(Point::new(10.0, 5.0));
        assert!(approx(p.x, 4.0) && approx(p.y, 2.0));
    }

    #[test]
    fn diamond_and_triangle_bounds_exceed_radius_square() {
        let c = Point::new(0.0, 0.0);
        let diamond = VertexBoundary::shape_bounds(VertexShape::Diamond, c, 10.0);
        assert!(approx(diamond.width, 20.0 * SQRT_2));
        let triangle = VertexBoundary::shape_bounds(VertexShape::Triangle, c, 10.0);
        assert!(approx(triangle.top(), -13.0));
        assert!(approx(triangle.bottom(), 6.5));
        let built = VertexBoundary::for_shape(VertexShape::Triangle, c, 10.0).bounds();
        assert!(approx(built.width, triangle.width) && approx(built.height, triangle.height));
    }

    #[test]
    fn self_loop_anchor_follows_side() {
        let b = VertexBoundary::Diamond {
            center: Point::new(10.0, 10.0),
            half_diagonal: 5.0,
        };
        let p = b.point_in_direction(RectSide::Bottom.direction());
        assert!(approx(p.x, 10.0) && approx(p.y, 15.0));
    }

    #[test]
    fn primary_label_wins_over_shape() {
        let (canvas, style, _) = setup(Rect::new(0.0, 0.0, 400.0, 400.0), 0.0);
        let mut v = Vertex::new(VertexId(2), Point::new(200.0, 200.0)).with_style(VertexStyle {
            primary_label: Some("Alpha".into()),
            ..Default::default()
        });
        let record = draw(&mut v, &canvas, &style).unwrap();
        assert!(matches!(record.boundary(), VertexBoundary::Box(_)));
        assert!(record.drawable().primitives().iter().any(
            |p| matches!(p, Primitive::Text { text, .. } if text == "Alpha")
        ));
    }

    #[test]
    fn shape_precedence_ignores_label() {
        let (canvas, style, _) = setup(Rect::new(0.0, 0.0, 400.0, 400.0), 0.0);
        let mut v = Vertex::new(VertexId(2), Point::new(200.0, 200.0)).with_style(VertexStyle {
            primary_label: Some("Alpha".into()),
            drawing_precedence: Some(DrawingPrecedence::Shape),
            ..Default::default()
        });
        let record = draw(&mut v, &canvas, &style).unwrap();
        assert!(matches!(record.boundary(), VertexBoundary::Circle { .. }));
    }

    #[test]
    fn unreadable_image_falls_back_to_shape() {
        let (canvas, style, _) = setup(Rect::new(0.0, 0.0, 400.0, 400.0), 0.0);
        let mut v = Vertex::new(VertexId(3), Point::new(100.0, 100.0)).with_style(VertexStyle {
            image: Some("/definitely/not/here.png".into()),
            shape: Some(VertexShape::Square),
            ..Default::default()
        });
        let record = draw(&mut v, &canvas, &style).unwrap();
        assert!(matches!(record.boundary(), VertexBoundary::Square { .. }));
    }

    fn sample_image(name: &str) -> String {
        let path = std::env::temp_dir().join(format!("gcr-{}-{name}.png", std::process::id()));
        image::RgbaImage::new(20, 10).save(&path).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn image_vertex(id: u32, source: String, alpha: Option<u8>) -> Vertex {
        Vertex::new(VertexId(id), Point::new(50.0, 50.0)).with_style(VertexStyle {
            image: Some(source),
            alpha,
            ..Default::default()
        })
    }

    #[test]
    fn opaque_image_is_drawn_at_natural_size_with_outline() {
        let (canvas, style, _) = setup(Rect::new(0.0, 0.0, 100.0, 100.0), 0.0);
        let mut v = image_vertex(7, sample_image("opaque"), None);
        let record = draw(&mut v, &canvas, &style).unwrap();

        assert_eq!(record.boundary(), &VertexBoundary::Box(Rect::new(40.0, 45.0, 20.0, 10.0)));
        assert_eq!(record.center(), Point::new(50.0, 50.0));
        let primitives = record.drawable().primitives();
        assert!(matches!(primitives[0], Primitive::Image { rect, .. } if rect == Rect::new(40.0, 45.0, 20.0, 10.0)));
        assert!(primitives.iter().any(|p| matches!(
            p,
            Primitive::Rect { fill: None, stroke: Some(stroke), .. } if stroke.color.a == 255
        )));
    }

    #[test]
    fn translucent_image_is_veiled_with_background() {
        let (canvas, style, _) = setup(Rect::new(0.0, 0.0, 100.0, 100.0), 0.0);
        let mut v = image_vertex(8, sample_image("translucent"), Some(128));
        let record = draw(&mut v, &canvas, &style).unwrap();

        assert!(matches!(record.boundary(), VertexBoundary::Box(_)));
        let veil = record.drawable().primitives().iter().find_map(|p| match p {
            Primitive::Rect { fill: Some(Fill::Solid(color)), stroke: None, .. } => Some(*color),
            _ => None,
        });
        assert_eq!(veil, Some(Color::WHITE.with_alpha(127)));
        assert!(!record
            .drawable()
            .primitives()
            .iter()
            .any(|p| matches!(p, Primitive::Rect { stroke: Some(_), .. })));
    }

    #[test]
    fn secondary_label_uses_label_text_color() {
        let (canvas, style, _) = setup(Rect::new(0.0, 0.0, 200.0, 200.0), 0.0);
        let mut v = Vertex::new(VertexId(9), Point::new(100.0, 100.0)).with_style(VertexStyle {
            color: Some(Color::rgb(200, 0, 0)),
            secondary_label: Some("note".into()),
            ..Default::default()
        });
        let record = draw(&mut v, &canvas, &style).unwrap();
        let text_color = record.drawable().primitives().iter().find_map(|p| match p {
            Primitive::Text { text, color, .. } if text == "note" => Some(*color),
            _ => None,
        });
        assert_eq!(text_color, Some(style.theme.label_text_color));
    }

    #[test]
    fn secondary_label_is_kept_below_top_and_left_of_right_edge() {
        let area = Rect::new(0.0, 0.0, 100.0, 100.0);
        let label = keep_top_right_inside(Rect::new(90.0, -5.0, 20.0, 10.0), area);
        assert_eq!(label, Rect::new(80.0, 0.0, 20.0, 10.0));
        let untouched = keep_top_right_inside(Rect::new(-5.0, 95.0, 20.0, 10.0), area);
        assert_eq!(untouched, Rect::new(-5.0, 95.0, 20.0, 10.0));
    }

    #[test]
    fn secondary_label_near_corner_stays_in_canvas() {
        let (canvas, style, _) = setup(Rect::new(0.0, 0.0, 100.0, 100.0), 0.0);
        let mut v = Vertex::new(VertexId(4), Point::new(97.0, 3.0)).with_style(VertexStyle {
            secondary_label: Some("annotation".into()),
            ..Default::default()
        });
        let record = draw(&mut v, &canvas, &style).unwrap();
        let label = record.secondary_label_bounds().unwrap();
        assert!(label.top() >= 0.0);
        assert!(label.right() <= 100.0 + 1e-3);
    }

    #[test]
    fn drawing_twice_gives_identical_bounds() {
        let (canvas, style, _) = setup(Rect::new(0.0, 0.0, 50.0, 50.0), 5.0);
        let mut v = Vertex::new(VertexId(5), Point::new(49.0, 1.0)).with_style(VertexStyle {
            shape: Some(VertexShape::SolidTriangle),
            ..Default::default()
        });
        let first = draw(&mut v, &canvas, &style).unwrap().bounds();
        let second = draw(&mut v, &canvas, &style).unwrap().bounds();
        assert_eq!(first, second);
    }

    #[test]
    fn sphere_uses_radial_fill() {
        let (canvas, style, _) = setup(Rect::new(0.0, 0.0, 100.0, 100.0), 0.0);
        let mut v = Vertex::new(VertexId(6), Point::new(50.0, 50.0)).with_style(VertexStyle {
            shape: Some(VertexShape::Sphere),
            ..Default::default()
        });
        let record = draw(&mut v, &canvas, &style).unwrap();
        assert!(matches!(
            record.drawable().primitives()[0],
            Primitive::Ellipse {
                fill: Some(Fill::Radial { .. }),
                ..
            }
        ));
    }
}
