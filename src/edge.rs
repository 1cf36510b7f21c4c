use std::rc::Rc;

use serde::Serialize;

use crate::cache::{DrawPass, TryDraw};
use crate::color::Color;
use crate::error::Result;
use crate::geometry::{Point, Rect, RectSide};
use crate::ir::{Edge, EdgeId, Visibility};
use crate::style::StyleResolver;
use crate::surface::{Drawable, DrawingContext, ElementTag, Fill, Stroke, TextAnchor};
use crate::text_metrics;
use crate::vertex::VertexRecord;

/// Arrow base half-width as a fraction of the arrow length.
const ARROW_HALF_WIDTH: f32 = 0.4;
/// Tilt of a self-loop arrow toward the loop center so it follows the curve.
const SELF_LOOP_ARROW_CORRECTION_DEG: f32 = 12.0;
/// Upper bound for the label background alpha; further capped by the edge alpha.
const LABEL_BACKGROUND_ALPHA: u8 = 200;
/// Glyph whose width is kept clear at both ends of an edge label.
const LABEL_BUFFER_GLYPH: &str = "x";
const TEXT_BASELINE_SHIFT: f32 = 0.35;

/// Filled arrowhead triangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Arrow {
    pub tip: Point,
    /// Center of the flat base; a line feeding the arrow ends here.
    pub base: Point,
    pub points: [Point; 3],
}

impl Arrow {
    /// Arrow of `length` pointing along the unit vector `dir` with its tip at `tip`.
    pub fn new(tip: Point, dir: Point, length: f32) -> Self {
        let base = tip - dir * length;
        let normal = Point::new(-dir.y, dir.x) * (length * ARROW_HALF_WIDTH);
        Self {
            tip,
            base,
            points: [tip, base + normal, base - normal],
        }
    }

    pub fn length(&self) -> f32 {
        self.tip.distance(self.base)
    }
}

/// Geometry of a drawn edge, kept for endpoint inspection and scene dumps.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EdgeGeometry {
    Line {
        /// Boundary point on the source vertex.
        start: Point,
        /// Boundary point on the destination vertex.
        end: Point,
        /// Where the stroked line stops: `end`, or the arrow base.
        line_end: Point,
        arrow: Option<Arrow>,
    },
    SelfLoop {
        side: RectSide,
        anchor: Point,
        center: Point,
        radius: f32,
        arrow: Option<Arrow>,
    },
}

impl EdgeGeometry {
    pub fn arrow(&self) -> Option<&Arrow> {
        match self {
            EdgeGeometry::Line { arrow, .. } | EdgeGeometry::SelfLoop { arrow, .. } => {
                arrow.as_ref()
            }
        }
    }
}

/// Cached result of drawing one edge.
#[derive(Debug, Clone)]
pub struct EdgeRecord {
    id: EdgeId,
    drawable: Rc<Drawable>,
    selected: bool,
    geometry: EdgeGeometry,
}

impl EdgeRecord {
    pub fn id(&self) -> EdgeId {
        self.id
    }

    pub fn drawable(&self) -> &Rc<Drawable> {
        &self.drawable
    }

    /// Whether the edge was drawn selected, which puts it in the top edge layer.
    pub fn drawn_selected(&self) -> bool {
        self.selected
    }

    pub fn geometry(&self) -> &EdgeGeometry {
        &self.geometry
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeRenderer;

impl EdgeRenderer {
    pub fn new() -> Self {
        Self
    }

    fn arrow_length(&self, width: f32, style: &StyleResolver) -> f32 {
        (width * style.style.arrow_length_factor)
            .max(style.style.min_arrow_length * style.style.graph_scale)
    }

    fn draw_line_edge(
        &self,
        dc: &mut DrawingContext,
        edge: &Edge,
        from: &VertexRecord,
        to: &VertexRecord,
        stroke: Stroke,
        style: &StyleResolver,
    ) -> EdgeGeometry {
        let start = from.edge_endpoint(to);
        let end = to.edge_endpoint(from);
        let mut line_end = end;
        let mut arrow = None;

        let direction = (end - start).normalized();
        if edge.directed
            && style.style.show_arrows
            && let Some(dir) = direction
        {
            let head = Arrow::new(end, dir, self.arrow_length(stroke.width, style));
            // A line shorter than its arrow would point backwards; draw only the head.
            line_end = if start.distance(end) > head.length() {
                head.base
            } else {
                start
            };
            arrow = Some(head);
        }

        if start.distance(line_end) > 0.0 {
            dc.draw_line(start, line_end, stroke);
        }
        if let Some(head) = &arrow {
            dc.draw_polygon(head.points.to_vec(), Some(Fill::Solid(stroke.color)), None);
        }
        EdgeGeometry::Line {
            start,
            end,
            line_end,
            arrow,
        }
    }

    fn draw_self_loop(
        &self,
        dc: &mut DrawingContext,
        edge: &Edge,
        vertex: &VertexRecord,
        stroke: Stroke,
        pass: &DrawPass<'_>,
    ) -> EdgeGeometry {
        let style = pass.style;
        let side = pass.canvas.rect().farthest_side(vertex.center());
        let dir = side.direction();
        let anchor = vertex.self_loop_anchor(side);
        let radius = style.style.self_loop_radius * style.style.graph_scale;
        let center = anchor + dir * radius;
        tracing::debug!(edge = %edge.id, ?side, "self-loop side");

        dc.draw_ellipse(center, radius, radius, None, Some(stroke));

        let arrow = (edge.directed && style.style.show_arrows).then(|| {
            // Tip on the far point of the loop, pointing along the clockwise
            // tangent and tilted toward the loop center.
            let tip = anchor + dir * (radius * 2.0);
            let tangent = Point::new(-dir.y, dir.x).rotate_about(
                Point::default(),
                SELF_LOOP_ARROW_CORRECTION_DEG.to_radians(),
            );
            let head = Arrow::new(tip, tangent, self.arrow_length(stroke.width, style));
            dc.draw_polygon(head.points.to_vec(), Some(Fill::Solid(stroke.color)), None);
            head
        });

        EdgeGeometry::SelfLoop {
            side,
            anchor,
            center,
            radius,
            arrow,
        }
    }

    /// Draws `label` along the segment `a`-`b`, rotated so the text reads
    /// left to right.
    #[allow(clippy::too_many_arguments)]
    fn draw_line_label(
        &self,
        dc: &mut DrawingContext,
        label: &str,
        a: Point,
        b: Point,
        color: Color,
        text_color: Color,
        pass: &DrawPass<'_>,
    ) {
        let style = pass.style;
        let (p1, p2) = if a.x > b.x { (b, a) } else { (a, b) };
        let length = p1.distance(p2);
        let font_size = style.font_size();
        let family = style.theme.font_family.as_str();
        let fast = style.style.fast_text_metrics;

        let buffer = text_metrics::text_width(LABEL_BUFFER_GLYPH, font_size, family, fast);
        let available = length - 2.0 * buffer;
        if available <= 0.0 {
            return;
        }
        let full_width = text_metrics::text_width(label, font_size, family, fast);
        let (text, anchor_x, anchor) = if full_width > available {
            let clipped = text_metrics::truncate_to_width(label, available, font_size, family, fast);
            (clipped, p1.x + buffer, TextAnchor::Start)
        } else {
            (label.to_string(), p1.x + length / 2.0, TextAnchor::Middle)
        };
        if text.is_empty() {
            return;
        }
        let text_width = text_metrics::text_width(&text, font_size, family, fast).min(available);
        let height = text_metrics::line_height(font_size);
        let box_x = match anchor {
            TextAnchor::Start => anchor_x,
            _ => anchor_x - text_width / 2.0,
        };
        let background = pass
            .canvas
            .background()
            .with_alpha(LABEL_BACKGROUND_ALPHA.min(color.a));
        let degrees = (p2.y - p1.y).atan2(p2.x - p1.x).to_degrees();

        dc.with_rotation(degrees, p1, |inner| {
            inner.draw_rect(
                Rect::new(box_x, p1.y - height / 2.0, text_width, height),
                Some(Fill::Solid(background)),
                None,
            );
            inner.draw_text(
                Point::new(anchor_x, p1.y + font_size * TEXT_BASELINE_SHIFT),
                text,
                font_size,
                text_color,
                anchor,
            );
        });
    }

    /// Self-loop labels sit just outside the loop, unrotated.
    fn draw_loop_label(
        &self,
        dc: &mut DrawingContext,
        label: &str,
        geometry: &EdgeGeometry,
        text_color: Color,
        pass: &DrawPass<'_>,
    ) {
        let EdgeGeometry::SelfLoop {
            side,
            center,
            radius,
            ..
        } = geometry
        else {
            return;
        };
        let style = pass.style;
        let font_size = style.font_size();
        let height = text_metrics::line_height(font_size);
        let width = text_metrics::text_width(
            label,
            font_size,
            &style.theme.font_family,
            style.style.fast_text_metrics,
        );
        let at = *center + side.direction() * (*radius + height / 2.0 + width.min(height));
        dc.draw_text(
            Point::new(at.x, at.y + font_size * TEXT_BASELINE_SHIFT),
            label,
            font_size,
            text_color,
            TextAnchor::Middle,
        );
    }
}

impl<'e> TryDraw<&'e Edge> for EdgeRenderer {
    type Record = EdgeRecord;

    fn try_draw(&self, edge: &'e Edge, pass: &DrawPass<'_>) -> Result<Option<EdgeRecord>> {
        let style = pass.style;
        let visibility = style.visibility(edge);
        if visibility == Visibility::Hidden {
            return Ok(None);
        }
        let (Some(from), Some(to)) = (pass.cache.vertex(edge.from), pass.cache.vertex(edge.to))
        else {
            tracing::trace!(edge = %edge.id, "endpoint not drawn, skipping edge");
            return Ok(None);
        };

        let selected = style.draw_as_selected(edge);
        let color = style.edge_color(edge, visibility, selected);
        let stroke = Stroke {
            color,
            width: style.width(edge, selected)?,
            dash: style.dash_pattern(edge, selected),
        };

        let mut dc = DrawingContext::new();
        let geometry = if edge.is_self_loop() {
            self.draw_self_loop(&mut dc, edge, from, stroke, pass)
        } else {
            self.draw_line_edge(&mut dc, edge, from, to, stroke, style)
        };

        if let Some(raw) = edge.style.label.as_deref() {
            let label = style.truncate_label(raw);
            if !label.is_empty() {
                let text_color = style.label_text_color(color, selected);
                match &geometry {
                    EdgeGeometry::Line { start, end, .. } => self.draw_line_label(
                        &mut dc, &label, *start, *end, color, text_color, pass,
                    ),
                    loop_geometry => {
                        self.draw_loop_label(&mut dc, &label, loop_geometry, text_color, pass)
                    }
                }
            }
        }

        let drawable = dc.finish().tagged(ElementTag::Edge(edge.id));
        Ok(Some(EdgeRecord {
            id: edge.id,
            drawable: Rc::new(drawable),
            selected,
            geometry,
        }))
    }
}
