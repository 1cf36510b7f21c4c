use crate::color::Color;
use crate::geometry::Rect;
use crate::scene::GraphRenderer;
use crate::surface::{DashPattern, Fill, Primitive, Stroke, TextAnchor};
use anyhow::Result;
use std::path::Path;

/// Serialises the drawn scene, layer by layer in compositing order.
pub fn render_svg(scene: &GraphRenderer) -> String {
    let view = scene
        .canvas()
        .map(|canvas| canvas.rect())
        .unwrap_or(Rect::new(0.0, 0.0, 200.0, 200.0));
    let font_family = scene.style().theme.font_family.as_str();

    let mut writer = SvgWriter::new(font_family);
    for (layer, group) in scene.layers() {
        if group.is_empty() {
            continue;
        }
        writer.body.push_str(&format!("<g class=\"{}\">", layer.name()));
        for drawable in group.iter() {
            writer.body.push_str(&format!("<g data-id=\"{}\">", drawable.id().get()));
            for primitive in drawable.primitives() {
                writer.primitive(primitive);
            }
            writer.body.push_str("</g>");
        }
        writer.body.push_str("</g>");
    }

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" width=\"{w}\" height=\"{h}\" viewBox=\"{x} {y} {w} {h}\">",
        x = view.x,
        y = view.y,
        w = view.width,
        h = view.height,
    ));
    if !writer.defs.is_empty() {
        svg.push_str("<defs>");
        svg.push_str(&writer.defs);
        svg.push_str("</defs>");
    }
    svg.push_str(&writer.body);
    svg.push_str("</svg>");
    svg
}

struct SvgWriter<'a> {
    font_family: &'a str,
    defs: String,
    body: String,
    gradients: usize,
}

impl<'a> SvgWriter<'a> {
    fn new(font_family: &'a str) -> Self {
        Self {
            font_family,
            defs: String::new(),
            body: String::new(),
            gradients: 0,
        }
    }

    fn primitive(&mut self, primitive: &Primitive) {
        match primitive {
            Primitive::Line { from, to, stroke } => {
                let stroke = stroke_attrs(Some(stroke));
                self.body.push_str(&format!(
                    "<line x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\"{stroke}/>",
                    from.x, from.y, to.x, to.y
                ));
            }
            Primitive::Ellipse {
                center,
                rx,
                ry,
                fill,
                stroke,
            } => {
                let paint = self.paint_attrs(fill.as_ref(), stroke.as_ref());
                self.body.push_str(&format!(
                    "<ellipse cx=\"{:.2}\" cy=\"{:.2}\" rx=\"{:.2}\" ry=\"{:.2}\"{paint}/>",
                    center.x, center.y, rx, ry
                ));
            }
            Primitive::Polygon {
                points,
                fill,
                stroke,
            } => {
                let paint = self.paint_attrs(fill.as_ref(), stroke.as_ref());
                let points = points
                    .iter()
                    .map(|p| format!("{:.2},{:.2}", p.x, p.y))
                    .collect::<Vec<_>>()
                    .join(" ");
                self.body
                    .push_str(&format!("<polygon points=\"{points}\"{paint}/>"));
            }
            Primitive::Rect { rect, fill, stroke } => {
                let paint = self.paint_attrs(fill.as_ref(), stroke.as_ref());
                self.body.push_str(&format!(
                    "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\"{paint}/>",
                    rect.x, rect.y, rect.width, rect.height
                ));
            }
            Primitive::Text {
                origin,
                text,
                font_size,
                color,
                anchor,
            } => {
                let anchor = match anchor {
                    TextAnchor::Start => "start",
                    TextAnchor::Middle => "middle",
                    TextAnchor::End => "end",
                };
                self.body.push_str(&format!(
                    "<text x=\"{:.2}\" y=\"{:.2}\" font-family=\"{}\" font-size=\"{:.2}\" text-anchor=\"{anchor}\"{}>{}</text>",
                    origin.x,
                    origin.y,
                    escape_xml(self.font_family),
                    font_size,
                    color_attrs("fill", *color),
                    escape_xml(text)
                ));
            }
            Primitive::Image {
                rect,
                source,
                opacity,
            } => {
                self.body.push_str(&format!(
                    "<image x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" opacity=\"{:.3}\" preserveAspectRatio=\"none\" xlink:href=\"{}\"/>",
                    rect.x,
                    rect.y,
                    rect.width,
                    rect.height,
                    opacity,
                    escape_xml(source)
                ));
            }
            Primitive::Rotated {
                degrees,
                center,
                children,
            } => {
                self.body.push_str(&format!(
                    "<g transform=\"rotate({:.3} {:.2} {:.2})\">",
                    degrees, center.x, center.y
                ));
                for child in children {
                    self.primitive(child);
                }
                self.body.push_str("</g>");
            }
        }
    }

    fn paint_attrs(&mut self, fill: Option<&Fill>, stroke: Option<&Stroke>) -> String {
        let mut attrs = match fill {
            None => " fill=\"none\"".to_string(),
            Some(Fill::Solid(color)) => color_attrs("fill", *color),
            Some(Fill::Radial { center, edge }) => {
                self.gradients += 1;
                let id = format!("radial-{}", self.gradients);
                self.defs.push_str(&format!(
                    "<radialGradient id=\"{id}\" cx=\"35%\" cy=\"35%\" r=\"65%\"><stop offset=\"0%\" stop-color=\"{}\" stop-opacity=\"{:.3}\"/><stop offset=\"100%\" stop-color=\"{}\" stop-opacity=\"{:.3}\"/></radialGradient>",
                    center.to_hex(),
                    center.opacity(),
                    edge.to_hex(),
                    edge.opacity()
                ));
                format!(" fill=\"url(#{id})\"")
            }
        };
        attrs.push_str(&stroke_attrs(stroke));
        attrs
    }
}

fn stroke_attrs(stroke: Option<&Stroke>) -> String {
    let Some(stroke) = stroke else {
        return String::new();
    };
    let mut attrs = color_attrs("stroke", stroke.color);
    attrs.push_str(&format!(" stroke-width=\"{:.2}\"", stroke.width));
    if let DashPattern::Dashes(lengths) = stroke.dash {
        let dashes = lengths
            .iter()
            .map(|len| format!("{:.2}", len * stroke.width))
            .collect::<Vec<_>>()
            .join(" ");
        attrs.push_str(&format!(" stroke-dasharray=\"{dashes}\""));
    }
    attrs
}

fn color_attrs(attr: &str, color: Color) -> String {
    if color.is_opaque() {
        format!(" {attr}=\"{}\"", color.to_hex())
    } else {
        format!(
            " {attr}=\"{}\" {attr}-opacity=\"{:.3}\"",
            color.to_hex(),
            color.opacity()
        )
    }
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, width: f32, height: f32, font_family: &str) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = font_family
        .split(',')
        .next()
        .map(|family| family.trim().trim_matches('"').to_string())
        .unwrap_or_else(|| "sans-serif".to_string());
    if let Some(size) = usvg::Size::from_wh(width, height) {
        opt.default_size = size;
    }

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
