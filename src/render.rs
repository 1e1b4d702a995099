//! Preview rendering of a mapped pathway to PNG and SVG.
//!
//! Consumes the per-node view seeds produced by the mapper. KGML positions
//! are node centers, so each node box spans `(x - w/2, y - h/2, w, h)`.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use cairo::{Context as CairoContext, Format, ImageSurface, LineCap, SvgSurface};
use pango::{Alignment, FontDescription};
use pangocairo::functions as pangocairo;

use crate::mapper::NodeGraphics;
use crate::network::{MemoryNetwork, NodeId, Row};
use crate::schema::{KEGG_EDGE_COLOR, KEGG_NODE_SHAPE};

pub const DEFAULT_PADDING_PX: f64 = 10.0;
const DEFAULT_LINE_WIDTH: f64 = 1.0;
const EDGE_LINE_WIDTH: f64 = 1.2;
const FONT_PX: f64 = 10.0;
const FONT_FAMILY: &str = "Liberation Sans";
const ARROW_SIZE: f64 = 6.0;
const ROUND_RECT_RADIUS: f64 = 5.0;
const BORDER_COLOR: Rgb = (0x55 as f64 / 255.0, 0x55 as f64 / 255.0, 0x55 as f64 / 255.0);
const DEFAULT_EDGE_COLOR: Rgb = (0x88 as f64 / 255.0, 0x88 as f64 / 255.0, 0x88 as f64 / 255.0);

type Rgb = (f64, f64, f64);

#[derive(Clone, Copy, Debug, PartialEq)]
struct Point {
    x: f64,
    y: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BBox {
    x: f64,
    y: f64,
    w: f64,
    h: f64,
}

#[derive(Clone, Copy, Debug)]
struct PixelRect {
    x0: f64,
    y0: f64,
    width: f64,
    height: f64,
    center: Point,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Bounds {
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Shape {
    Rectangle,
    RoundRectangle,
    Circle,
    Line,
}

impl Shape {
    fn from_kgml(shape: &str) -> Self {
        match shape {
            "circle" => Shape::Circle,
            "roundrectangle" => Shape::RoundRectangle,
            "line" => Shape::Line,
            _ => Shape::Rectangle,
        }
    }
}

#[derive(Debug)]
struct NodeBox {
    id: NodeId,
    bbox: BBox,
    shape: Shape,
    label: String,
    label_color: Rgb,
    fill_color: Rgb,
}

struct EdgeLine {
    source: NodeId,
    target: NodeId,
    color: Rgb,
}

#[derive(Clone, Copy, Debug)]
struct Transform {
    min_x: f64,
    min_y: f64,
    scale_x: f64,
    scale_y: f64,
}

impl Transform {
    fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64, width: f64, height: f64) -> Self {
        let span_x = (max_x - min_x).abs().max(1.0);
        let span_y = (max_y - min_y).abs().max(1.0);
        Self {
            min_x,
            min_y,
            scale_x: width / span_x,
            scale_y: height / span_y,
        }
    }

    fn rect(&self, bbox: BBox) -> PixelRect {
        let left = (bbox.x - self.min_x) * self.scale_x;
        let top = (bbox.y - self.min_y) * self.scale_y;
        let width = bbox.w * self.scale_x;
        let height = bbox.h * self.scale_y;
        PixelRect {
            x0: left,
            y0: top,
            width,
            height,
            center: Point {
                x: left + width / 2.0,
                y: top + height / 2.0,
            },
        }
    }
}

pub fn default_svg_output_path(output: &Path) -> PathBuf {
    let mut svg_path = output.to_path_buf();
    svg_path.set_extension("svg");
    svg_path
}

/// Draw the mapped network as a PNG at `output` and an SVG at `svg_output`.
pub fn draw_network(
    network: &MemoryNetwork,
    node_graphics: &[(NodeId, NodeGraphics)],
    output: &Path,
    svg_output: &Path,
    padding: f64,
) -> Result<()> {
    let nodes = node_boxes(network, node_graphics)?;
    let edges = edge_lines(network)?;
    let bounds = compute_bounds(&nodes)?;

    let (transform, width_f, height_f) = transform_with_padding(bounds, padding);
    let (surface, ctx) = create_png_surface(width_f.ceil() as i32, height_f.ceil() as i32)?;
    render_network(&ctx, &transform, &nodes, &edges)?;

    let mut file = fs::File::create(output).context("Failed to create PNG file")?;
    surface
        .write_to_png(&mut file)
        .context("Failed to write PNG")?;

    render_svg(svg_output, width_f, height_f, |ctx| {
        render_network(ctx, &transform, &nodes, &edges)
    })?;
    tracing::info!(
        png = %output.display(),
        svg = %svg_output.display(),
        nodes = nodes.len(),
        edges = edges.len(),
        "preview written"
    );
    Ok(())
}

fn node_boxes(
    network: &MemoryNetwork,
    node_graphics: &[(NodeId, NodeGraphics)],
) -> Result<Vec<NodeBox>> {
    node_graphics
        .iter()
        .map(|(id, graphics)| {
            let shape = network
                .text(Row::Node(*id), KEGG_NODE_SHAPE)
                .map(Shape::from_kgml)
                .unwrap_or(Shape::Rectangle);
            node_box(*id, graphics, shape)
                .with_context(|| format!("Bad graphics for node {}", id.0))
        })
        .collect()
}

fn node_box(id: NodeId, graphics: &NodeGraphics, shape: Shape) -> Result<NodeBox> {
    let x = parse_number(&graphics.x, "x")?;
    let y = parse_number(&graphics.y, "y")?;
    let w = parse_number(&graphics.width, "width")?;
    let h = parse_number(&graphics.height, "height")?;
    Ok(NodeBox {
        id,
        bbox: BBox {
            x: x - w / 2.0,
            y: y - h / 2.0,
            w,
            h,
        },
        shape,
        label: graphics.label.clone(),
        label_color: parse_hex_color(&graphics.label_color)?,
        fill_color: parse_hex_color(&graphics.fill_color)?,
    })
}

fn edge_lines(network: &MemoryNetwork) -> Result<Vec<EdgeLine>> {
    network
        .edges()
        .map(|(edge, record)| {
            let color = match network.text(Row::Edge(edge), KEGG_EDGE_COLOR) {
                Some(color) => parse_hex_color(color)?,
                None => DEFAULT_EDGE_COLOR,
            };
            Ok::<_, anyhow::Error>(EdgeLine {
                source: record.source,
                target: record.target,
                color,
            })
        })
        .collect()
}

fn parse_number(value: &str, field: &str) -> Result<f64> {
    value
        .parse::<f64>()
        .map_err(|_| anyhow!("Non-numeric {field}: {value:?}"))
}

/// Parse a `#RRGGBB` color into unit RGB components.
fn parse_hex_color(value: &str) -> Result<Rgb> {
    let hex = value
        .strip_prefix('#')
        .filter(|hex| hex.len() == 6 && hex.is_ascii())
        .ok_or_else(|| anyhow!("Bad color {value:?}"))?;
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16)
            .map(|v| v as f64 / 255.0)
            .map_err(|_| anyhow!("Bad color {value:?}"))
    };
    Ok((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

fn setup_context(ctx: &CairoContext) -> Result<()> {
    ctx.set_source_rgb(1.0, 1.0, 1.0);
    ctx.paint()?;
    ctx.set_source_rgb(BORDER_COLOR.0, BORDER_COLOR.1, BORDER_COLOR.2);
    ctx.set_line_width(DEFAULT_LINE_WIDTH);
    ctx.set_line_cap(LineCap::Square);
    Ok(())
}

fn create_png_surface(width: i32, height: i32) -> Result<(ImageSurface, CairoContext)> {
    let surface = ImageSurface::create(Format::ARgb32, width, height)
        .context("Failed to create image surface")?;
    let ctx = CairoContext::new(&surface).context("Failed to create Cairo context")?;
    setup_context(&ctx)?;
    Ok((surface, ctx))
}

fn render_svg<F>(svg_path: &Path, width: f64, height: f64, render: F) -> Result<()>
where
    F: FnOnce(&CairoContext) -> Result<()>,
{
    let surface = SvgSurface::new(width, height, Some(svg_path))
        .context("Failed to create SVG surface")?;
    let ctx = CairoContext::new(&surface).context("Failed to create Cairo context")?;
    setup_context(&ctx)?;
    render(&ctx)?;
    surface.finish();
    Ok(())
}

fn render_network(
    ctx: &CairoContext,
    transform: &Transform,
    nodes: &[NodeBox],
    edges: &[EdgeLine],
) -> Result<()> {
    let rects = node_rects(transform, nodes);

    // Edges go underneath so arrowheads stop at the node border.
    for edge in edges {
        let (Some(&source), Some(&target)) = (rects.get(&edge.source), rects.get(&edge.target))
        else {
            continue;
        };
        draw_edge(ctx, source, target, edge.color)?;
    }

    for node in nodes {
        if node.shape == Shape::Line {
            continue;
        }
        let rect = transform.rect(node.bbox);
        match node.shape {
            Shape::Circle => path_ellipse(ctx, rect)?,
            Shape::RoundRectangle => path_round_rect(ctx, rect, ROUND_RECT_RADIUS)?,
            _ => path_rect(ctx, rect)?,
        }
        ctx.set_line_width(DEFAULT_LINE_WIDTH);
        ctx.set_source_rgb(node.fill_color.0, node.fill_color.1, node.fill_color.2);
        ctx.fill_preserve()?;
        ctx.set_source_rgb(BORDER_COLOR.0, BORDER_COLOR.1, BORDER_COLOR.2);
        ctx.stroke()?;
        draw_text_centered(ctx, rect.center, &node.label, node.label_color)?;
    }
    Ok(())
}

fn node_rects(transform: &Transform, nodes: &[NodeBox]) -> HashMap<NodeId, PixelRect> {
    nodes
        .iter()
        .map(|node| (node.id, transform.rect(node.bbox)))
        .collect()
}

fn draw_edge(ctx: &CairoContext, source: PixelRect, target: PixelRect, color: Rgb) -> Result<()> {
    let start = source.center;
    let end = clip_to_rect(start, target);
    ctx.set_source_rgb(color.0, color.1, color.2);
    ctx.set_line_width(EDGE_LINE_WIDTH);
    ctx.move_to(start.x, start.y);
    ctx.line_to(end.x, end.y);
    ctx.stroke()?;
    draw_filled_triangle(ctx, end, start, ARROW_SIZE)
}

/// Point where the segment from `from` to the rect center crosses its border.
fn clip_to_rect(from: Point, rect: PixelRect) -> Point {
    let dx = rect.center.x - from.x;
    let dy = rect.center.y - from.y;
    let half_w = rect.width / 2.0;
    let half_h = rect.height / 2.0;
    let tx = if dx != 0.0 { half_w / dx.abs() } else { f64::INFINITY };
    let ty = if dy != 0.0 { half_h / dy.abs() } else { f64::INFINITY };
    let t = tx.min(ty).min(1.0);
    if !t.is_finite() {
        return rect.center;
    }
    Point {
        x: rect.center.x - dx * t,
        y: rect.center.y - dy * t,
    }
}

fn path_rect(ctx: &CairoContext, rect: PixelRect) -> Result<()> {
    ctx.new_path();
    ctx.rectangle(rect.x0, rect.y0, rect.width, rect.height);
    Ok(())
}

fn path_ellipse(ctx: &CairoContext, rect: PixelRect) -> Result<()> {
    let radius_x = (rect.width / 2.0).max(1.0);
    let radius_y = (rect.height / 2.0).max(1.0);
    let _ = ctx.save();
    ctx.new_path();
    ctx.translate(rect.center.x, rect.center.y);
    ctx.scale(radius_x, radius_y);
    ctx.arc(0.0, 0.0, 1.0, 0.0, std::f64::consts::TAU);
    let _ = ctx.restore();
    Ok(())
}

fn path_round_rect(ctx: &CairoContext, rect: PixelRect, radius: f64) -> Result<()> {
    let radius = radius.min(rect.width / 2.0).min(rect.height / 2.0);
    let (x, y) = (rect.x0, rect.y0);
    let right = x + rect.width;
    let bottom = y + rect.height;
    let quarter = std::f64::consts::FRAC_PI_2;

    ctx.new_path();
    ctx.arc(right - radius, y + radius, radius, -quarter, 0.0);
    ctx.arc(right - radius, bottom - radius, radius, 0.0, quarter);
    ctx.arc(x + radius, bottom - radius, radius, quarter, 2.0 * quarter);
    ctx.arc(x + radius, y + radius, radius, 2.0 * quarter, 3.0 * quarter);
    ctx.close_path();
    Ok(())
}

fn draw_filled_triangle(ctx: &CairoContext, end: Point, prev: Point, size: f64) -> Result<()> {
    let Some((p1, p2, tip)) = triangle_points(end, prev, size) else {
        return Ok(());
    };
    ctx.move_to(p1.x, p1.y);
    ctx.line_to(p2.x, p2.y);
    ctx.line_to(tip.x, tip.y);
    ctx.close_path();
    ctx.fill()?;
    Ok(())
}

fn triangle_points(end: Point, prev: Point, size: f64) -> Option<(Point, Point, Point)> {
    let dx = end.x - prev.x;
    let dy = end.y - prev.y;
    let length = (dx * dx + dy * dy).sqrt();
    if length == 0.0 {
        return None;
    }
    let (ux, uy) = (dx / length, dy / length);
    let base_x = end.x - ux * size;
    let base_y = end.y - uy * size;
    let half_width = size * 0.5;
    let p1 = Point {
        x: base_x - uy * half_width,
        y: base_y + ux * half_width,
    };
    let p2 = Point {
        x: base_x + uy * half_width,
        y: base_y - ux * half_width,
    };
    Some((p1, p2, end))
}

fn draw_text_centered(ctx: &CairoContext, center: Point, text: &str, color: Rgb) -> Result<()> {
    if text.trim().is_empty() {
        return Ok(());
    }
    let layout = pangocairo::create_layout(ctx);
    let mut font_desc = FontDescription::from_string(FONT_FAMILY);
    font_desc.set_absolute_size(FONT_PX * pango::SCALE as f64);
    layout.set_font_description(Some(&font_desc));
    layout.set_alignment(Alignment::Center);
    layout.set_text(text);

    let (width, height) = layout.pixel_size();
    ctx.move_to(center.x - width as f64 / 2.0, center.y - height as f64 / 2.0);
    ctx.set_source_rgb(color.0, color.1, color.2);
    pangocairo::show_layout(ctx, &layout);
    Ok(())
}

fn compute_bounds(nodes: &[NodeBox]) -> Result<Bounds> {
    let drawn: Vec<BBox> = nodes
        .iter()
        .filter(|node| node.shape != Shape::Line)
        .map(|node| node.bbox)
        .collect();
    if drawn.is_empty() {
        return Err(anyhow!("No drawable nodes in pathway"));
    }
    Ok(Bounds {
        min_x: drawn.iter().map(|b| b.x).fold(f64::INFINITY, f64::min),
        max_x: drawn.iter().map(|b| b.x + b.w).fold(f64::NEG_INFINITY, f64::max),
        min_y: drawn.iter().map(|b| b.y).fold(f64::INFINITY, f64::min),
        max_y: drawn.iter().map(|b| b.y + b.h).fold(f64::NEG_INFINITY, f64::max),
    })
}

/// Compute a padded transform and canvas size from data bounds.
fn transform_with_padding(bounds: Bounds, padding: f64) -> (Transform, f64, f64) {
    let min_x = bounds.min_x - padding;
    let max_x = bounds.max_x + padding;
    let min_y = bounds.min_y - padding;
    let max_y = bounds.max_y + padding;
    let width = (max_x - min_x).abs().max(1.0);
    let height = (max_y - min_y).abs().max(1.0);
    (
        Transform::new(min_x, min_y, max_x, max_y, width, height),
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed(x: &str, y: &str, w: &str, h: &str) -> NodeGraphics {
        NodeGraphics {
            x: x.to_string(),
            y: y.to_string(),
            width: w.to_string(),
            height: h.to_string(),
            label: "HK1".to_string(),
            label_color: "#000000".to_string(),
            fill_color: "#BFFFBF".to_string(),
        }
    }

    #[test]
    fn parses_hex_colors() {
        assert_eq!(parse_hex_color("#FFFFFF").unwrap(), (1.0, 1.0, 1.0));
        assert_eq!(parse_hex_color("#000000").unwrap(), (0.0, 0.0, 0.0));
        let (r, g, b) = parse_hex_color("#32CCB6").unwrap();
        assert_eq!((r * 255.0).round(), 50.0);
        assert_eq!((g * 255.0).round(), 204.0);
        assert_eq!((b * 255.0).round(), 182.0);
        assert!(parse_hex_color("32CCB6").is_err());
        assert!(parse_hex_color("#32CCB").is_err());
        assert!(parse_hex_color("#GGGGGG").is_err());
    }

    #[test]
    fn node_box_is_centered_on_kgml_position() {
        let node = node_box(NodeId(0), &seed("100", "50", "46", "17"), Shape::Rectangle).unwrap();
        assert_eq!(
            node.bbox,
            BBox {
                x: 77.0,
                y: 41.5,
                w: 46.0,
                h: 17.0
            }
        );
        assert!(node_box(NodeId(0), &seed("a", "50", "46", "17"), Shape::Rectangle).is_err());
    }

    #[test]
    fn bounds_ignore_line_graphics() {
        let nodes = vec![
            node_box(NodeId(0), &seed("10", "10", "4", "4"), Shape::Circle).unwrap(),
            node_box(NodeId(1), &seed("1000", "1000", "0", "0"), Shape::Line).unwrap(),
            node_box(NodeId(2), &seed("30", "20", "10", "10"), Shape::Rectangle).unwrap(),
        ];
        let bounds = compute_bounds(&nodes).unwrap();
        assert_eq!(
            bounds,
            Bounds {
                min_x: 8.0,
                max_x: 35.0,
                min_y: 8.0,
                max_y: 25.0
            }
        );
        assert!(compute_bounds(&nodes[1..2]).is_err());
    }

    #[test]
    fn edges_stop_at_target_border() {
        let target = Transform::new(0.0, 0.0, 100.0, 100.0, 100.0, 100.0).rect(BBox {
            x: 40.0,
            y: 0.0,
            w: 20.0,
            h: 10.0,
        });
        let end = clip_to_rect(Point { x: 0.0, y: 5.0 }, target);
        assert_eq!(end, Point { x: 40.0, y: 5.0 });
    }

    #[test]
    fn node_rects_are_keyed_by_node_id() {
        let nodes = vec![
            node_box(NodeId(4), &seed("10", "10", "4", "4"), Shape::Circle).unwrap(),
            node_box(NodeId(9), &seed("30", "20", "10", "10"), Shape::Rectangle).unwrap(),
        ];
        let transform = Transform::new(0.0, 0.0, 100.0, 100.0, 100.0, 100.0);
        let rects = node_rects(&transform, &nodes);
        assert_eq!(rects.len(), 2);
        assert_eq!(rects[&NodeId(9)].center, Point { x: 30.0, y: 20.0 });
        assert_eq!(rects[&NodeId(4)].x0, 8.0);
        assert!(!rects.contains_key(&NodeId(0)));
    }

    #[test]
    fn shapes_from_kgml() {
        assert_eq!(Shape::from_kgml("circle"), Shape::Circle);
        assert_eq!(Shape::from_kgml("roundrectangle"), Shape::RoundRectangle);
        assert_eq!(Shape::from_kgml("line"), Shape::Line);
        assert_eq!(Shape::from_kgml("rectangle"), Shape::Rectangle);
        assert_eq!(Shape::from_kgml("ellipse"), Shape::Rectangle);
    }

    #[test]
    fn svg_path_replaces_extension() {
        assert_eq!(
            default_svg_output_path(Path::new("out/hsa00010.png")),
            PathBuf::from("out/hsa00010.svg")
        );
    }
}
