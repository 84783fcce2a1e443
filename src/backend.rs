// Plotters backend: turns a recorded Scene into a PNG or SVG file

use crate::layout::Point;
use crate::scene::{DrawCommand, EdgeStyle, LabelStyle, NodeStyle, Rgb, Scene};
use crate::{OutputFormat, RenderOptions};
use anyhow::{anyhow, Context, Result};
use image::ImageEncoder;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Padding kept around the drawing when cropping, in inches
const TIGHT_PAD_INCHES: f64 = 0.1;

/// Extra room around the outermost markers, in pixels
const PLOT_MARGIN_PX: f64 = 10.0;

/// Export a scene to `path`, picking the format from its extension
pub fn export(scene: &Scene, path: &Path, options: &RenderOptions) -> Result<()> {
    let format = OutputFormat::from_path(path)?;
    debug!(path = %path.display(), ?format, "exporting figure");
    match format {
        OutputFormat::Png => {
            let bytes = render_png(scene, options.tight)?;
            fs::write(path, bytes)
                .with_context(|| format!("Failed to write {}", path.display()))
        }
        OutputFormat::Svg => {
            let svg = render_svg(scene, options.tight)?;
            fs::write(path, svg).with_context(|| format!("Failed to write {}", path.display()))
        }
    }
}

/// Draw the scene into an RGB buffer and encode it as PNG
pub fn render_png(scene: &Scene, tight: bool) -> Result<Vec<u8>> {
    let (width, height) = scene.pixel_size();
    let mut buffer = vec![0u8; (width as usize) * (height as usize) * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        draw_scene(&root, scene)?;
        root.present().context("Failed to present drawing")?;
    }

    let img = image::RgbImage::from_raw(width, height, buffer)
        .ok_or_else(|| anyhow!("Pixel buffer does not match {}x{}", width, height))?;
    let img = if tight {
        let pad = (TIGHT_PAD_INCHES * scene.dpi as f64).round() as u32;
        crop_to_content(img, Rgb::WHITE, pad)
    } else {
        img
    };

    let mut png_bytes = Vec::new();
    {
        let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
        encoder
            .write_image(img.as_raw(), img.width(), img.height(), image::ColorType::Rgb8)
            .context("Failed to encode PNG")?;
    }

    Ok(png_bytes)
}

/// Draw the scene as an SVG document.
///
/// With `tight`, the document's size and `viewBox` shrink to the content
/// bounds plus the usual pad.
pub fn render_svg(scene: &Scene, tight: bool) -> Result<String> {
    let size = scene.pixel_size();
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        draw_scene(&root, scene)?;
        root.present().context("Failed to present drawing")?;
    }
    if !tight {
        return Ok(svg);
    }
    match content_bounds(scene) {
        Some(bounds) => {
            let pad = TIGHT_PAD_INCHES * scene.dpi as f64;
            Ok(crop_svg(svg, size, bounds.padded(pad, size)))
        }
        None => Ok(svg),
    }
}

/// Pixel rectangle, `x0 <= x1`, `y0 <= y1`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Bounds {
    fn around(x: f64, y: f64, half_w: f64, half_h: f64) -> Self {
        Self {
            x0: x - half_w,
            y0: y - half_h,
            x1: x + half_w,
            y1: y + half_h,
        }
    }

    fn union(self, other: Bounds) -> Bounds {
        Bounds {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Grow by `pad` and clamp to a `size` figure
    fn padded(self, pad: f64, size: (u32, u32)) -> Bounds {
        Bounds {
            x0: (self.x0 - pad).max(0.0),
            y0: (self.y0 - pad).max(0.0),
            x1: (self.x1 + pad).min(size.0 as f64),
            y1: (self.y1 + pad).min(size.1 as f64),
        }
    }
}

/// Average glyph advance as a fraction of the font size
const GLYPH_WIDTH_EM: f64 = 0.6;

/// Where the scene draws, estimated from geometry; text extents use an
/// average glyph width since the vector backend never measures fonts.
pub fn content_bounds(scene: &Scene) -> Option<Bounds> {
    let (title_band, viewport) = plot_geometry(scene);
    let (width, height) = scene.pixel_size();
    let (width, height) = (width as f64, height as f64);
    let mut bounds: Option<Bounds> = None;
    let mut add = |b: Bounds| {
        bounds = Some(match bounds {
            Some(acc) => acc.union(b),
            None => b,
        });
    };

    if let Some(title) = &scene.title {
        let font_px = scene.pt_to_px(title.size);
        let text_w = title.text.chars().count() as f64 * font_px * GLYPH_WIDTH_EM;
        add(Bounds::around(width / 2.0, title_band / 2.0, text_w / 2.0, font_px / 2.0));
    }

    if scene.axis_visible {
        add(Bounds {
            x0: PLOT_MARGIN_PX,
            y0: title_band + PLOT_MARGIN_PX,
            x1: width - PLOT_MARGIN_PX,
            y1: height - PLOT_MARGIN_PX,
        });
    }

    for command in &scene.commands {
        match command {
            DrawCommand::DrawNodes { points, style } => {
                let r = scene.marker_radius_px(style.size);
                for &p in points {
                    let (x, y) = viewport.to_pixel(p);
                    add(Bounds::around(x, y, r, r));
                }
            }
            DrawCommand::DrawEdges { segments, style } => {
                let r = scene.marker_radius_px(style.node_size);
                for &(from, to) in segments {
                    let (x0, y0) = viewport.to_pixel(from);
                    let (x1, y1) = viewport.to_pixel(to);
                    add(Bounds::around(x0, y0, r, r).union(Bounds::around(x1, y1, r, r)));
                    if from == to {
                        // self-loop ring above the marker
                        add(Bounds::around(x0, y0 - r, r / 2.0, r / 2.0 + 1.0));
                    }
                }
            }
            DrawCommand::DrawLabels { labels, style } => {
                let font_px = scene.pt_to_px(style.font_size);
                for (text, p) in labels {
                    let (x, y) = viewport.to_pixel(*p);
                    let text_w = text.chars().count() as f64 * font_px * GLYPH_WIDTH_EM;
                    add(Bounds::around(x, y, text_w / 2.0, font_px / 2.0));
                }
            }
        }
    }

    bounds
}

/// Rewrite the root element's size and `viewBox` to `bounds`
fn crop_svg(svg: String, size: (u32, u32), bounds: Bounds) -> String {
    let full_view = format!("viewBox=\"0 0 {} {}\"", size.0, size.1);
    if !svg.contains(&full_view) {
        debug!("svg root has no full-size viewBox, leaving it uncropped");
        return svg;
    }

    let x0 = bounds.x0.round() as i64;
    let y0 = bounds.y0.round() as i64;
    let w = (bounds.x1.round() as i64 - x0).max(1);
    let h = (bounds.y1.round() as i64 - y0).max(1);

    svg.replacen(
        &format!("width=\"{}\"", size.0),
        &format!("width=\"{}\"", w),
        1,
    )
    .replacen(
        &format!("height=\"{}\"", size.1),
        &format!("height=\"{}\"", h),
        1,
    )
    .replacen(
        &full_view,
        &format!("viewBox=\"{} {} {} {}\"", x0, y0, w, h),
        1,
    )
}

/// Crop to the bounding box of pixels that differ from `background`, plus `pad`
pub fn crop_to_content(img: image::RgbImage, background: Rgb, pad: u32) -> image::RgbImage {
    let bg = image::Rgb([background.0, background.1, background.2]);
    let (mut min_x, mut min_y) = (u32::MAX, u32::MAX);
    let (mut max_x, mut max_y) = (0u32, 0u32);
    let mut found = false;

    for (x, y, px) in img.enumerate_pixels() {
        if *px != bg {
            found = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }

    if !found {
        return img;
    }

    let x0 = min_x.saturating_sub(pad);
    let y0 = min_y.saturating_sub(pad);
    let x1 = (max_x + pad).min(img.width() - 1);
    let y1 = (max_y + pad).min(img.height() - 1);
    image::imageops::crop_imm(&img, x0, y0, x1 - x0 + 1, y1 - y0 + 1).to_image()
}

fn to_color(rgb: Rgb) -> RGBColor {
    RGBColor(rgb.0, rgb.1, rgb.2)
}

/// Maps layout space ([-1, 1] on both axes, y up) onto a pixel rectangle
#[derive(Debug, Clone, Copy)]
struct Viewport {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

impl Viewport {
    fn to_pixel(&self, p: Point) -> (f64, f64) {
        (
            self.left + (p.x + 1.0) / 2.0 * self.width,
            self.top + (1.0 - (p.y + 1.0) / 2.0) * self.height,
        )
    }
}

/// Height of the title band and the rectangle layout space maps onto
fn plot_geometry(scene: &Scene) -> (f64, Viewport) {
    let (width, height) = scene.pixel_size();
    let (width, height) = (width as f64, height as f64);
    // title band along the top edge
    let title_band = scene
        .title
        .as_ref()
        .map_or(0.0, |title| scene.pt_to_px(title.size) * 1.6);

    let inset = scene.max_marker_radius_px() + PLOT_MARGIN_PX;
    let viewport = Viewport {
        left: inset,
        top: title_band + inset,
        width: (width - 2.0 * inset).max(1.0),
        height: (height - title_band - 2.0 * inset).max(1.0),
    };
    (title_band, viewport)
}

fn draw_scene<DB>(root: &DrawingArea<DB, Shift>, scene: &Scene) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE).context("Failed to fill background")?;

    let (width, height) = scene.pixel_size();
    let (width, height) = (width as f64, height as f64);
    let (title_band, viewport) = plot_geometry(scene);

    if let Some(title) = &scene.title {
        let font_px = scene.pt_to_px(title.size);
        let style = ("sans-serif", font_px)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Center));
        root.draw(&Text::new(
            title.text.clone(),
            ((width / 2.0) as i32, (title_band / 2.0) as i32),
            style,
        ))
        .context("Failed to draw title")?;
    }

    if scene.axis_visible {
        root.draw(&Rectangle::new(
            [
                (PLOT_MARGIN_PX as i32, (title_band + PLOT_MARGIN_PX) as i32),
                (
                    (width - PLOT_MARGIN_PX) as i32,
                    (height - PLOT_MARGIN_PX) as i32,
                ),
            ],
            BLACK.stroke_width(1),
        ))
        .context("Failed to draw axes frame")?;
    }

    for command in &scene.commands {
        match command {
            DrawCommand::DrawNodes { points, style } => {
                draw_nodes(root, scene, &viewport, points, style)?
            }
            DrawCommand::DrawEdges { segments, style } => {
                draw_edges(root, scene, &viewport, segments, style)?
            }
            DrawCommand::DrawLabels { labels, style } => {
                draw_labels(root, scene, &viewport, labels, style)?
            }
        }
    }

    Ok(())
}

fn draw_nodes<DB>(
    root: &DrawingArea<DB, Shift>,
    scene: &Scene,
    viewport: &Viewport,
    points: &[Point],
    style: &NodeStyle,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let radius = scene.marker_radius_px(style.size).round() as i32;
    let color = to_color(style.color);
    for &p in points {
        let (x, y) = viewport.to_pixel(p);
        root.draw(&Circle::new((x as i32, y as i32), radius, color.filled()))
            .context("Failed to draw node")?;
    }
    Ok(())
}

fn draw_edges<DB>(
    root: &DrawingArea<DB, Shift>,
    scene: &Scene,
    viewport: &Viewport,
    segments: &[(Point, Point)],
    style: &EdgeStyle,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let color = to_color(style.color);
    let stroke = scene.pt_to_px(style.width).round().max(1.0) as u32;
    let shrink = scene.marker_radius_px(style.node_size);
    let arrow = scene.pt_to_px(style.arrow_size);
    // proportions of an open "->" arrowhead
    let head_length = 0.4 * arrow;
    let head_half_width = 0.2 * arrow;

    for &(from, to) in segments {
        let (x0, y0) = viewport.to_pixel(from);
        let (x1, y1) = viewport.to_pixel(to);
        let (dx, dy) = (x1 - x0, y1 - y0);
        let len = (dx * dx + dy * dy).sqrt();

        if len < 1e-6 {
            // self-loop: small ring sitting on top of the marker
            let r = (shrink / 2.0).max(1.0);
            root.draw(&Circle::new(
                (x0 as i32, (y0 - shrink) as i32),
                r as i32,
                color.stroke_width(stroke),
            ))
            .context("Failed to draw self-loop")?;
            continue;
        }
        if len <= 2.0 * shrink {
            // markers overlap, nothing visible to draw
            continue;
        }

        let (ux, uy) = (dx / len, dy / len);
        let start = (x0 + ux * shrink, y0 + uy * shrink);
        let tip = (x1 - ux * shrink, y1 - uy * shrink);

        root.draw(&PathElement::new(
            vec![
                (start.0 as i32, start.1 as i32),
                (tip.0 as i32, tip.1 as i32),
            ],
            color.stroke_width(stroke),
        ))
        .context("Failed to draw edge")?;

        let base = (tip.0 - ux * head_length, tip.1 - uy * head_length);
        let (px, py) = (-uy * head_half_width, ux * head_half_width);
        root.draw(&PathElement::new(
            vec![
                ((base.0 + px) as i32, (base.1 + py) as i32),
                (tip.0 as i32, tip.1 as i32),
                ((base.0 - px) as i32, (base.1 - py) as i32),
            ],
            color.stroke_width(stroke),
        ))
        .context("Failed to draw arrowhead")?;
    }
    Ok(())
}

fn draw_labels<DB>(
    root: &DrawingArea<DB, Shift>,
    scene: &Scene,
    viewport: &Viewport,
    labels: &[(String, Point)],
    style: &LabelStyle,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let font_px = scene.pt_to_px(style.font_size);
    let color = to_color(style.color);
    for (text, p) in labels {
        let (x, y) = viewport.to_pixel(*p);
        let text_style = (style.family.as_str(), font_px)
            .into_font()
            .color(&color)
            .pos(Pos::new(HPos::Center, VPos::Center));
        root.draw(&Text::new(text.clone(), (x as i32, y as i32), text_style))
            .context("Failed to draw label")?;
    }
    Ok(())
}
