//! CPU rasterization of display lists and PNG encoding.
//!
//! Paths are flattened and filled with the nonzero rule using a few
//! sub-scanlines per pixel row plus exact horizontal span coverage, which is
//! plenty for export-quality antialiasing.

use crate::display_list::{DisplayList, DrawCommand};
use crate::renderer::{RenderContext, RenderResult, Renderer};
use crate::text::TextShaper;
use aetherboard_core::export::{ExportError, RasterExporter};
use aetherboard_core::scene::Scene;
use aetherboard_core::viewport::Viewport;
use image::RgbaImage;
use kurbo::{Affine, BezPath, Cap, Join, PathEl, Point, Rect, Stroke, StrokeOpts};
use log::debug;
use peniko::Color;

/// Flattening tolerance in device pixels.
const TOLERANCE: f64 = 0.1;
/// Sub-scanlines sampled per pixel row.
const SUBSAMPLES: usize = 4;

#[derive(Debug, Clone, Copy)]
struct Edge {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    winding: i32,
}

/// An RGBA8 pixel buffer (straight alpha).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pixmap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Pixmap {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Pixel at (x, y) as `[r, g, b, a]`; `None` out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]])
    }

    /// Overwrite every pixel.
    pub fn clear(&mut self, color: Color) {
        let c = color.to_rgba8();
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&[c.r, c.g, c.b, c.a]);
        }
    }

    /// Source-over blend of `color` at `coverage` into one pixel.
    fn blend(&mut self, x: usize, y: usize, color: [u8; 4], coverage: f64) {
        let sa = color[3] as f64 / 255.0 * coverage.clamp(0.0, 1.0);
        if sa <= 0.0 {
            return;
        }
        let i = (y * self.width as usize + x) * 4;
        let da = self.data[i + 3] as f64 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        for c in 0..3 {
            let src = color[c] as f64;
            let dst = self.data[i + c] as f64;
            self.data[i + c] = ((src * sa + dst * da * (1.0 - sa)) / out_a).round() as u8;
        }
        self.data[i + 3] = (out_a * 255.0).round() as u8;
    }

    /// Fill a device-space path with the nonzero rule.
    pub fn fill_path(&mut self, path: &BezPath, color: Color) {
        let edges = flatten_edges(path);
        if edges.is_empty() || self.width == 0 || self.height == 0 {
            return;
        }
        let rgba = color.to_rgba8();
        let rgba = [rgba.r, rgba.g, rgba.b, rgba.a];

        let (min_y, max_y) = edges.iter().fold((f64::MAX, f64::MIN), |(lo, hi), e| {
            (lo.min(e.y0).min(e.y1), hi.max(e.y0).max(e.y1))
        });
        let first_row = min_y.floor().max(0.0) as usize;
        let last_row = (max_y.ceil().min(self.height as f64) as usize).min(self.height as usize);

        let width = self.width as usize;
        let mut coverage = vec![0.0f64; width + 1];
        let mut crossings: Vec<(f64, i32)> = Vec::new();
        let weight = 1.0 / SUBSAMPLES as f64;

        for row in first_row..last_row {
            coverage.iter_mut().for_each(|c| *c = 0.0);
            for sub in 0..SUBSAMPLES {
                let y = row as f64 + (sub as f64 + 0.5) * weight;
                crossings.clear();
                for e in &edges {
                    let (top, bottom) = (e.y0.min(e.y1), e.y0.max(e.y1));
                    if y < top || y >= bottom {
                        continue;
                    }
                    let t = (y - e.y0) / (e.y1 - e.y0);
                    crossings.push((e.x0 + t * (e.x1 - e.x0), e.winding));
                }
                crossings.sort_by(|a, b| a.0.total_cmp(&b.0));
                let mut winding = 0;
                for pair in crossings.windows(2) {
                    winding += pair[0].1;
                    if winding != 0 {
                        add_span(&mut coverage, pair[0].0, pair[1].0, weight);
                    }
                }
            }
            for (x, &c) in coverage.iter().take(width).enumerate() {
                if c > 0.0 {
                    self.blend(x, row, rgba, c);
                }
            }
        }
    }

    /// Stroke a local-space path with round caps and joins, then map it
    /// through `transform`.
    pub fn stroke_path(&mut self, path: &BezPath, transform: Affine, width: f64, color: Color) {
        let style = Stroke::new(width).with_caps(Cap::Round).with_join(Join::Round);
        let tolerance = TOLERANCE / transform.determinant().abs().sqrt().max(1e-6);
        let mut outline = kurbo::stroke(path.iter(), &style, &StrokeOpts::default(), tolerance);
        outline.apply_affine(transform);
        self.fill_path(&outline, color);
    }

    /// Draw image pixels mapped through `transform` (nearest sampling).
    pub fn draw_image(&mut self, pixels: &RgbaImage, transform: Affine, opacity: f64) {
        let source = Rect::new(0.0, 0.0, pixels.width() as f64, pixels.height() as f64);
        let bounds = transform.transform_rect_bbox(source);
        let inverse = transform.inverse();
        let x_range = bounds.x0.floor().max(0.0) as u32..(bounds.x1.ceil().max(0.0) as u32).min(self.width);
        let y_range = bounds.y0.floor().max(0.0) as u32..(bounds.y1.ceil().max(0.0) as u32).min(self.height);
        for y in y_range {
            for x in x_range.clone() {
                let p = inverse * Point::new(x as f64 + 0.5, y as f64 + 0.5);
                if !source.contains(p) {
                    continue;
                }
                let texel = pixels.get_pixel(p.x as u32, p.y as u32).0;
                self.blend(x as usize, y as usize, texel, opacity);
            }
        }
    }

    /// Replay a display list on top of the background color.
    pub fn render(&mut self, list: &DisplayList) {
        self.clear(list.background());
        let mut shaper: Option<TextShaper> = None;
        for command in list.commands() {
            match command {
                DrawCommand::Fill { path, color } => self.fill_path(path, *color),
                DrawCommand::Stroke {
                    path,
                    transform,
                    width,
                    color,
                } => self.stroke_path(path, *transform, *width, *color),
                DrawCommand::Text {
                    transform,
                    lines,
                    font_size,
                    color,
                } => {
                    let shaper = shaper.get_or_insert_with(TextShaper::new);
                    let mut glyphs = BezPath::new();
                    for (baseline, line) in lines {
                        shaper.append_line(&mut glyphs, line, *baseline, *font_size);
                    }
                    glyphs.apply_affine(*transform);
                    self.fill_path(&glyphs, *color);
                }
                DrawCommand::Image {
                    transform,
                    pixels,
                    opacity,
                } => self.draw_image(pixels, *transform, *opacity),
            }
        }
    }

    pub fn encode_png(&self) -> RenderResult<Vec<u8>> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, self.width, self.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(&self.data)?;
        }
        Ok(out)
    }
}

/// Rasterize a display list at its own surface size.
pub fn rasterize(list: &DisplayList) -> Pixmap {
    let size = list.size();
    let mut pixmap = Pixmap::new(size.width.round().max(0.0) as u32, size.height.round().max(0.0) as u32);
    pixmap.render(list);
    pixmap
}

fn flatten_edges(path: &BezPath) -> Vec<Edge> {
    let mut edges = Vec::new();
    let mut start = Point::ZERO;
    let mut last = Point::ZERO;
    kurbo::flatten(path.iter(), TOLERANCE, |el| match el {
        PathEl::MoveTo(p) => {
            // Implicitly close the previous subpath.
            push_edge(&mut edges, last, start);
            start = p;
            last = p;
        }
        PathEl::LineTo(p) => {
            push_edge(&mut edges, last, p);
            last = p;
        }
        PathEl::ClosePath => {
            push_edge(&mut edges, last, start);
            last = start;
        }
        _ => {}
    });
    push_edge(&mut edges, last, start);
    edges
}

fn push_edge(edges: &mut Vec<Edge>, a: Point, b: Point) {
    if a.y != b.y {
        edges.push(Edge {
            x0: a.x,
            y0: a.y,
            x1: b.x,
            y1: b.y,
            winding: if b.y > a.y { 1 } else { -1 },
        });
    }
}

/// Add `weight` of coverage over `[x0, x1)` with fractional end pixels.
fn add_span(coverage: &mut [f64], x0: f64, x1: f64, weight: f64) {
    let width = coverage.len() - 1;
    let x0 = x0.clamp(0.0, width as f64);
    let x1 = x1.clamp(0.0, width as f64);
    if x1 <= x0 {
        return;
    }
    let (i0, i1) = (x0.floor() as usize, x1.floor() as usize);
    if i0 == i1 {
        coverage[i0] += (x1 - x0) * weight;
        return;
    }
    coverage[i0] += (i0 as f64 + 1.0 - x0) * weight;
    for c in &mut coverage[i0 + 1..i1] {
        *c += weight;
    }
    coverage[i1] += (x1 - i1 as f64) * weight;
}

/// PNG export through the CPU rasterizer.
#[derive(Debug, Default, Clone, Copy)]
pub struct PngExporter;

impl PngExporter {
    pub fn render(&self, scene: &Scene, viewport: &Viewport, scale: f64) -> Pixmap {
        let mut list = DisplayList::new();
        list.build_scene(&RenderContext::for_export(scene, viewport, scale));
        let pixmap = rasterize(&list);
        debug!("rasterized {}x{} export", pixmap.width(), pixmap.height());
        pixmap
    }
}

impl RasterExporter for PngExporter {
    fn export_png(&self, scene: &Scene, viewport: &Viewport, scale: f64) -> Result<Vec<u8>, ExportError> {
        self.render(scene, viewport, scale)
            .encode_png()
            .map_err(|e| ExportError::Raster(e.to_string()))
    }
}
