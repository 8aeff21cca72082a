//! Scene export to JSON and SVG.
//!
//! PNG export needs a rasterizer and lives in the render crate; the format
//! metadata for all three targets is shared here.

use crate::scene::{Scene, SceneError};
use crate::shapes::{SerializableColor, Shape, ShapeKind};
use crate::viewport::Viewport;
use kurbo::{Affine, Rect};
use log::info;
use serde::{Deserialize, Serialize};
use svg::Document;
use svg::node::element::{Group as SvgGroup, Image as SvgImage, Path as SvgPath, Rectangle as SvgRect, Text as SvgText};
use thiserror::Error;

/// Base name of exported files.
pub const EXPORT_BASE_NAME: &str = "whiteboard";
/// Pixel density of PNG exports relative to the viewport.
pub const PNG_EXPORT_SCALE: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Svg,
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Svg => "svg",
            ExportFormat::Json => "json",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Svg => "image/svg+xml",
            ExportFormat::Json => "application/json",
        }
    }

    /// Uppercase label used in messages ("PNG").
    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Png => "PNG",
            ExportFormat::Svg => "SVG",
            ExportFormat::Json => "JSON",
        }
    }

    /// `whiteboard.<ext>`.
    pub fn file_name(&self) -> String {
        format!("{}.{}", EXPORT_BASE_NAME, self.extension())
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ExportFormat::Png),
            "svg" => Some(ExportFormat::Svg),
            "json" => Some(ExportFormat::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error("no rasterizer available for PNG export")]
    RasterUnavailable,
    #[error("failed to rasterize: {0}")]
    Raster(String),
}

/// Produces PNG bytes for the visible viewport. Implemented by renderers.
pub trait RasterExporter {
    fn export_png(&self, scene: &Scene, viewport: &Viewport, scale: f64) -> Result<Vec<u8>, ExportError>;
}

/// An exported document ready to be written or downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub format: ExportFormat,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ExportFile {
    pub fn new(format: ExportFormat, bytes: Vec<u8>) -> Self {
        Self {
            format,
            file_name: format.file_name(),
            bytes,
        }
    }
}

/// Export the scene in any format; PNG goes through `raster`.
pub fn export_scene(
    scene: &Scene,
    viewport: &Viewport,
    format: ExportFormat,
    raster: Option<&dyn RasterExporter>,
) -> Result<ExportFile, ExportError> {
    let bytes = match format {
        ExportFormat::Json => export_json(scene)?.into_bytes(),
        ExportFormat::Svg => export_svg(scene, viewport).into_bytes(),
        ExportFormat::Png => raster
            .ok_or(ExportError::RasterUnavailable)?
            .export_png(scene, viewport, PNG_EXPORT_SCALE)?,
    };
    info!("exported {} ({} bytes)", format.file_name(), bytes.len());
    Ok(ExportFile::new(format, bytes))
}

/// Full scene as JSON, in the same shape as history snapshots.
pub fn export_json(scene: &Scene) -> Result<String, SceneError> {
    scene.to_json_pretty()
}

/// SVG document of what the viewport currently shows.
///
/// The document has the viewport's device size; its view box is the visible
/// logical rectangle, so the output matches the screen. Objects flagged as
/// excluded from export are skipped.
pub fn export_svg(scene: &Scene, viewport: &Viewport) -> String {
    let visible = viewport.visible_rect();
    let mut document = Document::new()
        .set("width", viewport.size.width)
        .set("height", viewport.size.height)
        .set(
            "viewBox",
            (visible.x0, visible.y0, visible.width(), visible.height()),
        );

    let (hex, alpha) = paint(scene.background);
    let mut background = SvgRect::new()
        .set("x", visible.x0)
        .set("y", visible.y0)
        .set("width", visible.width())
        .set("height", visible.height())
        .set("fill", hex);
    if alpha < 1.0 {
        background = background.set("fill-opacity", alpha);
    }
    document = document.add(background);

    for shape in scene.iter().filter(|s| !s.exclude_from_export) {
        document = document.add(shape_to_svg(shape));
    }
    document.to_string()
}

fn paint(color: SerializableColor) -> (String, f64) {
    (
        format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b),
        color.alpha(),
    )
}

fn matrix(affine: Affine) -> String {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    format!("matrix({a} {b} {c} {d} {e} {f})")
}

fn shape_to_svg(shape: &Shape) -> SvgGroup {
    let mut group = SvgGroup::new();
    let transform = shape.render_transform();
    if transform != Affine::IDENTITY {
        group = group.set("transform", matrix(transform));
    }
    if shape.style.opacity < 1.0 {
        group = group.set("opacity", shape.style.opacity);
    }

    match &shape.kind {
        ShapeKind::Group(inner) => {
            for child in inner.children() {
                group = group.add(shape_to_svg(child));
            }
        }
        ShapeKind::Text(text) => {
            let (fill, alpha) = paint(shape.style.fill_color.unwrap_or(SerializableColor::black()));
            for (baseline, line) in text.baselines() {
                let mut node = SvgText::new(line)
                    .set("x", baseline.x)
                    .set("y", baseline.y)
                    .set("font-size", text.font_size)
                    .set("font-family", text.font_family.as_str())
                    .set("fill", fill.as_str())
                    .set("xml:space", "preserve");
                if alpha < 1.0 {
                    node = node.set("fill-opacity", alpha);
                }
                group = group.add(node);
            }
        }
        ShapeKind::Image(image) => {
            group = group.add(
                SvgImage::new()
                    .set("x", image.position.x)
                    .set("y", image.position.y)
                    .set("width", image.width)
                    .set("height", image.height)
                    .set("preserveAspectRatio", "none")
                    .set("href", image.data_url()),
            );
        }
        _ => {
            let mut path = SvgPath::new().set("d", shape.to_path().to_svg());
            match shape.style.fill_color.filter(|_| shape.is_closed()) {
                Some(fill) => {
                    let (hex, alpha) = paint(fill);
                    path = path.set("fill", hex);
                    if alpha < 1.0 {
                        path = path.set("fill-opacity", alpha);
                    }
                }
                None => path = path.set("fill", "none"),
            }
            if shape.style.has_stroke() {
                let (hex, alpha) = paint(shape.style.stroke_color);
                path = path
                    .set("stroke", hex)
                    .set("stroke-width", shape.style.stroke_width)
                    .set("stroke-linecap", "round")
                    .set("stroke-linejoin", "round");
                if alpha < 1.0 {
                    path = path.set("stroke-opacity", alpha);
                }
            }
            group = group.add(path);
        }
    }
    group
}

/// Bounding box of everything that would be exported.
pub fn export_bounds(scene: &Scene) -> Option<Rect> {
    scene
        .iter()
        .filter(|s| !s.exclude_from_export)
        .map(Shape::bounds)
        .reduce(|a, b| a.union(b))
}
