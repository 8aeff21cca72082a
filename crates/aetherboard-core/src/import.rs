//! Raster image import.

use crate::shapes::{Image, ImageFormat, Shape};
use crate::viewport::Viewport;
use kurbo::Point;
use log::info;
use std::io::Cursor;
use thiserror::Error;

/// Longest side of an imported image, in logical pixels.
pub const MAX_IMPORT_SIDE: f64 = 400.0;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("unsupported image format")]
    UnsupportedFormat,
    #[error("image has no pixels")]
    Empty,
    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Read the pixel size of encoded image bytes without decoding them fully.
pub fn image_dimensions(bytes: &[u8]) -> Result<(ImageFormat, u32, u32), ImportError> {
    let format = ImageFormat::from_magic_bytes(bytes).ok_or(ImportError::UnsupportedFormat)?;
    let (width, height) = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_dimensions()?;
    if width == 0 || height == 0 {
        return Err(ImportError::Empty);
    }
    Ok((format, width, height))
}

/// Build an image object centered in the visible area, scaled down so its
/// longest side is at most [`MAX_IMPORT_SIDE`].
pub fn import_image(bytes: &[u8], viewport: &Viewport) -> Result<Shape, ImportError> {
    let (format, width, height) = image_dimensions(bytes)?;
    let image = Image::new(Point::ZERO, bytes, width, height, format).limit_longest_side(MAX_IMPORT_SIDE);
    let center = viewport.visible_rect().center();
    let position = Point::new(center.x - image.width / 2.0, center.y - image.height / 2.0);
    info!("imported {}x{} {:?} image", width, height, format);
    Ok(Shape::new(Image { position, ..image }))
}
