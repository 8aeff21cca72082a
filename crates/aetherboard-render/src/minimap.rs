//! Minimap drawing.

use crate::display_list::{DisplayList, rect_path};
use aetherboard_core::minimap::{MinimapLayout, VIEWPORT_COLOR, VIEWPORT_STROKE_WIDTH};
use kurbo::Affine;

/// Record the minimap: background, one box per object, then the viewport
/// outline on top.
pub fn minimap_display_list(layout: &MinimapLayout) -> DisplayList {
    let mut list = DisplayList::with_surface(layout.size, layout.background.into());
    for item in &layout.items {
        list.fill(&rect_path(item.rect), Affine::IDENTITY, item.color.into());
    }
    list.stroke(
        &rect_path(layout.viewport),
        Affine::IDENTITY,
        VIEWPORT_STROKE_WIDTH,
        VIEWPORT_COLOR.into(),
    );
    list
}
