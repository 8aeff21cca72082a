//! Group shape for combining multiple shapes.

use super::{Geometry, Shape, ShapeId};
use kurbo::{BezPath, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// A group of shapes that moves, flips and rotates as a single unit.
/// Groups can contain other groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// Children in back-to-front order.
    pub children: Vec<Shape>,
}

impl Group {
    pub fn new(children: Vec<Shape>) -> Self {
        Self { children }
    }

    pub fn children(&self) -> &[Shape] {
        &self.children
    }

    /// Ids of every descendant, depth first.
    pub fn all_shape_ids(&self) -> Vec<ShapeId> {
        let mut ids = Vec::new();
        for child in &self.children {
            ids.push(child.id());
            if let Some(group) = child.as_group() {
                ids.extend(group.all_shape_ids());
            }
        }
        ids
    }

    /// Find a descendant by id.
    pub fn find_shape(&self, id: ShapeId) -> Option<&Shape> {
        self.children.iter().find_map(|child| {
            if child.id() == id {
                Some(child)
            } else {
                child.as_group().and_then(|g| g.find_shape(id))
            }
        })
    }
}

impl Geometry for Group {
    fn bounds(&self) -> Rect {
        self.children
            .iter()
            .map(Shape::bounds)
            .reduce(|acc, b| acc.union(b))
            .unwrap_or(Rect::ZERO)
    }

    fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        for child in &self.children {
            path.extend(child.visual_path());
        }
        path
    }

    fn translate(&mut self, delta: Vec2) {
        for child in &mut self.children {
            child.translate(delta);
        }
    }
}
