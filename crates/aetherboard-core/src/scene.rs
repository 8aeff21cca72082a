//! Scene graph: the ordered set of committed drawables.

use crate::shapes::{Group, SerializableColor, Shape, ShapeId, ShapeKind};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Light canvas background.
pub const LIGHT_BACKGROUND: SerializableColor = SerializableColor::new(0xFA, 0xFA, 0xFA, 255);
/// Dark canvas background.
pub const DARK_BACKGROUND: SerializableColor = SerializableColor::new(0x1A, 0x1A, 0x1A, 255);

/// Errors from scene (de)serialization.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("failed to serialize scene: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("failed to parse scene: {0}")]
    Deserialize(#[source] serde_json::Error),
}

/// Drawables in back-to-front order plus the canvas background.
///
/// The index of a shape in [`Scene::objects`] is its z-order. The JSON form
/// (`{"objects": [...], "background": ...}`) is used both for history
/// snapshots and for JSON export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    objects: Vec<Shape>,
    pub background: SerializableColor,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(LIGHT_BACKGROUND)
    }
}

impl Scene {
    pub fn new(background: SerializableColor) -> Self {
        Self {
            objects: Vec::new(),
            background,
        }
    }

    /// Serialize to the snapshot format.
    pub fn to_json(&self) -> Result<String, SceneError> {
        serde_json::to_string(self).map_err(SceneError::Serialize)
    }

    /// Human-readable snapshot, used for file export.
    pub fn to_json_pretty(&self) -> Result<String, SceneError> {
        serde_json::to_string_pretty(self).map_err(SceneError::Serialize)
    }

    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        serde_json::from_str(json).map_err(SceneError::Deserialize)
    }

    /// Shapes in z-order (back to front).
    pub fn objects(&self) -> &[Shape] {
        &self.objects
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Shape> {
        self.objects.iter()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Append a shape on top of everything else.
    pub fn add(&mut self, shape: Shape) -> ShapeId {
        let id = shape.id();
        self.objects.push(shape);
        id
    }

    /// Insert a shape at a z-index (clamped to the end).
    pub fn insert(&mut self, index: usize, shape: Shape) -> ShapeId {
        let id = shape.id();
        let index = index.min(self.objects.len());
        self.objects.insert(index, shape);
        id
    }

    pub fn remove(&mut self, id: ShapeId) -> Option<Shape> {
        let index = self.index_of(id)?;
        Some(self.objects.remove(index))
    }

    /// Remove every listed shape; returns the removed shapes in z-order.
    pub fn remove_many(&mut self, ids: &[ShapeId]) -> Vec<Shape> {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.objects)
            .into_iter()
            .partition(|s| ids.contains(&s.id()));
        self.objects = kept;
        removed
    }

    pub fn clear(&mut self) {
        self.objects.clear();
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.objects.iter().find(|s| s.id() == id)
    }

    pub fn get_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.objects.iter_mut().find(|s| s.id() == id)
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        self.index_of(id).is_some()
    }

    /// Z-index of a top-level shape.
    pub fn index_of(&self, id: ShapeId) -> Option<usize> {
        self.objects.iter().position(|s| s.id() == id)
    }

    /// Union of the on-canvas bounds of all shapes; `None` when empty.
    pub fn bounds(&self) -> Option<Rect> {
        self.objects
            .iter()
            .map(Shape::bounds)
            .reduce(|acc, b| acc.union(b))
    }

    /// Union of the on-canvas bounds of the given shapes.
    pub fn bounds_of(&self, ids: &[ShapeId]) -> Option<Rect> {
        self.objects
            .iter()
            .filter(|s| ids.contains(&s.id()))
            .map(Shape::bounds)
            .reduce(|acc, b| acc.union(b))
    }

    /// Topmost selectable shape under a point.
    pub fn shape_at(&self, point: Point, tolerance: f64) -> Option<ShapeId> {
        self.objects
            .iter()
            .rev()
            .find(|s| s.selectable && s.hit_test(point, tolerance))
            .map(Shape::id)
    }

    /// Selectable shapes touching a rectangle, in z-order.
    pub fn shapes_in_rect(&self, rect: Rect) -> Vec<ShapeId> {
        self.objects
            .iter()
            .filter(|s| s.selectable && s.intersects_rect(rect))
            .map(Shape::id)
            .collect()
    }

    /// Ids of every selectable shape, in z-order.
    pub fn selectable_ids(&self) -> Vec<ShapeId> {
        self.objects
            .iter()
            .filter(|s| s.selectable)
            .map(Shape::id)
            .collect()
    }

    pub fn translate(&mut self, ids: &[ShapeId], delta: Vec2) {
        for shape in self.objects.iter_mut().filter(|s| ids.contains(&s.id())) {
            shape.translate(delta);
        }
    }

    /// Move a shape one layer toward the front.
    /// Returns false if it is already frontmost or unknown.
    pub fn bring_forward(&mut self, id: ShapeId) -> bool {
        match self.index_of(id) {
            Some(pos) if pos + 1 < self.objects.len() => {
                self.objects.swap(pos, pos + 1);
                true
            }
            _ => false,
        }
    }

    /// Move a shape one layer toward the back.
    pub fn send_backward(&mut self, id: ShapeId) -> bool {
        match self.index_of(id) {
            Some(pos) if pos > 0 => {
                self.objects.swap(pos, pos - 1);
                true
            }
            _ => false,
        }
    }

    pub fn bring_to_front(&mut self, id: ShapeId) -> bool {
        let Some(pos) = self.index_of(id) else {
            return false;
        };
        let shape = self.objects.remove(pos);
        self.objects.push(shape);
        true
    }

    pub fn send_to_back(&mut self, id: ShapeId) -> bool {
        let Some(pos) = self.index_of(id) else {
            return false;
        };
        let shape = self.objects.remove(pos);
        self.objects.insert(0, shape);
        true
    }

    /// Deep-copy a shape with fresh ids, offset by `offset`, on top of the stack.
    pub fn duplicate(&mut self, id: ShapeId, offset: Vec2) -> Option<ShapeId> {
        let mut copy = self.get(id)?.clone();
        copy.regenerate_id();
        copy.translate(offset);
        Some(self.add(copy))
    }

    /// Replace the given shapes with one group holding them in z-order.
    ///
    /// The group takes the z-position of the frontmost member. Returns
    /// `None` if fewer than two of the ids are in the scene.
    pub fn group(&mut self, ids: &[ShapeId]) -> Option<ShapeId> {
        let positions: Vec<usize> = self
            .objects
            .iter()
            .enumerate()
            .filter(|(_, s)| ids.contains(&s.id()))
            .map(|(i, _)| i)
            .collect();
        let (&front, count) = (positions.last()?, positions.len());
        if count < 2 {
            return None;
        }
        let children = self.remove_many(ids);
        let group = Shape::new(Group::new(children));
        Some(self.insert(front + 1 - count, group))
    }

    /// Dissolve a group, putting its children back at the group's z-position.
    ///
    /// The group's flip and rotation are folded into each child so nothing
    /// moves on screen. Returns the child ids, or `None` if `id` is not a
    /// top-level group.
    pub fn ungroup(&mut self, id: ShapeId) -> Option<Vec<ShapeId>> {
        let index = self.index_of(id)?;
        if !self.objects[index].is_group() {
            return None;
        }
        let group_shape = self.objects.remove(index);
        let parent = group_shape.render_transform();
        let (flip_x, flip_y, rotation) = (group_shape.flip_x, group_shape.flip_y, group_shape.rotation);
        let ShapeKind::Group(group) = group_shape.kind else {
            return None;
        };
        let mut ids = Vec::with_capacity(group.children.len());
        for (offset, mut child) in group.children.into_iter().enumerate() {
            child.bake_parent_transform(parent, flip_x, flip_y, rotation);
            child.selectable = true;
            child.evented = true;
            ids.push(self.insert(index + offset, child));
        }
        Some(ids)
    }
}
