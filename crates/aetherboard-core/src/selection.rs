//! Current selection, tracked by the session rather than the shapes.

use crate::shapes::ShapeId;

/// Nothing, one object, or a multi-object active selection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    None,
    Single(ShapeId),
    /// Two or more objects, in z-order.
    Multi(Vec<ShapeId>),
}

impl Selection {
    /// Normalize a list of ids: empty → `None`, one → `Single`. Repeated
    /// ids keep their first position.
    pub fn from_ids(ids: Vec<ShapeId>) -> Self {
        let mut unique = Vec::with_capacity(ids.len());
        for id in ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        match unique.len() {
            0 => Selection::None,
            1 => Selection::Single(unique[0]),
            _ => Selection::Multi(unique),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Selection::None)
    }

    pub fn is_multi(&self) -> bool {
        matches!(self, Selection::Multi(_))
    }

    pub fn len(&self) -> usize {
        match self {
            Selection::None => 0,
            Selection::Single(_) => 1,
            Selection::Multi(ids) => ids.len(),
        }
    }

    pub fn ids(&self) -> Vec<ShapeId> {
        match self {
            Selection::None => Vec::new(),
            Selection::Single(id) => vec![*id],
            Selection::Multi(ids) => ids.clone(),
        }
    }

    /// The selected object when exactly one is selected.
    pub fn single(&self) -> Option<ShapeId> {
        match self {
            Selection::Single(id) => Some(*id),
            _ => None,
        }
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        match self {
            Selection::None => false,
            Selection::Single(s) => *s == id,
            Selection::Multi(ids) => ids.contains(&id),
        }
    }

    /// Add the id if absent, remove it if present (shift-click).
    pub fn toggle(&mut self, id: ShapeId) {
        let mut ids = self.ids();
        if let Some(pos) = ids.iter().position(|s| *s == id) {
            ids.remove(pos);
        } else {
            ids.push(id);
        }
        *self = Selection::from_ids(ids);
    }

    /// Drop ids that no longer exist.
    pub fn retain(&mut self, mut keep: impl FnMut(ShapeId) -> bool) {
        let ids = self.ids().into_iter().filter(|id| keep(*id)).collect();
        *self = Selection::from_ids(ids);
    }

    pub fn clear(&mut self) {
        *self = Selection::None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_from_ids_normalizes() {
        assert_eq!(Selection::from_ids(vec![]), Selection::None);
        let id = Uuid::new_v4();
        assert_eq!(Selection::from_ids(vec![id]), Selection::Single(id));
        let other = Uuid::new_v4();
        assert!(Selection::from_ids(vec![id, other]).is_multi());
    }

    #[test]
    fn test_from_ids_drops_repeats_anywhere() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(Selection::from_ids(vec![a, b, a]), Selection::Multi(vec![a, b]));
        assert_eq!(Selection::from_ids(vec![b, b, b]), Selection::Single(b));
    }

    #[test]
    fn test_toggle() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut selection = Selection::Single(a);
        selection.toggle(b);
        assert_eq!(selection.len(), 2);
        assert!(selection.contains(b));
        selection.toggle(a);
        assert_eq!(selection, Selection::Single(b));
        selection.toggle(b);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_retain() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let mut selection = Selection::Multi(vec![a, b, c]);
        selection.retain(|id| id == c);
        assert_eq!(selection.single(), Some(c));
    }
}
