//! Shape model: diagram elements and the in-memory store that owns them.
//!
//! `DiagramElement` is the single shape primitive (a rounded rectangle) and
//! also the persisted wire shape. `DocStore` keeps elements in insertion
//! order, which is both the draw order and the hit-test priority, and
//! enforces that at most one element carries the `selected` flag.
//!
//! Elements are referred to by `ElementId`, a runtime-only handle that is
//! regenerated whenever elements are loaded. Nothing outside the store holds
//! a reference into the collection.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::camera::Point;
use crate::hit;

/// Runtime identity of a diagram element.
pub type ElementId = Uuid;

/// A placed rounded rectangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramElement {
    /// Runtime handle; not part of the persisted schema.
    #[serde(skip, default = "Uuid::new_v4")]
    pub id: ElementId,
    /// Left edge in logical coordinates.
    pub x: f64,
    /// Top edge in logical coordinates.
    pub y: f64,
    /// Width in logical units. May be negative only while a creation gesture is in flight.
    pub width: f64,
    /// Height in logical units. May be negative only while a creation gesture is in flight.
    pub height: f64,
    /// Radius applied to all four corners.
    #[serde(rename = "cornerRadius", default)]
    pub corner_radius: f64,
    /// Whether this is the selected element.
    #[serde(default)]
    pub selected: bool,
}

impl DiagramElement {
    /// A new, unselected element with square corners.
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            x,
            y,
            width,
            height,
            corner_radius: 0.0,
            selected: false,
        }
    }

    /// Same element with the given corner radius.
    #[must_use]
    pub fn with_corner_radius(mut self, radius: f64) -> Self {
        self.corner_radius = radius;
        self
    }

    /// Canonical form: negative extents are flipped and the origin shifted so
    /// that `(x, y)` is the top-left corner and both extents are non-negative.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let mut out = self.clone();
        if out.width < 0.0 {
            out.width = -out.width;
            out.x -= out.width;
        }
        if out.height < 0.0 {
            out.height = -out.height;
            out.y -= out.height;
        }
        out
    }

    /// Whether `pt` lies strictly inside the bounding box.
    #[must_use]
    pub fn contains(&self, pt: Point) -> bool {
        hit::strictly_inside(pt, self.x, self.y, self.width, self.height)
    }
}

/// Ordered in-memory store of diagram elements.
#[derive(Debug, Default)]
pub struct DocStore {
    elements: Vec<DiagramElement>,
    selected: Option<ElementId>,
}

impl DocStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element on top of the stack and return its id.
    ///
    /// An incoming `selected` flag is honoured by making the element the
    /// current selection.
    pub fn add_element(&mut self, mut element: DiagramElement) -> ElementId {
        let id = element.id;
        let select = element.selected;
        element.selected = false;
        self.elements.push(element);
        if select {
            self.set_selected(Some(id));
        }
        id
    }

    /// The top-most element whose bounding box strictly contains `pt`.
    #[must_use]
    pub fn find_element_at(&self, pt: Point) -> Option<ElementId> {
        self.elements.iter().rev().find(|e| e.contains(pt)).map(|e| e.id)
    }

    /// Make `id` the only selected element, or clear the selection with `None`.
    ///
    /// The previous selection's flag is always cleared first. An id that is
    /// not in the store leaves nothing selected. Returns the resulting selection.
    pub fn set_selected(&mut self, id: Option<ElementId>) -> Option<ElementId> {
        if let Some(prev) = self.selected.take() {
            if let Some(e) = self.get_mut(&prev) {
                e.selected = false;
            }
        }
        let Some(id) = id else {
            return None;
        };
        let e = self.get_mut(&id)?;
        e.selected = true;
        self.selected = Some(id);
        self.selected
    }

    /// Replace the whole collection.
    ///
    /// If several incoming elements are flagged as selected, the last one
    /// keeps the flag.
    pub fn replace_all(&mut self, elements: Vec<DiagramElement>) {
        let flagged = elements.iter().filter(|e| e.selected).count();
        if flagged > 1 {
            warn!(flagged, "multiple selected elements in snapshot; keeping the last");
        }
        self.elements.clear();
        self.selected = None;
        for element in elements {
            self.add_element(element);
        }
    }

    /// Remove an element, returning it if present.
    pub fn remove(&mut self, id: &ElementId) -> Option<DiagramElement> {
        let idx = self.elements.iter().position(|e| e.id == *id)?;
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
        Some(self.elements.remove(idx))
    }

    #[must_use]
    pub fn get(&self, id: &ElementId) -> Option<&DiagramElement> {
        self.elements.iter().find(|e| e.id == *id)
    }

    pub fn get_mut(&mut self, id: &ElementId) -> Option<&mut DiagramElement> {
        self.elements.iter_mut().find(|e| e.id == *id)
    }

    /// The id of the selected element, if any.
    #[must_use]
    pub fn selected_id(&self) -> Option<ElementId> {
        self.selected
    }

    /// The selected element, if any.
    #[must_use]
    pub fn selected(&self) -> Option<&DiagramElement> {
        self.selected.as_ref().and_then(|id| self.get(id))
    }

    /// Elements in insertion (draw) order.
    pub fn iter(&self) -> impl Iterator<Item = &DiagramElement> {
        self.elements.iter()
    }

    /// A copy of every element in insertion order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<DiagramElement> {
        self.elements.clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
