//! Diagram document: the elements, guides and settings snapping reads from.

use crate::config::SnapConfig;
use crate::error::{DiagramError, DiagramResult};
use crate::geometry::{Axis, Bounds, Line, Range};
use crate::marker::SnapMarkers;
use kurbo::Rect;
use peniko::Color;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Unique identifier for diagram elements.
pub type ElementId = Uuid;

/// Unique identifier for guides.
pub type GuideId = Uuid;

/// Default canvas size for new diagrams.
const DEFAULT_CANVAS: Rect = Rect::new(0.0, 0.0, 1000.0, 1000.0);

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Default guide color.
    pub fn guide() -> Self {
        Self::new(0x3b, 0x82, 0xf6, 255)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// A positioned element with an optional parent group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    pub bounds: Bounds,
    #[serde(default)]
    pub parent: Option<ElementId>,
}

impl Element {
    pub fn new(bounds: Bounds) -> Self {
        Self {
            id: Uuid::new_v4(),
            bounds,
            parent: None,
        }
    }
}

/// A user-placed horizontal or vertical guide line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guide {
    pub id: GuideId,
    pub axis: Axis,
    pub position: f64,
    pub color: SerializableColor,
}

impl Guide {
    pub fn new(axis: Axis, position: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            axis,
            position,
            color: SerializableColor::guide(),
        }
    }

    pub fn color(&self) -> Color {
        self.color.into()
    }

    /// The guide as a line across `canvas`.
    pub fn line(&self, canvas: Rect) -> Line {
        match self.axis {
            Axis::H => Line::horizontal(self.position, Range::new(canvas.x0, canvas.x1)),
            Axis::V => Line::vertical(self.position, Range::new(canvas.y0, canvas.y1)),
        }
    }
}

/// A batch of geometry updates, applied together by [`Diagram::apply`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MutationBatch {
    updates: Vec<(ElementId, Bounds)>,
}

impl MutationBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record new bounds for an element; replaces an earlier update of the same element.
    pub fn update_bounds(&mut self, id: ElementId, bounds: Bounds) {
        match self.updates.iter_mut().find(|(existing, _)| *existing == id) {
            Some(entry) => entry.1 = bounds,
            None => self.updates.push((id, bounds)),
        }
    }

    pub fn get(&self, id: ElementId) -> Option<Bounds> {
        self.updates
            .iter()
            .find(|(existing, _)| *existing == id)
            .map(|(_, bounds)| *bounds)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(ElementId, Bounds)> {
        self.updates.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }
}

/// A diagram containing positioned elements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagram {
    /// Unique diagram identifier.
    pub id: String,
    pub name: String,
    /// Canvas bounds; magnets spanning the diagram span this rectangle.
    pub canvas: Rect,
    elements: HashMap<ElementId, Element>,
    /// Insertion order of elements.
    order: Vec<ElementId>,
    pub guides: Vec<Guide>,
    /// Currently selected element IDs.
    #[serde(default)]
    pub selection: Vec<ElementId>,
    /// Snap configuration; seeded with defaults on first use.
    #[serde(default)]
    pub snap_config: Option<SnapConfig>,
    /// Last computed snap markers.
    #[serde(skip)]
    pub snap_markers: SnapMarkers,
}

impl Default for Diagram {
    fn default() -> Self {
        Self::new()
    }
}

impl Diagram {
    /// Create a new empty diagram.
    pub fn new() -> Self {
        Self::with_canvas(DEFAULT_CANVAS)
    }

    pub fn with_canvas(canvas: Rect) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: "Untitled".to_string(),
            canvas,
            elements: HashMap::new(),
            order: Vec::new(),
            guides: Vec::new(),
            selection: Vec::new(),
            snap_config: None,
            snap_markers: SnapMarkers::new(),
        }
    }

    /// Add a top-level element and return its ID.
    pub fn add_element(&mut self, bounds: Bounds) -> ElementId {
        let element = Element::new(bounds);
        let id = element.id;
        self.order.push(id);
        self.elements.insert(id, element);
        id
    }

    /// Add an element inside `parent`.
    pub fn add_child(&mut self, parent: ElementId, bounds: Bounds) -> DiagramResult<ElementId> {
        if !self.elements.contains_key(&parent) {
            return Err(DiagramError::UnknownParent(parent));
        }
        let id = self.add_element(bounds);
        if let Some(element) = self.elements.get_mut(&id) {
            element.parent = Some(parent);
        }
        Ok(id)
    }

    pub fn add_guide(&mut self, guide: Guide) -> GuideId {
        let id = guide.id;
        self.guides.push(guide);
        id
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    pub fn bounds_of(&self, id: ElementId) -> Option<Bounds> {
        self.elements.get(&id).map(|e| e.bounds)
    }

    /// Elements in insertion order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.order.iter().filter_map(|id| self.elements.get(id))
    }

    pub fn parent_of(&self, id: ElementId) -> Option<ElementId> {
        self.elements.get(&id).and_then(|e| e.parent)
    }

    /// Parent chain of an element, nearest first.
    pub fn ancestors(&self, id: ElementId) -> Vec<ElementId> {
        let mut result = Vec::new();
        let mut current = self.parent_of(id);
        while let Some(parent) = current {
            if result.contains(&parent) {
                break;
            }
            result.push(parent);
            current = self.parent_of(parent);
        }
        result
    }

    /// Elements whose bounds overlap or touch `rect`, in insertion order.
    pub fn elements_intersecting(&self, rect: Rect) -> Vec<ElementId> {
        let x = Range::new(rect.x0, rect.x1);
        let y = Range::new(rect.y0, rect.y1);
        self.elements()
            .filter(|e| {
                e.bounds.range(Axis::H).intersects(x) && e.bounds.range(Axis::V).intersects(y)
            })
            .map(|e| e.id)
            .collect()
    }

    /// Replace the selection.
    pub fn select(&mut self, ids: &[ElementId]) {
        self.selection = ids.to_vec();
    }

    pub fn is_selected(&self, id: ElementId) -> bool {
        self.selection.contains(&id)
    }

    /// The snap configuration, seeding the defaults when missing.
    pub fn ensure_snap_config(&mut self) -> &SnapConfig {
        self.snap_config.get_or_insert_with(|| {
            log::debug!("Seeding default snap config for diagram {}", self.id);
            SnapConfig::default()
        })
    }

    /// Apply a mutation batch. Returns the number of updated elements.
    ///
    /// Nothing is applied when the batch references an unknown element.
    pub fn apply(&mut self, batch: &MutationBatch) -> DiagramResult<usize> {
        if let Some((id, _)) = batch.iter().find(|(id, _)| !self.elements.contains_key(id)) {
            return Err(DiagramError::UnknownElement(*id));
        }
        for (id, bounds) in batch.iter() {
            if let Some(element) = self.elements.get_mut(id) {
                element.bounds = *bounds;
            }
        }
        Ok(batch.len())
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Serialize the diagram to JSON.
    pub fn to_json(&self) -> DiagramResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize a diagram from JSON, validating its snap configuration.
    pub fn from_json(json: &str) -> DiagramResult<Self> {
        let diagram: Self = serde_json::from_str(json)?;
        if let Some(config) = &diagram.snap_config {
            config.validate()?;
        }
        Ok(diagram)
    }
}
