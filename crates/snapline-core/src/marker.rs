//! Snap markers: the renderable result of a successful match.

use crate::geometry::{Axis, Bounds, EPSILON, Line};
use crate::magnet::Magnet;
use std::fmt;
use std::rc::Rc;

/// A guide line to show for a match between a source and a target magnet.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapMarker {
    /// Line to render.
    pub line: Line,
    pub self_magnet: Magnet,
    /// Copy of the matched magnet, possibly carrying extra measurement pairs.
    pub matching_magnet: Magnet,
}

impl SnapMarker {
    pub fn new(line: Line, self_magnet: Magnet, matching_magnet: Magnet) -> Self {
        Self {
            line,
            self_magnet,
            matching_magnet,
        }
    }

    /// Whether the matched line still lies on an edge or centerline of `bounds`.
    pub fn touches(&self, bounds: &Bounds) -> bool {
        let axis = self.matching_magnet.axis;
        let position = self.matching_magnet.position();
        let (near, size) = match axis {
            Axis::H => (bounds.y, bounds.h),
            Axis::V => (bounds.x, bounds.w),
        };
        [near, near + size / 2.0, near + size]
            .iter()
            .any(|edge| (edge - position).abs() < EPSILON)
    }
}

type Listener = Rc<dyn Fn(&[SnapMarker])>;

/// The last computed markers of a diagram, for the UI layer to read.
///
/// Owned by the diagram; `set` and `clear` notify subscribed listeners.
#[derive(Clone, Default)]
pub struct SnapMarkers {
    markers: Vec<SnapMarker>,
    listeners: Vec<Listener>,
}

impl fmt::Debug for SnapMarkers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapMarkers")
            .field("markers", &self.markers)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl SnapMarkers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> &[SnapMarker] {
        &self.markers
    }

    /// Replace the markers and notify listeners.
    pub fn set(&mut self, markers: Vec<SnapMarker>) {
        self.markers = markers;
        self.notify();
    }

    /// Remove all markers and notify listeners.
    pub fn clear(&mut self) {
        self.markers.clear();
        self.notify();
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn subscribe(&mut self, listener: impl Fn(&[SnapMarker]) + 'static) {
        self.listeners.push(Rc::new(listener));
    }

    fn notify(&self) {
        for listener in &self.listeners {
            listener(&self.markers);
        }
    }
}
