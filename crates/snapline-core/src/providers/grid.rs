//! Grid magnets.

use super::SnapProvider;
use crate::geometry::{Axis, Bounds, Line, Range};
use crate::magnet::{Magnet, MagnetKind, MatchingMagnetPair};
use crate::marker::SnapMarker;
use kurbo::Point;

/// Most grid lines offered per axis for one box.
const MAX_GRID_LINES: i64 = 4096;

/// Magnets on every grid line covering a box.
#[derive(Debug, Clone, Copy)]
pub struct GridSnapProvider {
    grid_size: f64,
}

impl GridSnapProvider {
    pub fn new(grid_size: f64) -> Self {
        Self { grid_size }
    }

    /// Snap a point to the nearest grid intersection.
    pub fn snap_point(point: Point, grid_size: f64) -> Point {
        Point::new(
            (point.x / grid_size).round() * grid_size,
            (point.y / grid_size).round() * grid_size,
        )
    }

    /// Grid lines covering `[from, to]`, widened to whole cells.
    ///
    /// `None` when the span is not finite or needs too many lines.
    fn covered(&self, from: f64, to: f64) -> Option<(i64, i64)> {
        let first = (from / self.grid_size).floor();
        let last = (to / self.grid_size).ceil();
        if !first.is_finite() || !last.is_finite() || last - first > MAX_GRID_LINES as f64 {
            return None;
        }
        Some((first as i64, last as i64))
    }
}

impl SnapProvider for GridSnapProvider {
    fn magnets(&self, bounds: &Bounds) -> Vec<Magnet> {
        let g = self.grid_size;
        if !(g.is_finite() && g > 0.0) {
            log::warn!("Invalid grid size {g}, no grid magnets");
            return Vec::new();
        }
        let (Some((x0, x1)), Some((y0, y1))) = (
            self.covered(bounds.x, bounds.x + bounds.w),
            self.covered(bounds.y, bounds.y + bounds.h),
        ) else {
            log::warn!("Box spans too many grid lines, no grid magnets");
            return Vec::new();
        };
        let x_span = Range::new(x0 as f64 * g, x1 as f64 * g);
        let y_span = Range::new(y0 as f64 * g, y1 as f64 * g);

        let vertical = (x0..=x1).map(|k| {
            Magnet::with_axis(Line::vertical(k as f64 * g, y_span), Axis::V, MagnetKind::Grid)
        });
        let horizontal = (y0..=y1).map(|k| {
            Magnet::with_axis(Line::horizontal(k as f64 * g, x_span), Axis::H, MagnetKind::Grid)
        });
        vertical.chain(horizontal).collect()
    }

    fn mark(&self, bounds: &Bounds, pair: &MatchingMagnetPair, axis: Axis) -> Option<SnapMarker> {
        let line = Line::of_axis(axis, pair.matching.position(), bounds.range(axis));
        Some(SnapMarker::new(
            line,
            pair.self_magnet.clone(),
            pair.matching.clone(),
        ))
    }

    /// A center marker hides edge markers on the same axis.
    fn filter_markers(&self, markers: Vec<SnapMarker>) -> Vec<SnapMarker> {
        let has_center =
            |axis: Axis| markers.iter().any(|m| m.self_magnet.axis == axis && m.self_magnet.is_center());
        let center_axes: Vec<Axis> = Axis::ALL.into_iter().filter(|&a| has_center(a)).collect();
        markers
            .into_iter()
            .filter(|m| m.self_magnet.is_center() || !center_axes.contains(&m.self_magnet.axis))
            .collect()
    }
}
