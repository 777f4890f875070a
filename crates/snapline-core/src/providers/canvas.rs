//! Canvas centerline magnets.

use super::SnapProvider;
use crate::geometry::{Axis, Bounds, Line, Range};
use crate::magnet::{Magnet, MagnetKind, MatchingMagnetPair};
use crate::marker::SnapMarker;
use kurbo::Rect;

/// The vertical and horizontal centerline of the canvas.
#[derive(Debug, Clone, Copy)]
pub struct CanvasSnapProvider {
    canvas: Rect,
}

impl CanvasSnapProvider {
    pub fn new(canvas: Rect) -> Self {
        Self { canvas }
    }
}

impl SnapProvider for CanvasSnapProvider {
    fn magnets(&self, _bounds: &Bounds) -> Vec<Magnet> {
        let center = self.canvas.center();
        vec![
            Magnet::new(
                Line::vertical(center.x, Range::new(self.canvas.y0, self.canvas.y1)),
                MagnetKind::Canvas,
            ),
            Magnet::new(
                Line::horizontal(center.y, Range::new(self.canvas.x0, self.canvas.x1)),
                MagnetKind::Canvas,
            ),
        ]
    }

    fn mark(&self, _bounds: &Bounds, pair: &MatchingMagnetPair, _axis: Axis) -> Option<SnapMarker> {
        Some(SnapMarker::new(
            pair.matching.line,
            pair.self_magnet.clone(),
            pair.matching.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canvas_centerlines() {
        let provider = CanvasSnapProvider::new(Rect::new(0.0, 0.0, 800.0, 600.0));
        let magnets = provider.magnets(&Bounds::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(magnets.len(), 2);
        assert_eq!(magnets[0].axis, Axis::V);
        assert!((magnets[0].position() - 400.0).abs() < f64::EPSILON);
        assert_eq!(magnets[1].axis, Axis::H);
        assert!((magnets[1].position() - 300.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_mark_echoes_full_line() {
        let provider = CanvasSnapProvider::new(Rect::new(0.0, 0.0, 800.0, 600.0));
        let bounds = Bounds::new(390.0, 10.0, 20.0, 20.0);
        let target = provider.magnets(&bounds).remove(0);
        let source = Magnet::source_magnets(&bounds).remove(0);
        let marker = provider
            .mark(&bounds, &MatchingMagnetPair::new(source, target.clone()), Axis::V)
            .unwrap();
        assert_eq!(marker.line, target.line);
        assert!((marker.line.length() - 600.0).abs() < f64::EPSILON);
    }
}
