//! User guide magnets.

use super::SnapProvider;
use crate::diagram::Guide;
use crate::geometry::{Axis, Bounds};
use crate::magnet::{Magnet, MagnetKind, MatchingMagnetPair};
use crate::marker::SnapMarker;
use kurbo::Rect;

/// One magnet per guide, spanning the canvas.
#[derive(Debug, Clone, Copy)]
pub struct GuidesSnapProvider<'a> {
    guides: &'a [Guide],
    canvas: Rect,
}

impl<'a> GuidesSnapProvider<'a> {
    pub fn new(guides: &'a [Guide], canvas: Rect) -> Self {
        Self { guides, canvas }
    }
}

impl SnapProvider for GuidesSnapProvider<'_> {
    fn magnets(&self, _bounds: &Bounds) -> Vec<Magnet> {
        self.guides
            .iter()
            .map(|guide| {
                Magnet::with_axis(
                    guide.line(self.canvas),
                    guide.axis,
                    MagnetKind::Guide {
                        id: guide.id,
                        color: guide.color,
                    },
                )
            })
            .collect()
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
    fn test_guide_magnets() {
        let guides = vec![Guide::new(Axis::V, 120.0), Guide::new(Axis::H, 40.0)];
        let provider = GuidesSnapProvider::new(&guides, Rect::new(0.0, 0.0, 500.0, 400.0));
        let magnets = provider.magnets(&Bounds::new(0.0, 0.0, 10.0, 10.0));

        assert_eq!(magnets.len(), 2);
        assert_eq!(magnets[0].axis, Axis::V);
        assert!((magnets[0].position() - 120.0).abs() < f64::EPSILON);
        assert!((magnets[0].line.length() - 400.0).abs() < f64::EPSILON);
        assert_eq!(magnets[1].axis, Axis::H);
        assert!(matches!(magnets[1].kind, MagnetKind::Guide { id, .. } if id == guides[1].id));
    }
}
