//! Magnets: the unit of alignment.
//!
//! A magnet is an axis-aligned line a box edge or centerline can snap to.
//! Every provider produces magnets of its own [`MagnetType`]; the element
//! being manipulated produces `Source` magnets which are only ever matched
//! against the others.

use crate::diagram::{ElementId, GuideId, SerializableColor};
use crate::geometry::{Axis, Bounds, Direction, Line, Range};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Fieldless tag of a magnet, used for configuration and priorities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MagnetType {
    Grid,
    Canvas,
    Guide,
    Node,
    Distance,
    Size,
    Source,
}

impl MagnetType {
    /// Types that can act as match targets.
    pub const TARGETS: [MagnetType; 6] = [
        MagnetType::Grid,
        MagnetType::Node,
        MagnetType::Canvas,
        MagnetType::Distance,
        MagnetType::Size,
        MagnetType::Guide,
    ];
}

/// One measurement between two boxes, kept for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistancePair {
    pub distance: f64,
    pub point_a: Point,
    pub point_b: Point,
    pub range_a: Range,
    pub range_b: Range,
}

/// Variant-specific magnet data.
#[derive(Debug, Clone, PartialEq)]
pub enum MagnetKind {
    Grid,
    /// Centerlines of the canvas.
    Canvas,
    Guide {
        id: GuideId,
        color: SerializableColor,
    },
    Node {
        node: ElementId,
        center: bool,
    },
    /// Equal-gap position derived from two other nodes.
    Distance {
        distance_pairs: Vec<DistancePair>,
    },
    /// Equal-size position derived from a reference node.
    Size {
        node: ElementId,
        size: f64,
        distance_pairs: Vec<DistancePair>,
    },
    /// Magnet of the element being moved or resized.
    Source {
        center: bool,
    },
}

/// An alignment line tagged with its axis, origin and matching rules.
#[derive(Debug, Clone, PartialEq)]
pub struct Magnet {
    pub line: Line,
    pub axis: Axis,
    /// Edge this magnet belongs to (or should align with).
    pub match_direction: Option<Direction>,
    /// Only match source magnets with the same `match_direction`.
    pub respect_direction: bool,
    pub kind: MagnetKind,
}

impl Magnet {
    /// Create a magnet; the axis is derived from the line.
    pub fn new(line: Line, kind: MagnetKind) -> Self {
        debug_assert!(line.is_orthogonal(), "magnet lines must be axis aligned");
        Self {
            axis: line.axis(),
            line,
            match_direction: None,
            respect_direction: false,
            kind,
        }
    }

    /// Create a magnet with an explicit axis (for degenerate zero-length lines).
    pub fn with_axis(line: Line, axis: Axis, kind: MagnetKind) -> Self {
        Self {
            line,
            axis,
            match_direction: None,
            respect_direction: false,
            kind,
        }
    }

    pub fn directed(mut self, dir: Direction, respect: bool) -> Self {
        self.match_direction = Some(dir);
        self.respect_direction = respect;
        self
    }

    pub fn magnet_type(&self) -> MagnetType {
        match self.kind {
            MagnetKind::Grid => MagnetType::Grid,
            MagnetKind::Canvas => MagnetType::Canvas,
            MagnetKind::Guide { .. } => MagnetType::Guide,
            MagnetKind::Node { .. } => MagnetType::Node,
            MagnetKind::Distance { .. } => MagnetType::Distance,
            MagnetKind::Size { .. } => MagnetType::Size,
            MagnetKind::Source { .. } => MagnetType::Source,
        }
    }

    /// The constrained coordinate of the magnet line.
    pub fn position(&self) -> f64 {
        match self.axis {
            Axis::H => self.line.from.y,
            Axis::V => self.line.from.x,
        }
    }

    pub fn is_center(&self) -> bool {
        matches!(
            self.kind,
            MagnetKind::Node { center: true, .. } | MagnetKind::Source { center: true }
        )
    }

    /// Element this magnet was derived from, if any.
    pub fn node(&self) -> Option<ElementId> {
        match self.kind {
            MagnetKind::Node { node, .. } | MagnetKind::Size { node, .. } => Some(node),
            _ => None,
        }
    }

    pub fn distance_pairs(&self) -> &[DistancePair] {
        match &self.kind {
            MagnetKind::Distance { distance_pairs } | MagnetKind::Size { distance_pairs, .. } => {
                distance_pairs
            }
            _ => &[],
        }
    }

    /// Signed offset that moves `self` onto `other`, measured orthogonally
    /// to the magnet axis.
    pub fn distance_to(&self, other: &Magnet) -> f64 {
        other.position() - self.position()
    }

    /// Offset to `target` when the two magnets can be aligned within `threshold`.
    pub fn match_distance(&self, target: &Magnet, threshold: f64) -> Option<f64> {
        if self.axis != target.axis {
            return None;
        }
        if target.respect_direction && target.match_direction != self.match_direction {
            return None;
        }
        let distance = self.distance_to(target);
        (distance.abs() <= threshold).then_some(distance)
    }

    /// Source magnets of a box: both centerlines and, unless rotated, the four edges.
    pub fn source_magnets(bounds: &Bounds) -> Vec<Magnet> {
        let mut magnets = center_magnets(bounds, |center| MagnetKind::Source { center });
        if bounds.is_rotated() {
            return magnets;
        }
        for dir in Direction::ALL {
            magnets.push(
                Magnet::with_axis(bounds.edge(dir), dir.axis(), MagnetKind::Source { center: false })
                    .directed(dir, false),
            );
        }
        magnets
    }

    /// Node magnets of an element, spanning only the element itself.
    pub fn node_magnets(node: ElementId, bounds: &Bounds) -> Vec<Magnet> {
        let mut magnets = center_magnets(bounds, |center| MagnetKind::Node { node, center });
        if bounds.is_rotated() {
            return magnets;
        }
        for dir in Direction::ALL {
            magnets.push(
                Magnet::with_axis(
                    bounds.edge(dir),
                    dir.axis(),
                    MagnetKind::Node {
                        node,
                        center: false,
                    },
                )
                .directed(dir, true),
            );
        }
        magnets
    }
}

fn center_magnets(bounds: &Bounds, kind: impl Fn(bool) -> MagnetKind) -> Vec<Magnet> {
    let center = bounds.center();
    vec![
        Magnet::with_axis(
            Line::vertical(center.x, bounds.range(Axis::V)),
            Axis::V,
            kind(true),
        ),
        Magnet::with_axis(
            Line::horizontal(center.y, bounds.range(Axis::H)),
            Axis::H,
            kind(true),
        ),
    ]
}

/// A source magnet together with a target it can snap to.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchingMagnetPair {
    pub self_magnet: Magnet,
    pub matching: Magnet,
    /// Signed offset from `self_magnet` to `matching`.
    pub distance: f64,
}

impl MatchingMagnetPair {
    pub fn new(self_magnet: Magnet, matching: Magnet) -> Self {
        let distance = self_magnet.distance_to(&matching);
        Self {
            self_magnet,
            matching,
            distance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn vertical(x: f64) -> Magnet {
        Magnet::new(Line::vertical(x, Range::new(0.0, 100.0)), MagnetKind::Grid)
    }

    #[test]
    fn test_source_magnets_unrotated() {
        let magnets = Magnet::source_magnets(&Bounds::new(0.0, 0.0, 20.0, 10.0));
        assert_eq!(magnets.len(), 6);
        assert_eq!(magnets.iter().filter(|m| m.is_center()).count(), 2);

        let east = magnets
            .iter()
            .find(|m| m.match_direction == Some(Direction::E))
            .unwrap();
        assert_eq!(east.axis, Axis::V);
        assert!((east.position() - 20.0).abs() < f64::EPSILON);

        let south = magnets
            .iter()
            .find(|m| m.match_direction == Some(Direction::S))
            .unwrap();
        assert_eq!(south.axis, Axis::H);
        assert!((south.position() - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_source_magnets_rotated_only_centers() {
        let bounds = Bounds::new(0.0, 0.0, 20.0, 10.0).with_rotation(0.3);
        let magnets = Magnet::source_magnets(&bounds);
        assert_eq!(magnets.len(), 2);
        assert!(magnets.iter().all(|m| m.is_center()));
    }

    #[test]
    fn test_match_distance_threshold_is_inclusive() {
        let source = vertical(0.0);
        assert_eq!(source.match_distance(&vertical(10.0), 10.0), Some(10.0));
        assert_eq!(source.match_distance(&vertical(-10.0), 10.0), Some(-10.0));
        assert_eq!(source.match_distance(&vertical(10.0001), 10.0), None);
    }

    #[test]
    fn test_match_requires_same_axis() {
        let source = vertical(0.0);
        let horizontal = Magnet::new(Line::horizontal(0.0, Range::new(0.0, 10.0)), MagnetKind::Grid);
        assert_eq!(source.match_distance(&horizontal, 10.0), None);
    }

    #[test]
    fn test_match_respects_direction() {
        let node = Uuid::new_v4();
        let target = Magnet::new(
            Line::vertical(5.0, Range::new(0.0, 10.0)),
            MagnetKind::Node { node, center: false },
        )
        .directed(Direction::E, true);

        let east = vertical(0.0).directed(Direction::E, false);
        let west = vertical(0.0).directed(Direction::W, false);
        assert_eq!(east.match_distance(&target, 10.0), Some(5.0));
        assert_eq!(west.match_distance(&target, 10.0), None);
    }

    #[test]
    fn test_pair_distance_is_signed() {
        let pair = MatchingMagnetPair::new(vertical(12.0), vertical(10.0));
        assert!((pair.distance + 2.0).abs() < f64::EPSILON);
    }
}
