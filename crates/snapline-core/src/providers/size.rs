//! Equal-size magnets.

use super::node_base::NodeLookup;
use super::SnapProvider;
use crate::geometry::{Axis, Bounds, Direction, Line};
use crate::magnet::{DistancePair, Magnet, MagnetKind, MatchingMagnetPair};
use crate::marker::SnapMarker;

/// Offers edge positions at which the box takes the width or height of its
/// closest neighbour.
#[derive(Clone, Copy)]
pub struct NodeSizeSnapProvider<'a> {
    lookup: NodeLookup<'a>,
}

impl<'a> NodeSizeSnapProvider<'a> {
    pub fn new(lookup: NodeLookup<'a>) -> Self {
        Self { lookup }
    }
}

/// Near and far edge of a box across lines of `axis`.
fn edges(axis: Axis) -> (Direction, Direction) {
    match axis {
        Axis::H => (Direction::N, Direction::S),
        Axis::V => (Direction::W, Direction::E),
    }
}

/// Measurement across `bounds`, drawn through its middle.
fn span(bounds: &Bounds, axis: Axis) -> DistancePair {
    let (near, far) = edges(axis);
    let range = bounds.range(axis);
    let along = range.midpoint();
    DistancePair {
        distance: bounds.size_across(axis),
        point_a: axis.point(bounds.edge_position(near), along),
        point_b: axis.point(bounds.edge_position(far), along),
        range_a: range,
        range_b: range,
    }
}

impl SnapProvider for NodeSizeSnapProvider<'_> {
    fn magnets(&self, bounds: &Bounds) -> Vec<Magnet> {
        let viable = self.lookup.viable_nodes(bounds);
        let center = bounds.center();
        let mut magnets = Vec::new();

        for dir in Direction::ALL {
            let closest = viable.get(dir).iter().min_by(|a, b| {
                center
                    .distance(a.bounds.center())
                    .total_cmp(&center.distance(b.bounds.center()))
            });
            let Some(other) = closest else {
                continue;
            };

            let axis = dir.axis();
            let (near, far) = edges(axis);
            let size = other.bounds.size_across(axis);
            let diff = size - bounds.size_across(axis);
            let range = bounds.range(axis);
            let kind = MagnetKind::Size {
                node: other.id,
                size,
                distance_pairs: Vec::new(),
            };

            let forward = bounds.edge_position(far) + diff;
            let backward = bounds.edge_position(near) - diff;
            magnets.push(
                Magnet::with_axis(Line::of_axis(axis, forward, range), axis, kind.clone())
                    .directed(far, false),
            );
            magnets.push(
                Magnet::with_axis(Line::of_axis(axis, backward, range), axis, kind)
                    .directed(near, false),
            );
        }
        magnets
    }

    /// Shows both spans: the box and its reference node.
    fn mark(&self, bounds: &Bounds, pair: &MatchingMagnetPair, axis: Axis) -> Option<SnapMarker> {
        let node = self.lookup.diagram().bounds_of(pair.matching.node()?)?;
        let own = span(bounds, axis);
        let line = Line::new(own.point_a, own.point_b);

        let mut magnet = pair.matching.clone();
        if let MagnetKind::Size { distance_pairs, .. } = &mut magnet.kind {
            distance_pairs.push(own);
            distance_pairs.push(span(&node, axis));
        }
        Some(SnapMarker::new(line, pair.self_magnet.clone(), magnet))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::{Diagram, ElementId};
    use crate::geometry::EPSILON;

    #[test]
    fn test_forward_and_backward_magnets() {
        let mut diagram = Diagram::new();
        diagram.add_element(Bounds::new(100.0, 0.0, 30.0, 40.0));
        let eligible = |_: ElementId| true;
        let provider = NodeSizeSnapProvider::new(NodeLookup::new(&diagram, &eligible));

        let magnets = provider.magnets(&Bounds::new(0.0, 10.0, 20.0, 20.0));
        assert_eq!(magnets.len(), 2);

        // Node is east: widths are compared, +10
        let east = magnets
            .iter()
            .find(|m| m.match_direction == Some(Direction::E))
            .unwrap();
        assert_eq!(east.axis, Axis::V);
        assert!((east.position() - 30.0).abs() < EPSILON);
        assert!(!east.respect_direction);

        let west = magnets
            .iter()
            .find(|m| m.match_direction == Some(Direction::W))
            .unwrap();
        assert!((west.position() + 10.0).abs() < EPSILON);
    }

    #[test]
    fn test_closest_node_by_center() {
        let mut diagram = Diagram::new();
        let near = diagram.add_element(Bounds::new(0.0, 100.0, 20.0, 50.0));
        diagram.add_element(Bounds::new(0.0, 300.0, 20.0, 80.0));
        let eligible = |_: ElementId| true;
        let provider = NodeSizeSnapProvider::new(NodeLookup::new(&diagram, &eligible));

        let magnets = provider.magnets(&Bounds::new(0.0, 0.0, 20.0, 20.0));
        assert_eq!(magnets.len(), 2);
        assert!(magnets.iter().all(|m| m.node() == Some(near)));
        let south = magnets
            .iter()
            .find(|m| m.match_direction == Some(Direction::S))
            .unwrap();
        assert!((south.position() - 50.0).abs() < EPSILON);
    }

    #[test]
    fn test_mark_appends_both_spans() {
        let mut diagram = Diagram::new();
        diagram.add_element(Bounds::new(100.0, 0.0, 30.0, 40.0));
        let eligible = |_: ElementId| true;
        let provider = NodeSizeSnapProvider::new(NodeLookup::new(&diagram, &eligible));

        let original = Bounds::new(0.0, 10.0, 20.0, 20.0);
        let resized = Bounds::new(0.0, 10.0, 30.0, 20.0);
        let target = provider
            .magnets(&original)
            .into_iter()
            .find(|m| m.match_direction == Some(Direction::E))
            .unwrap();
        let source = Magnet::source_magnets(&resized)
            .into_iter()
            .find(|m| m.match_direction == Some(Direction::E))
            .unwrap();

        let marker = provider
            .mark(&resized, &MatchingMagnetPair::new(source, target), Axis::V)
            .unwrap();
        let pairs = marker.matching_magnet.distance_pairs();
        assert_eq!(pairs.len(), 2);
        assert!((pairs[0].distance - 30.0).abs() < EPSILON);
        assert!((pairs[1].distance - 30.0).abs() < EPSILON);
        assert!((marker.line.length() - 30.0).abs() < EPSILON);
    }
}
