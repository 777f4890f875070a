//! Equal-spacing magnets derived from pairs of neighbouring nodes.

use super::node_base::{NodeLookup, range_overlap};
use super::SnapProvider;
use crate::geometry::{Axis, Bounds, Direction, EPSILON, Line, Range};
use crate::magnet::{DistancePair, Magnet, MagnetKind, MatchingMagnetPair};
use crate::marker::SnapMarker;
use kurbo::Point;

/// Upper bound of distance magnets emitted per direction.
pub const MAX_DISTANCE_MAGNETS: usize = 25;

/// Offers positions that repeat the gap between two nodes.
///
/// For nodes `first` and `further` lying in the same direction from the box,
/// the box edge facing `first` gets a magnet at the spot where the gap to
/// `first` equals the gap between `first` and `further`.
#[derive(Clone, Copy)]
pub struct NodeDistanceSnapProvider<'a> {
    lookup: NodeLookup<'a>,
}

impl<'a> NodeDistanceSnapProvider<'a> {
    pub fn new(lookup: NodeLookup<'a>) -> Self {
        Self { lookup }
    }
}

fn pair_between(dir: Direction, near: &Bounds, far: &Bounds, overlap: Range) -> DistancePair {
    let axis = dir.axis();
    let a = near.edge_position(dir);
    let b = far.edge_position(dir.opposite());
    let along = overlap.midpoint();
    DistancePair {
        distance: dir.sign() * (b - a),
        point_a: axis.point(a, along),
        point_b: axis.point(b, along),
        range_a: near.range(axis),
        range_b: far.range(axis),
    }
}

impl SnapProvider for NodeDistanceSnapProvider<'_> {
    fn magnets(&self, bounds: &Bounds) -> Vec<Magnet> {
        let viable = self.lookup.viable_nodes(bounds);
        let mut magnets = Vec::new();

        for dir in Direction::ALL {
            let axis = dir.axis();
            let nodes = viable.get(dir);
            let mut emitted: Vec<f64> = Vec::new();

            'pairs: for (i, first) in nodes.iter().enumerate() {
                for further in &nodes[i + 1..] {
                    if emitted.len() >= MAX_DISTANCE_MAGNETS {
                        break 'pairs;
                    }
                    let Some(overlap) = range_overlap(&first.bounds, &further.bounds, axis) else {
                        continue;
                    };
                    let pair = pair_between(dir, &first.bounds, &further.bounds, overlap);
                    if pair.distance <= 0.0 {
                        continue;
                    }

                    let position = first.bounds.edge_position(dir.opposite()) - dir.sign() * pair.distance;
                    if emitted.iter().any(|p| (p - position).abs() < EPSILON) {
                        continue;
                    }
                    emitted.push(position);

                    let extent = bounds
                        .range(axis)
                        .union(first.bounds.range(axis))
                        .union(further.bounds.range(axis));
                    magnets.push(
                        Magnet::with_axis(
                            Line::of_axis(axis, position, extent),
                            axis,
                            MagnetKind::Distance {
                                distance_pairs: vec![pair],
                            },
                        )
                        .directed(dir, true),
                    );
                }
            }
        }

        log::trace!("{} distance magnets", magnets.len());
        magnets
    }

    /// Adds the reproduced gap next to the original one.
    fn mark(&self, bounds: &Bounds, pair: &MatchingMagnetPair, _axis: Axis) -> Option<SnapMarker> {
        let matching = &pair.matching;
        let dir = matching.match_direction?;
        let axis = dir.axis();
        let original = *matching.distance_pairs().first()?;

        // The first node's edge facing the box sits one gap beyond the magnet.
        let box_edge = matching.position();
        let node_edge = box_edge + dir.sign() * original.distance;
        let box_range = bounds.range(axis);

        let mut pairs: Vec<DistancePair> = matching.distance_pairs().to_vec();
        pairs.push(DistancePair {
            distance: original.distance,
            point_a: axis.point(box_edge, box_range.midpoint()),
            point_b: axis.point(node_edge, original.range_a.midpoint()),
            range_a: box_range,
            range_b: original.range_a,
        });

        let common = pairs
            .iter()
            .try_fold(box_range, |acc, p| acc.intersection(p.range_a)?.intersection(p.range_b));
        for p in &mut pairs {
            let along = common
                .or_else(|| p.range_a.intersection(p.range_b))
                .unwrap_or(p.range_a)
                .midpoint();
            p.point_a = axis.point(axis_position(axis, p.point_a), along);
            p.point_b = axis.point(axis_position(axis, p.point_b), along);
        }

        let new_gap = pairs.last()?;
        let line = Line::new(new_gap.point_a, new_gap.point_b);

        let mut magnet = matching.clone();
        magnet.kind = MagnetKind::Distance {
            distance_pairs: pairs,
        };
        Some(SnapMarker::new(line, pair.self_magnet.clone(), magnet))
    }
}

fn axis_position(axis: Axis, point: Point) -> f64 {
    match axis {
        Axis::H => point.y,
        Axis::V => point.x,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::{Diagram, ElementId};

    fn row() -> Diagram {
        let mut diagram = Diagram::new();
        diagram.add_element(Bounds::new(0.0, 0.0, 20.0, 20.0));
        diagram.add_element(Bounds::new(40.0, 0.0, 20.0, 20.0));
        diagram
    }

    fn magnets_for(diagram: &Diagram, bounds: &Bounds) -> Vec<Magnet> {
        let eligible = |_: ElementId| true;
        NodeDistanceSnapProvider::new(NodeLookup::new(diagram, &eligible)).magnets(bounds)
    }

    #[test]
    fn test_magnet_east_of_pair() {
        let diagram = row();
        let magnets = magnets_for(&diagram, &Bounds::new(85.0, 0.0, 20.0, 20.0));
        assert_eq!(magnets.len(), 1);
        let magnet = &magnets[0];
        assert_eq!(magnet.axis, Axis::V);
        assert_eq!(magnet.match_direction, Some(Direction::W));
        assert!(magnet.respect_direction);
        assert!((magnet.position() - 80.0).abs() < EPSILON);
        assert!((magnet.distance_pairs()[0].distance - 20.0).abs() < EPSILON);
    }

    #[test]
    fn test_magnet_west_of_pair() {
        let diagram = row();
        let magnets = magnets_for(&diagram, &Bounds::new(-45.0, 0.0, 20.0, 20.0));
        assert_eq!(magnets.len(), 1);
        assert_eq!(magnets[0].match_direction, Some(Direction::E));
        assert!((magnets[0].position() + 20.0).abs() < EPSILON);
    }

    #[test]
    fn test_nodes_without_shared_range_emit_nothing() {
        let mut diagram = Diagram::new();
        diagram.add_element(Bounds::new(0.0, 0.0, 20.0, 20.0));
        // Overlaps the box vertically but not the first node
        diagram.add_element(Bounds::new(40.0, 30.0, 20.0, 20.0));

        let magnets = magnets_for(&diagram, &Bounds::new(100.0, 15.0, 20.0, 20.0));
        assert!(magnets.is_empty());
    }

    #[test]
    fn test_cap_per_direction() {
        let mut diagram = Diagram::new();
        for i in 0..12 {
            diagram.add_element(Bounds::new(-(i as f64) * 37.0 - 20.0, 0.0, 20.0 + i as f64, 20.0));
        }
        // 66 pairs, every gap positive and distinct
        let magnets = magnets_for(&diagram, &Bounds::new(100.0, 0.0, 20.0, 20.0));
        assert_eq!(magnets.len(), MAX_DISTANCE_MAGNETS);
        assert!(magnets.iter().all(|m| m.match_direction == Some(Direction::W)));
    }

    #[test]
    fn test_mark_appends_new_gap() {
        let diagram = row();
        let eligible = |_: ElementId| true;
        let provider = NodeDistanceSnapProvider::new(NodeLookup::new(&diagram, &eligible));

        let snapped = Bounds::new(80.0, 0.0, 20.0, 20.0);
        let target = provider.magnets(&Bounds::new(85.0, 0.0, 20.0, 20.0)).remove(0);
        let source = Magnet::source_magnets(&snapped)
            .into_iter()
            .find(|m| m.match_direction == Some(Direction::W))
            .unwrap();

        let marker = provider
            .mark(&snapped, &MatchingMagnetPair::new(source, target.clone()), Axis::V)
            .unwrap();
        let pairs = marker.matching_magnet.distance_pairs();
        assert_eq!(pairs.len(), 2);
        assert!((pairs[1].distance - 20.0).abs() < EPSILON);
        assert!((pairs[1].point_a.x - 80.0).abs() < EPSILON);
        assert!((pairs[1].point_b.x - 60.0).abs() < EPSILON);
        // All measurements drawn at the middle of the shared extent
        assert!(pairs.iter().all(|p| (p.point_a.y - 10.0).abs() < EPSILON));
        // The provider's own magnet is left untouched
        assert_eq!(target.distance_pairs().len(), 1);
    }
}
