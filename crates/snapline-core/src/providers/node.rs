//! Edge and centerline magnets of neighbouring nodes.

use super::node_base::NodeLookup;
use super::SnapProvider;
use crate::geometry::{Axis, Bounds, Direction, EPSILON, Line, Range};
use crate::magnet::{Magnet, MagnetKind, MatchingMagnetPair};
use crate::marker::SnapMarker;

/// Magnets along the edges and centerlines of viable nodes.
///
/// Lines are stretched across the whole canvas; the viability rules already
/// restrict which nodes contribute.
#[derive(Clone, Copy)]
pub struct NodeSnapProvider<'a> {
    lookup: NodeLookup<'a>,
}

impl<'a> NodeSnapProvider<'a> {
    pub fn new(lookup: NodeLookup<'a>) -> Self {
        Self { lookup }
    }

    /// Extent of a stretched line of `axis`.
    fn span(&self, axis: Axis, bounds: &Bounds, node: &Bounds) -> Range {
        let canvas = self.lookup.diagram().canvas;
        let canvas_range = match axis {
            Axis::H => Range::new(canvas.x0, canvas.x1),
            Axis::V => Range::new(canvas.y0, canvas.y1),
        };
        canvas_range.union(bounds.range(axis)).union(node.range(axis))
    }
}

impl SnapProvider for NodeSnapProvider<'_> {
    fn magnets(&self, bounds: &Bounds) -> Vec<Magnet> {
        let center = bounds.center();
        let mut nodes = self.lookup.viable_nodes(bounds).all();
        nodes.sort_by(|a, b| {
            center
                .distance(a.bounds.center())
                .total_cmp(&center.distance(b.bounds.center()))
        });

        let mut magnets: Vec<Magnet> = Vec::new();
        let mut push = |magnet: Magnet| {
            let duplicate = magnets.iter().any(|m| {
                m.axis == magnet.axis
                    && m.match_direction == magnet.match_direction
                    && m.is_center() == magnet.is_center()
                    && (m.position() - magnet.position()).abs() < EPSILON
            });
            if !duplicate {
                magnets.push(magnet);
            }
        };

        for node in &nodes {
            let id = node.id;
            for axis in [Axis::V, Axis::H] {
                let line = Line::of_axis(
                    axis,
                    node.bounds.center_position(axis),
                    self.span(axis, bounds, &node.bounds),
                );
                push(Magnet::with_axis(line, axis, MagnetKind::Node { node: id, center: true }));
            }
            if node.bounds.is_rotated() {
                continue;
            }
            for dir in Direction::ALL {
                let axis = dir.axis();
                let line = Line::of_axis(
                    axis,
                    node.bounds.edge_position(dir),
                    self.span(axis, bounds, &node.bounds),
                );
                push(
                    Magnet::with_axis(line, axis, MagnetKind::Node { node: id, center: false })
                        .directed(dir, true),
                );
            }
        }
        magnets
    }

    /// Draws the guide from the matched node to the box.
    fn mark(&self, bounds: &Bounds, pair: &MatchingMagnetPair, axis: Axis) -> Option<SnapMarker> {
        let node = self.lookup.diagram().bounds_of(pair.matching.node()?)?;
        let extent = node.range(axis).union(bounds.range(axis));
        Some(SnapMarker::new(
            Line::of_axis(axis, pair.matching.position(), extent),
            pair.self_magnet.clone(),
            pair.matching.clone(),
        ))
    }
}
