//! Shared node viability logic for the node, distance and size providers.

use super::EligibleFn;
use crate::diagram::{Diagram, ElementId};
use crate::geometry::{Axis, Bounds, Direction, Range};
use kurbo::Rect;

/// A node that can act as an alignment target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViableNode {
    pub id: ElementId,
    pub bounds: Bounds,
}

/// Viable nodes around a query box, bucketed by direction.
///
/// Buckets hold unrotated nodes only, nearest first. Rotated nodes are kept
/// apart since only their centerlines are meaningful.
#[derive(Debug, Clone, Default)]
pub struct ViableNodes {
    pub n: Vec<ViableNode>,
    pub s: Vec<ViableNode>,
    pub e: Vec<ViableNode>,
    pub w: Vec<ViableNode>,
    pub rotated: Vec<ViableNode>,
}

impl ViableNodes {
    pub fn get(&self, dir: Direction) -> &[ViableNode] {
        match dir {
            Direction::N => &self.n,
            Direction::S => &self.s,
            Direction::E => &self.e,
            Direction::W => &self.w,
        }
    }

    fn get_mut(&mut self, dir: Direction) -> &mut Vec<ViableNode> {
        match dir {
            Direction::N => &mut self.n,
            Direction::S => &mut self.s,
            Direction::E => &mut self.e,
            Direction::W => &mut self.w,
        }
    }

    /// Every viable node once, across all buckets.
    pub fn all(&self) -> Vec<ViableNode> {
        let mut result: Vec<ViableNode> = Vec::new();
        let buckets = Direction::ALL.iter().map(|&d| self.get(d)).chain([self.rotated.as_slice()]);
        for node in buckets.flatten() {
            if !result.iter().any(|n| n.id == node.id) {
                result.push(*node);
            }
        }
        result
    }

    pub fn is_empty(&self) -> bool {
        self.n.is_empty()
            && self.s.is_empty()
            && self.e.is_empty()
            && self.w.is_empty()
            && self.rotated.is_empty()
    }
}

/// Gap between the query box and a node lying in direction `dir`.
pub fn gap(bounds: &Bounds, node: &Bounds, dir: Direction) -> f64 {
    dir.sign() * (node.edge_position(dir.opposite()) - bounds.edge_position(dir))
}

/// Finds viable nodes in a diagram.
#[derive(Clone, Copy)]
pub struct NodeLookup<'a> {
    diagram: &'a Diagram,
    eligible: &'a EligibleFn<'a>,
}

impl<'a> NodeLookup<'a> {
    pub fn new(diagram: &'a Diagram, eligible: &'a EligibleFn<'a>) -> Self {
        Self { diagram, eligible }
    }

    pub fn diagram(&self) -> &'a Diagram {
        self.diagram
    }

    /// Bucket eligible nodes around `bounds`.
    ///
    /// A node is north of the box only when it lies entirely above it and the
    /// two horizontal ranges intersect; likewise for the other directions.
    /// Nodes overlapping the box are never viable.
    pub fn viable_nodes(&self, bounds: &Bounds) -> ViableNodes {
        let mut result = ViableNodes::default();

        // Vertical band through the box holds north/south candidates,
        // horizontal band holds east/west candidates.
        let x = bounds.range(Axis::H);
        let y = bounds.range(Axis::V);
        let bands = [
            (
                Rect::new(x.from, f64::NEG_INFINITY, x.to, f64::INFINITY),
                [Direction::N, Direction::S],
            ),
            (
                Rect::new(f64::NEG_INFINITY, y.from, f64::INFINITY, y.to),
                [Direction::W, Direction::E],
            ),
        ];

        for (band, [before, after]) in bands {
            for id in self.diagram.elements_intersecting(band) {
                if !(self.eligible)(id) {
                    continue;
                }
                let Some(node) = self.diagram.bounds_of(id) else {
                    continue;
                };
                if node.intersects(bounds) {
                    continue;
                }
                let dir = if gap(bounds, &node, before) >= 0.0 {
                    before
                } else if gap(bounds, &node, after) >= 0.0 {
                    after
                } else {
                    continue;
                };

                let viable = ViableNode { id, bounds: node };
                if node.is_rotated() {
                    if !result.rotated.iter().any(|n| n.id == id) {
                        result.rotated.push(viable);
                    }
                } else {
                    result.get_mut(dir).push(viable);
                }
            }
        }

        for dir in Direction::ALL {
            result
                .get_mut(dir)
                .sort_by(|a, b| gap(bounds, &a.bounds, dir).total_cmp(&gap(bounds, &b.bounds, dir)));
        }
        result
    }
}

/// Overlap of the ranges of two boxes along the lines of `axis`.
pub fn range_overlap(a: &Bounds, b: &Bounds, axis: Axis) -> Option<Range> {
    a.range(axis).intersection(b.range(axis))
}
