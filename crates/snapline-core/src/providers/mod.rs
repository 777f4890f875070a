//! Snap providers: one per magnet source.
//!
//! Each provider turns diagram state into candidate magnets for a box and
//! knows how to turn a successful match into a [`SnapMarker`].

mod canvas;
mod distance;
mod grid;
mod guides;
mod node;
mod node_base;
mod size;

pub use canvas::CanvasSnapProvider;
pub use distance::{MAX_DISTANCE_MAGNETS, NodeDistanceSnapProvider};
pub use grid::GridSnapProvider;
pub use guides::GuidesSnapProvider;
pub use node::NodeSnapProvider;
pub use node_base::{NodeLookup, ViableNode, ViableNodes};
pub use size::NodeSizeSnapProvider;

use crate::diagram::{Diagram, ElementId};
use crate::geometry::{Axis, Bounds};
use crate::magnet::{Magnet, MagnetType, MatchingMagnetPair};
use crate::marker::SnapMarker;

/// Predicate deciding which elements may act as alignment targets.
pub type EligibleFn<'a> = dyn Fn(ElementId) -> bool + 'a;

/// Common trait for all magnet sources.
pub trait SnapProvider {
    /// Candidate magnets for a box.
    fn magnets(&self, bounds: &Bounds) -> Vec<Magnet>;

    /// Build the visual marker for a match on `axis`.
    fn mark(&self, bounds: &Bounds, pair: &MatchingMagnetPair, axis: Axis) -> Option<SnapMarker>;

    /// Consolidate this provider's markers.
    fn filter_markers(&self, markers: Vec<SnapMarker>) -> Vec<SnapMarker> {
        markers
    }
}

/// Registry of all providers, keyed by magnet type.
pub struct SnapProviders<'a> {
    grid: GridSnapProvider,
    canvas: CanvasSnapProvider,
    guides: GuidesSnapProvider<'a>,
    node: NodeSnapProvider<'a>,
    distance: NodeDistanceSnapProvider<'a>,
    size: NodeSizeSnapProvider<'a>,
}

impl<'a> SnapProviders<'a> {
    pub fn new(diagram: &'a Diagram, eligible: &'a EligibleFn<'a>, grid_size: f64) -> Self {
        let lookup = NodeLookup::new(diagram, eligible);
        Self {
            grid: GridSnapProvider::new(grid_size),
            canvas: CanvasSnapProvider::new(diagram.canvas),
            guides: GuidesSnapProvider::new(&diagram.guides, diagram.canvas),
            node: NodeSnapProvider::new(lookup),
            distance: NodeDistanceSnapProvider::new(lookup),
            size: NodeSizeSnapProvider::new(lookup),
        }
    }

    /// Provider for a magnet type.
    ///
    /// # Panics
    ///
    /// Source magnets have no provider; asking for one is a caller bug.
    pub fn get(&self, magnet_type: MagnetType) -> &dyn SnapProvider {
        match magnet_type {
            MagnetType::Grid => &self.grid,
            MagnetType::Canvas => &self.canvas,
            MagnetType::Guide => &self.guides,
            MagnetType::Node => &self.node,
            MagnetType::Distance => &self.distance,
            MagnetType::Size => &self.size,
            MagnetType::Source => panic!("source magnets are never produced by a provider"),
        }
    }

    /// Magnets of all given types, in the order of `types`.
    pub fn magnets(&self, bounds: &Bounds, types: &[MagnetType]) -> Vec<Magnet> {
        types
            .iter()
            .flat_map(|&t| self.get(t).magnets(bounds))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "source magnets")]
    fn test_source_provider_panics() {
        let diagram = Diagram::new();
        let eligible = |_: ElementId| true;
        let providers = SnapProviders::new(&diagram, &eligible, 10.0);
        providers.get(MagnetType::Source);
    }

    #[test]
    fn test_magnets_follow_type_order() {
        let diagram = Diagram::new();
        let eligible = |_: ElementId| true;
        let providers = SnapProviders::new(&diagram, &eligible, 10.0);
        let magnets = providers.magnets(
            &Bounds::new(1.0, 1.0, 5.0, 5.0),
            &[MagnetType::Canvas, MagnetType::Grid],
        );
        assert_eq!(magnets[0].magnet_type(), MagnetType::Canvas);
        assert_eq!(magnets[1].magnet_type(), MagnetType::Canvas);
        assert!(magnets[2..].iter().all(|m| m.magnet_type() == MagnetType::Grid));
    }
}
