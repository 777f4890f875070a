//! Batch alignment of a whole selection.
//!
//! Unlike interactive snapping, auto-align runs without pointer input: every
//! selected element is matched against the magnets of the elements around it,
//! the results are written into a [`MutationBatch`], and the passes repeat
//! until nothing moves any more.

use crate::config::{DEFAULT_GRID_SIZE, DEFAULT_THRESHOLD, SnapConfig};
use crate::diagram::{Diagram, ElementId, MutationBatch};
use crate::geometry::{Axis, Bounds, Direction, axis_offset};
use crate::magnet::{Magnet, MagnetType};
use crate::manager::{resize_edge, selection_predicate};
use crate::providers::{CanvasSnapProvider, GridSnapProvider, GuidesSnapProvider, SnapProvider};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Upper bound of alignment passes.
pub const MAX_ITERATIONS: usize = 3;

/// Edges tried by a resize pass, first match wins.
const RESIZE_ORDER: [Direction; 4] = [Direction::W, Direction::N, Direction::E, Direction::S];

/// What auto-align may change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignMode {
    /// Translate elements.
    #[default]
    Move,
    /// Move one edge per element.
    Resize,
    /// A resize pass followed by a move pass.
    Both,
    None,
}

/// Auto-align settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoAlignConfig {
    pub threshold: f64,
    /// Magnet types to align to, highest priority first.
    /// Only grid, node, canvas and guide magnets take part.
    pub magnet_types: Vec<MagnetType>,
    pub mode: AlignMode,
}

impl Default for AutoAlignConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            magnet_types: vec![MagnetType::Node, MagnetType::Canvas, MagnetType::Guide],
            mode: AlignMode::Move,
        }
    }
}

impl AutoAlignConfig {
    /// Settings matching an interactive snap configuration.
    pub fn from_snap_config(config: &SnapConfig, mode: AlignMode) -> Self {
        Self {
            threshold: config.threshold,
            magnet_types: config.enabled_types(),
            mode,
        }
    }

    fn allows(&self, magnet_type: MagnetType) -> bool {
        self.magnet_types.contains(&magnet_type)
    }

    fn rank(&self, magnet_type: MagnetType) -> usize {
        self.magnet_types
            .iter()
            .position(|&t| t == magnet_type)
            .unwrap_or(usize::MAX)
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Pass {
    Move,
    Resize,
}

struct Aligner<'a> {
    config: &'a AutoAlignConfig,
    grid: Option<GridSnapProvider>,
    /// Magnets of elements outside the selection, computed once.
    fixed: Vec<Magnet>,
    /// Magnets of already processed selected elements.
    dynamic: BTreeMap<ElementId, Vec<Magnet>>,
}

impl Aligner<'_> {
    fn targets(&self, id: ElementId, bounds: &Bounds) -> Vec<Magnet> {
        let mut targets = self.fixed.clone();
        for (other, magnets) in &self.dynamic {
            if *other != id {
                targets.extend(magnets.iter().cloned());
            }
        }
        if let Some(grid) = &self.grid {
            targets.extend(grid.magnets(bounds));
        }
        targets
    }

    /// Closest target offset for any of `sources`, ties broken by type rank.
    fn closest(&self, sources: &[Magnet], targets: &[Magnet]) -> Option<f64> {
        sources
            .iter()
            .flat_map(|source| {
                targets.iter().filter_map(move |target| {
                    source
                        .match_distance(target, self.config.threshold)
                        .map(|d| (d, target.magnet_type()))
                })
            })
            .min_by(|a, b| {
                a.0.abs()
                    .total_cmp(&b.0.abs())
                    .then_with(|| self.config.rank(a.1).cmp(&self.config.rank(b.1)))
            })
            .map(|(d, _)| d)
    }

    fn align(&self, id: ElementId, bounds: Bounds, pass: Pass) -> Bounds {
        let targets = self.targets(id, &bounds);
        let sources = Magnet::source_magnets(&bounds);
        match pass {
            Pass::Move => {
                let mut moved = bounds;
                for axis in Axis::ALL {
                    let on_axis: Vec<Magnet> = sources.iter().filter(|m| m.axis == axis).cloned().collect();
                    if let Some(offset) = self.closest(&on_axis, &targets) {
                        moved = moved.translate(axis_offset(axis, offset));
                    }
                }
                moved
            }
            Pass::Resize => {
                for dir in RESIZE_ORDER {
                    let edge: Vec<Magnet> = sources
                        .iter()
                        .filter(|m| m.match_direction == Some(dir))
                        .cloned()
                        .collect();
                    if let Some(offset) = self.closest(&edge, &targets) {
                        return resize_edge(bounds, dir, offset);
                    }
                }
                bounds
            }
        }
    }

    /// Run one pass over all elements. Returns the number of changed elements.
    fn pass(&mut self, current: &mut [(ElementId, Bounds)], pass: Pass) -> usize {
        let mut changed = 0;
        for (id, bounds) in current.iter_mut() {
            let aligned = self.align(*id, *bounds, pass);
            if !aligned.approx_eq(bounds) {
                changed += 1;
                *bounds = aligned;
            }
            if self.config.allows(MagnetType::Node) {
                self.dynamic.insert(*id, Magnet::node_magnets(*id, bounds));
            }
        }
        changed
    }
}

/// Align `elements` to their surroundings and to each other.
///
/// Smaller elements go first so larger ones settle against them. New bounds of
/// every element that changed are recorded into `batch`. Returns the number of
/// changed elements.
pub fn auto_align(
    elements: &[ElementId],
    diagram: &Diagram,
    config: &AutoAlignConfig,
    batch: &mut MutationBatch,
) -> usize {
    if config.mode == AlignMode::None || elements.is_empty() {
        return 0;
    }
    let sanitized;
    let config = if config.threshold.is_finite() && config.threshold >= 0.0 {
        config
    } else {
        log::warn!("Invalid auto-align threshold {}, using {DEFAULT_THRESHOLD}", config.threshold);
        sanitized = AutoAlignConfig {
            threshold: DEFAULT_THRESHOLD,
            ..config.clone()
        };
        &sanitized
    };

    let mut current: Vec<(ElementId, Bounds)> = Vec::with_capacity(elements.len());
    for &id in elements {
        match diagram.bounds_of(id) {
            Some(bounds) => current.push((id, bounds)),
            None => log::warn!("Skipping unknown element {id} in auto-align"),
        }
    }
    current.sort_by(|a, b| a.1.area().total_cmp(&b.1.area()));
    let original: HashMap<ElementId, Bounds> = current.iter().copied().collect();

    let eligible = selection_predicate(diagram, elements);
    let mut fixed = Vec::new();
    if config.allows(MagnetType::Node) {
        for element in diagram.elements().filter(|e| eligible(e.id)) {
            fixed.extend(Magnet::node_magnets(element.id, &element.bounds));
        }
    }
    let canvas = Bounds::from_rect(diagram.canvas);
    if config.allows(MagnetType::Canvas) {
        fixed.extend(CanvasSnapProvider::new(diagram.canvas).magnets(&canvas));
    }
    if config.allows(MagnetType::Guide) {
        fixed.extend(GuidesSnapProvider::new(&diagram.guides, diagram.canvas).magnets(&canvas));
    }

    let grid_size = diagram
        .snap_config
        .as_ref()
        .map_or(DEFAULT_GRID_SIZE, |c| c.sanitized().grid_size);
    let mut aligner = Aligner {
        config,
        grid: config
            .allows(MagnetType::Grid)
            .then(|| GridSnapProvider::new(grid_size)),
        fixed,
        dynamic: BTreeMap::new(),
    };
    log::debug!(
        "Auto-aligning {} elements against {} fixed magnets ({:?})",
        current.len(),
        aligner.fixed.len(),
        config.mode
    );

    for iteration in 0..MAX_ITERATIONS {
        let mut changed = 0;
        if matches!(config.mode, AlignMode::Resize | AlignMode::Both) {
            changed += aligner.pass(&mut current, Pass::Resize);
        }
        if matches!(config.mode, AlignMode::Move | AlignMode::Both) {
            changed += aligner.pass(&mut current, Pass::Move);
        }
        log::trace!("Auto-align pass {iteration}: {changed} changes");
        if changed == 0 {
            break;
        }
    }

    let mut count = 0;
    for (id, bounds) in &current {
        if original.get(id).is_some_and(|o| !o.approx_eq(bounds)) {
            batch.update_bounds(*id, *bounds);
            count += 1;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(mode: AlignMode, types: &[MagnetType]) -> AutoAlignConfig {
        AutoAlignConfig {
            threshold: 10.0,
            magnet_types: types.to_vec(),
            mode,
        }
    }

    #[test]
    fn test_aligned_selection_is_a_fixed_point() {
        let mut diagram = Diagram::new();
        diagram.add_element(Bounds::new(0.0, 0.0, 20.0, 20.0));
        let selected = diagram.add_element(Bounds::new(100.0, 0.0, 20.0, 20.0));

        let mut batch = MutationBatch::new();
        let changed = auto_align(
            &[selected],
            &diagram,
            &config(AlignMode::Move, &[MagnetType::Node]),
            &mut batch,
        );
        assert_eq!(changed, 0);
        assert!(batch.is_empty());
    }

    #[test]
    fn test_move_to_neighbour() {
        let mut diagram = Diagram::new();
        diagram.add_element(Bounds::new(100.0, 0.0, 20.0, 20.0));
        let selected = diagram.add_element(Bounds::new(3.0, 3.0, 20.0, 20.0));

        let mut batch = MutationBatch::new();
        auto_align(
            &[selected],
            &diagram,
            &config(AlignMode::Move, &[MagnetType::Node]),
            &mut batch,
        );
        let bounds = batch.get(selected).unwrap();
        assert!(bounds.approx_eq(&Bounds::new(3.0, 0.0, 20.0, 20.0)));
    }

    #[test]
    fn test_resize_first_edge_wins() {
        let mut diagram = Diagram::new();
        // Both the west (12 -> 10) and east (28 -> 30) edges are near grid lines
        let selected = diagram.add_element(Bounds::new(12.0, 0.0, 16.0, 20.0));

        let mut batch = MutationBatch::new();
        auto_align(
            &[selected],
            &diagram,
            &config(AlignMode::Resize, &[MagnetType::Grid]),
            &mut batch,
        );
        let bounds = batch.get(selected).unwrap();
        assert!(bounds.approx_eq(&Bounds::new(10.0, 0.0, 18.0, 20.0)));
    }

    #[test]
    fn test_both_resizes_then_moves() {
        let mut diagram = Diagram::new();
        let selected = diagram.add_element(Bounds::new(12.0, 3.0, 16.0, 20.0));

        let mut batch = MutationBatch::new();
        auto_align(
            &[selected],
            &diagram,
            &config(AlignMode::Both, &[MagnetType::Grid]),
            &mut batch,
        );
        let bounds = batch.get(selected).unwrap();
        assert!(bounds.approx_eq(&Bounds::new(10.0, 0.0, 18.0, 20.0)));
    }

    #[test]
    fn test_mode_none_does_nothing() {
        let mut diagram = Diagram::new();
        let selected = diagram.add_element(Bounds::new(12.0, 3.0, 16.0, 20.0));

        let mut batch = MutationBatch::new();
        let changed = auto_align(
            &[selected],
            &diagram,
            &config(AlignMode::None, &[MagnetType::Grid]),
            &mut batch,
        );
        assert_eq!(changed, 0);
        assert!(batch.is_empty());
    }

    #[test]
    fn test_selected_elements_align_to_each_other() {
        let mut diagram = Diagram::new();
        let small = diagram.add_element(Bounds::new(0.0, 0.0, 30.0, 30.0));
        let large = diagram.add_element(Bounds::new(200.0, 4.0, 50.0, 50.0));

        let mut batch = MutationBatch::new();
        auto_align(
            &[large, small],
            &diagram,
            &config(AlignMode::Move, &[MagnetType::Node]),
            &mut batch,
        );
        // Processed first, the small element sees no magnets and stays put
        assert!(batch.get(small).is_none());
        let bounds = batch.get(large).unwrap();
        assert!((bounds.y).abs() < 1e-9);
        assert!((bounds.x - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_alignment_propagates_along_chain() {
        let mut diagram = Diagram::new();
        let fixed = diagram.add_element(Bounds::new(0.0, -30.0, 40.0, 100.0));
        // Too far from the fixed node, but its top edge ends up near the middle one
        let thin = diagram.add_element(Bounds::new(400.0, -3.0, 2.0, 100.0));
        // Centerline 3 below the fixed node's centerline
        let middle = diagram.add_element(Bounds::new(200.0, 8.0, 30.0, 30.0));

        let mut batch = MutationBatch::new();
        let changed = auto_align(
            &[middle, thin],
            &diagram,
            &config(AlignMode::Move, &[MagnetType::Node]),
            &mut batch,
        );
        assert_eq!(changed, 2);
        assert!(batch.get(fixed).is_none());
        // Settled in the first pass
        assert!(batch.get(middle).unwrap().approx_eq(&Bounds::new(200.0, 5.0, 30.0, 30.0)));
        // Only reachable once the middle node has moved
        assert!(batch.get(thin).unwrap().approx_eq(&Bounds::new(400.0, 5.0, 2.0, 100.0)));
    }

    #[test]
    fn test_invalid_settings_fall_back_to_defaults() {
        let mut diagram = Diagram::new();
        diagram.snap_config = Some(SnapConfig::default().with_grid_size(0.0));
        let selected = diagram.add_element(Bounds::new(12.0, 3.0, 16.0, 20.0));

        let mut batch = MutationBatch::new();
        let settings = AutoAlignConfig {
            threshold: f64::NAN,
            ..config(AlignMode::Move, &[MagnetType::Grid])
        };
        auto_align(&[selected], &diagram, &settings, &mut batch);
        let bounds = batch.get(selected).unwrap();
        assert!(bounds.approx_eq(&Bounds::new(12.0, 0.0, 16.0, 20.0)));
    }

    #[test]
    fn test_applied_batch_updates_diagram() {
        let mut diagram = Diagram::new();
        let selected = diagram.add_element(Bounds::new(12.0, 3.0, 16.0, 20.0));

        let mut batch = MutationBatch::new();
        auto_align(
            &[selected],
            &diagram,
            &config(AlignMode::Move, &[MagnetType::Grid]),
            &mut batch,
        );
        assert_eq!(diagram.apply(&batch).unwrap(), 1);
        // The vertical centerline already sits on x=20
        let bounds = diagram.bounds_of(selected).unwrap();
        assert!((bounds.x - 12.0).abs() < 1e-9);
        assert!(bounds.y.abs() < 1e-9);
    }
}
