//! Snap manager: matches an element's own magnets against every provider.

use crate::config::SnapConfig;
use crate::diagram::{Diagram, ElementId};
use crate::geometry::{Axis, Bounds, Direction, EPSILON, Line, axis_offset};
use crate::magnet::{Magnet, MagnetKind, MagnetType, MatchingMagnetPair};
use crate::marker::SnapMarker;
use crate::providers::{EligibleFn, GridSnapProvider, SnapProviders};
use kurbo::Point;
use std::collections::HashSet;

/// Rotation increment used by [`SnapManager::snap_rotate`], in degrees.
pub const ROTATION_STEP_DEGREES: f64 = 5.0;

/// Result of a snap operation.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapResult<T> {
    /// The snapped value.
    pub adjusted: T,
    /// Guides to render for the matches that produced `adjusted`.
    pub markers: Vec<SnapMarker>,
    /// Source magnets of the adjusted element.
    pub magnets: Vec<Magnet>,
}

impl<T> SnapResult<T> {
    fn unchanged(value: T, magnets: Vec<Magnet>) -> Self {
        Self {
            adjusted: value,
            markers: Vec::new(),
            magnets,
        }
    }

    /// Check if anything matched.
    pub fn is_snapped(&self) -> bool {
        !self.markers.is_empty()
    }
}

/// A source magnet matched against a target within the threshold.
struct Candidate {
    source: usize,
    target: Magnet,
    distance: f64,
}

/// How source magnet offsets are applied to a box.
#[derive(Clone, Copy)]
enum Adjust {
    Move,
    Resize,
}

/// Snapping entry point for one diagram.
///
/// Holds the snapping settings and the predicate deciding which elements act
/// as alignment targets. Every operation is pure: the diagram is only read.
pub struct SnapManager<'a> {
    diagram: &'a Diagram,
    eligible: Box<EligibleFn<'a>>,
    threshold: f64,
    enabled: bool,
    /// Enabled target types, highest priority first.
    types: Vec<MagnetType>,
    grid_size: f64,
}

impl<'a> SnapManager<'a> {
    /// Manager for the current selection of `diagram`.
    ///
    /// Seeds the default snap configuration when the diagram has none.
    /// When the whole selection lives in one group, members of that group
    /// and of its ancestor groups are targets along with top-level elements;
    /// otherwise only top-level elements are. The selection and its ancestors
    /// are never targets.
    pub fn create(diagram: &'a mut Diagram) -> Self {
        diagram.ensure_snap_config();
        let diagram: &'a Diagram = diagram;
        let config = diagram.snap_config.clone().unwrap_or_default();
        let eligible = selection_predicate(diagram, &diagram.selection);
        Self::with_predicate(diagram, eligible, &config)
    }

    /// Manager with an explicit target predicate.
    pub fn new(
        diagram: &'a Diagram,
        eligible: impl Fn(ElementId) -> bool + 'a,
        config: &SnapConfig,
    ) -> Self {
        Self::with_predicate(diagram, Box::new(eligible), config)
    }

    fn with_predicate(diagram: &'a Diagram, eligible: Box<EligibleFn<'a>>, config: &SnapConfig) -> Self {
        let config = config.sanitized();
        Self {
            diagram,
            eligible,
            threshold: config.threshold,
            enabled: config.enabled,
            types: config.enabled_types(),
            grid_size: config.grid_size,
        }
    }

    /// Whether `id` may act as an alignment target.
    pub fn is_eligible(&self, id: ElementId) -> bool {
        (self.eligible)(id)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enabled target types, highest priority first.
    pub fn types(&self) -> &[MagnetType] {
        &self.types
    }

    fn providers(&self) -> SnapProviders<'_> {
        SnapProviders::new(self.diagram, &*self.eligible, self.grid_size)
    }

    fn has_type(&self, magnet_type: MagnetType) -> bool {
        self.types.contains(&magnet_type)
    }

    /// Rank of a type in the priority list; lower wins.
    fn rank(&self, magnet_type: MagnetType) -> usize {
        self.types
            .iter()
            .position(|&t| t == magnet_type)
            .unwrap_or(usize::MAX)
    }

    /// Snap a point to the grid.
    pub fn snap_point(&self, point: Point) -> SnapResult<Point> {
        if !self.enabled || !self.has_type(MagnetType::Grid) {
            return SnapResult::unchanged(point, Vec::new());
        }
        SnapResult::unchanged(GridSnapProvider::snap_point(point, self.grid_size), Vec::new())
    }

    /// Snap a horizontal or vertical line onto the nearest node edge,
    /// falling back to the grid.
    ///
    /// # Panics
    ///
    /// Panics if the line is neither horizontal nor vertical.
    pub fn snap_ortho_linear_line(&self, line: Line) -> SnapResult<Line> {
        assert!(line.is_orthogonal(), "line must be horizontal or vertical");
        let axis = line.axis();
        let own = |line: Line| vec![Magnet::with_axis(line, axis, MagnetKind::Source { center: false })];
        if !self.enabled {
            return SnapResult::unchanged(line, own(line));
        }

        if self.has_type(MagnetType::Node) {
            let providers = self.providers();
            let node = providers.get(MagnetType::Node);
            let position = line.position();
            let hit = node
                .magnets(&Bounds::from_line(&line))
                .into_iter()
                .find(|m| m.axis == axis && !m.is_center() && (m.position() - position).abs() <= self.threshold);

            if let Some(target) = hit {
                let adjusted = line.translate(axis_offset(axis, target.position() - position));
                let magnets = own(adjusted);
                let pair = MatchingMagnetPair::new(magnets[0].clone(), target);
                let markers = node
                    .mark(&Bounds::from_line(&adjusted), &pair, axis)
                    .into_iter()
                    .collect();
                log::trace!("Line snapped to node magnet at {}", pair.matching.position());
                return SnapResult {
                    adjusted,
                    markers,
                    magnets,
                };
            }
        }

        if self.has_type(MagnetType::Grid) {
            let snapped = GridSnapProvider::snap_point(line.from, self.grid_size);
            let adjusted = line.translate(snapped - line.from);
            return SnapResult::unchanged(adjusted, own(adjusted));
        }
        SnapResult::unchanged(line, own(line))
    }

    /// Round the rotation to the nearest [`ROTATION_STEP_DEGREES`].
    pub fn snap_rotate(&self, bounds: Bounds) -> SnapResult<Bounds> {
        if !self.enabled {
            return SnapResult::unchanged(bounds, Magnet::source_magnets(&bounds));
        }
        let step = ROTATION_STEP_DEGREES.to_radians();
        let adjusted = bounds.with_rotation((bounds.rotation / step).round() * step);
        SnapResult::unchanged(adjusted, Magnet::source_magnets(&adjusted))
    }

    /// Snap the edges in `directions` while resizing.
    ///
    /// North and west edges move the box origin, south and east edges only
    /// change its size.
    pub fn snap_resize(&self, bounds: Bounds, directions: &[Direction]) -> SnapResult<Bounds> {
        let keep = |m: &Magnet| !m.is_center() && m.match_direction.is_some_and(|d| directions.contains(&d));
        self.snap_bounds(bounds, &keep, &self.types, Adjust::Resize)
    }

    /// Snap a moving box.
    ///
    /// Centerlines take part on the axes `directions` touch; edges only when
    /// their direction is listed. Size magnets are ignored.
    pub fn snap_move(&self, bounds: Bounds, directions: &[Direction]) -> SnapResult<Bounds> {
        let keep = |m: &Magnet| {
            if m.is_center() {
                directions.iter().any(|d| d.axis() == m.axis)
            } else {
                m.match_direction.is_some_and(|d| directions.contains(&d))
            }
        };
        let types: Vec<MagnetType> = self
            .types
            .iter()
            .copied()
            .filter(|&t| t != MagnetType::Size)
            .collect();
        self.snap_bounds(bounds, &keep, &types, Adjust::Move)
    }

    fn snap_bounds(
        &self,
        bounds: Bounds,
        keep: &dyn Fn(&Magnet) -> bool,
        types: &[MagnetType],
        adjust: Adjust,
    ) -> SnapResult<Bounds> {
        if !self.enabled || types.is_empty() {
            return SnapResult::unchanged(bounds, Magnet::source_magnets(&bounds));
        }

        let providers = self.providers();
        let targets = providers.magnets(&bounds, types);
        let sources: Vec<Magnet> = Magnet::source_magnets(&bounds).into_iter().filter(|m| keep(m)).collect();

        let mut candidates = Vec::new();
        for (index, source) in sources.iter().enumerate() {
            for target in &targets {
                if let Some(distance) = source.match_distance(target, self.threshold) {
                    candidates.push(Candidate {
                        source: index,
                        target: target.clone(),
                        distance,
                    });
                }
            }
        }
        log::trace!(
            "{} candidates for {} source magnets against {} targets",
            candidates.len(),
            sources.len(),
            targets.len()
        );

        let mut adjusted = bounds;
        for axis in Axis::ALL {
            let best = candidates
                .iter()
                .filter(|c| c.target.axis == axis)
                .min_by(|a, b| {
                    a.distance
                        .abs()
                        .total_cmp(&b.distance.abs())
                        .then_with(|| self.rank(a.target.magnet_type()).cmp(&self.rank(b.target.magnet_type())))
                });
            let Some(best) = best else {
                continue;
            };
            let source = &sources[best.source];
            adjusted = match adjust {
                Adjust::Move => adjusted.translate(axis_offset(axis, best.distance)),
                Adjust::Resize => match source.match_direction {
                    Some(dir) => resize_edge(adjusted, dir, best.distance),
                    None => adjusted,
                },
            };
        }

        let magnets = Magnet::source_magnets(&adjusted);
        let moved: Vec<Magnet> = magnets.iter().filter(|&m| keep(m)).cloned().collect();
        let markers = self.markers(&providers, &adjusted, &moved, &candidates, types);
        if !markers.is_empty() {
            log::debug!("Snapped to {} markers", markers.len());
        }
        SnapResult {
            adjusted,
            markers,
            magnets,
        }
    }

    /// Markers for every source magnet that now sits exactly on a candidate.
    fn markers(
        &self,
        providers: &SnapProviders<'_>,
        bounds: &Bounds,
        sources: &[Magnet],
        candidates: &[Candidate],
        types: &[MagnetType],
    ) -> Vec<SnapMarker> {
        let mut markers = Vec::new();
        for (index, source) in sources.iter().enumerate() {
            let hit = candidates
                .iter()
                .filter(|c| c.source == index)
                .filter(|c| source.distance_to(&c.target).abs() < EPSILON)
                .min_by_key(|c| self.rank(c.target.magnet_type()));
            let Some(hit) = hit else {
                continue;
            };
            let pair = MatchingMagnetPair::new(source.clone(), hit.target.clone());
            if let Some(marker) = providers
                .get(hit.target.magnet_type())
                .mark(bounds, &pair, source.axis)
            {
                markers.push(marker);
            }
        }

        let mut grouped = Vec::with_capacity(markers.len());
        for &magnet_type in types {
            let of_type: Vec<SnapMarker> = markers
                .iter()
                .filter(|m| m.matching_magnet.magnet_type() == magnet_type)
                .cloned()
                .collect();
            if !of_type.is_empty() {
                grouped.extend(providers.get(magnet_type).filter_markers(of_type));
            }
        }
        grouped
    }

    /// Drop markers whose matched line no longer lies on an edge or
    /// centerline of `bounds`.
    pub fn revise_markers(markers: Vec<SnapMarker>, bounds: &Bounds) -> Vec<SnapMarker> {
        markers.into_iter().filter(|m| m.touches(bounds)).collect()
    }
}

/// Move one edge of `bounds` by `offset`.
pub(crate) fn resize_edge(bounds: Bounds, dir: Direction, offset: f64) -> Bounds {
    let mut resized = bounds;
    match dir {
        Direction::N => {
            resized.y += offset;
            resized.h -= offset;
        }
        Direction::S => resized.h += offset,
        Direction::W => {
            resized.x += offset;
            resized.w -= offset;
        }
        Direction::E => resized.w += offset,
    }
    if resized.w < 0.0 || resized.h < 0.0 {
        log::trace!("Ignoring snap that would invert the box");
        return bounds;
    }
    resized
}

/// Target predicate for a selection of `diagram`.
pub(crate) fn selection_predicate<'a>(diagram: &'a Diagram, selection: &[ElementId]) -> Box<EligibleFn<'a>> {
    let selected: HashSet<ElementId> = selection.iter().copied().collect();
    let shared_parent = selection
        .first()
        .and_then(|&id| diagram.parent_of(id))
        .filter(|&parent| selection.iter().all(|&id| diagram.parent_of(id) == Some(parent)));

    match shared_parent {
        Some(parent) => {
            let mut groups: HashSet<ElementId> = diagram.ancestors(parent).into_iter().collect();
            groups.insert(parent);
            log::debug!("Snapping inside group {parent} ({} enclosing groups)", groups.len());
            Box::new(move |id| {
                if selected.contains(&id) || groups.contains(&id) {
                    return false;
                }
                diagram.parent_of(id).is_none_or(|p| groups.contains(&p))
            })
        }
        None => Box::new(move |id| !selected.contains(&id) && diagram.parent_of(id).is_none()),
    }
}
