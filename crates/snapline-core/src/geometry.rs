//! Geometric primitives used by the snapping engine.

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Tolerance used when comparing coordinates that should coincide.
pub const EPSILON: f64 = 1e-3;

/// Axis of a magnet line.
///
/// A horizontal line (`H`) constrains the Y coordinate, a vertical line (`V`)
/// constrains the X coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Axis {
    H,
    V,
}

impl Axis {
    pub const ALL: [Axis; 2] = [Axis::H, Axis::V];

    /// The other axis.
    pub fn orthogonal(self) -> Self {
        match self {
            Axis::H => Axis::V,
            Axis::V => Axis::H,
        }
    }

    /// Point on a line of this axis at `position`, `along` the line.
    pub fn point(self, position: f64, along: f64) -> Point {
        match self {
            Axis::H => Point::new(along, position),
            Axis::V => Point::new(position, along),
        }
    }
}

/// Cardinal direction of a box edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    N,
    S,
    E,
    W,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::N, Direction::S, Direction::E, Direction::W];

    /// Axis of the edge line facing this direction.
    /// North and south edges are horizontal lines.
    pub fn axis(self) -> Axis {
        match self {
            Direction::N | Direction::S => Axis::H,
            Direction::E | Direction::W => Axis::V,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::N => Direction::S,
            Direction::S => Direction::N,
            Direction::E => Direction::W,
            Direction::W => Direction::E,
        }
    }

    /// Sign of the coordinate change when travelling in this direction.
    pub fn sign(self) -> f64 {
        match self {
            Direction::N | Direction::W => -1.0,
            Direction::S | Direction::E => 1.0,
        }
    }

    /// Near edges move the origin of a box when resized.
    pub fn is_near_edge(self) -> bool {
        matches!(self, Direction::N | Direction::W)
    }
}

/// Closed interval on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub from: f64,
    pub to: f64,
}

impl Range {
    pub fn new(a: f64, b: f64) -> Self {
        Self {
            from: a.min(b),
            to: a.max(b),
        }
    }

    /// Overlap of two ranges. Ranges that only touch intersect in a single point.
    pub fn intersection(self, other: Range) -> Option<Range> {
        let from = self.from.max(other.from);
        let to = self.to.min(other.to);
        (from <= to).then_some(Range { from, to })
    }

    pub fn intersects(self, other: Range) -> bool {
        self.intersection(other).is_some()
    }

    pub fn union(self, other: Range) -> Range {
        Range {
            from: self.from.min(other.from),
            to: self.to.max(other.to),
        }
    }

    pub fn midpoint(self) -> f64 {
        (self.from + self.to) / 2.0
    }

    pub fn length(self) -> f64 {
        self.to - self.from
    }

    pub fn contains(self, value: f64) -> bool {
        value >= self.from && value <= self.to
    }
}

/// A line segment between two points.
///
/// Magnet lines are always exactly horizontal or exactly vertical.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub from: Point,
    pub to: Point,
}

impl Line {
    pub fn new(from: Point, to: Point) -> Self {
        Self { from, to }
    }

    /// Horizontal line at `y` spanning `range` on the X axis.
    pub fn horizontal(y: f64, range: Range) -> Self {
        Self::new(Point::new(range.from, y), Point::new(range.to, y))
    }

    /// Vertical line at `x` spanning `range` on the Y axis.
    pub fn vertical(x: f64, range: Range) -> Self {
        Self::new(Point::new(x, range.from), Point::new(x, range.to))
    }

    /// Axis-aligned line of the given axis at `position`.
    pub fn of_axis(axis: Axis, position: f64, range: Range) -> Self {
        match axis {
            Axis::H => Self::horizontal(position, range),
            Axis::V => Self::vertical(position, range),
        }
    }

    pub fn is_horizontal(&self) -> bool {
        self.from.y == self.to.y
    }

    pub fn is_vertical(&self) -> bool {
        self.from.x == self.to.x
    }

    /// Exactly one of horizontal or vertical. Degenerate points are neither.
    pub fn is_orthogonal(&self) -> bool {
        self.is_horizontal() != self.is_vertical()
    }

    /// Axis of an orthogonal line. Degenerate lines report `H`.
    pub fn axis(&self) -> Axis {
        if self.is_vertical() && !self.is_horizontal() {
            Axis::V
        } else {
            Axis::H
        }
    }

    /// The constrained coordinate: Y for horizontal lines, X for vertical ones.
    pub fn position(&self) -> f64 {
        match self.axis() {
            Axis::H => self.from.y,
            Axis::V => self.from.x,
        }
    }

    /// Extent of the line along its own direction.
    pub fn extent(&self) -> Range {
        match self.axis() {
            Axis::H => Range::new(self.from.x, self.to.x),
            Axis::V => Range::new(self.from.y, self.to.y),
        }
    }

    pub fn midpoint(&self) -> Point {
        self.from.midpoint(self.to)
    }

    pub fn length(&self) -> f64 {
        self.from.distance(self.to)
    }

    pub fn translate(&self, offset: Vec2) -> Self {
        Self::new(self.from + offset, self.to + offset)
    }
}

/// Position and size of a diagram element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    /// Rotation angle in radians (around center).
    #[serde(default)]
    pub rotation: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            x,
            y,
            w,
            h,
            rotation: 0.0,
        }
    }

    pub fn with_rotation(self, rotation: f64) -> Self {
        Self { rotation, ..self }
    }

    /// Degenerate bounds around a line, used to query magnets for lines.
    pub fn from_line(line: &Line) -> Self {
        let x0 = line.from.x.min(line.to.x);
        let y0 = line.from.y.min(line.to.y);
        Self::new(
            x0,
            y0,
            (line.from.x - line.to.x).abs(),
            (line.from.y - line.to.y).abs(),
        )
    }

    pub fn from_rect(rect: Rect) -> Self {
        Self::new(rect.x0, rect.y0, rect.width(), rect.height())
    }

    /// Unrotated rectangle in world coordinates.
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.w, self.y + self.h)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn area(&self) -> f64 {
        (self.w * self.h).abs()
    }

    pub fn is_rotated(&self) -> bool {
        self.rotation.abs() > f64::EPSILON
    }

    /// Strict overlap: boxes that only share an edge do not intersect.
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.rect().intersect(other.rect()).area() > 0.0
    }

    pub fn translate(&self, offset: Vec2) -> Self {
        Self {
            x: self.x + offset.x,
            y: self.y + offset.y,
            ..*self
        }
    }

    /// Extent of the box on the axis along which lines of `axis` run.
    ///
    /// Horizontal lines run along X, so `range(H)` is `[x, x + w]`.
    pub fn range(&self, axis: Axis) -> Range {
        match axis {
            Axis::H => Range::new(self.x, self.x + self.w),
            Axis::V => Range::new(self.y, self.y + self.h),
        }
    }

    /// Coordinate of the edge facing `dir`.
    pub fn edge_position(&self, dir: Direction) -> f64 {
        match dir {
            Direction::N => self.y,
            Direction::S => self.y + self.h,
            Direction::W => self.x,
            Direction::E => self.x + self.w,
        }
    }

    /// Center coordinate constrained by lines of `axis`.
    pub fn center_position(&self, axis: Axis) -> f64 {
        match axis {
            Axis::H => self.y + self.h / 2.0,
            Axis::V => self.x + self.w / 2.0,
        }
    }

    /// Size of the box measured across lines of `axis` (height for `H`).
    pub fn size_across(&self, axis: Axis) -> f64 {
        match axis {
            Axis::H => self.h,
            Axis::V => self.w,
        }
    }

    /// Edge line facing `dir`.
    pub fn edge(&self, dir: Direction) -> Line {
        let axis = dir.axis();
        Line::of_axis(axis, self.edge_position(dir), self.range(axis))
    }

    pub fn approx_eq(&self, other: &Bounds) -> bool {
        (self.x - other.x).abs() < EPSILON
            && (self.y - other.y).abs() < EPSILON
            && (self.w - other.w).abs() < EPSILON
            && (self.h - other.h).abs() < EPSILON
            && (self.rotation - other.rotation).abs() < EPSILON
    }
}

/// Offset along the coordinate constrained by `axis`.
pub fn axis_offset(axis: Axis, amount: f64) -> Vec2 {
    match axis {
        Axis::H => Vec2::new(0.0, amount),
        Axis::V => Vec2::new(amount, 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_orthogonal() {
        assert_eq!(Axis::H.orthogonal(), Axis::V);
        assert_eq!(Axis::V.orthogonal(), Axis::H);
    }

    #[test]
    fn test_direction_axis() {
        assert_eq!(Direction::N.axis(), Axis::H);
        assert_eq!(Direction::S.axis(), Axis::H);
        assert_eq!(Direction::E.axis(), Axis::V);
        assert_eq!(Direction::W.axis(), Axis::V);
        assert_eq!(Direction::N.opposite(), Direction::S);
        assert_eq!(Direction::E.opposite(), Direction::W);
    }

    #[test]
    fn test_range_intersection() {
        let a = Range::new(0.0, 10.0);
        let b = Range::new(5.0, 20.0);
        assert_eq!(a.intersection(b), Some(Range::new(5.0, 10.0)));

        // Touching ranges overlap in one point
        let c = Range::new(10.0, 30.0);
        assert_eq!(a.intersection(c), Some(Range::new(10.0, 10.0)));

        let d = Range::new(11.0, 30.0);
        assert!(a.intersection(d).is_none());
    }

    #[test]
    fn test_range_normalizes_order() {
        let r = Range::new(10.0, 2.0);
        assert_eq!(r.from, 2.0);
        assert_eq!(r.to, 10.0);
        assert!((r.midpoint() - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_line_orientation() {
        let h = Line::horizontal(5.0, Range::new(0.0, 10.0));
        assert!(h.is_horizontal());
        assert!(!h.is_vertical());
        assert!(h.is_orthogonal());
        assert_eq!(h.axis(), Axis::H);
        assert!((h.position() - 5.0).abs() < f64::EPSILON);

        let v = Line::vertical(3.0, Range::new(0.0, 10.0));
        assert_eq!(v.axis(), Axis::V);
        assert!((v.position() - 3.0).abs() < f64::EPSILON);

        let diagonal = Line::new(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        assert!(!diagonal.is_orthogonal());
    }

    #[test]
    fn test_bounds_edges() {
        let b = Bounds::new(10.0, 20.0, 100.0, 50.0);
        assert!((b.edge_position(Direction::N) - 20.0).abs() < f64::EPSILON);
        assert!((b.edge_position(Direction::S) - 70.0).abs() < f64::EPSILON);
        assert!((b.edge_position(Direction::W) - 10.0).abs() < f64::EPSILON);
        assert!((b.edge_position(Direction::E) - 110.0).abs() < f64::EPSILON);
        assert_eq!(b.range(Axis::H), Range::new(10.0, 110.0));
        assert_eq!(b.range(Axis::V), Range::new(20.0, 70.0));
        assert_eq!(b.center(), Point::new(60.0, 45.0));
    }

    #[test]
    fn test_bounds_intersects_is_strict() {
        let a = Bounds::new(0.0, 0.0, 10.0, 10.0);
        let touching = Bounds::new(10.0, 0.0, 10.0, 10.0);
        let overlapping = Bounds::new(5.0, 5.0, 10.0, 10.0);
        assert!(!a.intersects(&touching));
        assert!(a.intersects(&overlapping));
    }

    #[test]
    fn test_bounds_rect_roundtrip() {
        let b = Bounds::new(1.0, 2.0, 3.0, 4.0);
        assert!(Bounds::from_rect(b.rect()).approx_eq(&b));
    }
}
