use crate::core::types::{Direction, Point};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Axis-aligned wire segment on the grid.
///
/// The canonical form has a non-negative length; the constructor flips the
/// origin when handed a negative one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawWire")]
pub struct Wire {
    pub pos: Point,
    pub length: i32,
    pub direction: Direction,
}

/// Wire as received, normalised through [`Wire::new`]
#[derive(Deserialize)]
struct RawWire {
    pos: Point,
    length: i32,
    direction: Direction,
}

impl From<RawWire> for Wire {
    fn from(raw: RawWire) -> Self {
        Wire::new(raw.pos, raw.length, raw.direction)
    }
}

impl Wire {
    pub fn new(pos: Point, length: i32, direction: Direction) -> Self {
        if length < 0 {
            let pos = match direction {
                Direction::Horizontal => Point::new(pos.x + length, pos.y),
                Direction::Vertical => Point::new(pos.x, pos.y + length),
            };
            Self { pos, length: -length, direction }
        } else {
            Self { pos, length, direction }
        }
    }

    pub fn horizontal(pos: Point, length: i32) -> Self {
        Self::new(pos, length, Direction::Horizontal)
    }

    pub fn vertical(pos: Point, length: i32) -> Self {
        Self::new(pos, length, Direction::Vertical)
    }

    /// Wire snapped to the dominant axis of `to - from`, anchored at `from`.
    ///
    /// Ties go to the vertical axis.
    pub fn between(from: Point, to: Point) -> Self {
        let diff = to - from;
        if diff.x.abs() > diff.y.abs() {
            Self::horizontal(from, diff.x)
        } else {
            Self::vertical(from, diff.y)
        }
    }

    /// Build from a span `[start, end]` along `direction` on the line `line`
    pub(crate) fn from_span(direction: Direction, line: i32, start: i32, end: i32) -> Self {
        match direction {
            Direction::Horizontal => Self::horizontal(Point::new(start, line), end - start),
            Direction::Vertical => Self::vertical(Point::new(line, start), end - start),
        }
    }

    pub fn end(&self) -> Point {
        match self.direction {
            Direction::Horizontal => Point::new(self.pos.x + self.length, self.pos.y),
            Direction::Vertical => Point::new(self.pos.x, self.pos.y + self.length),
        }
    }

    /// Fixed coordinate of the line the wire lies on
    pub fn line(&self) -> i32 {
        match self.direction {
            Direction::Horizontal => self.pos.y,
            Direction::Vertical => self.pos.x,
        }
    }

    /// `[start, end]` along the wire's axis
    pub fn span(&self) -> (i32, i32) {
        let start = along(self.direction, self.pos);
        (start, start + self.length)
    }

    /// Inclusive of both endpoints
    pub fn is_point_on_wire(&self, point: Point) -> bool {
        if point_line(self.direction, point) != self.line() {
            return false;
        }
        let (start, end) = self.span();
        let t = along(self.direction, point);
        start <= t && t <= end
    }

    /// Exclusive of both endpoints
    pub fn is_point_inside_wire(&self, point: Point) -> bool {
        if point_line(self.direction, point) != self.line() {
            return false;
        }
        let (start, end) = self.span();
        let t = along(self.direction, point);
        start < t && t < end
    }

    pub fn is_connection_point(&self, point: Point) -> bool {
        self.pos == point || self.end() == point
    }

    pub fn is_collinear_with(&self, other: &Wire) -> bool {
        self.direction == other.direction && self.line() == other.line()
    }

    /// Collinear, with closed spans that intersect
    pub fn touches_or_overlaps(&self, other: &Wire) -> bool {
        if !self.is_collinear_with(other) {
            return false;
        }
        let (a_start, a_end) = self.span();
        let (b_start, b_end) = other.span();
        a_start.max(b_start) <= a_end.min(b_end)
    }

    /// Cut the wire at every given point lying strictly inside it
    pub fn split_at<'a, I>(&self, points: I) -> Vec<Wire>
    where
        I: IntoIterator<Item = &'a Point>,
    {
        let mut cuts: Vec<i32> = points
            .into_iter()
            .filter(|p| self.is_point_inside_wire(**p))
            .map(|p| along(self.direction, *p))
            .collect();
        cuts.sort_unstable();
        cuts.dedup();

        let (start, end) = self.span();
        let mut pieces = Vec::with_capacity(cuts.len() + 1);
        let mut from = start;
        for cut in cuts.into_iter().chain(std::iter::once(end)) {
            pieces.push(Wire::from_span(self.direction, self.line(), from, cut));
            from = cut;
        }
        pieces
    }
}

/// Grid point at position `t` along a line of the given axis
pub(crate) fn point_on_line(direction: Direction, line: i32, t: i32) -> Point {
    match direction {
        Direction::Horizontal => Point::new(t, line),
        Direction::Vertical => Point::new(line, t),
    }
}

pub(crate) fn along(direction: Direction, point: Point) -> i32 {
    match direction {
        Direction::Horizontal => point.x,
        Direction::Vertical => point.y,
    }
}

fn point_line(direction: Direction, point: Point) -> i32 {
    match direction {
        Direction::Horizontal => point.y,
        Direction::Vertical => point.x,
    }
}

impl fmt::Display for Wire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Wire({}, len={}, {:?})", self.pos, self.length, self.direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_length_flips_origin() {
        let wire = Wire::horizontal(Point::new(5, 2), -3);
        assert_eq!(wire.pos, Point::new(2, 2));
        assert_eq!(wire.length, 3);
        assert_eq!(wire.end(), Point::new(5, 2));

        let wire = Wire::vertical(Point::new(0, 0), -4);
        assert_eq!(wire, Wire::vertical(Point::new(0, -4), 4));
    }

    #[test]
    fn test_deserialize_normalises_negative_length() {
        let json = r#"{"pos":{"x":5,"y":2},"length":-3,"direction":"Horizontal"}"#;
        let wire: Wire = serde_json::from_str(json).unwrap();
        assert_eq!(wire, Wire::horizontal(Point::new(2, 2), 3));
    }

    #[test]
    fn test_point_membership() {
        let wire = Wire::horizontal(Point::new(0, 0), 4);
        assert!(wire.is_point_on_wire(Point::new(0, 0)));
        assert!(wire.is_point_on_wire(Point::new(4, 0)));
        assert!(!wire.is_point_inside_wire(Point::new(4, 0)));
        assert!(wire.is_point_inside_wire(Point::new(2, 0)));
        assert!(!wire.is_point_on_wire(Point::new(2, 1)));
        assert!(wire.is_connection_point(Point::new(4, 0)));
        assert!(!wire.is_connection_point(Point::new(2, 0)));
    }

    #[test]
    fn test_between_snaps_to_dominant_axis() {
        assert_eq!(
            Wire::between(Point::new(0, 0), Point::new(5, 1)),
            Wire::horizontal(Point::new(0, 0), 5)
        );
        assert_eq!(
            Wire::between(Point::new(0, 0), Point::new(1, -3)),
            Wire::vertical(Point::new(0, -3), 3)
        );
    }

    #[test]
    fn test_touches_or_overlaps() {
        let a = Wire::horizontal(Point::new(0, 0), 5);
        assert!(a.touches_or_overlaps(&Wire::horizontal(Point::new(5, 0), 5)));
        assert!(a.touches_or_overlaps(&Wire::horizontal(Point::new(2, 0), 1)));
        assert!(!a.touches_or_overlaps(&Wire::horizontal(Point::new(6, 0), 5)));
        assert!(!a.touches_or_overlaps(&Wire::horizontal(Point::new(0, 1), 5)));
        assert!(!a.touches_or_overlaps(&Wire::vertical(Point::new(0, 0), 5)));
    }

    #[test]
    fn test_split_at() {
        let wire = Wire::vertical(Point::new(1, 0), 10);
        let points = [Point::new(1, 7), Point::new(1, 3), Point::new(1, 10), Point::new(2, 5)];
        assert_eq!(
            wire.split_at(points.iter()),
            vec![
                Wire::vertical(Point::new(1, 0), 3),
                Wire::vertical(Point::new(1, 3), 4),
                Wire::vertical(Point::new(1, 7), 3),
            ]
        );
        assert_eq!(wire.split_at(std::iter::empty()), vec![wire]);
    }
}
