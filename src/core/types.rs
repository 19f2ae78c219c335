use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use uuid::Uuid;

/// Integer grid coordinate. Ordered by `x`, then `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Lane-wise minimum of two points
    pub fn component_min(self, other: Point) -> Point {
        Point::new(self.x.min(other.x), self.y.min(other.y))
    }

    /// Lane-wise maximum of two points
    pub fn component_max(self, other: Point) -> Point {
        Point::new(self.x.max(other.x), self.y.max(other.y))
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Point::new(x, y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Axis of a wire segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    Horizontal,
    Vertical,
}

/// Facing of a placed component.
///
/// `East` is the reference orientation of every port table. Each following
/// variant is a further quarter turn clockwise on a y-down grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    East,
    South,
    West,
    North,
}

impl Orientation {
    /// Rotate an East-relative offset into this orientation
    pub fn rotate(self, offset: Point) -> Point {
        match self {
            Orientation::East => offset,
            Orientation::South => Point::new(-offset.y, offset.x),
            Orientation::West => Point::new(-offset.x, -offset.y),
            Orientation::North => Point::new(offset.y, -offset.x),
        }
    }
}

/// Opaque identifier of a placed component instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId(Uuid);

impl InstanceId {
    /// Generate a fresh random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Signal direction of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeFlags {
    Input,
    Output,
    InOut,
}

impl NodeFlags {
    pub fn is_input(self) -> bool {
        matches!(self, NodeFlags::Input | NodeFlags::InOut)
    }

    pub fn is_output(self) -> bool {
        matches!(self, NodeFlags::Output | NodeFlags::InOut)
    }
}

/// A port at a grid position. Equality is structural.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Node {
    pub pos: Point,
    pub flags: NodeFlags,
}

impl Node {
    pub fn new(pos: Point, flags: NodeFlags) -> Self {
        Self { pos, flags }
    }

    pub fn input(pos: Point) -> Self {
        Self::new(pos, NodeFlags::Input)
    }

    pub fn output(pos: Point) -> Self {
        Self::new(pos, NodeFlags::Output)
    }
}
