use super::wire::{along, point_on_line, Wire};
use crate::core::errors::{SimError, SimResult};
use crate::core::transactions::{ControlPointsTransaction, WireTransaction};
use crate::core::types::{Direction, Point};
use log::warn;
use std::collections::{btree_set, BTreeSet};

/// How a drag gesture on the grid is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragEdit {
    /// Draw a new wire
    Add(Wire),
    /// Shrink an existing wire by dragging one of its ends inwards
    Modify { old: Wire, new: Wire },
    /// Drag exactly over an existing wire
    Remove(Wire),
}

/// The segment set together with its control points.
///
/// Invariant: collinear segments never overlap and only touch at a control
/// point, and no control point lies strictly inside a segment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WireSet {
    wires: BTreeSet<Wire>,
    control_points: BTreeSet<Point>,
}

impl WireSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a normalized set by adding `wires` one after another
    pub fn from_wires<I: IntoIterator<Item = Wire>>(wires: I) -> Self {
        let mut set = Self::new();
        for wire in wires {
            if let Some(transaction) = set.create_add_wire_transaction(wire) {
                set.apply_wire_transaction(&transaction);
            }
        }
        set
    }

    pub fn wires(&self) -> &BTreeSet<Wire> {
        &self.wires
    }

    pub fn control_points(&self) -> &BTreeSet<Point> {
        &self.control_points
    }

    pub fn contains(&self, wire: &Wire) -> bool {
        self.wires.contains(wire)
    }

    pub fn len(&self) -> usize {
        self.wires.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wires.is_empty()
    }

    pub fn iter(&self) -> btree_set::Iter<'_, Wire> {
        self.wires.iter()
    }

    /// Wires that have `point` as one of their endpoints
    pub fn wires_ending_at(&self, point: Point) -> impl Iterator<Item = &Wire> {
        self.wires.iter().filter(move |w| w.is_connection_point(point))
    }

    // ---- transaction builders (pure) ----

    /// Add a wire, merging it with every collinear segment it overlaps or
    /// touches away from a control point.
    ///
    /// Returns `None` for a zero-length wire or when nothing would change.
    pub fn create_add_wire_transaction(&self, wire: Wire) -> Option<WireTransaction> {
        if wire.length == 0 {
            return None;
        }
        let (deleted, created) = self.merge(wire, None);
        if created.iter().eq(deleted.iter()) {
            return None;
        }
        Some(WireTransaction { wire, deleted: deleted.into_iter().collect(), created })
    }

    /// Replace `old` with `new`, merging `new` with its collinear neighbours.
    ///
    /// A zero-length `new` degenerates into removing `old`.
    pub fn create_modify_wire_transaction(&self, old: Wire, new: Wire) -> SimResult<Option<WireTransaction>> {
        if !self.wires.contains(&old) {
            return Err(SimError::UnknownWire(old));
        }
        if new.length == 0 {
            return self.create_remove_wire_transaction(old).map(Some);
        }
        let (mut deleted, created) = self.merge(new, Some(&old));
        deleted.insert(old);
        if created.iter().eq(deleted.iter()) {
            return Ok(None);
        }
        Ok(Some(WireTransaction { wire: new, deleted: deleted.into_iter().collect(), created }))
    }

    /// Delete a segment. Neighbours are left as they are.
    pub fn create_remove_wire_transaction(&self, wire: Wire) -> SimResult<WireTransaction> {
        if !self.wires.contains(&wire) {
            return Err(SimError::UnknownWire(wire));
        }
        Ok(WireTransaction { wire, deleted: vec![wire], created: Vec::new() })
    }

    /// Classify a drag from `start` to `end`.
    ///
    /// When more than one wire ends at `start` the drag always draws a new
    /// wire. Otherwise grabbing the end of a wire and releasing strictly
    /// inside it shrinks that wire, and retracing a wire exactly removes it.
    pub fn classify_drag(&self, start: Point, end: Point) -> DragEdit {
        let drag = Wire::between(start, end);
        if self.wires_ending_at(start).count() > 1 {
            return DragEdit::Add(drag);
        }
        for wire in self.wires.iter().filter(|w| w.direction == drag.direction) {
            let line = wire.line();
            let (wire_start, wire_end) = wire.span();
            if start == wire.pos && wire.is_point_inside_wire(drag.end()) {
                let cut = along(drag.direction, drag.end());
                let new = Wire::from_span(wire.direction, line, cut, wire_end);
                return DragEdit::Modify { old: *wire, new };
            }
            if start == wire.end() && wire.is_point_inside_wire(drag.pos) {
                let cut = along(drag.direction, drag.pos);
                let new = Wire::from_span(wire.direction, line, wire_start, cut);
                return DragEdit::Modify { old: *wire, new };
            }
            if drag == *wire {
                return DragEdit::Remove(*wire);
            }
        }
        DragEdit::Add(drag)
    }

    /// Build the transaction for a drag gesture, see [`WireSet::classify_drag`]
    pub fn create_wire_drag_transaction(&self, start: Point, end: Point) -> SimResult<Option<WireTransaction>> {
        match self.classify_drag(start, end) {
            DragEdit::Add(wire) => Ok(self.create_add_wire_transaction(wire)),
            DragEdit::Modify { old, new } => self.create_modify_wire_transaction(old, new),
            DragEdit::Remove(wire) => self.create_remove_wire_transaction(wire).map(Some),
        }
    }

    /// Add control points (splitting every wire they lie strictly inside) or
    /// remove them (joining the two collinear wires that meet there).
    ///
    /// Points that are already in the requested state are ignored; `None`
    /// when no point is left.
    pub fn create_control_points_transaction(&self, points: &[Point], removing: bool) -> Option<ControlPointsTransaction> {
        let points: BTreeSet<Point> = points
            .iter()
            .copied()
            .filter(|p| self.control_points.contains(p) == removing)
            .collect();
        if points.is_empty() {
            return None;
        }

        let mut working = self.wires.clone();
        if removing {
            for point in &points {
                for direction in [Direction::Horizontal, Direction::Vertical] {
                    let meeting: Vec<Wire> = working
                        .iter()
                        .filter(|w| w.direction == direction && w.is_connection_point(*point))
                        .copied()
                        .collect();
                    if let [a, b] = meeting.as_slice() {
                        let (a_start, a_end) = a.span();
                        let (b_start, b_end) = b.span();
                        let joined = Wire::from_span(direction, a.line(), a_start.min(b_start), a_end.max(b_end));
                        working.remove(a);
                        working.remove(b);
                        working.insert(joined);
                    }
                }
            }
        } else {
            let split: Vec<Wire> = working
                .iter()
                .filter(|w| points.iter().any(|p| w.is_point_inside_wire(*p)))
                .copied()
                .collect();
            for wire in split {
                working.remove(&wire);
                working.extend(wire.split_at(&points));
            }
        }

        let deleted = self.wires.difference(&working).copied().collect();
        let created = working.difference(&self.wires).copied().collect();
        Some(ControlPointsTransaction { removing, points: points.into_iter().collect(), deleted, created })
    }

    /// Grow `wire` over every collinear segment it joins, to a fixed point.
    /// Returns the absorbed segments and the merged span split at control points.
    fn merge(&self, wire: Wire, skip: Option<&Wire>) -> (BTreeSet<Wire>, Vec<Wire>) {
        let direction = wire.direction;
        let line = wire.line();
        let (mut start, mut end) = wire.span();
        let mut absorbed = BTreeSet::new();

        loop {
            let mut grew = false;
            let candidates = self
                .wires
                .iter()
                .filter(|w| w.direction == direction && w.line() == line)
                .filter(|w| Some(*w) != skip);
            for other in candidates {
                if absorbed.contains(other) {
                    continue;
                }
                let (other_start, other_end) = other.span();
                let lo = start.max(other_start);
                let hi = end.min(other_end);
                let joins = lo < hi
                    || (lo == hi && !self.control_points.contains(&point_on_line(direction, line, lo)));
                if joins {
                    absorbed.insert(*other);
                    start = start.min(other_start);
                    end = end.max(other_end);
                    grew = true;
                }
            }
            if !grew {
                break;
            }
        }

        let merged = Wire::from_span(direction, line, start, end);
        (absorbed, merged.split_at(&self.control_points))
    }

    // ---- apply / revert ----

    pub fn apply_wire_transaction(&mut self, transaction: &WireTransaction) {
        self.replace(&transaction.deleted, &transaction.created);
    }

    pub fn revert_wire_transaction(&mut self, transaction: &WireTransaction) {
        self.replace(&transaction.created, &transaction.deleted);
    }

    pub fn apply_control_points_transaction(&mut self, transaction: &ControlPointsTransaction) {
        self.set_control_points(&transaction.points, !transaction.removing);
        self.replace(&transaction.deleted, &transaction.created);
    }

    pub fn revert_control_points_transaction(&mut self, transaction: &ControlPointsTransaction) {
        self.replace(&transaction.created, &transaction.deleted);
        self.set_control_points(&transaction.points, transaction.removing);
    }

    fn set_control_points(&mut self, points: &[Point], present: bool) {
        for point in points {
            if present {
                self.control_points.insert(*point);
            } else {
                self.control_points.remove(point);
            }
        }
    }

    fn replace(&mut self, remove: &[Wire], insert: &[Wire]) {
        for wire in remove {
            if !self.wires.remove(wire) {
                warn!("Removing wire {} that is not in the circuit", wire);
            }
        }
        for wire in insert {
            if !self.wires.insert(*wire) {
                warn!("Wire {} was already in the circuit", wire);
            }
        }
    }
}
