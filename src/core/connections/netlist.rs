use super::union_find::UnionFind;
use crate::core::circuit::{Wire, WireSet};
use crate::core::types::{Direction, InstanceId, Node, Point};
use crate::core::values::Value;
use std::collections::{BTreeMap, BTreeSet};

pub type SubnetId = usize;

/// Reference to one port of a placed instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortRef {
    pub instance: InstanceId,
    pub index: usize,
}

/// A node taking part in connectivity: an instance port, or an external
/// stimulus node when `port` is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Terminal {
    pub node: Node,
    pub port: Option<PortRef>,
}

impl Terminal {
    pub fn external(node: Node) -> Self {
        Self { node, port: None }
    }

    pub fn port(node: Node, instance: InstanceId, index: usize) -> Self {
        Self { node, port: Some(PortRef { instance, index }) }
    }
}

/// Maximal electrically connected group of points
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subnet {
    pub id: SubnetId,
    pub points: BTreeSet<Point>,
    pub wires: BTreeSet<Wire>,
    /// Terminals flagged Output
    pub drivers: Vec<Terminal>,
    /// Terminals flagged Input
    pub readers: Vec<Terminal>,
    /// Last resolved value
    pub value: Value,
}

impl Subnet {
    fn empty() -> Self {
        Self {
            id: 0,
            points: BTreeSet::new(),
            wires: BTreeSet::new(),
            drivers: Vec::new(),
            readers: Vec::new(),
            value: Value::FLOATING,
        }
    }

    /// Smallest point, used for canonical numbering
    fn anchor(&self) -> Option<Point> {
        self.points.iter().next().copied()
    }

    /// Instances owning at least one reader port on this subnet
    pub fn reader_instances(&self) -> impl Iterator<Item = InstanceId> + '_ {
        self.readers.iter().filter_map(|t| t.port.map(|p| p.instance))
    }
}

/// Points and wires that an edit touched
#[derive(Debug, Clone, Default)]
pub struct EditRegion {
    pub wires: Vec<Wire>,
    pub points: Vec<Point>,
}

impl EditRegion {
    pub fn is_empty(&self) -> bool {
        self.wires.is_empty() && self.points.is_empty()
    }

    pub fn extend(&mut self, other: EditRegion) {
        self.wires.extend(other.wires);
        self.points.extend(other.points);
    }
}

/// Partition of the circuit into subnets.
///
/// Subnet ids are canonical: subnets are numbered by their smallest point, so
/// the same geometry always yields the same ids no matter how it was built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Netlist {
    subnets: Vec<Subnet>,
    point_index: BTreeMap<Point, SubnetId>,
    wire_index: BTreeMap<Wire, SubnetId>,
}

impl Netlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full rebuild from the current geometry
    pub fn build(wires: &WireSet, terminals: &[Terminal]) -> Self {
        Self::assemble(partition(wires.iter(), terminals.iter()))
    }

    /// Rebuild only the subnets the edit region reaches; everything else is
    /// carried over together with its cached value.
    ///
    /// Returns the new netlist and the ids of the subnets that were rebuilt.
    pub fn rebuild_incremental(
        &self,
        wires: &WireSet,
        terminals: &[Terminal],
        region: &EditRegion,
    ) -> (Self, BTreeSet<SubnetId>) {
        let mut affected: BTreeSet<SubnetId> = BTreeSet::new();
        for point in &region.points {
            affected.extend(self.subnet_at(*point));
        }
        for wire in &region.wires {
            affected.extend(self.subnet_at(wire.pos));
            affected.extend(self.subnet_at(wire.end()));
            affected.extend(self.subnets_on(wire));
        }

        let kept: Vec<&Subnet> = self.subnets.iter().filter(|s| !affected.contains(&s.id)).collect();
        let kept_wires: BTreeSet<&Wire> = kept.iter().flat_map(|s| s.wires.iter()).collect();
        let kept_points: BTreeSet<&Point> = kept.iter().flat_map(|s| s.points.iter()).collect();

        let local_wires = wires.iter().filter(|w| !kept_wires.contains(w));
        let local_terminals = terminals.iter().filter(|t| !kept_points.contains(&t.node.pos));
        let rebuilt = partition(local_wires, local_terminals);
        let rebuilt_anchors: BTreeSet<Point> = rebuilt.iter().filter_map(Subnet::anchor).collect();

        let mut subnets: Vec<Subnet> = kept.into_iter().cloned().collect();
        subnets.extend(rebuilt);
        let netlist = Self::assemble(subnets);

        let rebuilt_ids = netlist
            .subnets
            .iter()
            .filter(|s| s.anchor().map_or(false, |p| rebuilt_anchors.contains(&p)))
            .map(|s| s.id)
            .collect();
        (netlist, rebuilt_ids)
    }

    fn assemble(mut subnets: Vec<Subnet>) -> Self {
        subnets.sort_by_key(Subnet::anchor);
        let mut point_index = BTreeMap::new();
        let mut wire_index = BTreeMap::new();
        for (id, subnet) in subnets.iter_mut().enumerate() {
            subnet.id = id;
            for point in &subnet.points {
                point_index.insert(*point, id);
            }
            for wire in &subnet.wires {
                wire_index.insert(*wire, id);
            }
        }
        Self { subnets, point_index, wire_index }
    }

    pub fn subnets(&self) -> &[Subnet] {
        &self.subnets
    }

    pub fn subnet(&self, id: SubnetId) -> Option<&Subnet> {
        self.subnets.get(id)
    }

    pub(crate) fn subnet_mut(&mut self, id: SubnetId) -> Option<&mut Subnet> {
        self.subnets.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.subnets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subnets.is_empty()
    }

    /// Subnet owning `point`, either as an endpoint or terminal or anywhere
    /// along a wire
    pub fn subnet_at(&self, point: Point) -> Option<SubnetId> {
        if let Some(id) = self.point_index.get(&point) {
            return Some(*id);
        }
        self.wire_index
            .iter()
            .find(|(wire, _)| wire.is_point_on_wire(point))
            .map(|(_, id)| *id)
    }

    pub fn subnet_of_wire(&self, wire: &Wire) -> Option<SubnetId> {
        self.wire_index.get(wire).copied()
    }

    /// Point sets of every subnet, in id order
    pub fn partition(&self) -> Vec<BTreeSet<Point>> {
        self.subnets.iter().map(|s| s.points.clone()).collect()
    }

    /// Subnets owning a point that lies on `wire`
    fn subnets_on<'a>(&'a self, wire: &'a Wire) -> impl Iterator<Item = SubnetId> + 'a {
        self.point_index
            .iter()
            .filter(move |(p, _)| wire.is_point_on_wire(**p))
            .map(|(_, id)| *id)
    }
}

/// Union-find over every wire endpoint and terminal position. A wire joins
/// all points lying on it, endpoints included.
fn partition<'a, W, T>(wires: W, terminals: T) -> Vec<Subnet>
where
    W: Iterator<Item = &'a Wire> + Clone,
    T: Iterator<Item = &'a Terminal> + Clone,
{
    let mut points: BTreeSet<Point> = BTreeSet::new();
    for wire in wires.clone() {
        points.insert(wire.pos);
        points.insert(wire.end());
    }
    for terminal in terminals.clone() {
        points.insert(terminal.node.pos);
    }
    let points: Vec<Point> = points.into_iter().collect();
    let index_of = |p: &Point| points.binary_search(p).ok();

    // (line, position along the line) -> dense index, one map per axis
    let mut rows: BTreeMap<(i32, i32), usize> = BTreeMap::new();
    let mut columns: BTreeMap<(i32, i32), usize> = BTreeMap::new();
    for (index, p) in points.iter().enumerate() {
        rows.insert((p.y, p.x), index);
        columns.insert((p.x, p.y), index);
    }

    let mut sets = UnionFind::new(points.len());
    for wire in wires.clone() {
        let (start, end) = wire.span();
        let line = wire.line();
        let axis = match wire.direction {
            Direction::Horizontal => &rows,
            Direction::Vertical => &columns,
        };
        let mut on_wire = axis.range((line, start)..=(line, end)).map(|(_, index)| *index);
        if let Some(first) = on_wire.next() {
            for other in on_wire {
                sets.union(first, other);
            }
        }
    }

    let mut groups: BTreeMap<usize, Subnet> = BTreeMap::new();
    for (index, point) in points.iter().enumerate() {
        let root = sets.find(index);
        groups.entry(root).or_insert_with(Subnet::empty).points.insert(*point);
    }
    for wire in wires {
        if let Some(index) = index_of(&wire.pos) {
            let root = sets.find(index);
            if let Some(subnet) = groups.get_mut(&root) {
                subnet.wires.insert(*wire);
            }
        }
    }
    for terminal in terminals {
        if let Some(index) = index_of(&terminal.node.pos) {
            let root = sets.find(index);
            if let Some(subnet) = groups.get_mut(&root) {
                if terminal.node.flags.is_output() {
                    subnet.drivers.push(*terminal);
                }
                if terminal.node.flags.is_input() {
                    subnet.readers.push(*terminal);
                }
            }
        }
    }

    let mut subnets: Vec<Subnet> = groups.into_values().collect();
    for subnet in &mut subnets {
        subnet.drivers.sort();
        subnet.readers.sort();
    }
    subnets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(x: i32, y: i32, len: i32) -> Wire {
        Wire::horizontal(Point::new(x, y), len)
    }

    fn v(x: i32, y: i32, len: i32) -> Wire {
        Wire::vertical(Point::new(x, y), len)
    }

    #[test]
    fn test_corner_and_t_junction_connect() {
        let wires = WireSet::from_wires([h(0, 0, 10), v(10, 0, 5), v(4, 0, -6)]);
        let netlist = Netlist::build(&wires, &[]);
        assert_eq!(netlist.len(), 1);
        assert_eq!(netlist.subnets()[0].wires.len(), 3);
    }

    #[test]
    fn test_interior_crossing_is_not_a_connection() {
        let wires = WireSet::from_wires([h(0, 0, 10), v(5, -5, 10)]);
        let netlist = Netlist::build(&wires, &[]);
        assert_eq!(netlist.len(), 2);
        assert_ne!(netlist.subnet_of_wire(&h(0, 0, 10)), netlist.subnet_of_wire(&v(5, -5, 10)));
    }

    #[test]
    fn test_terminals_join_wire_interiors() {
        let wires = WireSet::from_wires([h(0, 0, 10)]);
        let driver = Terminal::external(Node::output(Point::new(0, 0)));
        let reader = Terminal::external(Node::input(Point::new(3, 0)));
        let lonely = Terminal::external(Node::input(Point::new(3, 3)));
        let netlist = Netlist::build(&wires, &[driver, reader, lonely]);

        assert_eq!(netlist.len(), 2);
        let id = netlist.subnet_at(Point::new(7, 0)).unwrap();
        let subnet = netlist.subnet(id).unwrap();
        assert_eq!(subnet.drivers, vec![driver]);
        assert_eq!(subnet.readers, vec![reader]);

        let other = netlist.subnet_at(Point::new(3, 3)).unwrap();
        assert!(netlist.subnet(other).unwrap().drivers.is_empty());
        assert_eq!(netlist.subnet_at(Point::new(50, 50)), None);
    }

    #[test]
    fn test_ids_follow_smallest_point() {
        let wires = WireSet::from_wires([h(20, 0, 5), h(-10, 4, 5)]);
        let netlist = Netlist::build(&wires, &[]);
        assert_eq!(netlist.subnet_of_wire(&h(-10, 4, 5)), Some(0));
        assert_eq!(netlist.subnet_of_wire(&h(20, 0, 5)), Some(1));
    }

    #[test]
    fn test_incremental_matches_full_after_join() {
        let mut wires = WireSet::from_wires([h(0, 0, 4), h(0, 6, 4), v(20, 0, 3)]);
        let before = Netlist::build(&wires, &[]);

        let t = wires.create_add_wire_transaction(v(2, 0, 6)).unwrap();
        wires.apply_wire_transaction(&t);
        let region = EditRegion { wires: t.created.clone(), points: Vec::new() };
        let (incremental, rebuilt) = before.rebuild_incremental(&wires, &[], &region);
        let full = Netlist::build(&wires, &[]);

        assert_eq!(incremental.partition(), full.partition());
        assert_eq!(incremental.len(), 2);
        assert_eq!(rebuilt.len(), 1);
        assert!(!rebuilt.contains(&incremental.subnet_of_wire(&v(20, 0, 3)).unwrap()));
    }
}
