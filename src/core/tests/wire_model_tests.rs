// Tests for the wire merge/split model and its transactions
use crate::core::{
    circuit::{Wire, WireSet},
    components::{ComponentKind, Instance},
    simulation::Simulation,
    transactions::Transaction,
    types::{Direction, Orientation, Point},
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::BTreeSet;

fn h(x: i32, y: i32, len: i32) -> Wire {
    Wire::horizontal(Point::new(x, y), len)
}

fn v(x: i32, y: i32, len: i32) -> Wire {
    Wire::vertical(Point::new(x, y), len)
}

fn random_wire(rng: &mut StdRng) -> Wire {
    let pos = Point::new(rng.gen_range(0..8), rng.gen_range(0..8));
    let length = rng.gen_range(-4..=4);
    let direction = if rng.gen_bool(0.5) { Direction::Horizontal } else { Direction::Vertical };
    Wire::new(pos, length, direction)
}

#[test]
fn test_collinear_touching_adds_merge_into_one() {
    let mut sim = Simulation::new();
    for wire in [h(0, 0, 5), h(5, 0, 5)] {
        let t = sim.create_add_wire_transaction(wire).unwrap();
        sim.push_transaction(t).unwrap();
    }
    let expected: BTreeSet<Wire> = [h(0, 0, 10)].into_iter().collect();
    assert_eq!(sim.wires().wires(), &expected);
}

#[test]
fn test_apply_then_revert_restores_segments() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut set = WireSet::new();

    for _ in 0..300 {
        let before = set.clone();
        let transaction = match rng.gen_range(0..3) {
            0 => set.create_add_wire_transaction(random_wire(&mut rng)),
            1 if !set.is_empty() => {
                let old = *set.iter().nth(rng.gen_range(0..set.len())).unwrap();
                set.create_modify_wire_transaction(old, random_wire(&mut rng)).unwrap()
            }
            _ if !set.is_empty() => {
                let old = *set.iter().nth(rng.gen_range(0..set.len())).unwrap();
                Some(set.create_remove_wire_transaction(old).unwrap())
            }
            _ => None,
        };
        let Some(transaction) = transaction else { continue };

        set.apply_wire_transaction(&transaction);
        let after = set.clone();
        set.revert_wire_transaction(&transaction);
        assert_eq!(set, before, "revert of {:?} did not restore the set", transaction);

        // Keep the edit so the set keeps growing in complexity
        set.apply_wire_transaction(&transaction);
        assert_eq!(set, after);
    }
}

#[test]
fn test_merged_sets_have_no_overlapping_collinear_segments() {
    let mut rng = StdRng::seed_from_u64(42);
    let set = WireSet::from_wires((0..200).map(|_| random_wire(&mut rng)));
    let wires: Vec<&Wire> = set.iter().collect();
    for (i, a) in wires.iter().enumerate() {
        assert!(a.length > 0);
        for b in &wires[i + 1..] {
            assert!(!a.touches_or_overlaps(b), "{} and {} should have merged", a, b);
        }
    }
}

#[test]
fn test_three_adds_undone_three_times() {
    let mut sim = Simulation::new();
    let original = sim.wires().clone();
    for wire in [h(0, 0, 4), v(4, 0, 4), h(4, 4, -8)] {
        let t = sim.create_add_wire_transaction(wire).unwrap();
        sim.push_transaction(t).unwrap();
    }
    assert_eq!(sim.wires().len(), 3);

    for _ in 0..3 {
        assert_eq!(sim.undo(), Ok(true));
    }
    assert_eq!(sim.undo(), Ok(false));
    assert_eq!(sim.wires(), &original);
}

#[test]
fn test_drag_shrinks_then_removes() {
    let mut sim = Simulation::new();
    let t = sim.create_add_wire_transaction(h(0, 0, 10)).unwrap();
    sim.push_transaction(t).unwrap();

    let shrink = sim.create_wire_drag_transaction(Point::new(0, 0), Point::new(4, 0)).unwrap().unwrap();
    sim.push_transaction(shrink).unwrap();
    assert!(sim.wires().contains(&h(4, 0, 6)));

    let remove = sim.create_wire_drag_transaction(Point::new(10, 0), Point::new(4, 0)).unwrap().unwrap();
    sim.push_transaction(remove).unwrap();
    assert!(sim.wires().is_empty());

    sim.undo().unwrap();
    sim.undo().unwrap();
    assert!(sim.wires().contains(&h(0, 0, 10)));
}

#[test]
fn test_gate_dropped_on_wire_splits_it() {
    let mut sim = Simulation::new();
    let t = sim.create_add_wire_transaction(v(0, -5, 10)).unwrap();
    sim.push_transaction(t).unwrap();

    // Buffer input lands on (0, 0), strictly inside the wire
    let buffer = Instance::new(ComponentKind::Buffer, Point::new(3, 0), Orientation::East);
    let t = sim.create_add_gate_transaction(buffer).unwrap();
    match &t {
        Transaction::Gate(gate) => assert!(gate.wire_edits.is_some()),
        other => panic!("expected a gate transaction, got {:?}", other),
    }
    sim.push_transaction(t).unwrap();

    let expected: BTreeSet<Wire> = [v(0, -5, 5), v(0, 0, 5)].into_iter().collect();
    assert_eq!(sim.wires().wires(), &expected);
    assert!(sim.control_points().contains(&Point::new(0, 0)));
    assert_eq!(sim.netlist().len(), 2);

    sim.undo().unwrap();
    let expected: BTreeSet<Wire> = [v(0, -5, 10)].into_iter().collect();
    assert_eq!(sim.wires().wires(), &expected);
    assert!(sim.control_points().is_empty());
    assert!(sim.instances().is_empty());
}
