// Tests for subnet computation under both rebuild policies
use crate::core::{
    circuit::{Wire, WireSet},
    components::{ComponentKind, Instance},
    connections::{Netlist, Terminal},
    execution::{RebuildPolicy, SimulationConfig},
    simulation::Simulation,
    transactions::Transaction,
    types::{Direction, Node, Orientation, Point},
    values::Value,
};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

const GATES: [ComponentKind; 8] = [
    ComponentKind::Buffer,
    ComponentKind::Not,
    ComponentKind::And,
    ComponentKind::Nand,
    ComponentKind::Or,
    ComponentKind::Nor,
    ComponentKind::Xor,
    ComponentKind::Xnor,
];

const ORIENTATIONS: [Orientation; 4] = [Orientation::East, Orientation::South, Orientation::West, Orientation::North];

fn random_wire(rng: &mut StdRng) -> Wire {
    let pos = Point::new(rng.gen_range(-6..6), rng.gen_range(-6..6));
    let direction = if rng.gen_bool(0.5) { Direction::Horizontal } else { Direction::Vertical };
    Wire::new(pos, rng.gen_range(-5..=5), direction)
}

/// Everything about a netlist except the cached values
fn topology(netlist: &Netlist) -> Vec<String> {
    netlist
        .subnets()
        .iter()
        .map(|s| format!("{} {:?} {:?} {:?} {:?}", s.id, s.points, s.wires, s.drivers, s.readers))
        .collect()
}

#[test]
fn test_partition_is_independent_of_insertion_order() {
    let mut rng = StdRng::seed_from_u64(7);
    let wires: Vec<Wire> = (0..40).map(|_| random_wire(&mut rng)).collect();
    let reference = WireSet::from_wires(wires.iter().copied());
    let terminals = vec![
        Terminal::external(Node::output(Point::new(0, 0))),
        Terminal::external(Node::input(Point::new(3, -2))),
    ];
    let expected = Netlist::build(&reference, &terminals);

    for _ in 0..10 {
        let mut shuffled = wires.clone();
        shuffled.shuffle(&mut rng);
        let set = WireSet::from_wires(shuffled);
        assert_eq!(&set, &reference);

        let mut terminals = terminals.clone();
        terminals.reverse();
        assert_eq!(topology(&Netlist::build(&set, &terminals)), topology(&expected));
    }
}

#[test]
fn test_incremental_rebuild_matches_full_rebuild() {
    let mut rng = StdRng::seed_from_u64(1234);
    let mut full = Simulation::with_config(SimulationConfig::new().with_rebuild_policy(RebuildPolicy::Full));
    let mut incremental =
        Simulation::with_config(SimulationConfig::new().with_rebuild_policy(RebuildPolicy::Incremental));

    for round in 0..250 {
        let transaction: Option<Transaction> = match rng.gen_range(0..10) {
            0..=3 => full.create_add_wire_transaction(random_wire(&mut rng)),
            4 if !full.wires().is_empty() => {
                let wire = *full.wires().iter().nth(rng.gen_range(0..full.wires().len())).unwrap();
                Some(full.create_remove_wire_transaction(wire).unwrap())
            }
            5 => {
                let gate = Instance::new(
                    *GATES.choose(&mut rng).unwrap(),
                    Point::new(rng.gen_range(-6..6), rng.gen_range(-6..6)),
                    *ORIENTATIONS.choose(&mut rng).unwrap(),
                );
                Some(full.create_add_gate_transaction(gate).unwrap())
            }
            6 if !full.instances().is_empty() => {
                let index = rng.gen_range(0..full.instances().len());
                let id = full.instances().iter().nth(index).unwrap().id;
                Some(full.create_remove_gate_transaction(id).unwrap())
            }
            7 => {
                let point = Point::new(rng.gen_range(-6..6), rng.gen_range(-6..6));
                full.create_control_points_transaction(&[point], rng.gen_bool(0.3))
            }
            8 => {
                assert_eq!(full.undo().unwrap(), incremental.undo().unwrap());
                None
            }
            _ => {
                assert_eq!(full.redo().unwrap(), incremental.redo().unwrap());
                None
            }
        };
        if let Some(t) = transaction {
            full.push_transaction(t.clone()).unwrap();
            incremental.push_transaction(t).unwrap();
        }

        assert_eq!(full.wires(), incremental.wires(), "round {}", round);
        assert_eq!(
            topology(full.netlist()),
            topology(incremental.netlist()),
            "netlists diverged in round {}",
            round
        );
    }
}

#[test]
fn test_stimulus_node_joins_existing_subnet() {
    let mut sim = Simulation::with_config(SimulationConfig::new().with_rebuild_policy(RebuildPolicy::Incremental));
    let t = sim.create_add_wire_transaction(Wire::horizontal(Point::new(0, 0), 8)).unwrap();
    sim.push_transaction(t).unwrap();
    assert_eq!(sim.netlist().len(), 1);

    let probe = Node::output(Point::new(3, 0));
    sim.queue_set(probe, Value::ONE, 1).unwrap();
    assert_eq!(sim.netlist().len(), 1);
    let subnet = &sim.netlist().subnets()[0];
    assert_eq!(subnet.drivers, vec![Terminal::external(probe)]);

    sim.step().unwrap();
    assert_eq!(sim.get(Node::input(Point::new(8, 0))), Value::ONE);
}
