use lsim::core::transactions::TransactionKind;
use lsim::{
    ComponentKind, Instance, LogicState, Node, Orientation, Point, RebuildPolicy, SimError, Simulation,
    SimulationConfig, Value, Wire,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Half adder: XOR at (10, 0) for the sum, AND at (10, 10) for the carry.
/// Inputs A and B are fanned out to both gates with wires.
fn half_adder(policy: RebuildPolicy) -> (Simulation, Node, Node, Node, Node) {
    let mut sim = Simulation::with_config(SimulationConfig::new().with_rebuild_policy(policy));

    for (kind, y) in [(ComponentKind::Xor, 0), (ComponentKind::And, 10)] {
        let gate = Instance::new(kind, Point::new(10, y), Orientation::East);
        let t = sim.create_add_gate_transaction(gate).unwrap();
        sim.push_transaction(t).unwrap();
    }

    // A reaches (7, 1) and (7, 9); B goes around to (7, -1) and (7, 11)
    let wires = [
        Wire::vertical(Point::new(7, 1), 8),
        Wire::horizontal(Point::new(0, -1), 7),
        Wire::vertical(Point::new(0, -1), 12),
        Wire::horizontal(Point::new(0, 11), 7),
    ];
    for wire in wires {
        let t = sim.create_add_wire_transaction(wire).unwrap();
        sim.push_transaction(t).unwrap();
    }

    let a = Node::output(Point::new(7, 5));
    let b = Node::output(Point::new(0, 4));
    let sum = Node::input(Point::new(10, 0));
    let carry = Node::input(Point::new(10, 10));
    (sim, a, b, sum, carry)
}

#[test]
fn test_half_adder_truth_table() {
    init_logging();
    for policy in [RebuildPolicy::Full, RebuildPolicy::Incremental] {
        let (mut sim, a, b, sum, carry) = half_adder(policy);
        for (x, y) in [(false, false), (false, true), (true, false), (true, true)] {
            sim.queue_set(a, Value::from_bool(x), 1).unwrap();
            sim.queue_set(b, Value::from_bool(y), 1).unwrap();
            sim.run_until_idle(20).unwrap();
            assert_eq!(sim.get(sum), Value::from_bool(x ^ y), "sum of {} {} ({:?})", x, y, policy);
            assert_eq!(sim.get(carry), Value::from_bool(x && y), "carry of {} {} ({:?})", x, y, policy);
        }
    }
}

#[test]
fn test_wire_edit_rewires_live_circuit() {
    init_logging();
    let mut sim = Simulation::new();
    let not = Instance::new(ComponentKind::Not, Point::new(10, 0), Orientation::East);
    let t = sim.create_add_gate_transaction(not).unwrap();
    sim.push_transaction(t).unwrap();

    let source = Node::output(Point::new(0, 0));
    let out = Node::input(Point::new(10, 0));
    sim.queue_set(source, Value::ONE, 1).unwrap();
    sim.run_until_idle(10).unwrap();
    // Input not connected yet
    assert_eq!(sim.get(out), Value::FLOATING);

    let t = sim.create_add_wire_transaction(Wire::horizontal(Point::new(0, 0), 7)).unwrap();
    sim.push_transaction(t).unwrap();
    sim.run_until_idle(10).unwrap();
    assert_eq!(sim.get(out), Value::ZERO);

    assert!(sim.undo().unwrap());
    sim.run_until_idle(10).unwrap();
    assert_eq!(sim.get(out), Value::FLOATING);
}

#[test]
fn test_multi_lane_values() {
    let a: Value = "01FX".parse().unwrap();
    assert_eq!(a.width(), 4);
    assert_eq!(a.get(3), Ok(LogicState::Zero));
    assert_eq!(a.get(0), Ok(LogicState::Error));
    assert_eq!(a.to_string(), "01FX");

    let floating = Value::floating(4).unwrap();
    assert_eq!(a.resolve(&floating), Ok(a));
    assert_eq!(a.resolve(&Value::ONE), Err(SimError::WidthMismatch { left: 4, right: 1 }));
}

#[test]
fn test_transaction_kind_tags() {
    assert_eq!("gate".parse::<TransactionKind>(), Ok(TransactionKind::Gate));
    assert!(matches!(
        "splice".parse::<TransactionKind>(),
        Err(SimError::UnknownTransactionKind(tag)) if tag == "splice"
    ));
}

#[test]
fn test_bounded_history() {
    let mut sim = Simulation::with_config(SimulationConfig::new().with_history_limit(2));
    for y in 0..4 {
        let t = sim.create_add_wire_transaction(Wire::horizontal(Point::new(0, y * 3), 2)).unwrap();
        sim.push_transaction(t).unwrap();
    }
    assert!(sim.undo().unwrap());
    assert!(sim.undo().unwrap());
    assert!(!sim.undo().unwrap());
    assert_eq!(sim.wires().len(), 2);
}
