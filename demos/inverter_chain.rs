use lsim::{
    ComponentKind, Instance, Node, Orientation, Point, RebuildPolicy, Simulation, SimulationConfig, Value, Wire,
};
use log::info;

const CHAIN_LENGTH: i32 = 8;
const GATE_SPACING: i32 = 10;

/// Lays out NOT gates left to right. Gate k sits at x = 10 * (k + 1) with its
/// input three units to the left; each output is wired to the next input.
fn build_chain(sim: &mut Simulation) -> Result<(Node, Node), Box<dyn std::error::Error>> {
    for k in 0..CHAIN_LENGTH {
        let x = GATE_SPACING * (k + 1);
        let gate = Instance::new(ComponentKind::Not, Point::new(x, 0), Orientation::East);
        let placement = sim.create_add_gate_transaction(gate)?;
        sim.push_transaction(placement)?;

        let from = if k == 0 { 0 } else { x - GATE_SPACING };
        if let Some(wire) = sim.create_add_wire_transaction(Wire::between(Point::new(from, 0), Point::new(x - 3, 0))) {
            sim.push_transaction(wire)?;
        }
    }

    let source = Node::output(Point::new(0, 0));
    let probe = Node::input(Point::new(GATE_SPACING * CHAIN_LENGTH, 0));
    Ok((source, probe))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp(None)
        .init();

    println!("Inverter chain of {} gates", CHAIN_LENGTH);

    let config = SimulationConfig::new()
        .with_gate_delay(2)
        .with_rebuild_policy(RebuildPolicy::Incremental);
    let mut sim = Simulation::with_config(config);
    let (source, probe) = build_chain(&mut sim)?;
    info!("Netlist has {} subnets", sim.netlist().len());

    for (delay, value) in [(1, Value::ZERO), (40, Value::ONE), (80, Value::ZERO)] {
        sim.queue_set(source, value, delay)?;
    }

    let mut last = sim.get(probe);
    while sim.is_step_pending() {
        let report = sim.step()?;
        let now = sim.get(probe);
        if now != last {
            println!("t={:>3}  source={}  output={}", report.time, sim.get(source), now);
            last = now;
        }
    }

    println!("Settled at t={} after {} edits", sim.current_time(), sim.history().max());
    Ok(())
}
