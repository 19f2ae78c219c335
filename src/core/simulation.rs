use crate::core::circuit::{Wire, WireSet};
use crate::core::components::{Instance, InstanceTable};
use crate::core::connections::{EditRegion, Netlist, SubnetId, Terminal};
use crate::core::errors::{SimError, SimResult};
use crate::core::execution::{Engine, RebuildPolicy, SimulationConfig, StepReport};
use crate::core::transactions::{
    ControlPointsTransaction, GateTransaction, Transaction, TransactionStack, WireTransaction,
};
use crate::core::types::{InstanceId, Node, Point};
use crate::core::values::Value;
use log::{debug, info, warn};
use std::collections::BTreeSet;

/// Model changes made by one transaction, consumed when the network settles
#[derive(Debug, Default)]
struct EditSummary {
    region: EditRegion,
    placed: Vec<InstanceId>,
}

/// Owner of the circuit: wires, instances, connectivity, the event engine
/// and the undo history.
///
/// Every edit goes through a [`Transaction`]. After a transaction has been
/// applied or reverted the netlist is rebuilt and the affected subnets are
/// propagated before the call returns.
#[derive(Debug)]
pub struct Simulation {
    wires: WireSet,
    instances: InstanceTable,
    externals: BTreeSet<Node>,
    netlist: Netlist,
    engine: Engine,
    history: TransactionStack,
}

impl Simulation {
    /// Create an empty simulation with the default configuration
    pub fn new() -> Self {
        Self::with_config(SimulationConfig::default())
    }

    pub fn with_config(config: SimulationConfig) -> Self {
        let history = match config.history_limit {
            Some(limit) => TransactionStack::with_limit(limit),
            None => TransactionStack::new(),
        };
        Self {
            wires: WireSet::new(),
            instances: InstanceTable::new(),
            externals: BTreeSet::new(),
            netlist: Netlist::new(),
            engine: Engine::new(config),
            history,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        self.engine.config()
    }

    pub fn wires(&self) -> &WireSet {
        &self.wires
    }

    pub fn control_points(&self) -> &BTreeSet<Point> {
        self.wires.control_points()
    }

    pub fn instances(&self) -> &InstanceTable {
        &self.instances
    }

    pub fn netlist(&self) -> &Netlist {
        &self.netlist
    }

    pub fn history(&self) -> &TransactionStack {
        &self.history
    }

    // ---- transaction builders ----

    pub fn create_add_wire_transaction(&self, wire: Wire) -> Option<Transaction> {
        self.wires.create_add_wire_transaction(wire).map(Transaction::from)
    }

    pub fn create_modify_wire_transaction(&self, old: Wire, new: Wire) -> SimResult<Option<Transaction>> {
        Ok(self.wires.create_modify_wire_transaction(old, new)?.map(Transaction::from))
    }

    pub fn create_remove_wire_transaction(&self, wire: Wire) -> SimResult<Transaction> {
        self.wires.create_remove_wire_transaction(wire).map(Transaction::from)
    }

    pub fn create_wire_drag_transaction(&self, start: Point, end: Point) -> SimResult<Option<Transaction>> {
        Ok(self.wires.create_wire_drag_transaction(start, end)?.map(Transaction::from))
    }

    pub fn create_control_points_transaction(&self, points: &[Point], removing: bool) -> Option<Transaction> {
        self.wires
            .create_control_points_transaction(points, removing)
            .map(Transaction::from)
    }

    /// Place `instance`, splitting every wire one of its ports lands inside
    pub fn create_add_gate_transaction(&self, instance: Instance) -> SimResult<Transaction> {
        if self.instances.get(&instance.id).is_some() {
            return Err(SimError::DuplicateInstance(instance.id));
        }
        let splits: Vec<Point> = instance
            .ports()
            .map(|p| p.node.pos)
            .filter(|pos| self.wires.iter().any(|w| w.is_point_inside_wire(*pos)))
            .collect();
        let wire_edits = self.wires.create_control_points_transaction(&splits, false);
        Ok(GateTransaction { removing: false, instance, wire_edits }.into())
    }

    pub fn create_remove_gate_transaction(&self, id: InstanceId) -> SimResult<Transaction> {
        let instance = *self.instances.get(&id).ok_or(SimError::UnknownInstance(id))?;
        Ok(GateTransaction { removing: true, instance, wire_edits: None }.into())
    }

    // ---- applying and reverting ----

    /// Apply `transaction` and record it in the history.
    ///
    /// An error from evaluating components after the edit is returned, but
    /// the edit itself stays applied and recorded.
    pub fn push_transaction(&mut self, transaction: Transaction) -> SimResult<()> {
        let summary = self.apply_model(&transaction)?;
        debug!("Push: {}", transaction);
        self.history.push(transaction);
        self.settle(summary)
    }

    /// Apply without recording
    pub fn do_transaction_no_push(&mut self, transaction: &Transaction) -> SimResult<()> {
        let summary = self.apply_model(transaction)?;
        self.settle(summary)
    }

    /// Revert without touching the history
    pub fn undo_transaction_no_push(&mut self, transaction: &Transaction) -> SimResult<()> {
        let summary = self.revert_model(transaction)?;
        self.settle(summary)
    }

    /// Revert the latest applied transaction; `Ok(false)` when there is none.
    ///
    /// The history only moves once the model change went through. An error
    /// from evaluating components afterwards still counts as undone.
    pub fn undo(&mut self) -> SimResult<bool> {
        let Some(transaction) = self.history.peek_undo().cloned() else {
            return Ok(false);
        };
        info!("Undo: {}", transaction);
        let summary = self.revert_model(&transaction)?;
        self.history.try_undo();
        self.settle(summary)?;
        Ok(true)
    }

    /// Re-apply the latest undone transaction; `Ok(false)` when there is none
    pub fn redo(&mut self) -> SimResult<bool> {
        let Some(transaction) = self.history.peek_redo().cloned() else {
            return Ok(false);
        };
        info!("Redo: {}", transaction);
        let summary = self.apply_model(&transaction)?;
        self.history.try_redo();
        self.settle(summary)?;
        Ok(true)
    }

    fn apply_model(&mut self, transaction: &Transaction) -> SimResult<EditSummary> {
        let mut summary = EditSummary::default();
        self.apply_into(transaction, &mut summary)?;
        Ok(summary)
    }

    fn revert_model(&mut self, transaction: &Transaction) -> SimResult<EditSummary> {
        let mut summary = EditSummary::default();
        self.revert_into(transaction, &mut summary)?;
        Ok(summary)
    }

    fn apply_into(&mut self, transaction: &Transaction, summary: &mut EditSummary) -> SimResult<()> {
        match transaction {
            Transaction::Wire(t) => {
                self.wires.apply_wire_transaction(t);
                note_wire_edit(summary, t);
            }
            Transaction::ControlPoints(t) => {
                self.wires.apply_control_points_transaction(t);
                note_control_points(summary, t);
            }
            Transaction::Gate(t) if t.removing => {
                self.unplace(&t.instance, summary)?;
                if let Some(edits) = &t.wire_edits {
                    self.wires.apply_control_points_transaction(edits);
                    note_control_points(summary, edits);
                }
            }
            Transaction::Gate(t) => {
                self.check_placeable(&t.instance)?;
                if let Some(edits) = &t.wire_edits {
                    self.wires.apply_control_points_transaction(edits);
                    note_control_points(summary, edits);
                }
                self.place(t.instance, summary)?;
            }
            Transaction::Bundled(children) => {
                for (done, child) in children.iter().enumerate() {
                    if let Err(err) = self.apply_into(child, summary) {
                        // Roll back the children that went through
                        for applied in children[..done].iter().rev() {
                            if let Err(undo_err) = self.revert_into(applied, summary) {
                                warn!("Rolling back bundle failed: {}", undo_err);
                            }
                        }
                        return Err(err);
                    }
                }
            }
        }
        Ok(())
    }

    fn revert_into(&mut self, transaction: &Transaction, summary: &mut EditSummary) -> SimResult<()> {
        match transaction {
            Transaction::Wire(t) => {
                self.wires.revert_wire_transaction(t);
                note_wire_edit(summary, t);
            }
            Transaction::ControlPoints(t) => {
                self.wires.revert_control_points_transaction(t);
                note_control_points(summary, t);
            }
            Transaction::Gate(t) if t.removing => {
                self.check_placeable(&t.instance)?;
                if let Some(edits) = &t.wire_edits {
                    self.wires.revert_control_points_transaction(edits);
                    note_control_points(summary, edits);
                }
                self.place(t.instance, summary)?;
            }
            Transaction::Gate(t) => {
                self.unplace(&t.instance, summary)?;
                if let Some(edits) = &t.wire_edits {
                    self.wires.revert_control_points_transaction(edits);
                    note_control_points(summary, edits);
                }
            }
            Transaction::Bundled(children) => {
                for (done, child) in children.iter().rev().enumerate() {
                    if let Err(err) = self.revert_into(child, summary) {
                        for reverted in children[children.len() - done..].iter() {
                            if let Err(redo_err) = self.apply_into(reverted, summary) {
                                warn!("Rolling back bundle revert failed: {}", redo_err);
                            }
                        }
                        return Err(err);
                    }
                }
            }
        }
        Ok(())
    }

    fn check_placeable(&self, instance: &Instance) -> SimResult<()> {
        if self.instances.get(&instance.id).is_some() {
            return Err(SimError::DuplicateInstance(instance.id));
        }
        Ok(())
    }

    fn place(&mut self, instance: Instance, summary: &mut EditSummary) -> SimResult<()> {
        self.instances.insert(instance)?;
        summary.region.points.extend(instance.ports().map(|p| p.node.pos));
        summary.placed.push(instance.id);
        Ok(())
    }

    fn unplace(&mut self, instance: &Instance, summary: &mut EditSummary) -> SimResult<()> {
        let removed = self.instances.remove(&instance.id)?;
        self.engine.release_instance(removed.id);
        summary.region.points.extend(removed.ports().map(|p| p.node.pos));
        summary.placed.retain(|id| *id != removed.id);
        Ok(())
    }

    fn terminals(&self) -> Vec<Terminal> {
        let mut terminals: Vec<Terminal> = self
            .instances
            .iter()
            .flat_map(|i| i.ports().map(move |p| Terminal::port(p.node, i.id, p.index)))
            .collect();
        terminals.extend(self.externals.iter().map(|n| Terminal::external(*n)));
        terminals
    }

    /// Rebuild connectivity after a model change and propagate the result
    fn settle(&mut self, summary: EditSummary) -> SimResult<()> {
        let terminals = self.terminals();
        let rebuilt: BTreeSet<SubnetId> = match self.engine.config().rebuild_policy {
            RebuildPolicy::Full => {
                self.netlist = Netlist::build(&self.wires, &terminals);
                (0..self.netlist.len()).collect()
            }
            RebuildPolicy::Incremental => {
                let (netlist, rebuilt) = self.netlist.rebuild_incremental(&self.wires, &terminals, &summary.region);
                self.netlist = netlist;
                rebuilt
            }
        };
        debug!("Rebuilt {} of {} subnets", rebuilt.len(), self.netlist.len());

        self.engine.clear_dirty();
        for id in &rebuilt {
            self.engine.mark_dirty(*id);
            if let Some(subnet) = self.netlist.subnet(*id) {
                for instance in subnet.reader_instances() {
                    self.engine.force_evaluation(instance);
                }
            }
        }
        for id in summary.placed {
            self.engine.force_evaluation(id);
        }
        self.engine.process_dirty(&mut self.netlist, &self.instances)?;
        Ok(())
    }

    // ---- stimulus and observation ----

    /// Drive `node` with `value` after `delay` ticks.
    ///
    /// The node joins the network as an external terminal the first time it
    /// is used. Only Output or InOut nodes take part in resolution.
    pub fn queue_set(&mut self, node: Node, value: Value, delay: i64) -> SimResult<()> {
        if !node.flags.is_output() {
            warn!("Stimulus node at {} is not an output and will not drive its subnet", node.pos);
        }
        self.engine.queue_set(Terminal::external(node), value, delay)?;
        if self.externals.insert(node) {
            let mut summary = EditSummary::default();
            summary.region.points.push(node.pos);
            self.settle(summary)?;
        }
        Ok(())
    }

    /// Resolved value of the subnet at the node's position
    pub fn get(&self, node: Node) -> Value {
        self.engine.value_at(&self.netlist, node.pos)
    }

    pub fn step(&mut self) -> SimResult<StepReport> {
        self.engine.step(&mut self.netlist, &self.instances)
    }

    pub fn is_step_pending(&self) -> bool {
        self.engine.is_step_pending()
    }

    pub fn current_time(&self) -> u64 {
        self.engine.current_time()
    }

    /// Step until no events are pending or `max_steps` steps were taken.
    /// Returns the number of steps taken.
    pub fn run_until_idle(&mut self, max_steps: usize) -> SimResult<usize> {
        let mut steps = 0;
        while steps < max_steps && self.is_step_pending() {
            self.step()?;
            steps += 1;
        }
        if self.is_step_pending() {
            debug!("Still {} events pending after {} steps", self.engine.pending_events(), steps);
        }
        Ok(steps)
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

fn note_wire_edit(summary: &mut EditSummary, t: &WireTransaction) {
    summary.region.wires.extend(t.deleted.iter().chain(t.created.iter()).copied());
}

fn note_control_points(summary: &mut EditSummary, t: &ControlPointsTransaction) {
    summary.region.wires.extend(t.deleted.iter().chain(t.created.iter()).copied());
    summary.region.points.extend(t.points.iter().copied());
}
