use super::config::SimulationConfig;
use super::event_scheduler::{EventScheduler, SetEvent};
use crate::core::components::{propagate, Instance, InstanceTable};
use crate::core::connections::{Netlist, SubnetId, Terminal};
use crate::core::errors::{SimError, SimResult};
use crate::core::types::{InstanceId, Point};
use crate::core::values::{LogicState, Value};
use log::{debug, trace, warn};
use std::collections::{BTreeMap, BTreeSet};

/// What one call to [`Engine::step`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepReport {
    /// Tick after the step
    pub time: u64,
    /// Events taken off the queue
    pub events_applied: usize,
    /// Subnets whose resolved value changed
    pub subnets_changed: usize,
    /// Instances whose propagation function ran
    pub instances_evaluated: usize,
}

/// Discrete-time event engine.
///
/// Holds the clock, the event queue, the value each terminal currently
/// drives, and the set of subnets waiting to be resolved. The netlist and
/// instance table are owned by the caller and passed in.
#[derive(Debug)]
pub struct Engine {
    config: SimulationConfig,
    current_time: u64,
    scheduler: EventScheduler,
    driven: BTreeMap<Terminal, Value>,
    dirty: BTreeSet<SubnetId>,
    forced: BTreeSet<InstanceId>,
}

impl Engine {
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            current_time: 0,
            scheduler: EventScheduler::new(),
            driven: BTreeMap::new(),
            dirty: BTreeSet::new(),
            forced: BTreeSet::new(),
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn current_time(&self) -> u64 {
        self.current_time
    }

    /// True iff any event is still queued
    pub fn is_step_pending(&self) -> bool {
        self.scheduler.has_events()
    }

    pub fn pending_events(&self) -> usize {
        self.scheduler.len()
    }

    /// Schedule `value` onto `target` at `current_time + delay`
    pub fn queue_set(&mut self, target: Terminal, value: Value, delay: i64) -> SimResult<()> {
        if delay <= 0 {
            return Err(SimError::InvalidDelay(delay));
        }
        let when = self.current_time + delay as u64;
        trace!("Queue {} -> {} at t={}", target.node.pos, value, when);
        self.scheduler.schedule(SetEvent { target, value, when });
        Ok(())
    }

    /// Value currently driven by `terminal`, if any event reached it
    pub fn driven_value(&self, terminal: &Terminal) -> Option<Value> {
        self.driven.get(terminal).copied()
    }

    /// Forget everything `instance` drives: its current output values and
    /// any output events still queued
    pub fn release_instance(&mut self, instance: InstanceId) {
        let owned = |t: &Terminal| t.port.map_or(false, |p| p.instance == instance);
        self.driven.retain(|t, _| !owned(t));
        let cancelled = self.scheduler.cancel_where(|e| owned(&e.target));
        if cancelled > 0 {
            trace!("Cancelled {} pending events of {}", cancelled, instance);
        }
        self.forced.remove(&instance);
    }

    pub fn mark_dirty(&mut self, subnet: SubnetId) {
        self.dirty.insert(subnet);
    }

    /// Evaluate `instance` during the next propagation pass even if none of
    /// its inputs changed
    pub fn force_evaluation(&mut self, instance: InstanceId) {
        self.forced.insert(instance);
    }

    /// Drop dirty marks, e.g. after the netlist they refer to was replaced
    pub fn clear_dirty(&mut self) {
        self.dirty.clear();
    }

    /// Resolved value at `point`; Floating where nothing is connected
    pub fn value_at(&self, netlist: &Netlist, point: Point) -> Value {
        netlist
            .subnet_at(point)
            .and_then(|id| netlist.subnet(id))
            .map_or(Value::FLOATING, |s| s.value)
    }

    /// Advance one tick, apply every due event, then propagate.
    ///
    /// Component failures are reported after the whole batch has run.
    pub fn step(&mut self, netlist: &mut Netlist, instances: &InstanceTable) -> SimResult<StepReport> {
        self.current_time += 1;
        debug!("=== Simulation Tick {} ===", self.current_time);

        let events = self.scheduler.take_due(self.current_time);
        let events_applied = events.len();
        for event in events {
            trace!("Apply {} -> {}", event.target.node.pos, event.value);
            if self.driven.get(&event.target) == Some(&event.value) {
                continue;
            }
            self.driven.insert(event.target, event.value);
            match netlist.subnet_at(event.target.node.pos) {
                Some(id) => {
                    self.dirty.insert(id);
                }
                None => warn!("Event target {} is not part of any subnet", event.target.node.pos),
            }
        }

        let (subnets_changed, instances_evaluated) = self.process_dirty(netlist, instances)?;
        Ok(StepReport { time: self.current_time, events_applied, subnets_changed, instances_evaluated })
    }

    /// Resolve dirty subnets and evaluate the readers of those that changed,
    /// plus any forced instances, in placement order.
    ///
    /// Returns `(subnets changed, instances evaluated)`.
    pub fn process_dirty(&mut self, netlist: &mut Netlist, instances: &InstanceTable) -> SimResult<(usize, usize)> {
        let dirty = std::mem::take(&mut self.dirty);
        let mut pending = std::mem::take(&mut self.forced);
        let mut changed = 0;

        for id in dirty {
            let resolved = match netlist.subnet(id) {
                Some(subnet) => self.resolve_drivers(id, &subnet.drivers),
                None => continue,
            };
            if let Some(subnet) = netlist.subnet_mut(id) {
                if subnet.value != resolved {
                    trace!("Subnet {}: {} -> {}", id, subnet.value, resolved);
                    subnet.value = resolved;
                    changed += 1;
                    pending.extend(subnet.reader_instances());
                }
            }
        }

        let mut evaluated = 0;
        let mut first_error = None;
        for instance in instances.iter().filter(|i| pending.contains(&i.id)) {
            match self.evaluate(instance, netlist) {
                Ok(()) => evaluated += 1,
                Err(err) => {
                    warn!("Evaluating {:?} {} failed: {}", instance.kind, instance.id, err);
                    first_error.get_or_insert(err);
                }
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok((changed, evaluated)),
        }
    }

    /// Wired resolution over the driven values; no drivers gives Floating
    fn resolve_drivers(&self, id: SubnetId, drivers: &[Terminal]) -> Value {
        let mut values = drivers.iter().filter_map(|t| self.driven.get(t));
        let Some(first) = values.next() else {
            return Value::FLOATING;
        };
        let mut resolved = *first;
        for value in values {
            resolved = match resolved.resolve(value) {
                Ok(v) => v,
                Err(err) => {
                    warn!("Subnet {} has conflicting driver widths: {}", id, err);
                    let width = resolved.width().max(value.width());
                    return Value::filled(LogicState::Error, width).unwrap_or(Value::ERROR);
                }
            };
        }
        resolved
    }

    fn evaluate(&mut self, instance: &Instance, netlist: &Netlist) -> SimResult<()> {
        let inputs: Vec<Value> = instance.inputs().map(|p| self.value_at(netlist, p.node.pos)).collect();
        let outputs = propagate(instance.kind, &inputs)?;
        let delay = self.config.delay_for(instance.kind);
        for (port, value) in instance.outputs().zip(outputs) {
            self.queue_set(Terminal::port(port.node, instance.id, port.index), value, delay)?;
        }
        Ok(())
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}
