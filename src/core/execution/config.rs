//! Configuration for lsim simulation execution
//!
//! This module provides configuration types for controlling propagation delays,
//! connectivity rebuilds and undo history depth.

use crate::core::components::ComponentKind;
use std::collections::BTreeMap;

/// How subnets are recomputed after a geometry edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RebuildPolicy {
    /// Recompute the whole partition on every edit
    #[default]
    Full,
    /// Recompute only the subnets the edit touches
    Incremental,
}

/// Configuration for simulation execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Propagation delay of every component kind without an override, in ticks
    pub gate_delay: i64,
    /// Per-kind propagation delays
    pub kind_delays: BTreeMap<ComponentKind, i64>,
    /// Connectivity rebuild strategy
    pub rebuild_policy: RebuildPolicy,
    /// Maximum number of undo entries kept; `None` keeps everything
    pub history_limit: Option<usize>,
}

impl SimulationConfig {
    /// Create a new simulation configuration with default values
    ///
    /// Default configuration uses a one tick gate delay, full rebuilds and an
    /// unbounded history
    pub fn new() -> Self {
        Self {
            gate_delay: 1,
            kind_delays: BTreeMap::new(),
            rebuild_policy: RebuildPolicy::default(),
            history_limit: None,
        }
    }

    /// Set the default propagation delay
    ///
    /// Non-positive delays are accepted here and rejected when an output is
    /// scheduled.
    pub fn with_gate_delay(mut self, delay: i64) -> Self {
        self.gate_delay = delay;
        self
    }

    /// Override the propagation delay of one component kind
    pub fn with_kind_delay(mut self, kind: ComponentKind, delay: i64) -> Self {
        self.kind_delays.insert(kind, delay);
        self
    }

    /// Set the connectivity rebuild policy
    pub fn with_rebuild_policy(mut self, policy: RebuildPolicy) -> Self {
        self.rebuild_policy = policy;
        self
    }

    /// Bound the undo history; the oldest entries are dropped first
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = Some(limit);
        self
    }

    /// Propagation delay of `kind`
    pub fn delay_for(&self, kind: ComponentKind) -> i64 {
        self.kind_delays.get(&kind).copied().unwrap_or(self.gate_delay)
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SimulationConfig::default();
        assert_eq!(config.gate_delay, 1);
        assert_eq!(config.rebuild_policy, RebuildPolicy::Full);
        assert_eq!(config.history_limit, None);
        assert_eq!(config.delay_for(ComponentKind::And), 1);
    }

    #[test]
    fn test_config_builder() {
        let config = SimulationConfig::new()
            .with_gate_delay(2)
            .with_kind_delay(ComponentKind::Not, 5)
            .with_rebuild_policy(RebuildPolicy::Incremental)
            .with_history_limit(16);

        assert_eq!(config.delay_for(ComponentKind::Not), 5);
        assert_eq!(config.delay_for(ComponentKind::Xor), 2);
        assert_eq!(config.rebuild_policy, RebuildPolicy::Incremental);
        assert_eq!(config.history_limit, Some(16));
    }
}
