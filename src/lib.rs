pub mod core;

// Re-export commonly used types
pub use crate::core::circuit::{Wire, WireSet};
pub use crate::core::components::{ComponentKind, Instance};
pub use crate::core::errors::{SimError, SimResult};
pub use crate::core::execution::{RebuildPolicy, SimulationConfig};
pub use crate::core::simulation::Simulation;
pub use crate::core::transactions::{Transaction, TransactionStack};
pub use crate::core::types::{Direction, InstanceId, Node, NodeFlags, Orientation, Point};
pub use crate::core::values::{LogicState, Value};
