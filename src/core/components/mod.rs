pub mod gates;
pub mod instances;
pub mod port_specs;
pub mod types;

// Re-export commonly used types
pub use gates::{propagate, propagation_fn, PropagateFn};
pub use instances::{Instance, InstanceTable, Port};
pub use port_specs::PortSpec;
pub use types::ComponentKind;
