pub mod config;
pub mod engine;
pub mod event_scheduler;

pub use config::{RebuildPolicy, SimulationConfig};
pub use engine::{Engine, StepReport};
pub use event_scheduler::{EventScheduler, SetEvent};
