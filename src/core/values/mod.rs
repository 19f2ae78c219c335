pub mod logic_state;
pub mod value;

// Re-export all public types
pub use logic_state::LogicState;
pub use value::Value;
