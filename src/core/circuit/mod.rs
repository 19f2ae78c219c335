pub mod wire;
pub mod wires;

pub use wire::Wire;
pub use wires::{DragEdit, WireSet};
