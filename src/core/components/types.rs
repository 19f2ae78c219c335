use super::port_specs::{PortSpec, BINARY_PORTS, CONSTANT_PORTS, D_FLIP_FLOP_PORTS, UNARY_PORTS};
use serde::{Deserialize, Serialize};

/// Closed set of component kinds the editor can place
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComponentKind {
    Constant,
    Buffer,
    Not,
    And,
    Nand,
    Or,
    Nor,
    Xor,
    Xnor,
    DFlipFlop,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 10] = [
        ComponentKind::Constant,
        ComponentKind::Buffer,
        ComponentKind::Not,
        ComponentKind::And,
        ComponentKind::Nand,
        ComponentKind::Or,
        ComponentKind::Nor,
        ComponentKind::Xor,
        ComponentKind::Xnor,
        ComponentKind::DFlipFlop,
    ];

    /// Port table in East orientation
    pub fn ports(self) -> &'static [PortSpec] {
        match self {
            ComponentKind::Constant => CONSTANT_PORTS,
            ComponentKind::Buffer | ComponentKind::Not => UNARY_PORTS,
            ComponentKind::And
            | ComponentKind::Nand
            | ComponentKind::Or
            | ComponentKind::Nor
            | ComponentKind::Xor
            | ComponentKind::Xnor => BINARY_PORTS,
            ComponentKind::DFlipFlop => D_FLIP_FLOP_PORTS,
        }
    }

    pub fn input_count(self) -> usize {
        self.ports().iter().filter(|p| p.is_input()).count()
    }

    pub fn output_count(self) -> usize {
        self.ports().iter().filter(|p| p.is_output()).count()
    }
}
