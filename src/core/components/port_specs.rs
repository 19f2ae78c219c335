use crate::core::types::{NodeFlags, Point};

/// One port of a component kind, relative to the anchor in East orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortSpec {
    /// Port name, for diagnostics
    pub name: &'static str,
    /// Offset from the anchor before rotation
    pub offset: Point,
    /// Signal direction
    pub flags: NodeFlags,
}

impl PortSpec {
    /// Create an input port
    pub const fn input(name: &'static str, x: i32, y: i32) -> Self {
        Self { name, offset: Point::new(x, y), flags: NodeFlags::Input }
    }

    /// Create an output port
    pub const fn output(name: &'static str, x: i32, y: i32) -> Self {
        Self { name, offset: Point::new(x, y), flags: NodeFlags::Output }
    }

    pub fn is_input(&self) -> bool {
        self.flags.is_input()
    }

    pub fn is_output(&self) -> bool {
        self.flags.is_output()
    }
}

pub(crate) const UNARY_PORTS: &[PortSpec] = &[
    PortSpec::input("in", -3, 0),
    PortSpec::output("out", 0, 0),
];

pub(crate) const BINARY_PORTS: &[PortSpec] = &[
    PortSpec::input("a", -3, 1),
    PortSpec::input("b", -3, -1),
    PortSpec::output("out", 0, 0),
];

pub(crate) const CONSTANT_PORTS: &[PortSpec] = &[PortSpec::output("out", 0, 0)];

pub(crate) const D_FLIP_FLOP_PORTS: &[PortSpec] = &[
    PortSpec::output("q", 0, 0),
    PortSpec::output("q_bar", 0, 2),
    PortSpec::input("d", -2, 0),
    PortSpec::input("clk", -2, 2),
];
