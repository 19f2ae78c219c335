use crate::core::circuit::Wire;
use crate::core::components::Instance;
use crate::core::errors::SimError;
use crate::core::types::Point;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Wire edit: the requested wire plus the segments the merge/split touched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireTransaction {
    pub wire: Wire,
    pub deleted: Vec<Wire>,
    pub created: Vec<Wire>,
}

/// Adding or removing control points, with the segments they split or join
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlPointsTransaction {
    pub removing: bool,
    pub points: Vec<Point>,
    pub deleted: Vec<Wire>,
    pub created: Vec<Wire>,
}

/// Placement or removal of a component instance.
///
/// `wire_edits` are applied before the instance is placed and reverted after
/// it is taken away.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateTransaction {
    pub removing: bool,
    pub instance: Instance,
    pub wire_edits: Option<ControlPointsTransaction>,
}

/// One atomic, reversible edit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transaction {
    Wire(WireTransaction),
    ControlPoints(ControlPointsTransaction),
    Gate(GateTransaction),
    /// Applied front-to-back, reverted back-to-front
    Bundled(Vec<Transaction>),
}

impl Transaction {
    pub fn kind(&self) -> TransactionKind {
        match self {
            Transaction::Wire(_) => TransactionKind::Wire,
            Transaction::ControlPoints(_) => TransactionKind::ControlPoints,
            Transaction::Gate(_) => TransactionKind::Gate,
            Transaction::Bundled(_) => TransactionKind::Bundled,
        }
    }
}

impl From<WireTransaction> for Transaction {
    fn from(t: WireTransaction) -> Self {
        Transaction::Wire(t)
    }
}

impl From<ControlPointsTransaction> for Transaction {
    fn from(t: ControlPointsTransaction) -> Self {
        Transaction::ControlPoints(t)
    }
}

impl From<GateTransaction> for Transaction {
    fn from(t: GateTransaction) -> Self {
        Transaction::Gate(t)
    }
}

/// Tag naming a transaction variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    Wire,
    ControlPoints,
    Gate,
    Bundled,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Wire => "wire",
            TransactionKind::ControlPoints => "control-points",
            TransactionKind::Gate => "gate",
            TransactionKind::Bundled => "bundled",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wire" => Ok(TransactionKind::Wire),
            "control-points" => Ok(TransactionKind::ControlPoints),
            "gate" => Ok(TransactionKind::Gate),
            "bundled" => Ok(TransactionKind::Bundled),
            other => Err(SimError::UnknownTransactionKind(other.to_string())),
        }
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transaction::Wire(t) => write!(
                f,
                "wire {}: -{} +{}",
                t.wire,
                t.deleted.len(),
                t.created.len()
            ),
            Transaction::ControlPoints(t) => write!(
                f,
                "{} {} control point(s): -{} +{}",
                if t.removing { "remove" } else { "add" },
                t.points.len(),
                t.deleted.len(),
                t.created.len()
            ),
            Transaction::Gate(t) => write!(
                f,
                "{} {:?} {}",
                if t.removing { "remove" } else { "place" },
                t.instance.kind,
                t.instance.id
            ),
            Transaction::Bundled(children) => write!(f, "bundle of {}", children.len()),
        }
    }
}
