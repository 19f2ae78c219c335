use crate::core::circuit::Wire;
use crate::core::components::ComponentKind;
use crate::core::types::InstanceId;
use thiserror::Error;

/// Errors reported by the simulation core.
///
/// Electrical conflicts are not errors: they resolve to the `Error` logic
/// state and the simulation keeps running.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    #[error("width mismatch: {left} lanes vs {right} lanes")]
    WidthMismatch { left: u8, right: u8 },

    #[error("invalid delay {0}: events must be scheduled strictly in the future")]
    InvalidDelay(i64),

    #[error("lane index {index} out of range for width {width}")]
    IndexOutOfRange { index: u8, width: u8 },

    #[error("component kind {0:?} is not implemented")]
    NotImplemented(ComponentKind),

    #[error("unknown transaction kind '{0}'")]
    UnknownTransactionKind(String),

    #[error("invalid value width {0}, expected 1..=32")]
    InvalidWidth(u8),

    #[error("invalid value literal '{0}'")]
    InvalidValue(String),

    #[error("no wire {0} in the circuit")]
    UnknownWire(Wire),

    #[error("no instance {0} in the circuit")]
    UnknownInstance(InstanceId),

    #[error("instance {0} is already placed")]
    DuplicateInstance(InstanceId),
}

pub type SimResult<T> = Result<T, SimError>;
