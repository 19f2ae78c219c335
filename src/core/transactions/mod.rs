pub mod stack;
pub mod transaction;

pub use stack::TransactionStack;
pub use transaction::{ControlPointsTransaction, GateTransaction, Transaction, TransactionKind, WireTransaction};
