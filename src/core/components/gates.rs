//! Propagation functions for each component kind.
//!
//! Every function maps the current input values (in port-table order) to the
//! next output values (in port-table order).

use super::types::ComponentKind;
use crate::core::errors::{SimError, SimResult};
use crate::core::values::{LogicState, Value};
use log::warn;

pub type PropagateFn = fn(&[Value]) -> SimResult<Vec<Value>>;

/// Dispatch table lookup. Kinds without behaviour yet have no entry.
pub fn propagation_fn(kind: ComponentKind) -> Option<PropagateFn> {
    match kind {
        ComponentKind::Buffer => Some(buffer),
        ComponentKind::Not => Some(not),
        ComponentKind::And => Some(and),
        ComponentKind::Nand => Some(nand),
        ComponentKind::Or => Some(or),
        ComponentKind::Nor => Some(nor),
        ComponentKind::Xor => Some(xor),
        ComponentKind::Xnor => Some(xnor),
        ComponentKind::Constant | ComponentKind::DFlipFlop => None,
    }
}

/// Evaluate `kind` over `inputs`; `NotImplemented` for kinds without behaviour
pub fn propagate(kind: ComponentKind, inputs: &[Value]) -> SimResult<Vec<Value>> {
    let f = propagation_fn(kind).ok_or(SimError::NotImplemented(kind))?;
    f(inputs)
}

fn input(inputs: &[Value], index: usize) -> Value {
    inputs.get(index).copied().unwrap_or(Value::FLOATING)
}

/// Apply a lane operator; disagreeing widths give an all-Error word
fn binary(inputs: &[Value], op: fn(&Value, &Value) -> SimResult<Value>) -> SimResult<Value> {
    let a = input(inputs, 0);
    let b = input(inputs, 1);
    match op(&a, &b) {
        Err(SimError::WidthMismatch { left, right }) => {
            warn!("Gate inputs disagree in width ({} vs {}), output is Error", left, right);
            Value::filled(LogicState::Error, left.max(right))
        }
        other => other,
    }
}

fn buffer(inputs: &[Value]) -> SimResult<Vec<Value>> {
    Ok(vec![input(inputs, 0)])
}

fn not(inputs: &[Value]) -> SimResult<Vec<Value>> {
    Ok(vec![!input(inputs, 0)])
}

fn and(inputs: &[Value]) -> SimResult<Vec<Value>> {
    Ok(vec![binary(inputs, Value::and)?])
}

fn nand(inputs: &[Value]) -> SimResult<Vec<Value>> {
    Ok(vec![!binary(inputs, Value::and)?])
}

fn or(inputs: &[Value]) -> SimResult<Vec<Value>> {
    Ok(vec![binary(inputs, Value::or)?])
}

fn nor(inputs: &[Value]) -> SimResult<Vec<Value>> {
    Ok(vec![!binary(inputs, Value::or)?])
}

fn xor(inputs: &[Value]) -> SimResult<Vec<Value>> {
    Ok(vec![binary(inputs, Value::xor)?])
}

fn xnor(inputs: &[Value]) -> SimResult<Vec<Value>> {
    Ok(vec![!binary(inputs, Value::xor)?])
}
